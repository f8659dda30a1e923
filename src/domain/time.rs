//! Weekly meeting times.
//!
//! Catalog meeting strings look like `"Mo 14:30 - 15:15"` or
//! `"Th 2:30PM - 5:15PM"`. Anything that cannot be read as a weekday plus a
//! time span (for example `"TBA"`) has no schedule impact and parses to
//! `None`.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mo|Tu|We|Th|Fr").expect("this must never fail"));

static TWELVE_HOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)\s*-\s*(\d{1,2}):(\d{2})\s*(AM|PM)")
        .expect("this must never fail")
});

static TWENTY_FOUR_HOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2})\s*-\s*(\d{1,2}):(\d{2})").expect("this must never fail")
});

/// A teaching day.
///
/// Only the five weekdays are modelled; weekend meetings never parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    /// Monday (`Mo`)
    Mon,
    /// Tuesday (`Tu`)
    Tue,
    /// Wednesday (`We`)
    Wed,
    /// Thursday (`Th`)
    Thu,
    /// Friday (`Fr`)
    Fri,
}

impl Weekday {
    /// All weekdays, Monday first.
    pub const ALL: [Self; 5] = [Self::Mon, Self::Tue, Self::Wed, Self::Thu, Self::Fri];

    /// The two-letter token used by the catalog.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mon => "Mo",
            Self::Tue => "Tu",
            Self::Wed => "We",
            Self::Thu => "Th",
            Self::Fri => "Fr",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.token() == token)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
        };
        f.write_str(name)
    }
}

/// One weekly recurring meeting slot.
///
/// The parser does not check that the end follows the start; a zero or
/// negative duration simply never overlaps anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Day of the week.
    pub day: Weekday,
    /// Start hour, 24-hour clock.
    pub start_hour: u8,
    /// Start minute.
    pub start_minute: u8,
    /// End hour, 24-hour clock.
    pub end_hour: u8,
    /// End minute.
    pub end_minute: u8,
}

impl TimeRange {
    /// Start as minutes since midnight.
    #[must_use]
    pub fn start_minutes(&self) -> u16 {
        u16::from(self.start_hour) * 60 + u16::from(self.start_minute)
    }

    /// End as minutes since midnight.
    #[must_use]
    pub fn end_minutes(&self) -> u16 {
        u16::from(self.end_hour) * 60 + u16::from(self.end_minute)
    }

    /// Whether two slots share any time on the same day.
    ///
    /// Intervals are half-open, so a meeting ending at 15:15 does not clash
    /// with one starting at 15:15.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.day != other.day {
            return false;
        }
        self.start_minutes() < other.end_minutes() && other.start_minutes() < self.end_minutes()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02} - {:02}:{:02}",
            self.day.token(),
            self.start_hour,
            self.start_minute,
            self.end_hour,
            self.end_minute
        )
    }
}

/// Error returned when a string has no recognisable weekday and time span.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unscheduled meeting time '{0}'")]
pub struct UnscheduledError(String);

impl FromStr for TimeRange {
    type Err = UnscheduledError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_range(s).ok_or_else(|| UnscheduledError(s.to_string()))
    }
}

/// Parse a catalog meeting string.
///
/// The first weekday token found anywhere in the string is the meeting day.
/// A 12-hour span (`2:30PM - 5:15PM`) is tried before a 24-hour span
/// (`14:30 - 17:15`). Returns `None` when either part is missing or a field
/// is out of range.
#[must_use]
pub fn parse_time_range(raw: &str) -> Option<TimeRange> {
    let day = Weekday::from_token(DAY_RE.find(raw)?.as_str())?;

    if let Some(caps) = TWELVE_HOUR_RE.captures(raw) {
        let start_hour = to_24_hour(caps[1].parse().ok()?, &caps[3])?;
        let start_minute = minute(&caps[2])?;
        let end_hour = to_24_hour(caps[4].parse().ok()?, &caps[6])?;
        let end_minute = minute(&caps[5])?;
        return Some(TimeRange {
            day,
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        });
    }

    let caps = TWENTY_FOUR_HOUR_RE.captures(raw)?;
    Some(TimeRange {
        day,
        start_hour: hour(&caps[1])?,
        start_minute: minute(&caps[2])?,
        end_hour: hour(&caps[3])?,
        end_minute: minute(&caps[4])?,
    })
}

/// Whether two slots overlap. See [`TimeRange::overlaps`].
#[must_use]
pub fn do_times_overlap(a: &TimeRange, b: &TimeRange) -> bool {
    a.overlaps(b)
}

fn to_24_hour(hour: u8, meridiem: &str) -> Option<u8> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = meridiem.eq_ignore_ascii_case("PM");
    Some(match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    })
}

fn hour(s: &str) -> Option<u8> {
    s.parse().ok().filter(|h| *h < 24)
}

fn minute(s: &str) -> Option<u8> {
    s.parse().ok().filter(|m| *m < 60)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn range(day: Weekday, sh: u8, sm: u8, eh: u8, em: u8) -> TimeRange {
        TimeRange {
            day,
            start_hour: sh,
            start_minute: sm,
            end_hour: eh,
            end_minute: em,
        }
    }

    #[test_case("Mo 14:30 - 15:15", range(Weekday::Mon, 14, 30, 15, 15); "24 hour")]
    #[test_case("Th 9:30 - 10:15", range(Weekday::Thu, 9, 30, 10, 15); "single digit hour")]
    #[test_case("Fr 2:30PM - 5:15PM", range(Weekday::Fri, 14, 30, 17, 15); "12 hour pm")]
    #[test_case("We 12:00AM - 1:00AM", range(Weekday::Wed, 0, 0, 1, 0); "midnight")]
    #[test_case("Tu 11:30AM - 12:15PM", range(Weekday::Tue, 11, 30, 12, 15); "noon stays twelve")]
    #[test_case("Tu 11:30 am - 12:15 pm", range(Weekday::Tue, 11, 30, 12, 15); "lowercase meridiem")]
    #[test_case("Mo We 09:30 - 10:15", range(Weekday::Mon, 9, 30, 10, 15); "first day wins")]
    fn parses(raw: &str, expected: TimeRange) {
        assert_eq!(parse_time_range(raw), Some(expected));
    }

    #[test_case(""; "empty")]
    #[test_case("TBA"; "tba")]
    #[test_case("14:30 - 15:15"; "no weekday")]
    #[test_case("Sa 10:00 - 11:00"; "weekend")]
    #[test_case("Mo"; "no time")]
    #[test_case("Mo 25:00 - 26:00"; "hour out of range")]
    #[test_case("Mo 10:75 - 11:00"; "minute out of range")]
    #[test_case("Mo 13:00PM - 2:00PM"; "twelve hour out of range")]
    fn rejects(raw: &str) {
        assert_eq!(parse_time_range(raw), None);
    }

    #[test]
    fn inverted_range_parses_without_validation() {
        let parsed = parse_time_range("Mo 16:00 - 15:00").unwrap();
        assert!(parsed.start_minutes() > parsed.end_minutes());
        assert!(!parsed.overlaps(&parsed));
    }

    #[test]
    fn overlapping_slots() {
        let a = parse_time_range("Mo 14:30 - 15:15").unwrap();
        let b = parse_time_range("Mo 15:00 - 16:00").unwrap();
        assert!(do_times_overlap(&a, &b));
        assert!(do_times_overlap(&b, &a));
    }

    #[test]
    fn touching_slots_do_not_overlap() {
        let a = parse_time_range("Mo 14:30 - 15:15").unwrap();
        let b = parse_time_range("Mo 15:15 - 16:00").unwrap();
        assert!(!do_times_overlap(&a, &b));
    }

    #[test]
    fn different_days_never_overlap() {
        let a = parse_time_range("Mo 14:30 - 15:15").unwrap();
        let b = parse_time_range("Tu 14:30 - 15:15").unwrap();
        assert!(!do_times_overlap(&a, &b));
    }

    #[test]
    fn display_round_trips() {
        let parsed: TimeRange = "Fr 2:30PM - 5:15PM".parse().unwrap();
        assert_eq!(parsed.to_string(), "Fr 14:30 - 17:15");
        assert_eq!(parsed.to_string().parse::<TimeRange>().unwrap(), parsed);
    }

    #[test]
    fn from_str_reports_unscheduled() {
        let error = "TBA".parse::<TimeRange>().unwrap_err();
        assert_eq!(error.to_string(), "Unscheduled meeting time 'TBA'");
    }
}
