//! Sections, meetings and seat availability.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::domain::time::{TimeRange, parse_time_range};

/// The pedagogical category of a section.
///
/// Codes the planner does not know are kept verbatim in [`SectionType::Other`]
/// so that grouping still works for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionType {
    /// Lecture
    Lec,
    /// Tutorial
    Tut,
    /// Laboratory
    Lab,
    /// Exercise
    Exr,
    /// Seminar
    Sem,
    /// Project
    Prj,
    /// Practicum
    Pra,
    /// Discussion
    Dis,
    /// Workshop
    Wks,
    /// Fieldwork
    Fld,
    /// Clinical work
    Clw,
    /// Assessment
    Asb,
    /// Any other code, stored as it appeared in the catalog.
    Other(String),
}

impl SectionType {
    /// Map a catalog code (e.g. `"LEC"`) onto a section type.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "LEC" => Self::Lec,
            "TUT" => Self::Tut,
            "LAB" => Self::Lab,
            "EXR" => Self::Exr,
            "SEM" => Self::Sem,
            "PRJ" => Self::Prj,
            "PRA" => Self::Pra,
            "DIS" => Self::Dis,
            "WKS" => Self::Wks,
            "FLD" => Self::Fld,
            "CLW" => Self::Clw,
            "ASB" => Self::Asb,
            other => Self::Other(other.to_string()),
        }
    }

    /// The catalog code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Lec => "LEC",
            Self::Tut => "TUT",
            Self::Lab => "LAB",
            Self::Exr => "EXR",
            Self::Sem => "SEM",
            Self::Prj => "PRJ",
            Self::Pra => "PRA",
            Self::Dis => "DIS",
            Self::Wks => "WKS",
            Self::Fld => "FLD",
            Self::Clw => "CLW",
            Self::Asb => "ASB",
            Self::Other(code) => code.as_str(),
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Lec => "Lecture",
            Self::Tut => "Tutorial",
            Self::Lab => "Laboratory",
            Self::Exr => "Exercise",
            Self::Sem => "Seminar",
            Self::Prj => "Project",
            Self::Pra => "Practicum",
            Self::Dis => "Discussion",
            Self::Wks => "Workshop",
            Self::Fld => "Fieldwork",
            Self::Clw => "Clinical Work",
            Self::Asb => "Assessment",
            Self::Other(code) => code.as_str(),
        }
    }

    /// A short pictogram for listings.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Lec => "📚",
            Self::Tut => "✏️",
            Self::Lab => "🧪",
            Self::Exr => "🏋️",
            Self::Sem => "💬",
            Self::Prj => "🛠️",
            Self::Pra => "🩺",
            Self::Dis => "🗣️",
            Self::Wks => "🔧",
            Self::Fld => "🌿",
            Self::Clw => "🏥",
            Self::Asb => "📝",
            Self::Other(_) => "📄",
        }
    }
}

impl From<String> for SectionType {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<SectionType> for String {
    fn from(section_type: SectionType) -> Self {
        section_type.code().to_string()
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of a section's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Raw meeting time, e.g. `"Mo 14:30 - 15:15"` or `"TBA"`.
    pub time: String,
    /// Room.
    pub location: String,
    /// Instructor name.
    pub instructor: String,
    /// Date span the meeting runs over.
    pub dates: String,
}

impl Meeting {
    /// The parsed time slot, if the meeting is scheduled.
    #[must_use]
    pub fn time_range(&self) -> Option<TimeRange> {
        parse_time_range(&self.time)
    }

    /// Whether the meeting has a parseable time.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.time_range().is_some()
    }
}

/// Enrollment status of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    /// Seats are available.
    Open,
    /// Full, with students on the waitlist.
    Waitlisted,
    /// Full.
    Closed,
    /// No availability information.
    #[default]
    Unknown,
}

impl AvailabilityStatus {
    /// Parse a status label, case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "waitlisted" | "waitlist" | "wait list" => Some(Self::Waitlisted),
            "closed" | "full" => Some(Self::Closed),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Derive a status from seat counts.
    #[must_use]
    pub const fn from_counts(available_seats: u32, waitlist_total: u32) -> Self {
        if available_seats > 0 {
            Self::Open
        } else if waitlist_total > 0 {
            Self::Waitlisted
        } else {
            Self::Closed
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "Open",
            Self::Waitlisted => "Waitlisted",
            Self::Closed => "Closed",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Seat counts for a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Enrollment capacity.
    pub capacity: u32,
    /// Students enrolled.
    pub enrolled: u32,
    /// Seats still free.
    pub available_seats: u32,
    /// Enrollment status.
    pub status: AvailabilityStatus,
    /// Waitlist capacity.
    pub waitlist_capacity: u32,
    /// Students on the waitlist.
    pub waitlist_total: u32,
}

/// An offered section of a course in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Stable identifier, `<courseKey>_<sectionCode>`.
    pub id: String,
    /// Section code, e.g. `"A-LEC"`, `"--LEC"` or `"AT01-TUT"`.
    pub section_code: String,
    /// Registrar class number, when the catalog lists one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_number: Option<u32>,
    /// Category of the section.
    pub section_type: SectionType,
    /// Timetable rows, in catalog order.
    pub meetings: Vec<Meeting>,
    /// Seat counts.
    #[serde(default)]
    pub availability: Availability,
    /// Section-specific attributes such as teaching language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_attributes: Option<String>,
}

impl Section {
    /// Build the stable id of a section from its course key and code.
    #[must_use]
    pub fn make_id(course_key: &str, section_code: &str) -> String {
        format!("{course_key}_{section_code}")
    }

    /// The cohort letter of this section, or `None` for a wildcard.
    ///
    /// See [`get_section_prefix`].
    #[must_use]
    pub fn prefix(&self) -> Option<char> {
        get_section_prefix(&self.section_code)
    }

    /// Meetings with duplicates removed.
    ///
    /// Two meetings are duplicates when time, location and instructor all
    /// match. The first occurrence is kept.
    #[must_use]
    pub fn unique_meetings(&self) -> Vec<&Meeting> {
        let mut seen = HashSet::new();
        self.meetings
            .iter()
            .filter(|m| seen.insert((&m.time, &m.location, &m.instructor)))
            .collect()
    }

    /// Whether any meeting of this section has no parseable time.
    #[must_use]
    pub fn has_unscheduled_meeting(&self) -> bool {
        self.meetings.is_empty() || self.meetings.iter().any(|m| !m.is_scheduled())
    }
}

/// The cohort letter encoded at the start of a section code.
///
/// `"A-LEC"` and `"AT01-TUT"` belong to cohort `A`. Codes starting with a dash
/// (`"--LEC"`, `"-E01-EXR"`), or with anything other than an uppercase ASCII
/// letter, are wildcards and return `None`.
#[must_use]
pub fn get_section_prefix(section_code: &str) -> Option<char> {
    section_code
        .chars()
        .next()
        .filter(char::is_ascii_uppercase)
}

/// Split a raw catalog section label into its code and class number.
///
/// `"A-LEC (1234)"` becomes `("A-LEC", Some(1234))`; a label without a
/// parenthesised number is returned whole.
#[must_use]
pub fn split_section_label(label: &str) -> (&str, Option<u32>) {
    let label = label.trim();
    let number = label.rfind('(').and_then(|open| {
        let inner = label[open + 1..].strip_suffix(')')?;
        inner.trim().parse().ok().map(|n| (open, n))
    });
    match number {
        Some((open, n)) => (label[..open].trim_end(), Some(n)),
        None => (label, None),
    }
}

/// The section type encoded in a section code: the text after its last dash.
#[must_use]
pub fn section_type_of(section_code: &str) -> SectionType {
    let code = section_code.rsplit('-').next().unwrap_or(section_code);
    SectionType::from_code(code.trim())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn meeting(time: &str, location: &str, instructor: &str) -> Meeting {
        Meeting {
            time: time.to_string(),
            location: location.to_string(),
            instructor: instructor.to_string(),
            dates: "2/9-4/12".to_string(),
        }
    }

    fn section(code: &str, meetings: Vec<Meeting>) -> Section {
        Section {
            id: Section::make_id("CSCI3100", code),
            section_code: code.to_string(),
            class_number: None,
            section_type: section_type_of(code),
            meetings,
            availability: Availability::default(),
            class_attributes: None,
        }
    }

    #[test_case("A-LEC", Some('A'); "lecture cohort")]
    #[test_case("AT01-TUT", Some('A'); "tutorial cohort")]
    #[test_case("B01-TUT", Some('B'); "other cohort")]
    #[test_case("--LEC", None; "double dash wildcard")]
    #[test_case("-E01-EXR", None; "single dash wildcard")]
    #[test_case("", None; "empty")]
    #[test_case("1-LEC", None; "digit")]
    fn prefixes(code: &str, expected: Option<char>) {
        assert_eq!(get_section_prefix(code), expected);
    }

    #[test_case("A-LEC (1234)", "A-LEC", Some(1234); "with class number")]
    #[test_case("--LEC (8192)", "--LEC", Some(8192); "wildcard with class number")]
    #[test_case("-L01-LAB (5726)", "-L01-LAB", Some(5726); "lab")]
    #[test_case("AT01-TUT", "AT01-TUT", None; "bare code")]
    #[test_case("X-LEC (n/a)", "X-LEC (n/a)", None; "non numeric")]
    fn splits_labels(label: &str, code: &str, number: Option<u32>) {
        assert_eq!(split_section_label(label), (code, number));
    }

    #[test_case("A-LEC", SectionType::Lec; "lecture")]
    #[test_case("AT01-TUT", SectionType::Tut; "tutorial")]
    #[test_case("-L01-LAB", SectionType::Lab; "lab")]
    #[test_case("-E01-EXR", SectionType::Exr; "exercise")]
    #[test_case("A-XYZ", SectionType::Other("XYZ".to_string()); "unknown")]
    fn section_types(code: &str, expected: SectionType) {
        assert_eq!(section_type_of(code), expected);
    }

    #[test]
    fn section_type_serializes_as_code() {
        let json = serde_json::to_string(&SectionType::Tut).unwrap();
        assert_eq!(json, "\"TUT\"");
        let other: SectionType = serde_json::from_str("\"STU\"").unwrap();
        assert_eq!(other, SectionType::Other("STU".to_string()));
    }

    #[test]
    fn unique_meetings_keeps_first_occurrence() {
        let mut first = meeting("Mo 10:30 - 12:15", "LSB LT1", "Prof. Lee");
        first.dates = "first".to_string();
        let mut duplicate = first.clone();
        duplicate.dates = "second".to_string();
        let other = meeting("We 10:30 - 11:15", "LSB LT1", "Prof. Lee");

        let section = section("A-LEC", vec![first, duplicate, other]);
        let unique = section.unique_meetings();

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].dates, "first");
        assert_eq!(unique[1].time, "We 10:30 - 11:15");
    }

    #[test]
    fn unscheduled_detection() {
        let scheduled = section("A-LEC", vec![meeting("Mo 10:30 - 12:15", "LT1", "TBA")]);
        let tba = section("A-LEC", vec![meeting("TBA", "TBA", "TBA")]);
        let empty = section("A-LEC", vec![]);

        assert!(!scheduled.has_unscheduled_meeting());
        assert!(tba.has_unscheduled_meeting());
        assert!(empty.has_unscheduled_meeting());
    }

    #[test]
    fn status_from_counts() {
        assert_eq!(AvailabilityStatus::from_counts(3, 0), AvailabilityStatus::Open);
        assert_eq!(
            AvailabilityStatus::from_counts(0, 2),
            AvailabilityStatus::Waitlisted
        );
        assert_eq!(AvailabilityStatus::from_counts(0, 0), AvailabilityStatus::Closed);
        assert_eq!(
            AvailabilityStatus::from_label(" OPEN "),
            Some(AvailabilityStatus::Open)
        );
        assert_eq!(AvailabilityStatus::from_label("maybe"), None);
    }
}
