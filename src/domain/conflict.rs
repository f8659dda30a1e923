//! Time conflicts between calendar events.

use serde::Serialize;

use crate::domain::{calendar::CalendarEvent, time::Weekday};

/// Mark every event that overlaps another visible event.
///
/// Hidden events never conflict and never cause a conflict. An event is never
/// compared with itself; identity is the event id.
#[must_use]
pub fn detect_conflicts(events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    events
        .iter()
        .map(|event| {
            let has_conflict = event.is_visible && {
                let slot = event.time_range();
                events.iter().any(|other| {
                    other.is_visible && other.id != event.id && slot.overlaps(&other.time_range())
                })
            };
            CalendarEvent {
                has_conflict,
                ..event.clone()
            }
        })
        .collect()
}

/// Cluster events for stacking.
///
/// Walks the events in order. Each event not yet placed seeds a new group,
/// which takes every later unplaced event that overlaps the seed. Members are
/// only compared with the seed, not with each other, so a chain of overlaps
/// can be split across groups.
#[must_use]
pub fn group_overlapping_events(events: &[CalendarEvent]) -> Vec<Vec<&CalendarEvent>> {
    let mut placed = vec![false; events.len()];
    let mut groups = Vec::new();

    for (i, seed) in events.iter().enumerate() {
        if placed[i] {
            continue;
        }
        placed[i] = true;
        let slot = seed.time_range();
        let mut group = vec![seed];
        for (j, other) in events.iter().enumerate().skip(i + 1) {
            if !placed[j] && slot.overlaps(&other.time_range()) {
                placed[j] = true;
                group.push(other);
            }
        }
        groups.push(group);
    }
    groups
}

/// The span covered by a group of overlapping events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictZone {
    /// Day of the zone.
    pub day: Weekday,
    /// Earliest start, minutes since midnight.
    pub start_minutes: u16,
    /// Latest end, minutes since midnight.
    pub end_minutes: u16,
    /// Ids of the events in the zone.
    pub event_ids: Vec<String>,
}

/// Bounding spans of every group with more than one event.
#[must_use]
pub fn get_conflict_zones(events: &[CalendarEvent]) -> Vec<ConflictZone> {
    group_overlapping_events(events)
        .into_iter()
        .filter(|group| group.len() > 1)
        .filter_map(|group| {
            let start_minutes = group.iter().map(|e| e.time_range().start_minutes()).min()?;
            let end_minutes = group.iter().map(|e| e.time_range().end_minutes()).max()?;
            Some(ConflictZone {
                day: group[0].day,
                start_minutes,
                end_minutes,
                event_ids: group.iter().map(|e| e.id.clone()).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{section::SectionType, time::parse_time_range};

    fn event(id: &str, time: &str) -> CalendarEvent {
        let slot = parse_time_range(time).unwrap();
        CalendarEvent {
            id: id.to_string(),
            enrollment_id: "CSCI3100".to_string(),
            title: "Software Engineering".to_string(),
            section_id: format!("CSCI3100_{id}"),
            section_code: id.to_string(),
            section_type: SectionType::Lec,
            time: time.to_string(),
            day: slot.day,
            start_hour: slot.start_hour,
            start_minute: slot.start_minute,
            end_hour: slot.end_hour,
            end_minute: slot.end_minute,
            location: "LT1".to_string(),
            instructor: "TBA".to_string(),
            color: "#3B82F6".to_string(),
            is_visible: true,
            has_conflict: false,
        }
    }

    fn flags(events: &[CalendarEvent]) -> Vec<bool> {
        events.iter().map(|e| e.has_conflict).collect()
    }

    #[test]
    fn overlapping_events_conflict() {
        let events = detect_conflicts(&[
            event("a", "Mo 14:30 - 15:15"),
            event("b", "Mo 15:00 - 16:00"),
            event("c", "Mo 16:00 - 17:00"),
        ]);
        assert_eq!(flags(&events), vec![true, true, false]);
    }

    #[test]
    fn identical_copies_with_same_id_do_not_conflict() {
        let events = detect_conflicts(&[event("a", "Mo 14:30 - 15:15"), event("a", "Mo 14:30 - 15:15")]);
        assert_eq!(flags(&events), vec![false, false]);
    }

    #[test]
    fn hidden_events_are_ignored() {
        let mut hidden = event("b", "Mo 15:00 - 16:00");
        hidden.is_visible = false;
        let events = detect_conflicts(&[event("a", "Mo 14:30 - 15:15"), hidden]);
        assert_eq!(flags(&events), vec![false, false]);
    }

    #[test]
    fn different_days_do_not_conflict() {
        let events = detect_conflicts(&[event("a", "Mo 14:30 - 15:15"), event("b", "Tu 14:30 - 15:15")]);
        assert_eq!(flags(&events), vec![false, false]);
    }

    #[test]
    fn grouping_is_seed_based() {
        // b overlaps a and c, but a and c do not overlap.
        let events = [
            event("a", "Mo 09:00 - 10:00"),
            event("b", "Mo 09:30 - 11:00"),
            event("c", "Mo 10:30 - 12:00"),
        ];
        let groups = group_overlapping_events(&events);
        let ids: Vec<Vec<&str>> = groups
            .iter()
            .map(|g| g.iter().map(|e| e.id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn zones_bound_groups_with_several_events() {
        let events = [
            event("a", "Mo 09:00 - 10:00"),
            event("b", "Mo 09:30 - 11:00"),
            event("c", "Tu 10:30 - 12:00"),
        ];
        let zones = get_conflict_zones(&events);
        assert_eq!(
            zones,
            vec![ConflictZone {
                day: Weekday::Mon,
                start_minutes: 9 * 60,
                end_minutes: 11 * 60,
                event_ids: vec!["a".to_string(), "b".to_string()],
            }]
        );
    }
}
