//! Calendar events derived from the cart.
//!
//! Events are rebuilt from the enrollments on every change and never stored.

use serde::Serialize;

use crate::domain::{
    enrollment::CourseEnrollment,
    section::{Meeting, Section, SectionType},
    time::{TimeRange, Weekday},
};

/// One weekly meeting of a selected section, placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// `<courseId>_<sectionId>_<meetingTime>`.
    pub id: String,
    /// The enrollment the event was derived from.
    pub enrollment_id: String,
    /// Course title.
    pub title: String,
    /// Id of the section.
    pub section_id: String,
    /// Code of the section.
    pub section_code: String,
    /// Type of the section.
    pub section_type: SectionType,
    /// Raw meeting time.
    pub time: String,
    /// Meeting day.
    pub day: Weekday,
    /// Start hour.
    pub start_hour: u8,
    /// Start minute.
    pub start_minute: u8,
    /// End hour.
    pub end_hour: u8,
    /// End minute.
    pub end_minute: u8,
    /// Room.
    pub location: String,
    /// Instructor.
    pub instructor: String,
    /// Course colour.
    pub color: String,
    /// Whether the owning enrollment is shown.
    pub is_visible: bool,
    /// Whether the event overlaps another visible event.
    pub has_conflict: bool,
}

impl CalendarEvent {
    /// The event's slot.
    #[must_use]
    pub const fn time_range(&self) -> TimeRange {
        TimeRange {
            day: self.day,
            start_hour: self.start_hour,
            start_minute: self.start_minute,
            end_hour: self.end_hour,
            end_minute: self.end_minute,
        }
    }

    fn new(enrollment: &CourseEnrollment, section: &Section, meeting: &Meeting, slot: TimeRange) -> Self {
        Self {
            id: format!("{}_{}_{}", enrollment.course_id, section.id, meeting.time),
            enrollment_id: enrollment.course_id.clone(),
            title: enrollment.course.title.clone(),
            section_id: section.id.clone(),
            section_code: section.section_code.clone(),
            section_type: section.section_type.clone(),
            time: meeting.time.clone(),
            day: slot.day,
            start_hour: slot.start_hour,
            start_minute: slot.start_minute,
            end_hour: slot.end_hour,
            end_minute: slot.end_minute,
            location: meeting.location.clone(),
            instructor: meeting.instructor.clone(),
            color: enrollment.color.clone(),
            is_visible: enrollment.is_visible,
            has_conflict: false,
        }
    }
}

/// A selected section with at least one meeting that has no time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledSection {
    /// The enrollment the section belongs to.
    pub enrollment_id: String,
    /// Course title.
    pub title: String,
    /// Id of the section.
    pub section_id: String,
    /// Code of the section.
    pub section_code: String,
    /// Raw times of the meetings that did not parse.
    pub times: Vec<String>,
}

/// Build calendar events for every visible enrollment.
///
/// One event per selected section and distinct meeting time. Meetings without
/// a parseable time are left out; see [`unscheduled_sections`].
#[must_use]
pub fn enrollments_to_calendar_events(enrollments: &[CourseEnrollment]) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for enrollment in enrollments.iter().filter(|e| e.is_visible) {
        for section in &enrollment.selected_sections {
            let mut seen_times: Vec<&str> = Vec::new();
            for meeting in section.unique_meetings() {
                if seen_times.contains(&meeting.time.as_str()) {
                    continue;
                }
                seen_times.push(&meeting.time);
                if let Some(slot) = meeting.time_range() {
                    events.push(CalendarEvent::new(enrollment, section, meeting, slot));
                }
            }
        }
    }
    events
}

/// The selected sections of visible enrollments that have meetings with no
/// parseable time.
///
/// This is the complement of the meetings used by
/// [`enrollments_to_calendar_events`]; a section with no meetings at all is
/// listed with an empty `times`.
#[must_use]
pub fn unscheduled_sections(enrollments: &[CourseEnrollment]) -> Vec<UnscheduledSection> {
    enrollments
        .iter()
        .filter(|e| e.is_visible)
        .flat_map(|enrollment| {
            enrollment
                .selected_sections
                .iter()
                .filter(|s| s.has_unscheduled_meeting())
                .map(move |section| UnscheduledSection {
                    enrollment_id: enrollment.course_id.clone(),
                    title: enrollment.course.title.clone(),
                    section_id: section.id.clone(),
                    section_code: section.section_code.clone(),
                    times: section
                        .unique_meetings()
                        .into_iter()
                        .filter(|m| !m.is_scheduled())
                        .map(|m| m.time.clone())
                        .collect(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        course::{Course, Term},
        enrollment::CourseEnrollment,
        section::{Availability, section_type_of},
    };

    fn meeting(time: &str, location: &str) -> Meeting {
        Meeting {
            time: time.to_string(),
            location: location.to_string(),
            instructor: "Prof. Chan".to_string(),
            dates: "9/1-12/1".to_string(),
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

    fn enrollment(sections: Vec<Section>) -> CourseEnrollment {
        let course = Course {
            subject: "CSCI".to_string(),
            course_code: "3100".to_string(),
            title: "Software Engineering".to_string(),
            credits: 3.0,
            description: None,
            prerequisites: None,
            terms: vec![Term {
                term_code: "2380".to_string(),
                term_name: "2025-26 Term 1".to_string(),
                sections: sections.clone(),
            }],
        };
        CourseEnrollment::new(course, "2025-26 Term 1".to_string(), sections)
    }

    #[test]
    fn one_event_per_distinct_meeting_time() {
        let lecture = section(
            "A-LEC",
            vec![
                meeting("Mo 14:30 - 15:15", "LSB LT1"),
                meeting("Mo 14:30 - 15:15", "LSB LT1"),
                meeting("Mo 14:30 - 15:15", "ERB 407"),
                meeting("We 10:30 - 12:15", "LSB LT1"),
            ],
        );
        let events = enrollments_to_calendar_events(&[enrollment(vec![lecture])]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "CSCI3100_CSCI3100_A-LEC_Mo 14:30 - 15:15");
        assert_eq!(events[0].location, "LSB LT1");
        assert_eq!(events[0].enrollment_id, "CSCI3100");
        assert_eq!(events[1].day, Weekday::Wed);
        assert_eq!(events[1].start_hour, 10);
        assert!(events.iter().all(|e| !e.has_conflict));
    }

    #[test]
    fn event_fields_match_parsed_range() {
        let lecture = section("A-LEC", vec![meeting("Th 2:30PM - 5:15PM", "LT1")]);
        let events = enrollments_to_calendar_events(&[enrollment(vec![lecture])]);
        assert_eq!(
            Some(events[0].time_range()),
            crate::domain::time::parse_time_range("Th 2:30PM - 5:15PM")
        );
    }

    #[test]
    fn hidden_enrollments_emit_nothing() {
        let mut hidden = enrollment(vec![section("A-LEC", vec![meeting("Mo 14:30 - 15:15", "LT1")])]);
        hidden.is_visible = false;
        assert!(enrollments_to_calendar_events(std::slice::from_ref(&hidden)).is_empty());
        assert!(unscheduled_sections(&[hidden]).is_empty());
    }

    #[test]
    fn tba_meetings_are_unscheduled() {
        let lecture = section(
            "A-LEC",
            vec![meeting("Mo 14:30 - 15:15", "LT1"), meeting("TBA", "TBA")],
        );
        let project = section("--PRJ", vec![]);
        let enrollments = [enrollment(vec![lecture, project])];

        let events = enrollments_to_calendar_events(&enrollments);
        let unscheduled = unscheduled_sections(&enrollments);

        assert_eq!(events.len(), 1);
        assert_eq!(unscheduled.len(), 2);
        assert_eq!(unscheduled[0].times, vec!["TBA".to_string()]);
        assert_eq!(unscheduled[1].section_code, "--PRJ");
        assert!(unscheduled[1].times.is_empty());
    }
}
