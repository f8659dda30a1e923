//! The cart: courses committed with a full set of sections.
//!
//! The [`Cart`] knows nothing about the filesystem. It owns its enrollments
//! and keeps every one of them within the cohort rules, except after a
//! [`Cart::sync_with_catalog`] that found stale data, where the problem is
//! recorded on the enrollment instead of being repaired silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    calendar::{
        CalendarEvent, UnscheduledSection, enrollments_to_calendar_events, unscheduled_sections,
    },
    catalog::Catalog,
    color::get_deterministic_color,
    compatibility::{
        are_sections_compatible, auto_complete_enrollment_sections, cyclable_sections,
        is_selection_complete, normalize_sections,
    },
    conflict::{ConflictZone, detect_conflicts, get_conflict_zones},
    course::Course,
    section::{Section, SectionType},
    section_types::parse_section_types,
    selection::SelectionDraft,
};

/// A course in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    /// The course key. Never derived from anything but subject and code.
    pub course_id: String,
    /// Snapshot of the course when it was last added or synced.
    pub course: Course,
    /// The term the sections were chosen from.
    pub term_name: String,
    /// Chosen sections, at most one per type, in priority order.
    pub selected_sections: Vec<Section>,
    /// Display colour, a function of `course_id`.
    pub color: String,
    /// Whether the course is drawn on the calendar.
    pub is_visible: bool,
    /// Set by a sync that found stale data.
    #[serde(default)]
    pub is_invalid: bool,
    /// Human-readable explanation for `is_invalid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    /// When the enrollment was last checked against the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

impl CourseEnrollment {
    /// A visible, valid enrollment.
    #[must_use]
    pub fn new(course: Course, term_name: String, selected_sections: Vec<Section>) -> Self {
        let course_id = course.key();
        let color = get_deterministic_color(&course_id).to_string();
        Self {
            course_id,
            course,
            term_name,
            selected_sections,
            color,
            is_visible: true,
            is_invalid: false,
            invalid_reason: None,
            last_synced: None,
        }
    }

    /// The chosen section of a type.
    #[must_use]
    pub fn section_of_type(&self, section_type: &SectionType) -> Option<&Section> {
        self.selected_sections
            .iter()
            .find(|s| &s.section_type == section_type)
    }

    fn mark_invalid(&mut self, reason: String) {
        warn!(course = %self.course_id, %reason, "Enrollment is stale");
        self.is_invalid = true;
        self.invalid_reason = Some(reason);
    }

    fn mark_valid(&mut self) {
        self.is_invalid = false;
        self.invalid_reason = None;
    }
}

/// Errors raised by cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnrollmentError {
    /// The course has no offering in the requested term.
    #[error("{course_id} is not offered in {term_name}")]
    TermNotOffered {
        /// Course key.
        course_id: String,
        /// Requested term.
        term_name: String,
    },
    /// The draft is missing a required section type.
    #[error("the selection for {0} is incomplete")]
    Incomplete(String),
    /// The course is not in the cart.
    #[error("{0} is not in the cart")]
    NotEnrolled(String),
    /// No section with this id in the enrollment's term.
    #[error("section {0} not found")]
    UnknownSection(String),
    /// The section clashes with a higher-priority section already chosen.
    #[error("section {0} is incompatible with the sections already chosen")]
    Refused(String),
    /// Nothing to cycle through for the section type.
    #[error("{course_id} has no {section_type} sections to choose from")]
    NoAlternatives {
        /// Course key.
        course_id: String,
        /// Section type.
        section_type: SectionType,
    },
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new enrollment was created.
    Added,
    /// An existing enrollment had its sections replaced.
    Replaced,
}

/// Direction for [`Cart::cycle_section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleDirection {
    /// The next alternative, wrapping to the first.
    #[default]
    Forward,
    /// The previous alternative, wrapping to the last.
    Back,
}

/// Result of [`Cart::sync_with_catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Enrollments checked.
    pub checked: usize,
    /// Course keys of enrollments now flagged invalid.
    pub invalid: Vec<String>,
    /// Course keys of enrollments that were invalid and are valid again.
    pub recovered: Vec<String>,
}

/// The courses a student has committed to, one enrollment per course.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    enrollments: Vec<CourseEnrollment>,
}

impl Cart {
    /// Build a cart from stored enrollments.
    ///
    /// Later duplicates of a course are dropped.
    #[must_use]
    pub fn from_enrollments(enrollments: impl IntoIterator<Item = CourseEnrollment>) -> Self {
        let mut cart = Self::default();
        for enrollment in enrollments {
            if cart.contains(&enrollment.course_id) {
                debug!(course = %enrollment.course_id, "Dropped duplicate enrollment");
                continue;
            }
            cart.enrollments.push(enrollment);
        }
        cart
    }

    /// The enrollments, in the order they were added.
    #[must_use]
    pub fn enrollments(&self) -> &[CourseEnrollment] {
        &self.enrollments
    }

    /// Iterate over the enrollments.
    pub fn iter(&self) -> impl Iterator<Item = &CourseEnrollment> {
        self.enrollments.iter()
    }

    /// Look up an enrollment by course key.
    #[must_use]
    pub fn get(&self, course_id: &str) -> Option<&CourseEnrollment> {
        self.enrollments.iter().find(|e| e.course_id == course_id)
    }

    /// Whether the course is in the cart.
    #[must_use]
    pub fn contains(&self, course_id: &str) -> bool {
        self.get(course_id).is_some()
    }

    /// Number of enrollments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enrollments.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enrollments.is_empty()
    }

    fn position(&self, course_id: &str) -> Result<usize, EnrollmentError> {
        self.enrollments
            .iter()
            .position(|e| e.course_id == course_id)
            .ok_or_else(|| EnrollmentError::NotEnrolled(course_id.to_string()))
    }

    /// Commit the draft picks for a course.
    ///
    /// Picks that clash with a higher-priority pick are left out. If the course
    /// is already in the cart its sections are replaced in place, keeping its
    /// visibility; otherwise a new enrollment is appended.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::TermNotOffered`] if the course has no such
    /// term, or [`EnrollmentError::Incomplete`] if the picks do not make a
    /// complete enrollment.
    pub fn add(
        &mut self,
        course: &Course,
        term_name: &str,
        draft: &SelectionDraft,
    ) -> Result<AddOutcome, EnrollmentError> {
        let course_id = course.key();
        if course.term(term_name).is_none() {
            return Err(EnrollmentError::TermNotOffered {
                course_id,
                term_name: term_name.to_string(),
            });
        }

        let groups = parse_section_types(course, term_name);
        let picked = normalize_sections(draft.selected_sections_for_course(course, term_name), &groups);
        if !is_selection_complete(&groups, &picked) {
            return Err(EnrollmentError::Incomplete(course_id));
        }
        let sections: Vec<Section> = picked.into_iter().cloned().collect();

        if let Some(existing) = self.enrollments.iter_mut().find(|e| e.course_id == course_id) {
            existing.course = course.clone();
            existing.term_name = term_name.to_string();
            existing.selected_sections = sections;
            existing.mark_valid();
            info!(course = %course_id, "Replaced sections");
            return Ok(AddOutcome::Replaced);
        }

        self.enrollments.push(CourseEnrollment::new(
            course.clone(),
            term_name.to_string(),
            sections,
        ));
        info!(course = %course_id, term = term_name, "Added course");
        Ok(AddOutcome::Added)
    }

    /// Remove a course from the cart.
    ///
    /// Returns the removed enrollment, if the course was present.
    pub fn remove(&mut self, course_id: &str) -> Option<CourseEnrollment> {
        let index = self.position(course_id).ok()?;
        info!(course = course_id, "Removed course");
        Some(self.enrollments.remove(index))
    }

    /// Show or hide a course on the calendar.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotEnrolled`] if the course is not in the
    /// cart.
    pub fn toggle_visibility(&mut self, course_id: &str) -> Result<bool, EnrollmentError> {
        let index = self.position(course_id)?;
        let enrollment = &mut self.enrollments[index];
        enrollment.is_visible = !enrollment.is_visible;
        info!(course = course_id, visible = enrollment.is_visible, "Toggled visibility");
        Ok(enrollment.is_visible)
    }

    /// Swap one section of an enrolled course.
    ///
    /// Lower-priority sections that clash with the new one are replaced by
    /// their first compatible alternative.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotEnrolled`],
    /// [`EnrollmentError::UnknownSection`] if the section is not part of the
    /// enrollment's term, or [`EnrollmentError::Refused`] if it clashes with a
    /// higher-priority section.
    pub fn replace_section(
        &mut self,
        course_id: &str,
        section_id: &str,
    ) -> Result<&CourseEnrollment, EnrollmentError> {
        let index = self.position(course_id)?;
        let enrollment = &mut self.enrollments[index];
        let section_type = enrollment
            .course
            .term(&enrollment.term_name)
            .and_then(|term| term.section(section_id))
            .map(|s| s.section_type.clone())
            .ok_or_else(|| EnrollmentError::UnknownSection(section_id.to_string()))?;

        let sections = auto_complete_enrollment_sections(
            &enrollment.selected_sections,
            &section_type,
            section_id,
            &enrollment.course,
            &enrollment.term_name,
        );
        if !sections.iter().any(|s| s.id == section_id) {
            return Err(EnrollmentError::Refused(section_id.to_string()));
        }

        enrollment.selected_sections = sections;
        let checked = check_sections(
            &enrollment.course,
            &enrollment.term_name,
            &enrollment.selected_sections,
        );
        match checked {
            Ok(()) => enrollment.mark_valid(),
            Err(reason) => enrollment.mark_invalid(reason),
        }
        info!(course = course_id, section = section_id, "Replaced section");
        Ok(&*enrollment)
    }

    /// Move one section type of an enrolled course to the next or previous
    /// compatible alternative.
    ///
    /// The alternatives are those offered by [`cyclable_sections`]; the walk
    /// wraps at both ends. Returns the id of the section now chosen.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotEnrolled`] or
    /// [`EnrollmentError::NoAlternatives`] when the type has no candidate.
    pub fn cycle_section(
        &mut self,
        course_id: &str,
        section_type: &SectionType,
        direction: CycleDirection,
    ) -> Result<String, EnrollmentError> {
        let index = self.position(course_id)?;
        let enrollment = &self.enrollments[index];
        let alternatives = cyclable_sections(
            &enrollment.course,
            &enrollment.term_name,
            &enrollment.selected_sections,
            section_type,
        );
        if alternatives.is_empty() {
            return Err(EnrollmentError::NoAlternatives {
                course_id: course_id.to_string(),
                section_type: section_type.clone(),
            });
        }

        let count = alternatives.len();
        let current = enrollment
            .section_of_type(section_type)
            .and_then(|held| alternatives.iter().position(|s| s.id == held.id));
        let next = match (current, direction) {
            (Some(i), CycleDirection::Forward) => (i + 1) % count,
            (Some(i), CycleDirection::Back) => (i + count - 1) % count,
            (None, CycleDirection::Forward) => 0,
            (None, CycleDirection::Back) => count - 1,
        };
        let next_id = alternatives[next].id.clone();

        self.replace_section(course_id, &next_id)?;
        Ok(next_id)
    }

    /// Re-resolve every enrollment against a refreshed catalog.
    ///
    /// Nothing is ever removed. A course that vanished, a term that is no
    /// longer offered, a section id that no longer exists or a pair of sections
    /// that no longer combine marks the enrollment invalid with a reason; the
    /// stale data is kept. Sections that still exist are replaced by their
    /// fresh copies.
    pub fn sync_with_catalog(&mut self, catalog: &Catalog, now: DateTime<Utc>) -> SyncReport {
        let mut report = SyncReport {
            checked: self.enrollments.len(),
            ..SyncReport::default()
        };

        for enrollment in &mut self.enrollments {
            let was_invalid = enrollment.is_invalid;
            enrollment.last_synced = Some(now);

            match sync_enrollment(enrollment, catalog) {
                Ok(()) => {
                    enrollment.mark_valid();
                    if was_invalid {
                        report.recovered.push(enrollment.course_id.clone());
                    }
                }
                Err(reason) => {
                    enrollment.mark_invalid(reason);
                    report.invalid.push(enrollment.course_id.clone());
                }
            }
        }

        info!(
            checked = report.checked,
            invalid = report.invalid.len(),
            "Synced cart with catalog"
        );
        report
    }

    /// Calendar events for every visible enrollment, with conflicts marked.
    #[must_use]
    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        detect_conflicts(&enrollments_to_calendar_events(&self.enrollments))
    }

    /// Spans where visible events overlap.
    #[must_use]
    pub fn conflict_zones(&self) -> Vec<ConflictZone> {
        get_conflict_zones(&enrollments_to_calendar_events(&self.enrollments))
    }

    /// Selected sections of visible enrollments with meetings that have no
    /// time.
    #[must_use]
    pub fn unscheduled(&self) -> Vec<UnscheduledSection> {
        unscheduled_sections(&self.enrollments)
    }

    /// Credits across every enrollment, hidden ones included.
    #[must_use]
    pub fn total_credits(&self) -> f64 {
        self.enrollments.iter().map(|e| e.course.credits).sum()
    }

    /// Number of calendar events that overlap another visible event.
    #[must_use]
    pub fn conflict_count(&self) -> usize {
        self.calendar_events()
            .iter()
            .filter(|e| e.has_conflict)
            .count()
    }

    /// Enrollments flagged by the last sync.
    pub fn invalid(&self) -> impl Iterator<Item = &CourseEnrollment> {
        self.enrollments.iter().filter(|e| e.is_invalid)
    }
}

fn sync_enrollment(enrollment: &mut CourseEnrollment, catalog: &Catalog) -> Result<(), String> {
    let Some(course) = catalog.course(&enrollment.course_id) else {
        return Err(format!("{} is no longer in the catalog", enrollment.course_id));
    };
    let Some(term) = course.term(&enrollment.term_name) else {
        return Err(format!(
            "{} is no longer offered in {}",
            enrollment.course_id, enrollment.term_name
        ));
    };

    let sections: Vec<Section> = enrollment
        .selected_sections
        .iter()
        .map(|stale| term.section(&stale.id).cloned().unwrap_or_else(|| stale.clone()))
        .collect();
    enrollment.course = course.clone();
    enrollment.selected_sections = sections;

    check_sections(course, &enrollment.term_name, &enrollment.selected_sections)
}

/// Every section must exist in the course's term and each pair must combine.
fn check_sections(course: &Course, term_name: &str, sections: &[Section]) -> Result<(), String> {
    let Some(term) = course.term(term_name) else {
        return Err(format!("{} is no longer offered in {term_name}", course.key()));
    };

    let missing: Vec<&str> = sections
        .iter()
        .filter(|s| term.section(&s.id).is_none())
        .map(|s| s.section_code.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(format!("Section {} no longer exists", missing.join(", ")));
    }

    for (i, a) in sections.iter().enumerate() {
        if let Some(b) = sections[i + 1..].iter().find(|b| !are_sections_compatible(a, b)) {
            return Err(format!(
                "Sections {} and {} can no longer be taken together",
                a.section_code, b.section_code
            ));
        }
    }
    Ok(())
}
