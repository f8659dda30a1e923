//! In-progress section picks for courses that are not yet in the cart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    compatibility::clear_incompatible_lower_selections,
    course::Course,
    section::{Section, SectionType},
    section_types::parse_section_types,
};

/// Draft selections keyed by `<courseKey>_<sectionType>`, mapping to a
/// section id.
///
/// The flat key shape is shared with persisted drafts and must not change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionDraft {
    entries: BTreeMap<String, String>,
}

impl SelectionDraft {
    /// Build the key for a course and section type, e.g. `"CSCI3100_LEC"`.
    #[must_use]
    pub fn key(course_key: &str, section_type: &SectionType) -> String {
        format!("{course_key}_{}", section_type.code())
    }

    /// The selected section id for a course and type.
    #[must_use]
    pub fn get(&self, course_key: &str, section_type: &SectionType) -> Option<&str> {
        self.entries
            .get(&Self::key(course_key, section_type))
            .map(String::as_str)
    }

    /// Record a pick, replacing any previous pick of the same type.
    pub fn select(&mut self, course_key: &str, section_type: &SectionType, section_id: String) {
        self.entries
            .insert(Self::key(course_key, section_type), section_id);
    }

    /// Remove the pick for a course and type.
    ///
    /// Returns the removed section id.
    pub fn deselect(&mut self, course_key: &str, section_type: &SectionType) -> Option<String> {
        self.entries.remove(&Self::key(course_key, section_type))
    }

    /// Remove every pick belonging to a course.
    pub fn clear_course(&mut self, course_key: &str) {
        let prefix = format!("{course_key}_");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Resolve the picks for a course in a term to sections, in priority
    /// order.
    ///
    /// Picks that no longer name a section of the term are skipped.
    #[must_use]
    pub fn selected_sections_for_course<'a>(
        &self,
        course: &'a Course,
        term_name: &str,
    ) -> Vec<&'a Section> {
        let course_key = course.key();
        parse_section_types(course, term_name)
            .into_iter()
            .filter_map(|group| {
                let id = self.get(&course_key, &group.section_type)?;
                group.sections.into_iter().find(|s| s.id == id)
            })
            .collect()
    }

    /// Record a pick and drop lower-priority picks that are incompatible with
    /// it.
    ///
    /// Returns the updated draft; `self` is left untouched.
    #[must_use]
    pub fn select_with_cascade(&self, course: &Course, term_name: &str, section: &Section) -> Self {
        let course_key = course.key();
        let mut next = self.clone();
        next.select(&course_key, &section.section_type, section.id.clone());

        let groups = parse_section_types(course, term_name);
        clear_incompatible_lower_selections(
            &next,
            &course_key,
            &section.section_type,
            &section.id,
            &groups,
        )
    }
}
