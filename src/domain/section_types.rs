//! Grouping of a term's sections by section type.
//!
//! The priority of a section type is the position of its first section in the
//! term's catalog order. Nothing about the types themselves is ranked, so two
//! courses may order the same set of types differently.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{
    course::{Course, Term},
    section::{Section, SectionType},
};

/// The sections of one type within a term, with the type's priority.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTypeGroup<'a> {
    /// The section type shared by every section in the group.
    pub section_type: SectionType,
    /// The sections, in catalog order.
    pub sections: Vec<&'a Section>,
    /// 0 for the type that appears first in the catalog, then 1, 2, ...
    pub priority: usize,
}

impl SectionTypeGroup<'_> {
    /// Human-readable name of the group's type.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.section_type.display_name()
    }

    /// Pictogram of the group's type.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        self.section_type.icon()
    }

    /// Find a section of this group by id.
    #[must_use]
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().copied().find(|s| s.id == section_id)
    }
}

/// Group the sections of `term_name` by type, in priority order.
///
/// Returns an empty list when the course is not offered in that term.
#[must_use]
pub fn parse_section_types<'a>(course: &'a Course, term_name: &str) -> Vec<SectionTypeGroup<'a>> {
    course
        .term(term_name)
        .map(group_term_sections)
        .unwrap_or_default()
}

/// Group the sections of a term by type, in priority order.
#[must_use]
pub fn group_term_sections(term: &Term) -> Vec<SectionTypeGroup<'_>> {
    let mut first_seen: HashMap<&SectionType, usize> = HashMap::new();
    let mut groups: Vec<SectionTypeGroup<'_>> = Vec::new();

    // Groups are pushed in order of first occurrence, so the push index is
    // the priority.
    for section in &term.sections {
        if let Some(&slot) = first_seen.get(&section.section_type) {
            groups[slot].sections.push(section);
        } else {
            let priority = groups.len();
            first_seen.insert(&section.section_type, priority);
            groups.push(SectionTypeGroup {
                section_type: section.section_type.clone(),
                sections: vec![section],
                priority,
            });
        }
    }

    debug!(
        term = %term.term_name,
        order = ?groups.iter().map(|g| g.section_type.code()).collect::<Vec<_>>(),
        "Grouped sections by type"
    );
    groups
}

/// The priority of `section_type` within `groups`, if present.
#[must_use]
pub fn priority_of(groups: &[SectionTypeGroup<'_>], section_type: &SectionType) -> Option<usize> {
    groups
        .iter()
        .find(|g| &g.section_type == section_type)
        .map(|g| g.priority)
}
