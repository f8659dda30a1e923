//! Cohort compatibility between sections and the cascades it drives.
//!
//! Sections whose codes start with a letter belong to that letter's cohort
//! and may only be combined with sections of the same cohort. Sections whose
//! codes start with a dash pair with anything.
//!
//! Constraints flow from higher-priority section types to lower-priority
//! ones: when offering tutorials, only the chosen lecture (and any other
//! higher-priority pick) narrows the choice.

use tracing::debug;

use crate::domain::{
    course::Course,
    section::{Section, SectionType},
    section_types::{SectionTypeGroup, parse_section_types, priority_of},
    selection::SelectionDraft,
};

pub use crate::domain::section::get_section_prefix;

/// Whether two sections may be taken together.
///
/// True when either is a wildcard or both share a cohort letter. Symmetric
/// and reflexive.
#[must_use]
pub fn are_sections_compatible(a: &Section, b: &Section) -> bool {
    match (a.prefix(), b.prefix()) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

/// Candidates split by compatibility with a set of chosen sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorized<'a> {
    /// Candidates compatible with every chosen section.
    pub compatible: Vec<&'a Section>,
    /// Candidates that clash with at least one chosen section.
    pub incompatible: Vec<&'a Section>,
    /// `true` when no candidate is compatible.
    pub has_no_compatible: bool,
}

/// Split `candidates` by compatibility with every section in
/// `already_selected`.
///
/// With nothing selected, every candidate is compatible.
#[must_use]
pub fn categorize_compatible_sections<'a>(
    candidates: &[&'a Section],
    already_selected: &[&Section],
) -> Categorized<'a> {
    let (compatible, incompatible): (Vec<&Section>, Vec<&Section>) = candidates
        .iter()
        .copied()
        .partition(|candidate| {
            already_selected
                .iter()
                .all(|chosen| are_sections_compatible(candidate, chosen))
        });
    let has_no_compatible = compatible.is_empty();
    Categorized {
        compatible,
        incompatible,
        has_no_compatible,
    }
}

/// The chosen sections whose type ranks strictly above `section_type`.
///
/// Sections of types that do not appear in `groups` never constrain.
#[must_use]
pub fn higher_priority_selections<'s>(
    groups: &[SectionTypeGroup<'_>],
    selected: &[&'s Section],
    section_type: &SectionType,
) -> Vec<&'s Section> {
    let Some(priority) = priority_of(groups, section_type) else {
        return Vec::new();
    };
    selected
        .iter()
        .copied()
        .filter(|s| priority_of(groups, &s.section_type).is_some_and(|p| p < priority))
        .collect()
}

/// Categorize the candidates of one type against the higher-priority picks
/// only.
#[must_use]
pub fn categorize_for_type<'a>(
    groups: &[SectionTypeGroup<'a>],
    selected: &[&Section],
    section_type: &SectionType,
) -> Categorized<'a> {
    let candidates = groups
        .iter()
        .find(|g| &g.section_type == section_type)
        .map(|g| g.sections.as_slice())
        .unwrap_or_default();
    let constraints = higher_priority_selections(groups, selected, section_type);
    categorize_compatible_sections(candidates, &constraints)
}

/// Drop draft picks of lower-priority types that clash with a changed pick.
///
/// Only direct incompatibility with the newly chosen section is checked;
/// one call per change is enough. Returns the updated draft.
#[must_use]
pub fn clear_incompatible_lower_selections(
    selections: &SelectionDraft,
    course_key: &str,
    changed_type: &SectionType,
    new_section_id: &str,
    section_types: &[SectionTypeGroup<'_>],
) -> SelectionDraft {
    let mut next = selections.clone();
    let Some(changed_priority) = priority_of(section_types, changed_type) else {
        return next;
    };
    let Some(new_section) = section_types
        .iter()
        .find_map(|g| g.section(new_section_id))
    else {
        return next;
    };

    for group in section_types.iter().filter(|g| g.priority > changed_priority) {
        let Some(current_id) = selections.get(course_key, &group.section_type) else {
            continue;
        };
        let keep = group
            .section(current_id)
            .is_some_and(|current| are_sections_compatible(new_section, current));
        if !keep {
            debug!(
                course = course_key,
                cleared = current_id,
                changed = new_section_id,
                "Cleared incompatible lower-priority selection"
            );
            next.deselect(course_key, &group.section_type);
        }
    }
    next
}

/// Put `new_section_id` into an enrollment's sections and repair the rest.
///
/// The section replaces any held section of `changed_type`. Held sections of
/// lower priority that clash with it are dropped, then every lower-priority
/// type still missing a section receives its first compatible candidate in
/// catalog order. A new section that clashes with a held higher-priority
/// section is refused and the current sections are returned unchanged.
///
/// The result is in priority order, never holds two sections of one type and
/// never holds an incompatible pair. Calling it again with the same arguments
/// returns the same sections.
#[must_use]
pub fn auto_complete_enrollment_sections(
    selected: &[Section],
    changed_type: &SectionType,
    new_section_id: &str,
    course: &Course,
    term_name: &str,
) -> Vec<Section> {
    let groups = parse_section_types(course, term_name);
    let Some(changed_priority) = priority_of(&groups, changed_type) else {
        debug!(%changed_type, "Section type not offered in term");
        return normalize(selected, &groups);
    };
    let Some(new_section) = groups[changed_priority].section(new_section_id) else {
        debug!(new_section_id, "Section not found in term");
        return normalize(selected, &groups);
    };

    let held: Vec<&Section> = selected
        .iter()
        .filter(|s| &s.section_type != changed_type)
        .collect();
    let blocked = held.iter().any(|s| {
        priority_of(&groups, &s.section_type).is_some_and(|p| p < changed_priority)
            && !are_sections_compatible(s, new_section)
    });
    if blocked {
        debug!(new_section_id, "Refused section incompatible with higher-priority choice");
        return normalize(selected, &groups);
    }

    let mut next: Vec<&Section> = held
        .into_iter()
        .filter(|s| {
            let lower = priority_of(&groups, &s.section_type).is_none_or(|p| p > changed_priority);
            !lower || are_sections_compatible(s, new_section)
        })
        .collect();
    next.push(new_section);

    for group in groups.iter().filter(|g| g.priority > changed_priority) {
        if next.iter().any(|s| s.section_type == group.section_type) {
            continue;
        }
        let fill = group
            .sections
            .iter()
            .copied()
            .find(|candidate| next.iter().all(|s| are_sections_compatible(candidate, s)));
        if let Some(fill) = fill {
            debug!(section = %fill.section_code, "Auto-completed section");
            next.push(fill);
        }
    }

    normalize_refs(next, &groups)
}

/// Whether the draft picks for a course make an enrollment that can be added.
///
/// At least one section must be picked, and every section type must either be
/// picked or have no candidate compatible with the higher-priority picks.
#[must_use]
pub fn is_course_enrollment_complete(
    course: &Course,
    term_name: &str,
    selections: &SelectionDraft,
) -> bool {
    let selected = selections.selected_sections_for_course(course, term_name);
    is_selection_complete(&parse_section_types(course, term_name), &selected)
}

/// Completeness check over already-resolved sections.
///
/// See [`is_course_enrollment_complete`].
#[must_use]
pub fn is_selection_complete(groups: &[SectionTypeGroup<'_>], selected: &[&Section]) -> bool {
    if selected.is_empty() {
        return false;
    }
    groups.iter().all(|group| {
        selected.iter().any(|s| s.section_type == group.section_type)
            || categorize_for_type(groups, selected, &group.section_type).has_no_compatible
    })
}

/// The alternatives offered when cycling one section type of an enrollment.
///
/// These are the candidates compatible with the higher-priority sections
/// only, so switching to any of them keeps the higher-priority choices.
#[must_use]
pub fn cyclable_sections<'a>(
    course: &'a Course,
    term_name: &str,
    selected: &[Section],
    section_type: &SectionType,
) -> Vec<&'a Section> {
    let groups = parse_section_types(course, term_name);
    let selected: Vec<&Section> = selected.iter().collect();
    categorize_for_type(&groups, &selected, section_type).compatible
}

/// Order sections by priority, keep one section per type and drop any
/// section that clashes with one already kept.
///
/// Higher-priority sections win every clash. Sections of types missing from
/// `groups` sort last.
#[must_use]
pub fn normalize_sections<'a>(
    mut sections: Vec<&'a Section>,
    groups: &[SectionTypeGroup<'_>],
) -> Vec<&'a Section> {
    sections.sort_by_key(|s| priority_of(groups, &s.section_type).unwrap_or(usize::MAX));

    let mut kept: Vec<&Section> = Vec::with_capacity(sections.len());
    for section in sections {
        let duplicate_type = kept.iter().any(|k| k.section_type == section.section_type);
        if !duplicate_type && kept.iter().all(|k| are_sections_compatible(k, section)) {
            kept.push(section);
        }
    }
    kept
}

fn normalize(selected: &[Section], groups: &[SectionTypeGroup<'_>]) -> Vec<Section> {
    normalize_refs(selected.iter().collect(), groups)
}

fn normalize_refs(sections: Vec<&Section>, groups: &[SectionTypeGroup<'_>]) -> Vec<Section> {
    normalize_sections(sections, groups)
        .into_iter()
        .cloned()
        .collect()
}
