//! Term search index over the catalog.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{
    catalog::Catalog,
    course::{Course, Term},
};

const PLACEHOLDER_INSTRUCTORS: [&str; 3] = ["", "TBA", "TBD"];

/// A lightweight listing of a course offered in one term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    /// Course key.
    pub id: String,
    /// Subject code.
    pub subject: String,
    /// Course code.
    pub code: String,
    /// Title.
    pub title: String,
    /// Credit units.
    pub credits: f64,
    /// Distinct instructors teaching in the term, sorted.
    pub instructors: Vec<String>,
    /// Number of sections offered in the term.
    pub section_count: usize,
    /// Whether the course has a description.
    pub has_description: bool,
    /// Whether the course lists enrollment requirements.
    pub has_prerequisites: bool,
}

impl CourseSummary {
    /// Summarize a course for one of its terms.
    #[must_use]
    pub fn new(course: &Course, term: &Term) -> Self {
        let instructors: BTreeSet<&str> = term
            .sections
            .iter()
            .flat_map(|s| &s.meetings)
            .map(|m| m.instructor.trim())
            .filter(|name| !PLACEHOLDER_INSTRUCTORS.contains(name))
            .collect();

        Self {
            id: course.key(),
            subject: course.subject.clone(),
            code: course.course_code.clone(),
            title: course.title.clone(),
            credits: course.credits,
            instructors: instructors.into_iter().map(str::to_string).collect(),
            section_count: term.sections.len(),
            has_description: has_text(course.description.as_deref()),
            has_prerequisites: has_text(course.prerequisites.as_deref()),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        let spaced = format!("{} {}", self.subject, self.code);
        [self.id.as_str(), spaced.as_str(), self.title.as_str()]
            .into_iter()
            .chain(self.instructors.iter().map(String::as_str))
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Summaries of every course offered in `term_name`, ordered by key.
#[must_use]
pub fn term_index(catalog: &Catalog, term_name: &str) -> Vec<CourseSummary> {
    catalog
        .courses()
        .filter_map(|course| {
            let term = course.term(term_name)?;
            Some(CourseSummary::new(course, term))
        })
        .collect()
}

/// Courses offered in `term_name` matching `query`.
///
/// The query is matched case-insensitively against the course key, the
/// `"SUBJECT CODE"` form, the title and the instructors. A blank query
/// matches everything.
#[must_use]
pub fn search_courses(catalog: &Catalog, query: &str, term_name: &str) -> Vec<CourseSummary> {
    let needle = query.trim().to_lowercase();
    term_index(catalog, term_name)
        .into_iter()
        .filter(|summary| needle.is_empty() || summary.matches(&needle))
        .collect()
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}
