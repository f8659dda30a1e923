//! An immutable snapshot of the course catalog.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::course::Course;

/// Every known course, indexed by course key.
///
/// A catalog is built once from validated documents and then only read. A
/// refresh produces a new catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    courses: BTreeMap<String, Course>,
}

/// Error returned when a course key is already present.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Duplicate course '{0}' in catalog")]
pub struct DuplicateCourseError(pub String);

impl Catalog {
    /// Build a catalog from courses.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateCourseError`] if two courses share a key.
    pub fn from_courses(
        courses: impl IntoIterator<Item = Course>,
    ) -> Result<Self, DuplicateCourseError> {
        let mut catalog = Self::default();
        for course in courses {
            catalog.insert(course)?;
        }
        Ok(catalog)
    }

    /// Add a course.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateCourseError`] if the key is already present.
    pub fn insert(&mut self, course: Course) -> Result<(), DuplicateCourseError> {
        let key = course.key();
        if self.courses.contains_key(&key) {
            return Err(DuplicateCourseError(key));
        }
        self.courses.insert(key, course);
        Ok(())
    }

    /// Look up a course by key.
    #[must_use]
    pub fn course(&self, key: &str) -> Option<&Course> {
        self.courses.get(key)
    }

    /// All courses, ordered by key.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Number of courses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog has no courses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Distinct term names across all courses, sorted.
    #[must_use]
    pub fn available_terms(&self) -> Vec<String> {
        self.courses
            .values()
            .flat_map(|c| &c.terms)
            .map(|t| t.term_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::Term;

    fn course(subject: &str, code: &str, terms: &[&str]) -> Course {
        Course {
            subject: subject.to_string(),
            course_code: code.to_string(),
            title: format!("{subject} {code}"),
            credits: 3.0,
            description: None,
            prerequisites: None,
            terms: terms
                .iter()
                .map(|name| Term {
                    term_code: String::new(),
                    term_name: (*name).to_string(),
                    sections: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn rejects_duplicate_keys() {
        let error = Catalog::from_courses([
            course("CSCI", "3100", &[]),
            course("CSCI", "3100", &[]),
        ])
        .unwrap_err();
        assert_eq!(error, DuplicateCourseError("CSCI3100".to_string()));
    }

    #[test]
    fn lists_terms_once() {
        let catalog = Catalog::from_courses([
            course("CSCI", "3100", &["2025-26 Term 2", "2025-26 Term 1"]),
            course("MATH", "1010", &["2025-26 Term 1", ""]),
        ])
        .unwrap();
        assert_eq!(
            catalog.available_terms(),
            vec!["2025-26 Term 1".to_string(), "2025-26 Term 2".to_string()]
        );
        assert_eq!(catalog.len(), 2);
        assert!(catalog.course("MATH1010").is_some());
    }
}
