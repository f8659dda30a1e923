use serde::{Deserialize, Serialize};

use crate::domain::section::Section;

/// A course in the catalog, with its offerings per term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Subject code, e.g. `"CSCI"`.
    pub subject: String,
    /// Course number within the subject, e.g. `"3100"`.
    pub course_code: String,
    /// Course title.
    pub title: String,
    /// Credit units.
    pub credits: f64,
    /// Catalog description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Enrollment requirements, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<String>,
    /// Terms in which the course is offered.
    pub terms: Vec<Term>,
}

/// A course offering in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Registrar term code, e.g. `"2390"`.
    pub term_code: String,
    /// Display name, e.g. `"2025-26 Term 1"`.
    pub term_name: String,
    /// Sections in catalog order.
    pub sections: Vec<Section>,
}

impl Course {
    /// The identity key of the course: subject and code concatenated.
    ///
    /// ```
    /// # use planner::domain::course_key;
    /// assert_eq!(course_key("CSCI", "3100"), "CSCI3100");
    /// ```
    #[must_use]
    pub fn key(&self) -> String {
        course_key(&self.subject, &self.course_code)
    }

    /// Find a term by exact name.
    #[must_use]
    pub fn term(&self, term_name: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.term_name == term_name)
    }
}

impl Term {
    /// Find a section by id.
    #[must_use]
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Find a section by its code (e.g. `"A-LEC"`).
    #[must_use]
    pub fn section_by_code(&self, section_code: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.section_code == section_code)
    }
}

/// Build a course key from subject and course code.
///
/// Case-sensitive, no separator.
#[must_use]
pub fn course_key(subject: &str, course_code: &str) -> String {
    format!("{subject}{course_code}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::section::{Availability, SectionType};

    fn course() -> Course {
        let section = |code: &str, section_type| Section {
            id: Section::make_id("CSCI3100", code),
            section_code: code.to_string(),
            class_number: None,
            section_type,
            meetings: Vec::new(),
            availability: Availability::default(),
            class_attributes: None,
        };
        Course {
            subject: "CSCI".to_string(),
            course_code: "3100".to_string(),
            title: "Software Engineering".to_string(),
            credits: 3.0,
            description: None,
            prerequisites: None,
            terms: vec![
                Term {
                    term_code: "2380".to_string(),
                    term_name: "2025-26 Term 1".to_string(),
                    sections: vec![section("A-LEC", SectionType::Lec)],
                },
                Term {
                    term_code: "2390".to_string(),
                    term_name: "2025-26 Term 2".to_string(),
                    sections: vec![section("--LAB", SectionType::Lab)],
                },
            ],
        }
    }

    #[test]
    fn key_concatenates_without_separator() {
        assert_eq!(course().key(), "CSCI3100");
        assert_ne!(course_key("csci", "3100"), course_key("CSCI", "3100"));
    }

    #[test]
    fn term_lookup_is_exact() {
        let course = course();
        assert!(course.term("2025-26 Term 1").is_some());
        assert!(course.term("2025-26 term 1").is_none());
    }

    #[test]
    fn section_lookup() {
        let course = course();
        let term = course.term("2025-26 Term 1").unwrap();
        assert_eq!(term.section("CSCI3100_A-LEC").unwrap().section_code, "A-LEC");
        assert_eq!(term.section_by_code("A-LEC").unwrap().id, "CSCI3100_A-LEC");
        assert!(term.section("CSCI3100_--LAB").is_none());
    }
}
