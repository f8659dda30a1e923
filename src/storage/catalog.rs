//! Ingestion of per-subject catalog documents.
//!
//! A document is decoded into loosely-typed raw structs first, then validated
//! and normalized into domain types in one pass. Either the whole document
//! converts or an error naming the offending field is returned.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::{
    Availability, AvailabilityStatus, Catalog, Course, Meeting, Section, Term,
    catalog::DuplicateCourseError,
    course_key,
    section::{section_type_of, split_section_label},
};

const UNSCHEDULED: &str = "TBA";
const UNKNOWN: &str = "TBD";

/// Errors raised while reading catalog documents.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The JSON could not be decoded into the document shape.
    #[error("invalid catalog JSON at '{}': {}", .0.path(), .0.inner())]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),
    /// A required field is absent.
    #[error("missing required field '{0}'")]
    Missing(String),
    /// A required string field is blank.
    #[error("field '{0}' must not be empty")]
    Empty(String),
    /// A numeric field holds something that is not a number.
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        /// Path of the field.
        field: String,
        /// Offending value.
        value: String,
    },
    /// An availability status that is not recognised.
    #[error("field '{field}' has unknown status '{value}'")]
    InvalidStatus {
        /// Path of the field.
        field: String,
        /// Offending value.
        value: String,
    },
    /// The declared course count disagrees with the course list.
    #[error("metadata.total_courses is {declared} but the document has {actual} courses")]
    CountMismatch {
        /// Declared count.
        declared: usize,
        /// Actual number of courses.
        actual: usize,
    },
    /// A course belongs to a different subject than the document.
    #[error("field '{field}' is '{found}' but the document subject is '{expected}'")]
    SubjectMismatch {
        /// Path of the field.
        field: String,
        /// Document subject.
        expected: String,
        /// Course subject.
        found: String,
    },
    /// Two sections of one term share a code.
    #[error("field '{field}' repeats section '{code}'")]
    DuplicateSection {
        /// Path of the field.
        field: String,
        /// Repeated section code.
        code: String,
    },
    /// Two documents define the same course.
    #[error(transparent)]
    DuplicateCourse(#[from] DuplicateCourseError),
    /// A document in a catalog directory failed.
    #[error("{}: {source}", .path.display())]
    InFile {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: Box<Self>,
    },
}

/// A validated subject document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDocument {
    /// Subject code shared by every course.
    pub subject: String,
    /// The subject's courses, in document order.
    pub courses: Vec<Course>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    metadata: Option<RawMetadata>,
    courses: Option<Vec<RawCourse>>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    subject: Option<String>,
    total_courses: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawCourse {
    subject: Option<String>,
    course_code: Option<String>,
    title: Option<String>,
    credits: Option<RawNumber>,
    description: Option<String>,
    enrollment_requirement: Option<String>,
    #[serde(default)]
    terms: Vec<RawTerm>,
}

#[derive(Debug, Deserialize)]
struct RawTerm {
    term_code: Option<String>,
    term_name: Option<String>,
    #[serde(default)]
    schedule: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    section: Option<String>,
    #[serde(default)]
    meetings: Vec<RawMeeting>,
    availability: Option<RawAvailability>,
    class_attributes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMeeting {
    time: Option<String>,
    location: Option<String>,
    instructor: Option<String>,
    dates: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAvailability {
    capacity: Option<RawNumber>,
    enrolled: Option<RawNumber>,
    available_seats: Option<RawNumber>,
    waitlist_capacity: Option<RawNumber>,
    waitlist_total: Option<RawNumber>,
    status: Option<String>,
}

/// Scraped numbers arrive as strings, occasionally as JSON numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// A non-negative finite amount. `f64::from_str` accepts `NaN` and
    /// `inf`, so those are rejected here along with negative values.
    fn parse(value: Option<&Self>, field: &str) -> Result<f64, CatalogError> {
        let (n, raw) = match value {
            None => return Ok(0.0),
            Some(Self::Integer(_)) => return Self::parse_count(value, field).map(f64::from),
            Some(Self::Float(n)) => (*n, n.to_string()),
            Some(Self::Text(text)) => (
                parse_text(text, field)?.unwrap_or(0.0),
                text.trim().to_string(),
            ),
        };
        if n.is_finite() && n >= 0.0 {
            Ok(n)
        } else {
            Err(CatalogError::InvalidNumber {
                field: field.to_string(),
                value: raw,
            })
        }
    }

    fn parse_count(value: Option<&Self>, field: &str) -> Result<u32, CatalogError> {
        let invalid = |value: String| CatalogError::InvalidNumber {
            field: field.to_string(),
            value,
        };
        match value {
            None => Ok(0),
            Some(Self::Integer(n)) => u32::try_from(*n).map_err(|_| invalid(n.to_string())),
            Some(Self::Float(n)) => Err(invalid(n.to_string())),
            Some(Self::Text(text)) => parse_text(text, field).map(Option::unwrap_or_default),
        }
    }
}

/// Parse a numeric string; blank means absent.
fn parse_text<T: std::str::FromStr>(text: &str, field: &str) -> Result<Option<T>, CatalogError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| CatalogError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    })
}

/// Decode and validate one subject document.
///
/// # Errors
///
/// Returns [`CatalogError::Json`] if the JSON does not have the document
/// shape, or another [`CatalogError`] variant naming the field that failed
/// validation.
pub fn parse_subject_document(json: &str) -> Result<SubjectDocument, CatalogError> {
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    let raw: RawDocument = serde_path_to_error::deserialize(deserializer)?;
    raw.validate()
}

impl RawDocument {
    fn validate(self) -> Result<SubjectDocument, CatalogError> {
        let metadata = self
            .metadata
            .ok_or_else(|| CatalogError::Missing("metadata".to_string()))?;
        let subject = required(metadata.subject, "metadata.subject")?;
        let raw_courses = self
            .courses
            .ok_or_else(|| CatalogError::Missing("courses".to_string()))?;

        if let Some(declared) = metadata.total_courses.filter(|&n| n != raw_courses.len()) {
            return Err(CatalogError::CountMismatch {
                declared,
                actual: raw_courses.len(),
            });
        }

        let courses = raw_courses
            .into_iter()
            .enumerate()
            .map(|(i, course)| course.validate(&subject, &format!("courses[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(%subject, courses = courses.len(), "Validated subject document");
        Ok(SubjectDocument { subject, courses })
    }
}

impl RawCourse {
    fn validate(self, document_subject: &str, path: &str) -> Result<Course, CatalogError> {
        let subject = required(self.subject, &format!("{path}.subject"))?;
        if subject != document_subject {
            return Err(CatalogError::SubjectMismatch {
                field: format!("{path}.subject"),
                expected: document_subject.to_string(),
                found: subject,
            });
        }
        let course_code = required(self.course_code, &format!("{path}.course_code"))?;
        let title = required(self.title, &format!("{path}.title"))?;
        let credits = RawNumber::parse(self.credits.as_ref(), &format!("{path}.credits"))?;
        let key = course_key(&subject, &course_code);

        let terms = self
            .terms
            .into_iter()
            .enumerate()
            .map(|(j, term)| term.validate(&key, &format!("{path}.terms[{j}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Course {
            subject,
            course_code,
            title,
            credits,
            description: optional(self.description),
            prerequisites: optional(self.enrollment_requirement),
            terms,
        })
    }
}

impl RawTerm {
    fn validate(self, course_key: &str, path: &str) -> Result<Term, CatalogError> {
        let term_name = required(self.term_name, &format!("{path}.term_name"))?;
        let mut sections: Vec<Section> = Vec::with_capacity(self.schedule.len());
        for (k, raw) in self.schedule.into_iter().enumerate() {
            let field = format!("{path}.schedule[{k}]");
            let section = raw.validate(course_key, &field)?;
            if sections.iter().any(|s| s.id == section.id) {
                return Err(CatalogError::DuplicateSection {
                    field: format!("{field}.section"),
                    code: section.section_code,
                });
            }
            sections.push(section);
        }

        Ok(Term {
            term_code: self.term_code.unwrap_or_default().trim().to_string(),
            term_name,
            sections,
        })
    }
}

impl RawSection {
    fn validate(self, course_key: &str, path: &str) -> Result<Section, CatalogError> {
        let label = required(self.section, &format!("{path}.section"))?;
        let (code, class_number) = split_section_label(&label);
        if code.is_empty() {
            return Err(CatalogError::Empty(format!("{path}.section")));
        }

        let availability = self
            .availability
            .map(|a| a.validate(&format!("{path}.availability")))
            .transpose()?
            .unwrap_or_default();

        Ok(Section {
            id: Section::make_id(course_key, code),
            section_code: code.to_string(),
            class_number,
            section_type: section_type_of(code),
            meetings: self.meetings.into_iter().map(RawMeeting::normalize).collect(),
            availability,
            class_attributes: optional(self.class_attributes),
        })
    }
}

impl RawMeeting {
    fn normalize(self) -> Meeting {
        Meeting {
            time: or_default(self.time, UNSCHEDULED),
            location: or_default(self.location, UNKNOWN),
            instructor: or_default(self.instructor, UNKNOWN),
            dates: or_default(self.dates, UNKNOWN),
        }
    }
}

impl RawAvailability {
    fn validate(self, path: &str) -> Result<Availability, CatalogError> {
        let count = |value: Option<&RawNumber>, name: &str| {
            RawNumber::parse_count(value, &format!("{path}.{name}"))
        };
        let capacity = count(self.capacity.as_ref(), "capacity")?;
        let enrolled = count(self.enrolled.as_ref(), "enrolled")?;
        let available_seats = count(self.available_seats.as_ref(), "available_seats")?;
        let waitlist_capacity = count(self.waitlist_capacity.as_ref(), "waitlist_capacity")?;
        let waitlist_total = count(self.waitlist_total.as_ref(), "waitlist_total")?;

        let label = self.status.unwrap_or_default();
        let status = if label.trim().is_empty() {
            AvailabilityStatus::from_counts(available_seats, waitlist_total)
        } else {
            AvailabilityStatus::from_label(&label).ok_or_else(|| CatalogError::InvalidStatus {
                field: format!("{path}.status"),
                value: label.clone(),
            })?
        };

        Ok(Availability {
            capacity,
            enrolled,
            available_seats,
            status,
            waitlist_capacity,
            waitlist_total,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, CatalogError> {
    let value = value.ok_or_else(|| CatalogError::Missing(field.to_string()))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::Empty(field.to_string()));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    optional(value).unwrap_or_else(|| default.to_string())
}

/// Read and validate one subject document from disk.
///
/// # Errors
///
/// Returns [`CatalogError::Read`] if the file cannot be read, or the
/// validation error of [`parse_subject_document`].
pub fn load_subject_file(path: &Path) -> Result<SubjectDocument, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_subject_document(&json)
}

/// Load every `*.json` document directly inside `dir` into one catalog.
///
/// Files are read in name order. A missing directory gives an empty catalog.
///
/// # Errors
///
/// Returns [`CatalogError::InFile`] wrapping the first document that fails,
/// or [`CatalogError::DuplicateCourse`] if two documents define the same
/// course.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog, CatalogError> {
    if !dir.is_dir() {
        debug!("No catalog directory at {}", dir.display());
        return Ok(Catalog::default());
    }

    let mut catalog = Catalog::default();
    for path in collect_json_paths(dir) {
        let document = load_subject_file(&path).map_err(|source| CatalogError::InFile {
            path: path.clone(),
            source: Box::new(source),
        })?;
        debug!(subject = %document.subject, "Loaded {}", path.display());
        for course in document.courses {
            catalog.insert(course)?;
        }
    }

    info!(courses = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

fn collect_json_paths(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("json")))
        .map(walkdir::DirEntry::into_path)
        .collect()
}
