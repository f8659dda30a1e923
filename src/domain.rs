//! Domain models for course planning.
//!
//! Everything in this module is a pure transformation of its inputs: the
//! catalog is an immutable snapshot, and drafts and carts are plain values
//! owned by the caller.

pub mod calendar;
pub mod catalog;
pub mod color;
pub mod compatibility;
pub mod conflict;
/// Courses and their term offerings.
pub mod course;
pub mod enrollment;
pub mod search;
pub mod section;
pub mod section_types;
pub mod selection;
pub mod time;

mod config;

pub use calendar::{CalendarEvent, UnscheduledSection};
pub use catalog::Catalog;
pub use color::get_deterministic_color;
pub use config::{Config, ConfigError};
pub use conflict::ConflictZone;
pub use course::{Course, Term, course_key};
pub use enrollment::{AddOutcome, Cart, CourseEnrollment, CycleDirection, EnrollmentError, SyncReport};
pub use search::CourseSummary;
pub use section::{Availability, AvailabilityStatus, Meeting, Section, SectionType};
pub use selection::SelectionDraft;
pub use time::{TimeRange, Weekday};
