//! Course timetable planning.
//!
//! Students pick sections of catalog courses into a cart. The planner keeps
//! sections of one course within a single cohort, fills in the lower-priority
//! sections a choice implies, lays the cart out as weekly calendar events and
//! flags time conflicts.

pub mod domain;
pub use domain::{Cart, Catalog, Config, Course, CourseEnrollment, Section, SelectionDraft};

/// Filesystem storage for catalogs, carts and configuration.
pub mod storage;
pub use storage::Workspace;
