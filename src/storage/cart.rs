//! Versioned persistence of the cart.
//!
//! The cart file is `{ "version": 2, "enrollments": [...], "savedAt": ... }`.
//! Version 1 files are migrated on load. Files with any other version, or
//! that cannot be decoded, are discarded and the cart starts empty.

use std::{io, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Cart, Course, CourseEnrollment, Section};

/// The version written by [`save_cart`].
pub const CURRENT_VERSION: u64 = 2;

/// Errors reading or writing the cart file.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The file exists but could not be read.
    #[error("failed to read cart file: {0}")]
    Read(#[source] io::Error),
    /// The cart could not be encoded.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
    /// The file could not be written.
    #[error("failed to write cart file: {0}")]
    Write(#[source] io::Error),
}

/// How a cart file was turned into a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No file; the cart is empty.
    Missing,
    /// A current-version file.
    Loaded,
    /// An older file, upgraded on load.
    Migrated {
        /// Version found in the file.
        from: u64,
    },
    /// The file was unusable and ignored; the cart is empty.
    Discarded {
        /// Why the file was ignored.
        reason: String,
    },
}

/// A cart read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCart {
    /// The cart.
    pub cart: Cart,
    /// When the file was written, if known.
    pub saved_at: Option<DateTime<Utc>>,
    /// How the file was handled.
    pub status: LoadStatus,
}

impl LoadedCart {
    fn empty(status: LoadStatus) -> Self {
        Self {
            cart: Cart::default(),
            saved_at: None,
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    version: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartFileRef<'a> {
    version: u64,
    enrollments: &'a [CourseEnrollment],
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartFileV2 {
    enrollments: Vec<CourseEnrollment>,
    saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartFileV1 {
    enrollments: Vec<EnrollmentV1>,
    saved_at: Option<DateTime<Utc>>,
}

/// Version 1 enrollments: no visibility flag, an optional colour and a
/// `courseId` that may have been generated from a timestamp.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentV1 {
    course: Course,
    term_name: Option<String>,
    #[serde(default)]
    selected_sections: Vec<Section>,
    #[serde(default)]
    is_invalid: bool,
    invalid_reason: Option<String>,
    last_synced: Option<DateTime<Utc>>,
}

impl EnrollmentV1 {
    fn migrate(self) -> CourseEnrollment {
        let term_name = self.term_name.unwrap_or_else(|| {
            infer_term(&self.course, &self.selected_sections).unwrap_or_default()
        });
        let mut enrollment = CourseEnrollment::new(self.course, term_name, self.selected_sections);
        enrollment.is_invalid = self.is_invalid;
        enrollment.invalid_reason = self.invalid_reason;
        enrollment.last_synced = self.last_synced;
        enrollment
    }
}

/// The term holding the first selected section, else the course's first term.
fn infer_term(course: &Course, sections: &[Section]) -> Option<String> {
    sections
        .first()
        .and_then(|first| {
            course
                .terms
                .iter()
                .find(|t| t.section(&first.id).is_some())
        })
        .or_else(|| course.terms.first())
        .map(|t| t.term_name.clone())
}

/// Decode cart JSON, migrating or discarding as needed.
///
/// Never fails: an unusable document yields an empty cart with
/// [`LoadStatus::Discarded`].
#[must_use]
pub fn parse_cart(json: &str) -> LoadedCart {
    let version = match serde_json::from_str::<Envelope>(json) {
        Ok(Envelope {
            version: Some(version),
        }) => version.as_u64(),
        Ok(Envelope { version: None }) => None,
        Err(e) => return discard(format!("not a cart file: {e}")),
    };

    match version {
        Some(CURRENT_VERSION) => match decode::<CartFileV2>(json) {
            Ok(file) => LoadedCart {
                cart: Cart::from_enrollments(file.enrollments),
                saved_at: file.saved_at,
                status: LoadStatus::Loaded,
            },
            Err(reason) => discard(reason),
        },
        Some(1) => match decode::<CartFileV1>(json) {
            Ok(file) => {
                info!(enrollments = file.enrollments.len(), "Migrated version 1 cart");
                LoadedCart {
                    cart: Cart::from_enrollments(
                        file.enrollments.into_iter().map(EnrollmentV1::migrate),
                    ),
                    saved_at: file.saved_at,
                    status: LoadStatus::Migrated { from: 1 },
                }
            }
            Err(reason) => discard(reason),
        },
        Some(other) => discard(format!("unknown cart version {other}")),
        None => discard("cart file has no version".to_string()),
    }
}

fn decode<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, String> {
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(deserializer)
        .map_err(|e| format!("invalid cart at '{}': {}", e.path(), e.inner()))
}

fn discard(reason: String) -> LoadedCart {
    warn!(%reason, "Discarding saved cart");
    LoadedCart::empty(LoadStatus::Discarded { reason })
}

/// Read the cart file at `path`.
///
/// A missing file gives an empty cart.
///
/// # Errors
///
/// Returns [`CartError::Read`] if the file exists but cannot be read.
pub fn load_cart(path: &Path) -> Result<LoadedCart, CartError> {
    match std::fs::read_to_string(path) {
        Ok(json) => Ok(parse_cart(&json)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No cart file at {}", path.display());
            Ok(LoadedCart::empty(LoadStatus::Missing))
        }
        Err(e) => Err(CartError::Read(e)),
    }
}

/// Encode a cart at the current version.
///
/// # Errors
///
/// Returns [`CartError::Encode`] if serialization fails.
pub fn cart_to_json(cart: &Cart, saved_at: DateTime<Utc>) -> Result<String, CartError> {
    let file = CartFileRef {
        version: CURRENT_VERSION,
        enrollments: cart.enrollments(),
        saved_at,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Write the cart to `path` at the current version.
///
/// # Errors
///
/// Returns [`CartError`] if the cart cannot be encoded or written.
pub fn save_cart(path: &Path, cart: &Cart, saved_at: DateTime<Utc>) -> Result<(), CartError> {
    let json = cart_to_json(cart, saved_at)?;
    std::fs::write(path, json).map_err(CartError::Write)?;
    debug!(enrollments = cart.len(), "Saved cart to {}", path.display());
    Ok(())
}
