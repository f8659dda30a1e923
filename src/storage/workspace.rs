//! A filesystem backed planner workspace.
//!
//! The [`Workspace`] ties together the config file, the catalog directory
//! and the cart file found under one root directory. It is a wrapper around
//! the filesystem agnostic [`Catalog`] and [`Cart`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    domain::{Cart, Catalog, Config, ConfigError, Course, EnrollmentError, SyncReport},
    storage::{
        cart::{CartError, LoadStatus, load_cart, save_cart},
        catalog::{CatalogError, load_catalog_dir},
    },
};

/// Name of the config file in the workspace root.
pub const CONFIG_FILE: &str = "planner.toml";

/// Errors raised by workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The config file is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The cart file could not be read or written.
    #[error(transparent)]
    Cart(#[from] CartError),
    /// A cart operation failed.
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    /// No course with this key in the catalog.
    #[error("course '{0}' not found in the catalog")]
    UnknownCourse(String),
    /// The course has no section with this code in the term.
    #[error("{course_id} has no section '{code}' in {term_name}")]
    UnknownSection {
        /// Course key.
        course_id: String,
        /// Requested section code.
        code: String,
        /// Term searched.
        term_name: String,
    },
    /// No term was given and none could be chosen.
    #[error("no term given; pass --term or set default_term (available: {})", .0.join(", "))]
    NoTerm(Vec<String>),
}

/// A planner workspace rooted at a directory.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
    catalog: Catalog,
    cart: Cart,
    cart_status: LoadStatus,
}

impl Workspace {
    /// Open the workspace at `root`, loading config, catalog and cart.
    ///
    /// A missing config file means defaults; a missing catalog directory or
    /// cart file means empty ones.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] if the config file is invalid, a catalog
    /// document fails validation or the cart file cannot be read.
    pub fn open(root: PathBuf) -> Result<Self, WorkspaceError> {
        let config = load_config(&root)?;
        let catalog = load_catalog_dir(&root.join(config.catalog_dir()))?;
        let loaded = load_cart(&root.join(config.cart_file()))?;

        Ok(Self {
            root,
            config,
            catalog,
            cart: loaded.cart,
            cart_status: loaded.status,
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The catalog snapshot.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The cart, for mutation. Call [`Workspace::save_cart`] to persist.
    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// How the cart file was handled when the workspace was opened.
    #[must_use]
    pub const fn cart_status(&self) -> &LoadStatus {
        &self.cart_status
    }

    /// Check every enrollment against the loaded catalog.
    ///
    /// See [`Cart::sync_with_catalog`].
    pub fn sync_cart(&mut self, now: DateTime<Utc>) -> SyncReport {
        self.cart.sync_with_catalog(&self.catalog, now)
    }

    /// Write the cart file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Cart`] if the file cannot be written.
    pub fn save_cart(&self, now: DateTime<Utc>) -> Result<(), WorkspaceError> {
        save_cart(&self.root.join(self.config.cart_file()), &self.cart, now)?;
        Ok(())
    }

    /// Replace and write the config file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] if the file cannot be written.
    pub fn save_config(&mut self, config: Config) -> Result<(), WorkspaceError> {
        config.save(&self.root.join(CONFIG_FILE))?;
        self.config = config;
        Ok(())
    }

    /// Look up a course by key, accepting `"csci 3100"` for `"CSCI3100"`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UnknownCourse`] if no course matches.
    pub fn course(&self, key: &str) -> Result<&Course, WorkspaceError> {
        let compact: String = key.split_whitespace().collect();
        self.catalog
            .course(&compact)
            .or_else(|| self.catalog.course(&compact.to_uppercase()))
            .ok_or_else(|| WorkspaceError::UnknownCourse(key.to_string()))
    }

    /// Normalize a course key given on the command line to the cart's form.
    #[must_use]
    pub fn course_id(&self, key: &str) -> String {
        let compact: String = key.split_whitespace().collect();
        if self.cart.contains(&compact) || self.catalog.course(&compact).is_some() {
            compact
        } else {
            compact.to_uppercase()
        }
    }

    /// The term to use: the one given, else the configured default, else the
    /// only term in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NoTerm`] when none of these applies.
    pub fn resolve_term(&self, term: Option<&str>) -> Result<String, WorkspaceError> {
        if let Some(term) = term.or(self.config.default_term.as_deref()) {
            return Ok(term.to_string());
        }
        let mut terms = self.catalog.available_terms();
        if terms.len() == 1 {
            return Ok(terms.remove(0));
        }
        Err(WorkspaceError::NoTerm(terms))
    }
}

fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSCI: &str = r#"{
      "metadata": { "subject": "CSCI", "total_courses": 1 },
      "courses": [{
        "subject": "CSCI", "course_code": "3100", "title": "Software Engineering", "credits": "3",
        "terms": [{ "term_code": "2390", "term_name": "2025-26 Term 1",
          "schedule": [{ "section": "--LEC (1)", "meetings": [{ "time": "Mo 14:30 - 15:15" }] }] }]
      }]
    }"#;

    fn workspace() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("data")).unwrap();
        std::fs::write(tmp.path().join("data").join("CSCI.json"), CSCI).unwrap();
        tmp
    }

    #[test]
    fn opens_with_defaults() {
        let tmp = workspace();
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();

        assert_eq!(workspace.catalog().len(), 1);
        assert!(workspace.cart().is_empty());
        assert_eq!(workspace.cart_status(), &LoadStatus::Missing);
        assert_eq!(workspace.resolve_term(None).unwrap(), "2025-26 Term 1");
    }

    #[test]
    fn course_lookup_is_forgiving() {
        let tmp = workspace();
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();

        assert!(workspace.course("csci 3100").is_ok());
        assert!(workspace.course("CSCI3100").is_ok());
        assert!(matches!(
            workspace.course("MATH1010"),
            Err(WorkspaceError::UnknownCourse(_))
        ));
        assert_eq!(workspace.course_id("csci 3100"), "CSCI3100");
    }

    #[test]
    fn cart_survives_reopen() {
        let tmp = workspace();
        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let course = workspace.course("CSCI3100").unwrap().clone();
        let draft = course.terms[0]
            .sections
            .iter()
            .fold(crate::domain::SelectionDraft::default(), |draft, s| {
                draft.select_with_cascade(&course, "2025-26 Term 1", s)
            });
        workspace
            .cart_mut()
            .add(&course, "2025-26 Term 1", &draft)
            .unwrap();
        workspace.save_cart(Utc::now()).unwrap();

        let reopened = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(reopened.cart_status(), &LoadStatus::Loaded);
        assert!(reopened.cart().contains("CSCI3100"));
    }

    #[test]
    fn config_changes_paths() {
        let tmp = workspace();
        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let mut config = workspace.config().clone();
        config.set("catalog_dir", "elsewhere").unwrap();
        workspace.save_config(config).unwrap();

        let reopened = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(reopened.catalog().is_empty());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let tmp = workspace();
        std::fs::write(tmp.path().join(CONFIG_FILE), "_version = \"7\"").unwrap();
        assert!(matches!(
            Workspace::open(tmp.path().to_path_buf()),
            Err(WorkspaceError::Config(_))
        ));
    }

    #[test]
    fn no_term_when_ambiguous() {
        let tmp = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(matches!(
            workspace.resolve_term(None),
            Err(WorkspaceError::NoTerm(_))
        ));
        assert_eq!(workspace.resolve_term(Some("T1")).unwrap(), "T1");
    }
}
