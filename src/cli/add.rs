use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use planner::{
    Course, SelectionDraft, Workspace,
    domain::{
        AddOutcome, EnrollmentError, compatibility::normalize_sections,
        section_types::parse_section_types,
    },
    storage::WorkspaceError,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Add a course to the cart, or replace its sections")]
pub struct Add {
    /// Course key, e.g. CSCI3100
    pub course: String,

    /// Section codes to pick, highest priority first (e.g. -s A-LEC -s AT01-TUT)
    #[arg(short, long = "section", value_name = "CODE", required = true)]
    pub sections: Vec<String>,

    /// Term to enroll in (defaults to the configured term)
    #[arg(long)]
    pub term: Option<String>,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let term = workspace.resolve_term(self.term.as_deref())?;
        let course = workspace.course(&self.course)?.clone();
        let draft = build_draft(&course, &term, &self.sections)?;

        let outcome = match workspace.cart_mut().add(&course, &term, &draft) {
            Err(EnrollmentError::Incomplete(_)) => {
                let groups = parse_section_types(&course, &term);
                let kept: Vec<String> =
                    normalize_sections(draft.selected_sections_for_course(&course, &term), &groups)
                        .iter()
                        .map(|s| s.section_code.clone())
                        .collect();
                anyhow::bail!(
                    "The selection for {} is incomplete (kept: {}). Run 'plan show {}' to see \
                     what is missing.",
                    course.key(),
                    if kept.is_empty() { "none".to_string() } else { kept.join(", ") },
                    course.key()
                );
            }
            result => result?,
        };
        workspace.save_cart(Utc::now())?;

        let verb = match outcome {
            AddOutcome::Added => "Added",
            AddOutcome::Replaced => "Updated",
        };
        let sections: Vec<&str> = workspace
            .cart()
            .get(&course.key())
            .map(|e| e.selected_sections.iter().map(|s| s.section_code.as_str()).collect())
            .unwrap_or_default();
        println!(
            "{} {} ({})",
            verb.success(),
            course.key(),
            sections.join(", ")
        );
        Ok(())
    }
}

/// Build a draft by picking the given section codes in order, cascading
/// after each pick.
///
/// Codes match case-insensitively.
pub fn build_draft(
    course: &Course,
    term_name: &str,
    codes: &[String],
) -> Result<SelectionDraft, WorkspaceError> {
    let term = course.term(term_name).ok_or_else(|| EnrollmentError::TermNotOffered {
        course_id: course.key(),
        term_name: term_name.to_string(),
    })?;

    codes.iter().try_fold(SelectionDraft::default(), |draft, code| {
        let section = term
            .sections
            .iter()
            .find(|s| s.section_code.eq_ignore_ascii_case(code))
            .ok_or_else(|| WorkspaceError::UnknownSection {
                course_id: course.key(),
                code: code.clone(),
                term_name: term_name.to_string(),
            })?;
        Ok(draft.select_with_cascade(course, term_name, section))
    })
}
