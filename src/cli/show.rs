use std::path::PathBuf;

use clap::Parser;
use planner::{
    Section, Workspace,
    domain::{
        compatibility::{categorize_for_type, is_selection_complete},
        section_types::parse_section_types,
    },
};
use tracing::instrument;

use super::{
    add::build_draft,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser)]
#[command(about = "Show a course's sections, grouped by type in priority order")]
pub struct Show {
    /// Course key, e.g. CSCI3100
    course: String,

    /// Term to show (defaults to the configured term)
    #[arg(long)]
    term: Option<String>,

    /// Preview picks instead of the sections in the cart
    #[arg(short, long = "pick", value_name = "CODE")]
    picks: Vec<String>,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let term = workspace.resolve_term(self.term.as_deref())?;
        let course = workspace.course(&self.course)?;
        let key = course.key();

        let selected: Vec<&Section> = if self.picks.is_empty() {
            workspace
                .cart()
                .get(&key)
                .filter(|e| e.term_name == term)
                .map(|e| e.selected_sections.iter().collect())
                .unwrap_or_default()
        } else {
            build_draft(course, &term, &self.picks)?.selected_sections_for_course(course, &term)
        };

        println!("{} {}", key.info(), course.title);
        println!("{}", format!("{} credits, {term}", course.credits).dim());
        if let Some(prerequisites) = &course.prerequisites {
            println!("{}", format!("Requires: {prerequisites}").dim());
        }

        let groups = parse_section_types(course, &term);
        if groups.is_empty() {
            println!();
            println!("Not offered in {term}.");
            return Ok(());
        }

        let narrow = is_narrow();
        for group in &groups {
            let categorized = categorize_for_type(&groups, &selected, &group.section_type);
            println!();
            println!(
                "{} {} ({})",
                group.icon(),
                group.display_name(),
                group.section_type
            );
            if categorized.has_no_compatible {
                println!("  {}", "No compatible sections; not required.".dim());
            }
            for section in &group.sections {
                let marker = if selected.iter().any(|s| s.id == section.id) {
                    "●".success()
                } else if categorized.compatible.iter().any(|s| s.id == section.id) {
                    "○".to_string()
                } else {
                    "✗".dim()
                };
                print_section(&marker, section, narrow);
            }
        }

        println!();
        if is_selection_complete(&groups, &selected) {
            println!("{}", "Selection is complete.".success());
        } else {
            println!("{}", "Selection is incomplete.".warning());
        }
        Ok(())
    }
}

fn print_section(marker: &str, section: &Section, narrow: bool) {
    let availability = &section.availability;
    let seats = format!(
        "{} {}/{}",
        availability.status, availability.available_seats, availability.capacity
    );
    println!("  {marker} {:<10} {}", section.section_code, seats.dim());
    if narrow {
        return;
    }
    for meeting in section.unique_meetings() {
        println!(
            "      {:<20} {:<16} {}",
            meeting.time,
            meeting.location,
            meeting.instructor.dim()
        );
    }
}
