use std::path::PathBuf;

use clap::Parser;
use planner::{Workspace, domain::search::search_courses};
use tracing::instrument;

use super::{
    OutputFormat,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser)]
#[command(about = "Find courses offered in a term")]
pub struct Search {
    /// Text to look for in course codes, titles and instructors
    #[arg(default_value = "")]
    query: String,

    /// Term to search (defaults to the configured term)
    #[arg(long)]
    term: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Search {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let term = workspace.resolve_term(self.term.as_deref())?;
        let results = search_courses(workspace.catalog(), &self.query, &term);

        if matches!(self.output, OutputFormat::Json) {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No courses in {term} match '{}'.", self.query);
            return Ok(());
        }

        let narrow = is_narrow();
        for summary in &results {
            let enrolled = if workspace.cart().contains(&summary.id) {
                " ✓".success()
            } else {
                String::new()
            };
            if narrow {
                println!("{}{enrolled}", summary.id.info());
                println!("  {}", summary.title);
            } else {
                println!(
                    "{:<10} {:<40} {:>4} cr  {:>2} sections  {}{enrolled}",
                    summary.id,
                    summary.title,
                    summary.credits,
                    summary.section_count,
                    summary.instructors.join(", ").dim()
                );
            }
        }
        println!();
        println!("{}", format!("{} course(s) in {term}", results.len()).dim());
        Ok(())
    }
}

#[derive(Debug, Parser, Default)]
#[command(about = "List the terms in the catalog")]
pub struct Terms {}

impl Terms {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let default_term = workspace.config().default_term.as_deref();

        let terms = workspace.catalog().available_terms();
        if terms.is_empty() {
            println!(
                "No terms found. Put catalog files in {}.",
                workspace.config().catalog_dir().display()
            );
            return Ok(());
        }

        for term in terms {
            if Some(term.as_str()) == default_term {
                println!("{term} {}", "(default)".dim());
            } else {
                println!("{term}");
            }
        }
        Ok(())
    }
}
