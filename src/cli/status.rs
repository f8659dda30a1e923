use std::path::PathBuf;

use clap::Parser;
use planner::{Workspace, storage::LoadStatus};
use tracing::instrument;

use super::{
    OutputFormat,
    terminal::{Colorize, is_narrow, swatch},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show the cart with credit and conflict totals")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let cart = workspace.cart();

        if let LoadStatus::Discarded { reason } = workspace.cart_status() {
            eprintln!("{}", format!("Saved cart was ignored: {reason}").warning());
        }

        if cart.is_empty() && matches!(self.output, OutputFormat::Table) {
            println!("The cart is empty. Add a course with 'plan add'.");
            return Ok(());
        }

        let credits = cart.total_credits();
        let conflicts = cart.conflict_count();
        let unscheduled = cart.unscheduled().len();

        match self.output {
            OutputFormat::Json => Self::output_json(&workspace, credits, conflicts)?,
            OutputFormat::Table => {
                if self.quiet {
                    println!(
                        "courses={} credits={credits} conflicts={conflicts} unscheduled={unscheduled}",
                        cart.len()
                    );
                } else {
                    Self::output_table(&workspace, credits, conflicts, unscheduled);
                }
            }
        }
        Ok(())
    }

    fn output_json(workspace: &Workspace, credits: f64, conflicts: usize) -> anyhow::Result<()> {
        use serde_json::json;

        let cart = workspace.cart();
        let courses: Vec<_> = cart
            .iter()
            .map(|e| {
                json!({
                    "id": e.course_id,
                    "title": e.course.title,
                    "term": e.term_name,
                    "sections": e.selected_sections.iter().map(|s| &s.section_code).collect::<Vec<_>>(),
                    "color": e.color,
                    "visible": e.is_visible,
                    "invalid": e.invalid_reason,
                })
            })
            .collect();

        let output = json!({
            "courses": courses,
            "credits": credits,
            "conflicts": conflicts,
            "unscheduled": cart.unscheduled(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(workspace: &Workspace, credits: f64, conflicts: usize, unscheduled: usize) {
        let cart = workspace.cart();
        let narrow = is_narrow();

        println!("Cart");
        println!("{}", "────".dim());

        for enrollment in cart.iter() {
            let sections: Vec<&str> = enrollment
                .selected_sections
                .iter()
                .map(|s| s.section_code.as_str())
                .collect();
            let hidden = if enrollment.is_visible {
                String::new()
            } else {
                " (hidden)".dim()
            };
            if narrow {
                println!("{} {}{hidden}", swatch(&enrollment.color), enrollment.course_id);
                println!("  {}", sections.join(", "));
            } else {
                println!(
                    "{} {:<10} {:<32} {}{hidden}",
                    swatch(&enrollment.color),
                    enrollment.course_id,
                    enrollment.course.title,
                    sections.join(", ")
                );
            }
            if let Some(reason) = &enrollment.invalid_reason {
                println!("  {}", format!("⚠ {reason}").warning());
            }
        }

        println!();
        println!("Credits: {credits}");

        if conflicts == 0 {
            println!("Conflicts: {} ✅", "0".success());
        } else {
            println!("Conflicts: {} ⚠️", conflicts.to_string().danger());
            println!("{}", "Run 'plan calendar' to see them.".dim());
        }

        if unscheduled > 0 {
            println!("Unscheduled sections: {}", unscheduled.to_string().info());
        }

        let invalid = cart.invalid().count();
        if invalid > 0 {
            println!(
                "{}",
                format!("{invalid} course(s) changed in the catalog. Re-add or remove them.")
                    .warning()
            );
        }
    }
}
