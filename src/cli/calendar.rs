use std::path::PathBuf;

use clap::Parser;
use planner::{Workspace, domain::Weekday};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow, swatch};

#[derive(Debug, Parser, Default)]
#[command(about = "Show the weekly timetable of the visible courses")]
pub struct Calendar {
    /// Print events, conflict zones and unscheduled sections as JSON
    #[arg(long)]
    json: bool,
}

impl Calendar {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        use serde_json::json;

        let workspace = Workspace::open(root)?;
        let cart = workspace.cart();
        let mut events = cart.calendar_events();
        let zones = cart.conflict_zones();
        let unscheduled = cart.unscheduled();

        if self.json {
            let output = json!({
                "events": events,
                "conflictZones": zones,
                "unscheduled": unscheduled,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if events.is_empty() && unscheduled.is_empty() {
            println!("Nothing to show. Add a course with 'plan add' or unhide one with 'plan toggle'.");
            return Ok(());
        }

        events.sort_by_key(|e| (e.day, e.time_range().start_minutes()));
        let narrow = is_narrow();

        for day in Weekday::ALL {
            let todays: Vec<_> = events.iter().filter(|e| e.day == day).collect();
            if todays.is_empty() {
                continue;
            }
            println!("{}", day.to_string().info());
            for event in todays {
                let span = format!(
                    "{:02}:{:02}-{:02}:{:02}",
                    event.start_hour, event.start_minute, event.end_hour, event.end_minute
                );
                let flag = if event.has_conflict {
                    " ⚠ conflict".danger()
                } else {
                    String::new()
                };
                if narrow {
                    println!("  {span} {} {}{flag}", event.enrollment_id, event.section_code);
                } else {
                    println!(
                        "  {span} {} {:<10} {:<10} {:<16} {}{flag}",
                        swatch(&event.color),
                        event.enrollment_id,
                        event.section_code,
                        event.location,
                        event.instructor.dim()
                    );
                }
            }
        }

        if !zones.is_empty() {
            println!();
            println!("{}", "Overlaps".warning());
            for zone in &zones {
                println!(
                    "  {} {:02}:{:02}-{:02}:{:02} ({} events)",
                    zone.day,
                    zone.start_minutes / 60,
                    zone.start_minutes % 60,
                    zone.end_minutes / 60,
                    zone.end_minutes % 60,
                    zone.event_ids.len()
                );
            }
        }

        if !unscheduled.is_empty() {
            println!();
            println!("{}", "Unscheduled".dim());
            for entry in &unscheduled {
                let times = if entry.times.is_empty() {
                    "no meetings".to_string()
                } else {
                    entry.times.join(", ")
                };
                println!("  {} {} ({times})", entry.enrollment_id, entry.section_code);
            }
        }
        Ok(())
    }
}
