use std::path::PathBuf;

mod add;
mod calendar;
mod search;
mod show;
mod status;
mod terminal;

use add::Add;
use calendar::Calendar;
use chrono::Utc;
use clap::ArgAction;
use planner::{
    Section, Workspace,
    domain::{CycleDirection, SectionType},
};
use search::{Search, Terms};
use show::Show;
use status::Status;
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the planner workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// How list-like commands render their results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    Table,
    /// Pretty printed JSON
    Json,
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show the cart (default)
    Status(Status),

    /// List the terms in the catalog
    Terms(Terms),

    /// Search the catalog
    Search(Search),

    /// Show a course's sections and which of them combine
    Show(Show),

    /// Add a course to the cart
    ///
    /// Sections are picked in the order given. Each pick drops earlier picks
    /// of lower-priority types that no longer combine with it.
    Add(Add),

    /// Remove a course from the cart
    Remove(Remove),

    /// Hide or show a course on the calendar
    Toggle(Toggle),

    /// Swap one section of an enrolled course for another
    Swap(Swap),

    /// Step a section type of an enrolled course to the next alternative
    Cycle(Cycle),

    /// Show the weekly calendar
    Calendar(Calendar),

    /// Re-check the cart against the catalog on disk
    ///
    /// Enrollments whose course, term or sections changed are flagged
    /// invalid, never removed.
    Sync(Sync),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Terms(command) => command.run(root)?,
            Self::Search(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Remove(command) => command.run(root)?,
            Self::Toggle(command) => command.run(root)?,
            Self::Swap(command) => command.run(root)?,
            Self::Cycle(command) => command.run(root)?,
            Self::Calendar(command) => command.run(root)?,
            Self::Sync(command) => command.run(root)?,
            Self::Config(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Remove {
    /// Course key, e.g. CSCI3100
    course: String,
}

impl Remove {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let course_id = workspace.course_id(&self.course);

        if workspace.cart_mut().remove(&course_id).is_none() {
            anyhow::bail!("{course_id} is not in the cart");
        }
        workspace.save_cart(Utc::now())?;
        println!("{} {course_id}", "Removed".success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Toggle {
    /// Course key, e.g. CSCI3100
    course: String,
}

impl Toggle {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let course_id = workspace.course_id(&self.course);

        let visible = workspace.cart_mut().toggle_visibility(&course_id)?;
        workspace.save_cart(Utc::now())?;
        if visible {
            println!("{course_id} is now {}", "visible".success());
        } else {
            println!("{course_id} is now {}", "hidden".dim());
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Swap {
    /// Course key, e.g. CSCI3100
    course: String,

    /// Section code to switch to, e.g. AT02-TUT
    section: String,
}

impl Swap {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let course_id = workspace.course_id(&self.course);
        let section_id = Section::make_id(&course_id, &self.section.to_uppercase());

        let enrollment = workspace.cart_mut().replace_section(&course_id, &section_id)?;
        let codes: Vec<&str> = enrollment
            .selected_sections
            .iter()
            .map(|s| s.section_code.as_str())
            .collect();
        println!("{} {course_id} ({})", "Updated".success(), codes.join(", "));
        workspace.save_cart(Utc::now())?;
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Cycle {
    /// Course key, e.g. CSCI3100
    course: String,

    /// Section type code, e.g. TUT
    section_type: String,

    /// Step to the previous alternative instead of the next
    #[arg(long)]
    back: bool,
}

impl Cycle {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let course_id = workspace.course_id(&self.course);
        let section_type = SectionType::from_code(&self.section_type.to_uppercase());
        let direction = if self.back {
            CycleDirection::Back
        } else {
            CycleDirection::Forward
        };

        let section_id = workspace
            .cart_mut()
            .cycle_section(&course_id, &section_type, direction)?;
        workspace.save_cart(Utc::now())?;

        let code = section_id
            .strip_prefix(&format!("{course_id}_"))
            .unwrap_or(&section_id);
        println!("{course_id} {} now {}", section_type.display_name(), code.success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Sync {
    /// Report problems without saving the cart
    #[arg(long)]
    check: bool,
}

impl Sync {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let report = workspace.sync_cart(Utc::now());

        for course_id in &report.invalid {
            let reason = workspace
                .cart()
                .get(course_id)
                .and_then(|e| e.invalid_reason.as_deref())
                .unwrap_or("unknown reason");
            println!("{} {course_id}: {reason}", "✗".danger());
        }
        for course_id in &report.recovered {
            println!("{} {course_id} is valid again", "✓".success());
        }
        println!(
            "Checked {} enrollment(s), {} invalid",
            report.checked,
            report.invalid.len()
        );

        if !self.check {
            workspace.save_cart(Utc::now())?;
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    ///
    /// Keys: catalog_dir, cart_file, default_term. An empty default_term
    /// clears it.
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;

        match self.command {
            ConfigCommand::Show => {
                let config = workspace.config();
                println!("Configuration:");
                println!("  catalog_dir: {}", config.catalog_dir().display());
                println!("  cart_file: {}", config.cart_file().display());
                println!(
                    "  default_term: {}",
                    config
                        .default_term
                        .as_deref()
                        .map_or_else(|| "(none)".dim(), ToString::to_string)
                );
            }
            ConfigCommand::Set { key, value } => {
                let mut config = workspace.config().clone();
                config.set(&key, &value)?;
                workspace.save_config(config)?;
                println!("{} {key}", "Updated".success());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use planner::{Workspace, domain::Weekday};
    use tempfile::tempdir;

    use super::*;

    const CSCI: &str = r#"{
      "metadata": { "subject": "CSCI", "total_courses": 1 },
      "courses": [{
        "subject": "CSCI", "course_code": "3100", "title": "Software Engineering", "credits": "3",
        "terms": [{ "term_code": "2390", "term_name": "2025-26 Term 1", "schedule": [
          { "section": "A-LEC (1001)", "meetings": [{ "time": "Mo 10:30 - 12:15" }] },
          { "section": "AT01-TUT (1002)", "meetings": [{ "time": "Tu 14:30 - 15:15" }] },
          { "section": "AT02-TUT (1003)", "meetings": [{ "time": "We 14:30 - 15:15" }] },
          { "section": "B-LEC (2001)", "meetings": [{ "time": "Th 10:30 - 12:15" }] },
          { "section": "BT01-TUT (2002)", "meetings": [{ "time": "Fr 14:30 - 15:15" }] }
        ] }]
      }]
    }"#;

    fn workspace() -> tempfile::TempDir {
        let tmp = tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("data")).unwrap();
        std::fs::write(tmp.path().join("data").join("CSCI.json"), CSCI).unwrap();
        tmp
    }

    fn add(root: &std::path::Path, sections: &[&str]) {
        Add {
            course: "csci3100".to_string(),
            sections: sections.iter().map(ToString::to_string).collect(),
            term: None,
        }
        .run(root.to_path_buf())
        .expect("add should succeed");
    }

    fn held_codes(root: &std::path::Path) -> Vec<String> {
        let workspace = Workspace::open(root.to_path_buf()).unwrap();
        workspace
            .cart()
            .get("CSCI3100")
            .unwrap()
            .selected_sections
            .iter()
            .map(|s| s.section_code.clone())
            .collect()
    }

    #[test]
    fn add_then_remove() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "at01-tut"]);
        assert_eq!(held_codes(tmp.path()), ["A-LEC", "AT01-TUT"]);

        Remove {
            course: "CSCI3100".to_string(),
        }
        .run(tmp.path().to_path_buf())
        .unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(workspace.cart().is_empty());
    }

    #[test]
    fn add_rejects_incomplete_selection() {
        let tmp = workspace();
        let result = Add {
            course: "CSCI3100".to_string(),
            sections: vec!["A-LEC".to_string()],
            term: None,
        }
        .run(tmp.path().to_path_buf());

        assert!(result.is_err());
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(workspace.cart().is_empty());
    }

    #[test]
    fn add_reports_only_the_sections_it_kept() {
        let tmp = workspace();
        let error = Add {
            course: "CSCI3100".to_string(),
            sections: vec!["A-LEC".to_string(), "BT01-TUT".to_string()],
            term: None,
        }
        .run(tmp.path().to_path_buf())
        .unwrap_err();

        assert!(error.to_string().contains("(kept: A-LEC)"), "{error}");
        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(workspace.cart().is_empty());
    }

    #[test]
    fn add_rejects_unknown_section() {
        let tmp = workspace();
        let result = Add {
            course: "CSCI3100".to_string(),
            sections: vec!["Z-LEC".to_string()],
            term: None,
        }
        .run(tmp.path().to_path_buf());

        assert!(result.is_err());
    }

    #[test]
    fn remove_missing_course_fails() {
        let tmp = workspace();
        let result = Remove {
            course: "CSCI3100".to_string(),
        }
        .run(tmp.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn toggle_hides_course_from_calendar() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "AT01-TUT"]);

        Toggle {
            course: "CSCI3100".to_string(),
        }
        .run(tmp.path().to_path_buf())
        .unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(!workspace.cart().get("CSCI3100").unwrap().is_visible);
        assert!(workspace.cart().calendar_events().is_empty());
    }

    #[test]
    fn swap_lecture_cascades_to_tutorial() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "AT02-TUT"]);

        Swap {
            course: "CSCI3100".to_string(),
            section: "b-lec".to_string(),
        }
        .run(tmp.path().to_path_buf())
        .unwrap();

        assert_eq!(held_codes(tmp.path()), ["B-LEC", "BT01-TUT"]);
    }

    #[test]
    fn cycle_walks_compatible_tutorials() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "AT01-TUT"]);

        let cycle = |back| Cycle {
            course: "CSCI3100".to_string(),
            section_type: "tut".to_string(),
            back,
        };

        cycle(false).run(tmp.path().to_path_buf()).unwrap();
        assert_eq!(held_codes(tmp.path()), ["A-LEC", "AT02-TUT"]);

        cycle(false).run(tmp.path().to_path_buf()).unwrap();
        assert_eq!(held_codes(tmp.path()), ["A-LEC", "AT01-TUT"]);

        cycle(true).run(tmp.path().to_path_buf()).unwrap();
        assert_eq!(held_codes(tmp.path()), ["A-LEC", "AT02-TUT"]);
    }

    #[test]
    fn sync_flags_vanished_sections() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "AT02-TUT"]);

        let trimmed = CSCI.replace(
            r#"{ "section": "AT02-TUT (1003)", "meetings": [{ "time": "We 14:30 - 15:15" }] },"#,
            "",
        );
        std::fs::write(tmp.path().join("data").join("CSCI.json"), trimmed).unwrap();

        Sync { check: false }.run(tmp.path().to_path_buf()).unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let enrollment = workspace.cart().get("CSCI3100").unwrap();
        assert!(enrollment.is_invalid);
        assert!(enrollment.last_synced.is_some());
        assert_eq!(enrollment.selected_sections.len(), 2);
    }

    #[test]
    fn sync_check_does_not_save() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "AT01-TUT"]);

        Sync { check: true }.run(tmp.path().to_path_buf()).unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert!(workspace.cart().get("CSCI3100").unwrap().last_synced.is_none());
    }

    #[test]
    fn config_set_default_term() {
        let tmp = workspace();
        Config {
            command: ConfigCommand::Set {
                key: "default_term".to_string(),
                value: "2025-26 Term 2".to_string(),
            },
        }
        .run(tmp.path().to_path_buf())
        .unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(workspace.resolve_term(None).unwrap(), "2025-26 Term 2");
    }

    #[test]
    fn config_rejects_unknown_key() {
        let tmp = workspace();
        let result = Config {
            command: ConfigCommand::Set {
                key: "colour".to_string(),
                value: "red".to_string(),
            },
        }
        .run(tmp.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn read_only_commands_succeed() {
        let tmp = workspace();
        add(tmp.path(), &["A-LEC", "AT01-TUT"]);
        let root = tmp.path().to_path_buf();

        Status::default().run(root.clone()).unwrap();
        Terms::default().run(root.clone()).unwrap();
        Calendar::default().run(root.clone()).unwrap();

        let workspace = Workspace::open(root).unwrap();
        let days: Vec<Weekday> = workspace
            .cart()
            .calendar_events()
            .iter()
            .map(|e| e.day)
            .collect();
        assert!(days.contains(&Weekday::Mon));
        assert!(days.contains(&Weekday::Tue));
    }

    #[test]
    fn parses_command_line() {
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "plan", "-vv", "--root", "/tmp/x", "add", "CSCI3100", "-s", "A-LEC", "-s", "AT01-TUT",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Add(ref add)) if add.sections.len() == 2));

        let cli = Cli::try_parse_from(["plan", "cycle", "CSCI3100", "TUT", "--back"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Cycle(Cycle { back: true, .. }))));

        assert!(Cli::try_parse_from(["plan", "add", "CSCI3100"]).is_err());
    }
}
