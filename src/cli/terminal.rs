//! Terminal capability detection and output styling

use owo_colors::{OwoColorize, Rgb, Style, colors::css};

/// Below this many columns, listings drop their secondary columns.
const NARROW_COLUMNS: u16 = 60;

/// Whether stdout takes ANSI colours.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Whether the terminal is too narrow for the wide listings.
///
/// When the width is unknown (output piped to a file) the wide layout is
/// used.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

/// A block in a course's colour, or nothing when colour is off.
pub fn swatch(hex: &str) -> String {
    match parse_hex(hex) {
        Some(rgb) if supports_color() => "■".color(rgb).to_string(),
        _ => String::new(),
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Warning,
    Danger,
    Info,
    Dim,
}

impl Tone {
    const fn style(self) -> Style {
        match self {
            Self::Success => Style::new().fg::<css::Green>(),
            Self::Warning => Style::new().fg::<css::Orange>(),
            Self::Danger => Style::new().fg::<css::Crimson>(),
            Self::Info => Style::new().fg::<css::LightBlue>(),
            Self::Dim => Style::new().dimmed(),
        }
    }

    fn paint(self, text: &str, colored: bool) -> String {
        if colored {
            text.style(self.style()).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Styling for status lines: seat counts, conflicts, hints.
pub trait Colorize {
    /// Something that worked, or a chosen section
    fn success(&self) -> String;
    /// Something the user should look at
    fn warning(&self) -> String;
    /// A conflict or a failure
    fn danger(&self) -> String;
    /// Headings such as course keys and weekdays
    fn info(&self) -> String;
    /// Secondary detail
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        Tone::Success.paint(self.as_ref(), supports_color())
    }

    fn warning(&self) -> String {
        Tone::Warning.paint(self.as_ref(), supports_color())
    }

    fn danger(&self) -> String {
        Tone::Danger.paint(self.as_ref(), supports_color())
    }

    fn info(&self) -> String {
        Tone::Info.paint(self.as_ref(), supports_color())
    }

    fn dim(&self) -> String {
        Tone::Dim.paint(self.as_ref(), supports_color())
    }
}
