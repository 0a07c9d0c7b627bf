//! Colored terminal output for release runs.
//!
//! Progress and results go to stdout; failures and the tool output attached
//! to them go to stderr, so a failed release can be read from stderr alone.

use std::io::{self, Write};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Kind of line printed by [`OutputManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Success,
    Warning,
    Failure,
    FailureDetail,
    Verbose,
    Step,
    Heading,
    Indented,
}

impl Line {
    fn to_stderr(self) -> bool {
        matches!(self, Line::Failure | Line::FailureDetail)
    }

    /// Marker, marker color, and whether the message shares the color
    fn marker(self) -> Option<(&'static str, Color, bool)> {
        match self {
            Line::Success => Some(("✓", Color::Green, false)),
            Line::Warning => Some(("⚠", Color::Yellow, true)),
            Line::Failure => Some(("✗", Color::Red, true)),
            Line::Verbose => Some(("→", Color::Blue, false)),
            Line::Step => Some(("⋯", Color::Magenta, false)),
            Line::FailureDetail | Line::Heading | Line::Indented => None,
        }
    }
}

fn render<W: WriteColor>(out: &mut W, line: Line, message: &str) -> io::Result<()> {
    if line == Line::Heading {
        writeln!(out)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(out, "═══ {} ═══", message)?;
        return out.reset();
    }

    let Some((marker, color, color_message)) = line.marker() else {
        return writeln!(out, "    {}", message);
    };

    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", marker)?;
    out.reset()?;
    if color_message {
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    }
    writeln!(out, " {}", message)?;
    out.reset()
}

/// Colored output for one release run
#[derive(Debug, Clone)]
pub struct OutputManager {
    color: ColorChoice,
    verbose: bool,
}

impl OutputManager {
    /// Output manager; verbose lines are printed only when `verbose` is set
    pub fn new(verbose: bool) -> Self {
        Self {
            color: ColorChoice::Auto,
            verbose,
        }
    }

    fn shows(&self, line: Line) -> bool {
        line != Line::Verbose || self.verbose
    }

    fn print(&self, line: Line, message: &str) -> io::Result<()> {
        if !self.shows(line) {
            return Ok(());
        }
        let writer = if line.to_stderr() {
            BufferWriter::stderr(self.color)
        } else {
            BufferWriter::stdout(self.color)
        };
        let mut buffer = writer.buffer();
        render(&mut buffer, line, message)?;
        writer.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.print(Line::Success, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.print(Line::Warning, message)
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) -> io::Result<()> {
        self.print(Line::Failure, message)
    }

    /// Print an indented line under an error, to stderr
    pub fn error_detail(&self, message: &str) -> io::Result<()> {
        self.print(Line::FailureDetail, message)
    }

    /// Print a message only shown with `--verbose`
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        self.print(Line::Verbose, message)
    }

    /// Print a release step
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.print(Line::Step, message)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        self.print(Line::Heading, title)
    }

    /// Print an indented sub-item
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.print(Line::Indented, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn rendered(line: Line, message: &str) -> String {
        let mut buffer = Buffer::no_color();
        render(&mut buffer, line, message).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn lines_carry_their_marker() {
        assert_eq!(rendered(Line::Success, "Built image yugaware"), "✓ Built image yugaware\n");
        assert_eq!(rendered(Line::Failure, "docker release failed"), "✗ docker release failed\n");
        assert_eq!(rendered(Line::Step, "Kick off SBT"), "⋯ Kick off SBT\n");
    }

    #[test]
    fn heading_and_details_are_unmarked() {
        assert_eq!(rendered(Line::Heading, "Docker release"), "\n═══ Docker release ═══\n");
        assert_eq!(rendered(Line::FailureDetail, "COPY failed"), "    COPY failed\n");
        assert_eq!(rendered(Line::Indented, "Pushed yugaware:v1"), "    Pushed yugaware:v1\n");
    }

    #[test]
    fn verbose_lines_need_verbose_mode() {
        assert!(!OutputManager::new(false).shows(Line::Verbose));
        assert!(OutputManager::new(true).shows(Line::Verbose));
        assert!(OutputManager::new(false).shows(Line::Warning));
    }

    #[test]
    fn failures_go_to_stderr() {
        assert!(Line::Failure.to_stderr());
        assert!(Line::FailureDetail.to_stderr());
        assert!(!Line::Warning.to_stderr());
        assert!(!Line::Indented.to_stderr());
    }
}
