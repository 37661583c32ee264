//! Terminal styling for user-facing messages.
//!
//! Every message line starts with a short bracketed tag (`[*]`, `[+]`, ...)
//! whose color encodes its severity. Values worth spotting in a wall of
//! output, such as section names and addresses, get their own highlight.

use std::fmt;

use crossterm::style::{Color, StyledContent, Stylize};

/// Tone of a message line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone
{
    /// Progress information
    Info,
    /// A step completed
    Success,
    /// Recoverable problem; the run may continue
    Warning,
    /// The run failed
    Error,
    /// A command handed to the debugger
    Command,
}

impl Tone
{
    /// Bracketed tag printed before the message
    #[must_use]
    pub const fn label(self) -> &'static str
    {
        match self {
            Self::Info => "[*]",
            Self::Success => "[+]",
            Self::Warning => "[W]",
            Self::Error => "[E]",
            Self::Command => "[O]",
        }
    }

    #[must_use]
    pub const fn color(self) -> Color
    {
        match self {
            Self::Info => Color::Blue,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
            Self::Command => Color::Magenta,
        }
    }
}

/// Colored tag for `tone`, or the bare label when `color` is off.
pub struct Tag
{
    tone: Tone,
    color: bool,
}

impl fmt::Display for Tag
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.color {
            write!(f, "{}", self.tone.label().bold().with(self.tone.color()))
        } else {
            f.write_str(self.tone.label())
        }
    }
}

#[must_use]
pub const fn tag(tone: Tone, color: bool) -> Tag
{
    Tag { tone, color }
}

/// Section names are bold cyan.
#[must_use]
pub fn section(name: &str) -> StyledContent<&str>
{
    name.bold().cyan()
}

/// Addresses are bold yellow.
#[must_use]
pub fn address(text: &str) -> StyledContent<&str>
{
    text.bold().yellow()
}

#[must_use]
pub fn emphasis(text: &str) -> StyledContent<&str>
{
    text.bold()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_plain_tag_has_no_escape_codes()
    {
        assert_eq!(tag(Tone::Error, false).to_string(), "[E]");
        assert_eq!(tag(Tone::Command, false).to_string(), "[O]");
    }

    #[test]
    fn test_colored_tag_wraps_label()
    {
        let rendered = tag(Tone::Success, true).to_string();
        assert!(rendered.contains("[+]"));
        assert!(rendered.contains('\u{1b}'));
    }
}
