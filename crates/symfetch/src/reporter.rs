//! Terminal rendering of run messages.

use std::io::{self, Write};

use symfetch_core::report::{Message, Reporter, Severity};
use symfetch_utils::style::{self, Tone};

/// Writes tagged, optionally colored message lines to stderr
///
/// stdout is left alone: without `--emit` it carries the command itself.
pub struct TerminalReporter<W: Write = io::Stderr>
{
    out: W,
    color: bool,
}

impl TerminalReporter
{
    pub fn stderr(color: bool) -> Self
    {
        Self::new(io::stderr(), color)
    }
}

impl<W: Write> TerminalReporter<W>
{
    pub fn new(out: W, color: bool) -> Self
    {
        Self { out, color }
    }

    #[cfg(test)]
    fn into_inner(self) -> W
    {
        self.out
    }

    fn body(&self, message: &Message) -> String
    {
        if !self.color {
            return message.to_string();
        }
        match message {
            Message::Loading(path) => {
                format!("Loading debug symbols from: {}", style::emphasis(&path.display().to_string()))
            }
            Message::Placed { section, address } => {
                let address = format!("0x{address:08x}");
                format!("Dumping {} at {}", style::section(section), style::address(&address))
            }
            other => other.to_string(),
        }
    }
}

fn tone(severity: Severity) -> Tone
{
    match severity {
        Severity::Info => Tone::Info,
        Severity::Success => Tone::Success,
        Severity::Command => Tone::Command,
        Severity::Warning => Tone::Warning,
        Severity::Error => Tone::Error,
    }
}

impl<W: Write> Reporter for TerminalReporter<W>
{
    fn report(&mut self, message: Message)
    {
        let tag = style::tag(tone(message.severity()), self.color);
        let body = self.body(&message);
        // A closed stderr must not turn a load into a failure
        let _ = writeln!(self.out, "{tag} {body}");
    }
}
