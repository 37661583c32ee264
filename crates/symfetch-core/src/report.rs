//! # Progress Reporting
//!
//! Structured messages a fetch run emits for the user. The core never
//! formats for a terminal; a [`Reporter`] decides how each message looks.

use std::fmt;
use std::path::PathBuf;

use crate::types::Address;

/// Severity tag of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity
{
    Info,
    Success,
    Command,
    Warning,
    Error,
}

/// One user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message
{
    /// Automatic fetching on stop was switched on at registration
    AutoFetchEnabled,
    /// Neither an argument nor a usable configured directory was given
    DebugDirInferred(PathBuf),
    /// About to load symbols from this file
    Loading(PathBuf),
    /// A section will be loaded at this address
    Placed
    {
        section: String,
        address: Address,
    },
    /// The command handed to the debugger
    Command(String),
    /// The debugger accepted the command
    Loaded,
    /// The command was handed on for the debugger to run later
    Emitted,
    /// The run stopped early on a recoverable condition
    Warning(String),
    /// The run failed
    Error(String),
}

impl Message
{
    #[must_use]
    pub fn severity(&self) -> Severity
    {
        match self {
            Self::AutoFetchEnabled | Self::Loading(_) | Self::Emitted => Severity::Info,
            Self::Placed { .. } | Self::Loaded => Severity::Success,
            Self::Command(_) => Severity::Command,
            Self::DebugDirInferred(_) | Self::Warning(_) => Severity::Warning,
            Self::Error(_) => Severity::Error,
        }
    }
}

impl fmt::Display for Message
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::AutoFetchEnabled => f.write_str("Setting up automatic debug symbol fetching"),
            Self::DebugDirInferred(path) => write!(f, "DEBUGDIR not set, using {}", path.display()),
            Self::Loading(path) => write!(f, "Loading debug symbols from: {}", path.display()),
            Self::Placed { section, address } => write!(f, "Dumping {section} at 0x{address:08x}"),
            Self::Command(command) => f.write_str(command),
            Self::Loaded => f.write_str("Debug symbols loaded successfully!"),
            Self::Emitted => f.write_str("Load command emitted, the debugger confirms once it has run"),
            Self::Warning(text) | Self::Error(text) => f.write_str(text),
        }
    }
}

/// Receiver of run messages
pub trait Reporter
{
    fn report(&mut self, message: Message);
}

impl<R: Reporter + ?Sized> Reporter for &mut R
{
    fn report(&mut self, message: Message)
    {
        (**self).report(message);
    }
}

/// Reporter that keeps every message, for tests and embedding
#[derive(Debug, Default)]
pub struct CollectingReporter
{
    pub messages: Vec<Message>,
}

impl CollectingReporter
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Messages of the given severity, rendered
    #[must_use]
    pub fn rendered(&self, severity: Severity) -> Vec<String>
    {
        self.messages
            .iter()
            .filter(|m| m.severity() == severity)
            .map(ToString::to_string)
            .collect()
    }
}

impl Reporter for CollectingReporter
{
    fn report(&mut self, message: Message)
    {
        self.messages.push(message);
    }
}
