//! Host event types and helpers.
//!
//! A host that links this crate and observes the debuggee itself (a ptrace
//! loop, an embedding debugger, a test) publishes these events; the
//! registered extension reacts to them through [`crate::Extension::pump`].
//! GDB sessions get the same behavior from the generated `hook-stop`.

use std::fmt;
use std::sync::mpsc;

/// Why the debuggee stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason
{
    /// Breakpoint hit at the given address
    Breakpoint(u64),
    /// Signal delivered, by name (`SIGSEGV`, ...)
    Signal(String),
    /// Single step or `finish` completed
    Step,
    /// The host did not say
    Unknown,
}

impl fmt::Display for StopReason
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Breakpoint(addr) => write!(f, "Hit breakpoint at 0x{addr:x}"),
            Self::Signal(name) => write!(f, "Stopped by signal: {name}"),
            Self::Step => f.write_str("Step completed"),
            Self::Unknown => f.write_str("Stopped for unknown reason"),
        }
    }
}

/// Event emitted by a debugger host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent
{
    /// Debuggee stopped execution
    Stopped
    {
        /// Reason reported by the host
        reason: StopReason,
    },
    /// Debuggee resumed execution
    Resumed,
    /// Debuggee exited
    Exited(i32),
}

impl HostEvent
{
    /// Whether this event should trigger an automatic fetch
    #[must_use]
    pub fn is_stop(&self) -> bool
    {
        matches!(self, Self::Stopped { .. })
    }

    /// Human-readable description of the event.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            Self::Stopped { reason } => reason.to_string(),
            Self::Resumed => "Target resumed execution".to_string(),
            Self::Exited(code) => format!("Process exited with code: {code}"),
        }
    }
}

/// Sender side of the host event channel.
pub type HostEventSender = mpsc::Sender<HostEvent>;
/// Receiver side of the host event channel.
pub type HostEventReceiver = mpsc::Receiver<HostEvent>;

/// Create a new host event channel.
#[must_use]
pub fn event_channel() -> (HostEventSender, HostEventReceiver)
{
    mpsc::channel()
}
