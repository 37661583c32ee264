//! # Debugger Host
//!
//! The interface to the debugger session symbols are loaded into.
//!
//! A fetch run needs exactly two things from its host: the debuggee's
//! memory-mapping listing, and a way to submit one command to the debugger's
//! command interpreter. Keeping the seam this narrow lets the pipeline run
//! against a live GDB session, a plain `/proc/<pid>/maps` file, or a test
//! double without change.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, SymfetchError};
use crate::report::Message;

/// What became of a submitted command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission
{
    /// The debugger ran the command and accepted it
    Executed,
    /// The command was handed on; the debugger runs it later and prints its
    /// own confirmation
    Deferred,
}

/// Debugger session a fetch run talks to
pub trait DebuggerHost
{
    /// Memory-mapping listing of the debuggee, one region per line
    ///
    /// Either GDB `info proc mappings` output or `/proc/<pid>/maps` text.
    ///
    /// ## Errors
    ///
    /// `MappingsUnavailable` when there is no live process or the listing
    /// cannot be read.
    fn mappings(&mut self) -> Result<String>;

    /// Submit a command string to the debugger's command interpreter
    ///
    /// ## Errors
    ///
    /// `CommandFailed` when the debugger rejects the command or it cannot be
    /// delivered.
    fn execute(&mut self, command: &str) -> Result<Submission>;
}

/// Where a [`ScriptHost`] reads the mapping listing from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingListing
{
    /// Listing captured beforehand, e.g. piped from `info proc mappings`
    Text(String),
    /// Read `/proc/<pid>/maps` of a live process
    Proc(u32),
}

impl MappingListing
{
    fn read(&self) -> Result<String>
    {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Proc(pid) => {
                let path = PathBuf::from(format!("/proc/{pid}/maps"));
                debug!(path = %path.display(), "reading process mappings");
                fs::read_to_string(&path)
                    .map_err(|e| SymfetchError::MappingsUnavailable(format!("{}: {e}", path.display())))
            }
        }
    }
}

/// Host that hands commands to GDB as script text
///
/// GDB cannot load Rust code in-process, so the `fetch-debug` user command
/// pipes the mapping listing into `symfetch` and sources whatever it wrote.
/// Each command becomes one line of that script, followed by an `echo` of
/// the load confirmation. GDB stops sourcing at the first failing command,
/// so the confirmation only shows once the symbols are really in.
pub struct ScriptHost<W: Write>
{
    listing: MappingListing,
    out: W,
    executed: usize,
}

impl<W: Write> ScriptHost<W>
{
    pub fn new(listing: MappingListing, out: W) -> Self
    {
        Self {
            listing,
            out,
            executed: 0,
        }
    }

    /// Number of commands written so far
    #[must_use]
    pub fn executed(&self) -> usize
    {
        self.executed
    }

    pub fn into_inner(self) -> W
    {
        self.out
    }
}

impl<W: Write> DebuggerHost for ScriptHost<W>
{
    fn mappings(&mut self) -> Result<String>
    {
        self.listing.read()
    }

    fn execute(&mut self, command: &str) -> Result<Submission>
    {
        if command.contains('\n') {
            return Err(SymfetchError::CommandFailed(
                "refusing to emit a multi-line command".to_string(),
            ));
        }
        writeln!(self.out, "{command}")
            .and_then(|()| writeln!(self.out, "{}", confirmation_line()))
            .and_then(|()| self.out.flush())
            .map_err(|e| SymfetchError::CommandFailed(e.to_string()))?;
        self.executed += 1;
        Ok(Submission::Deferred)
    }
}

/// GDB `echo` of the success message; `\n` is GDB's own escape
fn confirmation_line() -> String
{
    format!("echo [+] {}\\n", Message::Loaded)
}
