//! # Fetch Pipeline
//!
//! One linear run: find the library, read its sections and build id,
//! resolve the debug file, compose the load command and submit it.
//!
//! A run ends in one of two states:
//!
//! - **Loaded**: the debugger accepted the command, symbols are in.
//! - **Failed**: a diagnostic was reported and nothing was submitted.
//!
//! A host that only hands the command on (a script GDB sources afterwards)
//! cannot know whether it was accepted. Such a run ends as **Emitted** and
//! leaves the confirmation to the debugger.
//!
//! Nothing is submitted before every step has succeeded, so a failed run
//! never leaves the debugger's symbol tables half updated. There is no
//! retry; the next invocation starts from scratch.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::compose::SymbolLoadCommand;
use crate::config::FetchConfig;
use crate::error::{Result, SymfetchError};
use crate::host::{DebuggerHost, Submission};
use crate::inspect::ElfInspector;
use crate::maps::find_library;
use crate::report::{Message, Reporter};
use crate::resolve::{choose_debug_dir, locate_debug_file, DebugDirSource};

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome
{
    /// The command was accepted by the debugger
    Loaded(SymbolLoadCommand),
    /// The command was handed on; the debugger has not run it yet
    Emitted(SymbolLoadCommand),
    /// The run stopped; the reason was reported
    Failed,
}

impl Outcome
{
    #[must_use]
    pub fn is_loaded(&self) -> bool
    {
        matches!(self, Self::Loaded(_))
    }

    /// Whether the run got as far as submitting the command
    #[must_use]
    pub fn is_success(&self) -> bool
    {
        matches!(self, Self::Loaded(_) | Self::Emitted(_))
    }
}

/// Runs the fetch pipeline with fixed settings and inspector
///
/// Holds no state between runs.
pub struct Fetcher<I>
{
    config: FetchConfig,
    inspector: I,
}

impl<I: ElfInspector> Fetcher<I>
{
    pub fn new(config: FetchConfig, inspector: I) -> Self
    {
        Self { config, inspector }
    }

    #[must_use]
    pub fn config(&self) -> &FetchConfig
    {
        &self.config
    }

    /// Run once, reporting progress and any failure through `reporter`
    ///
    /// Never returns an error: every failure becomes an error message and
    /// [`Outcome::Failed`].
    pub fn execute<H, R>(&self, explicit_dir: Option<&Path>, host: &mut H, reporter: &mut R) -> Outcome
    where
        H: DebuggerHost + ?Sized,
        R: Reporter + ?Sized,
    {
        match self.try_execute(explicit_dir, host, reporter) {
            Ok(Some((command, Submission::Executed))) => {
                info!(command = %command, "debug symbols loaded");
                reporter.report(Message::Loaded);
                Outcome::Loaded(command)
            }
            Ok(Some((command, Submission::Deferred))) => {
                info!(command = %command, "load command emitted");
                reporter.report(Message::Emitted);
                Outcome::Emitted(command)
            }
            Ok(None) => Outcome::Failed,
            Err(e) => {
                warn!(error = %e, "symbol fetch failed");
                reporter.report(Message::Error(describe(&e)));
                Outcome::Failed
            }
        }
    }

    /// `Ok(None)` means the run stopped on an already reported warning.
    fn try_execute<H, R>(
        &self,
        explicit_dir: Option<&Path>,
        host: &mut H,
        reporter: &mut R,
    ) -> Result<Option<(SymbolLoadCommand, Submission)>>
    where
        H: DebuggerHost + ?Sized,
        R: Reporter + ?Sized,
    {
        let listing = host.mappings()?;
        let library = find_library(&listing, &self.config.library_pattern).ok_or(SymfetchError::LibraryNotFound)?;
        info!(base = %library.base, path = %library.path.display(), "library located");

        let debug_dir = choose_debug_dir(explicit_dir, self.config.debug_dir.as_deref(), &library);
        if debug_dir.source == DebugDirSource::Inferred {
            reporter.report(Message::DebugDirInferred(debug_dir.path.clone()));
        }

        if !library.path.exists() {
            return Err(SymfetchError::MissingData(format!(
                "File '{}' not exists",
                library.path.display()
            )));
        }

        let sections = self.inspector.sections(&library.path)?;
        if sections.is_empty() {
            return Err(SymfetchError::MissingData("No sections found".to_string()));
        }

        let selected = sections.select(&self.config.sections);
        if selected.is_empty() {
            reporter.report(Message::Warning(format!(
                "No required sections found ({})",
                self.config.sections.join(", ")
            )));
            return Ok(None);
        }
        debug!(inspector = self.inspector.name(), selected = selected.len(), "sections selected");

        let build_id = self
            .inspector
            .build_id(&library.path)?
            .ok_or_else(|| SymfetchError::MissingData("Could not get debug ID".to_string()))?;
        debug!(%build_id, "build id extracted");

        let debug_file = locate_debug_file(&debug_dir.path, &build_id)?;
        let command = SymbolLoadCommand::compose(&debug_file, library.base, &selected)?;

        reporter.report(Message::Loading(debug_file));
        for placement in command.placements() {
            reporter.report(Message::Placed {
                section: placement.name.clone(),
                address: placement.address,
            });
        }
        let text = command.to_string();
        reporter.report(Message::Command(text.clone()));

        let submission = host.execute(&text)?;
        Ok(Some((command, submission)))
    }
}

fn describe(error: &SymfetchError) -> String
{
    match error {
        SymfetchError::LibraryNotFound => "Cannot continue: libc not found".to_string(),
        other => format!("Error during execution: {other}"),
    }
}
