//! # Extension Registration
//!
//! The one-time setup that exposes the fetch as a debugger command and,
//! when configured, subscribes it to stop events.
//!
//! Registration is an explicit call made once at startup. It returns an
//! [`Extension`] value that owns everything the command needs; there is no
//! global state behind it.
//!
//! GDB runs extension code in-process only for Python and Guile, so the GDB
//! side of the registration is a small command script ([`Extension::gdb_script`])
//! that defines `fetch-debug` in terms of the `symfetch` binary. The
//! script's `hook-stop` is the automatic mode GDB users get.
//!
//! [`Extension::invoke`], [`Extension::handle_event`] and
//! [`Extension::pump`] are the embedding API: a host that links this crate
//! and drives the debuggee itself feeds them its command arguments and
//! [`HostEvent`]s directly.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DEBUGDIR_ENV;
use crate::events::{HostEvent, HostEventReceiver};
use crate::host::DebuggerHost;
use crate::inspect::ElfInspector;
use crate::pipeline::{Fetcher, Outcome};
use crate::report::{Message, Reporter};

/// Name of the user command in the debugger
pub const COMMAND_NAME: &str = "fetch-debug";

/// Registered fetch command
pub struct Extension<I>
{
    fetcher: Fetcher<I>,
    auto_fetch: bool,
}

impl<I: ElfInspector> Extension<I>
{
    /// Register the command, and the stop subscription if the configuration
    /// asks for automatic fetching
    pub fn register<R: Reporter + ?Sized>(fetcher: Fetcher<I>, reporter: &mut R) -> Self
    {
        let auto_fetch = fetcher.config().auto_fetch;
        if auto_fetch {
            reporter.report(Message::AutoFetchEnabled);
        }
        info!(command = COMMAND_NAME, auto_fetch, "extension registered");
        Self { fetcher, auto_fetch }
    }

    #[must_use]
    pub fn auto_fetch(&self) -> bool
    {
        self.auto_fetch
    }

    #[must_use]
    pub fn fetcher(&self) -> &Fetcher<I>
    {
        &self.fetcher
    }

    /// Run the command with its raw argument string
    ///
    /// Only the first argument is used, as the debug root directory. Quotes
    /// group words the way the debugger's own argument splitting does.
    pub fn invoke<H, R>(&self, argument: &str, host: &mut H, reporter: &mut R) -> Outcome
    where
        H: DebuggerHost + ?Sized,
        R: Reporter + ?Sized,
    {
        let explicit = first_argument(argument);
        self.fetcher.execute(explicit.as_deref(), host, reporter)
    }

    /// React to one host event
    ///
    /// Returns the outcome when the event triggered a run.
    pub fn handle_event<H, R>(&self, event: &HostEvent, host: &mut H, reporter: &mut R) -> Option<Outcome>
    where
        H: DebuggerHost + ?Sized,
        R: Reporter + ?Sized,
    {
        if !self.auto_fetch || !event.is_stop() {
            return None;
        }
        debug!(event = %event.describe(), "stop event, fetching symbols");
        Some(self.fetcher.execute(None, host, reporter))
    }

    /// Handle every event queued on `events` without blocking
    ///
    /// Returns the number of runs triggered.
    pub fn pump<H, R>(&self, events: &HostEventReceiver, host: &mut H, reporter: &mut R) -> usize
    where
        H: DebuggerHost + ?Sized,
        R: Reporter + ?Sized,
    {
        let mut runs = 0;
        for event in events.try_iter() {
            if self.handle_event(&event, host, reporter).is_some() {
                runs += 1;
            }
        }
        runs
    }

    /// GDB command script registering `fetch-debug`
    ///
    /// `binary` is the `symfetch` executable; `emit_path` is the script each
    /// run writes its command to. It is sourced only when the run exited
    /// successfully, so a failed or refused run never feeds GDB stale text.
    ///
    /// Without an argument the command passes GDB's `$DEBUGDIR` convenience
    /// variable on as the configured debug root when it is set. Unless
    /// automatic fetching is already on, setting `$FETCH_DEFAULT` before the
    /// script is sourced installs the stop hook.
    #[must_use]
    pub fn gdb_script(&self, binary: &Path, emit_path: &Path) -> String
    {
        let tail = format!(
            "{} load --mappings - --emit {}",
            shell_quote(&binary.to_string_lossy()),
            shell_quote(&emit_path.to_string_lossy()),
        );
        let run = format!("pipe info proc mappings | {tail}");
        let run_with_dir = gdb_string_escape(&format!(
            "pipe info proc mappings | {}='%s' {}",
            DEBUGDIR_ENV[0],
            tail.replace('%', "%%")
        ));

        let mut script = format!(
            "\
# symfetch: load libc debug symbols matched by build-id
define {COMMAND_NAME}
  if $argc == 0
    if $_isvoid($DEBUGDIR)
      {run}
    else
      eval \"{run_with_dir}\", $DEBUGDIR
    end
  else
    {run} $arg0
  end
  if $_shell_exitcode == 0
    source {emit}
  end
end
document {COMMAND_NAME}
Fetch and load libc debug symbols by build-id.
Usage: {COMMAND_NAME} [PATH]
PATH is the debug root holding .build-id/. Without it, $DEBUGDIR,
$SYMFETCH_DEBUGDIR or $DEBUGDIR from the environment is used if it is a
directory, else <libc dir>/.debug.
end
",
            emit = emit_path.display(),
        );
        if self.auto_fetch {
            script.push_str(&format!("define hook-stop\n  {COMMAND_NAME}\nend\n"));
        } else {
            script.push_str(&format!(
                "\
if !$_isvoid($FETCH_DEFAULT)
  if $FETCH_DEFAULT
    echo [*] {enabled}\\n
    define hook-stop
      {COMMAND_NAME}
    end
  end
end
",
                enabled = Message::AutoFetchEnabled,
            ));
        }
        script
    }
}

/// First word of a debugger command argument string
fn first_argument(argument: &str) -> Option<PathBuf>
{
    let mut word = String::new();
    let mut quote = None;
    let mut chars = argument.trim_start().chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (_, '\\') => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            (None, c) if c.is_whitespace() => break,
            (_, c) => word.push(c),
        }
    }
    (!word.is_empty()).then(|| PathBuf::from(word))
}

/// Escape `text` for a double-quoted GDB string
fn gdb_string_escape(text: &str) -> String
{
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Single-quote `text` for `/bin/sh`
fn shell_quote(text: &str) -> String
{
    format!("'{}'", text.replace('\'', r"'\''"))
}
