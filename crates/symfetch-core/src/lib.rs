//! # symfetch-core
//!
//! Loads the debug symbols of a process's C library into a debugger session.
//!
//! Debugging against a non-default libc (a glibc-all-in-one build, a
//! container image, a CTF challenge's bundled `libc.so.6`) usually leaves the
//! debugger without symbols for it: the matching debug file exists on disk but
//! is not on the debugger's search path. This crate finds that file by the
//! library's GNU build-id and composes the `add-symbol-file` command that
//! loads it at the library's runtime addresses.
//!
//! ## Pipeline
//!
//! 1. [`maps`]: find the library and its base in the mapping listing
//! 2. [`inspect`]: read section offsets and the build-id from the file
//! 3. [`resolve`]: locate `<root>/.build-id/xx/rest.debug`
//! 4. [`compose`]: build the command
//! 5. [`pipeline`]: run the steps, submit through the [`host`], report
//!
//! [`extension`] registers the whole thing as a debugger command.
//!
//! ## Example
//!
//! ```rust,no_run
//! use symfetch_core::config::FetchConfig;
//! use symfetch_core::host::{MappingListing, ScriptHost};
//! use symfetch_core::inspect::Readelf;
//! use symfetch_core::pipeline::Fetcher;
//! use symfetch_core::report::CollectingReporter;
//!
//! let config = FetchConfig::from_env()?;
//! let fetcher = Fetcher::new(config.clone(), Readelf::new(config.readelf));
//! let mut host = ScriptHost::new(MappingListing::Proc(4242), std::io::stdout());
//! let mut reporter = CollectingReporter::new();
//! let outcome = fetcher.execute(None, &mut host, &mut reporter);
//! println!("command submitted: {}", outcome.is_success());
//! # Ok::<(), symfetch_core::SymfetchError>(())
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod events;
pub mod extension;
pub mod host;
pub mod inspect;
pub mod maps;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod script;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SymfetchError};
pub use extension::Extension;
pub use host::DebuggerHost;
pub use inspect::ElfInspector;
pub use pipeline::{Fetcher, Outcome};
