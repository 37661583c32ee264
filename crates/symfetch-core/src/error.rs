//! # Error Types
//!
//! Error handling for the symbol fetch pipeline.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages. No variant ever escapes a pipeline run: the
//! runner converts each one into a severity-tagged message and ends the run.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Main error type for symbol fetch operations
///
/// ## Error Categories
///
/// 1. **Discovery errors**: LibraryNotFound
/// 2. **Tool errors**: ToolUnavailable, ToolFailed
/// 3. **Data errors**: MissingData, InvalidBuildId, AddressOverflow, Elf
/// 4. **Lookup errors**: DebugFileMissing
/// 5. **Host errors**: CommandFailed, MappingsUnavailable, UnsafeScript
/// 6. **Setup errors**: InvalidArgument, InvalidPattern
/// 7. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum SymfetchError
{
    /// No mapping in the process matched the library pattern
    #[error("libc not found in process mappings")]
    LibraryNotFound,

    /// The host could not produce a mapping listing
    ///
    /// Typically there is no live process, or `/proc/<pid>/maps` is not
    /// readable by the current user.
    #[error("Cannot read process mappings: {0}")]
    MappingsUnavailable(String),

    /// The inspection tool could not be started
    ///
    /// Usually the program is not installed or not on `PATH`.
    #[error("Failed to execute {program}: {source}")]
    ToolUnavailable
    {
        /// Program that was spawned
        program: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// The inspection tool ran but exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed
    {
        /// Program that ran
        program: String,
        /// Its exit status
        status: ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// Section or identifier data is missing from the library
    #[error("{0}")]
    MissingData(String),

    /// The build identifier is not a usable hex string
    #[error("Invalid build ID '{0}'")]
    InvalidBuildId(String),

    /// Base address plus section offset does not fit in 64 bits
    #[error("Load address of {section} overflows (base 0x{base:x} + offset 0x{offset:x})")]
    AddressOverflow
    {
        /// Section being placed
        section: String,
        /// Library base address
        base: u64,
        /// Section file offset
        offset: u64,
    },

    /// The ELF file could not be parsed
    #[error("Malformed ELF file: {0}")]
    Elf(#[from] object::read::Error),

    /// No debug file at the resolved location
    #[error("Debug file '{}' not exists", .0.display())]
    DebugFileMissing(PathBuf),

    /// The debugger rejected the final command
    #[error("Debugger command failed: {0}")]
    CommandFailed(String),

    /// The script file for the debugger is not private to this user
    #[error("Refusing to write script '{}': {reason}", .path.display())]
    UnsafeScript
    {
        /// Script that was refused
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// Invalid argument or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The library-name pattern is not a valid regular expression
    #[error("Invalid library pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, SymfetchError>`
///
/// ```rust
/// use symfetch_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SymfetchError>;
