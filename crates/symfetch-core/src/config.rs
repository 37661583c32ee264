//! # Configuration
//!
//! Read-only settings shared by every run. They are read from the
//! environment once at startup and may be overridden by command-line flags
//! before the first run; nothing changes them afterwards.
//!
//! ## Environment Variables
//!
//! - `SYMFETCH_DEBUGDIR` (or `DEBUGDIR`): default debug root directory
//! - `SYMFETCH_AUTO` (or `FETCH_DEFAULT`): fetch automatically on every stop
//! - `SYMFETCH_READELF`: inspection program (default `readelf`)
//! - `SYMFETCH_SECTIONS`: comma-separated sections to place
//!   (default `.text,.rodata,.data,.bss`)
//! - `SYMFETCH_LIBRARY_PATTERN`: regex selecting the library mapping

use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SymfetchError};

pub const DEBUGDIR_ENV: &[&str] = &["SYMFETCH_DEBUGDIR", "DEBUGDIR"];
pub const AUTO_ENV: &[&str] = &["SYMFETCH_AUTO", "FETCH_DEFAULT"];
pub const READELF_ENV: &str = "SYMFETCH_READELF";
pub const SECTIONS_ENV: &str = "SYMFETCH_SECTIONS";
pub const LIBRARY_PATTERN_ENV: &str = "SYMFETCH_LIBRARY_PATTERN";

/// Sections placed by default. `.text` is mandatory in any list.
pub const DEFAULT_SECTIONS: [&str; 4] = [".text", ".rodata", ".data", ".bss"];

/// Matches `/libc.so.6` and versioned names like `/libc-2.31.so`.
pub const DEFAULT_LIBRARY_PATTERN: &str = r"/libc-?([0-9]\.\d{2})?\.so";

pub const DEFAULT_READELF: &str = "readelf";

static DEFAULT_LIBRARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_LIBRARY_PATTERN).unwrap());

/// Settings for a fetch run
#[derive(Debug, Clone)]
pub struct FetchConfig
{
    /// Debug root used when no directory is given to the command
    pub debug_dir: Option<PathBuf>,
    /// Run the fetch on every stop of the debuggee
    pub auto_fetch: bool,
    /// Program used by the readelf inspector
    pub readelf: String,
    /// Sections to place, in addition to the mandatory `.text`
    pub sections: Vec<String>,
    /// Selects the library among the process mappings
    pub library_pattern: Regex,
}

impl Default for FetchConfig
{
    fn default() -> Self
    {
        Self {
            debug_dir: None,
            auto_fetch: false,
            readelf: DEFAULT_READELF.to_string(),
            sections: DEFAULT_SECTIONS.iter().map(ToString::to_string).collect(),
            library_pattern: DEFAULT_LIBRARY_REGEX.clone(),
        }
    }
}

impl FetchConfig
{
    /// Load settings from the process environment
    ///
    /// ## Errors
    ///
    /// `InvalidPattern` or `InvalidArgument` for malformed values.
    pub fn from_env() -> Result<Self>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    ///
    /// ## Errors
    ///
    /// `InvalidPattern` or `InvalidArgument` for malformed values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|&key| get(key));

        let mut config = Self {
            debug_dir: first(DEBUGDIR_ENV).map(PathBuf::from),
            auto_fetch: first(AUTO_ENV).is_some_and(|v| is_truthy(&v)),
            readelf: get(READELF_ENV).unwrap_or_else(|| DEFAULT_READELF.to_string()),
            ..Self::default()
        };
        if let Some(list) = get(SECTIONS_ENV) {
            config = config.with_sections(&list)?;
        }
        if let Some(pattern) = get(LIBRARY_PATTERN_ENV) {
            config = config.with_library_pattern(&pattern)?;
        }
        Ok(config)
    }

    /// Replace the section list with a comma-separated one
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if the list does not name `.text`.
    pub fn with_sections(mut self, list: &str) -> Result<Self>
    {
        let sections: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        if !sections.iter().any(|s| s == ".text") {
            return Err(SymfetchError::InvalidArgument(format!(
                "section list '{list}' must include .text"
            )));
        }
        self.sections = sections;
        Ok(self)
    }

    /// ## Errors
    ///
    /// `InvalidPattern` if `pattern` is not a valid regular expression.
    pub fn with_library_pattern(mut self, pattern: &str) -> Result<Self>
    {
        self.library_pattern = Regex::new(pattern)?;
        Ok(self)
    }
}

/// Flag values the way a shell user writes them
fn is_truthy(value: &str) -> bool
{
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
