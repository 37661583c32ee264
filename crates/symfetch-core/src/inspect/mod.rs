//! # Binary Inspection
//!
//! Reads the two facts a fetch run needs from the on-disk library: its
//! section offsets and its build identifier.
//!
//! Two interchangeable backends implement [`ElfInspector`]:
//!
//! - [`Readelf`]: runs `readelf -S` / `readelf -n` and scrapes the text
//!   report. Matches exactly what a user would see when checking by hand.
//! - [`ObjectInspector`]: reads the section header table and notes directly
//!   with the `object` crate, for hosts without binutils.
//!
//! The pipeline only sees the trait, so the fragile text scraping can be
//! swapped out without touching it.

mod elf;
mod readelf;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use elf::ObjectInspector;
pub use readelf::{parse_build_id, parse_section_headers, Readelf};

use crate::config::FetchConfig;
use crate::error::{Result, SymfetchError};
use crate::types::{BuildId, SectionTable};

/// Source of section and build-id data for an ELF file
pub trait ElfInspector
{
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// All sections with a non-zero file offset, in header order
    ///
    /// A report without a section header table yields an empty table.
    ///
    /// ## Errors
    ///
    /// `ToolUnavailable`/`ToolFailed` when the inspection tool cannot run,
    /// `Elf` or `Io` when the file cannot be read.
    fn sections(&self, path: &Path) -> Result<SectionTable>;

    /// The GNU build identifier, if the file carries one
    ///
    /// ## Errors
    ///
    /// As for [`ElfInspector::sections`], plus `InvalidBuildId` when the
    /// identifier found is not hex.
    fn build_id(&self, path: &Path) -> Result<Option<BuildId>>;
}

/// Available inspection backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InspectorKind
{
    /// External `readelf` program
    #[default]
    Readelf,
    /// In-process ELF parsing
    Object,
}

impl FromStr for InspectorKind
{
    type Err = SymfetchError;

    fn from_str(s: &str) -> Result<Self>
    {
        match s.to_ascii_lowercase().as_str() {
            "readelf" => Ok(Self::Readelf),
            "object" | "builtin" => Ok(Self::Object),
            _ => Err(SymfetchError::InvalidArgument(format!(
                "unknown inspector '{s}', use 'readelf' or 'object'"
            ))),
        }
    }
}

impl fmt::Display for InspectorKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Readelf => f.write_str("readelf"),
            Self::Object => f.write_str("object"),
        }
    }
}

/// Build the inspector for `kind`
///
/// ```rust
/// use symfetch_core::config::FetchConfig;
/// use symfetch_core::inspect::{create_inspector, InspectorKind};
///
/// let inspector = create_inspector(InspectorKind::Object, &FetchConfig::default());
/// assert_eq!(inspector.name(), "object");
/// ```
#[must_use]
pub fn create_inspector(kind: InspectorKind, config: &FetchConfig) -> Box<dyn ElfInspector>
{
    match kind {
        InspectorKind::Readelf => Box::new(Readelf::new(config.readelf.clone())),
        InspectorKind::Object => Box::new(ObjectInspector),
    }
}

impl<T: ElfInspector + ?Sized> ElfInspector for &T
{
    fn name(&self) -> &'static str
    {
        (**self).name()
    }

    fn sections(&self, path: &Path) -> Result<SectionTable>
    {
        (**self).sections(path)
    }

    fn build_id(&self, path: &Path) -> Result<Option<BuildId>>
    {
        (**self).build_id(path)
    }
}

impl<T: ElfInspector + ?Sized> ElfInspector for Box<T>
{
    fn name(&self) -> &'static str
    {
        (**self).name()
    }

    fn sections(&self, path: &Path) -> Result<SectionTable>
    {
        (**self).sections(path)
    }

    fn build_id(&self, path: &Path) -> Result<Option<BuildId>>
    {
        (**self).build_id(path)
    }
}
