//! # Command Composition
//!
//! Turns a library base, its section offsets and the debug file into one
//! `add-symbol-file` command:
//!
//! ```text
//! add-symbol-file /root/.build-id/ab/cd1234.debug 0x1100 -s .rodata 0x1200
//! ```
//!
//! `.text` goes in the positional address slot; every other section gets an
//! `-s <name> <address>` option. GDB applies the whole command or nothing.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, SymfetchError};
use crate::types::{Address, SectionTable};

/// GDB command loading a separate symbol file at given addresses
pub const ADD_SYMBOL_FILE: &str = "add-symbol-file";

/// Section that takes the positional address argument
pub const TEXT_SECTION: &str = ".text";

/// Runtime load address of one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement
{
    pub name: String,
    pub address: Address,
}

/// A fully computed `add-symbol-file` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLoadCommand
{
    debug_file: PathBuf,
    text: Address,
    /// Every placed section in table order, `.text` included
    placements: Vec<Placement>,
}

impl SymbolLoadCommand
{
    /// Place every section of `sections` at `base + offset`
    ///
    /// `sections` is expected to be filtered down to the sections of
    /// interest already.
    ///
    /// ## Errors
    ///
    /// - `MissingData` if `.text` is not among `sections`
    /// - `AddressOverflow` if a load address does not fit in 64 bits
    pub fn compose(debug_file: &Path, base: Address, sections: &SectionTable) -> Result<Self>
    {
        let mut text = None;
        let mut placements = Vec::with_capacity(sections.len());
        for section in sections {
            let address = base
                .checked_add(section.offset)
                .ok_or_else(|| SymfetchError::AddressOverflow {
                    section: section.name.clone(),
                    base: base.value(),
                    offset: section.offset,
                })?;
            if section.name == TEXT_SECTION {
                text = Some(address);
            }
            placements.push(Placement {
                name: section.name.clone(),
                address,
            });
        }

        let text = text.ok_or_else(|| SymfetchError::MissingData(format!("No {TEXT_SECTION} section found")))?;
        Ok(Self {
            debug_file: debug_file.to_path_buf(),
            text,
            placements,
        })
    }

    #[must_use]
    pub fn debug_file(&self) -> &Path
    {
        &self.debug_file
    }

    /// Load address of `.text`
    #[must_use]
    pub fn text_address(&self) -> Address
    {
        self.text
    }

    /// All placed sections, in section table order
    #[must_use]
    pub fn placements(&self) -> &[Placement]
    {
        &self.placements
    }
}

impl fmt::Display for SymbolLoadCommand
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let path = self.debug_file.to_string_lossy();
        if path.contains(char::is_whitespace) {
            write!(f, "{ADD_SYMBOL_FILE} \"{path}\" {}", self.text)?;
        } else {
            write!(f, "{ADD_SYMBOL_FILE} {path} {}", self.text)?;
        }
        for placement in self.placements.iter().filter(|p| p.name != TEXT_SECTION) {
            write!(f, " -s {} {}", placement.name, placement.address)?;
        }
        Ok(())
    }
}
