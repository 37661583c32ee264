//! Build identifier type.

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SymfetchError};

/// GNU build identifier of an ELF file
///
/// Always lowercase hex and at least three digits long, so the
/// `.build-id/<xx>/<rest>.debug` split is never empty on either side.
///
/// ## Example
///
/// ```rust
/// use symfetch_core::types::BuildId;
///
/// let id = BuildId::parse("ABCD1234").unwrap();
/// assert_eq!(id.as_str(), "abcd1234");
/// assert_eq!(id.split(), ("ab", "cd1234"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(String);

impl BuildId
{
    /// Validate a hex string taken from tool output
    ///
    /// ## Errors
    ///
    /// `InvalidBuildId` if the text is shorter than three characters or has
    /// non-hex characters.
    pub fn parse(text: &str) -> Result<Self>
    {
        let text = text.trim();
        if text.len() < 3 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SymfetchError::InvalidBuildId(text.to_string()));
        }
        Ok(BuildId(text.to_ascii_lowercase()))
    }

    /// Encode the raw bytes of an `NT_GNU_BUILD_ID` note
    ///
    /// ## Errors
    ///
    /// `InvalidBuildId` if `bytes` has fewer than two bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self>
    {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            // Writing to a String cannot fail
            let _ = write!(hex, "{byte:02x}");
        }
        Self::parse(&hex)
    }

    #[must_use]
    pub fn as_str(&self) -> &str
    {
        &self.0
    }

    /// First two digits (directory) and the rest (file stem)
    #[must_use]
    pub fn split(&self) -> (&str, &str)
    {
        self.0.split_at(2)
    }

    /// Location of the debug file under a debug root
    ///
    /// ```rust
    /// use std::path::Path;
    /// use symfetch_core::types::BuildId;
    ///
    /// let id = BuildId::parse("abcd1234").unwrap();
    /// assert_eq!(
    ///     id.debug_file_in(Path::new("/root")),
    ///     Path::new("/root/.build-id/ab/cd1234.debug")
    /// );
    /// ```
    #[must_use]
    pub fn debug_file_in(&self, root: &Path) -> PathBuf
    {
        let (dir, stem) = self.split();
        root.join(".build-id").join(dir).join(format!("{stem}.debug"))
    }
}

impl fmt::Display for BuildId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.0)
    }
}
