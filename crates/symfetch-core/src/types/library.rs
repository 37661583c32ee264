//! Library mapping type.

use std::path::{Path, PathBuf};

use super::Address;

/// A library image mapped into the debuggee
///
/// `base` is the start of the lowest mapping of the file, i.e. the address
/// where file offset 0 was loaded. Section load addresses are computed
/// relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryMapping
{
    /// Start address of the first mapping of the file
    pub base: Address,
    /// On-disk path of the mapped file, as the host reported it
    pub path: PathBuf,
}

impl LibraryMapping
{
    pub fn new(base: impl Into<Address>, path: impl Into<PathBuf>) -> Self
    {
        Self {
            base: base.into(),
            path: path.into(),
        }
    }

    /// Directory holding the library file
    ///
    /// Falls back to `/` for a bare file name, which never happens for a
    /// real mapping since the kernel reports absolute paths.
    #[must_use]
    pub fn directory(&self) -> &Path
    {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }
}
