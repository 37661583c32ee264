//! # Debug File Resolution
//!
//! Picks the debug root and finds the build-id indexed debug file under it:
//!
//! ```text
//! <root>/.build-id/<first 2 hex digits>/<remaining hex digits>.debug
//! ```
//!
//! This is the layout distributions ship (`/usr/lib/debug/.build-id/...`) and
//! the one glibc-all-in-one style toolchains unpack next to each libc.

use std::path::{self, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SymfetchError};
use crate::types::{BuildId, LibraryMapping};

/// Name of the debug root inferred next to the library
pub const INFERRED_DIR_NAME: &str = ".debug";

/// Where the chosen debug root came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugDirSource
{
    /// Argument of the fetch command
    Explicit,
    /// `SYMFETCH_DEBUGDIR` / `DEBUGDIR`
    Configured,
    /// `.debug` inside the library's directory
    Inferred,
}

/// Debug root chosen for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugDir
{
    pub path: PathBuf,
    pub source: DebugDirSource,
}

/// Choose the debug root
///
/// Precedence: explicit argument, then the configured directory if it is an
/// existing directory, then `<library dir>/.debug`. An explicit argument is
/// taken as given; if it is wrong the debug file lookup reports the full
/// path that was tried.
#[must_use]
pub fn choose_debug_dir(explicit: Option<&Path>, configured: Option<&Path>, library: &LibraryMapping) -> DebugDir
{
    if let Some(path) = explicit {
        return DebugDir {
            path: path.to_path_buf(),
            source: DebugDirSource::Explicit,
        };
    }

    if let Some(path) = configured {
        if path.is_dir() {
            return DebugDir {
                path: path.to_path_buf(),
                source: DebugDirSource::Configured,
            };
        }
        warn!(path = %path.display(), "configured debug directory does not exist, ignoring");
    }

    DebugDir {
        path: library.directory().join(INFERRED_DIR_NAME),
        source: DebugDirSource::Inferred,
    }
}

/// Absolute path of the debug file for `id` under `root`
///
/// Relative roots are joined to the working directory; symlinks are kept.
///
/// ## Errors
///
/// `DebugFileMissing` if no file exists there, `Io` if the working directory
/// cannot be determined.
pub fn locate_debug_file(root: &Path, id: &BuildId) -> Result<PathBuf>
{
    let candidate = path::absolute(id.debug_file_in(root))?;
    debug!(path = %candidate.display(), "checking debug file");
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(SymfetchError::DebugFileMissing(candidate))
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn library_in(dir: &Path) -> LibraryMapping
    {
        LibraryMapping::new(0x7f00_0000_0000, dir.join("libc.so.6"))
    }

    #[test]
    fn test_explicit_argument_wins()
    {
        let configured = TempDir::new().unwrap();
        let lib = TempDir::new().unwrap();

        let dir = choose_debug_dir(
            Some(Path::new("/opt/dbg")),
            Some(configured.path()),
            &library_in(lib.path()),
        );
        assert_eq!(dir.path, Path::new("/opt/dbg"));
        assert_eq!(dir.source, DebugDirSource::Explicit);
    }

    #[test]
    fn test_configured_directory_used_when_it_exists()
    {
        let configured = TempDir::new().unwrap();
        let lib = TempDir::new().unwrap();

        let dir = choose_debug_dir(None, Some(configured.path()), &library_in(lib.path()));
        assert_eq!(dir.path, configured.path());
        assert_eq!(dir.source, DebugDirSource::Configured);
    }

    #[test]
    fn test_missing_configured_directory_falls_back_to_library()
    {
        let lib = TempDir::new().unwrap();
        let gone = lib.path().join("nope");

        let dir = choose_debug_dir(None, Some(&gone), &library_in(lib.path()));
        assert_eq!(dir.path, lib.path().join(".debug"));
        assert_eq!(dir.source, DebugDirSource::Inferred);
    }

    #[test]
    fn test_configured_file_is_not_a_directory()
    {
        let lib = TempDir::new().unwrap();
        let file = lib.path().join("DEBUGDIR");
        fs::write(&file, b"").unwrap();

        let dir = choose_debug_dir(None, Some(&file), &library_in(lib.path()));
        assert_eq!(dir.source, DebugDirSource::Inferred);
    }

    #[test]
    fn test_locate_existing_debug_file()
    {
        let root = TempDir::new().unwrap();
        let id = BuildId::parse("abcd1234").unwrap();
        let expected = root.path().join(".build-id/ab/cd1234.debug");
        fs::create_dir_all(expected.parent().unwrap()).unwrap();
        fs::write(&expected, b"\x7fELF").unwrap();

        assert_eq!(locate_debug_file(root.path(), &id).unwrap(), expected);
    }

    #[test]
    fn test_locate_missing_debug_file()
    {
        let root = TempDir::new().unwrap();
        let id = BuildId::parse("abcd1234").unwrap();

        match locate_debug_file(root.path(), &id) {
            Err(SymfetchError::DebugFileMissing(path)) => {
                assert_eq!(path, root.path().join(".build-id/ab/cd1234.debug"));
            }
            other => panic!("expected DebugFileMissing, got {other:?}"),
        }
    }
}
