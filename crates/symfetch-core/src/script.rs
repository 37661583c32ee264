//! # Emitted Script Files
//!
//! The GDB command sources the script `symfetch load --emit` writes, so
//! whoever controls that file controls the debugger session. The default
//! location is a per-user directory, and every write goes through
//! [`open_script`], which only accepts a regular file owned by the current
//! user and leaves it mode `0600`.

#![allow(unsafe_code)] // geteuid() requires unsafe

use std::fs::{DirBuilder, File, Metadata, OpenOptions, Permissions};
use std::os::unix::fs::{DirBuilderExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SymfetchError};

/// Directory created under the per-user base directory
pub const APP_DIR_NAME: &str = "symfetch";
/// File name of the default emitted script
pub const SCRIPT_FILE_NAME: &str = "fetch.gdb";

const PRIVATE_FILE_MODE: u32 = 0o600;
const PRIVATE_DIR_MODE: u32 = 0o700;

/// Effective user id of this process
#[must_use]
pub fn current_uid() -> u32
{
    unsafe { libc::geteuid() }
}

/// Default script location for the current user
///
/// `$XDG_RUNTIME_DIR/symfetch/fetch.gdb`, else the same under
/// `$XDG_CACHE_HOME`, else under `$HOME/.cache`. Relative values are ignored.
///
/// ## Errors
///
/// `InvalidArgument` when none of the variables names an absolute directory.
pub fn default_script_path<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let absolute = |key: &str| lookup(key).map(PathBuf::from).filter(|p| p.is_absolute());

    let base = absolute("XDG_RUNTIME_DIR")
        .or_else(|| absolute("XDG_CACHE_HOME"))
        .or_else(|| absolute("HOME").map(|home| home.join(".cache")))
        .ok_or_else(|| {
            SymfetchError::InvalidArgument(
                "no private directory for the fetch script; set XDG_RUNTIME_DIR or HOME, or pass --script-path"
                    .to_string(),
            )
        })?;
    Ok(base.join(APP_DIR_NAME).join(SCRIPT_FILE_NAME))
}

/// Create the parent directory of `script` as a private directory
///
/// An existing directory is accepted only if it belongs to the current user
/// and nobody else can write to it.
///
/// ## Errors
///
/// `UnsafeScript` for a foreign or shared directory, `Io` if it cannot be
/// created.
pub fn prepare_script_dir(script: &Path) -> Result<()>
{
    let Some(dir) = script.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    DirBuilder::new().recursive(true).mode(PRIVATE_DIR_MODE).create(dir)?;

    let meta = dir.symlink_metadata()?;
    let refuse = |reason: String| SymfetchError::UnsafeScript {
        path: script.to_path_buf(),
        reason,
    };
    if !meta.is_dir() {
        return Err(refuse(format!("{} is not a directory", dir.display())));
    }
    if meta.uid() != current_uid() {
        return Err(refuse(format!("{} is owned by uid {}", dir.display(), meta.uid())));
    }
    if meta.mode() & 0o022 != 0 {
        return Err(refuse(format!("{} is writable by other users", dir.display())));
    }
    Ok(())
}

/// Open `path` for a fresh script, emptied and private to the current user
///
/// Symbolic links are never followed. The file is checked before anything
/// is written, so a refused file keeps its contents.
///
/// ## Errors
///
/// `UnsafeScript` when the file is not a regular file owned by the current
/// user, `Io` when it cannot be opened.
pub fn open_script(path: &Path) -> Result<File>
{
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(PRIVATE_FILE_MODE)
        .custom_flags(libc::O_NOFOLLOW)
        .open(path)
        .map_err(|e| match e.raw_os_error() {
            Some(libc::ELOOP) => SymfetchError::UnsafeScript {
                path: path.to_path_buf(),
                reason: "it is a symbolic link".to_string(),
            },
            _ => SymfetchError::Io(e),
        })?;

    verify_owner(&file.metadata()?, current_uid()).map_err(|reason| SymfetchError::UnsafeScript {
        path: path.to_path_buf(),
        reason,
    })?;
    file.set_permissions(Permissions::from_mode(PRIVATE_FILE_MODE))?;
    file.set_len(0)?;
    debug!(path = %path.display(), "script opened");
    Ok(file)
}

fn verify_owner(meta: &Metadata, uid: u32) -> std::result::Result<(), String>
{
    if !meta.is_file() {
        return Err("it is not a regular file".to_string());
    }
    if meta.uid() != uid {
        return Err(format!("it is owned by uid {}", meta.uid()));
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;
    use std::fs;
    use std::os::unix::fs::symlink;

    use tempfile::TempDir;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_path_prefers_runtime_dir()
    {
        let vars = [("XDG_RUNTIME_DIR", "/run/user/1000"), ("HOME", "/home/dev")];
        assert_eq!(
            default_script_path(lookup(&vars)).unwrap(),
            Path::new("/run/user/1000/symfetch/fetch.gdb")
        );
    }

    #[test]
    fn test_default_path_falls_back_to_cache()
    {
        let vars = [("XDG_RUNTIME_DIR", "relative/run"), ("HOME", "/home/dev")];
        assert_eq!(
            default_script_path(lookup(&vars)).unwrap(),
            Path::new("/home/dev/.cache/symfetch/fetch.gdb")
        );
        let vars = [("XDG_CACHE_HOME", "/var/cache/dev"), ("HOME", "/home/dev")];
        assert_eq!(
            default_script_path(lookup(&vars)).unwrap(),
            Path::new("/var/cache/dev/symfetch/fetch.gdb")
        );
    }

    #[test]
    fn test_default_path_needs_some_base()
    {
        assert!(matches!(
            default_script_path(lookup(&[])),
            Err(SymfetchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_prepared_directory_is_private()
    {
        let base = TempDir::new().unwrap();
        let script = base.path().join("symfetch").join(SCRIPT_FILE_NAME);
        prepare_script_dir(&script).unwrap();

        let mode = fs::metadata(base.path().join("symfetch")).unwrap().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_shared_directory_is_refused()
    {
        let base = TempDir::new().unwrap();
        let shared = base.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::set_permissions(&shared, Permissions::from_mode(0o777)).unwrap();

        let result = prepare_script_dir(&shared.join(SCRIPT_FILE_NAME));
        assert!(matches!(result, Err(SymfetchError::UnsafeScript { .. })));
    }

    #[test]
    fn test_open_empties_own_file_and_makes_it_private()
    {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join(SCRIPT_FILE_NAME);
        fs::write(&script, "shell echo stale\n").unwrap();
        fs::set_permissions(&script, Permissions::from_mode(0o666)).unwrap();

        drop(open_script(&script).unwrap());

        assert_eq!(fs::read_to_string(&script).unwrap(), "");
        assert_eq!(fs::metadata(&script).unwrap().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_symlink_is_refused_and_target_kept()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target.gdb");
        fs::write(&target, "shell echo kept\n").unwrap();
        let script = dir.path().join(SCRIPT_FILE_NAME);
        symlink(&target, &script).unwrap();

        let result = open_script(&script);

        assert!(matches!(result, Err(SymfetchError::UnsafeScript { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "shell echo kept\n");
    }

    #[test]
    fn test_directory_is_refused()
    {
        let dir = TempDir::new().unwrap();
        assert!(open_script(dir.path()).is_err());
    }

    #[test]
    fn test_foreign_owner_is_refused()
    {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join(SCRIPT_FILE_NAME);
        fs::write(&script, "").unwrap();
        let meta = fs::metadata(&script).unwrap();

        assert!(verify_owner(&meta, meta.uid()).is_ok());
        let reason = verify_owner(&meta, meta.uid().wrapping_add(1)).unwrap_err();
        assert!(reason.contains("owned by uid"));
    }
}
