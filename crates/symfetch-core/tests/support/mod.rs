//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use symfetch_core::error::{Result, SymfetchError};
use symfetch_core::host::{DebuggerHost, Submission};
use symfetch_core::inspect::ElfInspector;
use symfetch_core::types::{BuildId, SectionTable};
use tempfile::TempDir;

/// Host serving a fixed listing and recording submitted commands
#[derive(Default)]
pub struct FakeHost
{
    pub listing: String,
    pub executed: Vec<String>,
    pub reject: bool,
}

impl FakeHost
{
    pub fn with_listing(listing: impl Into<String>) -> Self
    {
        Self {
            listing: listing.into(),
            ..Self::default()
        }
    }
}

impl DebuggerHost for FakeHost
{
    fn mappings(&mut self) -> Result<String>
    {
        Ok(self.listing.clone())
    }

    fn execute(&mut self, command: &str) -> Result<Submission>
    {
        if self.reject {
            return Err(SymfetchError::CommandFailed("No symbol table is loaded.".to_string()));
        }
        self.executed.push(command.to_string());
        Ok(Submission::Executed)
    }
}

/// Inspector returning canned data and counting how often it was asked
pub struct FakeInspector
{
    pub sections: SectionTable,
    pub build_id: Option<&'static str>,
    pub calls: Cell<usize>,
}

impl FakeInspector
{
    pub fn new(sections: &[(&str, u64)], build_id: Option<&'static str>) -> Self
    {
        Self {
            sections: sections.iter().copied().collect(),
            build_id,
            calls: Cell::new(0),
        }
    }
}

impl ElfInspector for FakeInspector
{
    fn name(&self) -> &'static str
    {
        "fake"
    }

    fn sections(&self, _path: &Path) -> Result<SectionTable>
    {
        self.calls.set(self.calls.get() + 1);
        Ok(self.sections.clone())
    }

    fn build_id(&self, _path: &Path) -> Result<Option<BuildId>>
    {
        self.calls.set(self.calls.get() + 1);
        self.build_id.map(BuildId::parse).transpose()
    }
}

/// A library directory with a stand-in `libc.so.6`
pub struct Sandbox
{
    pub dir: TempDir,
}

impl Sandbox
{
    pub fn new() -> Self
    {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("libc.so.6"), b"\x7fELF").unwrap();
        Self { dir }
    }

    pub fn library(&self) -> PathBuf
    {
        self.dir.path().join("libc.so.6")
    }

    /// GDB-style listing mapping the library at `base`
    pub fn listing(&self, base: u64) -> String
    {
        format!(
            "          Start Addr           End Addr       Size     Offset  Perms  objfile\n\
             \x20     0x555555554000     0x555555555000     0x1000        0x0  r--p   /tmp/a.out\n\
             \x20     {base:#x} {:#x} 0x28000 0x0 r--p {}\n",
            base + 0x28000,
            self.library().display()
        )
    }

    /// Create `<root>/.build-id/xx/rest.debug` and return its path
    pub fn install_debug_file(root: &Path, build_id: &str) -> PathBuf
    {
        let path = root
            .join(".build-id")
            .join(&build_id[..2])
            .join(format!("{}.debug", &build_id[2..]));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"\x7fELF").unwrap();
        path
    }
}
