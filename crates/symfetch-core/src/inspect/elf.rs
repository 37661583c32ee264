//! In-process ELF backend built on the `object` crate.

use std::fs;
use std::path::Path;

use object::read::elf::{ElfFile, ElfFile32, ElfFile64, FileHeader, SectionHeader};
use object::{Endianness, FileKind, Object, ObjectSection};
use tracing::debug;

use super::ElfInspector;
use crate::error::{Result, SymfetchError};
use crate::types::{BuildId, SectionTable};

/// Inspector that parses the ELF file itself
///
/// Offsets come from `sh_offset` of each section header, the same column
/// `readelf -S` prints, so both backends place sections identically. That
/// includes `.bss`, whose header offset is kept even though it occupies no
/// file space.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectInspector;

/// Kind of `data`, rejecting anything that is not ELF
fn elf_kind(path: &Path, data: &[u8]) -> Result<FileKind>
{
    match FileKind::parse(data)? {
        kind @ (FileKind::Elf32 | FileKind::Elf64) => Ok(kind),
        other => Err(SymfetchError::MissingData(format!(
            "{} is not an ELF file ({other:?})",
            path.display()
        ))),
    }
}

fn section_offsets<Elf>(file: &ElfFile<'_, Elf>) -> Result<SectionTable>
where
    Elf: FileHeader<Endian = Endianness>,
{
    let endian = file.endian();
    let mut table = SectionTable::new();
    for section in file.sections() {
        let name = section.name()?;
        let offset: u64 = section.elf_section_header().sh_offset(endian).into();
        table.insert(name, offset);
    }
    debug!(count = table.len(), "sections read from ELF header table");
    Ok(table)
}

fn build_id<Elf>(file: &ElfFile<'_, Elf>) -> Result<Option<BuildId>>
where
    Elf: FileHeader<Endian = Endianness>,
{
    file.build_id()?.map(BuildId::from_bytes).transpose()
}

impl ElfInspector for ObjectInspector
{
    fn name(&self) -> &'static str
    {
        "object"
    }

    fn sections(&self, path: &Path) -> Result<SectionTable>
    {
        let data = fs::read(path)?;
        match elf_kind(path, &data)? {
            FileKind::Elf32 => section_offsets(&ElfFile32::<Endianness>::parse(&*data)?),
            _ => section_offsets(&ElfFile64::<Endianness>::parse(&*data)?),
        }
    }

    fn build_id(&self, path: &Path) -> Result<Option<BuildId>>
    {
        let data = fs::read(path)?;
        match elf_kind(path, &data)? {
            FileKind::Elf32 => build_id(&ElfFile32::<Endianness>::parse(&*data)?),
            _ => build_id(&ElfFile64::<Endianness>::parse(&*data)?),
        }
    }
}
