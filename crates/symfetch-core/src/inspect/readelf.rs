//! `readelf` backend.

use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::ElfInspector;
use crate::error::{Result, SymfetchError};
use crate::types::{BuildId, SectionTable};

/// `[Nr] Name Type Address Offset`: captures name and offset.
static SECTION_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\[\s*\d+\]\s+(\S+)\s+\S+\s+\S+\s+(\S+)").unwrap());
static BUILD_ID_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*Build ID.*:\s+(\w+)").unwrap());

const HEADER_MARKER: &str = "[Nr] Name";

/// Inspector backed by the binutils `readelf` program
#[derive(Debug, Clone)]
pub struct Readelf
{
    program: String,
}

impl Readelf
{
    pub fn new(program: impl Into<String>) -> Self
    {
        Self { program: program.into() }
    }

    #[must_use]
    pub fn program(&self) -> &str
    {
        &self.program
    }

    fn run(&self, flag: &str, path: &Path) -> Result<String>
    {
        debug!(program = %self.program, flag, path = %path.display(), "running inspection tool");
        let output = Command::new(&self.program)
            .arg(flag)
            .arg(path)
            // Keep the labels we match on in English
            .env("LC_ALL", "C")
            .output()
            .map_err(|source| SymfetchError::ToolUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SymfetchError::ToolFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ElfInspector for Readelf
{
    fn name(&self) -> &'static str
    {
        "readelf"
    }

    fn sections(&self, path: &Path) -> Result<SectionTable>
    {
        let report = self.run("-S", path)?;
        let table = parse_section_headers(&report);
        if table.is_empty() {
            warn!(path = %path.display(), "no section header found");
        }
        Ok(table)
    }

    fn build_id(&self, path: &Path) -> Result<Option<BuildId>>
    {
        let report = self.run("-n", path)?;
        match parse_build_id(&report) {
            Some(token) => BuildId::parse(token).map(Some),
            None => {
                warn!(path = %path.display(), "no Build ID found");
                Ok(None)
            }
        }
    }
}

/// Parse a `readelf -S` report into a section table
///
/// Rows before the `[Nr] Name` header are ignored. Rows with a zero or
/// non-hex offset are dropped. Works for both the two-line 64-bit layout and
/// the single-line `-W`/32-bit layout, since the offset is the fourth column
/// after the index either way.
#[must_use]
pub fn parse_section_headers(report: &str) -> SectionTable
{
    let mut lines = report.lines();
    if !lines.by_ref().any(|line| line.contains(HEADER_MARKER)) {
        return SectionTable::new();
    }

    let mut table = SectionTable::new();
    for line in lines {
        let Some(caps) = SECTION_ROW.captures(line) else {
            continue;
        };
        let name = &caps[1];
        match u64::from_str_radix(&caps[2], 16) {
            Ok(offset) => {
                table.insert(name, offset);
            }
            Err(_) => debug!(name, offset = &caps[2], "unparseable section offset"),
        }
    }
    table
}

/// First `Build ID: <hex>` token of a `readelf -n` report
#[must_use]
pub fn parse_build_id(report: &str) -> Option<&str>
{
    report
        .lines()
        .find_map(|line| BUILD_ID_LINE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
mod tests
{
    use super::*;

    const SECTIONS_64: &str = "\
There are 66 section headers, starting at offset 0x1e8b40:

Section Headers:
  [Nr] Name              Type             Address           Offset
       Size              EntSize          Flags  Link  Info  Align
  [ 0]                   NULL             0000000000000000  00000000
       0000000000000000  0000000000000000           0     0     0
  [ 1] .note.gnu.pr[...] NOTE             0000000000000350  00000350
       0000000000000020  0000000000000000   A       0     0     8
  [16] .text             PROGBITS         0000000000028700  00028700
       0000000000192f9d  0000000000000000  AX       0     0     64
  [18] .rodata           PROGBITS         00000000001bc000  001bc000
       000000000001f0f5  0000000000000000   A       0     0     32
  [33] .data             PROGBITS         0000000000202000  00201000
       00000000000016b0  0000000000000000  WA       0     0     32
  [34] .bss              NOBITS           00000000002036c0  002026b0
       000000000000e0d0  0000000000000000  WA       0     0     64
  [35] .gnu.warning      PROGBITS         0000000000000000  000000
       000000000000003a  0000000000000000           0     0     1
Key to Flags:
  W (write), A (alloc), X (execute), M (merge), S (strings), I (info),
";

    const SECTIONS_32: &str = "\
Section Headers:
  [Nr] Name              Type            Addr     Off    Size   ES Flg Lk Inf Al
  [ 0]                   NULL            00000000 000000 000000 00      0   0  0
  [ 1] .interp           PROGBITS        00000174 000174 000013 00   A  0   0  1
  [12] .text             PROGBITS        00018f20 018f20 1573ae 00  AX  0   0 16
  [13] .broken           PROGBITS        00018f20 zz18f2 1573ae 00  AX  0   0 16
";

    const NOTES: &str = "\
Displaying notes found in: .note.gnu.property
  Owner                Data size \tDescription
  GNU                  0x00000020\tNT_GNU_PROPERTY_TYPE_0
      Properties: x86 feature: IBT, SHSTK

Displaying notes found in: .note.gnu.build-id
  Owner                Data size \tDescription
  GNU                  0x00000014\tNT_GNU_BUILD_ID (unique build ID bitstring)
    Build ID: 2e01923fea4ad9f7fa50fe24e0f3385a45a6cd1c  
";

    #[test]
    fn test_parse_64bit_report()
    {
        let table = parse_section_headers(SECTIONS_64);

        assert_eq!(table.offset(".text"), Some(0x28700));
        assert_eq!(table.offset(".rodata"), Some(0x1b_c000));
        assert_eq!(table.offset(".data"), Some(0x20_1000));
        assert_eq!(table.offset(".bss"), Some(0x20_26b0));
        assert_eq!(table.offset(".note.gnu.pr[...]"), Some(0x350));
        // zero offset
        assert_eq!(table.offset(".gnu.warning"), None);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_parse_32bit_report()
    {
        let table = parse_section_headers(SECTIONS_32);

        assert_eq!(table.offset(".interp"), Some(0x174));
        assert_eq!(table.offset(".text"), Some(0x18f20));
        assert_eq!(table.offset(".broken"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rows_before_header_are_ignored()
    {
        let report = "  [ 1] .text PROGBITS 0000000000001000 00001000\n";
        assert!(parse_section_headers(report).is_empty());
        assert!(parse_section_headers("").is_empty());
    }

    #[test]
    fn test_parse_build_id()
    {
        assert_eq!(parse_build_id(NOTES), Some("2e01923fea4ad9f7fa50fe24e0f3385a45a6cd1c"));
        assert_eq!(parse_build_id("Displaying notes found in: .note.ABI-tag\n"), None);
    }

    #[test]
    fn test_missing_program_is_unavailable()
    {
        let readelf = Readelf::new("/nonexistent/symfetch-readelf");
        let result = readelf.sections(Path::new("/bin/sh"));
        assert!(matches!(result, Err(SymfetchError::ToolUnavailable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_reports_status()
    {
        let readelf = Readelf::new("false");
        match readelf.build_id(Path::new("/bin/sh")) {
            Err(SymfetchError::ToolFailed { program, status, .. }) => {
                assert_eq!(program, "false");
                assert!(!status.success());
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }
}
