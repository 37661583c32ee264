//! # Mapping Scanner
//!
//! Finds the library image in the debuggee's memory-mapping listing.
//!
//! Two row formats are understood:
//!
//! ```text
//! 0x7ffff7dc3000     0x7ffff7de9000    0x26000        0x0  r--p   /usr/lib/libc.so.6
//! 7ffff7dc3000-7ffff7de9000 r--p 00000000 08:01 1316 /usr/lib/libc.so.6
//! ```
//!
//! The first is GDB's `info proc mappings`, the second the kernel's
//! `/proc/<pid>/maps`. In both the base address leads the row and the path
//! ends it. The lowest mapping of a file comes first in either listing, so
//! the first matching row carries the load base.

use regex::Regex;
use tracing::{debug, trace};

use crate::types::{Address, LibraryMapping};

const DELETED_SUFFIX: &str = " (deleted)";

/// First mapping whose row matches `pattern`
///
/// Rows that match but have no parseable base address are skipped.
///
/// ## Example
///
/// ```rust
/// use regex::Regex;
/// use symfetch_core::maps::find_library;
///
/// let listing = "7ffff7dc3000-7ffff7de9000 r--p 00000000 08:01 1316 /usr/lib/libc.so.6\n";
/// let pattern = Regex::new(r"/libc-?([0-9]\.\d{2})?\.so").unwrap();
/// let libc = find_library(listing, &pattern).unwrap();
/// assert_eq!(libc.base.value(), 0x7ffff7dc3000);
/// ```
#[must_use]
pub fn find_library(listing: &str, pattern: &Regex) -> Option<LibraryMapping>
{
    for line in listing.lines() {
        if !pattern.is_match(line) {
            continue;
        }
        trace!(line, "candidate mapping");
        match parse_row(line) {
            Some(mapping) => {
                debug!(base = %mapping.base, path = %mapping.path.display(), "library mapping found");
                return Some(mapping);
            }
            None => debug!(line, "skipping mapping row without a base address"),
        }
    }
    None
}

fn parse_row(line: &str) -> Option<LibraryMapping>
{
    let line = line.trim_end();
    let line = line.strip_suffix(DELETED_SUFFIX).unwrap_or(line);

    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    let path = tokens.last()?;

    // `/proc` rows carry a `start-end` range; GDB rows a bare start
    let start = first.split('-').next()?;
    let base = Address::from_hex(start)?;
    Some(LibraryMapping::new(base, path))
}
