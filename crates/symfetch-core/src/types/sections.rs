//! Section table type.

use std::slice;

/// One ELF section with its file offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section
{
    /// Section name, e.g. `.text`
    pub name: String,
    /// Offset of the section contents in the file
    pub offset: u64,
}

/// Section name to file offset, in section header order
///
/// Only sections with a non-zero offset are ever stored. Inserting a name
/// twice keeps the original position and replaces the offset.
///
/// ## Example
///
/// ```rust
/// use symfetch_core::types::SectionTable;
///
/// let mut table = SectionTable::new();
/// table.insert(".text", 0x28700);
/// table.insert(".interp", 0);
/// assert_eq!(table.offset(".text"), Some(0x28700));
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable
{
    sections: Vec<Section>,
}

impl SectionTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a section; zero offsets are ignored
    ///
    /// Returns whether the section was stored.
    pub fn insert(&mut self, name: impl Into<String>, offset: u64) -> bool
    {
        let name = name.into();
        if name.is_empty() || offset == 0 {
            return false;
        }
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.offset = offset,
            None => self.sections.push(Section { name, offset }),
        }
        true
    }

    #[must_use]
    pub fn offset(&self, name: &str) -> Option<u64>
    {
        self.sections.iter().find(|s| s.name == name).map(|s| s.offset)
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Section>
    {
        self.sections.iter()
    }

    /// Keep only the sections named in `names`, in table order
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> SectionTable
    {
        let sections = self
            .sections
            .iter()
            .filter(|s| names.iter().any(|n| n.as_ref() == s.name))
            .cloned()
            .collect();
        SectionTable { sections }
    }
}

impl<'a> IntoIterator for &'a SectionTable
{
    type Item = &'a Section;
    type IntoIter = slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.sections.iter()
    }
}

impl<N: Into<String>> FromIterator<(N, u64)> for SectionTable
{
    fn from_iter<T: IntoIterator<Item = (N, u64)>>(iter: T) -> Self
    {
        let mut table = SectionTable::new();
        for (name, offset) in iter {
            table.insert(name, offset);
        }
        table
    }
}
