//! Concept catalog
//!
//! The ordered list of (title, snippet) pairs the page is built from. Titles
//! are unique and double as the key of each entry's run trigger.

mod concepts;

use crate::runner::dedent;
use rustc_hash::FxHashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog entry {index} has an empty title")]
    EmptyTitle { index: usize },

    #[error("Duplicate catalog title '{title}'")]
    DuplicateTitle { title: String },
}

/// One concept: a heading and the C source shown and run beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    title: String,
    source: String,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        CatalogEntry {
            title: title.into(),
            source: source.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The snippet exactly as stored, shared indentation included
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The snippet as shown on the page: dedented, surrounding blank lines removed
    pub fn display_source(&self) -> String {
        dedent(&self.source).trim_matches('\n').to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or repeated titles
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = FxHashSet::default();
        for (index, entry) in entries.iter().enumerate() {
            if entry.title.trim().is_empty() {
                return Err(CatalogError::EmptyTitle { index });
            }
            if !seen.insert(entry.title.as_str()) {
                return Err(CatalogError::DuplicateTitle {
                    title: entry.title.clone(),
                });
            }
        }
        Ok(Catalog { entries })
    }

    /// The 21 built-in concepts, in page order
    pub fn builtin() -> Self {
        let entries = concepts::CONCEPTS
            .iter()
            .map(|(title, source)| CatalogEntry::new(*title, *source))
            .collect();
        Catalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, title: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.title == title)
    }

    /// Resolve a user-supplied key: a 1-based position or an exact title
    pub fn lookup(&self, key: &str) -> Option<(usize, &CatalogEntry)> {
        if let Ok(number) = key.trim().parse::<usize>() {
            let index = number.checked_sub(1)?;
            return self.get(index).map(|entry| (index, entry));
        }
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.title == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_titles_unique() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 21);
        assert!(Catalog::new(catalog.entries().to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let entries = vec![
            CatalogEntry::new("Static Methods", "int main(void) { return 0; }"),
            CatalogEntry::new("Static Methods", "int main(void) { return 1; }"),
        ];
        assert_eq!(
            Catalog::new(entries).unwrap_err(),
            CatalogError::DuplicateTitle {
                title: "Static Methods".to_string()
            }
        );
    }

    #[test]
    fn test_empty_title_rejected() {
        let entries = vec![CatalogEntry::new("  ", "")];
        assert_eq!(
            Catalog::new(entries).unwrap_err(),
            CatalogError::EmptyTitle { index: 0 }
        );
    }

    #[test]
    fn test_lookup_by_number_and_title() {
        let catalog = Catalog::builtin();
        let (index, entry) = catalog.lookup("10").unwrap();
        assert_eq!(index, 9);
        assert_eq!(entry.title(), "10. Instance-style functions");

        let (index, _) = catalog.lookup("21. Iterators").unwrap();
        assert_eq!(index, 20);

        assert!(catalog.lookup("0").is_none());
        assert!(catalog.lookup("22").is_none());
        assert!(catalog.lookup("Iterators").is_none());
    }

    #[test]
    fn test_display_source_is_dedented() {
        let catalog = Catalog::builtin();
        let shown = catalog.get(0).unwrap().display_source();
        assert!(shown.starts_with("#include <stdio.h>"));
        assert!(shown.ends_with('}'));
        assert!(shown.contains("\n    int marks;"));
    }
}
