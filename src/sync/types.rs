//! Types shared by the directory snapshot and the sync engine.

use std::path::PathBuf;

use serde::Serialize;

use crate::glyph::Glif;
use crate::plist::Plist;
use crate::xml::Element;

/// Which serializer settings an XML document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Plist,
    Glif,
}

/// A document attached to a file entry for output.
#[derive(Debug, Clone)]
pub enum Document {
    /// An XML document rendered by the serializer.
    Xml {
        kind: DocKind,
        element: Element,
        /// Hash of the text it was read from, when read from disk.
        source_hash: Option<String>,
        /// File name it was read from; the hash only describes that file.
        source_file: Option<String>,
        /// Empty documents are not written; an existing copy is deleted.
        is_empty: bool,
    },
    /// A file copied byte for byte (`features.fea`, `images/`, `data/`).
    Opaque { source: PathBuf },
}

impl Document {
    /// Snapshot a plist for output.
    #[must_use]
    pub fn from_plist(plist: &Plist) -> Self {
        Self::Xml {
            kind: DocKind::Plist,
            element: plist.element().clone(),
            source_hash: plist.source_hash().map(str::to_string),
            source_file: plist.source_file().map(str::to_string),
            is_empty: plist.is_empty(),
        }
    }

    /// Snapshot a glif for output.
    #[must_use]
    pub fn from_glif(glif: &Glif) -> Self {
        Self::Xml {
            kind: DocKind::Glif,
            element: glif.rebuild(),
            source_hash: glif.source_hash().map(str::to_string),
            source_file: glif.source_file().map(str::to_string),
            is_empty: false,
        }
    }

    /// Write this document even when it has no entries.
    #[must_use]
    pub fn required(mut self) -> Self {
        if let Self::Xml { is_empty, .. } = &mut self {
            *is_empty = false;
        }
        self
    }

    #[must_use]
    pub fn opaque(source: impl Into<PathBuf>) -> Self {
        Self::Opaque {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Xml { is_empty, .. } => *is_empty,
            Self::Opaque { .. } => false,
        }
    }
}

/// Whether an entry already exists at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Absent,
    /// Present, and the destination is the source directory.
    Same,
    /// Present in a different destination directory.
    Different,
}

impl Existence {
    #[must_use]
    pub fn exists(self) -> bool {
        self != Self::Absent
    }
}

/// Outcome of one write pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncStats {
    /// Files whose content was (re)written.
    pub written: Vec<PathBuf>,
    /// Files already up to date.
    pub unchanged: usize,
    /// Files removed from the destination.
    pub deleted_files: Vec<PathBuf>,
    /// Directories removed from the destination.
    pub deleted_dirs: Vec<PathBuf>,
    /// Warning messages, in the order they were logged.
    pub warnings: Vec<String>,
}

impl SyncStats {
    /// Number of filesystem changes made.
    #[must_use]
    pub fn changes(&self) -> usize {
        self.written.len() + self.deleted_files.len() + self.deleted_dirs.len()
    }

    /// Returns true if nothing on disk changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_stats() {
        let mut stats = SyncStats::default();
        assert!(stats.is_empty());

        stats.written.push(PathBuf::from("a.glif"));
        stats.deleted_dirs.push(PathBuf::from("old"));
        assert_eq!(stats.changes(), 2);
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_document_from_plist() {
        let empty = Document::from_plist(&Plist::empty_dict());
        assert!(empty.is_empty());
        assert!(!empty.required().is_empty());

        let mut plist = Plist::empty_dict();
        plist.set_string("familyName", "Test").unwrap();
        let doc = Document::from_plist(&plist);
        assert!(!doc.is_empty());
        assert!(matches!(doc, Document::Xml { kind: DocKind::Plist, source_hash: None, source_file: None, .. }));
    }

    #[test]
    fn test_document_from_glif() {
        let doc = Document::from_glif(&Glif::new("a"));
        match doc {
            Document::Xml { kind, element, .. } => {
                assert_eq!(kind, DocKind::Glif);
                assert_eq!(element.get_attr("name"), Some("a"));
            }
            Document::Opaque { .. } => panic!("expected xml"),
        }
    }

    #[test]
    fn test_existence() {
        assert!(!Existence::Absent.exists());
        assert!(Existence::Same.exists());
        assert!(Existence::Different.exists());
    }
}
