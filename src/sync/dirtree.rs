//! Snapshot of a directory tree, annotated for output.
//!
//! A [`DirTree`] is scanned from disk once at load time. The font then
//! attaches a [`Document`] to every file it intends to write. Entries
//! left without a document are candidates for deletion by the engine.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::sync::types::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Prefix used in sync keys; directories sort before files.
    const fn prefix(self) -> char {
        match self {
            Self::Directory => 'd',
            Self::File => 'f',
        }
    }
}

/// Per-entry bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFlags {
    /// Directory contents were scanned, or file content was loaded.
    pub read: bool,
    /// Created by the program rather than found on disk.
    pub added: bool,
    /// Output differed from the destination and was rewritten.
    pub changed: bool,
    pub to_write: bool,
    pub written: bool,
}

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub kind: EntryKind,
    pub flags: EntryFlags,
    /// Contents of a scanned directory.
    pub subtree: Option<DirTree>,
    /// Document to write, for files.
    pub document: Option<Document>,
}

impl DirEntry {
    #[must_use]
    pub fn file() -> Self {
        Self {
            kind: EntryKind::File,
            flags: EntryFlags::default(),
            subtree: None,
            document: None,
        }
    }

    #[must_use]
    pub fn directory(subtree: Option<DirTree>) -> Self {
        Self {
            kind: EntryKind::Directory,
            flags: EntryFlags {
                read: subtree.is_some(),
                ..EntryFlags::default()
            },
            subtree,
            document: None,
        }
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Why a name was dropped from a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Renamed(String),
    Deleted,
}

/// One directory level.
#[derive(Debug, Clone, Default)]
pub struct DirTree {
    pub entries: BTreeMap<String, DirEntry>,
    /// Names removed or renamed since load. Stale copies of these are
    /// deleted at the destination without a warning.
    pub removed: BTreeMap<String, Removal>,
}

impl DirTree {
    /// Scan `path`. `depth` limits recursion (`None` = unlimited,
    /// `Some(0)` = this level only). Names ending in `~` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be listed.
    pub fn scan(path: &Path, depth: Option<usize>) -> Result<Self> {
        let mut tree = Self::default();
        for dirent in fs::read_dir(path)? {
            let dirent = dirent?;
            let name = dirent.file_name().to_string_lossy().into_owned();
            if name.ends_with('~') {
                continue;
            }
            let entry = if dirent.file_type()?.is_dir() {
                let subtree = match depth {
                    Some(0) => None,
                    _ => Some(Self::scan(&dirent.path(), depth.map(|d| d - 1))?),
                };
                DirEntry::directory(subtree)
            } else {
                DirEntry::file()
            };
            tree.entries.insert(name, entry);
        }
        Ok(tree)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DirEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DirEntry> {
        self.entries.get_mut(name)
    }

    /// The tree for a `/`-separated relative path.
    #[must_use]
    pub fn subtree(&self, path: &str) -> Option<&Self> {
        self.subtree_at(split(path))
    }

    pub fn subtree_mut(&mut self, path: &str) -> Option<&mut Self> {
        self.subtree_at_mut(split(path))
    }

    /// The tree at a sequence of directory names; `None` if a segment is
    /// missing, is a file, or was not scanned.
    pub fn subtree_at<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Option<&Self> {
        segments
            .into_iter()
            .try_fold(self, |tree, seg| tree.entries.get(seg)?.subtree.as_ref())
    }

    pub fn subtree_at_mut<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Option<&mut Self> {
        segments
            .into_iter()
            .try_fold(self, |tree, seg| tree.entries.get_mut(seg)?.subtree.as_mut())
    }

    /// Move a scanned subdirectory out of the tree, leaving the entry
    /// in place without contents.
    pub fn take_subtree(&mut self, name: &str) -> Option<Self> {
        self.entries.get_mut(name)?.subtree.take()
    }

    /// Attach `subtree` as directory `name`, creating the entry if needed.
    pub fn attach_dir(&mut self, name: &str, subtree: Self) {
        let entry = self.entries.entry(name.to_string()).or_insert_with(|| {
            let mut entry = DirEntry::directory(None);
            entry.flags.added = true;
            entry
        });
        entry.kind = EntryKind::Directory;
        entry.flags.read = true;
        entry.subtree = Some(subtree);
    }

    /// Composite keys (`d<name>` / `f<name>`) in sync order.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .map(|(name, e)| format!("{}{name}", e.kind.prefix()))
            .collect();
        keys.sort();
        keys
    }

    /// Attach `document` to file `name` and flag it for writing.
    pub fn set_file_for_output(&mut self, name: &str, document: Document) {
        let entry = self.entries.entry(name.to_string()).or_insert_with(|| {
            let mut entry = DirEntry::file();
            entry.flags.added = true;
            entry
        });
        entry.document = Some(document);
        entry.flags.to_write = true;
    }

    pub fn mark_renamed(&mut self, old: &str, new: &str) {
        self.removed
            .insert(old.to_string(), Removal::Renamed(new.to_string()));
    }

    pub fn mark_deleted(&mut self, old: &str) {
        self.removed.insert(old.to_string(), Removal::Deleted);
    }

    #[must_use]
    pub fn removal(&self, name: &str) -> Option<&Removal> {
        self.removed.get(name)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("glyphs")).unwrap();
        fs::create_dir_all(root.join("data/com.example/deep")).unwrap();
        fs::write(root.join("metainfo.plist"), "x").unwrap();
        fs::write(root.join("fontinfo.plist~"), "backup").unwrap();
        fs::write(root.join("glyphs/a.glif"), "x").unwrap();
        fs::write(root.join("data/com.example/deep/blob.bin"), "x").unwrap();
        dir
    }

    #[test]
    fn test_scan_skips_tilde_files() {
        let dir = sample();
        let tree = DirTree::scan(dir.path(), None).unwrap();
        assert!(tree.contains("metainfo.plist"));
        assert!(!tree.contains("fontinfo.plist~"));
        assert!(tree.get("glyphs").unwrap().is_dir());
        assert!(tree.get("glyphs").unwrap().flags.read);
    }

    #[test]
    fn test_scan_depth_limit() {
        let dir = sample();
        let tree = DirTree::scan(dir.path(), Some(0)).unwrap();
        let glyphs = tree.get("glyphs").unwrap();
        assert!(glyphs.subtree.is_none());
        assert!(!glyphs.flags.read);

        let tree = DirTree::scan(dir.path(), Some(1)).unwrap();
        assert!(tree.subtree("data/com.example").is_some());
        assert!(tree.subtree("data/com.example/deep").is_none());
    }

    #[test]
    fn test_subtree_paths() {
        let dir = sample();
        let tree = DirTree::scan(dir.path(), None).unwrap();
        let deep = tree.subtree("data/com.example/deep").unwrap();
        assert!(deep.contains("blob.bin"));
        assert!(tree.subtree_at(["data", "com.example", "deep"]).is_some());
        assert!(tree.subtree("data/missing").is_none());
        assert!(tree.subtree("metainfo.plist").is_none());
    }

    #[test]
    fn test_sorted_keys_directories_first() {
        let dir = sample();
        let tree = DirTree::scan(dir.path(), None).unwrap();
        assert_eq!(
            tree.sorted_keys(),
            vec!["ddata", "dglyphs", "fmetainfo.plist"]
        );
    }

    #[test]
    fn test_set_file_for_output() {
        let dir = sample();
        let mut tree = DirTree::scan(dir.path(), None).unwrap();
        tree.set_file_for_output("metainfo.plist", Document::opaque("/x"));
        let existing = tree.get("metainfo.plist").unwrap();
        assert!(existing.flags.to_write);
        assert!(!existing.flags.added);

        tree.set_file_for_output("lib.plist", Document::opaque("/y"));
        let added = tree.get("lib.plist").unwrap();
        assert!(added.flags.to_write && added.flags.added);
    }

    #[test]
    fn test_removed_table() {
        let mut tree = DirTree::default();
        tree.mark_renamed("a.glif", "b.glif");
        tree.mark_deleted("c.glif");
        assert_eq!(tree.removal("a.glif"), Some(&Removal::Renamed("b.glif".into())));
        assert_eq!(tree.removal("c.glif"), Some(&Removal::Deleted));
        assert_eq!(tree.removal("b.glif"), None);
    }

    #[test]
    fn test_take_and_attach_subtree() {
        let dir = sample();
        let mut tree = DirTree::scan(dir.path(), None).unwrap();
        let glyphs = tree.take_subtree("glyphs").unwrap();
        assert!(tree.subtree("glyphs").is_none());
        tree.attach_dir("glyphs", glyphs);
        assert!(tree.subtree("glyphs").unwrap().contains("a.glif"));

        tree.attach_dir("glyphs.public.background", DirTree::default());
        assert!(tree.get("glyphs.public.background").unwrap().flags.added);
    }
}
