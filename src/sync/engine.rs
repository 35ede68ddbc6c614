//! Reconcile an annotated [`DirTree`] with a destination directory.
//!
//! The source tree's entries and the destination's entries are walked
//! together as two sorted key lists (directories before files). Each
//! destination entry is then one of: still wanted and rewritten only when
//! its content differs, no longer wanted and deleted, or unknown and
//! deleted with a warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::config::Params;
use crate::error::Result;
use crate::sync::dirtree::{DirTree, EntryKind, Removal};
use crate::sync::file::{atomic_write, is_empty_dir, read_if_exists, remove_path};
use crate::sync::hash::{content_hash, has_changed};
use crate::sync::types::{DocKind, Document, Existence, SyncStats};
use crate::xml::{normalize, render, Element, WriterConfig, PLIST_DOCTYPE};

/// State threaded through one write pass.
#[derive(Debug)]
pub struct WriteContext<'a> {
    pub params: &'a Params,
    /// The destination root is the directory the tree was read from.
    pub same_location: bool,
    pub stats: SyncStats,
}

impl<'a> WriteContext<'a> {
    #[must_use]
    pub fn new(params: &'a Params, same_location: bool) -> Self {
        Self {
            params,
            same_location,
            stats: SyncStats::default(),
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.stats.warnings.push(message);
    }
}

/// Normalize and render an XML document with the configured settings.
#[must_use]
pub fn render_document(kind: DocKind, element: &mut Element, params: &Params) -> String {
    if params.sort_dicts || params.precision.is_some() {
        normalize(element, params.precision, params.sort_dicts);
    }
    let config = WriterConfig {
        attribute_order: match kind {
            DocKind::Plist => &params.attribute_orders.plist,
            DocKind::Glif => &params.attribute_orders.glif,
        },
        indent_increment: &params.indent_increment,
        indent_first: match kind {
            DocKind::Plist => params.plist_indent_first,
            DocKind::Glif => params.indent_first,
        },
        indent_multiline: params.indent_multiline,
        precision: params.precision,
        numeric_attributes: &params.numeric_attrib_format,
        doctype: (kind == DocKind::Plist).then_some(PLIST_DOCTYPE),
    };
    render(element, &config)
}

/// Write `dtree` into `outdir`, whose current contents are `odtree`
/// (`None` when `outdir` was empty or did not exist).
///
/// # Errors
///
/// Any filesystem error aborts the pass immediately.
pub fn write_tree(
    dtree: &mut DirTree,
    outdir: &Path,
    odtree: Option<&DirTree>,
    ctx: &mut WriteContext<'_>,
) -> Result<()> {
    let keys = dtree.sorted_keys();
    let okeys = odtree.map(DirTree::sorted_keys).unwrap_or_default();
    let mut okeys = okeys.into_iter().peekable();

    for key in keys {
        while let Some(okey) = okeys.next_if(|o| *o < key) {
            delete_stale(&okey, &dtree.removed, outdir, ctx)?;
        }
        let exists = if okeys.next_if(|o| *o == key).is_some() {
            if ctx.same_location {
                Existence::Same
            } else {
                Existence::Different
            }
        } else {
            Existence::Absent
        };

        let name = &key[1..];
        let path = outdir.join(name);
        let removal = dtree.removed.get(name).cloned();
        let Some(entry) = dtree.entries.get_mut(name) else {
            continue;
        };

        match entry.kind {
            EntryKind::File if entry.flags.to_write => {
                trace!("{}", path.display());
                match entry.document.as_mut() {
                    Some(doc) if !doc.is_empty() => {
                        entry.flags.changed = write_document(doc, name, &path, exists, ctx)?;
                        entry.flags.written = true;
                    }
                    _ => {
                        if exists.exists() {
                            debug!("Deleting empty item {name} from existing output UFO");
                            fs::remove_file(&path)?;
                            ctx.stats.deleted_files.push(path);
                        }
                    }
                }
            }
            EntryKind::File => {
                let mut exists = exists;
                if removal.is_some() {
                    if exists.exists() {
                        fs::remove_file(&path)?;
                        ctx.stats.deleted_files.push(path.clone());
                        exists = Existence::Absent;
                    }
                } else if exists == Existence::Same {
                    ctx.warn(format!("Deleting {name} from existing UFO"));
                    fs::remove_file(&path)?;
                    ctx.stats.deleted_files.push(path.clone());
                    exists = Existence::Absent;
                } else if !entry.flags.added {
                    ctx.warn(format!("Skipping invalid file {name} from input UFO"));
                }
                if exists.exists() {
                    ctx.warn(format!("Deleting {name} from existing output UFO"));
                    fs::remove_file(&path)?;
                    ctx.stats.deleted_files.push(path);
                }
            }
            EntryKind::Directory => {
                let read = entry.flags.read;
                let Some(subtree) = entry.subtree.as_mut().filter(|_| read) else {
                    ctx.warn(format!("Skipping invalid input directory {name}"));
                    if exists.exists() {
                        ctx.warn(format!("Deleting directory {name} from existing output UFO"));
                        fs::remove_dir_all(&path)?;
                        ctx.stats.deleted_dirs.push(path);
                    }
                    continue;
                };
                debug!("Processing {name} directory");
                fs::create_dir_all(&path)?;
                let sub_odtree = odtree
                    .filter(|_| exists.exists())
                    .and_then(|o| o.get(name))
                    .and_then(|e| e.subtree.as_ref());
                write_tree(subtree, &path, sub_odtree, ctx)?;
                if is_empty_dir(&path) {
                    fs::remove_dir(&path)?;
                    ctx.stats.deleted_dirs.push(path);
                }
            }
        }
    }

    for okey in okeys {
        delete_stale(&okey, &dtree.removed, outdir, ctx)?;
    }
    Ok(())
}

/// Remove a destination entry the source no longer has.
fn delete_stale(
    okey: &str,
    removed: &BTreeMap<String, Removal>,
    outdir: &Path,
    ctx: &mut WriteContext<'_>,
) -> Result<()> {
    let name = &okey[1..];
    let path = outdir.join(name);
    let message = if okey.starts_with('f') {
        fs::remove_file(&path)?;
        ctx.stats.deleted_files.push(path);
        format!("Deleting {name} from existing output UFO")
    } else {
        remove_path(&path)?;
        ctx.stats.deleted_dirs.push(path);
        format!("Deleting directory {name} from existing output UFO")
    };
    if !removed.contains_key(name) {
        ctx.warn(message);
    }
    Ok(())
}

/// Write one document, skipping the write when the destination already
/// holds identical content. Returns whether the file was written.
///
/// The stored source hash stands in for the destination only when the
/// document was read from this very file; a renamed document is compared
/// against the bytes on disk.
fn write_document(
    doc: &mut Document,
    name: &str,
    path: &Path,
    exists: Existence,
    ctx: &mut WriteContext<'_>,
) -> Result<bool> {
    let (bytes, changed) = match doc {
        Document::Xml {
            kind,
            element,
            source_hash,
            source_file,
            ..
        } => {
            let text = render_document(*kind, element, ctx.params);
            let changed = match exists {
                Existence::Absent => true,
                Existence::Same
                    if source_hash.is_some() && source_file.as_deref() == Some(name) =>
                {
                    has_changed(&content_hash(&text), source_hash.as_deref())
                }
                Existence::Same | Existence::Different => {
                    read_if_exists(path)?.is_none_or(|on_disk| on_disk != text.as_bytes())
                }
            };
            (text.into_bytes(), changed)
        }
        Document::Opaque { source } => {
            if exists == Existence::Same && source.as_path() == path {
                ctx.stats.unchanged += 1;
                return Ok(false);
            }
            let bytes = fs::read(&*source)?;
            let changed = !exists.exists()
                || read_if_exists(path)?.is_none_or(|on_disk| on_disk != bytes);
            (bytes, changed)
        }
    };

    if changed {
        atomic_write(path, &bytes)?;
        ctx.stats.written.push(path.to_path_buf());
    } else {
        ctx.stats.unchanged += 1;
    }
    Ok(changed)
}
