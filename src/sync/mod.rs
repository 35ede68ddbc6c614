//! Directory reconciliation.
//!
//! This module writes an in-memory font to disk with minimal churn:
//!
//! - **Snapshot**: [`DirTree`] records what was on disk at load time
//! - **Annotate**: the font attaches a [`Document`] to every file it owns
//! - **Reconcile**: [`write_tree`] writes changed files, skips identical
//!   ones and deletes whatever the font no longer accounts for
//! - **Hashing**: SHA256 content hashes detect unchanged output
//!
//! # Example
//!
//! ```ignore
//! use ufonorm::sync::{write_tree, DirTree, Document, WriteContext};
//!
//! let mut dtree = DirTree::default();
//! dtree.set_file_for_output("lib.plist", Document::from_plist(&lib));
//! let odtree = DirTree::scan(&outdir, None)?;
//! let mut ctx = WriteContext::new(&params, false);
//! write_tree(&mut dtree, &outdir, Some(&odtree), &mut ctx)?;
//! ```

mod dirtree;
mod engine;
mod file;
mod hash;
mod types;

pub use dirtree::{DirEntry, DirTree, EntryFlags, EntryKind, Removal};
pub use engine::{render_document, write_tree, WriteContext};
pub use file::{atomic_write, is_empty_dir, read_if_exists, remove_path};
pub use hash::{content_hash, has_changed};
pub use types::{DocKind, Document, Existence, SyncStats};
