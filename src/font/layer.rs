//! Glyph layers.
//!
//! A layer owns its glyphs, their file names and the `contents.plist`
//! manifest mapping one to the other. Every operation that changes a
//! glyph name or file name updates all three, plus the removed-names
//! table of the layer's [`DirTree`], in one step.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::config::UfoVersion;
use crate::error::{Error, Result};
use crate::glyph::{Glif, GlifContext};
use crate::naming::make_file_name;
use crate::plist::{Plist, ScalarKind};
use crate::sync::{DirTree, Document};

const GLIF_EXT: &str = ".glif";

#[derive(Debug, Clone)]
struct LayerGlyph {
    glif: Glif,
    file_name: String,
}

/// One glyph directory.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    dir_name: String,
    glyphs: BTreeMap<String, LayerGlyph>,
    contents: Plist,
    layerinfo: Option<Plist>,
    dtree: DirTree,
}

impl Layer {
    /// An empty layer with an empty manifest.
    #[must_use]
    pub fn new(name: &str, dir_name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir_name: dir_name.to_string(),
            glyphs: BTreeMap::new(),
            contents: Plist::empty_dict(),
            layerinfo: None,
            dtree: DirTree::default(),
        }
    }

    /// Read the layer in `dir`, whose scanned contents are `dtree`.
    ///
    /// # Errors
    ///
    /// Fails when `contents.plist` or a glif it names is missing or
    /// malformed.
    pub fn load(
        name: &str,
        dir_name: &str,
        dir: &Path,
        mut dtree: DirTree,
        ctx: &GlifContext<'_>,
    ) -> Result<Self> {
        if !dtree.contains("contents.plist") {
            return Err(Error::MissingFile {
                path: dir.join("contents.plist"),
            });
        }
        let contents = Plist::load(dir, "contents.plist")?;
        mark_read(&mut dtree, "contents.plist");

        let layerinfo = if ctx.ufo_version == UfoVersion::V3 && dtree.contains("layerinfo.plist") {
            mark_read(&mut dtree, "layerinfo.plist");
            Some(Plist::load(dir, "layerinfo.plist")?)
        } else {
            None
        };

        let mut glyphs = BTreeMap::new();
        let mut names: Vec<String> = contents.keys().into_iter().map(str::to_string).collect();
        names.sort();
        for glyph_name in names {
            let file_name = contents.get_string(&glyph_name)?;
            if !dtree.contains(&file_name) {
                return Err(Error::MissingGlif {
                    file: file_name,
                    dir: dir.to_path_buf(),
                });
            }
            let mut glif = Glif::load(dir, &file_name, ctx)?;
            mark_read(&mut dtree, &file_name);
            if glif.name() != glyph_name {
                warn!(
                    "Glyph names in glif and contents.plist did not match for {glyph_name}; corrected"
                );
                glif.set_name(&glyph_name);
            }
            glyphs.insert(glyph_name, LayerGlyph { glif, file_name });
        }

        Ok(Self {
            name: name.to_string(),
            dir_name: dir_name.to_string(),
            glyphs,
            contents,
            layerinfo,
            dtree,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    #[must_use]
    pub fn contains(&self, glyph_name: &str) -> bool {
        self.glyphs.contains_key(glyph_name)
    }

    /// Glyph names in sorted order.
    pub fn glyph_names(&self) -> impl Iterator<Item = &str> {
        self.glyphs.keys().map(String::as_str)
    }

    #[must_use]
    pub fn glyph(&self, glyph_name: &str) -> Option<&Glif> {
        self.glyphs.get(glyph_name).map(|g| &g.glif)
    }

    /// Mutable access for content edits; renames go through
    /// [`Layer::rename_glyph`].
    pub fn glyph_mut(&mut self, glyph_name: &str) -> Option<&mut Glif> {
        self.glyphs.get_mut(glyph_name).map(|g| &mut g.glif)
    }

    #[must_use]
    pub fn file_name(&self, glyph_name: &str) -> Option<&str> {
        self.glyphs.get(glyph_name).map(|g| g.file_name.as_str())
    }

    /// The `contents.plist` manifest.
    #[must_use]
    pub fn contents(&self) -> &Plist {
        &self.contents
    }

    #[must_use]
    pub fn layerinfo(&self) -> Option<&Plist> {
        self.layerinfo.as_ref()
    }

    pub fn layerinfo_mut(&mut self) -> Option<&mut Plist> {
        self.layerinfo.as_mut()
    }

    /// The scanned directory, with its removed-names table.
    #[must_use]
    pub fn dir_tree(&self) -> &DirTree {
        &self.dtree
    }

    /// Lower-cased stems of every file name in use.
    fn used_names(&self) -> HashSet<String> {
        self.glyphs
            .values()
            .map(|g| stem(&g.file_name).to_lowercase())
            .collect()
    }

    /// Add a glyph under its own name, deriving a new file name.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateGlyph` if the name is taken.
    pub fn add_glyph(&mut self, glif: Glif) -> Result<()> {
        let glyph_name = glif.name().to_string();
        if self.contains(&glyph_name) {
            return Err(Error::DuplicateGlyph { name: glyph_name });
        }
        let file_name = make_file_name(&glyph_name, &self.used_names()) + GLIF_EXT;
        self.contents
            .add_scalar(&glyph_name, ScalarKind::String, &file_name)?;
        self.glyphs.insert(glyph_name, LayerGlyph { glif, file_name });
        Ok(())
    }

    /// Rename a glyph, giving it a new file name. The old file is
    /// deleted silently on the next write.
    ///
    /// # Errors
    ///
    /// `Error::GlyphNotFound` for an unknown `old`, `Error::DuplicateGlyph`
    /// if `new` is taken.
    pub fn rename_glyph(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.contains(old) {
            return Err(Error::GlyphNotFound {
                name: old.to_string(),
            });
        }
        if self.contains(new) {
            return Err(Error::DuplicateGlyph {
                name: new.to_string(),
            });
        }
        // The old file name stays reserved: on a case-insensitive file
        // system the new file must not alias the one being removed.
        let file_name = make_file_name(new, &self.used_names()) + GLIF_EXT;
        let mut entry = self.glyphs.remove(old).ok_or_else(|| Error::GlyphNotFound {
            name: old.to_string(),
        })?;

        self.contents.remove(old)?;
        self.contents
            .add_scalar(new, ScalarKind::String, &file_name)?;
        self.dtree.mark_renamed(&entry.file_name, &file_name);
        debug!("Renamed {old} to {new} ({} -> {file_name})", entry.file_name);

        entry.glif.set_name(new);
        entry.file_name = file_name;
        self.glyphs.insert(new.to_string(), entry);
        Ok(())
    }

    /// Remove a glyph. Its file is deleted silently on the next write.
    ///
    /// # Errors
    ///
    /// `Error::GlyphNotFound` if absent.
    pub fn delete_glyph(&mut self, glyph_name: &str) -> Result<Glif> {
        let entry = self
            .glyphs
            .remove(glyph_name)
            .ok_or_else(|| Error::GlyphNotFound {
                name: glyph_name.to_string(),
            })?;
        self.contents.remove(glyph_name)?;
        self.dtree.mark_deleted(&entry.file_name);
        Ok(entry.glif)
    }

    /// Re-derive every file name from its glyph name, in name order.
    ///
    /// # Errors
    ///
    /// Fails only if the manifest cannot be updated.
    pub fn rename_glifs(&mut self) -> Result<()> {
        let mut used = HashSet::new();
        for (glyph_name, entry) in &mut self.glyphs {
            let stem_name = make_file_name(glyph_name, &used);
            used.insert(stem_name.to_lowercase());
            let file_name = stem_name + GLIF_EXT;
            if file_name != entry.file_name {
                debug!(
                    "Renaming glif for {glyph_name} from {} to {file_name}",
                    entry.file_name
                );
                self.dtree.mark_renamed(&entry.file_name, &file_name);
                self.contents.set_string(glyph_name, &file_name)?;
                entry.file_name = file_name;
            }
        }
        Ok(())
    }

    /// A copy of the layer's directory tree with every document attached
    /// for output in `version`.
    #[must_use]
    pub fn output_tree(&self, version: UfoVersion) -> DirTree {
        let mut dtree = self.dtree.clone();
        dtree.set_file_for_output(
            "contents.plist",
            Document::from_plist(&self.contents).required(),
        );
        match (&self.layerinfo, version) {
            (Some(layerinfo), UfoVersion::V3) => {
                dtree.set_file_for_output("layerinfo.plist", Document::from_plist(layerinfo));
            }
            (_, UfoVersion::V2) => dtree.mark_deleted("layerinfo.plist"),
            (None, UfoVersion::V3) => {}
        }
        for entry in self.glyphs.values() {
            let mut snapshot = entry.glif.clone();
            snapshot.remove_empty_lib();
            if version == UfoVersion::V2 {
                snapshot.convert_to_format_1();
            }
            dtree.set_file_for_output(&entry.file_name, Document::from_glif(&snapshot));
        }
        dtree
    }
}

fn mark_read(dtree: &mut DirTree, name: &str) {
    if let Some(entry) = dtree.get_mut(name) {
        entry.flags.read = true;
    }
}

fn stem(file_name: &str) -> &str {
    file_name.strip_suffix(GLIF_EXT).unwrap_or(file_name)
}
