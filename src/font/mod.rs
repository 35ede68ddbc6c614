//! The font aggregate: top-level plists, layers and the directory snapshot.
//!
//! [`Font::load`] reads a UFO directory, resolving output parameters from
//! the caller's settings and the font's own `lib.plist`. [`Font::write`]
//! snapshots every document into a copy of the directory tree and hands
//! it to the sync engine, so only changed files are touched and files the
//! font no longer accounts for are removed.

mod layer;
pub mod restore;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::config::{LoadOptions, Params, UfoVersion, LIB_PARAMS_KEY};
use crate::error::{Error, Result};
use crate::glyph::GlifContext;
use crate::plist::{Plist, PlistValue};
use crate::sync::{write_tree, DirEntry, DirTree, Document, SyncStats, WriteContext};
use crate::xml::Element;

pub use layer::Layer;
pub use restore::{describe_change, restore_keys, KeyChange};

/// Value written to `metainfo.plist` `creator`.
pub const CREATOR: &str = "org.ufonorm";

/// Name of the layer every UFO must have.
pub const DEFAULT_LAYER: &str = "public.default";

/// Optional top-level plists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlistKind {
    FontInfo,
    Groups,
    Kerning,
    Lib,
}

impl PlistKind {
    pub const ALL: [Self; 4] = [Self::FontInfo, Self::Groups, Self::Kerning, Self::Lib];

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::FontInfo => "fontinfo.plist",
            Self::Groups => "groups.plist",
            Self::Kerning => "kerning.plist",
            Self::Lib => "lib.plist",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A UFO font.
#[derive(Debug, Clone)]
pub struct Font {
    path: PathBuf,
    ufo_version: UfoVersion,
    params: Params,
    dtree: DirTree,
    metainfo: Plist,
    plists: [Option<Plist>; 4],
    layercontents: Plist,
    features: Option<PathBuf>,
    layers: Vec<Layer>,
    default_layer: usize,
}

impl Font {
    /// Read the UFO at `path`.
    ///
    /// # Errors
    ///
    /// Fails when `path` is not a directory, `metainfo.plist` is missing
    /// or has a bad `formatVersion`, the layer list or a layer directory,
    /// manifest or glif is missing, there is no `public.default` layer,
    /// or `lib.plist` holds invalid parameters.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self> {
        info!("Reading UFO: {}", path.display());
        if !path.is_dir() {
            return Err(Error::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        let mut dtree = DirTree::scan(path, None)?;

        let metainfo = read_plist(&mut dtree, path, "metainfo.plist")?;
        let ufo_version: UfoVersion = metainfo
            .get_string("formatVersion")
            .map_err(|_| Error::InvalidUfoVersion(String::new()))?
            .parse()?;

        let lib = if dtree.contains("lib.plist") {
            Some(read_plist(&mut dtree, path, "lib.plist")?)
        } else {
            None
        };
        let mut params = options.params.clone();
        if let Some(lib) = &lib {
            apply_lib_params(lib, &mut params)?;
        }
        options.apply_overrides(&mut params)?;
        params.validate()?;

        let mut plists: [Option<Plist>; 4] = Default::default();
        for kind in [PlistKind::FontInfo, PlistKind::Groups, PlistKind::Kerning] {
            if dtree.contains(kind.file_name()) {
                plists[kind.index()] = Some(read_plist(&mut dtree, path, kind.file_name())?);
            }
        }
        plists[PlistKind::Lib.index()] = lib;

        let layercontents = match ufo_version {
            UfoVersion::V2 => {
                if !dtree.get("glyphs").is_some_and(DirEntry::is_dir) {
                    return Err(Error::MissingLayerDir {
                        dir: "glyphs".to_string(),
                    });
                }
                let mut entry = DirEntry::file();
                entry.flags.read = true;
                entry.flags.added = true;
                dtree.entries.insert("layercontents.plist".to_string(), entry);
                ufo2_layercontents()
            }
            UfoVersion::V3 => read_plist(&mut dtree, path, "layercontents.plist")?,
        };

        let features = dtree.get_mut("features.fea").map(|entry| {
            entry.flags.read = true;
            path.join("features.fea")
        });

        let ctx = GlifContext {
            element_order: &params.glyph_element_order,
            ufo_version,
        };
        let mut layers = Vec::with_capacity(layercontents.len());
        let mut default_layer = None;
        for i in 0..layercontents.len() {
            let (name, dir_name) = layer_pair(&layercontents, i)?;
            debug!("Processing glyph layer {i}: {name} {dir_name}");
            let layer_tree = dtree
                .take_subtree(&dir_name)
                .ok_or_else(|| Error::MissingLayerDir {
                    dir: dir_name.clone(),
                })?;
            let layer = Layer::load(&name, &dir_name, &path.join(&dir_name), layer_tree, &ctx)?;
            if name == DEFAULT_LAYER {
                default_layer = Some(layers.len());
            }
            layers.push(layer);
        }
        let default_layer = default_layer.ok_or(Error::NoDefaultLayer)?;

        Ok(Self {
            path: path.to_path_buf(),
            ufo_version,
            params,
            dtree,
            metainfo,
            plists,
            layercontents,
            features,
            layers,
            default_layer,
        })
    }

    /// The directory the font was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version of the UFO as read.
    #[must_use]
    pub fn ufo_version(&self) -> UfoVersion {
        self.ufo_version
    }

    /// Version that [`Font::write`] produces.
    #[must_use]
    pub fn output_version(&self) -> UfoVersion {
        self.params.ufo_version.unwrap_or(self.ufo_version)
    }

    /// Resolved parameters for this font.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    #[must_use]
    pub fn metainfo(&self) -> &Plist {
        &self.metainfo
    }

    #[must_use]
    pub fn plist(&self, kind: PlistKind) -> Option<&Plist> {
        self.plists[kind.index()].as_ref()
    }

    pub fn plist_mut(&mut self, kind: PlistKind) -> Option<&mut Plist> {
        self.plists[kind.index()].as_mut()
    }

    #[must_use]
    pub fn fontinfo(&self) -> Option<&Plist> {
        self.plist(PlistKind::FontInfo)
    }

    #[must_use]
    pub fn lib(&self) -> Option<&Plist> {
        self.plist(PlistKind::Lib)
    }

    /// Create an empty optional plist.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateFile` if the font already has one.
    pub fn add_plist(&mut self, kind: PlistKind) -> Result<&mut Plist> {
        let slot = &mut self.plists[kind.index()];
        if slot.is_some() {
            return Err(Error::DuplicateFile {
                file: kind.file_name().to_string(),
            });
        }
        Ok(slot.insert(Plist::empty_dict()))
    }

    /// The layer list, in `layercontents.plist` order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// # Errors
    ///
    /// `Error::LayerNotFound` if there is no such layer.
    pub fn layer_mut(&mut self, name: &str) -> Result<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.name() == name)
            .ok_or_else(|| Error::LayerNotFound {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn default_layer(&self) -> &Layer {
        &self.layers[self.default_layer]
    }

    pub fn default_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.default_layer]
    }

    /// Write the font to `outdir`, which may be the directory it was
    /// read from.
    ///
    /// # Errors
    ///
    /// Fails when `outdir` is not a directory, is a non-empty directory
    /// that is not a UFO, or on any filesystem error.
    pub fn write(&mut self, outdir: &Path) -> Result<SyncStats> {
        info!("Processing font for output");
        if !outdir.exists() {
            fs::create_dir_all(outdir)?;
        }
        if !outdir.is_dir() {
            return Err(Error::NotADirectory {
                path: outdir.to_path_buf(),
            });
        }

        let same_location = same_dir(outdir, &self.path);
        let odtree = if same_location {
            Some(DirTree::scan(outdir, None)?)
        } else if fs::read_dir(outdir)?.next().is_none() {
            None
        } else if outdir.join("metainfo.plist").is_file() {
            info!("Output UFO already exists - reading for comparison");
            Some(DirTree::scan(outdir, None)?)
        } else {
            return Err(Error::NotAUfo {
                path: outdir.to_path_buf(),
            });
        };

        let version = self.output_version();
        self.metainfo.set_integer("formatVersion", version.number())?;
        self.metainfo.set_string("creator", CREATOR)?;
        if self.params.stamp_head_created {
            if let Some(fontinfo) = self.plists[PlistKind::FontInfo.index()].as_mut() {
                let stamp = Local::now().format("%Y/%m/%d %H:%M:%S").to_string();
                fontinfo.set_string("openTypeHeadCreated", &stamp)?;
            }
        }
        if self.params.rename_files {
            for layer in &mut self.layers {
                layer.rename_glifs()?;
            }
        }

        let mut dtree = self.output_tree(version);

        info!("Writing font to {}", outdir.display());
        let mut ctx = WriteContext::new(&self.params, same_location);
        write_tree(&mut dtree, outdir, odtree.as_ref(), &mut ctx)?;
        info!(
            "Wrote {} files, {} unchanged, {} deleted",
            ctx.stats.written.len(),
            ctx.stats.unchanged,
            ctx.stats.deleted_files.len() + ctx.stats.deleted_dirs.len()
        );
        Ok(ctx.stats)
    }

    /// A copy of the directory tree with every document attached.
    fn output_tree(&self, version: UfoVersion) -> DirTree {
        let mut dtree = self.dtree.clone();
        dtree.set_file_for_output(
            "metainfo.plist",
            Document::from_plist(&self.metainfo).required(),
        );
        for kind in PlistKind::ALL {
            if let Some(plist) = self.plist(kind) {
                dtree.set_file_for_output(kind.file_name(), Document::from_plist(plist));
            }
        }
        match version {
            UfoVersion::V3 => dtree.set_file_for_output(
                "layercontents.plist",
                Document::from_plist(&self.layercontents).required(),
            ),
            UfoVersion::V2 => dtree.mark_deleted("layercontents.plist"),
        }
        if let Some(features) = &self.features {
            dtree.set_file_for_output("features.fea", Document::opaque(features));
        }
        for dir in ["images", "data"] {
            if let Some(subtree) = dtree.subtree_mut(dir) {
                carry_opaque(subtree, &self.path.join(dir));
            }
        }
        for layer in &self.layers {
            dtree.attach_dir(layer.dir_name(), layer.output_tree(version));
        }
        dtree
    }
}

/// Load a plist the font requires, marking it read.
fn read_plist(dtree: &mut DirTree, dir: &Path, file: &str) -> Result<Plist> {
    let Some(entry) = dtree.get_mut(file) else {
        return Err(Error::MissingFile {
            path: dir.join(file),
        });
    };
    entry.flags.read = true;
    Plist::load(dir, file)
}

/// Apply `<paramName>value</paramName>` items from the lib params array.
fn apply_lib_params(lib: &Plist, params: &mut Params) -> Result<()> {
    let Some(element) = lib.value_element(LIB_PARAMS_KEY) else {
        return Ok(());
    };
    if element.tag != "array" {
        return Err(Error::Config(format!("lib.plist {LIB_PARAMS_KEY} must be an array")));
    }
    for param in &element.children {
        params.set(&param.tag, param.text()).map_err(|e| {
            Error::Config(format!("lib.plist {LIB_PARAMS_KEY}: {e}"))
        })?;
    }
    Ok(())
}

/// The single-layer list implied by a UFO 2 font.
fn ufo2_layercontents() -> Plist {
    let pair = Element::new("array")
        .child(Element::with_text("string", DEFAULT_LAYER))
        .child(Element::with_text("string", "glyphs"));
    Plist::from_element(Element::new("plist").child(Element::new("array").child(pair)))
}

fn layer_pair(layercontents: &Plist, index: usize) -> Result<(String, String)> {
    match layercontents.get_at(index)? {
        PlistValue::Array(pair) => match pair.as_slice() {
            [PlistValue::String(name), PlistValue::String(dir)] => Ok((name.clone(), dir.clone())),
            _ => Err(invalid_layer_entry(index)),
        },
        _ => Err(invalid_layer_entry(index)),
    }
}

fn invalid_layer_entry(index: usize) -> Error {
    Error::InvalidValue {
        key: format!("layercontents.plist[{index}]"),
        message: "expected [layer name, directory]".to_string(),
    }
}

/// Flag every file under `tree` for byte-for-byte copying from `source_dir`.
fn carry_opaque(tree: &mut DirTree, source_dir: &Path) {
    for (name, entry) in &mut tree.entries {
        let source = source_dir.join(name);
        entry.flags.read = true;
        if entry.is_dir() {
            if let Some(subtree) = entry.subtree.as_mut() {
                carry_opaque(subtree, &source);
            }
        } else {
            entry.document = Some(Document::opaque(source));
            entry.flags.to_write = true;
        }
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
