//! Glyph documents (`.glif`).
//!
//! A [`Glif`] holds its sub-elements in one slot per [`ElementKind`].
//! Repeatable kinds (unicode, guideline, anchor) keep every occurrence in
//! document order; the others hold at most one element.
//!
//! Documents are always held in format 2 in memory. Format 1 input has
//! its anchors (single named `move` point contours) lifted into anchor
//! elements on decode, and [`Glif::convert_to_format_1`] reverses that
//! for UFO 2 output.

mod elements;
mod outline;

use std::path::Path;

use tracing::{error, warn};

use crate::config::UfoVersion;
use crate::error::{Error, Result};
use crate::plist::Plist;
use crate::sync::content_hash;
use crate::xml::{parse_file, parse_str, Element};

pub use elements::{
    Advance, Anchor, ElementKind, GlifElement, Guideline, Image, Note, Unicode,
};
pub use outline::{Component, Contour, Outline, OutlineItem};

/// The `format` attribute of `<glyph>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlifFormat {
    One,
    Two,
}

impl GlifFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
        }
    }

    fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            _ => None,
        }
    }
}

/// Font-level settings a glif needs while decoding.
#[derive(Debug, Clone, Copy)]
pub struct GlifContext<'a> {
    /// Allowed tags, in output order.
    pub element_order: &'a [ElementKind],
    /// Decides the format assumed when `format` is absent.
    pub ufo_version: UfoVersion,
}

impl Default for GlifContext<'static> {
    fn default() -> Self {
        Self {
            element_order: &ElementKind::ALL,
            ufo_version: UfoVersion::V3,
        }
    }
}

/// A glyph document.
#[derive(Debug, Clone)]
pub struct Glif {
    name: String,
    format: GlifFormat,
    slots: [Vec<GlifElement>; 8],
    element_order: Vec<ElementKind>,
    source_hash: Option<String>,
    source_file: Option<String>,
}

impl Glif {
    /// An empty format 2 glyph.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            format: GlifFormat::Two,
            slots: Default::default(),
            element_order: ElementKind::ALL.to_vec(),
            source_hash: None,
            source_file: None,
        }
    }

    /// Parse glif text.
    ///
    /// # Errors
    ///
    /// `Error::Parse` if the text is not well-formed XML.
    pub fn parse(text: &str, ctx: &GlifContext<'_>) -> Result<Self> {
        let root = parse_str(text, "glif")?;
        let mut glif = Self::from_element(root, ctx);
        glif.source_hash = Some(content_hash(text));
        Ok(glif)
    }

    /// Read `dir/file`.
    ///
    /// # Errors
    ///
    /// `Error::MissingFile` or `Error::Parse`.
    pub fn load(dir: &Path, file: &str, ctx: &GlifContext<'_>) -> Result<Self> {
        let (root, text) = parse_file(&dir.join(file))?;
        let mut glif = Self::from_element(root, ctx);
        glif.source_hash = Some(content_hash(&text));
        glif.source_file = Some(file.to_string());
        Ok(glif)
    }

    /// Decode a `<glyph>` element.
    #[must_use]
    pub fn from_element(root: Element, ctx: &GlifContext<'_>) -> Self {
        let name = root.get_attr("name").map_or_else(
            || {
                error!("glif has no name attribute");
                String::new()
            },
            str::to_string,
        );
        let format = match root.get_attr("format") {
            None => match ctx.ufo_version {
                UfoVersion::V2 => GlifFormat::One,
                UfoVersion::V3 => GlifFormat::Two,
            },
            Some(value) => GlifFormat::from_attr(value).unwrap_or_else(|| {
                error!(glyph = %name, "Invalid glif format {value:?}; treated as 2");
                GlifFormat::Two
            }),
        };

        let mut glif = Self {
            name,
            format,
            slots: Default::default(),
            element_order: ctx.element_order.to_vec(),
            source_hash: None,
            source_file: None,
        };

        for child in root.children {
            let Some(kind) =
                ElementKind::from_tag(&child.tag).filter(|k| ctx.element_order.contains(k))
            else {
                error!(glyph = %glif.name, "Invalid element {} in glif; skipped", child.tag);
                continue;
            };
            if format == GlifFormat::One && !kind.in_format1() {
                error!(glyph = %glif.name, "{kind} not allowed in format 1 glif; skipped");
                continue;
            }
            if kind == ElementKind::Unicode && !child.has_attr("hex") {
                error!(glyph = %glif.name, "No hex value in unicode element");
            }
            let element = GlifElement::new(kind, child);
            if let GlifElement::Outline(outline) = &element {
                if outline.contours().any(Contour::is_unnamed_move_point) {
                    error!(glyph = %glif.name, "Single move point contour with no name");
                }
            }
            let slot = &mut glif.slots[kind.slot()];
            if !kind.is_repeatable() && !slot.is_empty() {
                warn!(glyph = %glif.name, "Duplicate {kind} element; keeping the last one");
                slot.clear();
            }
            slot.push(element);
        }

        if format == GlifFormat::One {
            glif.lift_format1_anchors();
        }
        glif.format = GlifFormat::Two;
        glif
    }

    /// Move anchor contours into anchor elements.
    fn lift_format1_anchors(&mut self) {
        let Some(GlifElement::Outline(outline)) =
            self.slots[ElementKind::Outline.slot()].first_mut()
        else {
            return;
        };
        let lifted = outline.extract_contours(|c| {
            c.ufo2_anchor().map(|attrs| {
                attrs
                    .iter()
                    .filter(|(k, _)| k != "type")
                    .cloned()
                    .collect::<Vec<_>>()
            })
        });
        for attributes in lifted {
            let element = Element {
                attributes,
                ..Element::new("anchor")
            };
            self.slots[ElementKind::Anchor.slot()].push(GlifElement::Anchor(element.into()));
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames go through the owning layer so the manifest stays in step.
    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    #[must_use]
    pub fn format(&self) -> GlifFormat {
        self.format
    }

    /// SHA-256 of the text this glif was read from.
    #[must_use]
    pub fn source_hash(&self) -> Option<&str> {
        self.source_hash.as_deref()
    }

    /// Name of the file the glif was loaded from. Survives renames, so it
    /// may differ from the file the glyph is written to.
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// All elements of one kind, in document order.
    #[must_use]
    pub fn elements(&self, kind: ElementKind) -> &[GlifElement] {
        &self.slots[kind.slot()]
    }

    /// Add a new element built from `attributes`.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateElement` when a singular slot is already occupied.
    pub fn add(&mut self, kind: ElementKind, attributes: &[(&str, &str)]) -> Result<&mut GlifElement> {
        let mut element = Element::new(kind.tag());
        for (name, value) in attributes {
            element.set_attr(name, *value);
        }
        self.insert(GlifElement::new(kind, element))
    }

    /// Add a prebuilt element.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateElement` when a singular slot is already occupied.
    pub fn insert(&mut self, element: GlifElement) -> Result<&mut GlifElement> {
        let kind = element.kind();
        let slot = &mut self.slots[kind.slot()];
        if !kind.is_repeatable() && !slot.is_empty() {
            return Err(Error::DuplicateElement {
                tag: kind.tag().to_string(),
            });
        }
        let index = slot.len();
        slot.push(element);
        Ok(&mut slot[index])
    }

    /// Remove the `index`-th element of `kind` (0 for singular kinds).
    ///
    /// # Errors
    ///
    /// `Error::ElementNotFound` when there is no such element.
    pub fn remove(&mut self, kind: ElementKind, index: usize) -> Result<GlifElement> {
        let slot = &mut self.slots[kind.slot()];
        if index >= slot.len() {
            return Err(Error::ElementNotFound {
                tag: kind.tag().to_string(),
                index,
            });
        }
        Ok(slot.remove(index))
    }

    /// Remove the first anchor called `name`.
    ///
    /// # Errors
    ///
    /// `Error::ElementNotFound` when no anchor has that name.
    pub fn remove_anchor_named(&mut self, name: &str) -> Result<Anchor> {
        let slot = &mut self.slots[ElementKind::Anchor.slot()];
        let index = slot
            .iter()
            .position(|e| matches!(e, GlifElement::Anchor(a) if a.name() == Some(name)))
            .ok_or_else(|| Error::ElementNotFound {
                tag: format!("anchor {name}"),
                index: 0,
            })?;
        match slot.remove(index) {
            GlifElement::Anchor(anchor) => Ok(anchor),
            other => Err(Error::Other(format!("unexpected {} in anchor slot", other.kind()))),
        }
    }

    #[must_use]
    pub fn advance(&self) -> Option<&Advance> {
        match self.slots[ElementKind::Advance.slot()].first() {
            Some(GlifElement::Advance(a)) => Some(a),
            _ => None,
        }
    }

    pub fn advance_mut(&mut self) -> Option<&mut Advance> {
        match self.slots[ElementKind::Advance.slot()].first_mut() {
            Some(GlifElement::Advance(a)) => Some(a),
            _ => None,
        }
    }

    pub fn unicodes(&self) -> impl Iterator<Item = &Unicode> {
        self.slots[ElementKind::Unicode.slot()].iter().filter_map(|e| match e {
            GlifElement::Unicode(u) => Some(u),
            _ => None,
        })
    }

    #[must_use]
    pub fn note(&self) -> Option<&Note> {
        match self.slots[ElementKind::Note.slot()].first() {
            Some(GlifElement::Note(n)) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn image(&self) -> Option<&Image> {
        match self.slots[ElementKind::Image.slot()].first() {
            Some(GlifElement::Image(i)) => Some(i),
            _ => None,
        }
    }

    pub fn guidelines(&self) -> impl Iterator<Item = &Guideline> {
        self.slots[ElementKind::Guideline.slot()].iter().filter_map(|e| match e {
            GlifElement::Guideline(g) => Some(g),
            _ => None,
        })
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.slots[ElementKind::Anchor.slot()].iter().filter_map(|e| match e {
            GlifElement::Anchor(a) => Some(a),
            _ => None,
        })
    }

    #[must_use]
    pub fn outline(&self) -> Option<&Outline> {
        match self.slots[ElementKind::Outline.slot()].first() {
            Some(GlifElement::Outline(o)) => Some(o),
            _ => None,
        }
    }

    pub fn outline_mut(&mut self) -> Option<&mut Outline> {
        match self.slots[ElementKind::Outline.slot()].first_mut() {
            Some(GlifElement::Outline(o)) => Some(o),
            _ => None,
        }
    }

    #[must_use]
    pub fn lib(&self) -> Option<&Plist> {
        match self.slots[ElementKind::Lib.slot()].first() {
            Some(GlifElement::Lib(l)) => Some(l),
            _ => None,
        }
    }

    pub fn lib_mut(&mut self) -> Option<&mut Plist> {
        match self.slots[ElementKind::Lib.slot()].first_mut() {
            Some(GlifElement::Lib(l)) => Some(l),
            _ => None,
        }
    }

    /// Drop a lib with no keys.
    pub(crate) fn remove_empty_lib(&mut self) {
        if self.lib().is_some_and(Plist::is_empty) {
            self.slots[ElementKind::Lib.slot()].clear();
        }
    }

    /// Turn anchors back into format 1 single-point contours.
    ///
    /// Meant for output snapshots: the result is only valid for writing.
    pub fn convert_to_format_1(&mut self) {
        let mut anchors: Vec<Anchor> = std::mem::take(&mut self.slots[ElementKind::Anchor.slot()])
            .into_iter()
            .filter_map(|e| match e {
                GlifElement::Anchor(a) => Some(a),
                _ => None,
            })
            .collect();
        anchors.sort_by(|a, b| a.name().unwrap_or("").cmp(b.name().unwrap_or("")));

        if !anchors.is_empty() {
            let slot = &mut self.slots[ElementKind::Outline.slot()];
            let mut outline = match slot.pop() {
                Some(GlifElement::Outline(o)) => o,
                _ => Outline::default(),
            };
            for anchor in anchors {
                let mut point = anchor.into_element();
                point.tag = "point".to_string();
                point.remove_attr("color");
                point.remove_attr("identifier");
                point.set_attr("type", "move");
                outline.append_contour(Element::new("contour").child(point).into());
            }
            slot.push(GlifElement::Outline(outline));
        }
        self.format = GlifFormat::One;
    }

    /// Build the `<glyph>` element for output, slots in configured order.
    #[must_use]
    pub fn rebuild(&self) -> Element {
        let mut root = Element::new("glyph")
            .attr("name", self.name.as_str())
            .attr("format", self.format.as_str());
        for kind in &self.element_order {
            if self.format == GlifFormat::One && !kind.in_format1() {
                continue;
            }
            root.children
                .extend(self.slots[kind.slot()].iter().map(GlifElement::to_element));
        }
        root
    }
}
