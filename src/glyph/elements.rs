//! Glif sub-elements as a closed set of typed wrappers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::glyph::outline::Outline;
use crate::plist::Plist;
use crate::xml::Element;

/// The element tags a glif may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Advance,
    Unicode,
    Note,
    Image,
    Guideline,
    Anchor,
    Outline,
    Lib,
}

impl ElementKind {
    /// Every kind, in the default output order.
    pub const ALL: [Self; 8] = [
        Self::Advance,
        Self::Unicode,
        Self::Note,
        Self::Image,
        Self::Guideline,
        Self::Anchor,
        Self::Outline,
        Self::Lib,
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Unicode => "unicode",
            Self::Note => "note",
            Self::Image => "image",
            Self::Guideline => "guideline",
            Self::Anchor => "anchor",
            Self::Outline => "outline",
            Self::Lib => "lib",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Kinds that may occur more than once.
    #[must_use]
    pub const fn is_repeatable(self) -> bool {
        matches!(self, Self::Unicode | Self::Guideline | Self::Anchor)
    }

    /// Kinds allowed in format 1 glifs.
    #[must_use]
    pub const fn in_format1(self) -> bool {
        matches!(self, Self::Advance | Self::Unicode | Self::Outline | Self::Lib)
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Wrapper types that own a single element and add tag-specific accessors.
macro_rules! element_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            element: Element,
        }

        impl $name {
            #[must_use]
            pub fn element(&self) -> &Element {
                &self.element
            }

            pub fn element_mut(&mut self) -> &mut Element {
                &mut self.element
            }

            #[must_use]
            pub fn into_element(self) -> Element {
                self.element
            }
        }

        impl From<Element> for $name {
            fn from(element: Element) -> Self {
                Self { element }
            }
        }
    };
}

element_wrapper!(
    /// `<advance width height/>`.
    Advance
);
element_wrapper!(
    /// `<unicode hex/>`.
    Unicode
);
element_wrapper!(Note);
element_wrapper!(Image);
element_wrapper!(Guideline);
element_wrapper!(
    /// `<anchor x y name color identifier/>`.
    Anchor
);

fn number_attr(element: &Element, name: &str) -> Option<f64> {
    element.get_attr(name)?.trim().parse().ok()
}

impl Advance {
    #[must_use]
    pub fn width(&self) -> Option<f64> {
        number_attr(&self.element, "width")
    }

    #[must_use]
    pub fn height(&self) -> Option<f64> {
        number_attr(&self.element, "height")
    }

    pub fn set_width(&mut self, width: impl fmt::Display) {
        self.element.set_attr("width", width.to_string());
    }

    pub fn set_height(&mut self, height: impl fmt::Display) {
        self.element.set_attr("height", height.to_string());
    }
}

impl Unicode {
    /// The hex attribute, or `""` when it was missing.
    #[must_use]
    pub fn hex(&self) -> &str {
        self.element.get_attr("hex").unwrap_or("")
    }

    pub fn set_hex(&mut self, hex: &str) {
        self.element.set_attr("hex", hex);
    }

    #[must_use]
    pub fn code_point(&self) -> Option<char> {
        u32::from_str_radix(self.hex(), 16).ok().and_then(char::from_u32)
    }
}

impl Note {
    #[must_use]
    pub fn text(&self) -> &str {
        self.element.text()
    }

    pub fn set_text(&mut self, text: &str) {
        self.element.text = Some(text.to_string());
    }
}

impl Image {
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.element.get_attr("fileName")
    }
}

impl Guideline {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.element.get_attr("name")
    }
}

impl Anchor {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.element.get_attr("name")
    }

    #[must_use]
    pub fn x(&self) -> Option<f64> {
        number_attr(&self.element, "x")
    }

    #[must_use]
    pub fn y(&self) -> Option<f64> {
        number_attr(&self.element, "y")
    }
}

/// One glif sub-element.
#[derive(Debug, Clone)]
pub enum GlifElement {
    Advance(Advance),
    Unicode(Unicode),
    Note(Note),
    Image(Image),
    Guideline(Guideline),
    Anchor(Anchor),
    Outline(Outline),
    Lib(Plist),
}

impl GlifElement {
    /// Wrap `element` in the variant for `kind`.
    #[must_use]
    pub fn new(kind: ElementKind, element: Element) -> Self {
        match kind {
            ElementKind::Advance => Self::Advance(element.into()),
            ElementKind::Unicode => Self::Unicode(element.into()),
            ElementKind::Note => Self::Note(element.into()),
            ElementKind::Image => Self::Image(element.into()),
            ElementKind::Guideline => Self::Guideline(element.into()),
            ElementKind::Anchor => Self::Anchor(element.into()),
            ElementKind::Outline => Self::Outline(Outline::from_element(element)),
            ElementKind::Lib => Self::Lib(Plist::from_element(element)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Advance(_) => ElementKind::Advance,
            Self::Unicode(_) => ElementKind::Unicode,
            Self::Note(_) => ElementKind::Note,
            Self::Image(_) => ElementKind::Image,
            Self::Guideline(_) => ElementKind::Guideline,
            Self::Anchor(_) => ElementKind::Anchor,
            Self::Outline(_) => ElementKind::Outline,
            Self::Lib(_) => ElementKind::Lib,
        }
    }

    /// The element as it will be serialized.
    #[must_use]
    pub fn to_element(&self) -> Element {
        match self {
            Self::Advance(e) => e.element().clone(),
            Self::Unicode(e) => e.element().clone(),
            Self::Note(e) => e.element().clone(),
            Self::Image(e) => e.element().clone(),
            Self::Guideline(e) => e.element().clone(),
            Self::Anchor(e) => e.element().clone(),
            Self::Outline(o) => o.to_element(),
            Self::Lib(lib) => lib.element().clone(),
        }
    }
}
