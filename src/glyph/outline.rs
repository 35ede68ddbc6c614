//! Glif outlines: an ordered list of contours and components.

use crate::xml::Element;

/// A `<contour>` and its `<point>` children.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    element: Element,
}

impl Contour {
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn points(&self) -> impl Iterator<Item = &Element> {
        self.element.children_named("point")
    }

    /// A lone `move` point, the format 1 encoding of an anchor.
    fn single_move_point(&self) -> Option<&Element> {
        let mut points = self.points();
        let point = points.next()?;
        if points.next().is_some() || point.get_attr("type") != Some("move") {
            return None;
        }
        Some(point)
    }

    /// Point attributes when this contour encodes a format 1 anchor
    /// (a single named `move` point).
    #[must_use]
    pub fn ufo2_anchor(&self) -> Option<&[(String, String)]> {
        self.single_move_point()
            .filter(|p| p.has_attr("name"))
            .map(|p| p.attributes.as_slice())
    }

    /// A single `move` point without a name: not an anchor, but suspicious.
    #[must_use]
    pub fn is_unnamed_move_point(&self) -> bool {
        self.single_move_point().is_some_and(|p| !p.has_attr("name"))
    }
}

impl From<Element> for Contour {
    fn from(element: Element) -> Self {
        Self { element }
    }
}

/// A `<component base=…/>` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    element: Element,
}

impl Component {
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.element.get_attr("base")
    }
}

impl From<Element> for Component {
    fn from(element: Element) -> Self {
        Self { element }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutlineItem {
    Contour(Contour),
    Component(Component),
}

impl OutlineItem {
    fn element(&self) -> &Element {
        match self {
            Self::Contour(c) => c.element(),
            Self::Component(c) => c.element(),
        }
    }
}

/// The `<outline>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// The outline's own tag and attributes; children live in `items`.
    shell: Element,
    items: Vec<OutlineItem>,
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            shell: Element::new("outline"),
            items: Vec::new(),
        }
    }
}

impl Outline {
    /// Split an `<outline>` into contours and components.
    #[must_use]
    pub fn from_element(mut element: Element) -> Self {
        let children = std::mem::take(&mut element.children);
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            match child.tag.as_str() {
                "contour" => items.push(OutlineItem::Contour(child.into())),
                "component" => items.push(OutlineItem::Component(child.into())),
                other => tracing::error!("Invalid element {other} in outline; skipped"),
            }
        }
        Self {
            shell: element,
            items,
        }
    }

    /// Contours and components in document order.
    #[must_use]
    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    pub fn contours(&self) -> impl Iterator<Item = &Contour> {
        self.items.iter().filter_map(|i| match i {
            OutlineItem::Contour(c) => Some(c),
            OutlineItem::Component(_) => None,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.items.iter().filter_map(|i| match i {
            OutlineItem::Component(c) => Some(c),
            OutlineItem::Contour(_) => None,
        })
    }

    pub fn append_contour(&mut self, contour: Contour) {
        self.items.push(OutlineItem::Contour(contour));
    }

    pub fn append_component(&mut self, component: Component) {
        self.items.push(OutlineItem::Component(component));
    }

    /// Remove the `index`-th contour (counting contours only).
    pub fn remove_contour(&mut self, index: usize) -> Option<Contour> {
        let pos = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| matches!(i, OutlineItem::Contour(_)))
            .nth(index)?
            .0;
        match self.items.remove(pos) {
            OutlineItem::Contour(c) => Some(c),
            OutlineItem::Component(_) => None,
        }
    }

    /// Remove every contour for which `f` returns `Some`, collecting the results.
    pub(crate) fn extract_contours<T>(&mut self, mut f: impl FnMut(&Contour) -> Option<T>) -> Vec<T> {
        let mut out = Vec::new();
        self.items.retain(|item| {
            if let OutlineItem::Contour(c) = item {
                if let Some(v) = f(c) {
                    out.push(v);
                    return false;
                }
            }
            true
        });
        out
    }

    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut element = self.shell.clone();
        element.children = self.items.iter().map(|i| i.element().clone()).collect();
        element
    }
}
