//! Property-list documents backed by an element tree.
//!
//! A [`Plist`] wraps a container element whose first child is either a
//! `<dict>` (dictionary layout) or an `<array>` (positional layout, used
//! only by `layercontents.plist`). Values are read from and written to
//! the backing nodes directly, so anything not touched serializes exactly
//! as it was read.
//!
//! The same type backs top-level `.plist` files (container `<plist>`) and
//! glif `<lib>` elements (container `<lib>`).

mod value;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::sync::content_hash;
use crate::xml::{parse_file, Element};

pub use value::{PlistValue, ScalarKind};

/// How the first child of the container is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<dict>` of alternating `<key>` / value elements.
    Dict,
    /// `<array>` of values addressed by position.
    Array,
}

/// A property list document.
#[derive(Debug, Clone)]
pub struct Plist {
    root: Element,
    layout: Layout,
    /// Key → index of the `<key>` node within the dict.
    index: HashMap<String, usize>,
    source_hash: Option<String>,
    /// File name this plist was read from.
    source_file: Option<String>,
}

impl Plist {
    /// Wrap an existing container element.
    ///
    /// A container with no children gets an empty `<dict>`.
    #[must_use]
    pub fn from_element(mut root: Element) -> Self {
        if root.children.is_empty() {
            root.children.push(Element::new("dict"));
        }
        let layout = if root.children[0].tag == "array" {
            Layout::Array
        } else {
            Layout::Dict
        };
        let mut plist = Self {
            root,
            layout,
            index: HashMap::new(),
            source_hash: None,
            source_file: None,
        };
        plist.reindex();
        plist
    }

    /// A new, empty `.plist` document.
    #[must_use]
    pub fn empty_dict() -> Self {
        Self::from_element(Element::new("plist").attr("version", "1.0"))
    }

    /// A new, empty glif `<lib>`.
    #[must_use]
    pub fn empty_lib() -> Self {
        Self::from_element(Element::new("lib"))
    }

    /// Read `dir/file`, keeping a hash of the text for unchanged-output checks.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingFile` when absent and `Error::Parse` when malformed.
    pub fn load(dir: &Path, file: &str) -> Result<Self> {
        let (root, text) = parse_file(&dir.join(file))?;
        let mut plist = Self::from_element(root);
        plist.source_hash = Some(content_hash(&text));
        plist.source_file = Some(file.to_string());
        Ok(plist)
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The backing container element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.root
    }

    /// Hash of the text this plist was read from, if it was read from disk.
    #[must_use]
    pub fn source_hash(&self) -> Option<&str> {
        self.source_hash.as_deref()
    }

    /// Name of the file [`Plist::load`] read, within its directory.
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    fn body(&self) -> &Element {
        &self.root.children[0]
    }

    fn body_mut(&mut self) -> &mut Element {
        &mut self.root.children[0]
    }

    /// Rebuild the key index after a structural change.
    fn reindex(&mut self) {
        self.index.clear();
        if self.layout != Layout::Dict {
            return;
        }
        let body = &self.root.children[0];
        for i in (0..body.children.len().saturating_sub(1)).step_by(2) {
            self.index.insert(body.children[i].text().to_string(), i);
        }
    }

    /// Number of entries (keys, or array items for positional layout).
    #[must_use]
    pub fn len(&self) -> usize {
        match self.layout {
            Layout::Dict => self.index.len(),
            Layout::Array => self.body().children.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in document order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        match self.layout {
            Layout::Dict => self
                .body()
                .children
                .iter()
                .step_by(2)
                .map(Element::text)
                .collect(),
            Layout::Array => Vec::new(),
        }
    }

    /// The backing value node for `key`.
    #[must_use]
    pub fn value_element(&self, key: &str) -> Option<&Element> {
        let i = *self.index.get(key)?;
        self.body().children.get(i + 1)
    }

    /// Decode the value for `key`, recursing into arrays and dicts.
    ///
    /// # Errors
    ///
    /// `Error::KeyNotFound` if absent, `Error::InvalidValue` if a number
    /// does not parse.
    pub fn get(&self, key: &str) -> Result<PlistValue> {
        let element = self.value_element(key).ok_or_else(|| Error::KeyNotFound {
            key: key.to_string(),
        })?;
        PlistValue::from_element(element, key)
    }

    /// Decode the item at `index` of a positional plist (or the value of
    /// the `index`-th key of a dict).
    ///
    /// # Errors
    ///
    /// `Error::KeyNotFound` if out of range.
    pub fn get_at(&self, index: usize) -> Result<PlistValue> {
        let element = match self.layout {
            Layout::Array => self.body().children.get(index),
            Layout::Dict => self.body().children.get(index * 2 + 1),
        };
        let label = format!("[{index}]");
        let element = element.ok_or_else(|| Error::KeyNotFound { key: label.clone() })?;
        PlistValue::from_element(element, &label)
    }

    /// Shortcut for string values.
    ///
    /// # Errors
    ///
    /// `Error::KeyNotFound` if absent.
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.get(key)? {
            PlistValue::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    /// Add a simple value. Never overwrites.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateKey` if the key is present.
    pub fn add_scalar(&mut self, key: &str, kind: ScalarKind, value: &str) -> Result<()> {
        self.add_complex(key, Element::with_text(kind.tag(), value))
    }

    /// Add a caller-built value node (array, dict, bool …). Never overwrites.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateKey` if the key is present.
    pub fn add_complex(&mut self, key: &str, element: Element) -> Result<()> {
        if self.contains(key) {
            return Err(Error::DuplicateKey {
                key: key.to_string(),
            });
        }
        self.ensure_dict(key)?;
        let body = self.body_mut();
        let pos = body.children.len();
        body.children.push(Element::with_text("key", key));
        body.children.push(element);
        self.index.insert(key.to_string(), pos);
        Ok(())
    }

    /// Create or update a simple value, keeping the node's position.
    ///
    /// # Errors
    ///
    /// Fails only for positional plists.
    pub fn set_scalar(&mut self, key: &str, kind: ScalarKind, value: &str) -> Result<()> {
        match self.index.get(key).copied() {
            Some(i) => {
                let node = &mut self.body_mut().children[i + 1];
                if node.tag != kind.tag() {
                    *node = Element::new(kind.tag());
                }
                node.text = Some(value.to_string());
                Ok(())
            }
            None => self.add_scalar(key, kind, value),
        }
    }

    /// Replace (or add) the value node for `key`.
    ///
    /// # Errors
    ///
    /// Fails only for positional plists.
    pub fn set_complex(&mut self, key: &str, element: Element) -> Result<()> {
        match self.index.get(key).copied() {
            Some(i) => {
                self.body_mut().children[i + 1] = element;
                Ok(())
            }
            None => self.add_complex(key, element),
        }
    }

    /// # Errors
    ///
    /// Fails only for positional plists.
    pub fn set_integer(&mut self, key: &str, value: i64) -> Result<()> {
        self.set_scalar(key, ScalarKind::Integer, &value.to_string())
    }

    /// # Errors
    ///
    /// Fails only for positional plists.
    pub fn set_real(&mut self, key: &str, value: f64) -> Result<()> {
        self.set_scalar(key, ScalarKind::Real, &value.to_string())
    }

    /// # Errors
    ///
    /// Fails only for positional plists.
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_scalar(key, ScalarKind::String, value)
    }

    /// Set any decoded value, choosing scalar or complex storage.
    ///
    /// # Errors
    ///
    /// Fails only for positional plists.
    pub fn set_value(&mut self, key: &str, value: &PlistValue) -> Result<()> {
        match value {
            PlistValue::Integer(i) => self.set_integer(key, *i),
            PlistValue::Real(r) => self.set_real(key, *r),
            PlistValue::String(s) => self.set_string(key, s),
            other => self.set_complex(key, other.to_element()),
        }
    }

    /// Remove a key and its value.
    ///
    /// # Errors
    ///
    /// `Error::KeyNotFound` if absent.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let i = self.index.get(key).copied().ok_or_else(|| Error::KeyNotFound {
            key: key.to_string(),
        })?;
        let body = self.body_mut();
        body.children.drain(i..=i + 1);
        self.reindex();
        Ok(())
    }

    fn ensure_dict(&self, key: &str) -> Result<()> {
        match self.layout {
            Layout::Dict => Ok(()),
            Layout::Array => Err(Error::InvalidValue {
                key: key.to_string(),
                message: "positional plists have no keys".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn fontinfo() -> Plist {
        let root = parse_str(
            r"<plist version='1.0'><dict>
                <key>unitsPerEm</key><integer>1000</integer>
                <key>italicAngle</key><real>-12.5</real>
                <key>familyName</key><string>Test Sans</string>
                <key>flags</key><array><true/><false/><integer>3</integer></array>
                <key>nested</key><dict><key>a</key><string>b</string></dict>
            </dict></plist>",
            "fontinfo.plist",
        )
        .unwrap();
        Plist::from_element(root)
    }

    #[test]
    fn test_get_typed_values() {
        let p = fontinfo();
        assert_eq!(p.layout(), Layout::Dict);
        assert_eq!(p.get("unitsPerEm").unwrap(), PlistValue::Integer(1000));
        assert_eq!(p.get("italicAngle").unwrap(), PlistValue::Real(-12.5));
        assert_eq!(p.get_string("familyName").unwrap(), "Test Sans");
        assert_eq!(
            p.get("flags").unwrap(),
            PlistValue::Array(vec![
                PlistValue::Bool(true),
                PlistValue::Bool(false),
                PlistValue::Integer(3)
            ])
        );
        assert_eq!(
            p.get("nested").unwrap(),
            PlistValue::Dict(vec![("a".to_string(), PlistValue::String("b".to_string()))])
        );
        assert_eq!(p.keys(), vec!["unitsPerEm", "italicAngle", "familyName", "flags", "nested"]);
    }

    #[test]
    fn test_get_missing_key() {
        let err = fontinfo().get("ascender").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { key } if key == "ascender"));
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut p = fontinfo();
        let err = p.add_scalar("unitsPerEm", ScalarKind::Integer, "2048").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
        assert_eq!(p.get("unitsPerEm").unwrap(), PlistValue::Integer(1000));
    }

    #[test]
    fn test_set_scalar_updates_in_place() {
        let mut p = fontinfo();
        p.set_integer("unitsPerEm", 2048).unwrap();
        assert_eq!(p.keys()[0], "unitsPerEm");
        assert_eq!(p.get("unitsPerEm").unwrap(), PlistValue::Integer(2048));

        p.set_string("styleName", "Bold").unwrap();
        assert_eq!(p.keys().last(), Some(&"styleName"));
        assert_eq!(p.len(), 6);
    }

    #[test]
    fn test_set_scalar_changes_type() {
        let mut p = fontinfo();
        p.set_integer("italicAngle", -12).unwrap();
        assert_eq!(p.value_element("italicAngle").unwrap().tag, "integer");
        assert_eq!(p.get("italicAngle").unwrap(), PlistValue::Integer(-12));
    }

    #[test]
    fn test_remove_and_reindex() {
        let mut p = fontinfo();
        p.remove("italicAngle").unwrap();
        assert!(!p.contains("italicAngle"));
        assert_eq!(p.get_string("familyName").unwrap(), "Test Sans");
        assert!(matches!(p.remove("italicAngle"), Err(Error::KeyNotFound { .. })));
        assert_eq!(p.element().children[0].children.len(), 8);
    }

    #[test]
    fn test_set_complex_replaces() {
        let mut p = fontinfo();
        let arr = PlistValue::Array(vec![PlistValue::String("x".into())]).to_element();
        p.set_complex("flags", arr).unwrap();
        assert_eq!(
            p.get("flags").unwrap(),
            PlistValue::Array(vec![PlistValue::String("x".into())])
        );
        assert_eq!(p.keys()[3], "flags");
    }

    #[test]
    fn test_positional_layout() {
        let root = parse_str(
            "<plist><array>
                <array><string>public.default</string><string>glyphs</string></array>
                <array><string>public.background</string><string>glyphs.public.background</string></array>
            </array></plist>",
            "layercontents.plist",
        )
        .unwrap();
        let p = Plist::from_element(root);
        assert_eq!(p.layout(), Layout::Array);
        assert_eq!(p.len(), 2);
        assert_eq!(
            p.get_at(1).unwrap(),
            PlistValue::Array(vec![
                PlistValue::String("public.background".into()),
                PlistValue::String("glyphs.public.background".into())
            ])
        );
        assert!(p.keys().is_empty());
        assert!(p.clone().add_scalar("x", ScalarKind::String, "y").is_err());
        assert!(p.clone().set_string("x", "y").is_err());
        assert!(p.clone().set_integer("x", 1).is_err());
        assert!(p.clone().set_real("x", 1.5).is_err());
    }

    #[test]
    fn test_load_records_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let text = "<plist version=\"1.0\"><dict><key>a</key><string>b</string></dict></plist>";
        std::fs::write(dir.path().join("lib.plist"), text).unwrap();
        let p = Plist::load(dir.path(), "lib.plist").unwrap();
        assert_eq!(p.source_file(), Some("lib.plist"));
        assert_eq!(p.source_hash(), Some(content_hash(text).as_str()));
        assert!(Plist::empty_dict().source_file().is_none());
    }

    #[test]
    fn test_empty_lib() {
        let mut lib = Plist::empty_lib();
        assert!(lib.is_empty());
        lib.set_string("public.markColor", "1,0,0,1").unwrap();
        assert_eq!(lib.element().tag, "lib");
        assert_eq!(lib.element().children[0].tag, "dict");
        assert_eq!(lib.len(), 1);
    }
}
