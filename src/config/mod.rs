//! Output parameters.
//!
//! Parameters control how documents are serialized. They are resolved in
//! layers, later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`Params::default`])
//! 2. A JSON params file (see [`resolve_params_file`])
//! 3. The `org.sil.pysilfontparams` array in the font's `lib.plist`
//! 4. Command-line `-p name=value` overrides
//!
//! Layers 3 and 4 are applied per font by `Font::load`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::glyph::ElementKind;

/// Environment variable naming a params file.
pub const PARAMS_ENV: &str = "UFONORM_PARAMS";

/// Lib key holding per-font parameters.
pub const LIB_PARAMS_KEY: &str = "org.sil.pysilfontparams";

/// UFO format major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UfoVersion {
    V2,
    V3,
}

impl UfoVersion {
    #[must_use]
    pub const fn number(self) -> i64 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

impl FromStr for UfoVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "2" => Ok(Self::V2),
            "3" => Ok(Self::V3),
            other => Err(Error::InvalidUfoVersion(other.to_string())),
        }
    }
}

impl TryFrom<String> for UfoVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<UfoVersion> for String {
    fn from(version: UfoVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for UfoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Preferred attribute order per document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeOrders {
    pub glif: Vec<String>,
    pub plist: Vec<String>,
}

impl Default for AttributeOrders {
    fn default() -> Self {
        Self {
            glif: to_strings(&[
                "pos", "width", "height", "fileName", "base", "xScale", "xyScale", "yxScale",
                "yScale", "xOffset", "yOffset", "x", "y", "angle", "type", "smooth", "name",
                "format", "color", "identifier",
            ]),
            plist: to_strings(&["version"]),
        }
    }
}

/// Serialization parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Params {
    /// Decimal places for numbers; `None` leaves numbers as written.
    pub precision: Option<u32>,
    pub sort_dicts: bool,
    pub indent_increment: String,
    /// Indent the children of a glif root.
    pub indent_first: bool,
    /// Indent the children of a plist root.
    pub plist_indent_first: bool,
    pub indent_multiline: bool,
    /// Attributes whose values are formatted as numbers.
    pub numeric_attrib_format: Vec<String>,
    pub attribute_orders: AttributeOrders,
    /// Output UFO version; `None` keeps the input's version.
    #[serde(rename = "UFOversion")]
    pub ufo_version: Option<UfoVersion>,
    /// Re-derive every glif file name on write.
    pub rename_files: bool,
    pub glyph_element_order: Vec<ElementKind>,
    /// Set `openTypeHeadCreated` to the current time on write.
    pub stamp_head_created: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            precision: Some(6),
            sort_dicts: true,
            indent_increment: "  ".to_string(),
            indent_first: true,
            plist_indent_first: false,
            indent_multiline: false,
            numeric_attrib_format: to_strings(&[
                "angle", "height", "width", "x", "xOffset", "xScale", "xyScale", "y", "yOffset",
                "yScale", "yxScale",
            ]),
            attribute_orders: AttributeOrders::default(),
            ufo_version: None,
            rename_files: false,
            glyph_element_order: ElementKind::ALL.to_vec(),
            stamp_head_created: false,
        }
    }
}

impl Params {
    /// Set one parameter from its string form.
    ///
    /// Lists are comma separated; `precision` accepts `none`; an empty
    /// `UFOversion` means "keep the input version".
    ///
    /// # Errors
    ///
    /// `Error::Config` for unknown names or unparsable values,
    /// `Error::InvalidUfoVersion` for versions other than 2 and 3.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "precision" => {
                self.precision = match value.trim() {
                    "" | "none" | "None" => None,
                    v => Some(v.parse().map_err(|_| bad_value(name, value))?),
                };
            }
            "sortDicts" => self.sort_dicts = parse_bool(name, value)?,
            "indentIncrement" => self.indent_increment = value.to_string(),
            "indentFirst" => self.indent_first = parse_bool(name, value)?,
            "plistIndentFirst" => self.plist_indent_first = parse_bool(name, value)?,
            "indentMultiline" => self.indent_multiline = parse_bool(name, value)?,
            "numericAttribFormat" => self.numeric_attrib_format = parse_list(value),
            "attributeOrders.glif" => self.attribute_orders.glif = parse_list(value),
            "attributeOrders.plist" => self.attribute_orders.plist = parse_list(value),
            "UFOversion" => {
                self.ufo_version = match value.trim() {
                    "" => None,
                    v => Some(v.parse()?),
                };
            }
            "renameFiles" => self.rename_files = parse_bool(name, value)?,
            "glyphElementOrder" => {
                self.glyph_element_order = parse_list(value)
                    .iter()
                    .map(|tag| ElementKind::from_tag(tag).ok_or_else(|| bad_value(name, value)))
                    .collect::<Result<_>>()?;
            }
            "stampHeadCreated" => self.stamp_head_created = parse_bool(name, value)?,
            _ => return Err(Error::Config(format!("unknown parameter {name}"))),
        }
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// `Error::Config` when `glyphElementOrder` is not a permutation of
    /// the eight glif element tags.
    pub fn validate(&self) -> Result<()> {
        let mut order = self.glyph_element_order.clone();
        order.sort_unstable();
        if order != ElementKind::ALL {
            return Err(Error::Config(
                "glyphElementOrder must list each glif element exactly once".to_string(),
            ));
        }
        Ok(())
    }

    /// Defaults overlaid with a (possibly partial) JSON file.
    ///
    /// # Errors
    ///
    /// `Error::MissingFile`, `Error::Json` or a validation error.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::MissingFile {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let params: Self = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Load the params file chosen by [`resolve_params_file`], or defaults.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named file is missing or invalid.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match resolve_params_file(explicit_path) {
            Some(path) => {
                tracing::debug!("Reading params from {}", path.display());
                Self::from_json_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Per-font load settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Defaults plus any params file.
    pub params: Params,
    /// `name=value` pairs from the command line, applied after `lib.plist`.
    pub overrides: Vec<(String, String)>,
}

impl LoadOptions {
    /// Apply the command-line overrides to `params`.
    ///
    /// # Errors
    ///
    /// Any error from [`Params::set`].
    pub fn apply_overrides(&self, params: &mut Params) -> Result<()> {
        for (name, value) in &self.overrides {
            params.set(name, value)?;
        }
        Ok(())
    }
}

/// Split a `name=value` override.
///
/// # Errors
///
/// `Error::InvalidArgument` when there is no `=`.
pub fn parse_override(arg: &str) -> Result<(String, String)> {
    arg.split_once('=')
        .map(|(n, v)| (n.trim().to_string(), v.to_string()))
        .ok_or_else(|| Error::InvalidArgument(format!("expected name=value, got {arg:?}")))
}

/// The default params file, `<config dir>/ufonorm/params.json`.
#[must_use]
pub fn default_params_file() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.config_dir().join("ufonorm").join("params.json"))
}

/// Resolve which params file to read.
///
/// Priority:
/// 1. `explicit_path` (from `--params-file`)
/// 2. `UFONORM_PARAMS` environment variable
/// 3. The default file, if it exists
#[must_use]
pub fn resolve_params_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(PARAMS_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_params_file().filter(|p| p.is_file())
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(bad_value(name, value)),
    }
}

fn bad_value(name: &str, value: &str) -> Error {
    Error::Config(format!("invalid value {value:?} for {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let params = Params::default();
        params.validate().unwrap();
        assert_eq!(params.precision, Some(6));
        assert!(!params.indent_multiline);
        assert!(!params.stamp_head_created);
        assert_eq!(params.attribute_orders.plist, vec!["version"]);
    }

    #[test]
    fn test_set_parses_values() {
        let mut p = Params::default();
        p.set("precision", "none").unwrap();
        assert_eq!(p.precision, None);
        p.set("precision", "2").unwrap();
        assert_eq!(p.precision, Some(2));
        p.set("sortDicts", "False").unwrap();
        assert!(!p.sort_dicts);
        p.set("attributeOrders.glif", "x, y,name").unwrap();
        assert_eq!(p.attribute_orders.glif, vec!["x", "y", "name"]);
        p.set("UFOversion", "2").unwrap();
        assert_eq!(p.ufo_version, Some(UfoVersion::V2));
        p.set("UFOversion", "").unwrap();
        assert_eq!(p.ufo_version, None);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut p = Params::default();
        assert!(matches!(p.set("bogus", "1"), Err(Error::Config(_))));
        assert!(matches!(p.set("sortDicts", "maybe"), Err(Error::Config(_))));
        assert!(matches!(p.set("UFOversion", "4"), Err(Error::InvalidUfoVersion(_))));
        assert!(p.set("glyphElementOrder", "advance,bogus").is_err());
    }

    #[test]
    fn test_validate_element_order() {
        let mut p = Params::default();
        p.set("glyphElementOrder", "lib,outline,anchor,guideline,image,note,unicode,advance")
            .unwrap();
        p.validate().unwrap();
        assert_eq!(p.glyph_element_order[0], ElementKind::Lib);
        p.set("glyphElementOrder", "advance,unicode").unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_partial_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"precision": null, "UFOversion": "2", "indentIncrement": "\t"}"#)
            .unwrap();
        let p = Params::from_json_file(&path).unwrap();
        assert_eq!(p.precision, None);
        assert_eq!(p.ufo_version, Some(UfoVersion::V2));
        assert_eq!(p.indent_increment, "\t");
        assert!(p.sort_dicts);
    }

    #[test]
    fn test_missing_json_file() {
        let dir = TempDir::new().unwrap();
        let err = Params::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::MissingFile { .. }));
    }

    #[test]
    fn test_resolve_params_file_with_explicit() {
        let explicit = PathBuf::from("/custom/params.json");
        assert_eq!(resolve_params_file(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("precision=3").unwrap(),
            ("precision".to_string(), "3".to_string())
        );
        assert!(parse_override("precision").is_err());
    }

    #[test]
    fn test_overrides_applied_in_order() {
        let options = LoadOptions {
            params: Params::default(),
            overrides: vec![
                ("precision".into(), "1".into()),
                ("precision".into(), "4".into()),
            ],
        };
        let mut p = options.params.clone();
        options.apply_overrides(&mut p).unwrap();
        assert_eq!(p.precision, Some(4));
    }
}
