//! Decoded property-list values.

use std::fmt;

use crate::error::{Error, Result};
use crate::xml::Element;

/// Element types accepted by the scalar setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Real,
    String,
}

impl ScalarKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
        }
    }
}

/// A decoded value. Dicts keep document order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    Integer(i64),
    Real(f64),
    String(String),
    Bool(bool),
    Date(String),
    Data(String),
    Array(Vec<PlistValue>),
    Dict(Vec<(String, PlistValue)>),
}

impl PlistValue {
    /// Decode a value node. `key` is only used in error messages.
    ///
    /// # Errors
    ///
    /// `Error::InvalidValue` for unparsable numbers or unknown tags.
    pub fn from_element(element: &Element, key: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidValue {
            key: key.to_string(),
            message,
        };
        let text = element.text().trim();
        Ok(match element.tag.as_str() {
            "integer" => Self::Integer(
                text.parse()
                    .map_err(|e| invalid(format!("integer {text:?}: {e}")))?,
            ),
            "real" => Self::Real(
                text.parse()
                    .map_err(|e| invalid(format!("real {text:?}: {e}")))?,
            ),
            "string" => Self::String(element.text().to_string()),
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            "date" => Self::Date(text.to_string()),
            "data" => Self::Data(text.to_string()),
            "array" => Self::Array(
                element
                    .children
                    .iter()
                    .map(|c| Self::from_element(c, key))
                    .collect::<Result<_>>()?,
            ),
            "dict" => {
                let mut pairs = Vec::with_capacity(element.children.len() / 2);
                for pair in element.children.chunks(2) {
                    if let [k, v] = pair {
                        pairs.push((k.text().to_string(), Self::from_element(v, key)?));
                    }
                }
                Self::Dict(pairs)
            }
            other => return Err(invalid(format!("unsupported element <{other}>"))),
        })
    }

    /// Build the value node for this value.
    #[must_use]
    pub fn to_element(&self) -> Element {
        match self {
            Self::Integer(i) => Element::with_text("integer", i.to_string()),
            Self::Real(r) => Element::with_text("real", r.to_string()),
            Self::String(s) => Element::with_text("string", s.clone()),
            Self::Bool(true) => Element::new("true"),
            Self::Bool(false) => Element::new("false"),
            Self::Date(d) => Element::with_text("date", d.clone()),
            Self::Data(d) => Element::with_text("data", d.clone()),
            Self::Array(items) => Element {
                children: items.iter().map(Self::to_element).collect(),
                ..Element::new("array")
            },
            Self::Dict(pairs) => Element {
                children: pairs
                    .iter()
                    .flat_map(|(k, v)| [Element::with_text("key", k.clone()), v.to_element()])
                    .collect(),
                ..Element::new("dict")
            },
        }
    }

    /// `true` for empty strings and empty arrays.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Array(a) => a.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for PlistValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::String(s) | Self::Date(s) | Self::Data(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Dict(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_element_and_back() {
        let value = PlistValue::Dict(vec![
            ("b".into(), PlistValue::Bool(true)),
            ("list".into(), PlistValue::Array(vec![PlistValue::Integer(1), PlistValue::Real(0.5)])),
        ]);
        let element = value.to_element();
        assert_eq!(element.tag, "dict");
        assert_eq!(element.children.len(), 4);
        assert_eq!(PlistValue::from_element(&element, "x").unwrap(), value);
    }

    #[test]
    fn test_invalid_integer() {
        let err = PlistValue::from_element(&Element::with_text("integer", "1.5"), "unitsPerEm").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { key, .. } if key == "unitsPerEm"));
    }

    #[test]
    fn test_display() {
        let value = PlistValue::Array(vec![PlistValue::String("a".into()), PlistValue::Integer(2)]);
        assert_eq!(value.to_string(), "[a, 2]");
    }

    #[test]
    fn test_is_blank() {
        assert!(PlistValue::String(String::new()).is_blank());
        assert!(PlistValue::Array(vec![]).is_blank());
        assert!(!PlistValue::Integer(0).is_blank());
    }
}
