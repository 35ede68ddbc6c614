//! Canonical text rendering of element trees.
//!
//! Output depends only on the tree and the [`WriterConfig`]: attribute
//! order comes from the configured list (then input order), indentation
//! from the configured increment, and numeric attributes from the
//! configured precision.

use std::fmt::Write as _;

use crate::xml::normalize::format_number;
use crate::xml::Element;

/// Doctype emitted for property lists.
pub const PLIST_DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// Leaf elements whose text is a value, so whitespace-only text is kept.
const TEXT_LEAVES: &[&str] = &["key", "string", "note"];

/// Rendering options for one document.
#[derive(Debug, Clone)]
pub struct WriterConfig<'a> {
    /// Attribute names in output order; unlisted attributes follow in input order.
    pub attribute_order: &'a [String],
    pub indent_increment: &'a str,
    /// Indent the root's children (otherwise they start at column 0).
    pub indent_first: bool,
    /// Re-indent multi-line text line by line.
    pub indent_multiline: bool,
    pub precision: Option<u32>,
    /// Attributes whose values are numbers formatted with `precision`.
    pub numeric_attributes: &'a [String],
    pub doctype: Option<&'a str>,
}

impl Default for WriterConfig<'_> {
    fn default() -> Self {
        Self {
            attribute_order: &[],
            indent_increment: "  ",
            indent_first: true,
            indent_multiline: false,
            precision: None,
            numeric_attributes: &[],
            doctype: None,
        }
    }
}

/// Render a document to text.
#[must_use]
pub fn render(root: &Element, config: &WriterConfig<'_>) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if let Some(doctype) = config.doctype {
        let _ = writeln!(out, "<!DOCTYPE {doctype}>");
    }
    write_element(&mut out, root, "", true, config);
    out
}

fn write_element(out: &mut String, element: &Element, indent: &str, is_root: bool, config: &WriterConfig<'_>) {
    out.push_str(indent);
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in ordered_attributes(element, config.attribute_order) {
        let value = match config.precision {
            Some(precision) if config.numeric_attributes.iter().any(|n| n == name) => {
                format_number(value, precision).map_or_else(|| value.to_string(), |(text, _)| text)
            }
            _ => value.to_string(),
        };
        let _ = write!(out, " {name}=\"{}\"", escape_attribute(&value));
    }

    let keeps_blank = element.children.is_empty() && TEXT_LEAVES.contains(&element.tag.as_str());
    let text = element
        .text
        .as_deref()
        .filter(|t| !t.is_empty() && (keeps_blank || !t.trim().is_empty()));
    if element.children.is_empty() && text.is_none() {
        out.push_str("/>\n");
        return;
    }

    out.push('>');
    if let Some(text) = text {
        if text.contains('\n') && config.indent_multiline && !text.trim().is_empty() {
            out.push('\n');
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let _ = writeln!(out, "{indent}{}{}", config.indent_increment, escape_text(line));
            }
            out.push_str(indent);
        } else {
            out.push_str(&escape_text(text));
        }
    }

    if !element.children.is_empty() {
        out.push('\n');
        let child_indent = if is_root && !config.indent_first {
            String::new()
        } else {
            format!("{indent}{}", config.indent_increment)
        };
        for child in &element.children {
            write_element(out, child, &child_indent, false, config);
        }
        out.push_str(indent);
    }
    let _ = writeln!(out, "</{}>", element.tag);
}

/// Attributes sorted by position in `order`; unlisted keep input order.
fn ordered_attributes<'e>(element: &'e Element, order: &[String]) -> Vec<(&'e str, &'e str)> {
    let mut attrs: Vec<(&str, &str)> = element
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    attrs.sort_by_key(|(name, _)| order.iter().position(|o| o == name).unwrap_or(usize::MAX));
    attrs
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}
