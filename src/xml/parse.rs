//! Reading XML text into an [`Element`] tree.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::xml::Element;

/// Parse a document from text. `source` names the document in errors.
///
/// # Errors
///
/// Returns `Error::Parse` for malformed XML or a document without a root.
pub fn parse_str(text: &str, source: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(|e| Error::parse(source, e))? {
            Event::Start(start) => stack.push(start_element(&start, source)?),
            Event::Empty(start) => {
                let element = start_element(&start, source)?;
                attach(&mut stack, &mut root, element, source)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse(source, "unbalanced end tag"))?;
                attach(&mut stack, &mut root, element, source)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| Error::parse(source, e))?;
                push_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                push_text(&mut stack, &text);
            }
            Event::Eof => break,
            // Declaration, doctype, comments and PIs are regenerated or dropped.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::parse(source, "unexpected end of document"));
    }
    root.ok_or_else(|| Error::parse(source, "no root element"))
}

/// Read and parse a file, returning the tree and the raw text.
///
/// # Errors
///
/// Returns `Error::MissingFile` if the file does not exist, `Error::Io`
/// for other read failures and `Error::Parse` for malformed XML.
pub fn parse_file(path: &Path) -> Result<(Element, String)> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    let element = parse_str(&text, &path.display().to_string())?;
    Ok((element, text))
}

fn start_element(start: &BytesStart<'_>, source: &str) -> Result<Element> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::parse(source, e))?
        .to_string();
    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::parse(source, e))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::parse(source, e))?
            .to_string();
        let value = attr.unescape_value().map_err(|e| Error::parse(source, e))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    source: &str,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::parse(source, "multiple root elements")),
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    let Some(current) = stack.last_mut() else {
        return;
    };
    // Only text before the first child belongs to the element.
    if current.children.is_empty() {
        current.text.get_or_insert_with(String::new).push_str(text);
    }
}
