//! ufonorm - read, edit and normalize UFO font sources
//!
//! A UFO is a directory of XML documents: property lists for font-wide
//! data and one glif per glyph per layer. This crate loads one into an
//! editable model that keeps every value exactly as read, and writes it
//! back with canonical formatting, touching only the files whose content
//! changed.
//!
//! # Architecture
//!
//! - [`xml`] - Element tree, parser, normalizer and writer
//! - [`naming`] - Glyph name to file name conversion
//! - [`plist`] - Property-list documents
//! - [`glyph`] - Glif documents
//! - [`font`] - The font and its layers
//! - [`sync`] - Directory snapshot and incremental writer
//! - [`config`] - Output parameters
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ufonorm::{Font, LoadOptions};
//!
//! let mut font = Font::load(Path::new("MyFont.ufo"), &LoadOptions::default())?;
//! font.default_layer_mut().rename_glyph("a.alt", "a.ss01")?;
//! let stats = font.write(Path::new("MyFont.ufo"))?;
//! println!("{} files written", stats.written.len());
//! # Ok::<(), ufonorm::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod font;
pub mod glyph;
pub mod naming;
pub mod plist;
pub mod sync;
pub mod xml;

pub use config::{LoadOptions, Params, UfoVersion};
pub use error::{Error, Result};
pub use font::{Font, Layer, PlistKind};
pub use glyph::{ElementKind, Glif};
pub use plist::{Plist, PlistValue};
pub use sync::SyncStats;
