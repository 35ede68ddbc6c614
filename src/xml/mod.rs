//! XML node tree, parsing, normalization and canonical rendering.
//!
//! UFO documents are small XML files (property lists and glifs). This
//! module is not a general XML library: no namespaces, no mixed content,
//! no streaming. It keeps exactly what a byte-stable round trip needs.

mod node;
mod parse;

pub mod normalize;
pub mod writer;

pub use node::Element;
pub use normalize::{format_number, normalize};
pub use parse::{parse_file, parse_str};
pub use writer::{render, WriterConfig, PLIST_DOCTYPE};
