//! Error types for ufonorm.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=load, 3=not_found, 4=model, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Every variant is fatal for the operation that returns it: loading and
//! writing stop at the first `Err`. Recoverable anomalies are never
//! errors; they are reported through `tracing` and processing continues.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ufonorm operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Container (exit 2)
    NotADirectory,
    NotAUfo,
    MissingFile,
    InvalidUfoVersion,
    NoDefaultLayer,
    ParseError,

    // Not Found (exit 3)
    KeyNotFound,
    ElementNotFound,
    GlyphNotFound,
    LayerNotFound,

    // Model (exit 4)
    DuplicateKey,
    DuplicateElement,
    DuplicateGlyph,
    DuplicateFile,
    InvalidValue,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotADirectory => "NOT_A_DIRECTORY",
            Self::NotAUfo => "NOT_A_UFO",
            Self::MissingFile => "MISSING_FILE",
            Self::InvalidUfoVersion => "INVALID_UFO_VERSION",
            Self::NoDefaultLayer => "NO_DEFAULT_LAYER",
            Self::ParseError => "PARSE_ERROR",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::ElementNotFound => "ELEMENT_NOT_FOUND",
            Self::GlyphNotFound => "GLYPH_NOT_FOUND",
            Self::LayerNotFound => "LAYER_NOT_FOUND",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::DuplicateElement => "DUPLICATE_ELEMENT",
            Self::DuplicateGlyph => "DUPLICATE_GLYPH",
            Self::DuplicateFile => "DUPLICATE_FILE",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotADirectory
            | Self::NotAUfo
            | Self::MissingFile
            | Self::InvalidUfoVersion
            | Self::NoDefaultLayer
            | Self::ParseError => 2,
            Self::KeyNotFound
            | Self::ElementNotFound
            | Self::GlyphNotFound
            | Self::LayerNotFound => 3,
            Self::DuplicateKey
            | Self::DuplicateElement
            | Self::DuplicateGlyph
            | Self::DuplicateFile
            | Self::InvalidValue
            | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while loading, mutating or writing a UFO.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("{} exists but is not a UFO", path.display())]
    NotAUfo { path: PathBuf },

    #[error("{} does not exist", path.display())]
    MissingFile { path: PathBuf },

    #[error("Missing glif {file} in {}", dir.display())]
    MissingGlif { file: String, dir: PathBuf },

    #[error("Glyph directory {dir} missing")]
    MissingLayerDir { dir: String },

    #[error("No public.default layer")]
    NoDefaultLayer,

    #[error("UFO version must be 2 or 3, got {0:?}")]
    InvalidUfoVersion(String),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    #[error("Attempt to add duplicate key {key} to plist")]
    DuplicateKey { key: String },

    #[error("Already a {tag} element in glif")]
    DuplicateElement { tag: String },

    #[error("No {tag} element at index {index}")]
    ElementNotFound { tag: String, index: usize },

    #[error("Glyph not found: {name}")]
    GlyphNotFound { name: String },

    #[error("{name} already in font")]
    DuplicateGlyph { name: String },

    #[error("Layer not found: {name}")]
    LayerNotFound { name: String },

    #[error("{file} already in font")]
    DuplicateFile { file: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotADirectory { .. } => ErrorCode::NotADirectory,
            Self::NotAUfo { .. } => ErrorCode::NotAUfo,
            Self::MissingFile { .. }
            | Self::MissingGlif { .. }
            | Self::MissingLayerDir { .. } => ErrorCode::MissingFile,
            Self::NoDefaultLayer => ErrorCode::NoDefaultLayer,
            Self::InvalidUfoVersion(_) => ErrorCode::InvalidUfoVersion,
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::KeyNotFound { .. } => ErrorCode::KeyNotFound,
            Self::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            Self::DuplicateElement { .. } => ErrorCode::DuplicateElement,
            Self::ElementNotFound { .. } => ErrorCode::ElementNotFound,
            Self::GlyphNotFound { .. } => ErrorCode::GlyphNotFound,
            Self::DuplicateGlyph { .. } => ErrorCode::DuplicateGlyph,
            Self::LayerNotFound { .. } => ErrorCode::LayerNotFound,
            Self::DuplicateFile { .. } => ErrorCode::DuplicateFile,
            Self::InvalidValue { .. } => ErrorCode::InvalidValue,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotAUfo { path } => Some(format!(
                "Refusing to write into {}: it is not empty and has no metainfo.plist. \
                 Choose an empty or missing directory.",
                path.display()
            )),
            Self::MissingFile { path } if path.ends_with("metainfo.plist") => {
                Some("Every UFO needs a metainfo.plist; check the input path.".to_string())
            }
            Self::InvalidUfoVersion(_) => {
                Some("Set the UFOversion parameter to 2 or 3 (e.g. `-p UFOversion=3`).".to_string())
            }
            Self::NoDefaultLayer => Some(
                "layercontents.plist must list a layer named public.default".to_string(),
            ),
            Self::Config(msg) if msg.contains("glyphElementOrder") => Some(
                "glyphElementOrder must list each of: advance, unicode, note, image, \
                 guideline, anchor, outline, lib"
                    .to_string(),
            ),
            Self::Config(_) => Some(
                "Parameters are given as name=value, e.g. `-p precision=2 -p sortDicts=false`"
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }

    /// Build a parse error for a named source.
    pub(crate) fn parse(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NoDefaultLayer.exit_code(), 2);
        assert_eq!(
            Error::KeyNotFound { key: "x".into() }.exit_code(),
            3
        );
        assert_eq!(
            Error::DuplicateKey { key: "x".into() }.exit_code(),
            4
        );
        assert_eq!(Error::Config("bad".into()).exit_code(), 7);
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::InvalidUfoVersion("4".into());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_UFO_VERSION");
        assert!(json["error"]["hint"].as_str().unwrap().contains("UFOversion"));
    }

    #[test]
    fn test_missing_glif_maps_to_missing_file() {
        let err = Error::MissingGlif {
            file: "a.glif".into(),
            dir: PathBuf::from("font.ufo/glyphs"),
        };
        assert_eq!(err.error_code(), ErrorCode::MissingFile);
        assert!(err.to_string().contains("a.glif"));
    }
}
