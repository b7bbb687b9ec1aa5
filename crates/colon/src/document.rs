//! Documents that queries are evaluated against.
//!
//! A document is a block of free text plus a flat map of named fields. Documents are
//! loaded from JSON or TOML files of the shape
//!
//! ```toml
//! text = "some text to match"
//!
//! [fields]
//! lang = "en"
//! price = 10
//! ```
//!
//! Field values may be strings, numbers or booleans; they are stored as strings.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use toml::de;

/// Errors that can occur when building a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Failed to read a document file.
    #[error("failed to read document {path}: {source}")]
    Read {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse a JSON document.
    #[error("failed to parse document {path}: {source}")]
    Json {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to parse a TOML document.
    #[error("failed to parse document {path}: {source}")]
    Toml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: de::Error,
    },

    /// The file extension is not one of the supported formats.
    #[error("unsupported document format: {path} (expected .json or .toml)")]
    UnsupportedFormat {
        /// Path with the unsupported extension.
        path: PathBuf,
    },

    /// A field assignment is not of the form `key=value`.
    #[error("invalid field '{input}': expected key=value")]
    InvalidField {
        /// The rejected assignment.
        input: String,
    },
}

/// A scalar field value as written in a document file.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    /// String value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl Scalar {
    /// Renders the value the way it would be written in a query.
    fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// On-disk layout of a document file.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    /// Free text.
    #[serde(default)]
    text: String,
    /// Named fields.
    #[serde(default)]
    fields: BTreeMap<String, Scalar>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Self {
            text: raw.text,
            fields: raw
                .fields
                .into_iter()
                .map(|(key, value)| (key, value.into_string()))
                .collect(),
        }
    }
}

/// Free text plus named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Text searched by bare query terms.
    pub text: String,
    /// Fields matched by `key:value` filters and comparisons.
    pub fields: BTreeMap<String, String>,
}

impl Document {
    /// Creates a document with the given text and no fields.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, replacing any previous value for the key.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a field's value.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns true if the document text contains the term.
    pub fn contains(&self, term: &str) -> bool {
        self.text.contains(term)
    }

    /// Loads a document from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => {
                return Err(DocumentError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        let contents = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&contents, format, path)
    }

    /// Parses a document from file contents.
    ///
    /// The `path` parameter is used for error reporting.
    fn parse_str(contents: &str, format: Format, path: &Path) -> Result<Self, DocumentError> {
        let raw: RawDocument = match format {
            Format::Json => {
                serde_json::from_str(contents).map_err(|source| DocumentError::Json {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Format::Toml => toml::from_str(contents).map_err(|source| DocumentError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
        };
        Ok(raw.into())
    }
}

/// Supported document file formats.
#[derive(Clone, Copy)]
enum Format {
    /// JSON object.
    Json,
    /// TOML table.
    Toml,
}

/// Splits a `key=value` assignment at its first `=`.
///
/// The key must be non-empty; the value may be empty.
pub fn parse_field(input: &str) -> Result<(String, String), DocumentError> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(DocumentError::InvalidField {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_with_scalar_fields() {
        let contents = r#"
text = "a guide to rust"

[fields]
lang = "en"
price = 10
rating = 4.5
draft = false
"#;
        let doc = Document::parse_str(contents, Format::Toml, Path::new("doc.toml")).unwrap();
        assert_eq!(doc.text, "a guide to rust");
        assert_eq!(doc.field("lang"), Some("en"));
        assert_eq!(doc.field("price"), Some("10"));
        assert_eq!(doc.field("rating"), Some("4.5"));
        assert_eq!(doc.field("draft"), Some("false"));
        assert_eq!(doc.field("missing"), None);
    }

    #[test]
    fn parses_json() {
        let contents = r#"{"text": "hello", "fields": {"key1": "value1", "n": 3}}"#;
        let doc = Document::parse_str(contents, Format::Json, Path::new("doc.json")).unwrap();
        assert_eq!(
            doc,
            Document::new("hello")
                .with_field("key1", "value1")
                .with_field("n", "3")
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let doc = Document::parse_str("{}", Format::Json, Path::new("doc.json")).unwrap();
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Document::parse_str("title = \"x\"", Format::Toml, Path::new("doc.toml"))
            .unwrap_err();
        assert!(matches!(err, DocumentError::Toml { .. }));
    }

    #[test]
    fn rejects_nested_field_values() {
        let contents = r#"{"fields": {"tags": ["a", "b"]}}"#;
        let err = Document::parse_str(contents, Format::Json, Path::new("doc.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Json { .. }));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let err = Document::load(Path::new("doc.yaml")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("doc.yaml"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Document::load(Path::new("/nonexistent/colon/doc.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }

    #[test]
    fn contains_is_substring_match() {
        let doc = Document::new("some text to match abc");
        assert!(doc.contains("abc"));
        assert!(doc.contains("x"));
        assert!(!doc.contains("def and foo"));
    }

    #[test]
    fn field_assignments() {
        assert_eq!(
            parse_field("lang=en").unwrap(),
            ("lang".to_string(), "en".to_string())
        );
        assert_eq!(
            parse_field("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_field("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(matches!(
            parse_field("novalue"),
            Err(DocumentError::InvalidField { .. })
        ));
        assert!(parse_field("=value").is_err());
    }
}
