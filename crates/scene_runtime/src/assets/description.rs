//! Structured descriptions for scenes, entities, AI and schedulers
//!
//! Descriptions arrive as JSON text. This module owns the two external
//! collaborators the rest of the crate relies on: loading raw bytes from
//! disk and parsing them into a [`Description`] tree. Everything above it
//! works on the parsed tree and decodes typed pieces with `serde`.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Generic parsed description tree
pub type Description = Value;

/// Malformed or unreadable description
#[derive(Error, Debug)]
pub enum DescriptionError {
    /// The file backing a description could not be read
    #[error("failed to read \"{path}\": {source}")]
    Io {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The text is not valid JSON
    #[error("malformed description text: {0}")]
    Syntax(#[source] serde_json::Error),

    /// A required field is absent
    #[error("missing required field \"{0}\"")]
    MissingField(String),

    /// A field holds a value of the wrong kind
    #[error("field \"{field}\" must be {expected}")]
    WrongType {
        /// Offending field
        field: String,
        /// Human readable expected kind
        expected: &'static str,
    },

    /// A typed section failed to decode
    #[error("invalid {what} description: {source}")]
    Decode {
        /// What was being decoded ("camera", "collider", ...)
        what: &'static str,
        /// Decoder error with field details
        #[source]
        source: serde_json::Error,
    },

    /// A value is well typed but semantically invalid
    #[error("invalid value for \"{field}\": {reason}")]
    Invalid {
        /// Offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Either a single item or an array of items
///
/// Used where a description accepts `{...}` and `[{...}, ...]`
/// interchangeably.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single object
    One(T),
    /// An array of objects
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalize into a list
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Load the raw bytes of a description file
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<u8>, DescriptionError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| DescriptionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse description bytes into a tree
pub fn parse(bytes: &[u8]) -> Result<Description, DescriptionError> {
    serde_json::from_slice(bytes).map_err(DescriptionError::Syntax)
}

/// Load and parse a description file
pub fn load(path: impl AsRef<Path>) -> Result<Description, DescriptionError> {
    let path = path.as_ref();
    log::debug!("Loading description from {}", path.display());
    parse(&load_file(path)?)
}

/// Resolve a value that is either an inline object or a path to one
///
/// Strings are treated as file paths and loaded; objects are borrowed
/// as-is. Anything else is a type error for `field`.
pub fn resolve<'a>(value: &'a Value, field: &str) -> Result<Cow<'a, Value>, DescriptionError> {
    match value {
        Value::Object(_) => Ok(Cow::Borrowed(value)),
        Value::String(path) => {
            let loaded = load(path)?;
            if loaded.is_object() {
                Ok(Cow::Owned(loaded))
            } else {
                Err(wrong_type(field, "an object"))
            }
        }
        _ => Err(wrong_type(field, "an object or a path")),
    }
}

/// Decode a typed section of a description
pub fn decode<T: DeserializeOwned>(value: &Value, what: &'static str) -> Result<T, DescriptionError> {
    T::deserialize(value).map_err(|source| DescriptionError::Decode { what, source })
}

/// View a value as an object
pub fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>, DescriptionError> {
    value.as_object().ok_or_else(|| wrong_type(field, "an object"))
}

/// Fetch a required string field from an object
pub fn required_str<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str, DescriptionError> {
    match object.get(field) {
        None => Err(DescriptionError::MissingField(field.to_string())),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(wrong_type(field, "a string")),
    }
}

/// Fetch an optional array field from an object
pub fn optional_array<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a Vec<Value>>, DescriptionError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(wrong_type(field, "an array")),
    }
}

fn wrong_type(field: &str, expected: &'static str) -> DescriptionError {
    DescriptionError::WrongType {
        field: field.to_string(),
        expected,
    }
}
