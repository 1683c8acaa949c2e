//! Error types for metagrid.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias using metagrid's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for metagrid operations.
///
/// Schema derivation itself never fails; these variants come from loading
/// metadata documents, building the registry, and resolving lookups.
#[derive(Error, Debug)]
pub enum Error {
    /// Two classes share a name.
    #[error("Duplicate class: {0}")]
    DuplicateClass(String),

    /// A class names a parent that does not exist.
    #[error("Unknown parent class {parent} for class {class}")]
    UnknownParent { class: String, parent: String },

    /// The parent chain of a class loops back on itself.
    #[error("Inheritance cycle at class: {0}")]
    InheritanceCycle(String),

    /// Two attributes share a name within one class declaration.
    #[error("Duplicate attribute {attr} in class {class}")]
    DuplicateAttribute { class: String, attr: String },

    /// Two views share a name within one class.
    #[error("Duplicate view {view} in class {class}")]
    DuplicateView { class: String, view: String },

    /// A view lists an attribute its class does not have.
    #[error("Unknown attribute {attr} in view {view}.{class}")]
    UnknownViewAttribute {
        class: String,
        view: String,
        attr: String,
    },

    /// A file behavior points at a missing attribute.
    #[error("Unknown file attribute {attr} in class {class}")]
    UnknownFileAttribute { class: String, attr: String },

    /// Class lookup failed
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// View lookup failed
    #[error("View not found: {0}")]
    ViewNotFound(String),

    /// Attribute lookup failed
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// Unsupported metadata document format
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Search text could not be compiled into a matcher
    #[error("Invalid search: {0}")]
    InvalidSearch(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
