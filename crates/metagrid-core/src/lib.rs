//! # metagrid-core
//!
//! Filter and grid schema derivation over an in-memory metadata graph.
//!
//! A [`MetaDocument`] describes classes, their attributes, states and views.
//! [`MetaRegistry`] resolves it into an immutable graph, and
//! [`FilterSchemaDeriver`] turns any class or view into the search filter
//! schema a grid client renders. [`ExtraMeta`] prepares grid columns and the
//! remaining list page settings for every class and view.

pub mod config;
pub mod defaults;
pub mod error;
pub mod extra_meta;
pub mod filter;
pub mod grid;
pub mod logging;
pub mod meta;
pub mod select;

// Re-export commonly used types at crate root
pub use config::{ConfigError, DescendantScope, FilterConfig, ItemShape, MetagridConfig};
pub use error::{Error, Result};
pub use extra_meta::{
    ExtraMeta, FileAttrData, ModelFileData, StoredFile, ViewCommands, ViewMetaData,
};
pub use filter::{
    ColumnItems, ColumnSchema, ColumnType, DescendantColumn, DescendantItem, FilterColumn,
    FilterKind, FilterSchemaDeriver, SelectItem, ValueType,
};
pub use grid::GridColumn;
pub use meta::{
    ClassId, FilterSource, MetaAttr, MetaClass, MetaDocument, MetaRegistry, MetaSource, MetaView,
};
pub use select::{label_text, Labeled};
