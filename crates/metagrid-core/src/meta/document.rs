//! Serialized metadata documents.
//!
//! A document is the declarative form of the metadata graph. It is read from
//! JSON or TOML and turned into a [`MetaRegistry`](super::MetaRegistry),
//! which resolves inheritance and cross references.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::attr::{AttrOptions, AttrType, EnumItem, ViewType};
use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

/// Root of a metadata document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaDocument {
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl MetaDocument {
    /// Read a document, choosing the parser by file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("toml") => Self::from_toml(&content),
            other => Err(Error::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Declaration of one metadata class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent class; attributes and behaviors are inherited from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Key attribute name (default: `_id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub attrs: Vec<AttrDef>,
    #[serde(default)]
    pub states: Vec<StateDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
    #[serde(default)]
    pub views: Vec<ViewDef>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorDef>,
}

/// Declaration of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttrDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub attr_type: AttrType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_type: Option<ViewType>,
    /// Display hint; a name or an object with a `name` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(default = "default_true")]
    pub utc: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub common_searchable: bool,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_true")]
    pub escape: bool,
    /// Relation search recursion depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_depth: Option<u32>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_items: Option<Vec<EnumItem>>,
    /// Target class of `ref`/`backref` attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_class: Option<String>,
    /// Embedded model name, e.g. `user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_model: Option<String>,
    #[serde(default)]
    pub commands: AttrCommands,
    #[serde(default)]
    pub options: AttrOptions,
}

impl AttrDef {
    /// A plain attribute with default flags.
    pub fn new(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            label: None,
            attr_type,
            view_type: None,
            format: None,
            utc: true,
            searchable: false,
            common_searchable: false,
            sortable: false,
            hidden: false,
            read_only: false,
            escape: true,
            search_depth: None,
            enum_items: None,
            ref_class: None,
            embedded_model: None,
            commands: AttrCommands::default(),
            options: AttrOptions::default(),
        }
    }
}

/// Commands allowed on related objects of a relation attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttrCommands {
    pub edit: bool,
}

/// A declared workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A declared workflow transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Declaration of a view over a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes of the view. Absent means every class attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Vec<ViewAttrDef>>,
    #[serde(default)]
    pub options: ViewOptions,
}

/// A view attribute: a class attribute name plus per-view overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAttrDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_searchable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<AttrOptions>,
}

/// View-level options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub commands: CommandOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Overrides of the default grid commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

/// Class behaviors relevant to grid metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BehaviorDef {
    /// Keeps a manual sort order in `attr`.
    SortOrder { attr: String },
    /// The class stores an uploaded file.
    File(FileBehaviorDef),
}

/// File behavior settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileBehaviorDef {
    /// Attribute holding the file.
    pub attr: String,
    pub image_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    pub extensions: Vec<String>,
    pub mime_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_attr: Option<String>,
}
