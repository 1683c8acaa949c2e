//! Attribute descriptors and their kind predicates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ClassId;

/// Declared value kind of an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttrType {
    #[default]
    String,
    Text,
    Integer,
    Float,
    Date,
    Boolean,
    State,
    Class,
    EmbeddedModel,
    User,
    Ref,
    Backref,
    File,
    Json,
    Id,
    Calc,
}

impl AttrType {
    /// Raw type token as declared in metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::State => "state",
            Self::Class => "class",
            Self::EmbeddedModel => "embeddedModel",
            Self::User => "user",
            Self::Ref => "ref",
            Self::Backref => "backref",
            Self::File => "file",
            Self::Json => "json",
            Self::Id => "id",
            Self::Calc => "calc",
        }
    }
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation hint of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewType {
    Date,
    Datetime,
    LocalDate,
    LocalDatetime,
    Time,
    Timestamp,
    Thumbnail,
    #[serde(other)]
    Other,
}

/// One declared value of an enum-backed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumItem {
    pub value: Value,
    pub text: String,
}

/// Display options carried through to grid columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttrOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cell_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Relation descriptor of a `ref`/`backref` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Target class name as declared.
    pub ref_class_name: String,
    /// Target class, when it exists in the registry.
    pub ref_class: Option<ClassId>,
    /// Whether the relation holds many values.
    pub multiple: bool,
}

/// A resolved attribute of a class or view.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaAttr {
    pub name: String,
    pub title: String,
    pub attr_type: AttrType,
    pub view_type: Option<ViewType>,
    pub format: Option<Value>,
    pub utc: bool,
    pub searchable: bool,
    pub common_searchable: bool,
    pub sortable: bool,
    pub hidden: bool,
    pub read_only: bool,
    pub escape: bool,
    pub search_depth: u32,
    pub enum_items: Option<Vec<EnumItem>>,
    pub relation: Option<Relation>,
    pub embedded_model: Option<String>,
    /// Whether the related object may be edited from this attribute.
    pub can_edit: bool,
    pub options: AttrOptions,
    /// Owning class.
    pub class: ClassId,
    /// `<attr>.<owner id>`
    pub id: String,
    pub translation_key: String,
}

impl MetaAttr {
    pub fn is_enum(&self) -> bool {
        self.enum_items.is_some()
    }

    pub fn is_state(&self) -> bool {
        self.attr_type == AttrType::State
    }

    pub fn is_class(&self) -> bool {
        self.attr_type == AttrType::Class
    }

    pub fn is_embedded_model(&self) -> bool {
        matches!(self.attr_type, AttrType::EmbeddedModel | AttrType::User)
    }

    pub fn is_user(&self) -> bool {
        self.attr_type == AttrType::User || self.embedded_model.as_deref() == Some("user")
    }

    pub fn is_date(&self) -> bool {
        self.attr_type == AttrType::Date
    }

    pub fn is_time(&self) -> bool {
        self.is_date() && self.view_type == Some(ViewType::Time)
    }

    pub fn is_number(&self) -> bool {
        matches!(self.attr_type, AttrType::Integer | AttrType::Float)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.attr_type, AttrType::String | AttrType::Text)
    }

    pub fn is_file(&self) -> bool {
        self.attr_type == AttrType::File
    }

    pub fn is_thumbnail(&self) -> bool {
        self.view_type == Some(ViewType::Thumbnail)
    }

    /// Local date views are stored without time zone conversion.
    pub fn is_utc(&self) -> bool {
        self.utc
            && !matches!(
                self.view_type,
                Some(ViewType::LocalDate) | Some(ViewType::LocalDatetime)
            )
    }

    /// Default date/time format token of a date attribute.
    pub fn default_date_format(&self) -> &'static str {
        match self.view_type {
            Some(ViewType::Date) | Some(ViewType::LocalDate) => "date",
            Some(ViewType::Time) => "time",
            Some(ViewType::Timestamp) => "timestamp",
            _ => "datetime",
        }
    }

    /// The declared format as a plain name, when it is a string.
    pub fn format_name(&self) -> Option<&str> {
        self.format.as_ref().and_then(Value::as_str)
    }
}

#[cfg(test)]
pub(crate) fn test_attr(name: &str, attr_type: AttrType) -> MetaAttr {
    MetaAttr {
        name: name.to_string(),
        title: name.to_string(),
        attr_type,
        view_type: None,
        format: None,
        utc: true,
        searchable: true,
        common_searchable: false,
        sortable: false,
        hidden: false,
        read_only: false,
        escape: true,
        search_depth: 0,
        enum_items: None,
        relation: None,
        embedded_model: None,
        can_edit: false,
        options: AttrOptions::default(),
        class: ClassId(0),
        id: format!("{}.test", name),
        translation_key: format!("class.test.attr.{}", name),
    }
}
