//! Filter column records produced by the deriver.
//!
//! All records serialize to the camelCase JSON the grid client reads. Fields
//! that only apply to some kinds are omitted when absent, and an absent
//! `columns` on a relation column means "do not expand further" (it is never
//! an empty list).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

use crate::meta::AttrType;

/// The `type` of a filter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    String,
    /// Pick from `items` or a remote list.
    Selector,
    /// Match by object id.
    Id,
    /// A date/time format token such as `date` or `datetime`.
    DateFormat(&'static str),
    /// The attribute's declared type, for kinds the client handles itself.
    Raw(AttrType),
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Number => "number",
            Self::String => "string",
            Self::Selector => "selector",
            Self::Id => "id",
            Self::DateFormat(token) => token,
            Self::Raw(attr_type) => attr_type.as_str(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<ValueType> for ColumnType {
    fn from(value: ValueType) -> Self {
        match value {
            ValueType::Number => Self::Number,
            ValueType::String => Self::String,
        }
    }
}

/// Scalar nature of selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
}

/// One selectable value.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SelectItem {
    #[schema(value_type = Object)]
    pub value: Value,
    pub text: String,
}

impl SelectItem {
    pub fn new(value: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }

    /// The value as an object key.
    pub fn key(&self) -> String {
        match &self.value {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

/// Selector items of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnItems {
    /// `[{value, text}, ...]`
    List(Vec<SelectItem>),
    /// `{value: text, ...}`, kept for older clients.
    Map(Vec<SelectItem>),
}

impl ColumnItems {
    pub fn items(&self) -> &[SelectItem] {
        match self {
            Self::List(items) | Self::Map(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl Serialize for ColumnItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(items) => items.serialize(serializer),
            Self::Map(items) => {
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for item in items {
                    map.serialize_entry(&item.key(), &item.text)?;
                }
                map.end()
            }
        }
    }
}

/// Filter column of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub column_type: ColumnType,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub format: Option<Value>,
    pub utc: bool,
    pub translate: String,
    /// Attribute id of relation columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Nested columns of an expanded relation.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub columns: Option<Vec<FilterColumn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub items: Option<ColumnItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// Remote endpoint of selector values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Descendant class entry of the synthetic descendant column.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DescendantItem {
    /// Descendant class name.
    pub value: String,
    /// `<label> (<name>)`
    pub text: String,
    pub columns: Vec<ColumnSchema>,
}

/// Synthetic column grouping attributes that only descendant classes have.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DescendantColumn {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub items: Vec<DescendantItem>,
}

/// One entry of a derived filter schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterColumn {
    Attr(ColumnSchema),
    Descendant(DescendantColumn),
}

impl FilterColumn {
    pub fn name(&self) -> &str {
        match self {
            Self::Attr(column) => &column.name,
            Self::Descendant(column) => &column.name,
        }
    }

    pub fn as_attr(&self) -> Option<&ColumnSchema> {
        match self {
            Self::Attr(column) => Some(column),
            Self::Descendant(_) => None,
        }
    }

    pub fn as_descendant(&self) -> Option<&DescendantColumn> {
        match self {
            Self::Descendant(column) => Some(column),
            Self::Attr(_) => None,
        }
    }
}
