//! Search filter schema derivation.
//!
//! Given a class or view, [`FilterSchemaDeriver`] produces one column per
//! searchable attribute, in declaration order, and appends a synthetic
//! `_descendant` column when descendant classes add searchable attributes of
//! their own.
//!
//! # Recursion
//!
//! Relation columns expand into the target class's columns while the depth is
//! positive. The depth is the caller's value, or the attribute's declared
//! search depth when the caller passes none, and it drops by one per hop.
//! Termination depends on the depth alone, so cyclic relation graphs are safe.
//!
//! # Example
//!
//! ```
//! use metagrid_core::config::FilterConfig;
//! use metagrid_core::filter::FilterSchemaDeriver;
//! use metagrid_core::meta::{MetaDocument, MetaRegistry};
//!
//! let doc = MetaDocument::from_json(r#"{"classes": [
//!     {"name": "order", "attrs": [{"name": "number", "searchable": true}]}
//! ]}"#).unwrap();
//! let registry = MetaRegistry::from_document(&doc).unwrap();
//! let config = FilterConfig::default();
//! let deriver = FilterSchemaDeriver::new(&registry, &config);
//!
//! let columns = deriver.derive_columns(registry.class("order").unwrap(), None);
//! assert_eq!(columns.len(), 1);
//! assert_eq!(columns[0].name(), "number");
//! ```

mod column;
mod kind;

pub use column::{
    ColumnItems, ColumnSchema, ColumnType, DescendantColumn, DescendantItem, FilterColumn,
    SelectItem, ValueType,
};
pub use kind::FilterKind;

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::config::{DescendantScope, FilterConfig, ItemShape};
use crate::defaults;
use crate::meta::{ClassId, FilterSource, MetaAttr, MetaRegistry};
use crate::select;

/// Class selector items computed during one top-level derivation, keyed by
/// the class that owns the class-reference attribute.
#[derive(Debug, Default)]
pub struct ClassItemMemo {
    items: HashMap<ClassId, Vec<SelectItem>>,
}

impl ClassItemMemo {
    fn get_or_insert_with(
        &mut self,
        owner: ClassId,
        compute: impl FnOnce() -> Vec<SelectItem>,
    ) -> Vec<SelectItem> {
        self.items.entry(owner).or_insert_with(compute).clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Derives filter schemas from a metadata registry.
///
/// Holds only shared references; every call is independent.
#[derive(Debug, Clone, Copy)]
pub struct FilterSchemaDeriver<'a> {
    registry: &'a MetaRegistry,
    config: &'a FilterConfig,
}

impl<'a> FilterSchemaDeriver<'a> {
    pub fn new(registry: &'a MetaRegistry, config: &'a FilterConfig) -> Self {
        Self { registry, config }
    }

    /// Full filter schema of a class or view: attribute columns followed by
    /// the descendant column, if any.
    pub fn derive_columns<S>(&self, source: &S, depth: Option<u32>) -> Vec<FilterColumn>
    where
        S: FilterSource + ?Sized,
    {
        debug!(
            subsystem = "filter",
            op = "derive_columns",
            source = source.source_id(),
            depth = ?depth,
            "Deriving filter columns"
        );
        let mut memo = ClassItemMemo::default();
        self.columns(source, depth, &mut memo)
    }

    /// Attribute columns only, without the descendant column.
    pub fn derive_attr_columns<S>(&self, source: &S, depth: Option<u32>) -> Vec<ColumnSchema>
    where
        S: FilterSource + ?Sized,
    {
        let mut memo = ClassItemMemo::default();
        self.attr_columns(source, depth, &mut memo)
    }

    /// The synthetic descendant column of a class or view, if any descendant
    /// contributes attributes of its own.
    pub fn derive_descendant_column<S>(
        &self,
        parent: &S,
        depth: Option<u32>,
    ) -> Option<DescendantColumn>
    where
        S: FilterSource + ?Sized,
    {
        let mut memo = ClassItemMemo::default();
        self.descendant_column(parent, depth, &mut memo)
    }

    fn columns<S>(
        &self,
        source: &S,
        depth: Option<u32>,
        memo: &mut ClassItemMemo,
    ) -> Vec<FilterColumn>
    where
        S: FilterSource + ?Sized,
    {
        let mut columns: Vec<FilterColumn> = self
            .attr_columns(source, depth, memo)
            .into_iter()
            .map(FilterColumn::Attr)
            .collect();
        if let Some(descendant) = self.descendant_column(source, depth, memo) {
            columns.push(FilterColumn::Descendant(descendant));
        }
        columns
    }

    fn attr_columns<S>(
        &self,
        source: &S,
        depth: Option<u32>,
        memo: &mut ClassItemMemo,
    ) -> Vec<ColumnSchema>
    where
        S: FilterSource + ?Sized,
    {
        source
            .search_attrs()
            .into_iter()
            .map(|attr| self.build_column(attr, depth, memo))
            .collect()
    }

    /// Build the column of one attribute.
    ///
    /// The base record is the same for every kind; the classifier verdict then
    /// decides the kind-specific fields.
    pub fn build_column(
        &self,
        attr: &MetaAttr,
        depth: Option<u32>,
        memo: &mut ClassItemMemo,
    ) -> ColumnSchema {
        let mut column = base_column(attr);
        let kind = FilterKind::classify(attr);
        trace!(subsystem = "filter", attr = %attr.id, kind = ?kind, "Building column");

        match kind {
            FilterKind::Relation => {
                column.column_type = ColumnType::Selector;
                column.id = Some(attr.id.clone());
                column.columns = self.expand_relation(attr, depth, memo);
            }
            FilterKind::Enum => {
                let items: Vec<SelectItem> = attr
                    .enum_items
                    .iter()
                    .flatten()
                    .map(|item| SelectItem::new(item.value.clone(), item.text.clone()))
                    .collect();
                let value_type = if attr.is_number() {
                    ValueType::Number
                } else {
                    ValueType::String
                };
                column.column_type = if items.is_empty() {
                    value_type.into()
                } else {
                    ColumnType::Selector
                };
                column.value_type = Some(value_type);
                column.items = Some(ColumnItems::List(items));
            }
            FilterKind::State => {
                let items = self
                    .registry
                    .get(attr.class)
                    .states
                    .iter()
                    .map(|state| SelectItem::new(state.name.clone(), state.title.clone()))
                    .collect();
                column.column_type = ColumnType::Selector;
                column.items = Some(match self.config.state_items {
                    ItemShape::List => ColumnItems::List(items),
                    ItemShape::Map => ColumnItems::Map(items),
                });
            }
            FilterKind::ClassRef => {
                let registry = self.registry;
                let items = memo.get_or_insert_with(attr.class, || {
                    select::label_items(registry.classes())
                });
                column.column_type = ColumnType::Selector;
                column.value_type = Some(ValueType::String);
                column.items = Some(ColumnItems::List(items));
            }
            FilterKind::EmbeddedModel => {
                if attr.is_user() {
                    column.column_type = ColumnType::Selector;
                    column.url = Some(self.config.user_select_url.clone());
                } else {
                    column.column_type = ColumnType::Id;
                }
            }
            FilterKind::Plain => {}
        }

        column
    }

    /// Nested columns of a relation attribute, or `None` when the relation
    /// must not be expanded.
    pub fn expand_relation(
        &self,
        attr: &MetaAttr,
        depth: Option<u32>,
        memo: &mut ClassItemMemo,
    ) -> Option<Vec<FilterColumn>> {
        let depth = depth.unwrap_or(attr.search_depth);
        if depth == 0 {
            return None;
        }
        let Some(target) = self.registry.ref_class(attr) else {
            debug!(
                subsystem = "filter",
                attr = %attr.id,
                ref_class = attr.relation.as_ref().map(|r| r.ref_class_name.as_str()),
                "Relation target unresolved, not expanding"
            );
            return None;
        };
        Some(self.columns(target, Some(depth - 1), memo))
    }

    fn descendant_column<S>(
        &self,
        parent: &S,
        depth: Option<u32>,
        memo: &mut ClassItemMemo,
    ) -> Option<DescendantColumn>
    where
        S: FilterSource + ?Sized,
    {
        let parent_id = parent.class_id();
        let descendants = match self.config.descendant_scope {
            DescendantScope::All => self.registry.descendants(parent_id),
            DescendantScope::Active => self.registry.active_descendants(parent_id),
        };

        let mut items = Vec::new();
        for &class_id in &descendants {
            let class = self.registry.get(class_id);
            let columns: Vec<ColumnSchema> = class
                .search_attrs()
                .into_iter()
                .filter(|attr| !parent.has_search_attr(&attr.name))
                .map(|attr| self.build_column(attr, depth, memo))
                .collect();

            trace!(
                subsystem = "filter",
                class = %class.name,
                column_count = columns.len(),
                "Descendant attributes"
            );

            if !columns.is_empty() {
                items.push(DescendantItem {
                    value: class.name.clone(),
                    text: format!("{} ({})", class.title(), class.name),
                    columns,
                });
            }
        }

        if items.is_empty() {
            return None;
        }
        Some(DescendantColumn {
            name: defaults::DESCENDANT_COLUMN_NAME.to_string(),
            label: self.config.descendant_label.clone(),
            column_type: defaults::DESCENDANT_COLUMN_TYPE.to_string(),
            items,
        })
    }
}

/// The record every kind starts from.
fn base_column(attr: &MetaAttr) -> ColumnSchema {
    ColumnSchema {
        name: attr.name.clone(),
        label: attr.title.clone(),
        column_type: scalar_type(attr),
        format: attr.format.clone(),
        utc: attr.is_utc(),
        translate: format!("{}.{}", defaults::TRANSLATE_PREFIX, attr.translation_key),
        id: None,
        columns: None,
        items: None,
        value_type: None,
        url: None,
    }
}

/// Column type of a plain attribute: date, number, text, user, then the
/// declared type.
pub fn scalar_type(attr: &MetaAttr) -> ColumnType {
    if attr.is_date() {
        ColumnType::DateFormat(attr.default_date_format())
    } else if attr.is_number() {
        ColumnType::Number
    } else if attr.is_text() {
        ColumnType::String
    } else if attr.is_user() {
        ColumnType::Id
    } else {
        ColumnType::Raw(attr.attr_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{test_attr, AttrType, ViewType};

    #[test]
    fn test_scalar_type_dispatch() {
        let mut date = test_attr("created", AttrType::Date);
        date.view_type = Some(ViewType::Date);
        assert_eq!(scalar_type(&date), ColumnType::DateFormat("date"));
        assert_eq!(
            scalar_type(&test_attr("n", AttrType::Integer)),
            ColumnType::Number
        );
        assert_eq!(
            scalar_type(&test_attr("s", AttrType::Text)),
            ColumnType::String
        );
        assert_eq!(scalar_type(&test_attr("u", AttrType::User)), ColumnType::Id);
        assert_eq!(
            scalar_type(&test_attr("b", AttrType::Boolean)),
            ColumnType::Raw(AttrType::Boolean)
        );
    }

    #[test]
    fn test_user_embedded_text_is_string_first() {
        // text wins over user in the scalar dispatch
        let mut attr = test_attr("login", AttrType::String);
        attr.embedded_model = Some("user".to_string());
        assert_eq!(scalar_type(&attr), ColumnType::String);
    }

    #[test]
    fn test_base_column_translate_prefix() {
        let column = base_column(&test_attr("number", AttrType::String));
        assert_eq!(column.translate, "meta.class.test.attr.number");
        assert_eq!(column.label, "number");
        assert!(column.utc);
    }

    #[test]
    fn test_memo_computes_once_per_owner() {
        let mut memo = ClassItemMemo::default();
        let mut calls = 0;
        for _ in 0..3 {
            memo.get_or_insert_with(ClassId(1), || {
                calls += 1;
                vec![SelectItem::new("a", "A")]
            });
        }
        memo.get_or_insert_with(ClassId(2), Vec::new);
        assert_eq!(calls, 1);
        assert_eq!(memo.len(), 2);
    }
}
