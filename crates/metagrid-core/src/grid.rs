//! Grid column derivation for list views.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;
use utoipa::ToSchema;

use crate::config::ExtraMetaConfig;
use crate::defaults;
use crate::meta::{FilterSource, MetaAttr, MetaClass};

/// One column of a data grid.
///
/// The synthetic key column only carries `name`, `label` and the flags.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridColumn {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_name: Option<String>,
    pub searchable: bool,
    pub sortable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub format: Option<Value>,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cell_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_format: Option<String>,
    /// Only set for date attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc: Option<bool>,
}

impl GridColumn {
    /// Hidden key column for sources that do not list their key attribute.
    pub fn key(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: defaults::KEY_COLUMN_LABEL.to_string(),
            column_type: None,
            title_name: None,
            searchable: true,
            sortable: true,
            escape: None,
            grouping: None,
            format: None,
            hidden: true,
            translate: None,
            max_cell_height: None,
            moment_format: None,
            utc: None,
        }
    }

    pub fn from_attr(attr: &MetaAttr, config: &ExtraMetaConfig) -> Self {
        Self {
            name: attr.name.clone(),
            label: attr.title.clone(),
            column_type: Some(attr.attr_type.as_str().to_string()),
            title_name: Some(format!("{}{}", attr.name, defaults::TITLE_NAME_SUFFIX)),
            searchable: attr.common_searchable,
            sortable: attr.sortable,
            escape: Some(attr.escape),
            grouping: Some(attr.sortable),
            format: attr_format(attr, config),
            hidden: attr.hidden,
            translate: Some(format!("{}.{}", defaults::TRANSLATE_PREFIX, attr.translation_key)),
            max_cell_height: attr.options.max_cell_height,
            moment_format: attr.options.moment_format.clone(),
            utc: attr.is_date().then(|| attr.is_utc()),
        }
    }
}

/// Grid columns of a class or view: the key column when the source does not
/// list the class key, then one column per attribute.
pub fn grid_columns<S>(source: &S, class: &MetaClass, config: &ExtraMetaConfig) -> Vec<GridColumn>
where
    S: FilterSource + ?Sized,
{
    let attrs = source.attrs();
    let mut columns = Vec::with_capacity(attrs.len() + 1);
    if !attrs.iter().any(|attr| attr.name == class.key) {
        columns.push(GridColumn::key(&class.key));
    }
    for attr in attrs {
        trace!(subsystem = "grid", attr = %attr.id, "Building grid column");
        columns.push(GridColumn::from_attr(attr, config));
    }
    columns
}

/// Display format of a grid cell.
///
/// Relations always get an object format; other attributes use the declared
/// format or a default for their kind.
pub fn attr_format(attr: &MetaAttr, config: &ExtraMetaConfig) -> Option<Value> {
    if attr.relation.is_some() {
        return Some(Value::Object(relation_format(attr, config)));
    }
    if let Some(format) = attr.format.as_ref().filter(|format| !format.is_null()) {
        return Some(format.clone());
    }
    let name = if attr.is_file() {
        "thumbnail"
    } else if attr.is_time() {
        "time"
    } else if attr.is_class() || attr.is_embedded_model() || attr.is_state() {
        "title"
    } else {
        return None;
    };
    Some(Value::String(name.to_string()))
}

/// `{name, url?}` format of a relation cell.
///
/// The edit `url` needs a resolved target class.
pub fn relation_format(attr: &MetaAttr, config: &ExtraMetaConfig) -> Map<String, Value> {
    let mut format = match (attr.format_name(), &attr.format) {
        (Some(name), _) => named_format(name),
        (None, Some(Value::Object(map))) => map.clone(),
        _ => named_format(if attr.is_thumbnail() { "thumbnail" } else { "link" }),
    };
    let resolved = attr
        .relation
        .as_ref()
        .filter(|relation| relation.ref_class.is_some());
    if let Some(relation) = resolved {
        if attr.can_edit && !format.contains_key("url") {
            format.insert(
                "url".to_string(),
                Value::String(format!("{}?c={}", config.update_url, relation.ref_class_name)),
            );
        }
    }
    format
}

fn named_format(name: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".to_string(), Value::String(name.to_string()));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{test_attr, AttrType, ClassId, Relation, ViewType};
    use serde_json::json;

    fn relation_attr() -> MetaAttr {
        let mut attr = test_attr("customer", AttrType::Ref);
        attr.relation = Some(Relation {
            ref_class_name: "customer".to_string(),
            ref_class: Some(ClassId(1)),
            multiple: false,
        });
        attr
    }

    #[test]
    fn test_relation_format_defaults() {
        let config = ExtraMetaConfig::default();
        let mut attr = relation_attr();
        assert_eq!(attr_format(&attr, &config), Some(json!({"name": "link"})));

        attr.view_type = Some(ViewType::Thumbnail);
        assert_eq!(attr_format(&attr, &config), Some(json!({"name": "thumbnail"})));
    }

    #[test]
    fn test_relation_format_edit_url() {
        let config = ExtraMetaConfig::default();
        let mut attr = relation_attr();
        attr.can_edit = true;
        attr.format = Some(json!("title"));
        assert_eq!(
            attr_format(&attr, &config),
            Some(json!({"name": "title", "url": "model/update?c=customer"}))
        );

        attr.format = Some(json!({"name": "link", "url": "custom"}));
        assert_eq!(
            attr_format(&attr, &config),
            Some(json!({"name": "link", "url": "custom"}))
        );
    }

    #[test]
    fn test_unresolved_relation_has_no_edit_url() {
        let config = ExtraMetaConfig::default();
        let mut attr = relation_attr();
        attr.can_edit = true;
        if let Some(relation) = attr.relation.as_mut() {
            relation.ref_class = None;
        }
        assert_eq!(attr_format(&attr, &config), Some(json!({"name": "link"})));
    }

    #[test]
    fn test_scalar_format_defaults() {
        let config = ExtraMetaConfig::default();
        assert_eq!(
            attr_format(&test_attr("file", AttrType::File), &config),
            Some(json!("thumbnail"))
        );
        assert_eq!(
            attr_format(&test_attr("status", AttrType::State), &config),
            Some(json!("title"))
        );
        assert_eq!(
            attr_format(&test_attr("owner", AttrType::User), &config),
            Some(json!("title"))
        );
        let mut time = test_attr("at", AttrType::Date);
        time.view_type = Some(ViewType::Time);
        assert_eq!(attr_format(&time, &config), Some(json!("time")));
        assert_eq!(attr_format(&test_attr("n", AttrType::String), &config), None);

        let mut declared = test_attr("n", AttrType::Integer);
        declared.format = Some(json!("number"));
        assert_eq!(attr_format(&declared, &config), Some(json!("number")));
    }

    #[test]
    fn test_grid_column_fields() {
        let config = ExtraMetaConfig::default();
        let mut attr = test_attr("created", AttrType::Date);
        attr.sortable = true;
        attr.common_searchable = true;
        attr.options.max_cell_height = Some(40);

        let value = serde_json::to_value(GridColumn::from_attr(&attr, &config)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "created",
                "label": "created",
                "type": "date",
                "titleName": "created_title",
                "searchable": true,
                "sortable": true,
                "escape": true,
                "grouping": true,
                "hidden": false,
                "translate": "meta.class.test.attr.created",
                "maxCellHeight": 40,
                "utc": true
            })
        );
    }

    #[test]
    fn test_key_column_shape() {
        let value = serde_json::to_value(GridColumn::key("_id")).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "_id",
                "label": "ID",
                "searchable": true,
                "sortable": true,
                "hidden": true
            })
        );
    }
}
