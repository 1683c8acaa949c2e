//! Tests for prepared grid metadata.
//!
//! Verifies grid columns, commands, sort names, file settings and the
//! per-view lookups produced by `ExtraMeta::prepare`.

use metagrid_core::{ExtraMeta, MetaDocument, MetaRegistry, MetagridConfig, StoredFile};
use serde_json::{json, Value};

fn registry(value: Value) -> MetaRegistry {
    let doc: MetaDocument = serde_json::from_value(value).unwrap();
    MetaRegistry::from_document(&doc).unwrap()
}

fn catalog() -> MetaRegistry {
    registry(json!({"classes": [
        {"name": "order", "label": "Order", "description": "Sales orders",
         "attrs": [
            {"name": "number", "searchable": true, "commonSearchable": true, "sortable": true},
            {"name": "position", "type": "integer", "sortable": true},
            {"name": "customer", "type": "ref", "refClass": "customer", "commands": {"edit": true}},
            {"name": "photo", "type": "ref", "refClass": "image", "options": {"thumbnail": "small"}}
         ],
         "behaviors": [{"type": "sortOrder", "attr": "position"}],
         "views": [
            {"name": "list", "label": "Orders", "attrs": [{"name": "number"}, {"name": "position", "readOnly": true}],
             "options": {"commands": {"delete": false}}}
         ]},
        {"name": "customer", "key": "code", "attrs": [{"name": "code"}, {"name": "name"}]},
        {"name": "image", "attrs": [{"name": "file", "type": "file"}],
         "behaviors": [{"type": "file", "attr": "file", "imageOnly": true, "maxSize": 1024,
                        "extensions": ["png", "jpg"]}]}
    ]}))
}

fn prepared(config: MetagridConfig) -> (MetaRegistry, ExtraMeta) {
    let registry = catalog();
    let mut extra = ExtraMeta::new(config);
    extra.prepare(&registry);
    (registry, extra)
}

#[test]
fn test_prepare_stores_classes_and_views() {
    let (_, extra) = prepared(MetagridConfig::default());
    assert_eq!(extra.len(), 4);
    assert!(extra.data("order").is_some());
    assert!(extra.data("list.order").is_some());
    assert!(extra.data("customer").is_some());
    assert!(extra.data("image").is_some());
    assert!(extra.data("missing").is_none());
}

#[test]
fn test_key_column_added_when_key_not_listed() {
    let (_, extra) = prepared(MetagridConfig::default());

    let order = extra.data("order").unwrap();
    assert_eq!(order.columns[0].name, "_id");
    assert!(order.columns[0].hidden);
    assert_eq!(order.columns.len(), 5);

    let customer = extra.data("customer").unwrap();
    assert_eq!(customer.columns[0].name, "code");
    assert_eq!(customer.columns.len(), 2);
}

#[test]
fn test_grid_column_lookup_and_relation_format() {
    let (_, extra) = prepared(MetagridConfig::default());
    let order = extra.data("order").unwrap();

    let number = order.column("number").unwrap();
    assert!(number.searchable);
    assert_eq!(number.grouping, Some(true));
    assert_eq!(number.title_name.as_deref(), Some("number_title"));

    let customer = order.column("customer").unwrap();
    assert_eq!(
        customer.format,
        Some(json!({"name": "link", "url": "model/update?c=customer"}))
    );

    let photo = order.column("photo").unwrap();
    assert_eq!(photo.format, Some(json!({"name": "link"})));
}

#[test]
fn test_view_commands_and_sort_names() {
    let (_, extra) = prepared(MetagridConfig::default());

    let order = extra.data("order").unwrap();
    assert!(order.commands.create && order.commands.edit && order.commands.delete);
    assert_eq!(order.modal_sort_names, vec!["position".to_string()]);

    let list = extra.data("list.order").unwrap();
    assert!(!list.commands.delete);
    assert!(list.commands.create);
    // read-only in the view
    assert!(list.modal_sort_names.is_empty());
}

#[test]
fn test_views_share_class_filter_columns() {
    let (_, extra) = prepared(MetagridConfig::default());
    let order = extra.data("order").unwrap();
    let list = extra.data("list.order").unwrap();
    assert_eq!(order.filter_columns, list.filter_columns);
    assert_eq!(order.filter_columns.len(), 1);
    assert_eq!(order.filter_columns[0].name(), "number");
}

#[test]
fn test_file_data_urls() {
    let (_, extra) = prepared(MetagridConfig::default());
    let file = extra.data("image").unwrap().file.as_ref().unwrap();
    assert!(file.image_only);
    assert_eq!(file.max_size, Some(1024));
    assert_eq!(file.extensions, vec!["png", "jpg"]);
    assert_eq!(file.download, "api/base/file/download?v=image");
    assert_eq!(file.thumbnail, "api/base/file/thumbnail?v=image");
    assert_eq!(file.upload, "api/base/file/upload?v=image");
    assert_eq!(file.delete, "file/delete");

    assert!(extra.data("order").unwrap().file.is_none());
}

#[test]
fn test_thumbnails_disabled_use_download_url() {
    let mut config = MetagridConfig::default();
    config.extra_meta.thumbnails_enabled = false;
    let (_, extra) = prepared(config);
    let file = extra.data("image").unwrap().file.as_ref().unwrap();
    assert_eq!(file.thumbnail, file.download);
}

#[test]
fn test_relation_thumbnail() {
    let (registry, extra) = prepared(MetagridConfig::default());
    let order = registry.class("order").unwrap();

    let photo = order.attr("photo").unwrap();
    assert_eq!(
        extra.relation_thumbnail(&registry, photo, &json!("a1")),
        json!({
            "id": "a1",
            "thumbnail": "api/base/file/thumbnail?v=image&id=a1&s=small",
            "name": "a1"
        })
    );
    assert_eq!(
        extra.relation_thumbnail(&registry, photo, &Value::Null),
        Value::Null
    );

    // target without a file behavior
    let customer = order.attr("customer").unwrap();
    assert_eq!(
        extra.relation_thumbnail(&registry, customer, &json!("c7")),
        json!("c7")
    );
}

#[test]
fn test_model_file_data_links() {
    let (registry, extra) = prepared(MetagridConfig::default());
    let image = registry.class("image").unwrap();
    let file = StoredFile {
        id: "f9",
        name: Some("scan.png"),
        size: Some(2048),
        is_image: true,
    };

    let data = extra.model_file_data(None, image, &file, Some("small")).unwrap();
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        json!({
            "id": "f9",
            "name": "scan.png",
            "download": "api/base/file/download?v=image&id=f9",
            "size": 2048,
            "thumbnail": "api/base/file/thumbnail?v=image&id=f9&s=small"
        })
    );

    let data = extra.model_file_data(None, image, &file, None).unwrap();
    assert_eq!(
        data.thumbnail.as_deref(),
        Some("api/base/file/thumbnail?v=image&id=f9")
    );
}

#[test]
fn test_model_file_data_without_image_or_name() {
    let (registry, extra) = prepared(MetagridConfig::default());
    let image = registry.class("image").unwrap();
    let file = StoredFile {
        id: "f3",
        ..StoredFile::default()
    };

    let data = extra.model_file_data(None, image, &file, Some("small")).unwrap();
    assert_eq!(data.name, "f3");
    assert_eq!(data.thumbnail, None);
    assert_eq!(data.size, None);
    assert_eq!(data.download, "api/base/file/download?v=image&id=f3");
}

#[test]
fn test_model_file_data_needs_id_and_file_behavior() {
    let (registry, extra) = prepared(MetagridConfig::default());
    let image = registry.class("image").unwrap();
    let unsaved = StoredFile {
        is_image: true,
        ..StoredFile::default()
    };
    assert!(extra.model_file_data(None, image, &unsaved, None).is_none());

    let customer = registry.class("customer").unwrap();
    let file = StoredFile {
        id: "c1",
        ..StoredFile::default()
    };
    assert!(extra.model_file_data(None, customer, &file, None).is_none());
}

#[test]
fn test_model_data_falls_back_to_class() {
    let (registry, extra) = prepared(MetagridConfig::default());
    let order = registry.class("order").unwrap();

    let view_data = extra.model_data(Some("list.order"), order).unwrap();
    assert!(!view_data.commands.delete);

    let class_data = extra.model_data(Some("ghost.order"), order).unwrap();
    assert!(class_data.commands.delete);
    assert!(extra.model_data(None, order).is_some());
}

#[test]
fn test_page_title_and_description() {
    let (registry, extra) = prepared(MetagridConfig::default());
    let order = registry.class("order").unwrap();
    let list = order.view("list");
    assert_eq!(extra.page_title(order, list), "Order");
    assert_eq!(extra.page_description(order, list), Some("Sales orders"));

    let customer = registry.class("customer").unwrap();
    assert_eq!(extra.page_title(customer, None), "customer");
    assert_eq!(extra.page_description(customer, None), None);
}

#[test]
fn test_class_with_missing_file_attr_is_skipped() {
    let registry = registry(json!({"classes": [
        {"name": "broken", "behaviors": [{"type": "file", "attr": "ghost"}],
         "views": [{"name": "list"}]},
        {"name": "fine"}
    ]}));
    let mut extra = ExtraMeta::new(MetagridConfig::default());
    extra.prepare(&registry);

    assert!(extra.data("broken").is_none());
    assert!(extra.data("list.broken").is_none());
    assert!(extra.data("fine").is_some());
}

#[test]
fn test_view_data_serializes_camel_case() {
    let (_, extra) = prepared(MetagridConfig::default());
    let value = serde_json::to_value(extra.data("list.order").unwrap()).unwrap();
    assert!(value.get("filterColumns").is_some());
    assert!(value.get("modalSortNames").is_some());
    assert_eq!(value["commands"], json!({"create": true, "edit": true, "delete": false}));
    assert_eq!(value["file"], Value::Null);
}
