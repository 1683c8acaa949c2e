//! Prepared grid metadata for every class and view.
//!
//! [`ExtraMeta::prepare`] walks the registry once and stores, per class id
//! and per view id, everything a list page needs: grid columns, filter
//! columns, sortable attributes, file upload settings, and commands. Views
//! share the filter columns of their class.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::config::MetagridConfig;
use crate::error::{Error, Result};
use crate::filter::{FilterColumn, FilterSchemaDeriver};
use crate::grid::{grid_columns, GridColumn};
use crate::meta::{FilterSource, MetaAttr, MetaClass, MetaRegistry, MetaSource, MetaView};

/// Grid commands available on a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ViewCommands {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Default for ViewCommands {
    fn default() -> Self {
        Self {
            create: true,
            edit: true,
            delete: true,
        }
    }
}

impl ViewCommands {
    fn for_source(source: MetaSource<'_>) -> Self {
        let mut commands = Self::default();
        if let Some(overrides) = source.options().map(|options| &options.commands) {
            commands.create = overrides.create.unwrap_or(commands.create);
            commands.edit = overrides.edit.unwrap_or(commands.edit);
            commands.delete = overrides.delete.unwrap_or(commands.delete);
        }
        commands
    }
}

/// Upload and download settings of a class with a file behavior.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileAttrData {
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
    pub delete: String,
    pub upload: String,
    pub download: String,
    /// Thumbnail endpoint, or the download endpoint when the storage makes no
    /// thumbnails.
    pub thumbnail: String,
}

/// A stored file object, as read from a model of a file class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredFile<'a> {
    pub id: &'a str,
    /// Original file name, if the model keeps one.
    pub name: Option<&'a str>,
    pub size: Option<u64>,
    pub is_image: bool,
}

/// Download and thumbnail links of one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ModelFileData {
    pub id: String,
    pub name: String,
    pub download: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Prepared metadata of one class or view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMetaData {
    pub columns: Vec<GridColumn>,
    pub filter_columns: Vec<FilterColumn>,
    pub modal_sort_names: Vec<String>,
    pub file: Option<FileAttrData>,
    pub commands: ViewCommands,
}

impl ViewMetaData {
    /// Grid column by name.
    pub fn column(&self, name: &str) -> Option<&GridColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Prepared metadata store, keyed by class id and view id.
#[derive(Debug, Clone, Default)]
pub struct ExtraMeta {
    config: MetagridConfig,
    data: HashMap<String, ViewMetaData>,
}

impl ExtraMeta {
    pub fn new(config: MetagridConfig) -> Self {
        Self {
            config,
            data: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MetagridConfig {
        &self.config
    }

    /// Rebuild the store from a registry.
    ///
    /// A class whose metadata cannot be prepared is logged and left out
    /// together with its views; the rest of the registry is still prepared.
    pub fn prepare(&mut self, registry: &MetaRegistry) {
        self.data.clear();
        for class in registry.classes() {
            if let Err(err) = self.prepare_class(registry, class) {
                error!(
                    subsystem = "extra_meta",
                    class = %class.name,
                    error = %err,
                    "Failed to prepare class metadata, skipping"
                );
            }
        }
        info!(
            subsystem = "extra_meta",
            entry_count = self.data.len(),
            "Extra metadata prepared"
        );
    }

    fn prepare_class(&mut self, registry: &MetaRegistry, class: &MetaClass) -> Result<()> {
        let deriver = FilterSchemaDeriver::new(registry, &self.config.filter);
        let filter_columns = deriver.derive_columns(class, None);

        let mut entries = Vec::with_capacity(class.views.len() + 1);
        entries.push((
            class.name.clone(),
            self.view_data(MetaSource::Class(class), class, filter_columns.clone())?,
        ));
        for view in &class.views {
            entries.push((
                view.id.clone(),
                self.view_data(MetaSource::View(view), class, filter_columns.clone())?,
            ));
        }
        self.data.extend(entries);
        Ok(())
    }

    fn view_data(
        &self,
        source: MetaSource<'_>,
        class: &MetaClass,
        filter_columns: Vec<FilterColumn>,
    ) -> Result<ViewMetaData> {
        Ok(ViewMetaData {
            columns: grid_columns(&source, class, &self.config.extra_meta),
            filter_columns,
            modal_sort_names: modal_sort_names(&source, class),
            file: self.file_attr_data(source, class)?,
            commands: ViewCommands::for_source(source),
        })
    }

    /// Prepared data of a class name or view id.
    pub fn data(&self, id: &str) -> Option<&ViewMetaData> {
        self.data.get(id)
    }

    /// Data of the view a model is shown in, falling back to its class.
    pub fn model_data(&self, view_id: Option<&str>, class: &MetaClass) -> Option<&ViewMetaData> {
        view_id
            .and_then(|id| self.data(id))
            .or_else(|| self.data(&class.name))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Page title: the class label, then the view label, then the class name.
    pub fn page_title<'a>(&self, class: &'a MetaClass, view: Option<&'a MetaView>) -> &'a str {
        class
            .label
            .as_deref()
            .or_else(|| view.and_then(|view| view.label.as_deref()))
            .unwrap_or(&class.name)
    }

    pub fn page_description<'a>(
        &self,
        class: &'a MetaClass,
        view: Option<&'a MetaView>,
    ) -> Option<&'a str> {
        class
            .description
            .as_deref()
            .or_else(|| view.and_then(|view| view.description.as_deref()))
    }

    fn file_attr_data(
        &self,
        source: MetaSource<'_>,
        class: &MetaClass,
    ) -> Result<Option<FileAttrData>> {
        let Some(behavior) = class.file_behavior() else {
            return Ok(None);
        };
        if source.attr(&behavior.attr).is_none() && !class.has_attr(&behavior.attr) {
            return Err(Error::UnknownFileAttribute {
                class: class.name.clone(),
                attr: behavior.attr.clone(),
            });
        }

        let urls = &self.config.extra_meta;
        let param = format!("v={}", source.source_id());
        let download = format!("{}?{}", urls.download_url, param);
        let thumbnail = if urls.thumbnails_enabled {
            format!("{}?{}", urls.thumbnail_url, param)
        } else {
            download.clone()
        };

        Ok(Some(FileAttrData {
            image_only: behavior.image_only,
            max_size: behavior.max_size,
            min_size: behavior.min_size,
            extensions: behavior.extensions.clone(),
            mime_types: behavior.mime_types.clone(),
            accept: behavior.accept.clone(),
            name_attr: behavior.name_attr.clone(),
            delete: urls.delete_url.clone(),
            upload: format!("{}?{}", urls.upload_url, param),
            download,
            thumbnail,
        }))
    }

    /// Thumbnail record of a stored relation value.
    ///
    /// Empty values, unresolved targets and targets without file data are
    /// returned unchanged.
    pub fn relation_thumbnail(
        &self,
        registry: &MetaRegistry,
        attr: &MetaAttr,
        value: &Value,
    ) -> Value {
        if is_empty_value(value) {
            return value.clone();
        }
        let Some(file) = registry
            .ref_class(attr)
            .and_then(|target| self.data(&target.name))
            .and_then(|data| data.file.as_ref())
        else {
            return value.clone();
        };

        let id = match value {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        let mut thumbnail = format!("{}&id={}", file.thumbnail, id);
        if let Some(size) = &attr.options.thumbnail {
            thumbnail.push_str("&s=");
            thumbnail.push_str(size);
        }
        json!({
            "id": id,
            "thumbnail": thumbnail,
            "name": id,
        })
    }

    /// Links of a stored file shown in `view_id` (or its class).
    ///
    /// `None` when the file has no id or the class has no file behavior.
    /// The thumbnail is only given for images, with `&s=<size>` appended
    /// when a size is requested.
    pub fn model_file_data(
        &self,
        view_id: Option<&str>,
        class: &MetaClass,
        file: &StoredFile<'_>,
        thumbnail_size: Option<&str>,
    ) -> Option<ModelFileData> {
        if file.id.is_empty() {
            return None;
        }
        let data = self.model_data(view_id, class)?.file.as_ref()?;
        let thumbnail = (file.is_image && !data.thumbnail.is_empty()).then(|| {
            let mut url = format!("{}&id={}", data.thumbnail, file.id);
            if let Some(size) = thumbnail_size {
                url.push_str("&s=");
                url.push_str(size);
            }
            url
        });
        Some(ModelFileData {
            id: file.id.to_string(),
            name: file
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or(file.id)
                .to_string(),
            download: format!("{}&id={}", data.download, file.id),
            size: file.size,
            thumbnail,
        })
    }
}

/// Sortable, writable attributes kept in order by a sort-order behavior.
fn modal_sort_names<S>(source: &S, class: &MetaClass) -> Vec<String>
where
    S: FilterSource + ?Sized,
{
    let names = class.sort_order_attrs();
    source
        .attrs()
        .iter()
        .filter(|attr| attr.sortable && !attr.read_only && names.contains(&attr.name.as_str()))
        .map(|attr| attr.name.clone())
        .collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}
