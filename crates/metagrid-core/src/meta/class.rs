//! Resolved classes and views.

use super::attr::MetaAttr;
use super::document::{BehaviorDef, FileBehaviorDef, ViewOptions};
use super::ClassId;

/// A workflow state of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaState {
    pub name: String,
    pub title: String,
}

/// A workflow transition of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTransition {
    pub name: String,
    pub title: String,
    pub from: Vec<String>,
    pub to: Option<String>,
}

/// A resolved metadata class.
///
/// `attrs` already contains inherited attributes, parent first.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaClass {
    pub id: ClassId,
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub parent: Option<ClassId>,
    pub children: Vec<ClassId>,
    pub is_abstract: bool,
    pub key: String,
    pub attrs: Vec<MetaAttr>,
    pub states: Vec<MetaState>,
    pub transitions: Vec<MetaTransition>,
    pub views: Vec<MetaView>,
    pub behaviors: Vec<BehaviorDef>,
    pub translation_key: String,
}

impl MetaClass {
    /// Label, or the name when no label is declared.
    pub fn title(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&MetaAttr> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn view(&self, name: &str) -> Option<&MetaView> {
        self.views.iter().find(|view| view.name == name)
    }

    pub fn state(&self, name: &str) -> Option<&MetaState> {
        self.states.iter().find(|state| state.name == name)
    }

    /// Attribute names kept in order by a sort-order behavior.
    pub fn sort_order_attrs(&self) -> Vec<&str> {
        self.behaviors
            .iter()
            .filter_map(|behavior| match behavior {
                BehaviorDef::SortOrder { attr } => Some(attr.as_str()),
                BehaviorDef::File(_) => None,
            })
            .collect()
    }

    /// The last declared file behavior, so a child overrides its parent.
    pub fn file_behavior(&self) -> Option<&FileBehaviorDef> {
        self.behaviors.iter().rev().find_map(|behavior| match behavior {
            BehaviorDef::File(file) => Some(file),
            BehaviorDef::SortOrder { .. } => None,
        })
    }
}

/// A resolved view: a named projection of a class's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaView {
    pub name: String,
    /// `<view>.<class>`
    pub id: String,
    pub class: ClassId,
    pub label: Option<String>,
    pub description: Option<String>,
    pub attrs: Vec<MetaAttr>,
    pub options: ViewOptions,
    pub translation_key: String,
}

impl MetaView {
    pub fn title(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&MetaAttr> {
        self.attrs.iter().find(|attr| attr.name == name)
    }
}

/// Anything columns can be derived from: a class or one of its views.
pub trait FilterSource {
    /// Class or view id.
    fn source_id(&self) -> &str;

    /// The class the attributes belong to.
    fn class_id(&self) -> ClassId;

    /// All attributes in declaration order.
    fn attrs(&self) -> &[MetaAttr];

    /// Attributes flagged searchable, in declaration order.
    fn search_attrs(&self) -> Vec<&MetaAttr> {
        self.attrs().iter().filter(|attr| attr.searchable).collect()
    }

    fn has_search_attr(&self, name: &str) -> bool {
        self.attrs()
            .iter()
            .any(|attr| attr.searchable && attr.name == name)
    }
}

impl FilterSource for MetaClass {
    fn source_id(&self) -> &str {
        &self.name
    }

    fn class_id(&self) -> ClassId {
        self.id
    }

    fn attrs(&self) -> &[MetaAttr] {
        &self.attrs
    }
}

impl FilterSource for MetaView {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn class_id(&self) -> ClassId {
        self.class
    }

    fn attrs(&self) -> &[MetaAttr] {
        &self.attrs
    }
}

/// A class or a view, as resolved from request parameters.
#[derive(Debug, Clone, Copy)]
pub enum MetaSource<'a> {
    Class(&'a MetaClass),
    View(&'a MetaView),
}

impl<'a> MetaSource<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a MetaAttr> {
        match *self {
            Self::Class(class) => class.attr(name),
            Self::View(view) => view.attr(name),
        }
    }

    pub fn label(&self) -> Option<&'a str> {
        match *self {
            Self::Class(class) => class.label.as_deref(),
            Self::View(view) => view.label.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&'a str> {
        match *self {
            Self::Class(class) => class.description.as_deref(),
            Self::View(view) => view.description.as_deref(),
        }
    }

    pub fn translation_key(&self) -> &'a str {
        match *self {
            Self::Class(class) => &class.translation_key,
            Self::View(view) => &view.translation_key,
        }
    }

    /// View options; a bare class uses the defaults.
    pub fn options(&self) -> Option<&'a ViewOptions> {
        match *self {
            Self::Class(_) => None,
            Self::View(view) => Some(&view.options),
        }
    }
}

impl FilterSource for MetaSource<'_> {
    fn source_id(&self) -> &str {
        match *self {
            Self::Class(class) => class.source_id(),
            Self::View(view) => view.source_id(),
        }
    }

    fn class_id(&self) -> ClassId {
        match *self {
            Self::Class(class) => class.id,
            Self::View(view) => view.class,
        }
    }

    fn attrs(&self) -> &[MetaAttr] {
        match *self {
            Self::Class(class) => &class.attrs,
            Self::View(view) => &view.attrs,
        }
    }
}
