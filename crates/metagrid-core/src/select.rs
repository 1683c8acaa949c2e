//! Select-list helpers over metadata objects.
//!
//! Select lists show `label (name)` when an object has a label and the bare
//! name otherwise. The value of every item is the object name.

use regex::RegexBuilder;
use serde::Serialize;
use utoipa::ToSchema;

use crate::defaults;
use crate::error::Result;
use crate::filter::SelectItem;
use crate::meta::{
    FilterSource, MetaAttr, MetaClass, MetaRegistry, MetaSource, MetaState, MetaTransition,
    MetaView,
};

/// A named metadata object with an optional human label.
pub trait Labeled {
    fn name(&self) -> &str;

    fn label(&self) -> Option<&str>;

    /// Label when present, else the name.
    fn title(&self) -> &str {
        self.label().unwrap_or_else(|| self.name())
    }
}

impl Labeled for MetaClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Labeled for MetaView {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

// Attributes, states and transitions store the name as title when no label
// was declared.
impl Labeled for MetaAttr {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        (self.title != self.name).then_some(self.title.as_str())
    }
}

impl Labeled for MetaState {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        (self.title != self.name).then_some(self.title.as_str())
    }
}

impl Labeled for MetaTransition {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        (self.title != self.name).then_some(self.title.as_str())
    }
}

/// `label (name)`, or `name` when there is no label.
pub fn label_text<T: Labeled + ?Sized>(item: &T) -> String {
    match item.label() {
        Some(label) => format!("{} ({})", label, item.name()),
        None => item.name().to_string(),
    }
}

/// One `{value: name, text: label_text}` item per object.
pub fn label_items<'a, T, I>(items: I) -> Vec<SelectItem>
where
    T: Labeled + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(|item| SelectItem::new(item.name(), label_text(item)))
        .collect()
}

/// Keep the objects whose name or title contains `search`, ignoring case.
///
/// Search text shorter than [`defaults::SEARCH_MIN_LENGTH`] characters
/// filters nothing.
pub fn filter_by_search<'a, T: Labeled>(
    items: &'a [T],
    search: Option<&str>,
) -> Result<Vec<&'a T>> {
    let search = search.map(str::trim).unwrap_or_default();
    if search.chars().count() < defaults::SEARCH_MIN_LENGTH {
        return Ok(items.iter().collect());
    }
    let matcher = RegexBuilder::new(&regex::escape(search))
        .case_insensitive(true)
        .build()?;
    Ok(items
        .iter()
        .filter(|item| matcher.is_match(item.name()) || matcher.is_match(item.title()))
        .collect())
}

/// Select list entry enriched with a parent id, for views and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OwnedItem {
    pub id: String,
    pub value: String,
    pub text: String,
}

/// Class select list, optionally filtered by search text.
pub fn class_items(registry: &MetaRegistry, search: Option<&str>) -> Result<Vec<SelectItem>> {
    let classes = filter_by_search(registry.classes(), search)?;
    Ok(label_items(classes))
}

/// View select list of one class.
pub fn view_items(class: &MetaClass, search: Option<&str>) -> Result<Vec<OwnedItem>> {
    Ok(filter_by_search(&class.views, search)?
        .into_iter()
        .map(|view| OwnedItem {
            id: view.id.clone(),
            value: view.name.clone(),
            text: label_text(view),
        })
        .collect())
}

/// Attribute select list of a view, or of its class when no view was named.
pub fn attr_items(source: MetaSource<'_>, search: Option<&str>) -> Result<Vec<OwnedItem>> {
    Ok(filter_by_search(source.attrs(), search)?
        .into_iter()
        .map(|attr| OwnedItem {
            id: attr.id.clone(),
            value: attr.name.clone(),
            text: label_text(attr),
        })
        .collect())
}

pub fn state_items(class: &MetaClass, search: Option<&str>) -> Result<Vec<SelectItem>> {
    Ok(label_items(filter_by_search(&class.states, search)?))
}

pub fn transition_items(class: &MetaClass, search: Option<&str>) -> Result<Vec<SelectItem>> {
    Ok(label_items(filter_by_search(&class.transitions, search)?))
}
