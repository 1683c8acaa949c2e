//! In-memory metadata graph.
//!
//! [`MetaRegistry`] is built once from a [`MetaDocument`] and is read-only
//! afterwards, so it can be shared between threads and queried by any number
//! of concurrent derivations.
//!
//! # Resolution rules
//!
//! - A child class starts with its parent's attributes in the parent's order;
//!   an own attribute with the same name replaces the inherited one in place,
//!   other own attributes are appended.
//! - Behaviors are inherited the same way (parent first). States,
//!   transitions and views are not inherited.
//! - Relation targets that name no known class are kept unresolved; schema
//!   derivation then treats the relation as not expandable.

mod attr;
mod class;
mod document;

pub use attr::{AttrOptions, AttrType, EnumItem, MetaAttr, Relation, ViewType};
pub use class::{FilterSource, MetaClass, MetaSource, MetaState, MetaTransition, MetaView};
pub use document::{
    AttrCommands, AttrDef, BehaviorDef, ClassDef, CommandOverrides, FileBehaviorDef, MetaDocument,
    StateDef, TransitionDef, ViewAttrDef, ViewDef, ViewOptions,
};

#[cfg(test)]
pub(crate) use attr::test_attr;

use std::collections::HashMap;
use tracing::{info, warn};

use crate::defaults;
use crate::error::{Error, Result};

/// Index of a class inside its [`MetaRegistry`].
///
/// Ids are only meaningful for the registry that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

/// The resolved metadata graph.
#[derive(Debug, Clone, Default)]
pub struct MetaRegistry {
    classes: Vec<MetaClass>,
    by_name: HashMap<String, ClassId>,
}

impl MetaRegistry {
    /// Resolve and validate a document.
    pub fn from_document(doc: &MetaDocument) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(doc.classes.len());
        for (index, def) in doc.classes.iter().enumerate() {
            if by_name.insert(def.name.clone(), ClassId(index)).is_some() {
                return Err(Error::DuplicateClass(def.name.clone()));
            }
        }

        let mut parents = Vec::with_capacity(doc.classes.len());
        for def in &doc.classes {
            let parent = match &def.parent {
                Some(parent) => Some(*by_name.get(parent).ok_or_else(|| Error::UnknownParent {
                    class: def.name.clone(),
                    parent: parent.clone(),
                })?),
                None => None,
            };
            parents.push(parent);
        }

        let order = inheritance_order(doc, &parents)?;

        let mut resolved_attrs: Vec<Vec<AttrDef>> = vec![Vec::new(); doc.classes.len()];
        let mut resolved_behaviors: Vec<Vec<BehaviorDef>> = vec![Vec::new(); doc.classes.len()];
        for &id in &order {
            let def = &doc.classes[id.0];
            let (mut attrs, mut behaviors) = match parents[id.0] {
                Some(parent) => (
                    resolved_attrs[parent.0].clone(),
                    resolved_behaviors[parent.0].clone(),
                ),
                None => (Vec::new(), Vec::new()),
            };
            merge_attrs(def, &mut attrs)?;
            behaviors.extend(def.behaviors.iter().cloned());
            resolved_attrs[id.0] = attrs;
            resolved_behaviors[id.0] = behaviors;
        }

        let mut classes = Vec::with_capacity(doc.classes.len());
        for (index, def) in doc.classes.iter().enumerate() {
            let id = ClassId(index);
            let translation_key = format!("class.{}", def.name);
            let attrs = resolved_attrs[index]
                .iter()
                .map(|attr_def| {
                    build_attr(
                        attr_def,
                        id,
                        &def.name,
                        &translation_key,
                        &by_name,
                    )
                })
                .collect::<Vec<_>>();
            let views = build_views(def, id, &attrs, &translation_key)?;
            classes.push(MetaClass {
                id,
                name: def.name.clone(),
                label: def.label.clone(),
                description: def.description.clone(),
                parent: parents[index],
                children: Vec::new(),
                is_abstract: def.is_abstract,
                key: def
                    .key
                    .clone()
                    .unwrap_or_else(|| defaults::CLASS_KEY.to_string()),
                attrs,
                states: def
                    .states
                    .iter()
                    .map(|state| MetaState {
                        name: state.name.clone(),
                        title: state.label.clone().unwrap_or_else(|| state.name.clone()),
                    })
                    .collect(),
                transitions: def
                    .transitions
                    .iter()
                    .map(|transition| MetaTransition {
                        name: transition.name.clone(),
                        title: transition
                            .label
                            .clone()
                            .unwrap_or_else(|| transition.name.clone()),
                        from: transition.from.clone(),
                        to: transition.to.clone(),
                    })
                    .collect(),
                views,
                behaviors: std::mem::take(&mut resolved_behaviors[index]),
                translation_key,
            });
        }

        for index in 0..classes.len() {
            if let Some(parent) = classes[index].parent {
                classes[parent.0].children.push(ClassId(index));
            }
        }

        info!(
            subsystem = "meta",
            op = "from_document",
            class_count = classes.len(),
            "Metadata registry built"
        );

        Ok(Self { classes, by_name })
    }

    /// Classes in declaration order.
    pub fn classes(&self) -> &[MetaClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class by id. Panics on an id from another registry.
    pub fn get(&self, id: ClassId) -> &MetaClass {
        &self.classes[id.0]
    }

    pub fn class(&self, name: &str) -> Option<&MetaClass> {
        self.by_name.get(name).map(|id| self.get(*id))
    }

    /// Relation target, when it resolved.
    pub fn ref_class(&self, attr: &MetaAttr) -> Option<&MetaClass> {
        attr.relation
            .as_ref()
            .and_then(|relation| relation.ref_class)
            .map(|id| self.get(id))
    }

    /// All descendants, depth first, children in declaration order.
    pub fn descendants(&self, id: ClassId) -> Vec<ClassId> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    /// Descendants that are not abstract.
    pub fn active_descendants(&self, id: ClassId) -> Vec<ClassId> {
        self.descendants(id)
            .into_iter()
            .filter(|child| !self.get(*child).is_abstract)
            .collect()
    }

    fn collect_descendants(&self, id: ClassId, result: &mut Vec<ClassId>) {
        for &child in &self.get(id).children {
            result.push(child);
            self.collect_descendants(child, result);
        }
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        let mut result = Vec::new();
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            result.push(parent);
            current = self.get(parent).parent;
        }
        result
    }

    // ─── Request lookups ───────────────────────────────────────────────────

    /// Class by name, or `ClassNotFound`.
    pub fn find_class(&self, name: &str) -> Result<&MetaClass> {
        self.class(name)
            .ok_or_else(|| Error::ClassNotFound(name.to_string()))
    }

    /// Resolve a requested view.
    ///
    /// Without a name, the `default` view is used when it exists, otherwise the
    /// class itself. A named view that does not exist is an error.
    pub fn view_or_class<'a>(
        &self,
        class: &'a MetaClass,
        name: Option<&str>,
        default: Option<&str>,
    ) -> Result<MetaSource<'a>> {
        match name.filter(|name| !name.is_empty()) {
            Some(name) => class
                .view(name)
                .map(MetaSource::View)
                .ok_or_else(|| Error::ViewNotFound(format!("{}.{}", name, class.name))),
            None => Ok(default
                .and_then(|default| class.view(default))
                .map(MetaSource::View)
                .unwrap_or(MetaSource::Class(class))),
        }
    }

    /// Resolve an attribute from an `attr.view.class` path.
    ///
    /// An empty view segment addresses the class attribute. Segments after
    /// the class name are ignored.
    pub fn attr_by_path(&self, path: &str) -> Result<&MetaAttr> {
        let mut parts = path.split('.');
        let attr_name = parts.next().unwrap_or_default();
        let view_name = parts.next().unwrap_or_default();
        let class_name = parts.next().unwrap_or_default();

        let class = self.find_class(class_name)?;
        let source = self.view_or_class(class, Some(view_name), None)?;
        source.attr(attr_name).ok_or_else(|| {
            Error::AttributeNotFound(format!("{}.{}", attr_name, source.source_id()))
        })
    }
}

/// Classes ordered so every parent precedes its children.
fn inheritance_order(doc: &MetaDocument, parents: &[Option<ClassId>]) -> Result<Vec<ClassId>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Visiting,
        Done,
    }

    let mut marks = vec![Mark::New; parents.len()];
    let mut order = Vec::with_capacity(parents.len());

    for start in 0..parents.len() {
        let mut chain = Vec::new();
        let mut current = Some(ClassId(start));
        while let Some(id) = current {
            match marks[id.0] {
                Mark::Done => break,
                Mark::Visiting => {
                    return Err(Error::InheritanceCycle(doc.classes[id.0].name.clone()))
                }
                Mark::New => {
                    marks[id.0] = Mark::Visiting;
                    chain.push(id);
                    current = parents[id.0];
                }
            }
        }
        for id in chain.into_iter().rev() {
            marks[id.0] = Mark::Done;
            order.push(id);
        }
    }

    Ok(order)
}

fn merge_attrs(def: &ClassDef, attrs: &mut Vec<AttrDef>) -> Result<()> {
    let mut own = std::collections::HashSet::new();
    for attr in &def.attrs {
        if !own.insert(attr.name.as_str()) {
            return Err(Error::DuplicateAttribute {
                class: def.name.clone(),
                attr: attr.name.clone(),
            });
        }
        match attrs.iter_mut().find(|existing| existing.name == attr.name) {
            Some(existing) => *existing = attr.clone(),
            None => attrs.push(attr.clone()),
        }
    }
    Ok(())
}

fn build_attr(
    def: &AttrDef,
    class: ClassId,
    owner_id: &str,
    owner_key: &str,
    by_name: &HashMap<String, ClassId>,
) -> MetaAttr {
    let relation = match def.attr_type {
        AttrType::Ref | AttrType::Backref => {
            let name = def.ref_class.clone().unwrap_or_default();
            let ref_class = by_name.get(&name).copied();
            if ref_class.is_none() {
                warn!(
                    subsystem = "meta",
                    class = owner_id,
                    attr = %def.name,
                    ref_class = %name,
                    "Relation target not found, relation will not be expanded"
                );
            }
            Some(Relation {
                ref_class_name: name,
                ref_class,
                multiple: def.attr_type == AttrType::Backref,
            })
        }
        _ => None,
    };

    MetaAttr {
        name: def.name.clone(),
        title: def.label.clone().unwrap_or_else(|| def.name.clone()),
        attr_type: def.attr_type,
        view_type: def.view_type,
        format: def.format.clone(),
        utc: def.utc,
        searchable: def.searchable,
        common_searchable: def.common_searchable,
        sortable: def.sortable,
        hidden: def.hidden,
        read_only: def.read_only,
        escape: def.escape,
        search_depth: def
            .search_depth
            .unwrap_or(defaults::RELATION_SEARCH_DEPTH),
        enum_items: def.enum_items.clone(),
        relation,
        embedded_model: def.embedded_model.clone(),
        can_edit: def.commands.edit,
        options: def.options.clone(),
        class,
        id: format!("{}.{}", def.name, owner_id),
        translation_key: format!("{}.attr.{}", owner_key, def.name),
    }
}

fn build_views(
    def: &ClassDef,
    class: ClassId,
    class_attrs: &[MetaAttr],
    class_key: &str,
) -> Result<Vec<MetaView>> {
    let mut views: Vec<MetaView> = Vec::with_capacity(def.views.len());
    for view_def in &def.views {
        if views.iter().any(|view| view.name == view_def.name) {
            return Err(Error::DuplicateView {
                class: def.name.clone(),
                view: view_def.name.clone(),
            });
        }
        let id = format!("{}.{}", view_def.name, def.name);
        let translation_key = format!("{}.view.{}", class_key, view_def.name);

        let attrs = match &view_def.attrs {
            None => class_attrs
                .iter()
                .map(|attr| view_attr(attr, None, &id, &translation_key))
                .collect(),
            Some(list) => list
                .iter()
                .map(|item| {
                    class_attrs
                        .iter()
                        .find(|attr| attr.name == item.name)
                        .map(|attr| view_attr(attr, Some(item), &id, &translation_key))
                        .ok_or_else(|| Error::UnknownViewAttribute {
                            class: def.name.clone(),
                            view: view_def.name.clone(),
                            attr: item.name.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        views.push(MetaView {
            name: view_def.name.clone(),
            id,
            class,
            label: view_def.label.clone(),
            description: view_def.description.clone(),
            attrs,
            options: view_def.options.clone(),
            translation_key,
        });
    }
    Ok(views)
}

fn view_attr(
    base: &MetaAttr,
    overrides: Option<&ViewAttrDef>,
    view_id: &str,
    view_key: &str,
) -> MetaAttr {
    let mut attr = base.clone();
    attr.id = format!("{}.{}", base.name, view_id);
    attr.translation_key = format!("{}.attr.{}", view_key, base.name);
    let Some(item) = overrides else {
        return attr;
    };
    if let Some(label) = &item.label {
        attr.title = label.clone();
    }
    if let Some(format) = &item.format {
        attr.format = Some(format.clone());
    }
    if let Some(value) = item.searchable {
        attr.searchable = value;
    }
    if let Some(value) = item.common_searchable {
        attr.common_searchable = value;
    }
    if let Some(value) = item.sortable {
        attr.sortable = value;
    }
    if let Some(value) = item.hidden {
        attr.hidden = value;
    }
    if let Some(value) = item.read_only {
        attr.read_only = value;
    }
    if let Some(value) = item.search_depth {
        attr.search_depth = value;
    }
    if let Some(options) = &item.options {
        attr.options = options.clone();
    }
    attr
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry(value: serde_json::Value) -> Result<MetaRegistry> {
        let doc: MetaDocument = serde_json::from_value(value).unwrap();
        MetaRegistry::from_document(&doc)
    }

    fn hierarchy() -> MetaRegistry {
        registry(json!({
            "classes": [
                {"name": "document", "attrs": [
                    {"name": "title", "searchable": true},
                    {"name": "created", "type": "date"}
                ]},
                {"name": "invoice", "parent": "document", "attrs": [
                    {"name": "title", "label": "Invoice title", "searchable": true},
                    {"name": "total", "type": "float", "searchable": true}
                ]},
                {"name": "draftInvoice", "parent": "invoice", "abstract": true},
                {"name": "memo", "parent": "document"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_inherited_attrs_keep_parent_order_with_overrides() {
        let registry = hierarchy();
        let invoice = registry.class("invoice").unwrap();
        let names: Vec<_> = invoice.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["title", "created", "total"]);
        assert_eq!(invoice.attrs[0].title, "Invoice title");
        assert_eq!(invoice.attrs[0].class, invoice.id);
        assert_eq!(invoice.attrs[0].id, "title.invoice");
        assert_eq!(invoice.attrs[0].translation_key, "class.invoice.attr.title");
    }

    #[test]
    fn test_children_declared_after_parent_out_of_order() {
        let registry = registry(json!({
            "classes": [
                {"name": "child", "parent": "base", "attrs": [{"name": "extra"}]},
                {"name": "base", "attrs": [{"name": "common"}]}
            ]
        }))
        .unwrap();
        let child = registry.class("child").unwrap();
        assert_eq!(child.attrs.len(), 2);
        assert_eq!(child.attrs[0].name, "common");
    }

    #[test]
    fn test_descendant_traversal_order() {
        let registry = hierarchy();
        let document = registry.class("document").unwrap();
        let names: Vec<_> = registry
            .descendants(document.id)
            .into_iter()
            .map(|id| registry.get(id).name.as_str())
            .collect();
        assert_eq!(names, vec!["invoice", "draftInvoice", "memo"]);

        let active: Vec<_> = registry
            .active_descendants(document.id)
            .into_iter()
            .map(|id| registry.get(id).name.as_str())
            .collect();
        assert_eq!(active, vec!["invoice", "memo"]);
    }

    #[test]
    fn test_ancestors() {
        let registry = hierarchy();
        let draft = registry.class("draftInvoice").unwrap();
        let names: Vec<_> = registry
            .ancestors(draft.id)
            .into_iter()
            .map(|id| registry.get(id).name.as_str())
            .collect();
        assert_eq!(names, vec!["invoice", "document"]);
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let err = registry(json!({"classes": [{"name": "a"}, {"name": "a"}]})).unwrap_err();
        assert!(matches!(err, Error::DuplicateClass(name) if name == "a"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let err = registry(json!({"classes": [{"name": "a", "parent": "ghost"}]})).unwrap_err();
        assert!(matches!(err, Error::UnknownParent { .. }));
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let err = registry(json!({"classes": [
            {"name": "a", "parent": "b"},
            {"name": "b", "parent": "a"}
        ]}))
        .unwrap_err();
        assert!(matches!(err, Error::InheritanceCycle(_)));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = registry(json!({"classes": [
            {"name": "a", "attrs": [{"name": "x"}, {"name": "x"}]}
        ]}))
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateAttribute { .. }));
    }

    #[test]
    fn test_unresolved_relation_kept() {
        let registry = registry(json!({"classes": [
            {"name": "a", "attrs": [{"name": "link", "type": "ref", "refClass": "missing"}]}
        ]}))
        .unwrap();
        let attr = registry.class("a").unwrap().attr("link").unwrap();
        let relation = attr.relation.as_ref().unwrap();
        assert_eq!(relation.ref_class_name, "missing");
        assert!(relation.ref_class.is_none());
        assert!(registry.ref_class(attr).is_none());
    }

    #[test]
    fn test_view_attrs_and_overrides() {
        let registry = registry(json!({"classes": [
            {"name": "order", "attrs": [
                {"name": "number", "searchable": true},
                {"name": "note"}
            ], "views": [
                {"name": "list", "attrs": [{"name": "note", "label": "Remark", "searchable": true}]},
                {"name": "all"}
            ]}
        ]}))
        .unwrap();
        let order = registry.class("order").unwrap();
        let list = order.view("list").unwrap();
        assert_eq!(list.id, "list.order");
        assert_eq!(list.attrs.len(), 1);
        assert_eq!(list.attrs[0].title, "Remark");
        assert!(list.attrs[0].searchable);
        assert_eq!(list.attrs[0].id, "note.list.order");
        assert_eq!(
            list.attrs[0].translation_key,
            "class.order.view.list.attr.note"
        );
        assert_eq!(order.view("all").unwrap().attrs.len(), 2);
    }

    #[test]
    fn test_unknown_view_attr_rejected() {
        let err = registry(json!({"classes": [
            {"name": "order", "views": [{"name": "list", "attrs": [{"name": "ghost"}]}]}
        ]}))
        .unwrap_err();
        assert!(matches!(err, Error::UnknownViewAttribute { .. }));
    }

    #[test]
    fn test_view_or_class_resolution() {
        let registry = registry(json!({"classes": [
            {"name": "order", "views": [{"name": "list"}]}
        ]}))
        .unwrap();
        let order = registry.find_class("order").unwrap();

        let source = registry.view_or_class(order, None, None).unwrap();
        assert!(matches!(source, MetaSource::Class(_)));

        let source = registry.view_or_class(order, None, Some("list")).unwrap();
        assert!(matches!(source, MetaSource::View(view) if view.name == "list"));

        let source = registry.view_or_class(order, None, Some("ghost")).unwrap();
        assert!(matches!(source, MetaSource::Class(_)));

        let err = registry.view_or_class(order, Some("ghost"), None).unwrap_err();
        assert!(matches!(err, Error::ViewNotFound(id) if id == "ghost.order"));

        assert!(matches!(
            registry.find_class("nope"),
            Err(Error::ClassNotFound(_))
        ));
    }

    #[test]
    fn test_attr_by_path() {
        let registry = registry(json!({"classes": [
            {"name": "order", "attrs": [{"name": "number"}, {"name": "note"}],
             "views": [{"name": "list", "attrs": [{"name": "number"}]}]}
        ]}))
        .unwrap();

        assert_eq!(
            registry.attr_by_path("number.list.order").unwrap().id,
            "number.list.order"
        );
        assert_eq!(registry.attr_by_path("note..order").unwrap().id, "note.order");
        assert_eq!(
            registry.attr_by_path("number.list.order.extra").unwrap().id,
            "number.list.order"
        );

        let err = registry.attr_by_path("note.list.order").unwrap_err();
        assert!(matches!(err, Error::AttributeNotFound(msg) if msg == "note.list.order"));
    }

    #[test]
    fn test_states_and_transitions() {
        let registry = registry(json!({"classes": [
            {"name": "order",
             "states": [{"name": "draft", "label": "Draft"}, {"name": "sent"}],
             "transitions": [{"name": "send", "from": ["draft"], "to": "sent"}]}
        ]}))
        .unwrap();
        let order = registry.class("order").unwrap();
        assert_eq!(order.states[0].title, "Draft");
        assert_eq!(order.states[1].title, "sent");
        assert_eq!(order.transitions[0].to.as_deref(), Some("sent"));
        assert_eq!(order.key, "_id");
    }
}
