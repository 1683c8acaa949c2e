//! Attribute classification for filter columns.

use crate::meta::MetaAttr;

/// How an attribute is presented in the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Reference to objects of another class; may expand into nested columns.
    Relation,
    /// Fixed list of declared values.
    Enum,
    /// One of the owning class's workflow states.
    State,
    /// Name of a metadata class.
    ClassRef,
    /// Embedded model such as a user reference.
    EmbeddedModel,
    /// Scalar value.
    Plain,
}

impl FilterKind {
    /// Classify an attribute. The first matching predicate wins:
    /// relation, enum, state, class, embedded model, plain.
    pub fn classify(attr: &MetaAttr) -> Self {
        if attr.relation.is_some() {
            Self::Relation
        } else if attr.is_enum() {
            Self::Enum
        } else if attr.is_state() {
            Self::State
        } else if attr.is_class() {
            Self::ClassRef
        } else if attr.is_embedded_model() {
            Self::EmbeddedModel
        } else {
            Self::Plain
        }
    }
}
