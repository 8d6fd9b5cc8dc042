//! Depth-first search over a tag tree
//!
//! Two kinds of search walk the tree from a start node, expanding as they go:
//! [`NameValueQuery`] matches tag nodes by substrings of their name and displayed
//! value, and [`SearchRule`] matches compounds by the entries they hold. Containers
//! the walk expanded are collapsed again unless they hold a match or unsaved edits.

use tracing::debug;

use crate::error::EditError;
use crate::node::{NodeData, NodeId, TagTree};
use crate::tag::{Tag, TagCompound};

/// Substring match on a node's name and displayed value. An unset field matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValueQuery {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl NameValueQuery {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn matches(&self, tree: &TagTree, id: NodeId) -> bool {
        if tree.tag(id).is_none() {
            return false;
        }
        let name_ok = match &self.name {
            Some(wanted) => tree.name(id).is_some_and(|name| name.contains(wanted.as_str())),
            None => true,
        };
        let value_ok = match &self.value {
            Some(wanted) => tree.summary(id).contains(wanted.as_str()),
            None => true,
        };
        name_ok && value_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Any,
}

impl NumericOp {
    fn test<T: PartialOrd>(self, actual: T, expected: T) -> bool {
        match self {
            NumericOp::Equals => actual == expected,
            NumericOp::NotEquals => actual != expected,
            NumericOp::GreaterThan => actual > expected,
            NumericOp::LessThan => actual < expected,
            NumericOp::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Any,
}

impl TextOp {
    fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            TextOp::Equals => actual == expected,
            TextOp::NotEquals => actual != expected,
            TextOp::Contains => actual.contains(expected),
            TextOp::NotContains => !actual.contains(expected),
            TextOp::StartsWith => actual.starts_with(expected),
            TextOp::EndsWith => actual.ends_with(expected),
            TextOp::Any => true,
        }
    }
}

/// A predicate over the named entries of a compound
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRule {
    /// A byte, short, int or long entry compared as a 64-bit integer.
    Integral { name: String, op: NumericOp, value: i64 },
    /// A float or double entry compared as a double.
    Float { name: String, op: NumericOp, value: f64 },
    Text { name: String, op: TextOp, value: String },
    /// Any scalar entry; `value` is parsed as the entry's own type.
    Wildcard { name: String, negate: bool, value: Option<String> },
    AnyOf(Vec<SearchRule>),
    AllOf(Vec<SearchRule>),
}

impl SearchRule {
    /// Test `compound`, recording the names of the entries that satisfied a rule.
    pub fn matches(&self, compound: &TagCompound, matched: &mut Vec<String>) -> bool {
        let hit = match self {
            SearchRule::AnyOf(rules) => return rules.iter().any(|rule| rule.matches(compound, matched)),
            SearchRule::AllOf(rules) => return rules.iter().all(|rule| rule.matches(compound, matched)),
            SearchRule::Integral { name, op, value } => entry(compound, name)
                .and_then(|tag| integral(&tag))
                .is_some_and(|actual| op.test(actual, *value)),
            SearchRule::Float { name, op, value } => entry(compound, name)
                .and_then(|tag| floating(&tag))
                .is_some_and(|actual| op.test(actual, *value)),
            SearchRule::Text { name, op, value } => entry(compound, name)
                .is_some_and(|tag| matches!(&tag, Tag::String(actual) if op.test(actual, value))),
            SearchRule::Wildcard { name, negate, value } => match (entry(compound, name), value) {
                (None, _) => false,
                (Some(tag), None) => tag.kind().is_scalar(),
                (Some(tag), Some(value)) => wildcard_equals(&tag, value).is_some_and(|eq| eq != *negate),
            },
        };

        if hit {
            let name = self.entry_name().unwrap_or_default();
            if !matched.iter().any(|seen| seen == name) {
                matched.push(name.to_string());
            }
        }
        hit
    }

    fn entry_name(&self) -> Option<&str> {
        match self {
            SearchRule::Integral { name, .. }
            | SearchRule::Float { name, .. }
            | SearchRule::Text { name, .. }
            | SearchRule::Wildcard { name, .. } => Some(name),
            SearchRule::AnyOf(_) | SearchRule::AllOf(_) => None,
        }
    }
}

fn entry(compound: &TagCompound, name: &str) -> Option<Tag> {
    compound.get(name).map(|tag| tag.borrow().deep_copy())
}

fn integral(tag: &Tag) -> Option<i64> {
    match tag {
        Tag::Byte(v) => Some(i64::from(*v as i8)),
        Tag::Short(v) => Some(i64::from(*v)),
        Tag::Int(v) => Some(i64::from(*v)),
        Tag::Long(v) => Some(*v),
        _ => None,
    }
}

fn floating(tag: &Tag) -> Option<f64> {
    match tag {
        Tag::Float(v) => Some(f64::from(*v)),
        Tag::Double(v) => Some(*v),
        _ => None,
    }
}

/// Equality of a scalar entry with text parsed as the entry's type; `None` when
/// the entry is not scalar or the text does not parse.
fn wildcard_equals(tag: &Tag, text: &str) -> Option<bool> {
    if let Some(actual) = integral(tag) {
        return text.trim().parse::<i64>().ok().map(|expected| actual == expected);
    }
    if let Some(actual) = floating(tag) {
        return text.trim().parse::<f64>().ok().map(|expected| actual == expected);
    }
    match tag {
        Tag::String(actual) => Some(actual == text),
        _ => None,
    }
}

impl TagTree {
    /// Tag nodes under `start` whose name and value satisfy `query`, in tree order.
    pub fn find(&mut self, start: NodeId, query: &NameValueQuery) -> Result<Vec<NodeId>, EditError> {
        let mut found = Vec::new();
        self.search_from(start, &mut |tree: &TagTree, id: NodeId| query.matches(tree, id), &mut found)?;
        debug!(matches = found.len(), "Name/value search finished");
        Ok(found)
    }

    /// Compounds (including document roots) under `start` whose entries satisfy
    /// `rule`. Each match comes with the entry names that satisfied it.
    pub fn find_compounds(
        &mut self,
        start: NodeId,
        rule: &SearchRule,
    ) -> Result<Vec<(NodeId, Vec<String>)>, EditError> {
        let mut hits = Vec::new();
        let mut found = Vec::new();
        self.search_from(
            start,
            &mut |tree: &TagTree, id: NodeId| {
                let is_compound = matches!(
                    tree.node(id).map(|node| node.data()),
                    Some(NodeData::Compound(_)) | Some(NodeData::Document(_))
                );
                let Some(tag) = tree.tag(id).filter(|_| is_compound) else {
                    return false;
                };
                let tag = tag.borrow();
                let Some(compound) = tag.as_compound() else {
                    return false;
                };
                let mut matched = Vec::new();
                if rule.matches(compound, &mut matched) {
                    hits.push((id, matched));
                    true
                } else {
                    false
                }
            },
            &mut found,
        )?;
        debug!(matches = hits.len(), "Rule search finished");
        Ok(hits)
    }

    fn search_from(
        &mut self,
        id: NodeId,
        test: &mut dyn FnMut(&TagTree, NodeId) -> bool,
        found: &mut Vec<NodeId>,
    ) -> Result<(), EditError> {
        let expanded_here = !self.is_expanded(id);
        let before = found.len();

        self.expand(id)?;
        if test(self, id) {
            found.push(id);
        }
        let children = self.children(id)?;
        for child in children.iter() {
            self.search_from(*child, test, found)?;
        }

        if expanded_here && found.len() == before && self.has_children(id) {
            self.collapse(id)?;
        }
        Ok(())
    }
}
