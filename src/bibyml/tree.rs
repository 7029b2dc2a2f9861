//! The bibyml tree
//!
//! A [BibYmlNode] is an ordered mapping from keys to child nodes, plus an optional inline value.
//! Insertion order is preserved, and is what the writer reproduces.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One node of a bibyml document
///
/// The root node of a parsed document never carries a value: only keys can have inline values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibYmlNode {
    value: Option<String>,
    children: Vec<(String, BibYmlNode)>,
}

impl BibYmlNode {
    /// Create an empty node (no value, no children)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a leaf node holding an inline value
    pub fn with_value(value: impl Into<String>) -> Self {
        BibYmlNode {
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// The inline value of this node, if any
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Insert a child under `key`
    ///
    /// An existing child with the same key is overwritten in place: it keeps its position but
    /// loses its value and children. Duplicate keys are not reported.
    pub fn insert(&mut self, key: impl Into<String>, node: BibYmlNode) -> &mut BibYmlNode {
        let key = key.into();
        let index = match self.children.iter().position(|(k, _)| *k == key) {
            Some(index) => {
                self.children[index].1 = node;
                index
            }
            None => {
                self.children.push((key, node));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    /// Builder-style insertion, convenient to write trees by hand
    pub fn child(mut self, key: impl Into<String>, node: BibYmlNode) -> Self {
        self.insert(key, node);
        self
    }

    pub fn get(&self, key: &str) -> Option<&BibYmlNode> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut BibYmlNode> {
        self.children
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    /// Follow a path of keys from this node
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&BibYmlNode> {
        path.iter()
            .try_fold(self, |node, key| node.get(key.as_ref()))
    }

    /// Mutable version of [BibYmlNode::get_path]
    pub fn get_path_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut BibYmlNode> {
        path.iter()
            .try_fold(self, |node, key| node.get_mut(key.as_ref()))
    }

    /// Inline value of the child `key`
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(BibYmlNode::value)
    }

    /// Children in insertion order
    pub fn children(&self) -> impl Iterator<Item = (&str, &BibYmlNode)> {
        self.children.iter().map(|(k, node)| (k.as_str(), node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(k, _)| k.as_str())
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Serializes the node the way the untyped representation looks: a bare string for a leaf with a
/// value, otherwise a map whose `""` entry holds the inline value.
impl Serialize for BibYmlNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let (Some(value), true) = (&self.value, self.children.is_empty()) {
            return serializer.serialize_str(value);
        }
        let len = self.children.len() + usize::from(self.value.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(value) = &self.value {
            map.serialize_entry("", value)?;
        }
        for (key, node) in &self.children {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}
