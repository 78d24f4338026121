//! Raw document tree
//!
//! The parser produces an untyped tree of maps, sequences and scalars. No
//! semantic interpretation happens at this level: unknown fields are kept,
//! key order is preserved, and every node and key carries its location.

use indexmap::IndexMap;

use crate::base::SourceLocation;

/// A node in the raw tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub value: RawValue,
    pub location: SourceLocation,
}

/// Value held by a raw node.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<RawNode>),
    Map(RawMap),
}

/// A map value together with the location of its key.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub key_location: SourceLocation,
    pub value: RawNode,
}

/// Ordered map of raw entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMap {
    entries: IndexMap<String, RawEntry>,
}

impl RawNode {
    pub fn new(value: RawValue, location: SourceLocation) -> Self {
        Self { value, location }
    }

    pub fn null(location: SourceLocation) -> Self {
        Self::new(RawValue::Null, location)
    }

    pub fn string(value: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(RawValue::String(value.into()), location)
    }

    pub fn number(value: f64, location: SourceLocation) -> Self {
        Self::new(RawValue::Number(value), location)
    }

    pub fn bool(value: bool, location: SourceLocation) -> Self {
        Self::new(RawValue::Bool(value), location)
    }

    pub fn sequence(items: Vec<RawNode>, location: SourceLocation) -> Self {
        Self::new(RawValue::Sequence(items), location)
    }

    pub fn map(map: RawMap, location: SourceLocation) -> Self {
        Self::new(RawValue::Map(map), location)
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            RawValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            RawValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match &self.value {
            RawValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut RawMap> {
        match &mut self.value {
            RawValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[RawNode]> {
        match &self.value {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<RawNode>> {
        match &mut self.value {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, RawValue::Null)
    }

    /// Look up a key when this node is a map.
    pub fn get(&self, key: &str) -> Option<&RawNode> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Name of the node's shape, used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self.value {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Sequence(_) => "sequence",
            RawValue::Map(_) => "map",
        }
    }

    /// Visit this node and every descendant, depth-first, mutably.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut RawNode)) {
        visit(self);
        match &mut self.value {
            RawValue::Sequence(items) => {
                for item in items {
                    item.walk_mut(visit);
                }
            }
            RawValue::Map(map) => {
                for entry in map.entries.values_mut() {
                    entry.value.walk_mut(visit);
                }
            }
            _ => {}
        }
    }
}

impl RawMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RawNode> {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RawNode> {
        self.entries.get_mut(key).map(|e| &mut e.value)
    }

    pub fn entry(&self, key: &str) -> Option<&RawEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one.
    ///
    /// Replacing keeps the key's original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        key_location: SourceLocation,
        value: RawNode,
    ) -> Option<RawNode> {
        self.entries
            .insert(key.into(), RawEntry { key_location, value })
            .map(|e| e.value)
    }

    /// Remove a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<RawNode> {
        self.entries.shift_remove(key).map(|e| e.value)
    }

    /// Rename a key in place.
    ///
    /// If `to` already exists, the existing `to` entry is kept and `from` is
    /// dropped. Returns `true` when the map changed.
    pub fn rename_key(&mut self, from: &str, to: &str) -> bool {
        if !self.entries.contains_key(from) {
            return false;
        }
        if self.entries.contains_key(to) {
            self.entries.shift_remove(from);
            return true;
        }
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .map(|(k, v)| if k == from { (to.to_string(), v) } else { (k, v) })
            .collect();
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut RawNode)> {
        self.entries.iter_mut().map(|(k, e)| (k.as_str(), &mut e.value))
    }
}

impl FromIterator<(String, RawEntry)> for RawMap {
    fn from_iter<T: IntoIterator<Item = (String, RawEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RawMap {
    type Item = (String, RawEntry);
    type IntoIter = indexmap::map::IntoIter<String, RawEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
