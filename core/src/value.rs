//! Property-list values as they appear in a project description.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::identifier::ObjectId;

/// A property-list value: string, array or dictionary.
///
/// Numbers and booleans are plain strings in this format (`0`, `YES`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dict(Dict),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Array of strings from string literals.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    /// Array of object references.
    pub fn ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a ObjectId>,
    {
        Self::Array(ids.into_iter().map(Self::from).collect())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&ObjectId> for Value {
    fn from(value: &ObjectId) -> Self {
        Self::String(value.as_str().to_string())
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Self::from(&value)
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Self::Dict(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

/// Insertion-ordered dictionary.
///
/// Key order is preserved through parse and write so that a patched document
/// only differs from its input where something was added. Equality is
/// order-sensitive.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<String, Value>,
}

impl Dict {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut dict = Self::new();
        for (key, value) in pairs {
            dict.insert(key, value);
        }
        dict
    }

    /// Set `key`, replacing an existing value in place or appending.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Append `key` unless it is already present; the rejected value is
    /// handed back.
    pub fn try_insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => Some(value.into()),
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dict> {
        self.get(key).and_then(Value::as_dict)
    }

    pub fn get_array_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
        match self.get_mut(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Sort entries by key, the order Xcode uses for build settings.
    pub fn sort_keys(&mut self) {
        self.entries.sort_keys();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Dict {}
