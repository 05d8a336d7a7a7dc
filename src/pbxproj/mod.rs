pub mod graph;
mod id;
pub mod kinds;
mod parse;
mod serialize;

pub use self::{
    graph::{Graph, GraphError},
    id::ObjectId,
    parse::ParseError,
    serialize::WriteError,
};

use indexmap::IndexMap;

/// An ordered dictionary of descriptor entries.
pub type Dict = IndexMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
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
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<&ObjectId> for Value {
    fn from(id: &ObjectId) -> Self {
        Self::String(id.as_str().to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(values)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Self::Dict(dict)
    }
}

/// A single entry in the descriptor's object table. Every object carries an
/// `isa` entry naming its kind; the rest of its entries are kind-specific.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    entries: Dict,
}

impl Object {
    pub fn new(kind: &str) -> Self {
        let mut entries = Dict::new();
        entries.insert("isa".to_owned(), Value::from(kind));
        Self { entries }
    }

    pub(crate) fn from_entries(entries: Dict) -> Self {
        Self { entries }
    }

    pub fn kind(&self) -> &str {
        self.get_str("isa").unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
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

    pub fn array_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
        self.entries.get_mut(key).and_then(Value::as_array_mut)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the dict stored under `key`, creating or replacing the entry
    /// with an empty dict if it's absent or holds some other shape.
    pub fn ensure_dict_mut(&mut self, key: &str) -> &mut Dict {
        if !matches!(self.entries.get(key), Some(Value::Dict(_))) {
            self.entries.insert(key.to_owned(), Value::Dict(Dict::new()));
        }
        match self.entries.get_mut(key) {
            Some(Value::Dict(dict)) => dict,
            _ => unreachable!(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}
