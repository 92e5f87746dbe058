//! Static table of portfolio collections.
//!
//! Every collection is known at compile time together with its kind, its
//! backing file and the route it is served under. Nothing registers
//! collections at runtime.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// One JSON object stored in a list collection. The `id` field is reserved.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Singleton,
    List,
}

impl CollectionKind {
    /// Text written to a freshly created backing file.
    pub fn empty_document(self) -> &'static str {
        match self {
            CollectionKind::Singleton => "{}",
            CollectionKind::List => "[]",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Singleton => f.write_str("singleton"),
            CollectionKind::List => f.write_str("list"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    pub key: &'static str,
    pub kind: CollectionKind,
    /// HTTP path the collection is mounted on, e.g. `/cursos`.
    pub route: &'static str,
}

impl CollectionSpec {
    pub const fn singleton(key: &'static str, route: &'static str) -> Self {
        Self { key, kind: CollectionKind::Singleton, route }
    }

    pub const fn list(key: &'static str, route: &'static str) -> Self {
        Self { key, kind: CollectionKind::List, route }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.key)
    }
}

pub const PORTFOLIO_COLLECTIONS: &[CollectionSpec] = &[
    CollectionSpec::singleton("dadosBasicos", "/basicos"),
    CollectionSpec::list("cursos", "/cursos"),
    CollectionSpec::list("projetos", "/projetos"),
    CollectionSpec::list("competencias", "/competencias"),
    CollectionSpec::singleton("redesSociais", "/redes"),
];

/// In-memory value of one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionData {
    Singleton(Record),
    List(Vec<Record>),
}

impl CollectionData {
    pub fn empty(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Singleton => CollectionData::Singleton(Record::new()),
            CollectionKind::List => CollectionData::List(Vec::new()),
        }
    }

    /// Check a decoded document against the expected kind.
    pub fn from_value(kind: CollectionKind, value: Value) -> Result<Self, String> {
        match (kind, value) {
            (CollectionKind::Singleton, Value::Object(obj)) => Ok(CollectionData::Singleton(obj)),
            (CollectionKind::List, Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(obj) => Ok(obj),
                    other => Err(format!("element {i} is {}, expected an object", type_name(&other))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(CollectionData::List),
            (CollectionKind::Singleton, other) => {
                Err(format!("expected an object, found {}", type_name(&other)))
            }
            (CollectionKind::List, other) => {
                Err(format!("expected an array, found {}", type_name(&other)))
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            CollectionData::Singleton(obj) => Value::Object(obj.clone()),
            CollectionData::List(items) => {
                Value::Array(items.iter().cloned().map(Value::Object).collect())
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
