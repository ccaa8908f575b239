use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One segment of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Name(String),
    Id(i64),
    /// Canonical filter: field name -> scalar rendered as text. Absent and
    /// `null` fields are dropped so `{a: 1}` and `{a: 1, b: null}` collide.
    Params(BTreeMap<String, String>),
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Name(n) => write!(f, "{n:?}"),
            KeySegment::Id(id) => write!(f, "{id}"),
            KeySegment::Params(params) => {
                f.write_str("{")?;
                for (i, (k, v)) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Deterministic cache key: resource name followed by scope segments.
///
/// Prefix matching is segment-wise, so `["rubros", "list"]` covers every
/// rubro list regardless of filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new(root: &str) -> Self {
        Self(vec![KeySegment::Name(root.to_string())])
    }

    pub fn name(mut self, name: &str) -> Self {
        self.0.push(KeySegment::Name(name.to_string()));
        self
    }

    pub fn id(mut self, id: i64) -> Self {
        self.0.push(KeySegment::Id(id));
        self
    }

    /// Append a filter, canonicalised from its serde representation.
    pub fn params<T: Serialize>(mut self, filter: &T) -> Self {
        self.0.push(KeySegment::Params(canonical_params(filter)));
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{seg}")?;
        }
        f.write_str("]")
    }
}

fn canonical_params<T: Serialize>(filter: &T) -> BTreeMap<String, String> {
    let value = match serde_json::to_value(filter) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Query filter is not serializable; using empty params");
            return BTreeMap::new();
        }
    };
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, scalar_text(v)))
            .collect(),
        serde_json::Value::Null => BTreeMap::new(),
        other => BTreeMap::from([("value".to_string(), scalar_text(other))]),
    }
}

fn scalar_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
