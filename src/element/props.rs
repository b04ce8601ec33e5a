use std::collections::BTreeMap;
use std::sync::Arc;

use crate::element::node::ElementNode;

/// Named reference to a function-valued prop.
///
/// Handlers never execute inside this crate; they exist so composed trees can
/// carry interactive props that the encoder must null out (functions are not
/// serializable). Equality is by name only.
#[derive(Clone)]
pub struct HandlerRef {
    name: Arc<str>,
    callback: Arc<dyn Fn(serde_json::Value) + Send + Sync>,
}

impl HandlerRef {
    /// Create a handler reference with the given name and callback.
    pub fn new(
        name: impl Into<String>,
        callback: impl Fn(serde_json::Value) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into().into(),
            callback: Arc::new(callback),
        }
    }

    /// Handler name, used for equality and diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the underlying callback with a JSON payload.
    pub fn call(&self, payload: serde_json::Value) {
        (self.callback)(payload)
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRef").field("name", &self.name).finish()
    }
}

/// A single prop value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Absent/null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value; integers are widened to `f64` like JSON numbers.
    Number(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    List(Vec<PropValue>),
    /// String-keyed map of values.
    Map(BTreeMap<String, PropValue>),
    /// A nested element subtree (e.g. `children`).
    Element(Box<ElementNode>),
    /// A function-valued prop; nulled by the encoder.
    Handler(HandlerRef),
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ElementNode> for PropValue {
    fn from(v: ElementNode) -> Self {
        Self::Element(Box::new(v))
    }
}

impl From<HandlerRef> for PropValue {
    fn from(v: HandlerRef) -> Self {
        Self::Handler(v)
    }
}

/// Ordered prop map attached to an element or passed into a component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(BTreeMap<String, PropValue>);

/// Prop keys that identify rather than describe; stripped during encoding.
pub(crate) const RESERVED_KEYS: [&str; 2] = ["key", "ref"];

/// Return `true` when `key` is stripped from encoded props.
pub(crate) fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

impl Props {
    /// Create an empty prop map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prop, replacing any existing value under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`Props::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a prop by key.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    /// Remove a prop, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.remove(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when no props are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PropValue)> for Props {
    fn from_iter<T: IntoIterator<Item = (String, PropValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/props.rs"]
mod tests;
