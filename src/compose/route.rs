use std::collections::BTreeMap;

use crate::element::component::ComponentRef;
use crate::element::props::PropValue;

/// Path parameters extracted from a matched route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a prop value (a string-valued map).
    pub fn to_prop(&self) -> PropValue {
        PropValue::Map(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), PropValue::String(v.clone())))
                .collect(),
        )
    }
}

/// Query-string parameters for the current request.
///
/// Kept distinct from [`RouteParams`] because the composer hands them to the
/// leaf only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a prop value (a string-valued map).
    pub fn to_prop(&self) -> PropValue {
        PropValue::Map(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), PropValue::String(v.clone())))
                .collect(),
        )
    }
}

/// One segment of a matched route.
#[derive(Clone, Debug, Default)]
pub struct RouteSegment {
    /// Layout component wrapping everything below this segment.
    pub layout: Option<ComponentRef>,
    /// Leaf component; only meaningful on the innermost segment.
    pub leaf: Option<ComponentRef>,
    /// Loading placeholder shown while the subtree below is pending.
    pub loading: Option<ComponentRef>,
}

impl RouteSegment {
    /// Create an empty segment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style layout assignment.
    pub fn with_layout(mut self, layout: ComponentRef) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Builder-style leaf assignment.
    pub fn with_leaf(mut self, leaf: ComponentRef) -> Self {
        self.leaf = Some(leaf);
        self
    }

    /// Builder-style loading-placeholder assignment.
    pub fn with_loading(mut self, loading: ComponentRef) -> Self {
        self.loading = Some(loading);
        self
    }
}

/// A matched route, outermost segment first.
#[derive(Clone, Debug, Default)]
pub struct RouteChain {
    segments: Vec<RouteSegment>,
}

impl RouteChain {
    /// Create a chain from segments ordered outermost to innermost.
    pub fn new(segments: Vec<RouteSegment>) -> Self {
        Self { segments }
    }

    /// Segments, outermost first.
    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Return `true` when the chain has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The innermost segment, if any.
    pub fn innermost(&self) -> Option<&RouteSegment> {
        self.segments.last()
    }

    /// The loading placeholder nearest to the leaf, if any segment has one.
    pub fn nearest_loading(&self) -> Option<&ComponentRef> {
        self.segments.iter().rev().find_map(|s| s.loading.as_ref())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/route.rs"]
mod tests;
