//! The element/component model.
//!
//! Composition and the wire codec both operate on [`node::ElementNode`] trees
//! built from an external component model. Components are opaque callables
//! identified by a stable [`component::ComponentId`]; whether one is a
//! downstream boundary is decided per request by registry membership, never by
//! inspecting the component itself.

/// Component identity, shapes, and the loader seam.
pub mod component;
/// Element tree nodes.
pub mod node;
/// Prop maps and prop values.
pub mod props;
