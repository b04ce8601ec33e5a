use std::collections::BTreeMap;

use crate::element::component::{ComponentOutput, ComponentRef};
use crate::element::props::{PropValue, Props};
use crate::foundation::error::WeftResult;

/// One node of a composed element tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementNode {
    /// An environment-native markup primitive.
    Host {
        /// Literal tag name.
        tag: String,
        /// Optional reconciliation key.
        key: Option<String>,
        /// Attributes and children.
        props: Props,
    },
    /// A component invocation site. Whether this is a downstream boundary is
    /// decided by registry membership at encode time, not by the node itself.
    Component {
        /// The component to invoke.
        component: ComponentRef,
        /// Props the component will receive.
        props: Props,
    },
    /// A deferred boundary: renders `fallback` until `primary` resolves.
    Deferred {
        /// Subtree shown while `primary` is pending.
        fallback: Box<ElementNode>,
        /// The possibly-pending subtree.
        primary: Box<ElementNode>,
    },
}

impl ElementNode {
    /// Create a host node.
    pub fn host(tag: impl Into<String>, key: Option<String>, props: Props) -> Self {
        Self::Host {
            tag: tag.into(),
            key,
            props,
        }
    }

    /// Create a component node.
    pub fn component(component: ComponentRef, props: Props) -> Self {
        Self::Component { component, props }
    }

    /// Create a deferred boundary.
    pub fn deferred(fallback: ElementNode, primary: ElementNode) -> Self {
        Self::Deferred {
            fallback: Box::new(fallback),
            primary: Box::new(primary),
        }
    }

    /// Fold every synchronously-ready component node into its rendered output.
    ///
    /// Components whose output is pending are left in place; deferred
    /// boundaries are preserved. Used to materialize placeholder-resolved
    /// trees into crawlable host-only markup.
    pub fn render_ready(self) -> WeftResult<ElementNode> {
        match self {
            Self::Host { tag, key, props } => Ok(Self::Host {
                tag,
                key,
                props: render_ready_props(props)?,
            }),
            Self::Deferred { fallback, primary } => Ok(Self::Deferred {
                fallback: Box::new(fallback.render_ready()?),
                primary: Box::new(primary.render_ready()?),
            }),
            Self::Component { component, props } => match component.invoke(props.clone())? {
                ComponentOutput::Ready(node) => node.render_ready(),
                ComponentOutput::Pending(_) => Ok(Self::Component { component, props }),
            },
        }
    }
}

fn render_ready_props(props: Props) -> WeftResult<Props> {
    props
        .iter()
        .map(|(k, v)| Ok((k.to_owned(), render_ready_value(v.clone())?)))
        .collect::<WeftResult<Props>>()
}

fn render_ready_value(value: PropValue) -> WeftResult<PropValue> {
    Ok(match value {
        PropValue::Element(node) => PropValue::Element(Box::new(node.render_ready()?)),
        PropValue::List(items) => PropValue::List(
            items
                .into_iter()
                .map(render_ready_value)
                .collect::<WeftResult<Vec<_>>>()?,
        ),
        PropValue::Map(entries) => PropValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| Ok((k, render_ready_value(v)?)))
                .collect::<WeftResult<BTreeMap<_, _>>>()?,
        ),
        other => other,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/element/node.rs"]
mod tests;
