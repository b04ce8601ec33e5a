use std::sync::Arc;

use futures::future::BoxFuture;

use crate::element::node::ElementNode;
use crate::element::props::Props;
use crate::foundation::error::WeftResult;

/// Stable component identity.
///
/// Identity drives registry membership and module-reference dedup; two refs
/// with the same id are the same component as far as the codec is concerned.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(Arc<str>);

impl ComponentId {
    /// View the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentId {
    fn from(v: &str) -> Self {
        Self(v.into())
    }
}

impl From<String> for ComponentId {
    fn from(v: String) -> Self {
        Self(v.into())
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// Result of invoking a component: its subtree, either immediate or pending.
pub enum ComponentOutput {
    /// The component completed synchronously.
    Ready(ElementNode),
    /// The component is still computing; await the future for its subtree.
    Pending(BoxFuture<'static, WeftResult<ElementNode>>),
}

impl ComponentOutput {
    /// Wrap an already-computed subtree.
    pub fn ready(node: ElementNode) -> Self {
        Self::Ready(node)
    }

    /// Wrap a pending computation.
    pub fn pending(
        fut: impl std::future::Future<Output = WeftResult<ElementNode>> + Send + 'static,
    ) -> Self {
        Self::Pending(Box::pin(fut))
    }

    /// Await-if-pending: produce the subtree either way.
    pub async fn resolve(self) -> WeftResult<ElementNode> {
        match self {
            Self::Ready(node) => Ok(node),
            Self::Pending(fut) => fut.await,
        }
    }
}

impl std::fmt::Debug for ComponentOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(node) => f.debug_tuple("Ready").field(node).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Plain-callable component shape.
pub type PlainComponent = dyn Fn(Props) -> WeftResult<ComponentOutput> + Send + Sync;

/// Stateful (instance-backed) component shape.
pub trait StatefulComponent: Send + Sync {
    /// Render the component with the given props.
    fn render(&self, props: Props) -> WeftResult<ComponentOutput>;
}

/// The two component shapes the runtime dispatches over.
#[derive(Clone)]
pub enum ComponentKind {
    /// A bare render function.
    Plain(Arc<PlainComponent>),
    /// An instance carrying its own state behind [`StatefulComponent`].
    Stateful(Arc<dyn StatefulComponent>),
}

impl std::fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain"),
            Self::Stateful(_) => f.write_str("Stateful"),
        }
    }
}

/// A component: identity plus invokable shape.
#[derive(Clone, Debug)]
pub struct ComponentRef {
    id: ComponentId,
    kind: ComponentKind,
}

impl ComponentRef {
    /// Create a plain-callable component.
    pub fn plain(
        id: impl Into<ComponentId>,
        f: impl Fn(Props) -> WeftResult<ComponentOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Plain(Arc::new(f)),
        }
    }

    /// Create a stateful component from an instance.
    pub fn stateful(id: impl Into<ComponentId>, instance: Arc<dyn StatefulComponent>) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Stateful(instance),
        }
    }

    /// The component's stable identity.
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// The component's shape.
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Invoke the component with `props`.
    pub fn invoke(&self, props: Props) -> WeftResult<ComponentOutput> {
        match &self.kind {
            ComponentKind::Plain(f) => f(props),
            ComponentKind::Stateful(instance) => instance.render(props),
        }
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A component implementation produced by a [`ComponentLoader`].
pub struct LoadedComponent {
    /// The loaded component.
    pub component: ComponentRef,
    /// Whether its code must ship to the consuming environment.
    pub ships_downstream: bool,
}

/// External loader for component implementations.
///
/// Consumed by the deferred-load resolution strategy; load failures surface as
/// [`WeftError::Render`](crate::WeftError::Render).
pub trait ComponentLoader: Send + Sync {
    /// Load the component at `path`.
    fn load(&self, path: &str) -> BoxFuture<'_, WeftResult<LoadedComponent>>;
}

#[cfg(test)]
#[path = "../../tests/unit/element/component.rs"]
mod tests;
