use crate::compose::route::{QueryParams, RouteChain, RouteParams};
use crate::element::component::ComponentRef;
use crate::element::node::ElementNode;
use crate::element::props::Props;
use crate::foundation::error::{WeftError, WeftResult};

/// Fold a route chain into one composed element tree.
///
/// The innermost leaf is invoked with `{params, query}` and awaited if
/// pending. If any segment carries a loading placeholder (nearest to the leaf
/// wins), the tree is wrapped in a deferred boundary whose fallback is the
/// invoked placeholder. Ancestor layouts then fold innermost to outermost,
/// each invoked with `{children, params}`.
///
/// Layouts never receive query parameters: they are shared across leaves that
/// differ only by query state, and feeding them query values would recompose
/// shared chrome on every pagination or sort change.
#[tracing::instrument(skip_all, fields(segments = chain.len()))]
pub async fn compose(
    chain: &RouteChain,
    route_params: &RouteParams,
    query_params: &QueryParams,
) -> WeftResult<ElementNode> {
    let leaf = chain
        .innermost()
        .and_then(|segment| segment.leaf.as_ref())
        .ok_or_else(|| {
            WeftError::route_resolution("no leaf component on the innermost route segment")
        })?;

    let mut leaf_props = Props::new();
    leaf_props.set("params", route_params.to_prop());
    leaf_props.set("query", query_params.to_prop());
    let mut tree = invoke(leaf, leaf_props, "leaf").await?;

    if let Some(loading) = chain.nearest_loading() {
        let mut loading_props = Props::new();
        loading_props.set("params", route_params.to_prop());
        let fallback = invoke(loading, loading_props, "loading placeholder").await?;
        tree = ElementNode::deferred(fallback, tree);
    }

    for segment in chain.segments().iter().rev() {
        if let Some(layout) = &segment.layout {
            let mut layout_props = Props::new();
            layout_props.set("children", tree);
            layout_props.set("params", route_params.to_prop());
            tree = invoke(layout, layout_props, "layout").await?;
        }
    }

    Ok(tree)
}

async fn invoke(component: &ComponentRef, props: Props, role: &str) -> WeftResult<ElementNode> {
    component
        .invoke(props)
        .map_err(|e| WeftError::render(format!("{role} '{}' failed: {e}", component.id())))?
        .resolve()
        .await
        .map_err(|e| WeftError::render(format!("{role} '{}' rejected: {e}", component.id())))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
