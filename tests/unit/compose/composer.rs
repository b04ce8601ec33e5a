use std::sync::{Arc, Mutex};

use super::*;
use crate::compose::route::RouteSegment;
use crate::element::component::{ComponentOutput, ComponentRef};
use crate::element::props::PropValue;
use crate::foundation::error::WeftError;

fn leaf_component() -> ComponentRef {
    ComponentRef::plain("page", |props| {
        Ok(ComponentOutput::Ready(ElementNode::host(
            "main", None, props,
        )))
    })
}

fn wrapping_layout(id: &str, tag: &'static str) -> ComponentRef {
    ComponentRef::plain(id, move |props| {
        Ok(ComponentOutput::Ready(ElementNode::host(
            tag, None, props,
        )))
    })
}

#[tokio::test]
async fn missing_leaf_is_a_route_resolution_error() {
    let chain = RouteChain::new(vec![
        RouteSegment::new().with_layout(wrapping_layout("root", "html")),
    ]);
    let err = compose(&chain, &RouteParams::new(), &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WeftError::RouteResolution(_)));
}

#[tokio::test]
async fn layouts_fold_innermost_to_outermost() {
    let chain = RouteChain::new(vec![
        RouteSegment::new().with_layout(wrapping_layout("outer", "html")),
        RouteSegment::new().with_layout(wrapping_layout("inner", "section")),
        RouteSegment::new().with_leaf(leaf_component()),
    ]);

    let tree = compose(&chain, &RouteParams::new(), &QueryParams::new())
        .await
        .unwrap();

    // html > section > main
    let ElementNode::Host { tag, props, .. } = tree else {
        panic!("expected host root");
    };
    assert_eq!(tag, "html");
    let Some(PropValue::Element(section)) = props.get("children") else {
        panic!("outer layout lost its children");
    };
    let ElementNode::Host { tag, props, .. } = &**section else {
        panic!("expected host section");
    };
    assert_eq!(tag, "section");
    let Some(PropValue::Element(main)) = props.get("children") else {
        panic!("inner layout lost its children");
    };
    assert!(matches!(&**main, ElementNode::Host { tag, .. } if tag == "main"));
}

#[tokio::test]
async fn leaf_receives_params_and_query() {
    let chain = RouteChain::new(vec![RouteSegment::new().with_leaf(leaf_component())]);
    let route = RouteParams::new().with("slug", "intro");
    let query = QueryParams::new().with("page", "2");

    let tree = compose(&chain, &route, &query).await.unwrap();
    let ElementNode::Host { props, .. } = tree else {
        panic!("expected host root");
    };
    assert_eq!(props.get("params"), Some(&route.to_prop()));
    assert_eq!(props.get("query"), Some(&query.to_prop()));
}

#[tokio::test]
async fn layouts_never_receive_query_params() {
    let seen: Arc<Mutex<Vec<Props>>> = Arc::new(Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);
    let layout = ComponentRef::plain("layout", move |props| {
        seen2.lock().unwrap().push(props.clone());
        Ok(ComponentOutput::Ready(ElementNode::host(
            "section", None, props,
        )))
    });

    let chain = RouteChain::new(vec![
        RouteSegment::new().with_layout(layout),
        RouteSegment::new().with_leaf(leaf_component()),
    ]);
    let route = RouteParams::new().with("slug", "intro");

    for page in ["1", "2"] {
        let query = QueryParams::new().with("page", page);
        compose(&chain, &route, &query).await.unwrap();
    }

    let captured = seen.lock().unwrap();
    assert_eq!(captured.len(), 2);
    for props in captured.iter() {
        assert!(props.get("query").is_none());
        assert_eq!(props.get("params"), Some(&route.to_prop()));
    }
    // Shared chrome sees byte-identical inputs when only query state changes.
    assert_eq!(captured[0].get("params"), captured[1].get("params"));
}

#[tokio::test]
async fn loading_placeholder_wraps_the_leaf_in_a_deferred_boundary() {
    let loading = ComponentRef::plain("loading", |props| {
        Ok(ComponentOutput::Ready(ElementNode::host(
            "spinner", None, props,
        )))
    });
    let chain = RouteChain::new(vec![
        RouteSegment::new().with_layout(wrapping_layout("root", "html")),
        RouteSegment::new().with_leaf(leaf_component()).with_loading(loading),
    ]);

    let tree = compose(&chain, &RouteParams::new(), &QueryParams::new())
        .await
        .unwrap();

    let ElementNode::Host { props, .. } = tree else {
        panic!("expected host root");
    };
    let Some(PropValue::Element(boundary)) = props.get("children") else {
        panic!("layout lost its children");
    };
    let ElementNode::Deferred { fallback, primary } = &**boundary else {
        panic!("leaf was not wrapped in a deferred boundary");
    };
    assert!(matches!(&**fallback, ElementNode::Host { tag, .. } if tag == "spinner"));
    assert!(matches!(&**primary, ElementNode::Host { tag, .. } if tag == "main"));
}

#[tokio::test]
async fn pending_leaf_output_is_awaited() {
    let leaf = ComponentRef::plain("async-page", |props| {
        Ok(ComponentOutput::pending(async move {
            Ok(ElementNode::host("main", None, props))
        }))
    });
    let chain = RouteChain::new(vec![RouteSegment::new().with_leaf(leaf)]);

    let tree = compose(&chain, &RouteParams::new(), &QueryParams::new())
        .await
        .unwrap();
    assert!(matches!(tree, ElementNode::Host { ref tag, .. } if tag == "main"));
}

#[tokio::test]
async fn invocation_failure_surfaces_as_render_error() {
    let leaf = ComponentRef::plain("broken", |_props| {
        Err(WeftError::render("database offline"))
    });
    let chain = RouteChain::new(vec![RouteSegment::new().with_leaf(leaf)]);

    let err = compose(&chain, &RouteParams::new(), &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WeftError::Render(_)));
    assert!(err.to_string().contains("database offline"));
}
