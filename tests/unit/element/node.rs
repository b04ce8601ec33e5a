use super::*;
use crate::element::component::{ComponentOutput, ComponentRef};

fn ready_component(id: &str, node: ElementNode) -> ComponentRef {
    ComponentRef::plain(id, move |_props| Ok(ComponentOutput::Ready(node.clone())))
}

#[test]
fn constructors_build_expected_variants() {
    let host = ElementNode::host("div", Some("k1".into()), Props::new());
    assert!(matches!(host, ElementNode::Host { ref tag, ref key, .. } if tag == "div" && key.as_deref() == Some("k1")));

    let deferred = ElementNode::deferred(
        ElementNode::host("span", None, Props::new()),
        ElementNode::host("main", None, Props::new()),
    );
    assert!(matches!(deferred, ElementNode::Deferred { .. }));
}

#[test]
fn render_ready_folds_nested_components() {
    let inner = ready_component("inner", ElementNode::host("em", None, Props::new()));
    let outer = ready_component(
        "outer",
        ElementNode::host(
            "p",
            None,
            Props::new().with("children", ElementNode::component(inner.clone(), Props::new())),
        ),
    );

    let tree = ElementNode::component(outer, Props::new());
    let rendered = tree.render_ready().unwrap();

    match rendered {
        ElementNode::Host { tag, props, .. } => {
            assert_eq!(tag, "p");
            match props.get("children") {
                Some(PropValue::Element(child)) => {
                    assert!(matches!(&**child, ElementNode::Host { tag, .. } if tag == "em"));
                }
                other => panic!("children not folded: {other:?}"),
            }
        }
        other => panic!("unexpected tree: {other:?}"),
    }
}

#[test]
fn render_ready_preserves_deferred_boundaries() {
    let tree = ElementNode::deferred(
        ElementNode::host("span", None, Props::new().with("children", "loading")),
        ElementNode::component(
            ready_component("primary", ElementNode::host("main", None, Props::new())),
            Props::new(),
        ),
    );

    match tree.render_ready().unwrap() {
        ElementNode::Deferred { fallback, primary } => {
            assert!(matches!(*fallback, ElementNode::Host { ref tag, .. } if tag == "span"));
            assert!(matches!(*primary, ElementNode::Host { ref tag, .. } if tag == "main"));
        }
        other => panic!("boundary flattened: {other:?}"),
    }
}

#[test]
fn render_ready_leaves_pending_components_in_place() {
    let pending = ComponentRef::plain("pending", |_props| {
        Ok(ComponentOutput::pending(async {
            Ok(ElementNode::host("late", None, Props::new()))
        }))
    });
    let tree = ElementNode::component(pending.clone(), Props::new().with("x", 1i64));

    match tree.render_ready().unwrap() {
        ElementNode::Component { component, props } => {
            assert_eq!(component, pending);
            assert_eq!(props.get("x"), Some(&PropValue::Number(1.0)));
        }
        other => panic!("pending component folded: {other:?}"),
    }
}
