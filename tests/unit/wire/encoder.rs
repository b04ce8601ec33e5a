use super::*;
use crate::element::component::{ComponentOutput, ComponentRef};
use crate::element::props::HandlerRef;

fn downstream(id: &str, module_id: &str) -> (ComponentRef, ModuleReference) {
    let component = ComponentRef::plain(id, |_props| {
        unreachable!("downstream boundaries are never invoked during encode")
    });
    let module = ModuleReference::new(module_id, vec![format!("{module_id}-chunk")], "default");
    (component, module)
}

#[tokio::test]
async fn host_nodes_encode_as_tuples() {
    let registry = ClientComponentRegistry::new();
    let mut encoder = Encoder::new(&registry);

    let tree = ElementNode::host("div", None, Props::new().with("class", "hero"));
    let wire = encoder.encode(&tree).await.unwrap();
    assert_eq!(wire, "J0:[\"$\",\"div\",null,{\"class\":\"hero\"}]\n");
}

#[tokio::test]
async fn host_keys_ride_in_the_third_slot() {
    let registry = ClientComponentRegistry::new();
    let mut encoder = Encoder::new(&registry);

    let tree = ElementNode::host("li", Some("row-1".into()), Props::new());
    let wire = encoder.encode(&tree).await.unwrap();
    assert_eq!(wire, "J0:[\"$\",\"li\",\"row-1\",{}]\n");
}

#[tokio::test]
async fn repeated_identity_emits_one_module_chunk() {
    let (counter, module) = downstream("./Counter#default", "./Counter");
    let mut registry = ClientComponentRegistry::new();
    registry.register(counter.id().clone(), module).unwrap();

    let tree = ElementNode::host(
        "ul",
        None,
        Props::new().with(
            "children",
            PropValue::List(vec![
                ElementNode::component(counter.clone(), Props::new().with("label", "a")).into(),
                ElementNode::component(counter.clone(), Props::new().with("label", "b")).into(),
                ElementNode::component(counter.clone(), Props::new().with("label", "c")).into(),
            ]),
        ),
    );

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();

    assert_eq!(wire.lines().filter(|l| l.starts_with('M')).count(), 1);
    assert_eq!(wire.matches("\"@1\"").count(), 3);
    assert_eq!(encoder.referenced_components().len(), 1);
    assert_eq!(encoder.referenced_components()[0].id, "./Counter");
}

#[tokio::test]
async fn distinct_identities_get_distinct_tokens_in_first_use_order() {
    let (nav, nav_module) = downstream("./Nav#default", "./Nav");
    let (footer, footer_module) = downstream("./Footer#default", "./Footer");
    let mut registry = ClientComponentRegistry::new();
    registry.register(nav.id().clone(), nav_module).unwrap();
    registry.register(footer.id().clone(), footer_module).unwrap();

    let tree = ElementNode::host(
        "div",
        None,
        Props::new().with(
            "children",
            PropValue::List(vec![
                ElementNode::component(nav, Props::new()).into(),
                ElementNode::component(footer, Props::new()).into(),
            ]),
        ),
    );

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();

    assert!(wire.starts_with("M1:"));
    assert!(wire.contains("\nM2:"));
    let ids: Vec<&str> = encoder
        .referenced_components()
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(ids, ["./Nav", "./Footer"]);
}

#[tokio::test]
async fn server_components_vanish_into_their_output() {
    let registry = ClientComponentRegistry::new();
    let server_only = ComponentRef::plain("./Article#default", |props| {
        Ok(ComponentOutput::Ready(ElementNode::host(
            "article", None, props,
        )))
    });
    let tree = ElementNode::component(server_only, Props::new().with("slug", "intro"));

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();

    assert_eq!(wire, "J0:[\"$\",\"article\",null,{\"slug\":\"intro\"}]\n");
    assert!(encoder.referenced_components().is_empty());
}

#[tokio::test]
async fn pending_server_components_are_awaited() {
    let registry = ClientComponentRegistry::new();
    let async_component = ComponentRef::plain("./Feed#default", |_props| {
        Ok(ComponentOutput::pending(async {
            Ok(ElementNode::host("feed", None, Props::new()))
        }))
    });
    let tree = ElementNode::component(async_component, Props::new());

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();
    assert_eq!(wire, "J0:[\"$\",\"feed\",null,{}]\n");
}

#[tokio::test]
async fn props_strip_identity_fields_and_null_handlers() {
    let registry = ClientComponentRegistry::new();
    let tree = ElementNode::host(
        "button",
        None,
        Props::new()
            .with("key", "k9")
            .with("ref", "r1")
            .with("on_click", HandlerRef::new("on_click", |_| {}))
            .with("title", "Save"),
    );

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();
    assert_eq!(
        wire,
        "J0:[\"$\",\"button\",null,{\"on_click\":null,\"title\":\"Save\"}]\n"
    );
}

#[tokio::test]
async fn deferred_boundaries_are_never_flattened() {
    let registry = ClientComponentRegistry::new();
    let tree = ElementNode::deferred(
        ElementNode::host("spinner", None, Props::new()),
        ElementNode::host("main", None, Props::new()),
    );

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();
    assert_eq!(
        wire,
        "J0:[\"$\",\"__deferred__\",null,{\"fallback\":[\"$\",\"spinner\",null,{}],\"primary\":[\"$\",\"main\",null,{}]}]\n"
    );
}

#[tokio::test]
async fn reserved_host_tags_are_rejected() {
    let registry = ClientComponentRegistry::new();
    let tree = ElementNode::host("__deferred__", None, Props::new());
    let mut encoder = Encoder::new(&registry);
    let err = encoder.encode(&tree).await.unwrap_err();
    assert!(matches!(err, crate::WeftError::Encode(_)));
}

#[tokio::test]
async fn sigil_strings_are_escaped() {
    let registry = ClientComponentRegistry::new();
    let tree = ElementNode::host("span", None, Props::new().with("price", "$100"));
    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();
    assert_eq!(wire, "J0:[\"$\",\"span\",null,{\"price\":\"$$100\"}]\n");
}

#[tokio::test]
async fn long_strings_are_offloaded_into_literal_chunks() {
    let registry = ClientComponentRegistry::new();
    let body = "x".repeat(LITERAL_INLINE_MAX + 1);
    let tree = ElementNode::host("pre", None, Props::new().with("text", body.clone()));

    let mut encoder = Encoder::new(&registry);
    let wire = encoder.encode(&tree).await.unwrap();

    let mut lines = wire.lines();
    let literal = lines.next().unwrap();
    assert!(literal.starts_with("S1:"));
    assert!(literal.contains(&body));
    assert_eq!(
        lines.next().unwrap(),
        "J0:[\"$\",\"pre\",null,{\"text\":\"$1\"}]"
    );
}

#[tokio::test]
async fn counters_reset_between_encode_calls() {
    let (counter, module) = downstream("./Counter#default", "./Counter");
    let mut registry = ClientComponentRegistry::new();
    registry.register(counter.id().clone(), module).unwrap();

    let tree = ElementNode::component(counter, Props::new());
    let mut encoder = Encoder::new(&registry);

    let first = encoder.encode(&tree).await.unwrap();
    let second = encoder.encode(&tree).await.unwrap();

    assert_eq!(first, second);
    assert!(second.starts_with("M1:"));
    assert_eq!(encoder.referenced_components().len(), 1);
}

#[tokio::test]
async fn failing_invocation_aborts_with_encode_error() {
    let registry = ClientComponentRegistry::new();
    let broken = ComponentRef::plain("./Broken#default", |_props| {
        Err(crate::WeftError::render("no data source"))
    });
    let tree = ElementNode::component(broken, Props::new());

    let mut encoder = Encoder::new(&registry);
    let err = encoder.encode(&tree).await.unwrap_err();
    assert!(matches!(err, crate::WeftError::Encode(_)));
    assert!(err.to_string().contains("no data source"));
}
