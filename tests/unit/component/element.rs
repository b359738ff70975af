use serde_json::json;

use super::*;

#[test]
fn parses_react_like_json() {
    let el: Element = serde_json::from_value(json!({
        "type": "div",
        "props": {
            "className": "flex p-4",
            "style": {"color": "#fff"},
            "children": [
                "hello",
                {"component": "Badge", "props": {"label": "new"}},
                {"type": "img", "props": {"src": "logo.png", "width": 32}}
            ]
        }
    }))
    .unwrap();

    let Element::Host(host) = &el else {
        panic!("expected host element");
    };
    assert_eq!(host.tag, "div");
    assert_eq!(host.props.class_name.as_deref(), Some("flex p-4"));
    assert_eq!(host.props.children.len(), 3);
    assert_eq!(host.props.children[0], Element::text("hello"));
    assert!(matches!(host.props.children[1], Element::Component(_)));
    assert_eq!(el.count(), 4);
    assert_eq!(el.depth(), 2);
}

#[test]
fn single_child_needs_no_list() {
    let text: Element =
        serde_json::from_str(r#"{"type":"p","props":{"children":"Hello"}}"#).unwrap();
    let built: Element = Element::host("p").child("Hello").into();
    assert_eq!(text, built);

    let nested: Element = serde_json::from_value(json!({
        "type": "div",
        "props": {"children": {"type": "span", "props": {"children": "inner"}}}
    }))
    .unwrap();
    let Element::Host(host) = &nested else {
        panic!("expected host element");
    };
    assert_eq!(host.props.children.len(), 1);
    assert_eq!(nested.count(), 3);

    let empty: Element =
        serde_json::from_value(json!({"type": "div", "props": {"children": null}})).unwrap();
    let Element::Host(host) = empty else {
        panic!("expected host element");
    };
    assert!(host.props.children.is_empty());
}

#[test]
fn extra_props_are_collected() {
    let el: Element =
        serde_json::from_value(json!({"type": "chart", "props": {"series": [1, 2]}})).unwrap();
    let Element::Host(host) = el else {
        panic!("expected host element");
    };
    assert_eq!(host.props.extra.get("series"), Some(&json!([1, 2])));
}

#[test]
fn builder_matches_parsed_form() {
    let built: Element = Element::host("p").class("text-lg").child("hi").into();
    let parsed: Element = serde_json::from_value(json!({
        "type": "p",
        "props": {"className": "text-lg", "children": ["hi"]}
    }))
    .unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn registry_holds_closures() {
    let registry = ComponentRegistry::new()
        .register("Title", |props: &serde_json::Value| -> RastreeResult<Element> {
            Ok(Element::host("h1")
                .child(props["text"].as_str().unwrap_or_default())
                .into())
        })
        .register_extension("chart");

    let title = registry.get("Title").unwrap();
    let el = title.render(&json!({"text": "Hi"})).unwrap();
    assert_eq!(el, Element::host("h1").child("Hi").into());
    assert!(registry.extensions().contains("chart"));
    assert!(registry.get("Missing").is_none());
}

#[test]
fn kinds_round_trip_through_tags() {
    let ext: HashSet<String> = ["chart".to_string()].into();
    for tag in ["div", "h1", "h6", "img", "br", "blockquote", "chart"] {
        let k = kind::ElementKind::from_tag(tag, &ext).unwrap();
        assert_eq!(k.tag(), tag);
    }
    assert!(kind::ElementKind::from_tag("video", &ext).is_none());
}
