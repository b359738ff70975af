use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde_json::json;

use super::*;
use crate::node::style::{StyleRecord, StyleValue};

/// Serves `src` as its own bytes after a per-source delay and records completion order.
struct DelayedFetcher {
    delays: Vec<(&'static str, u64)>,
    completed: Mutex<Vec<String>>,
}

impl AssetFetcher for DelayedFetcher {
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>> {
        Box::pin(async move {
            let delay = self
                .delays
                .iter()
                .find(|(s, _)| *s == src)
                .map(|(_, d)| *d)
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.completed.lock().unwrap().push(src.to_string());
            Ok(src.as_bytes().to_vec())
        })
    }
}

fn image_bytes(node: &Node) -> Vec<u8> {
    match node {
        Node::Image(ImageNode {
            src: ImageSource::Binary(handle),
            ..
        }) => handle.bytes().to_vec(),
        other => panic!("expected binary image, got {other:?}"),
    }
}

#[tokio::test]
async fn text_leaf_compiles_without_style() {
    let node = Compiler::new().compile(&Element::text("hi")).await.unwrap();
    assert_eq!(
        node,
        Node::Text(TextNode {
            style: None,
            text: "hi".to_string()
        })
    );
}

#[tokio::test]
async fn children_keep_source_order_when_first_image_resolves_last() {
    let fetcher = Arc::new(DelayedFetcher {
        delays: vec![("a.png", 60), ("b.png", 20), ("c.png", 0)],
        completed: Mutex::new(Vec::new()),
    });
    let compiler = Compiler::new().with_fetcher(fetcher.clone());
    let tree: Element = Element::host("div")
        .child(Element::host("img").src("a.png"))
        .child(Element::host("img").src("b.png"))
        .child(Element::host("img").src("c.png"))
        .into();

    let node = compiler.compile(&tree).await.unwrap();

    assert_eq!(
        *fetcher.completed.lock().unwrap(),
        vec!["c.png", "b.png", "a.png"]
    );
    let order: Vec<Vec<u8>> = node.children().iter().map(image_bytes).collect();
    assert_eq!(
        order,
        vec![b"a.png".to_vec(), b"b.png".to_vec(), b"c.png".to_vec()]
    );
}

#[tokio::test]
async fn compiling_twice_is_deterministic() {
    let compiler = Compiler::new().with_image_mode(ImageMode::Reference);
    let tree: Element = Element::host("div")
        .class("flex p-4 bg-blue-500")
        .child(Element::host("h1").child("Title"))
        .child(Element::host("img").src("logo.png").size(32.0, 32.0))
        .into();
    let a = compiler.compile(&tree).await.unwrap();
    let b = compiler.compile(&tree).await.unwrap();
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[tokio::test]
async fn text_kinds_collapse_and_carry_resolved_style() {
    let compiler = Compiler::new();
    let tree: Element = Element::host("h1")
        .class("text-red-500")
        .style(StyleRecord::new().with("fontSize", 48_i64))
        .child("Hello, ")
        .child("world")
        .into();
    let Node::Text(text) = compiler.compile(&tree).await.unwrap() else {
        panic!("expected text node");
    };
    assert_eq!(text.text, "Hello, world");
    let style = text.style.unwrap();
    assert_eq!(style.get("fontSize"), Some(&StyleValue::Integer(48)));
    assert_eq!(style.get("fontWeight"), Some(&StyleValue::Integer(700)));
    assert!(style.get("color").is_some());
}

#[tokio::test]
async fn mixed_text_children_become_a_container() {
    let tree: Element = Element::host("p")
        .child("a ")
        .child(Element::host("strong").child("b"))
        .into();
    let node = Compiler::new().compile(&tree).await.unwrap();
    assert_eq!(node.type_name(), "container");
    assert_eq!(node.children().len(), 2);
    assert_eq!(node.children()[1].type_name(), "text");
}

#[tokio::test]
async fn unstyled_div_omits_style() {
    let tree: Element = Element::host("div").child(Element::host("br")).into();
    let node = Compiler::new().compile(&tree).await.unwrap();
    assert!(node.style().is_none());
    let Node::Text(br) = &node.children()[0] else {
        panic!("expected line break text");
    };
    assert_eq!(br.text, "\n");
}

#[tokio::test]
async fn components_expand_through_registry() {
    let registry = ComponentRegistry::new().register(
        "Badge",
        |props: &serde_json::Value| -> RastreeResult<Element> {
            Ok(Element::host("span")
                .class("font-bold")
                .child(props["label"].as_str().unwrap_or_default())
                .into())
        },
    );
    let compiler = Compiler::new().with_registry(registry);
    let tree = Element::component("Badge", json!({"label": "new"}));
    let Node::Text(text) = compiler.compile(&tree).await.unwrap() else {
        panic!("expected text node");
    };
    assert_eq!(text.text, "new");
}

#[tokio::test]
async fn missing_component_fails_whole_compilation() {
    let tree: Element = Element::host("div")
        .child("ok")
        .child(Element::component("Nope", json!({})))
        .into();
    let err = Compiler::new().compile(&tree).await.unwrap_err();
    assert!(err.is_compile());
    assert!(err.to_string().contains("Nope"));
    assert_eq!(err.cause(), Some("component is not registered"));
}

#[tokio::test]
async fn failing_component_reports_cause() {
    let registry = ComponentRegistry::new().register(
        "Broken",
        |_: &serde_json::Value| -> RastreeResult<Element> {
            Err(RastreeError::validation("label is required"))
        },
    );
    let err = Compiler::new()
        .with_registry(registry)
        .compile(&Element::component("Broken", json!({})))
        .await
        .unwrap_err();
    assert!(err.is_compile());
    assert_eq!(err.cause(), Some("validation error: label is required"));
}

#[tokio::test]
async fn recursive_components_hit_expansion_limit() {
    let registry = ComponentRegistry::new().register(
        "Loop",
        |_: &serde_json::Value| -> RastreeResult<Element> {
            Ok(Element::component("Loop", json!({})))
        },
    );
    let err = Compiler::new()
        .with_registry(registry)
        .with_max_expansions(8)
        .compile(&Element::component("Loop", json!({})))
        .await
        .unwrap_err();
    assert!(err.is_compile());
    assert!(err.cause().unwrap().contains("8"));
}

#[tokio::test]
async fn unknown_tags_are_rejected_and_extensions_pass_through() {
    let err = Compiler::new()
        .compile(&Element::host("marquee").into())
        .await
        .unwrap_err();
    assert!(err.is_compile());

    let compiler =
        Compiler::new().with_registry(ComponentRegistry::new().register_extension("chart"));
    let tree: Element = Element::host("chart")
        .prop("series", json!([1, 2, 3]))
        .child(Element::host("span").child("legend"))
        .into();
    let Node::Extension(ext) = compiler.compile(&tree).await.unwrap() else {
        panic!("expected extension node");
    };
    assert_eq!(ext.kind, "chart");
    assert_eq!(ext.props.get("series"), Some(&json!([1, 2, 3])));
    assert_eq!(ext.children.len(), 1);
}

#[tokio::test]
async fn img_requires_src_and_no_children() {
    let compiler = Compiler::new().with_image_mode(ImageMode::Reference);
    assert!(
        compiler
            .compile(&Element::host("img").into())
            .await
            .unwrap_err()
            .is_compile()
    );
    let with_child: Element = Element::host("img").src("a.png").child("x").into();
    assert!(compiler.compile(&with_child).await.unwrap_err().is_compile());
}

#[tokio::test]
async fn persistent_keys_are_never_fetched() {
    let compiler = Compiler::new().with_persistent_key("logo");
    let node = compiler
        .compile(&Element::host("img").src("logo").into())
        .await
        .unwrap();
    let Node::Image(img) = node else {
        panic!("expected image node");
    };
    assert_eq!(img.src, ImageSource::Url("logo".to_string()));
}

#[tokio::test]
async fn fetch_failure_is_a_compile_error() {
    let err = Compiler::new()
        .compile(&Element::host("img").src("missing.png").into())
        .await
        .unwrap_err();
    assert!(err.is_compile());
    assert!(err.cause().unwrap().contains("missing.png"));
}
