use serde_json::json;

use super::*;
use crate::node::TextNode;

#[test]
fn inbound_render_matches_wire_shape() {
    let msg = InboundMessage::from_wire(
        &json!({"type": "render", "node": {"type": "text", "text": "hi"}}).to_string(),
    )
    .unwrap();
    let InboundMessage::Render { node, options } = msg;
    assert_eq!(
        node,
        Node::Text(TextNode {
            style: None,
            text: "hi".to_string()
        })
    );
    assert_eq!(options, RenderOptions::default());
}

#[test]
fn outbound_messages_use_snake_case_tags() {
    assert_eq!(
        OutboundMessage::Ready.to_wire().unwrap(),
        r#"{"type":"ready"}"#
    );
    let complete = OutboundMessage::RenderComplete {
        data_url: "data:image/png;base64,AA".to_string(),
        duration: 1.5,
    };
    let value: serde_json::Value = serde_json::from_str(&complete.to_wire().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"type": "render_complete", "dataUrl": "data:image/png;base64,AA", "duration": 1.5})
    );
    let error = OutboundMessage::RenderError {
        error: "InvalidArg, bad".to_string(),
    };
    assert_eq!(
        OutboundMessage::from_wire(&error.to_wire().unwrap()).unwrap(),
        error
    );
}

#[test]
fn malformed_messages_are_protocol_errors() {
    for raw in ["not json", r#"{"type":"paint"}"#, r#"{"type":"render"}"#] {
        assert!(matches!(
            InboundMessage::from_wire(raw),
            Err(RastreeError::WorkerProtocol(_))
        ));
    }
}
