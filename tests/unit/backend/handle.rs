use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::{
    engine::EngineFailure,
    foundation::{core::OutputFormat, error::RastreeError},
    node::TextNode,
};

#[derive(Default)]
struct Counting {
    fonts: AtomicUsize,
    images: AtomicUsize,
}

impl Renderer for Counting {
    fn render(&self, _: &Node, _: &RenderOptions) -> Result<Vec<u8>, EngineFailure> {
        Err(EngineFailure::invalid_arg("invalid value 'star', expected one of start"))
    }

    fn load_font(&self, _: &[u8]) -> Result<(), EngineFailure> {
        self.fonts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn put_persistent_image(&self, _: &str, _: &[u8]) -> Result<(), EngineFailure> {
        self.images.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn fonts_are_loaded_once_per_content() {
    let engine = Arc::new(Counting::default());
    let handle = BackendHandle::new(engine.clone());
    assert!(handle.register_font(b"font-a").unwrap());
    assert!(!handle.register_font(b"font-a").unwrap());
    assert!(handle.register_font(b"font-b").unwrap());
    assert_eq!(engine.fonts.load(Ordering::SeqCst), 2);
    assert_eq!(handle.font_count(), 2);
}

#[test]
fn persistent_images_keep_first_value() {
    let engine = Arc::new(Counting::default());
    let handle = BackendHandle::new(engine.clone());
    assert!(handle.put_persistent_image("logo", b"1").unwrap());
    assert!(!handle.put_persistent_image("logo", b"2").unwrap());
    assert_eq!(engine.images.load(Ordering::SeqCst), 1);
    assert_eq!(handle.persistent_image_count(), 1);
}

#[test]
fn render_failures_are_translated() {
    let handle = BackendHandle::new(Arc::new(Counting::default()));
    let node = Node::Text(TextNode {
        style: None,
        text: "x".to_string(),
    });
    let err = handle
        .render(&node, &RenderOptions::new(1, 1, OutputFormat::Png).unwrap())
        .unwrap_err();
    assert!(matches!(err, RastreeError::Deserialize(_)));
    assert!(err.to_string().starts_with("InvalidArg, invalid value 'star'"));
}

#[test]
fn rejected_fonts_are_not_recorded() {
    let handle = BackendHandle::new(Arc::new(crate::engine::ReferenceRenderer::new()));
    assert!(handle.register_font(&[]).is_err());
    assert_eq!(handle.font_count(), 0);
}
