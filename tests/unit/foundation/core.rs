use super::*;

#[test]
fn viewport_rejects_zero_dimensions() {
    assert!(Viewport::new(0, 10).is_err());
    assert!(Viewport::new(10, 0).is_err());
    assert_eq!(Viewport::new(3, 4).unwrap().width, 3);
}

#[test]
fn content_type_follows_format() {
    assert_eq!(OutputFormat::Png.content_type(), "image/png");
    assert_eq!(OutputFormat::WebP.content_type(), "image/webp");
    assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
}

#[test]
fn format_parses_case_insensitively() {
    assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
    assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    assert!("gif".parse::<OutputFormat>().is_err());
}

#[test]
fn options_deserialize_with_defaults() {
    let opts: RenderOptions =
        serde_json::from_str(r#"{"viewport":{"width":100,"height":50},"format":"webp"}"#).unwrap();
    assert_eq!(opts.viewport, Viewport::new(100, 50).unwrap());
    assert_eq!(opts.format, OutputFormat::WebP);
    assert_eq!(opts.quality, None);
    assert!(!opts.debug_border);
}

#[test]
fn options_accept_debug_border() {
    let opts: RenderOptions = serde_json::from_str(r#"{"debugBorder":true}"#).unwrap();
    assert!(opts.debug_border);
    assert_eq!(opts.viewport, Viewport::default());
}

#[test]
fn animation_format_content_types() {
    assert_eq!(AnimationFormat::WebP.content_type(), "image/webp");
    assert_eq!(AnimationFormat::Apng.content_type(), "image/apng");
    assert_eq!("APNG".parse::<AnimationFormat>().unwrap(), AnimationFormat::Apng);
    assert!("gif".parse::<AnimationFormat>().is_err());
    let parsed: AnimationFormat = serde_json::from_str(r#""apng""#).unwrap();
    assert_eq!(parsed, AnimationFormat::Apng);
}

#[test]
fn options_reject_out_of_range_quality() {
    let mut opts = RenderOptions::new(10, 10, OutputFormat::Jpeg).unwrap();
    opts.quality = Some(0);
    assert!(opts.validate().is_err());
    opts.quality = Some(90);
    opts.validate().unwrap();
}
