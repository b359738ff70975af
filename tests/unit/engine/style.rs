use serde_json::json;

use super::*;

fn parse(value: serde_json::Value) -> Result<EngineStyle, String> {
    let record: StyleRecord = serde_json::from_value(value).unwrap();
    parse_style(Some(&record))
}

#[test]
fn missing_record_is_default() {
    let style = parse_style(None).unwrap();
    assert!(style.display.is_none());
    assert!(style.width.is_none());
}

#[test]
fn wrong_type_keeps_serde_wording() {
    let err = parse(json!({"justifyContent": 123})).unwrap_err();
    assert_eq!(
        err,
        "invalid type: integer `123`, expected a string like 'start', 'end', 'flex-start', ..."
    );
}

#[test]
fn unknown_keyword_is_reported_with_value() {
    let err = parse(json!({"justifyContent": "star"})).unwrap_err();
    assert!(err.starts_with("invalid value 'star', expected one of start, end"));
    let err = parse(json!({"display": "table"})).unwrap_err();
    assert!(err.contains("invalid value 'table'"));
}

#[test]
fn unknown_properties_are_ignored() {
    let style = parse(json!({"textTransform": "uppercase", "display": "flex"})).unwrap();
    assert_eq!(style.display, Some(Display::Flex));
}

#[test]
fn lengths_parse_units() {
    assert_eq!("12px".parse(), Ok(Length::Px(12.0)));
    assert_eq!("1.5em".parse(), Ok(Length::Em(1.5)));
    assert_eq!("2rem".parse(), Ok(Length::Rem(2.0)));
    assert_eq!("50%".parse(), Ok(Length::Percent(50.0)));
    assert_eq!("auto".parse(), Ok(Length::Auto));
    assert_eq!("8".parse(), Ok(Length::Px(8.0)));
    assert!("wide".parse::<Length>().is_err());

    let m = Metrics {
        font_size: 20.0,
        viewport: (200.0, 100.0),
    };
    assert_eq!(Length::Em(2.0).resolve(None, m), Some(40.0));
    assert_eq!(Length::Percent(50.0).resolve(Some(300.0), m), Some(150.0));
    assert_eq!(Length::Percent(50.0).resolve(None, m), None);
    assert_eq!(Length::Vh(10.0).resolve(None, m), Some(10.0));
}

#[test]
fn shorthand_expands_like_css() {
    let style = parse(json!({"padding": "1px 2px 3px", "marginLeft": 7, "margin": 4})).unwrap();
    let m = Metrics {
        font_size: 16.0,
        viewport: (100.0, 100.0),
    };
    let p = style.padding(None, m);
    assert_eq!((p.top, p.right, p.bottom, p.left), (1.0, 2.0, 3.0, 2.0));
    let mg = style.margin(None, m);
    assert_eq!((mg.top, mg.left), (4.0, 7.0));
    assert!(parse(json!({"padding": "1px 2px 3px 4px 5px"})).is_err());
}

#[test]
fn colors_parse_common_syntaxes() {
    assert_eq!("#fff".parse(), Ok(Color([255, 255, 255, 255])));
    assert_eq!("#3b82f6".parse(), Ok(Color([0x3b, 0x82, 0xf6, 255])));
    assert_eq!("#00000080".parse(), Ok(Color([0, 0, 0, 0x80])));
    assert_eq!("rgb(1, 2, 3)".parse(), Ok(Color([1, 2, 3, 255])));
    assert_eq!("rgba(1,2,3,0.5)".parse(), Ok(Color([1, 2, 3, 128])));
    assert_eq!("hsl(0, 100%, 50%)".parse(), Ok(Color([255, 0, 0, 255])));
    assert_eq!("transparent".parse(), Ok(Color::TRANSPARENT));
    assert!("#12".parse::<Color>().is_err());
    assert!(
        parse(json!({"backgroundColor": "nope"}))
            .unwrap_err()
            .contains("invalid value 'nope'")
    );
}

#[test]
fn numbers_accept_numeric_strings() {
    let style = parse(json!({"opacity": "0.5", "flexGrow": 2})).unwrap();
    assert_eq!(style.opacity, Some(Number(0.5)));
    assert_eq!(style.flex_grow, Some(Number(2.0)));
}
