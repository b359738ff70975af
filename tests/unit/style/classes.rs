use super::*;

fn value(token: &str, property: &str) -> Option<StyleValue> {
    declarations_for(token).and_then(|r| r.get(property).cloned())
}

#[test]
fn layout_tokens_map_to_flex_properties() {
    assert_eq!(value("flex", "display"), Some(StyleValue::from("flex")));
    assert_eq!(
        value("flex-col", "flexDirection"),
        Some(StyleValue::from("column"))
    );
    assert_eq!(
        value("justify-between", "justifyContent"),
        Some(StyleValue::from("space-between"))
    );
}

#[test]
fn spacing_uses_four_pixel_scale() {
    assert_eq!(value("p-4", "padding"), Some(StyleValue::Integer(16)));
    assert_eq!(value("p-0.5", "padding"), Some(StyleValue::Integer(2)));
    let px = declarations_for("px-2").unwrap();
    assert_eq!(px.get("paddingLeft"), Some(&StyleValue::Integer(8)));
    assert_eq!(px.get("paddingRight"), Some(&StyleValue::Integer(8)));
    assert_eq!(px.len(), 2);
    assert_eq!(value("gap-x-3", "columnGap"), Some(StyleValue::Integer(12)));
}

#[test]
fn sizing_supports_scale_fractions_and_full() {
    assert_eq!(value("w-10", "width"), Some(StyleValue::Integer(40)));
    assert_eq!(value("w-1/2", "width"), Some(StyleValue::from("50%")));
    assert_eq!(value("h-full", "height"), Some(StyleValue::from("100%")));
}

#[test]
fn palette_colors_resolve() {
    assert_eq!(
        value("bg-blue-500", "backgroundColor"),
        Some(StyleValue::from("#3b82f6"))
    );
    assert_eq!(value("text-red-50", "color"), Some(StyleValue::from("#fef2f2")));
    assert!(declarations_for("bg-mauve-500").is_none());
}

#[test]
fn font_size_sets_line_height() {
    let r = declarations_for("text-2xl").unwrap();
    assert_eq!(r.get("fontSize"), Some(&StyleValue::Integer(24)));
    assert_eq!(r.get("lineHeight"), Some(&StyleValue::from("32px")));
    assert_eq!(value("font-bold", "fontWeight"), Some(StyleValue::Integer(700)));
}

#[test]
fn arbitrary_values_pass_through() {
    assert_eq!(value("w-[123px]", "width"), Some(StyleValue::from("123px")));
    assert_eq!(
        value("bg-[#ff0000]", "backgroundColor"),
        Some(StyleValue::from("#ff0000"))
    );
    assert_eq!(value("text-[#00ff00]", "color"), Some(StyleValue::from("#00ff00")));
    assert_eq!(value("text-[20px]", "fontSize"), Some(StyleValue::from("20px")));
    assert!(declarations_for("w-[]").is_none());
}

#[test]
fn opacity_is_a_fraction() {
    assert_eq!(value("opacity-50", "opacity"), Some(StyleValue::Number(0.5)));
    assert_eq!(value("opacity-100", "opacity"), Some(StyleValue::Integer(1)));
    assert!(declarations_for("opacity-150").is_none());
}

#[test]
fn unknown_tokens_are_none() {
    assert!(declarations_for("frobnicate").is_none());
    assert!(declarations_for("p-x").is_none());
    assert!(declarations_for("").is_none());
}
