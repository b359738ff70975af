use super::*;
use crate::node::style::StyleValue;

#[test]
fn heading_levels_scale_down() {
    let h1 = preset_for(&ElementKind::Heading(1)).unwrap();
    let h3 = preset_for(&ElementKind::Heading(3)).unwrap();
    assert_eq!(h1.get("fontSize"), Some(&StyleValue::from("2em")));
    assert_eq!(h3.get("fontSize"), Some(&StyleValue::from("1.17em")));
    assert_eq!(h1.get("fontWeight"), Some(&StyleValue::Integer(700)));
}

#[test]
fn plain_containers_have_no_preset() {
    assert!(preset_for(&ElementKind::Div).is_none());
    assert!(preset_for(&ElementKind::Span).is_none());
    assert!(preset_for(&ElementKind::Extension("chart".to_string())).is_none());
}

#[test]
fn strong_sets_only_weight() {
    let strong = preset_for(&ElementKind::Strong).unwrap();
    assert_eq!(strong.len(), 1);
    assert!(strong.get("marginTop").is_none());
}
