use super::*;
use crate::node::style::StyleValue;

#[test]
fn preset_only_yields_exactly_the_preset() {
    let resolver = StyleResolver::new();
    for kind in [
        ElementKind::Heading(1),
        ElementKind::Heading(6),
        ElementKind::P,
        ElementKind::Strong,
        ElementKind::Code,
        ElementKind::Blockquote,
    ] {
        let resolved = resolver.resolve(&kind, None, None);
        assert_eq!(resolved, presets::preset_for(&kind), "{}", kind.tag());
    }
}

#[test]
fn empty_result_is_none() {
    let resolver = StyleResolver::new();
    assert_eq!(resolver.resolve(&ElementKind::Div, None, None), None);
    assert_eq!(resolver.resolve(&ElementKind::Div, Some("  "), None), None);
    assert_eq!(
        resolver.resolve(&ElementKind::Div, None, Some(&StyleRecord::new())),
        None
    );
}

#[test]
fn later_class_wins_over_earlier_class() {
    let resolver = StyleResolver::new();
    let a = resolver
        .resolve(&ElementKind::Div, Some("p-2 p-4"), None)
        .unwrap();
    assert_eq!(a.get("padding"), Some(&StyleValue::Integer(16)));
    let b = resolver
        .resolve(&ElementKind::Div, Some("p-4 p-2"), None)
        .unwrap();
    assert_eq!(b.get("padding"), Some(&StyleValue::Integer(8)));
}

#[test]
fn inline_wins_over_classes_and_presets() {
    let resolver = StyleResolver::new();
    let inline = StyleRecord::new()
        .with("fontWeight", 300_i64)
        .with("backgroundColor", "#123456");
    let r = resolver
        .resolve(
            &ElementKind::Heading(1),
            Some("bg-red-500 font-black"),
            Some(&inline),
        )
        .unwrap();
    assert_eq!(r.get("fontWeight"), Some(&StyleValue::Integer(300)));
    assert_eq!(r.get("backgroundColor"), Some(&StyleValue::from("#123456")));
    assert_eq!(r.get("fontSize"), Some(&StyleValue::from("2em")));
}

#[test]
fn classes_override_preset() {
    let resolver = StyleResolver::new();
    let r = resolver
        .resolve(&ElementKind::Heading(2), Some("font-light mt-0"), None)
        .unwrap();
    assert_eq!(r.get("fontWeight"), Some(&StyleValue::Integer(300)));
    assert_eq!(r.get("marginTop"), Some(&StyleValue::Integer(0)));
    assert_eq!(r.get("marginBottom"), Some(&StyleValue::from("0.83em")));
}

#[test]
fn unknown_classes_are_ignored() {
    let resolver = StyleResolver::new();
    let r = resolver
        .resolve(&ElementKind::Div, Some("not-a-class flex also-bogus"), None)
        .unwrap();
    assert_eq!(r.len(), 1);
    assert_eq!(r.get("display"), Some(&StyleValue::from("flex")));
}

#[test]
fn precedence_holds_for_every_combination() {
    let resolver = StyleResolver::new();
    let kinds = [ElementKind::Div, ElementKind::Heading(1), ElementKind::Mark];
    let class_sets = [None, Some("bg-gray-100"), Some("bg-gray-100 bg-blue-900")];
    let inlines = [None, Some(StyleRecord::new().with("backgroundColor", "#abcdef"))];

    for kind in &kinds {
        for classes in class_sets {
            for inline in &inlines {
                let r = resolver.resolve(kind, classes, inline.as_ref());
                let bg = r.as_ref().and_then(|r| r.get("backgroundColor")).cloned();
                let expected = if inline.is_some() {
                    Some(StyleValue::from("#abcdef"))
                } else if let Some(c) = classes {
                    let last = c.split_whitespace().last().unwrap();
                    classes::declarations_for(last)
                        .and_then(|d| d.get("backgroundColor").cloned())
                } else {
                    presets::preset_for(kind).and_then(|p| p.get("backgroundColor").cloned())
                };
                assert_eq!(bg, expected);
            }
        }
    }
}

#[test]
fn custom_class_shadows_builtin() {
    let resolver =
        StyleResolver::new().with_class("flex", StyleRecord::new().with("display", "block"));
    let r = resolver.resolve(&ElementKind::Div, Some("flex"), None).unwrap();
    assert_eq!(r.get("display"), Some(&StyleValue::from("block")));
}
