use crate::{component::kind::ElementKind, node::style::StyleRecord};

/// Default style for `kind`, or `None` when the kind has no preset.
///
/// Values mirror common user-agent defaults; properties a kind does not set stay unset.
pub fn preset_for(kind: &ElementKind) -> Option<StyleRecord> {
    let record = match kind {
        ElementKind::Heading(level) => {
            let (size, margin) = match level {
                1 => ("2em", "0.67em"),
                2 => ("1.5em", "0.83em"),
                3 => ("1.17em", "1em"),
                4 => ("1em", "1.33em"),
                5 => ("0.83em", "1.67em"),
                _ => ("0.67em", "2.33em"),
            };
            StyleRecord::new()
                .with("display", "block")
                .with("fontSize", size)
                .with("fontWeight", 700_i64)
                .with("marginTop", margin)
                .with("marginBottom", margin)
        }
        ElementKind::P => StyleRecord::new()
            .with("display", "block")
            .with("marginTop", "1em")
            .with("marginBottom", "1em"),
        ElementKind::Strong | ElementKind::B => StyleRecord::new().with("fontWeight", 700_i64),
        ElementKind::Em | ElementKind::I => StyleRecord::new().with("fontStyle", "italic"),
        ElementKind::U => StyleRecord::new().with("textDecoration", "underline"),
        ElementKind::S => StyleRecord::new().with("textDecoration", "line-through"),
        ElementKind::Code => StyleRecord::new().with("fontFamily", "monospace"),
        ElementKind::Pre => StyleRecord::new()
            .with("display", "block")
            .with("fontFamily", "monospace")
            .with("whiteSpace", "pre")
            .with("marginTop", "1em")
            .with("marginBottom", "1em"),
        ElementKind::Small => StyleRecord::new().with("fontSize", "0.83em"),
        ElementKind::Mark => StyleRecord::new()
            .with("backgroundColor", "#ffff00")
            .with("color", "#000000"),
        ElementKind::Blockquote => StyleRecord::new()
            .with("display", "block")
            .with("marginTop", "1em")
            .with("marginBottom", "1em")
            .with("marginLeft", 40_i64)
            .with("marginRight", 40_i64),
        ElementKind::Ul | ElementKind::Ol => StyleRecord::new()
            .with("display", "block")
            .with("marginTop", "1em")
            .with("marginBottom", "1em")
            .with("paddingLeft", 40_i64),
        ElementKind::Img => StyleRecord::new().with("objectFit", "fill"),
        _ => return None,
    };
    Some(record)
}

#[cfg(test)]
#[path = "../../tests/unit/style/presets.rs"]
mod tests;
