//! Built-in utility class table.
//!
//! Each token maps to one or more property assignments. The spacing scale is 4px per unit.

use crate::node::style::{StyleRecord, StyleValue};

const SPACING_UNIT_PX: f64 = 4.0;

const PALETTE: &[(&str, [&str; 10])] = &[
    (
        "slate",
        [
            "#f8fafc", "#f1f5f9", "#e2e8f0", "#cbd5e1", "#94a3b8", "#64748b", "#475569",
            "#334155", "#1e293b", "#0f172a",
        ],
    ),
    (
        "gray",
        [
            "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563",
            "#374151", "#1f2937", "#111827",
        ],
    ),
    (
        "red",
        [
            "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626",
            "#b91c1c", "#991b1b", "#7f1d1d",
        ],
    ),
    (
        "green",
        [
            "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a",
            "#15803d", "#166534", "#14532d",
        ],
    ),
    (
        "blue",
        [
            "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb",
            "#1d4ed8", "#1e40af", "#1e3a8a",
        ],
    ),
    (
        "yellow",
        [
            "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04",
            "#a16207", "#854d0e", "#713f12",
        ],
    ),
];

const SHADES: [&str; 10] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900",
];

/// Property assignments for a single utility class, or `None` if the token is unknown.
pub fn declarations_for(token: &str) -> Option<StyleRecord> {
    if let Some(record) = fixed(token) {
        return Some(record);
    }
    if let Some((prefix, value)) = split_arbitrary(token) {
        return arbitrary(prefix, value);
    }
    spacing(token)
        .or_else(|| sizing(token))
        .or_else(|| typography(token))
        .or_else(|| colors(token))
        .or_else(|| effects(token))
}

fn one(property: &str, value: impl Into<StyleValue>) -> StyleRecord {
    StyleRecord::new().with(property, value)
}

fn fixed(token: &str) -> Option<StyleRecord> {
    let record = match token {
        "flex" => one("display", "flex"),
        "block" => one("display", "block"),
        "hidden" => one("display", "none"),
        "grid" => one("display", "grid"),
        "flex-row" => one("flexDirection", "row"),
        "flex-row-reverse" => one("flexDirection", "row-reverse"),
        "flex-col" => one("flexDirection", "column"),
        "flex-col-reverse" => one("flexDirection", "column-reverse"),
        "flex-wrap" => one("flexWrap", "wrap"),
        "flex-nowrap" => one("flexWrap", "nowrap"),
        "flex-1" => StyleRecord::new()
            .with("flexGrow", 1_i64)
            .with("flexShrink", 1_i64)
            .with("flexBasis", "0%"),
        "grow" => one("flexGrow", 1_i64),
        "grow-0" => one("flexGrow", 0_i64),
        "shrink" => one("flexShrink", 1_i64),
        "shrink-0" => one("flexShrink", 0_i64),
        "items-start" => one("alignItems", "flex-start"),
        "items-end" => one("alignItems", "flex-end"),
        "items-center" => one("alignItems", "center"),
        "items-stretch" => one("alignItems", "stretch"),
        "items-baseline" => one("alignItems", "baseline"),
        "justify-start" => one("justifyContent", "flex-start"),
        "justify-end" => one("justifyContent", "flex-end"),
        "justify-center" => one("justifyContent", "center"),
        "justify-between" => one("justifyContent", "space-between"),
        "justify-around" => one("justifyContent", "space-around"),
        "justify-evenly" => one("justifyContent", "space-evenly"),
        "relative" => one("position", "relative"),
        "absolute" => one("position", "absolute"),
        "overflow-hidden" => one("overflow", "hidden"),
        "italic" => one("fontStyle", "italic"),
        "not-italic" => one("fontStyle", "normal"),
        "underline" => one("textDecoration", "underline"),
        "line-through" => one("textDecoration", "line-through"),
        "no-underline" => one("textDecoration", "none"),
        "uppercase" => one("textTransform", "uppercase"),
        "lowercase" => one("textTransform", "lowercase"),
        "capitalize" => one("textTransform", "capitalize"),
        "text-left" => one("textAlign", "left"),
        "text-center" => one("textAlign", "center"),
        "text-right" => one("textAlign", "right"),
        "text-justify" => one("textAlign", "justify"),
        "font-sans" => one("fontFamily", "sans-serif"),
        "font-serif" => one("fontFamily", "serif"),
        "font-mono" => one("fontFamily", "monospace"),
        "w-full" => one("width", "100%"),
        "h-full" => one("height", "100%"),
        "w-auto" => one("width", "auto"),
        "h-auto" => one("height", "auto"),
        "rounded-none" => one("borderRadius", 0_i64),
        "rounded-sm" => one("borderRadius", 2_i64),
        "rounded" => one("borderRadius", 4_i64),
        "rounded-md" => one("borderRadius", 6_i64),
        "rounded-lg" => one("borderRadius", 8_i64),
        "rounded-xl" => one("borderRadius", 12_i64),
        "rounded-2xl" => one("borderRadius", 16_i64),
        "rounded-full" => one("borderRadius", 9999_i64),
        "bg-transparent" => one("backgroundColor", "transparent"),
        "bg-black" => one("backgroundColor", "#000000"),
        "bg-white" => one("backgroundColor", "#ffffff"),
        "text-black" => one("color", "#000000"),
        "text-white" => one("color", "#ffffff"),
        _ => return None,
    };
    Some(record)
}

/// Split `prefix-[value]` into `("prefix", "value")`.
fn split_arbitrary(token: &str) -> Option<(&str, &str)> {
    let inner = token.strip_suffix(']')?;
    let (prefix, value) = inner.split_once("-[")?;
    if value.is_empty() {
        return None;
    }
    Some((prefix, value))
}

fn arbitrary(prefix: &str, value: &str) -> Option<StyleRecord> {
    let property = match prefix {
        "w" => "width",
        "h" => "height",
        "p" => "padding",
        "m" => "margin",
        "gap" => "gap",
        "rounded" => "borderRadius",
        "opacity" => "opacity",
        "bg" => "backgroundColor",
        "text" if is_color_literal(value) => "color",
        "text" => "fontSize",
        "font" => "fontFamily",
        _ => return None,
    };
    Some(one(property, value.replace('_', " ")))
}

fn is_color_literal(value: &str) -> bool {
    value.starts_with('#') || value.starts_with("rgb") || value.starts_with("hsl")
}

fn scale(value: &str) -> Option<StyleValue> {
    if value == "px" {
        return Some(StyleValue::Integer(1));
    }
    let n: f64 = value.parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    Some(StyleValue::from(n * SPACING_UNIT_PX))
}

fn spacing(token: &str) -> Option<StyleRecord> {
    let (prefix, value) = token.rsplit_once('-')?;
    let properties: &[&str] = match prefix {
        "p" => &["padding"],
        "px" => &["paddingLeft", "paddingRight"],
        "py" => &["paddingTop", "paddingBottom"],
        "pt" => &["paddingTop"],
        "pr" => &["paddingRight"],
        "pb" => &["paddingBottom"],
        "pl" => &["paddingLeft"],
        "m" => &["margin"],
        "mx" => &["marginLeft", "marginRight"],
        "my" => &["marginTop", "marginBottom"],
        "mt" => &["marginTop"],
        "mr" => &["marginRight"],
        "mb" => &["marginBottom"],
        "ml" => &["marginLeft"],
        "gap" => &["gap"],
        "gap-x" => &["columnGap"],
        "gap-y" => &["rowGap"],
        _ => return None,
    };
    let v = scale(value)?;
    Some(properties.iter().map(|p| (*p, v.clone())).collect())
}

fn sizing(token: &str) -> Option<StyleRecord> {
    let (prefix, value) = token.split_once('-')?;
    let property = match prefix {
        "w" => "width",
        "h" => "height",
        _ => return None,
    };
    if let Some((num, den)) = value.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        let pct = (num / den * 100.0 * 1000.0).round() / 1000.0;
        return Some(one(property, format!("{pct}%")));
    }
    Some(one(property, scale(value)?))
}

fn typography(token: &str) -> Option<StyleRecord> {
    let (size, line_height) = match token {
        "text-xs" => (12, 16),
        "text-sm" => (14, 20),
        "text-base" => (16, 24),
        "text-lg" => (18, 28),
        "text-xl" => (20, 28),
        "text-2xl" => (24, 32),
        "text-3xl" => (30, 36),
        "text-4xl" => (36, 40),
        "text-5xl" => (48, 48),
        "text-6xl" => (60, 60),
        _ => {
            let weight = match token {
                "font-thin" => 100,
                "font-extralight" => 200,
                "font-light" => 300,
                "font-normal" => 400,
                "font-medium" => 500,
                "font-semibold" => 600,
                "font-bold" => 700,
                "font-extrabold" => 800,
                "font-black" => 900,
                _ => return None,
            };
            return Some(one("fontWeight", weight as i64));
        }
    };
    Some(
        StyleRecord::new()
            .with("fontSize", size as i64)
            .with("lineHeight", format!("{line_height}px")),
    )
}

fn colors(token: &str) -> Option<StyleRecord> {
    let (property, rest) = if let Some(rest) = token.strip_prefix("bg-") {
        ("backgroundColor", rest)
    } else if let Some(rest) = token.strip_prefix("text-") {
        ("color", rest)
    } else if let Some(rest) = token.strip_prefix("border-") {
        ("borderColor", rest)
    } else {
        return None;
    };
    let (name, shade) = rest.rsplit_once('-')?;
    let (_, shades) = PALETTE.iter().find(|(n, _)| *n == name)?;
    let idx = SHADES.iter().position(|s| *s == shade)?;
    Some(one(property, shades[idx]))
}

fn effects(token: &str) -> Option<StyleRecord> {
    let value = token.strip_prefix("opacity-")?;
    let pct: u32 = value.parse().ok()?;
    if pct > 100 {
        return None;
    }
    Some(one("opacity", f64::from(pct) / 100.0))
}

#[cfg(test)]
#[path = "../../tests/unit/style/classes.rs"]
mod tests;
