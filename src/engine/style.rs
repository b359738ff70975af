//! Typed view of a node's style record as the engine understands it.
//!
//! Records arrive as loose JSON objects; every recognised property is parsed into a typed value
//! and unknown properties are ignored. Parse failures keep serde's wording so callers can match
//! on substrings such as ``invalid type: integer `123`, expected a string like 'start'``.

use std::{fmt, marker::PhantomData, str::FromStr};

use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor as _},
};

use crate::node::style::StyleRecord;

/// Parse `record` into an [`EngineStyle`]. A missing record is the default style.
pub(crate) fn parse_style(record: Option<&StyleRecord>) -> Result<EngineStyle, String> {
    let Some(record) = record else {
        return Ok(EngineStyle::default());
    };
    let value = serde_json::to_value(record).map_err(|e| e.to_string())?;
    serde_json::from_value(value).map_err(|e| e.to_string())
}

struct KeywordVisitor<T> {
    keywords: &'static [&'static str],
    _marker: PhantomData<T>,
}

impl<'de, T: FromStr> de::Visitor<'de> for KeywordVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string like ")?;
        for kw in self.keywords.iter().take(3) {
            write!(f, "'{kw}', ")?;
        }
        f.write_str("...")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse().map_err(|_| {
            E::custom(format!(
                "invalid value '{v}', expected one of {}",
                self.keywords.join(", ")
            ))
        })
    }
}

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $kw:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub(crate) enum $name {
            $($variant),+
        }

        impl $name {
            const KEYWORDS: &'static [&'static str] = &[$($kw),+];
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                match s {
                    $($kw => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                d.deserialize_str(KeywordVisitor {
                    keywords: Self::KEYWORDS,
                    _marker: PhantomData,
                })
            }
        }
    };
}

keyword_enum!(
    /// Outer display type.
    Display {
        Flex => "flex",
        Block => "block",
        Inline => "inline",
        InlineBlock => "inline-block",
        Grid => "grid",
        None => "none",
    }
);

keyword_enum!(
    /// Main axis of a flex container.
    FlexDirection {
        Row => "row",
        Column => "column",
        RowReverse => "row-reverse",
        ColumnReverse => "column-reverse",
    }
);

keyword_enum!(
    /// Main-axis distribution of free space.
    JustifyContent {
        Start => "start",
        End => "end",
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
        Stretch => "stretch",
        Normal => "normal",
    }
);

keyword_enum!(
    /// Cross-axis alignment of flex items.
    AlignItems {
        Start => "start",
        End => "end",
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        Baseline => "baseline",
        Stretch => "stretch",
        Normal => "normal",
    }
);

keyword_enum!(
    /// How an image fills its box.
    ObjectFit {
        Fill => "fill",
        Contain => "contain",
        Cover => "cover",
        None => "none",
        ScaleDown => "scale-down",
    }
);

keyword_enum!(
    /// Horizontal alignment of text lines.
    TextAlign {
        Left => "left",
        Right => "right",
        Center => "center",
        Justify => "justify",
        Start => "start",
        End => "end",
    }
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Length {
    Px(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
    Vw(f32),
    Vh(f32),
    Auto,
}

/// Bases needed to turn a [`Length`] into pixels.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Metrics {
    pub font_size: f32,
    pub viewport: (f32, f32),
}

pub(crate) const ROOT_FONT_SIZE: f32 = 16.0;

impl Length {
    /// Pixels, or `None` for `auto` and for percentages without a basis.
    pub(crate) fn resolve(self, basis: Option<f32>, m: Metrics) -> Option<f32> {
        match self {
            Self::Px(v) => Some(v),
            Self::Em(v) => Some(v * m.font_size),
            Self::Rem(v) => Some(v * ROOT_FONT_SIZE),
            Self::Percent(v) => basis.map(|b| b * v / 100.0),
            Self::Vw(v) => Some(m.viewport.0 * v / 100.0),
            Self::Vh(v) => Some(m.viewport.1 * v / 100.0),
            Self::Auto => None,
        }
    }
}

impl FromStr for Length {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let s = s.trim();
        if s == "auto" {
            return Ok(Self::Auto);
        }
        let (num, ctor): (&str, fn(f32) -> Self) = if let Some(n) = s.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = s.strip_suffix("rem") {
            (n, Self::Rem)
        } else if let Some(n) = s.strip_suffix("em") {
            (n, Self::Em)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Self::Percent)
        } else if let Some(n) = s.strip_suffix("vw") {
            (n, Self::Vw)
        } else if let Some(n) = s.strip_suffix("vh") {
            (n, Self::Vh)
        } else {
            (s, Self::Px)
        };
        num.trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ctor)
            .ok_or(())
    }
}

const LENGTH_EXPECTED: &str = "a length like 16, '16px', '1em', '50%' or 'auto'";

struct LengthVisitor;

impl de::Visitor<'_> for LengthVisitor {
    type Value = Length;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(LENGTH_EXPECTED)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Length, E> {
        Ok(Length::Px(v as f32))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Length, E> {
        Ok(Length::Px(v as f32))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Length, E> {
        Ok(Length::Px(v as f32))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Length, E> {
        v.parse()
            .map_err(|_| E::custom(format!("invalid value '{v}', expected {LENGTH_EXPECTED}")))
    }
}

impl<'de> Deserialize<'de> for Length {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(LengthVisitor)
    }
}

/// Four-sided shorthand (`padding`, `margin`) with CSS's 1-4 value expansion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Sides {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Sides {
    fn uniform(v: Length) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

impl<'de> Deserialize<'de> for Sides {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct SidesVisitor;

        impl de::Visitor<'_> for SidesVisitor {
            type Value = Sides;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("one to four lengths")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Sides, E> {
                LengthVisitor.visit_i64(v).map(Sides::uniform)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Sides, E> {
                LengthVisitor.visit_u64(v).map(Sides::uniform)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Sides, E> {
                LengthVisitor.visit_f64(v).map(Sides::uniform)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Sides, E> {
                let parts = v
                    .split_whitespace()
                    .map(|p| LengthVisitor.visit_str::<E>(p))
                    .collect::<Result<Vec<_>, E>>()?;
                match parts.as_slice() {
                    [a] => Ok(Sides::uniform(*a)),
                    [a, b] => Ok(Sides {
                        top: *a,
                        right: *b,
                        bottom: *a,
                        left: *b,
                    }),
                    [a, b, c] => Ok(Sides {
                        top: *a,
                        right: *b,
                        bottom: *c,
                        left: *b,
                    }),
                    [a, b, c, d] => Ok(Sides {
                        top: *a,
                        right: *b,
                        bottom: *c,
                        left: *d,
                    }),
                    _ => Err(E::custom(format!(
                        "invalid value '{v}', expected one to four lengths"
                    ))),
                }
            }
        }

        d.deserialize_any(SidesVisitor)
    }
}

/// Non-premultiplied RGBA8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Color(pub [u8; 4]);

impl Color {
    pub(crate) const BLACK: Self = Self([0, 0, 0, 255]);
    pub(crate) const TRANSPARENT: Self = Self([0, 0, 0, 0]);
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|r| r.strip_suffix(')'))
        {
            let parts = split_args(args);
            let channel = |p: &str| -> Result<u8, ()> {
                let v: f32 = p.trim().parse().map_err(|_| ())?;
                Ok(v.clamp(0.0, 255.0).round() as u8)
            };
            return match parts.as_slice() {
                [r, g, b] => Ok(Self([channel(r)?, channel(g)?, channel(b)?, 255])),
                [r, g, b, a] => Ok(Self([channel(r)?, channel(g)?, channel(b)?, alpha(a)?])),
                _ => Err(()),
            };
        }
        if let Some(args) = s
            .strip_prefix("hsla(")
            .or_else(|| s.strip_prefix("hsl("))
            .and_then(|r| r.strip_suffix(')'))
        {
            let parts = split_args(args);
            let (h, sat, l, a) = match parts.as_slice() {
                [h, s, l] => (*h, *s, *l, None),
                [h, s, l, a] => (*h, *s, *l, Some(*a)),
                _ => return Err(()),
            };
            let h: f32 = h.trim_end_matches("deg").parse().map_err(|_| ())?;
            let pct = |p: &str| -> Result<f32, ()> {
                let v: f32 = p.trim_end_matches('%').parse().map_err(|_| ())?;
                Ok((v / 100.0).clamp(0.0, 1.0))
            };
            let [r, g, b] = hsl_to_rgb(h, pct(sat)?, pct(l)?);
            let a = a.map(alpha).transpose()?.unwrap_or(255);
            return Ok(Self([r, g, b, a]));
        }
        match s.as_str() {
            "transparent" => Ok(Self::TRANSPARENT),
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self([255, 255, 255, 255])),
            "red" => Ok(Self([255, 0, 0, 255])),
            "green" => Ok(Self([0, 128, 0, 255])),
            "blue" => Ok(Self([0, 0, 255, 255])),
            "yellow" => Ok(Self([255, 255, 0, 255])),
            "gray" | "grey" => Ok(Self([128, 128, 128, 255])),
            _ => Err(()),
        }
    }
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn alpha(p: &str) -> Result<u8, ()> {
    let v = match p.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().map_err(|_| ())? / 100.0,
        None => p.parse::<f32>().map_err(|_| ())?,
    };
    Ok((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_hex(hex: &str) -> Result<Color, ()> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1).ok_or(())?, 16).map_err(|_| ());
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2).ok_or(())?, 16).map_err(|_| ());
    match hex.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len()) {
                *slot = nibble(i)? * 17;
            }
            Ok(Color(out))
        }
        6 | 8 => {
            let mut out = [255u8; 4];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
                *slot = byte(i * 2)?;
            }
            Ok(Color(out))
        }
        _ => Err(()),
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r, g, b].map(|v| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

const COLOR_EXPECTED: &str = "a color like '#ff0000', 'rgb(255, 0, 0)' or 'transparent'";

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct ColorVisitor;

        impl de::Visitor<'_> for ColorVisitor {
            type Value = Color;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(COLOR_EXPECTED)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Color, E> {
                v.parse().map_err(|_| {
                    E::custom(format!("invalid value '{v}', expected {COLOR_EXPECTED}"))
                })
            }
        }

        d.deserialize_str(ColorVisitor)
    }
}

/// A number that may also arrive as a numeric string (`"0.5"`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Number(pub f32);

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct NumberVisitor;

        impl de::Visitor<'_> for NumberVisitor {
            type Value = Number;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Number, E> {
                Ok(Number(v as f32))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Number, E> {
                Ok(Number(v as f32))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Number, E> {
                Ok(Number(v as f32))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Number, E> {
                v.trim()
                    .parse()
                    .map(Number)
                    .map_err(|_| E::custom(format!("invalid value '{v}', expected a number")))
            }
        }

        d.deserialize_any(NumberVisitor)
    }
}

/// Properties the reference engine lays out and paints.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct EngineStyle {
    pub display: Option<Display>,
    pub flex_direction: Option<FlexDirection>,
    pub justify_content: Option<JustifyContent>,
    pub align_items: Option<AlignItems>,
    pub flex_grow: Option<Number>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub padding: Option<Sides>,
    pub padding_top: Option<Length>,
    pub padding_right: Option<Length>,
    pub padding_bottom: Option<Length>,
    pub padding_left: Option<Length>,
    pub margin: Option<Sides>,
    pub margin_top: Option<Length>,
    pub margin_right: Option<Length>,
    pub margin_bottom: Option<Length>,
    pub margin_left: Option<Length>,
    pub gap: Option<Length>,
    pub row_gap: Option<Length>,
    pub column_gap: Option<Length>,
    pub background_color: Option<Color>,
    pub color: Option<Color>,
    pub border_width: Option<Length>,
    pub border_color: Option<Color>,
    pub border_radius: Option<Length>,
    pub opacity: Option<Number>,
    pub font_size: Option<Length>,
    pub text_align: Option<TextAlign>,
    pub object_fit: Option<ObjectFit>,
}

/// Resolved per-side pixel amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub(crate) fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub(crate) fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl EngineStyle {
    pub(crate) fn padding(&self, basis: Option<f32>, m: Metrics) -> Edges {
        edges(
            self.padding,
            [
                self.padding_top,
                self.padding_right,
                self.padding_bottom,
                self.padding_left,
            ],
            basis,
            m,
        )
    }

    pub(crate) fn margin(&self, basis: Option<f32>, m: Metrics) -> Edges {
        edges(
            self.margin,
            [
                self.margin_top,
                self.margin_right,
                self.margin_bottom,
                self.margin_left,
            ],
            basis,
            m,
        )
    }
}

fn edges(
    shorthand: Option<Sides>,
    longhands: [Option<Length>; 4],
    basis: Option<f32>,
    m: Metrics,
) -> Edges {
    let base = shorthand.map(|s| [s.top, s.right, s.bottom, s.left]);
    let px = |i: usize| {
        longhands[i]
            .or(base.map(|b| b[i]))
            .and_then(|l| l.resolve(basis, m))
            .unwrap_or(0.0)
    };
    Edges {
        top: px(0),
        right: px(1),
        bottom: px(2),
        left: px(3),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/style.rs"]
mod tests;
