//! Minimal layout and painting.
//!
//! Containers stack children as blocks, or along a flex axis when `display: flex`. Text is
//! measured with a fixed advance per character and painted as glyph boxes; there is no shaping.

use std::sync::Arc;

use image::{
    RgbaImage,
    imageops::{self, FilterType},
};

use super::{
    EngineFailure,
    style::{
        AlignItems, Color, Display, Edges, EngineStyle, FlexDirection, JustifyContent, Metrics,
        ObjectFit, ROOT_FONT_SIZE, TextAlign, parse_style,
    },
};
use crate::{
    foundation::core::Viewport,
    node::{ImageSource, Node},
};

const ADVANCE: f32 = 0.55;
const LINE_HEIGHT: f32 = 1.2;
const DEBUG_BORDER_BOX: Color = Color([255, 0, 0, 255]);
const DEBUG_CONTENT_BOX: Color = Color([0, 255, 0, 255]);

/// Source of decoded pixels for `Image` nodes.
pub(crate) trait ImageLookup {
    fn image(&self, src: &ImageSource) -> Result<Arc<RgbaImage>, EngineFailure>;
}

/// Lay out and paint `node` onto a transparent canvas of `viewport` size.
///
/// With `debug_border`, every box is outlined after it is painted.
pub(crate) fn rasterize(
    node: &Node,
    viewport: Viewport,
    images: &dyn ImageLookup,
    debug_border: bool,
) -> Result<RgbaImage, EngineFailure> {
    let vp = (viewport.width as f32, viewport.height as f32);
    let cx = LayoutCx {
        viewport: vp,
        images,
    };
    let inherited = Inherited {
        font_size: ROOT_FONT_SIZE,
        color: Color::BLACK,
        text_align: TextAlign::Left,
    };
    let bounds = Bounds {
        avail_w: vp.0,
        avail_h: Some(vp.1),
        forced_w: None,
        shrink: false,
    };
    let mut canvas = RgbaImage::new(viewport.width, viewport.height);
    if let Some(root) = cx.layout(node, bounds, inherited)? {
        let painter = Painter { debug_border };
        painter.paint(&mut canvas, &root, root.margin.left, root.margin.top, 1.0);
    }
    Ok(canvas)
}

#[derive(Clone, Copy)]
struct Inherited {
    font_size: f32,
    color: Color,
    text_align: TextAlign,
}

#[derive(Clone, Copy)]
struct Bounds {
    avail_w: f32,
    avail_h: Option<f32>,
    forced_w: Option<f32>,
    shrink: bool,
}

struct LayoutBox {
    width: f32,
    height: f32,
    margin: Edges,
    /// Border plus padding on each side.
    inset: Edges,
    grow: f32,
    fill: Option<Color>,
    border: Option<(f32, Color)>,
    radius: f32,
    opacity: f32,
    content: Content,
}

impl LayoutBox {
    fn outer_width(&self) -> f32 {
        self.width + self.margin.horizontal()
    }

    fn outer_height(&self) -> f32 {
        self.height + self.margin.vertical()
    }
}

enum Content {
    Empty,
    Children(Vec<Placed>),
    Text(TextRun),
    Image { pixels: ImagePixels, x: f32, y: f32 },
}

/// Visible part of an image box.
enum ImagePixels {
    /// Pre-scaled and cropped pixels.
    Scaled(RgbaImage),
    /// Scaled image too large to materialize; sampled per canvas pixel while painting.
    Sampled {
        source: Arc<RgbaImage>,
        scaled: (u32, u32),
        window: (u32, u32, u32, u32),
    },
}

struct Placed {
    x: f32,
    y: f32,
    layout: LayoutBox,
}

struct TextRun {
    x: f32,
    y: f32,
    inner_w: f32,
    lines: Vec<String>,
    font_size: f32,
    color: Color,
    align: TextAlign,
}

impl TextRun {
    fn advance(&self) -> f32 {
        self.font_size * ADVANCE
    }

    fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT
    }

    fn width(&self) -> f32 {
        self.lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as f32
            * self.advance()
    }
}

struct LayoutCx<'a> {
    viewport: (f32, f32),
    images: &'a dyn ImageLookup,
}

impl LayoutCx<'_> {
    fn layout(
        &self,
        node: &Node,
        b: Bounds,
        parent: Inherited,
    ) -> Result<Option<LayoutBox>, EngineFailure> {
        let style = parse_style(node.style()).map_err(EngineFailure::invalid_arg)?;
        if style.display == Some(Display::None) {
            return Ok(None);
        }

        let parent_metrics = Metrics {
            font_size: parent.font_size,
            viewport: self.viewport,
        };
        let font_size = style
            .font_size
            .and_then(|l| l.resolve(Some(parent.font_size), parent_metrics))
            .unwrap_or(parent.font_size);
        let m = Metrics {
            font_size,
            viewport: self.viewport,
        };
        let inherited = Inherited {
            font_size,
            color: style.color.unwrap_or(parent.color),
            text_align: style.text_align.unwrap_or(parent.text_align),
        };

        let margin = style.margin(Some(b.avail_w), m);
        let padding = style.padding(Some(b.avail_w), m);
        let border_w = style
            .border_width
            .and_then(|l| l.resolve(None, m))
            .unwrap_or(0.0)
            .max(0.0);
        let chrome_w = padding.horizontal() + 2.0 * border_w;
        let chrome_h = padding.vertical() + 2.0 * border_w;
        let origin = (border_w + padding.left, border_w + padding.top);

        let mut explicit_w = b
            .forced_w
            .or_else(|| style.width.and_then(|l| l.resolve(Some(b.avail_w), m)));
        let mut explicit_h = style.height.and_then(|l| l.resolve(b.avail_h, m));
        if let Node::Image(img) = node {
            explicit_w = explicit_w.or(img.width);
            explicit_h = explicit_h.or(img.height);
        }
        let fill_w = (b.avail_w - margin.horizontal()).max(0.0);
        let inner_w = (explicit_w.unwrap_or(fill_w) - chrome_w).max(0.0);
        let inner_h = explicit_h.map(|h| (h - chrome_h).max(0.0));

        let (mut content, content_w, content_h) = match node {
            Node::Text(t) => {
                let run = TextRun {
                    x: origin.0,
                    y: origin.1,
                    inner_w,
                    lines: wrap(&t.text, inner_w, font_size * ADVANCE),
                    font_size,
                    color: inherited.color,
                    align: inherited.text_align,
                };
                let (w, h) = (run.width(), run.lines.len() as f32 * run.line_height());
                (Content::Text(run), w, h)
            }
            Node::Image(img) => {
                let pixels = self.images.image(&img.src)?;
                let size = (
                    explicit_w.map(|w| (w - chrome_w).max(0.0)),
                    inner_h,
                );
                let budget = 4 * (self.viewport.0 * self.viewport.1).max(1.0) as u64;
                image_content(pixels, size, style.object_fit, origin, budget)
            }
            Node::Container(c) => self.flow(&c.children, &style, inner_w, inner_h, origin, inherited, m)?,
            Node::Extension(e) => self.flow(&e.children, &style, inner_w, inner_h, origin, inherited, m)?,
        };

        let intrinsic = b.shrink || matches!(node, Node::Text(_) | Node::Image(_));
        let width = explicit_w.unwrap_or(if intrinsic {
            content_w + chrome_w
        } else {
            fill_w
        });
        let height = explicit_h.unwrap_or(content_h + chrome_h);
        if let Content::Text(run) = &mut content {
            run.inner_w = (width - chrome_w).max(0.0);
        }

        Ok(Some(LayoutBox {
            width,
            height,
            margin,
            inset: Edges {
                top: padding.top + border_w,
                right: padding.right + border_w,
                bottom: padding.bottom + border_w,
                left: padding.left + border_w,
            },
            grow: style.flex_grow.map(|n| n.0.max(0.0)).unwrap_or(0.0),
            fill: style.background_color,
            border: (border_w > 0.0).then(|| (border_w, style.border_color.unwrap_or(inherited.color))),
            radius: style
                .border_radius
                .and_then(|l| l.resolve(Some(width.min(height)), m))
                .unwrap_or(0.0),
            opacity: style.opacity.map(|n| n.0.clamp(0.0, 1.0)).unwrap_or(1.0),
            content,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn flow(
        &self,
        children: &[Node],
        style: &EngineStyle,
        inner_w: f32,
        inner_h: Option<f32>,
        origin: (f32, f32),
        inherited: Inherited,
        m: Metrics,
    ) -> Result<(Content, f32, f32), EngineFailure> {
        let flex = style.display == Some(Display::Flex);
        let direction = if flex {
            style.flex_direction.unwrap_or(FlexDirection::Row)
        } else {
            FlexDirection::Column
        };
        let row = matches!(direction, FlexDirection::Row | FlexDirection::RowReverse);
        let align = style.align_items.unwrap_or(AlignItems::Stretch);
        let stretch = matches!(align, AlignItems::Stretch | AlignItems::Normal);
        let gap = if row {
            style.column_gap.or(style.gap)
        } else {
            style.row_gap.or(style.gap)
        }
        .and_then(|l| l.resolve(Some(inner_w), m))
        .unwrap_or(0.0);

        let bounds = Bounds {
            avail_w: inner_w,
            avail_h: inner_h,
            forced_w: None,
            shrink: row || (flex && !stretch),
        };
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            if let Some(l) = self.layout(child, bounds, inherited)? {
                items.push((child, l));
            }
        }

        let n = items.len();
        let gaps = gap * n.saturating_sub(1) as f32;
        if row {
            let used: f32 = items.iter().map(|(_, l)| l.outer_width()).sum::<f32>() + gaps;
            let free = inner_w - used;
            let total_grow: f32 = items.iter().map(|(_, l)| l.grow).sum();
            if free > 0.0 && total_grow > 0.0 {
                for (child, l) in items.iter_mut() {
                    if l.grow > 0.0 {
                        let forced = l.width + free * l.grow / total_grow;
                        let bounds = Bounds {
                            forced_w: Some(forced),
                            ..bounds
                        };
                        if let Some(grown) = self.layout(child, bounds, inherited)? {
                            *l = grown;
                        }
                    }
                }
            }
        }
        let mut boxes: Vec<LayoutBox> = items.into_iter().map(|(_, l)| l).collect();
        if matches!(
            direction,
            FlexDirection::RowReverse | FlexDirection::ColumnReverse
        ) {
            boxes.reverse();
        }

        let main_of = |l: &LayoutBox| if row { l.outer_width() } else { l.outer_height() };
        let cross_of = |l: &LayoutBox| if row { l.outer_height() } else { l.outer_width() };
        let total_main: f32 = boxes.iter().map(main_of).sum::<f32>() + gaps;
        let max_cross = boxes.iter().map(cross_of).fold(0.0_f32, f32::max);
        let main_size = if row { Some(inner_w) } else { inner_h };
        let cross_size = if row { inner_h.unwrap_or(max_cross) } else { inner_w };
        let free = main_size.map(|s| (s - total_main).max(0.0)).unwrap_or(0.0);
        let (mut cursor, between) = distribute(style.justify_content, free, n);

        let mut placed = Vec::with_capacity(n);
        for layout in boxes {
            let cross_off = if flex {
                let slack = cross_size - cross_of(&layout);
                match align {
                    AlignItems::Center => slack / 2.0,
                    AlignItems::End | AlignItems::FlexEnd => slack,
                    _ => 0.0,
                }
            } else {
                0.0
            };
            let main = main_of(&layout);
            let (x, y) = if row {
                (cursor, cross_off)
            } else {
                (cross_off, cursor)
            };
            placed.push(Placed {
                x: origin.0 + x + layout.margin.left,
                y: origin.1 + y + layout.margin.top,
                layout,
            });
            cursor += main + gap + between;
        }

        let (w, h) = if row {
            (total_main, max_cross)
        } else {
            (max_cross, total_main)
        };
        Ok((Content::Children(placed), w, h))
    }
}

fn distribute(justify: Option<JustifyContent>, free: f32, n: usize) -> (f32, f32) {
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f32;
    match justify {
        Some(JustifyContent::End | JustifyContent::FlexEnd) => (free, 0.0),
        Some(JustifyContent::Center) => (free / 2.0, 0.0),
        Some(JustifyContent::SpaceBetween) if n > 1.0 => (0.0, free / (n - 1.0)),
        Some(JustifyContent::SpaceAround) => (free / n / 2.0, free / n),
        Some(JustifyContent::SpaceEvenly) => (free / (n + 1.0), free / (n + 1.0)),
        _ => (0.0, 0.0),
    }
}

/// Greedy word wrap on a fixed per-character advance.
fn wrap(text: &str, avail: f32, advance: f32) -> Vec<String> {
    let per_line = if advance > 0.0 {
        ((avail / advance).floor() as usize).max(1)
    } else {
        usize::MAX
    };
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0usize;
        for word in paragraph.split_whitespace() {
            let wlen = word.chars().count();
            if len > 0 && len + 1 + wlen > per_line {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.push_str(word);
            len += wlen;
            while len > per_line {
                let head: String = line.chars().take(per_line).collect();
                line = line.chars().skip(per_line).collect();
                len -= per_line;
                lines.push(head);
            }
        }
        lines.push(line);
    }
    lines
}

/// `budget` caps the pixel count of a materialized scaled image.
fn image_content(
    source: Arc<RgbaImage>,
    size: (Option<f32>, Option<f32>),
    fit: Option<ObjectFit>,
    origin: (f32, f32),
    budget: u64,
) -> (Content, f32, f32) {
    let (iw, ih) = (source.width() as f32, source.height() as f32);
    let (cw, ch) = match size {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, if iw > 0.0 { w * ih / iw } else { 0.0 }),
        (None, Some(h)) => (if ih > 0.0 { h * iw / ih } else { 0.0 }, h),
        (None, None) => (iw, ih),
    };
    if cw < 1.0 || ch < 1.0 || iw < 1.0 || ih < 1.0 {
        return (Content::Empty, cw.max(0.0), ch.max(0.0));
    }

    let (sw, sh) = match fit.unwrap_or(ObjectFit::Fill) {
        ObjectFit::Fill => (cw, ch),
        ObjectFit::Contain => {
            let s = (cw / iw).min(ch / ih);
            (iw * s, ih * s)
        }
        ObjectFit::Cover => {
            let s = (cw / iw).max(ch / ih);
            (iw * s, ih * s)
        }
        ObjectFit::None => (iw, ih),
        ObjectFit::ScaleDown => {
            let s = (cw / iw).min(ch / ih).min(1.0);
            (iw * s, ih * s)
        }
    };
    let (sw, sh) = (
        (sw.round().min(u32::MAX as f32) as u32).max(1),
        (sh.round().min(u32::MAX as f32) as u32).max(1),
    );
    let (bw, bh) = (
        cw.round().min(u32::MAX as f32) as u32,
        ch.round().min(u32::MAX as f32) as u32,
    );
    let (vw, vh) = (sw.min(bw), sh.min(bh));
    let (wx, wy) = ((sw - vw) / 2, (sh - vh) / 2);

    let pixels = if u64::from(sw) * u64::from(sh) <= budget {
        let scaled = if (sw, sh) == source.dimensions() {
            RgbaImage::clone(&source)
        } else {
            imageops::resize(&*source, sw, sh, FilterType::Triangle)
        };
        ImagePixels::Scaled(imageops::crop_imm(&scaled, wx, wy, vw, vh).to_image())
    } else {
        ImagePixels::Sampled {
            source,
            scaled: (sw, sh),
            window: (wx, wy, vw, vh),
        }
    };
    let content = Content::Image {
        pixels,
        x: origin.0 + (cw - vw as f32) / 2.0,
        y: origin.1 + (ch - vh as f32) / 2.0,
    };
    (content, cw, ch)
}

fn paint_image(canvas: &mut RgbaImage, pixels: &ImagePixels, ox: i64, oy: i64, opacity: f32) {
    match pixels {
        ImagePixels::Scaled(pixels) => {
            for (px, py, p) in pixels.enumerate_pixels() {
                blend(canvas, ox + px as i64, oy + py as i64, p.0, opacity);
            }
        }
        ImagePixels::Sampled {
            source,
            scaled: (sw, sh),
            window: (wx, wy, vw, vh),
        } => {
            let x0 = ox.max(0);
            let y0 = oy.max(0);
            let x1 = (ox + i64::from(*vw)).min(i64::from(canvas.width()));
            let y1 = (oy + i64::from(*vh)).min(i64::from(canvas.height()));
            for cy in y0..y1 {
                let v = (f64::from(*wy) + (cy - oy) as f64 + 0.5) / f64::from(*sh);
                for cx in x0..x1 {
                    let u = (f64::from(*wx) + (cx - ox) as f64 + 0.5) / f64::from(*sw);
                    if let Some(p) = imageops::sample_bilinear(&**source, u as f32, v as f32) {
                        blend(canvas, cx, cy, p.0, opacity);
                    }
                }
            }
        }
    }
}

struct Painter {
    debug_border: bool,
}

impl Painter {
    fn paint(&self, canvas: &mut RgbaImage, layout: &LayoutBox, x: f32, y: f32, opacity: f32) {
        let opacity = opacity * layout.opacity;
        if opacity <= 0.0 {
            return;
        }
        let (w, h, r) = (layout.width, layout.height, layout.radius);
        if let Some(fill) = layout.fill {
            fill_rect(canvas, (x, y, w, h), r, fill, opacity, None);
        }
        if let Some((bw, color)) = layout.border {
            let inner = (x + bw, y + bw, w - 2.0 * bw, h - 2.0 * bw);
            fill_rect(canvas, (x, y, w, h), r, color, opacity, Some((inner, (r - bw).max(0.0))));
        }
        match &layout.content {
            Content::Empty => {}
            Content::Children(children) => {
                for child in children {
                    self.paint(canvas, &child.layout, x + child.x, y + child.y, opacity);
                }
            }
            Content::Text(run) => paint_text(canvas, run, x, y, opacity),
            Content::Image { pixels, x: ix, y: iy } => {
                let (ox, oy) = ((x + ix).round() as i64, (y + iy).round() as i64);
                paint_image(canvas, pixels, ox, oy, opacity);
            }
        }
        if self.debug_border {
            let inset = &layout.inset;
            outline(canvas, (x, y, w, h), DEBUG_BORDER_BOX);
            let content = (
                x + inset.left,
                y + inset.top,
                w - inset.horizontal(),
                h - inset.vertical(),
            );
            outline(canvas, content, DEBUG_CONTENT_BOX);
        }
    }
}

/// 1px opaque ring just inside `rect`.
fn outline(canvas: &mut RgbaImage, rect: Rect, color: Color) {
    let (x, y, w, h) = rect;
    let inner = (x + 1.0, y + 1.0, w - 2.0, h - 2.0);
    fill_rect(canvas, rect, 0.0, color, 1.0, Some((inner, 0.0)));
}

fn paint_text(canvas: &mut RgbaImage, run: &TextRun, x: f32, y: f32, opacity: f32) {
    let advance = run.advance();
    let lh = run.line_height();
    for (i, line) in run.lines.iter().enumerate() {
        let line_w = line.chars().count() as f32 * advance;
        let offset = match run.align {
            TextAlign::Center => (run.inner_w - line_w) / 2.0,
            TextAlign::Right | TextAlign::End => run.inner_w - line_w,
            _ => 0.0,
        }
        .max(0.0);
        let top = y + run.y + i as f32 * lh + lh * 0.25;
        for (j, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = x + run.x + offset + j as f32 * advance + advance * 0.15;
            let glyph = (left, top, advance * 0.7, run.font_size * 0.6);
            fill_rect(canvas, glyph, 0.0, run.color, opacity, None);
        }
    }
}

type Rect = (f32, f32, f32, f32);

/// Fill a rounded rect, optionally excluding an inner rounded rect (for borders).
fn fill_rect(
    canvas: &mut RgbaImage,
    rect: Rect,
    radius: f32,
    color: Color,
    opacity: f32,
    hole: Option<(Rect, f32)>,
) {
    let (x, y, w, h) = rect;
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let x0 = x.floor().max(0.0) as i64;
    let y0 = y.floor().max(0.0) as i64;
    let x1 = ((x + w).ceil() as i64).min(canvas.width() as i64);
    let y1 = ((y + h).ceil() as i64).min(canvas.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
            if !inside(cx, cy, rect, radius) {
                continue;
            }
            if let Some((inner, r)) = hole
                && inside(cx, cy, inner, r)
            {
                continue;
            }
            blend(canvas, px, py, color.0, opacity);
        }
    }
}

fn inside(px: f32, py: f32, (x, y, w, h): Rect, radius: f32) -> bool {
    if w <= 0.0 || h <= 0.0 || px < x || py < y || px >= x + w || py >= y + h {
        return false;
    }
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return true;
    }
    let cx = px.clamp(x + r, x + w - r);
    let cy = py.clamp(y + r, y + h - r);
    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
}

/// Source-over blend of a non-premultiplied color.
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, src: [u8; 4], opacity: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let sa = f32::from(src[3]) / 255.0 * opacity;
    if sa <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let da = f32::from(dst[3]) / 255.0;
    let oa = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa)) / oa;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (oa * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
#[path = "../../tests/unit/engine/paint.rs"]
mod tests;
