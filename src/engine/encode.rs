use std::borrow::Cow;

use anyhow::{Context as _, bail, ensure};
use image::{
    ExtendedColorType, ImageEncoder, RgbaImage,
    codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder},
};

use crate::foundation::core::{AnimationFormat, OutputFormat};

pub(crate) const DEFAULT_JPEG_QUALITY: u8 = 75;

const U24_MAX: u32 = 0xff_ffff;

/// Encode `image` as `format`. Opaque images are written without an alpha channel.
pub(crate) fn encode(
    image: &RgbaImage,
    format: OutputFormat,
    quality: Option<u8>,
) -> anyhow::Result<Vec<u8>> {
    let (w, h) = image.dimensions();
    let mut out = Vec::new();
    match format {
        OutputFormat::Raw => return Ok(image.as_raw().clone()),
        OutputFormat::Jpeg => {
            let rgb = strip_alpha(image);
            JpegEncoder::new_with_quality(&mut out, quality.unwrap_or(DEFAULT_JPEG_QUALITY))
                .write_image(&rgb, w, h, ExtendedColorType::Rgb8)?;
        }
        OutputFormat::Png => {
            let (data, color) = packed(image);
            PngEncoder::new(&mut out).write_image(&data, w, h, color)?;
        }
        OutputFormat::WebP => {
            let (data, color) = packed(image);
            WebPEncoder::new_lossless(&mut out).write_image(&data, w, h, color)?;
        }
    }
    Ok(out)
}

fn packed(image: &RgbaImage) -> (Cow<'_, [u8]>, ExtendedColorType) {
    if image.as_raw().chunks_exact(4).any(|px| px[3] != u8::MAX) {
        (Cow::Borrowed(image.as_raw().as_slice()), ExtendedColorType::Rgba8)
    } else {
        (Cow::Owned(strip_alpha(image)), ExtendedColorType::Rgb8)
    }
}

fn strip_alpha(image: &RgbaImage) -> Vec<u8> {
    let raw = image.as_raw();
    let mut rgb = Vec::with_capacity(raw.len() / 4 * 3);
    for px in raw.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

/// Encode `frames` (pixels plus display time in milliseconds) as one looping animation.
///
/// Every frame must share the first frame's dimensions.
pub(crate) fn encode_animation(
    frames: &[(RgbaImage, u32)],
    format: AnimationFormat,
) -> anyhow::Result<Vec<u8>> {
    let Some((first, _)) = frames.first() else {
        bail!("animation needs at least one frame");
    };
    let dims = first.dimensions();
    for (i, (frame, _)) in frames.iter().enumerate() {
        ensure!(
            frame.dimensions() == dims,
            "frame {i} is {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            dims.0,
            dims.1
        );
    }
    match format {
        AnimationFormat::WebP => animated_webp(frames),
        AnimationFormat::Apng => animated_png(frames),
    }
}

/// APNG with a per-frame delay; delays above `u16::MAX` ms are clamped.
fn animated_png(frames: &[(RgbaImage, u32)]) -> anyhow::Result<Vec<u8>> {
    let (w, h) = frames[0].0.dimensions();
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, w, h);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_animated(u32::try_from(frames.len())?, 0)?;
    let mut writer = encoder.write_header().context("write APNG header")?;
    for (i, (frame, duration_ms)) in frames.iter().enumerate() {
        let delay = u16::try_from(*duration_ms).unwrap_or(u16::MAX);
        writer.set_frame_delay(delay, 1000)?;
        writer
            .write_image_data(frame.as_raw())
            .with_context(|| format!("write APNG frame {i}"))?;
    }
    writer.finish().context("finish APNG stream")?;
    Ok(out)
}

/// Animated WebP: a `VP8X` header, a looping `ANIM` chunk, then one lossless `ANMF` per frame.
fn animated_webp(frames: &[(RgbaImage, u32)]) -> anyhow::Result<Vec<u8>> {
    let (w, h) = frames[0].0.dimensions();
    let mut chunks = Vec::new();

    chunks.extend_from_slice(b"VP8X");
    chunks.extend_from_slice(&10u32.to_le_bytes());
    // animation + alpha
    chunks.push((1 << 1) | (1 << 4));
    chunks.extend_from_slice(&[0; 3]);
    chunks.extend_from_slice(&(w - 1).to_le_bytes()[..3]);
    chunks.extend_from_slice(&(h - 1).to_le_bytes()[..3]);

    chunks.extend_from_slice(b"ANIM");
    chunks.extend_from_slice(&6u32.to_le_bytes());
    // background color, then loop count (0 = forever)
    chunks.extend_from_slice(&[0; 4]);
    chunks.extend_from_slice(&0u16.to_le_bytes());

    for (i, (frame, duration_ms)) in frames.iter().enumerate() {
        let mut still = Vec::new();
        image_webp::WebPEncoder::new(&mut still)
            .encode(frame.as_raw(), w, h, image_webp::ColorType::Rgba8)
            .with_context(|| format!("encode WebP frame {i}"))?;
        let payload = vp8l_payload(&still)?;
        let padded = payload.len() + (payload.len() & 1);

        chunks.extend_from_slice(b"ANMF");
        chunks.extend_from_slice(&u32::try_from(16 + 8 + padded)?.to_le_bytes());
        // x and y offsets
        chunks.extend_from_slice(&[0; 6]);
        chunks.extend_from_slice(&(w - 1).to_le_bytes()[..3]);
        chunks.extend_from_slice(&(h - 1).to_le_bytes()[..3]);
        chunks.extend_from_slice(&(*duration_ms).min(U24_MAX).to_le_bytes()[..3]);
        // replace the canvas instead of alpha-blending over the previous frame
        chunks.push(1 << 1);

        chunks.extend_from_slice(b"VP8L");
        chunks.extend_from_slice(&u32::try_from(payload.len())?.to_le_bytes());
        chunks.extend_from_slice(payload);
        if payload.len() & 1 == 1 {
            chunks.push(0);
        }
    }

    let mut out = Vec::with_capacity(chunks.len() + 12);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&u32::try_from(4 + chunks.len())?.to_le_bytes());
    out.extend_from_slice(b"WEBP");
    out.extend_from_slice(&chunks);
    Ok(out)
}

/// Bitstream of the `VP8L` chunk inside a simple-format WebP file.
fn vp8l_payload(riff: &[u8]) -> anyhow::Result<&[u8]> {
    let mut at = 12;
    while at + 8 <= riff.len() {
        let len = u32::from_le_bytes([riff[at + 4], riff[at + 5], riff[at + 6], riff[at + 7]]) as usize;
        let start = at + 8;
        let Some(payload) = riff.get(start..start + len) else {
            break;
        };
        if &riff[at..at + 4] == b"VP8L" {
            return Ok(payload);
        }
        at = start + len + (len & 1);
    }
    bail!("WebP encoder output has no VP8L chunk")
}

#[cfg(test)]
#[path = "../../tests/unit/engine/encode.rs"]
mod tests;
