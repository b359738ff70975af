//! Compact, URL-safe encoding for sharing editor state.

use std::io::Read as _;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::foundation::error::{RastreeError, RastreeResult};

/// Largest decoded state accepted by [`decode_share_state`].
pub const MAX_SHARE_STATE_BYTES: u64 = 1 << 20;

const ZSTD_LEVEL: i32 = 19;

/// Compress `state` and encode it as unpadded URL-safe base64.
pub fn encode_share_state(state: &str) -> RastreeResult<String> {
    let compressed = zstd::encode_all(state.as_bytes(), ZSTD_LEVEL)
        .map_err(|e| RastreeError::validation(format!("compress share state: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Reverse [`encode_share_state`].
pub fn decode_share_state(encoded: &str) -> RastreeResult<String> {
    let compressed = URL_SAFE_NO_PAD
        .decode(encoded.trim())
        .map_err(|e| RastreeError::validation(format!("share state is not valid base64: {e}")))?;
    let decoder = zstd::stream::read::Decoder::new(compressed.as_slice())
        .map_err(|e| RastreeError::validation(format!("decompress share state: {e}")))?;

    let mut out = Vec::new();
    decoder
        .take(MAX_SHARE_STATE_BYTES + 1)
        .read_to_end(&mut out)
        .map_err(|e| RastreeError::validation(format!("decompress share state: {e}")))?;
    if out.len() as u64 > MAX_SHARE_STATE_BYTES {
        return Err(RastreeError::validation(format!(
            "share state exceeds {MAX_SHARE_STATE_BYTES} bytes"
        )));
    }
    String::from_utf8(out)
        .map_err(|_| RastreeError::validation("share state is not valid UTF-8"))
}

#[cfg(test)]
#[path = "../tests/unit/share/share.rs"]
mod tests;
