use futures::future::BoxFuture;

use crate::foundation::error::RastreeResult;

/// Largest frame duration an animation container can carry (24 bits).
pub const MAX_FRAME_DURATION_MS: u32 = 0xff_ffff;

/// HTTP-style render result. The body is produced on first read.
pub struct ImageResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: BoxFuture<'static, RastreeResult<Vec<u8>>>,
}

impl std::fmt::Debug for ImageResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl ImageResponse {
    pub(crate) fn new(
        content_type: &'static str,
        body: BoxFuture<'static, RastreeResult<Vec<u8>>>,
    ) -> Self {
        Self {
            status: 200,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body,
        }
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// All headers, in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of the `content-type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Render and return the payload.
    pub async fn bytes(self) -> RastreeResult<Vec<u8>> {
        self.body.await
    }
}

/// One rendered animation frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Encoded frame.
    pub bytes: Vec<u8>,
    /// Display duration, clamped to [`MAX_FRAME_DURATION_MS`].
    pub duration_ms: u32,
}

impl AnimationFrame {
    /// Frame with its duration clamped to 24 bits.
    pub fn new(bytes: Vec<u8>, duration_ms: u32) -> Self {
        Self {
            bytes,
            duration_ms: duration_ms.min(MAX_FRAME_DURATION_MS),
        }
    }
}
