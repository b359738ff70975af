use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, anyhow};
use base64::Engine as _;
use futures::future::BoxFuture;

use crate::{
    foundation::error::{RastreeError, RastreeResult},
    node::{ImageHandle, ImageSource},
};

/// How image sources are carried in the compiled IR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageMode {
    /// Keep the source string; the engine resolves it itself.
    Reference,
    /// Fetch bytes during compilation and embed an [`ImageHandle`].
    #[default]
    Prefetch,
}

/// Asynchronous source of image bytes.
pub trait AssetFetcher: Send + Sync {
    /// Fetch the bytes behind `src`.
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>>;
}

/// Fetches asset-root-relative paths from the local filesystem.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used to resolve relative sources.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetFetcher for FsFetcher {
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>> {
        Box::pin(async move {
            if is_remote(src) {
                return Err(RastreeError::validation(format!(
                    "'{src}' is a remote URL; the filesystem fetcher only reads local paths"
                )));
            }
            let rel = src.strip_prefix("file://").unwrap_or(src);
            let path = self.root.join(normalize_rel_path(rel)?);
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("read image bytes from '{}'", path.display()))
                .map_err(RastreeError::from)
        })
    }
}

/// Fetches `http://` and `https://` sources with a shared [`reqwest::Client`].
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher over a preconfigured client (timeouts, proxies, headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(src)
                .send()
                .await
                .map_err(|err| anyhow!("Failed to fetch URL {src}: {err}"))?;
            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!("Failed to fetch URL: {src} (Status: {status})").into());
            }
            let body = response
                .bytes()
                .await
                .map_err(|err| anyhow!("Failed to read body of URL {src}: {err}"))?;
            tracing::debug!(src, bytes = body.len(), "fetched remote image");
            Ok(body.to_vec())
        })
    }
}

/// Sends remote URLs to one fetcher and everything else to another.
#[derive(Clone)]
pub struct RoutingFetcher {
    local: Arc<dyn AssetFetcher>,
    remote: Arc<dyn AssetFetcher>,
}

impl std::fmt::Debug for RoutingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingFetcher").finish_non_exhaustive()
    }
}

impl RoutingFetcher {
    /// Route `http://`/`https://` sources to `remote` and the rest to `local`.
    pub fn new(local: Arc<dyn AssetFetcher>, remote: Arc<dyn AssetFetcher>) -> Self {
        Self { local, remote }
    }

    /// Local files under `root`, remote URLs over HTTP.
    pub fn fs_and_http(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsFetcher::new(root)), Arc::new(HttpFetcher::new()))
    }
}

impl AssetFetcher for RoutingFetcher {
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>> {
        if is_remote(src) {
            self.remote.fetch(src)
        } else {
            self.local.fetch(src)
        }
    }
}

/// Whether `src` is an `http://` or `https://` URL.
pub fn is_remote(src: &str) -> bool {
    let scheme = src.split_once("://").map(|(scheme, _)| scheme);
    matches!(scheme, Some(s) if s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https"))
}

/// Fetcher that refuses every non-`data:` source.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFetch;

impl AssetFetcher for NoFetch {
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>> {
        Box::pin(async move {
            Err(RastreeError::validation(format!(
                "no asset fetcher configured for '{src}'"
            )))
        })
    }
}

/// Resolve an `img` source according to `mode`.
///
/// `data:` URIs are decoded locally in prefetch mode and never reach the fetcher. Remote URLs
/// are always prefetched: engines only resolve local and persistent sources.
pub(crate) async fn resolve_image(
    src: &str,
    mode: ImageMode,
    fetcher: &dyn AssetFetcher,
) -> RastreeResult<ImageSource> {
    match mode {
        ImageMode::Reference if !is_remote(src) => Ok(ImageSource::Url(src.to_string())),
        ImageMode::Reference | ImageMode::Prefetch => {
            let bytes = if src.starts_with("data:") {
                decode_data_uri(src)?
            } else {
                fetcher.fetch(src).await?
            };
            Ok(ImageSource::Binary(ImageHandle::new(bytes)))
        }
    }
}

/// Decode the payload of a `data:` URI.
///
/// Base64 payloads are decoded; other payloads are taken verbatim.
pub(crate) fn decode_data_uri(uri: &str) -> RastreeResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RastreeError::validation("not a data: URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RastreeError::validation("data: URI is missing ','"))?;
    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| RastreeError::validation(format!("invalid base64 in data: URI: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Normalize and validate asset-root-relative paths.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths or parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> RastreeResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(RastreeError::validation("asset path must be non-empty"));
    }
    if s.starts_with('/') || s.contains("://") {
        return Err(RastreeError::validation(format!(
            "asset path '{source}' must be relative"
        )));
    }

    let mut parts = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(RastreeError::validation(format!(
                    "asset path '{source}' must not contain '..'"
                )));
            }
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(RastreeError::validation(
            "asset path must contain a file name",
        ));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/assets.rs"]
mod tests;
