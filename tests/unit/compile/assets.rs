use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

use super::*;

/// Answers with its own tag so tests can see which side of a router was used.
struct Tagged(&'static str);

impl AssetFetcher for Tagged {
    fn fetch<'a>(&'a self, _: &'a str) -> BoxFuture<'a, RastreeResult<Vec<u8>>> {
        Box::pin(async move { Ok(self.0.as_bytes().to_vec()) })
    }
}

/// One-shot HTTP/1.1 server on an ephemeral port; returns the URL of `/a.png`.
async fn serve_once(status: &'static str, body: &'static [u8]) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0_u8; 512];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/a.png")
}

fn http() -> HttpFetcher {
    HttpFetcher::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

#[test]
fn normalize_rel_path_cleans_and_rejects() {
    assert_eq!(normalize_rel_path("./img//a.png").unwrap(), "img/a.png");
    assert_eq!(normalize_rel_path("img\\b.png").unwrap(), "img/b.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("a/../../b").is_err());
    assert!(normalize_rel_path("https://x/y.png").is_err());
    assert!(normalize_rel_path("./").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn data_uris_decode_base64_and_plain() {
    assert_eq!(
        decode_data_uri("data:image/png;base64,AQID").unwrap(),
        vec![1, 2, 3]
    );
    assert_eq!(decode_data_uri("data:text/plain,hi").unwrap(), b"hi");
    assert!(decode_data_uri("data:image/png;base64").is_err());
    assert!(decode_data_uri("image.png").is_err());
}

#[tokio::test]
async fn reference_mode_keeps_source() {
    let src = resolve_image("logo.png", ImageMode::Reference, &NoFetch)
        .await
        .unwrap();
    assert_eq!(src, ImageSource::Url("logo.png".to_string()));
}

#[tokio::test]
async fn prefetch_mode_decodes_data_uri_without_fetcher() {
    let src = resolve_image("data:x;base64,AQID", ImageMode::Prefetch, &NoFetch)
        .await
        .unwrap();
    let ImageSource::Binary(handle) = src else {
        panic!("expected binary source");
    };
    assert_eq!(handle.bytes(), &[1, 2, 3]);
}

#[tokio::test]
async fn fs_fetcher_reads_under_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.bin"), [9_u8, 8]).unwrap();
    let fetcher = FsFetcher::new(dir.path());
    assert_eq!(fetcher.fetch("a.bin").await.unwrap(), vec![9, 8]);
    assert_eq!(fetcher.fetch("file://a.bin").await.unwrap(), vec![9, 8]);
    assert!(fetcher.fetch("../a.bin").await.is_err());
    assert!(fetcher.fetch("missing.bin").await.is_err());
}

#[test]
fn remote_detection_is_scheme_based() {
    assert!(is_remote("https://example.com/a.png"));
    assert!(is_remote("HTTP://example.com/a.png"));
    assert!(!is_remote("file://a.png"));
    assert!(!is_remote("img/a.png"));
    assert!(!is_remote("data:image/png;base64,AQID"));
}

#[tokio::test]
async fn router_sends_urls_by_scheme() {
    let router = RoutingFetcher::new(Arc::new(Tagged("local")), Arc::new(Tagged("remote")));
    assert_eq!(router.fetch("https://example.com/a.png").await.unwrap(), b"remote");
    assert_eq!(router.fetch("Http://example.com/a.png").await.unwrap(), b"remote");
    assert_eq!(router.fetch("img/a.png").await.unwrap(), b"local");
    assert_eq!(router.fetch("file://img/a.png").await.unwrap(), b"local");
}

#[tokio::test]
async fn fs_fetcher_names_remote_urls() {
    let err = FsFetcher::new(".")
        .fetch("https://example.com/a.png")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("remote URL"), "{err}");
}

#[tokio::test]
async fn http_fetcher_reads_body() {
    let url = serve_once("200 OK", b"\x89PNG-ish").await;
    assert_eq!(http().fetch(&url).await.unwrap(), b"\x89PNG-ish");
}

#[tokio::test]
async fn http_fetcher_rejects_error_status() {
    let url = serve_once("404 Not Found", b"nope").await;
    let err = http().fetch(&url).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Failed to fetch URL"), "{msg}");
    assert!(msg.contains("404"), "{msg}");
}

#[tokio::test]
async fn remote_sources_are_prefetched_in_reference_mode() {
    let url = serve_once("200 OK", b"pixels").await;
    let router = RoutingFetcher::new(Arc::new(NoFetch), Arc::new(http()));
    let src = resolve_image(&url, ImageMode::Reference, &router).await.unwrap();
    let ImageSource::Binary(handle) = src else {
        panic!("expected binary source");
    };
    assert_eq!(handle.bytes(), b"pixels");
}
