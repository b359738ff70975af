use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::{
    backend::ReferenceModule,
    foundation::core::OutputFormat,
    node::{ContainerNode, style::StyleRecord},
};

struct CountingLoader {
    inner: ReferenceModule,
    calls: AtomicUsize,
    fail_first: bool,
}

impl CountingLoader {
    fn new(fail_first: bool) -> Self {
        Self {
            inner: ReferenceModule::new(),
            calls: AtomicUsize::new(0),
            fail_first,
        }
    }
}

impl ModuleLoader for CountingLoader {
    fn instantiate(&self) -> RastreeResult<BackendHandle> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first && n == 0 {
            return Err(RastreeError::validation("module bytes unavailable"));
        }
        self.inner.instantiate()
    }
}

fn node() -> Node {
    Node::Container(ContainerNode {
        style: Some(StyleRecord::new().with("backgroundColor", "#ff0000")),
        children: vec![],
    })
}

fn options() -> RenderOptions {
    RenderOptions::new(8, 8, OutputFormat::Png).unwrap()
}

#[test]
fn sync_init_runs_once() {
    let loader = Arc::new(CountingLoader::new(false));
    let backend = WasmSyncBackend::new(loader.clone());
    assert!(!backend.is_initialized());
    let first = backend.init().unwrap().clone();
    let second = backend.init().unwrap().clone();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    assert!(backend.render_sync(&node(), &options()).is_ok());
}

#[test]
#[should_panic(expected = "before init")]
fn sync_render_before_init_panics() {
    let backend = WasmSyncBackend::new(Arc::new(CountingLoader::new(false)));
    let _ = backend.render_sync(&node(), &options());
}

#[test]
fn sync_init_failure_is_backend_init_and_retryable() {
    let backend = WasmSyncBackend::new(Arc::new(CountingLoader::new(true)));
    let err = backend.init().unwrap_err();
    assert!(matches!(err, RastreeError::BackendInit(_)));
    assert!(err.to_string().contains("module bytes unavailable"));
    assert!(backend.init().is_ok());
}

#[tokio::test]
async fn async_render_before_ready_is_rejected() {
    let backend = WasmAsyncBackend::new(Arc::new(CountingLoader::new(false)));
    let err = backend.render(node(), options()).await.unwrap_err();
    assert!(matches!(err, RastreeError::BackendInit(_)));
    assert!(backend.handle().is_none());
}

#[tokio::test]
async fn async_ready_resolves_after_init() {
    let loader = Arc::new(CountingLoader::new(false));
    let backend = Arc::new(WasmAsyncBackend::new(loader.clone()));

    let waiter = {
        let backend = backend.clone();
        tokio::spawn(async move { backend.ready().await })
    };
    let (a, b) = tokio::join!(backend.init(), backend.init());
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    waiter.await.unwrap();

    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    assert!(backend.is_initialized());
    assert!(backend.render(node(), options()).await.is_ok());
}

#[tokio::test]
async fn async_init_failure_can_be_retried() {
    let backend = WasmAsyncBackend::new(Arc::new(CountingLoader::new(true)));
    assert!(matches!(
        backend.prepare().await,
        Err(RastreeError::BackendInit(_))
    ));
    assert!(!backend.is_initialized());
    backend.prepare().await.unwrap();
    assert!(backend.handle().is_some());
}
