use std::time::Duration;

use futures::{FutureExt as _, future::BoxFuture};
use tokio::sync::Notify;

use super::*;
use crate::{
    backend::{BackendHandle, ReferenceModule},
    foundation::core::{OutputFormat, RenderOptions},
    node::{Node, TextNode},
};

/// Loader that blocks until the test opens the gate.
struct GatedLoader {
    gate: Arc<Notify>,
}

impl ModuleLoader for GatedLoader {
    fn instantiate(&self) -> RastreeResult<BackendHandle> {
        ReferenceModule::new().instantiate()
    }

    fn load(&self) -> BoxFuture<'_, RastreeResult<BackendHandle>> {
        async move {
            self.gate.notified().await;
            self.instantiate()
        }
        .boxed()
    }
}

struct FailingLoader;

impl ModuleLoader for FailingLoader {
    fn instantiate(&self) -> RastreeResult<BackendHandle> {
        Err(RastreeError::backend_init("no module"))
    }
}

fn render() -> InboundMessage {
    InboundMessage::Render {
        node: Node::Text(TextNode {
            style: None,
            text: "hi".to_string(),
        }),
        options: RenderOptions::new(8, 8, OutputFormat::Png).unwrap(),
    }
}

async fn next(port: &mut WorkerPort) -> Option<OutboundMessage> {
    tokio::time::timeout(Duration::from_secs(10), port.recv())
        .await
        .unwrap()
}

#[tokio::test]
async fn request_sent_before_ready_gets_no_reply() {
    let gate = Arc::new(Notify::new());
    let mut port = spawn_worker(Arc::new(GatedLoader { gate: gate.clone() })).unwrap();

    port.post(&render()).unwrap();
    gate.notify_one();
    assert_eq!(next(&mut port).await, Some(OutboundMessage::Ready));

    port.post(&render()).unwrap();
    assert!(matches!(
        next(&mut port).await,
        Some(OutboundMessage::RenderComplete { .. })
    ));

    port.terminate();
    assert_eq!(next(&mut port).await, None);
    assert!(port.post(&render()).is_err());
}

#[tokio::test]
async fn malformed_messages_are_ignored() {
    let mut port = spawn_worker(Arc::new(ReferenceModule::new())).unwrap();
    assert_eq!(next(&mut port).await, Some(OutboundMessage::Ready));

    port.post_raw("{\"type\":\"paint\"}").unwrap();
    port.post_raw("garbage").unwrap();
    port.post(&render()).unwrap();
    assert!(matches!(
        next(&mut port).await,
        Some(OutboundMessage::RenderComplete { .. })
    ));
    assert!(port.try_recv().is_none());
}

#[tokio::test]
async fn failed_initialization_stops_the_worker() {
    let mut port = spawn_worker(Arc::new(FailingLoader)).unwrap();
    assert_eq!(next(&mut port).await, None);
}
