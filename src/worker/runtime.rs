use std::{sync::Arc, thread::JoinHandle};

use anyhow::Context;
use tokio::sync::mpsc;

use super::{
    protocol::{InboundMessage, OutboundMessage},
    session::WorkerSession,
};
use crate::{
    backend::ModuleLoader,
    foundation::error::{RastreeError, RastreeResult},
};

/// Owner's end of a worker: a JSON message channel in each direction.
///
/// Dropping the port (or calling [`WorkerPort::terminate`]) stops the worker once its current
/// render finishes; replies to in-flight requests are not guaranteed.
#[derive(Debug)]
pub struct WorkerPort {
    inbound: Option<mpsc::UnboundedSender<String>>,
    outbound: mpsc::UnboundedReceiver<String>,
    thread: Option<JoinHandle<()>>,
}

/// Start a worker thread that loads its engine through `loader`.
pub fn spawn_worker(loader: Arc<dyn ModuleLoader>) -> RastreeResult<WorkerPort> {
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let thread = std::thread::Builder::new()
        .name("rastree-worker".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    tracing::error!(error = %err, "failed to build worker runtime");
                    return;
                }
            };
            rt.block_on(run_worker(loader, in_rx, out_tx));
        })
        .context("spawn worker thread")?;
    Ok(WorkerPort {
        inbound: Some(in_tx),
        outbound: out_rx,
        thread: Some(thread),
    })
}

#[tracing::instrument(name = "worker", skip_all)]
async fn run_worker(
    loader: Arc<dyn ModuleLoader>,
    mut inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
) {
    let mut session = WorkerSession::new();
    session.begin_init();
    let mut init = loader.load();

    let handle = loop {
        tokio::select! {
            // Poll the inbox first so that anything queued before init finishes is dropped.
            biased;
            raw = inbound.recv() => match raw {
                Some(raw) => {
                    if let Some(msg) = WorkerSession::decode(&raw) {
                        let _ = session.handle_message(msg);
                    }
                }
                None => return,
            },
            loaded = &mut init => match loaded {
                Ok(handle) => break Arc::new(handle),
                Err(err) => {
                    tracing::error!(error = %err, "worker failed to initialize");
                    return;
                }
            },
        }
    };

    if !emit(&outbound, &session.finish_init(handle)) {
        return;
    }
    tracing::debug!("worker ready");

    while let Some(raw) = inbound.recv().await {
        let Some(msg) = WorkerSession::decode(&raw) else {
            continue;
        };
        if let Some(reply) = session.handle_message(msg)
            && !emit(&outbound, &reply)
        {
            break;
        }
    }
    tracing::debug!("worker stopped");
}

fn emit(outbound: &mpsc::UnboundedSender<String>, msg: &OutboundMessage) -> bool {
    match msg.to_wire() {
        Ok(raw) => outbound.send(raw).is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode worker reply");
            true
        }
    }
}

impl WorkerPort {
    /// Send a typed message.
    pub fn post(&self, msg: &InboundMessage) -> RastreeResult<()> {
        self.post_raw(msg.to_wire()?)
    }

    /// Send a raw wire message as is.
    pub fn post_raw(&self, raw: impl Into<String>) -> RastreeResult<()> {
        let tx = self
            .inbound
            .as_ref()
            .ok_or_else(|| RastreeError::worker_protocol("worker was terminated"))?;
        tx.send(raw.into())
            .map_err(|_| RastreeError::worker_protocol("worker has stopped"))
    }

    /// Next reply, or `None` once the worker has stopped and its outbox is drained.
    pub async fn recv(&mut self) -> Option<OutboundMessage> {
        loop {
            let raw = self.outbound.recv().await?;
            match OutboundMessage::from_wire(&raw) {
                Ok(msg) => return Some(msg),
                Err(err) => tracing::warn!(error = %err, "ignoring worker reply"),
            }
        }
    }

    /// Next reply if one is already queued.
    pub fn try_recv(&mut self) -> Option<OutboundMessage> {
        while let Ok(raw) = self.outbound.try_recv() {
            match OutboundMessage::from_wire(&raw) {
                Ok(msg) => return Some(msg),
                Err(err) => tracing::warn!(error = %err, "ignoring worker reply"),
            }
        }
        None
    }

    /// Close the worker's inbox. Already queued replies remain readable.
    pub fn terminate(&mut self) {
        self.inbound = None;
    }

    /// Whether the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/runtime.rs"]
mod tests;
