use std::{sync::Arc, time::Instant};

use super::protocol::{InboundMessage, OutboundMessage};
use crate::{
    backend::{BackendHandle, to_data_url},
    foundation::core::RenderOptions,
    node::Node,
};

/// Worker lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Nothing loaded yet.
    Uninitialized,
    /// Module and fonts are loading.
    Initializing,
    /// Renders are serviced.
    Ready,
}

/// Worker-side protocol state machine, independent of any transport.
#[derive(Debug)]
pub struct WorkerSession {
    state: WorkerState,
    handle: Option<Arc<BackendHandle>>,
}

impl Default for WorkerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerSession {
    /// Fresh, uninitialized session.
    pub fn new() -> Self {
        Self {
            state: WorkerState::Uninitialized,
            handle: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Enter `Initializing`.
    pub fn begin_init(&mut self) {
        self.state = WorkerState::Initializing;
    }

    /// Enter `Ready` with a loaded engine; returns the announcement to emit.
    pub fn finish_init(&mut self, handle: Arc<BackendHandle>) -> OutboundMessage {
        self.handle = Some(handle);
        self.state = WorkerState::Ready;
        OutboundMessage::Ready
    }

    /// Decode a raw message, logging and discarding malformed input.
    pub fn decode(raw: &str) -> Option<InboundMessage> {
        match InboundMessage::from_wire(raw) {
            Ok(msg) => Some(msg),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring worker message");
                None
            }
        }
    }

    /// Service one request. Returns exactly one reply when `Ready`, nothing otherwise.
    pub fn handle_message(&self, msg: InboundMessage) -> Option<OutboundMessage> {
        let handle = match (&self.handle, self.state) {
            (Some(handle), WorkerState::Ready) => handle,
            _ => {
                tracing::debug!(state = ?self.state, "dropping render request before ready");
                return None;
            }
        };
        match msg {
            InboundMessage::Render { node, options } => Some(render(handle, &node, &options)),
        }
    }
}

fn render(handle: &BackendHandle, node: &Node, options: &RenderOptions) -> OutboundMessage {
    let started = Instant::now();
    match handle.render(node, options) {
        Ok(bytes) => OutboundMessage::RenderComplete {
            data_url: to_data_url(options.format, &bytes),
            duration: started.elapsed().as_secs_f64() * 1000.0,
        },
        Err(err) => OutboundMessage::RenderError {
            error: err.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/session.rs"]
mod tests;
