use crate::{
    foundation::{
        core::RenderOptions,
        error::{RastreeError, RastreeResult},
    },
    node::Node,
};

/// Messages sent to the worker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Render a node tree.
    Render {
        /// Compiled tree.
        node: Node,
        /// Output options; defaults apply when omitted.
        #[serde(default)]
        options: RenderOptions,
    },
}

/// Messages emitted by the worker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Initialization finished; renders are now serviced.
    Ready,
    /// A render succeeded.
    RenderComplete {
        /// Encoded output as a base64 `data:` URL.
        #[serde(rename = "dataUrl")]
        data_url: String,
        /// Wall time spent rendering, in milliseconds.
        duration: f64,
    },
    /// A render failed; `error` is the failure's display string.
    RenderError {
        /// Failure reason.
        error: String,
    },
}

impl InboundMessage {
    /// Encode for the wire.
    pub fn to_wire(&self) -> RastreeResult<String> {
        serde_json::to_string(self).map_err(|e| RastreeError::serde(e.to_string()))
    }

    /// Decode from the wire. Failures are protocol errors.
    pub fn from_wire(raw: &str) -> RastreeResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| RastreeError::worker_protocol(format!("malformed inbound message: {e}")))
    }
}

impl OutboundMessage {
    /// Encode for the wire.
    pub fn to_wire(&self) -> RastreeResult<String> {
        serde_json::to_string(self).map_err(|e| RastreeError::serde(e.to_string()))
    }

    /// Decode from the wire. Failures are protocol errors.
    pub fn from_wire(raw: &str) -> RastreeResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| RastreeError::worker_protocol(format!("malformed outbound message: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/protocol.rs"]
mod tests;
