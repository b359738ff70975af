//! Background render worker.
//!
//! The worker runs on its own thread with a single-threaded runtime and talks to its owner only
//! through JSON messages. It starts `Uninitialized`, moves to `Initializing` while the engine
//! module and fonts load, announces `ready`, and services renders only once `Ready`. Render
//! requests that arrive earlier are dropped without a reply.

pub(crate) mod protocol;
pub(crate) mod runtime;
pub(crate) mod session;

pub use protocol::{InboundMessage, OutboundMessage};
pub use runtime::{WorkerPort, spawn_worker};
pub use session::{WorkerSession, WorkerState};
