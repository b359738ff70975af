//! Render orchestration: compile, pick a backend, render, assemble a response.

pub(crate) mod config;
pub(crate) mod orchestrator;
pub(crate) mod response;

pub use config::{OrchestratorConfig, PersistentImageConfig};
pub use orchestrator::Orchestrator;
pub use response::{AnimationFrame, ImageResponse};
