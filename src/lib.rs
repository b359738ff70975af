//! rastree compiles declarative component trees into a canonical node IR and renders that IR to
//! images through interchangeable backends.
//!
//! The pipeline is:
//!
//! - Build or deserialize an [`Element`] tree
//! - Compile it with a [`Compiler`] (style resolution, component expansion, image resolution)
//! - Render the resulting [`Node`] through a [`Backend`], usually via an [`Orchestrator`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod backend;
pub(crate) mod compile;
pub(crate) mod component;
pub(crate) mod engine;
pub(crate) mod node;
pub(crate) mod render;
pub(crate) mod share;
pub(crate) mod style;
pub(crate) mod worker;

pub use crate::foundation::core::{AnimationFormat, OutputFormat, RenderOptions, Viewport};
pub use crate::foundation::error::{RastreeError, RastreeResult};

pub use crate::backend::translate::{translate_failure, translate_message};
pub use crate::backend::{
    Backend, BackendHandle, BackendKind, ModuleLoader, NativeBackend, ReferenceModule,
    WasmAsyncBackend, WasmSyncBackend, WorkerBackend, create_backend, to_data_url,
};
pub use crate::compile::Compiler;
pub use crate::compile::assets::{
    AssetFetcher, FsFetcher, HttpFetcher, ImageMode, NoFetch, RoutingFetcher, is_remote,
    normalize_rel_path,
};
pub use crate::component::kind::{ElementKind, NodeCategory};
pub use crate::component::sandbox::{DEFAULT_EXPORT, Sandbox, SandboxLimits};
pub use crate::component::{
    Component, ComponentElement, ComponentRegistry, Element, HostElement, HostProps,
};
pub use crate::engine::{EngineFailure, ErrorCategory, ReferenceRenderer, Renderer};
pub use crate::node::style::{StyleRecord, StyleValue};
pub use crate::node::{
    ContainerNode, ExtensionNode, ImageHandle, ImageNode, ImageSource, Node, TextNode,
};
pub use crate::render::response::MAX_FRAME_DURATION_MS;
pub use crate::render::{
    AnimationFrame, ImageResponse, Orchestrator, OrchestratorConfig, PersistentImageConfig,
};
pub use crate::share::{MAX_SHARE_STATE_BYTES, decode_share_state, encode_share_state};
pub use crate::style::StyleResolver;
pub use crate::style::classes::declarations_for;
pub use crate::style::presets::preset_for;
pub use crate::worker::{
    InboundMessage, OutboundMessage, WorkerPort, WorkerSession, WorkerState, spawn_worker,
};
