/// Convenience result type used across rastree.
pub type RastreeResult<T> = Result<T, RastreeError>;

/// Top-level error taxonomy used by compiler, backend and orchestration APIs.
#[derive(thiserror::Error, Debug)]
pub enum RastreeError {
    /// Invalid caller-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The component tree is malformed or could not be evaluated.
    ///
    /// Compilation never produces a partial tree; the whole render fails.
    #[error("compile error: {message}")]
    Compile {
        /// What the compiler was doing when it failed.
        message: String,
        /// Underlying cause, rendered as a string so it can cross thread boundaries.
        cause: Option<String>,
    },

    /// Reserved: unknown utility classes are currently ignored rather than reported.
    #[error("style resolution error: {0}")]
    StyleResolution(String),

    /// The backend module failed to load or instantiate.
    #[error("backend init error: {0}")]
    BackendInit(String),

    /// The engine rejected the IR. The message is the engine's string, verbatim.
    #[error("{0}")]
    Deserialize(String),

    /// Any other engine failure. The message is the engine's string, verbatim.
    #[error("{0}")]
    Engine(String),

    /// A malformed or unexpected worker message.
    #[error("worker protocol error: {0}")]
    WorkerProtocol(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RastreeError {
    /// Build a [`RastreeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RastreeError::Compile`] value without a cause.
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile {
            message: msg.into(),
            cause: None,
        }
    }

    /// Build a [`RastreeError::Compile`] value carrying the underlying cause.
    pub fn compile_with_cause(msg: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Compile {
            message: msg.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Build a [`RastreeError::BackendInit`] value.
    pub fn backend_init(msg: impl Into<String>) -> Self {
        Self::BackendInit(msg.into())
    }

    /// Build a [`RastreeError::WorkerProtocol`] value.
    pub fn worker_protocol(msg: impl Into<String>) -> Self {
        Self::WorkerProtocol(msg.into())
    }

    /// Build a [`RastreeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error should abort a compilation.
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile { .. })
    }

    /// Underlying cause of a [`RastreeError::Compile`], if any.
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Compile { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
