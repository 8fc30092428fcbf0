//! Error types for the assistant core.
//!
//! Three layers map to the three ways a run can go wrong: construction-time
//! [`ConfigurationError`]s are fatal and raised before any state mutation;
//! [`DispatchError`]s occur while resolving a tool call and are absorbed into
//! the conversation as the tool's output; [`ModelError`]s and the loop guard
//! abort the run and propagate to the caller.

use thiserror::Error;

/// A fatal error surfaced to the caller of [`Assistant::run`].
///
/// [`Assistant::run`]: crate::assistant::Assistant::run
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Invalid collaborators detected at construction, before any mutation.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The bounded round count was exceeded; the model kept requesting
    /// tools without producing a final response.
    #[error("tool loop exceeded {rounds} rounds without a final response")]
    LoopExceeded { rounds: usize },

    /// The model client failed; the run cannot continue.
    #[error("model request failed: {0}")]
    Model(#[from] ModelError),
}

/// Construction-time validation failure. Never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// `-` separates the tool name from the operation name in composite
    /// identifiers, so it cannot appear in a tool name itself.
    #[error("tool name {0:?} contains the reserved '-' separator")]
    ReservedToolName(String),

    #[error("duplicate tool name {0:?}")]
    DuplicateTool(String),
}

/// A failure while resolving a single tool-call request.
///
/// Dispatch errors do not abort the run: the error text becomes the content
/// of the `tool` message submitted back to the model.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed tool call target {0:?}: expected <tool>-<operation>")]
    MalformedTarget(String),

    #[error("unknown tool {0:?}")]
    UnknownTool(String),

    #[error("tool {tool:?} has no operation {operation:?}")]
    UnknownOperation { tool: String, operation: String },

    #[error("invalid arguments for {target}: {source}")]
    InvalidArguments {
        target: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tool {target} failed: {message}")]
    Failed { target: String, message: String },
}

/// A failure inside a model client implementation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response contained no choices")]
    EmptyResponse,

    /// Escape hatch for model client implementations outside this crate.
    #[error("{0}")]
    Other(String),
}
