//! The model client capability consumed by the assistant.
//!
//! Anything that can turn an ordered message history into one response
//! message implements [`ChatModel`]. The shipped implementation is
//! [`Provider`](crate::provider::Provider); tests use scripted mocks.

use async_trait::async_trait;

use crate::error::ModelError;
use crate::message::{Message, Role, ToolCall};
use crate::tools::ToolDefinition;

/// One response message produced by a model client.
///
/// `role` is normally [`Role::Assistant`]. `content` may be empty when the
/// model emitted only tool-call requests.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    /// A plain assistant text response with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// An assistant response requesting tool invocations.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
        }
    }
}

/// The response-generation capability.
///
/// Given the full ordered message history and the definitions of the
/// operations available for invocation, produce one response. Transport,
/// auth, and retry concerns live entirely behind this seam.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse, ModelError>;
}
