//! Message types for haru's conversation history.
//!
//! Provides a structured [`Message`] type with [`Role`] and [`Content`] enums
//! that represent conversation turns, plus [`ToolCall`] for tool invocations
//! requested by the LLM. These are haru's internal types, serialized verbatim
//! onto the provider wire.

use serde::{Deserialize, Serialize};

/// A tool invocation requested by the LLM.
///
/// The `name` is a composite identifier of the form `<tool>-<operation>`,
/// e.g. `calculator-execute`. The `arguments` field is kept as the raw JSON
/// text the model emitted; it is decoded only at dispatch time so a malformed
/// payload surfaces as a dispatch error rather than a parse failure here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call (used to match results).
    pub id: String,
    /// Composite `<tool>-<operation>` name of the operation to invoke.
    pub name: String,
    /// Raw JSON argument payload, undecoded.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// A single message in a conversation.
///
/// Contains a [`Role`] indicating who produced the message and [`Content`]
/// representing the message body. `tool_calls` is populated only on
/// `assistant` messages that request tool invocations; `tool_call_id` only on
/// `tool` messages carrying an invocation's output. Messages are constructed
/// once and never mutated after being appended to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// The role of a message sender in the conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Message content, currently text-only but structured for future multimodal support.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::Text(text.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text(text.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Content::Text(text.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates an assistant message that requests tool invocations.
    ///
    /// `text` may be empty; the model often emits no prose alongside tool
    /// calls.
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text(text.into()),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Creates a tool result message to feed back to the LLM.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Content::Text(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn text(&self) -> &str {
        match &self.content {
            Content::Text(s) => s,
        }
    }

    /// Returns the text content as an owned String.
    pub fn text_content(&self) -> String {
        match &self.content {
            Content::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_roles() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hi").role, Role::Assistant);
        assert_eq!(Message::system("hi").role, Role::System);
        assert_eq!(Message::tool_result("id", "out").role, Role::Tool);
    }

    #[test]
    fn tool_result_carries_call_id_and_content() {
        let msg = Message::tool_result("call_123", "4.0");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_123"));
        assert_eq!(msg.text(), "4.0");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn assistant_with_tool_calls_keeps_order() {
        let calls = vec![
            ToolCall::new("a", "calculator-execute", "{}"),
            ToolCall::new("b", "file_system-read_file", "{}"),
        ];
        let msg = Message::assistant_with_tool_calls("", calls.clone());
        assert_eq!(msg.tool_calls, calls);
        assert!(msg.text().is_empty());
    }

    #[test]
    fn serde_skips_empty_tool_fields() {
        let json = serde_json::to_string(&Message::user("hello")).unwrap();
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::User);
        assert_eq!(back.text(), "hello");
    }
}
