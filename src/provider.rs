//! LLM provider client for haru.
//!
//! A hand-rolled client for the OpenAI-compatible chat completions API,
//! covering OpenAI, OpenRouter, and local Ollama via base-URL dispatch.
//! Implements [`ChatModel`], so an [`Assistant`](crate::assistant::Assistant)
//! can drive it like any other model client.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::constants;
use crate::error::ModelError;
use crate::message::{Message, Role, ToolCall};
use crate::model::{ChatModel, ChatResponse};
use crate::tools::ToolDefinition;

/// Resolved provider + model pair.
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Identifies which LLM provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI (GPT models).
    OpenAI,
    /// OpenRouter (multi-provider gateway).
    OpenRouter,
    /// Ollama (local models via OpenAI-compatible API).
    Ollama,
}

impl ProviderKind {
    /// Parses a provider name string into a [`ProviderKind`].
    ///
    /// Matching is case-insensitive. Returns an error for unknown providers.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!(
                "Unknown provider: {other}. Supported: openai, openrouter, ollama"
            )),
        }
    }

    fn config_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }
}

/// Returns the default model identifier for a given provider.
pub fn default_model_for(provider: &ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAI => constants::DEFAULT_MODEL,
        ProviderKind::OpenRouter => constants::DEFAULT_OPENROUTER_MODEL,
        ProviderKind::Ollama => constants::OLLAMA_DEFAULT_MODEL,
    }
}

/// Resolve which provider and model to use.
/// Priority: CLI flags > config.toml > defaults.
///
/// Accepts these formats:
///   --model openai/gpt-4.1  (provider/model shorthand)
///   --provider openai --model gpt-4.1
///   --provider openai  (uses provider's default model)
///   (nothing)  (uses config.toml, then hardcoded default)
pub fn resolve_model(
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    config: &Config,
) -> Result<ModelSelection> {
    // If --model contains a slash, parse as provider/model
    if let Some(model_str) = cli_model {
        if let Some((prov, model)) = model_str.split_once('/') {
            if let Ok(provider) = ProviderKind::from_str(prov) {
                return Ok(ModelSelection {
                    provider,
                    model: model.to_string(),
                });
            }
        }
    }

    let provider_str = cli_provider
        .or(config.provider_name())
        .unwrap_or(constants::DEFAULT_PROVIDER);
    let provider = ProviderKind::from_str(provider_str)?;

    let model = cli_model
        .map(String::from)
        .or_else(|| config.model_name())
        .unwrap_or_else(|| default_model_for(&provider).to_string());

    Ok(ModelSelection { provider, model })
}

/// A configured LLM provider ready to handle chat completion requests.
///
/// Holds a reqwest client, the resolved base URL, and an optional API key
/// (Ollama runs without one). One request is issued per
/// [`ChatModel::chat`] call; no streaming, no retries.
pub struct Provider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl Provider {
    /// Creates a provider directly from its connection parts.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    /// Creates a new [`Provider`] from the loaded application config.
    ///
    /// Resolves the API key through haru's config precedence chain
    /// (env var → config file → substitution) and the base URL from the
    /// provider entry or the built-in default.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for a provider that
    /// requires one.
    pub fn from_config(config: &Config, selection: &ModelSelection) -> Result<Self> {
        let name = selection.provider.config_name();
        let base_url = config
            .base_url(name)
            .unwrap_or_else(|| default_base_url(&selection.provider).to_string());

        let api_key = match selection.provider {
            ProviderKind::Ollama => None,
            _ => Some(config.resolve_api_key(name).with_context(|| {
                format!(
                    "No API key found for {}. Set {}_API_KEY or configure it in config.toml",
                    name,
                    name.to_uppercase()
                )
            })?),
        };

        Ok(Self::new(base_url, api_key, selection.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn default_base_url(provider: &ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAI => constants::OPENAI_DEFAULT_BASE_URL,
        ProviderKind::OpenRouter => constants::OPENROUTER_DEFAULT_BASE_URL,
        ProviderKind::Ollama => constants::OLLAMA_DEFAULT_BASE_URL,
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    max_tokens: u64,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireToolCallFunction,
}

#[derive(Serialize, Deserialize)]
struct WireToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn to_wire(message: &Message) -> WireMessage {
    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|c| WireToolCall {
                    id: c.id.clone(),
                    kind: "function".to_string(),
                    function: WireToolCallFunction {
                        name: c.name.clone(),
                        arguments: c.arguments.clone(),
                    },
                })
                .collect(),
        )
    };

    // Tool-call-only assistant messages go out with null content.
    let content = if message.text().is_empty() && tool_calls.is_some() {
        None
    } else {
        Some(message.text().to_string())
    };

    WireMessage {
        role: message.role.to_string(),
        content,
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn from_wire(message: WireMessage) -> ChatResponse {
    let role = match message.role.as_str() {
        "system" => Role::System,
        "user" => Role::User,
        "tool" => Role::Tool,
        _ => Role::Assistant,
    };
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|c| ToolCall::new(c.id, c.function.name, c.function.arguments))
        .collect();

    ChatResponse {
        role,
        content: message.content.unwrap_or_default(),
        tool_calls,
    }
}

#[async_trait]
impl ChatModel for Provider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(to_wire).collect(),
            tools: tools
                .iter()
                .map(|d| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: d.name.clone(),
                        description: d.description.clone(),
                        parameters: d.parameters.clone(),
                    },
                })
                .collect(),
            max_tokens: constants::MAX_TOKENS,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "sending chat completion request");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;
        Ok(from_wire(choice.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_model_prefers_slash_shorthand() {
        let config = Config::default();
        let selection =
            resolve_model(Some("openai"), Some("ollama/llama3"), &config).unwrap();
        assert_eq!(selection.provider, ProviderKind::Ollama);
        assert_eq!(selection.model, "llama3");
    }

    #[test]
    fn resolve_model_falls_back_to_defaults() {
        let config = Config::default();
        let selection = resolve_model(None, None, &config).unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenAI);
        assert_eq!(selection.model, constants::DEFAULT_MODEL);
    }

    #[test]
    fn resolve_model_rejects_unknown_provider() {
        let config = Config::default();
        assert!(resolve_model(Some("acme"), None, &config).is_err());
    }

    #[test]
    fn wire_request_includes_tools_and_histories() {
        let messages = vec![
            Message::system("be helpful"),
            Message::user("calculate 2+2"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "calculator-execute", r#"{"input":"2+2"}"#)],
            ),
            Message::tool_result("call_1", "4.0"),
        ];
        let tools = vec![ToolDefinition {
            name: "calculator-execute".to_string(),
            description: "evaluate math".to_string(),
            parameters: json!({"type": "object"}),
        }];

        let request = ChatRequest {
            model: "gpt-4.1",
            messages: messages.iter().map(to_wire).collect(),
            tools: tools
                .iter()
                .map(|d| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: d.name.clone(),
                        description: d.description.clone(),
                        parameters: d.parameters.clone(),
                    },
                })
                .collect(),
            max_tokens: 4096,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "calculate 2+2");
        // Tool-call-only assistant message: no content key on the wire.
        assert!(value["messages"][2].get("content").is_none());
        assert_eq!(
            value["messages"][2]["tool_calls"][0]["function"]["name"],
            "calculator-execute"
        );
        assert_eq!(value["messages"][3]["role"], "tool");
        assert_eq!(value["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(value["tools"][0]["type"], "function");
    }

    #[test]
    fn wire_response_with_tool_calls_deserializes() {
        let body = json!({
            "id": "chatcmpl-96QTY",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9TewGANaaIjzY31UCpAAGLeV",
                        "type": "function",
                        "function": {"name": "calculator-execute", "arguments": "{\"input\":\"2+2\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });

        let completion: ChatCompletion = serde_json::from_value(body).unwrap();
        let response = from_wire(completion.choices.into_iter().next().unwrap().message);
        assert_eq!(response.role, Role::Assistant);
        assert!(response.content.is_empty());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "calculator-execute");
        assert_eq!(response.tool_calls[0].arguments, "{\"input\":\"2+2\"}");
    }

    #[test]
    fn wire_response_plain_text_deserializes() {
        let body = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "The result of 2 + 2 is 4."},
                "finish_reason": "stop"
            }]
        });

        let completion: ChatCompletion = serde_json::from_value(body).unwrap();
        let response = from_wire(completion.choices.into_iter().next().unwrap().message);
        assert_eq!(response.content, "The result of 2 + 2 is 4.");
        assert!(response.tool_calls.is_empty());
    }
}
