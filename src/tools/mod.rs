//! Tool abstraction and registry.
//!
//! A [`Tool`] is a named capability unit exposing one or more operations the
//! model can invoke. On the wire each operation is addressed by a composite
//! `<tool>-<operation>` identifier; the [`ToolRegistry`] owns the mapping
//! from tool name to trait object and resolves composite targets back into
//! (tool, operation) pairs at dispatch time.

pub mod calculator;
pub mod file_system;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ConfigurationError, DispatchError};
use crate::message::ToolCall;

pub use calculator::CalculatorTool;
pub use file_system::FileSystemTool;

/// The result of executing a tool operation.
///
/// `is_error` marks soft failures the model should see and react to (bad
/// input, file too large, ...) as opposed to hard failures raised as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// One operation a tool exposes.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFunction {
    /// Operation name, unique within the tool (e.g. `execute`).
    pub name: String,
    /// Human-readable description for the model.
    pub description: String,
    /// JSON Schema describing the operation's input parameters.
    pub parameters: Value,
}

/// Definition sent to the LLM so it knows what operations are available.
///
/// The `name` is the composite `<tool>-<operation>` identifier.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name. Must be non-empty and contain no `-`.
    fn name(&self) -> &str;

    /// Human-readable description of the tool as a whole.
    fn description(&self) -> &str;

    /// The operations this tool exposes.
    fn functions(&self) -> Vec<ToolFunction>;

    /// Execute the named operation with the given decoded JSON input.
    async fn call(&self, operation: &str, input: Value) -> Result<ToolResult>;
}

/// Holds all registered tools and dispatches composite tool calls.
///
/// Read-only after construction; the assistant never registers tools
/// mid-run.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a tool list, validating every entry.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Registers a tool, rejecting empty, reserved, and duplicate names.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ConfigurationError> {
        let name = tool.name();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyToolName);
        }
        if name.contains('-') {
            return Err(ConfigurationError::ReservedToolName(name.to_string()));
        }
        if self.tools.iter().any(|t| t.name() == name) {
            return Err(ConfigurationError::DuplicateTool(name.to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Produce composite definitions for the LLM (sent in the API request).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .flat_map(|tool| {
                tool.functions().into_iter().map(|f| ToolDefinition {
                    name: format!("{}-{}", tool.name(), f.name),
                    description: f.description,
                    parameters: f.parameters,
                })
            })
            .collect()
    }

    /// Look up a tool by its (non-composite) name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Resolves a model-emitted tool call to a text output.
    ///
    /// Splits the composite target, looks up the tool, decodes the raw
    /// argument payload, verifies the operation exists, and invokes it.
    /// Every failure mode is a typed [`DispatchError`]; the caller decides
    /// whether to absorb or propagate it.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<String, DispatchError> {
        let (tool_name, operation) = call
            .name
            .split_once('-')
            .filter(|(t, op)| !t.is_empty() && !op.is_empty())
            .ok_or_else(|| DispatchError::MalformedTarget(call.name.clone()))?;

        let tool = self
            .get(tool_name)
            .ok_or_else(|| DispatchError::UnknownTool(tool_name.to_string()))?;

        let input: Value = if call.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.arguments).map_err(|source| {
                DispatchError::InvalidArguments {
                    target: call.name.clone(),
                    source,
                }
            })?
        };

        if !tool.functions().iter().any(|f| f.name == operation) {
            return Err(DispatchError::UnknownOperation {
                tool: tool_name.to_string(),
                operation: operation.to_string(),
            });
        }

        debug!(target = %call.name, id = %call.id, "dispatching tool call");

        let result = tool
            .call(operation, input)
            .await
            .map_err(|e| DispatchError::Failed {
                target: call.name.clone(),
                message: format!("{e:#}"),
            })?;

        if result.is_error {
            return Err(DispatchError::Failed {
                target: call.name.clone(),
                message: result.content,
            });
        }
        Ok(result.content)
    }

    /// How many tools are registered.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistry {
    /// Create a registry with all built-in tools, file operations rooted at
    /// `root`.
    pub fn with_builtins(root: std::path::PathBuf) -> Self {
        let mut registry = Self::new();
        // Built-in names are known-valid, so registration cannot fail.
        let _ = registry.register(Arc::new(CalculatorTool::new()));
        let _ = registry.register(Arc::new(FileSystemTool::new(root)));
        registry
    }
}
