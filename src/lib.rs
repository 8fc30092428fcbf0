//! haru: a tool-calling assistant runtime.
//!
//! The core is the [`Assistant`] orchestration loop: it binds a caller-owned
//! [`Thread`] of [`Message`]s, a [`ChatModel`] client, and a set of
//! [`Tool`]s, then drives the model⇄tool conversation until the model
//! produces a final answer. A ready-made OpenAI-compatible [`Provider`]
//! client and two built-in tools are included, along with the configuration
//! and formatting layers backing the `haru` binary.
//!
//! ```no_run
//! use std::sync::Arc;
//! use haru::{Assistant, CalculatorTool, Provider, Thread};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::new("https://api.openai.com", Some("sk-...".into()), "gpt-4.1");
//! let mut thread = Thread::new();
//! let mut assistant = Assistant::new(&provider, &mut thread, vec![Arc::new(CalculatorTool::new())])?
//!     .with_instructions("You are an expert assistant")
//!     .with_auto_tool_execution(true);
//!
//! assistant.add_message("Please calculate 2+2");
//! assistant.run().await?;
//! println!("{}", assistant.messages().last().unwrap().text());
//! # Ok(())
//! # }
//! ```

pub mod assistant;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod message;
pub mod model;
pub mod provider;
pub mod thread;
pub mod tools;

pub use assistant::Assistant;
pub use config::Config;
pub use error::{AssistantError, ConfigurationError, DispatchError, ModelError};
pub use message::{Content, Message, Role, ToolCall};
pub use model::{ChatModel, ChatResponse};
pub use provider::{Provider, ProviderKind};
pub use thread::Thread;
pub use tools::{CalculatorTool, FileSystemTool, Tool, ToolDefinition, ToolRegistry, ToolResult};
