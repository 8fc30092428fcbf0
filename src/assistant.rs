//! The assistant orchestration loop.
//!
//! An [`Assistant`] binds a model client, a caller-owned [`Thread`], and a
//! set of tools, then drives the send→tool→feedback iteration itself: call
//! the model with the full history, append its response, dispatch any tool
//! calls it requested, feed the outputs back, and repeat until the model
//! answers without requesting tools or the round bound trips.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::MAX_TOOL_ROUNDS;
use crate::error::AssistantError;
use crate::message::{Content, Message};
use crate::model::ChatModel;
use crate::thread::Thread;
use crate::tools::{Tool, ToolRegistry};

/// Orchestrates one conversation between a model client and a set of tools.
///
/// The thread is borrowed exclusively for the assistant's lifetime: the
/// assistant appends to it but never reorders or removes entries, and the
/// borrow makes overlapping runs against one thread unrepresentable.
pub struct Assistant<'a> {
    model: &'a dyn ChatModel,
    thread: &'a mut Thread,
    registry: ToolRegistry,
    auto_tool_execution: bool,
    max_rounds: usize,
}

impl<'a> Assistant<'a> {
    /// Creates an assistant over the given model, thread, and tools.
    ///
    /// Fails with a configuration error if the tool list contains an empty,
    /// reserved, or duplicate name. Nothing is appended to the thread on
    /// failure.
    pub fn new(
        model: &'a dyn ChatModel,
        thread: &'a mut Thread,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Result<Self, AssistantError> {
        let registry = ToolRegistry::from_tools(tools)?;
        Ok(Self {
            model,
            thread,
            registry,
            auto_tool_execution: false,
            max_rounds: MAX_TOOL_ROUNDS,
        })
    }

    /// Seeds the thread with a system message when instructions are given.
    ///
    /// Only an empty thread is seeded: inserting instructions into an
    /// ongoing conversation would either displace its first message or break
    /// the system-message-first invariant.
    pub fn with_instructions(self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        if !instructions.is_empty() && self.thread.is_empty() {
            self.thread.append(Message::system(instructions));
        }
        self
    }

    /// Sets the default tool-execution mode used by [`run`](Self::run).
    pub fn with_auto_tool_execution(mut self, auto: bool) -> Self {
        self.auto_tool_execution = auto;
        self
    }

    /// Overrides the maximum generate/dispatch rounds per run.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Appends a user message to the thread.
    pub fn add_message(&mut self, content: impl Into<String>) {
        self.thread.append(Message::user(content));
    }

    /// Appends an arbitrary pre-built message to the thread.
    ///
    /// Intended for replay and testing, e.g. fabricating an assistant
    /// message that carries tool calls.
    pub fn append_message(&mut self, message: Message) {
        self.thread.append(message);
    }

    /// Appends a tool-result message for a pending tool call.
    ///
    /// Does not trigger a model call; when auto tool execution is off, the
    /// caller submits outputs with this and then invokes
    /// [`run`](Self::run) again.
    pub fn submit_tool_output(
        &mut self,
        tool_call_id: impl Into<String>,
        output: impl Into<String>,
    ) {
        self.thread.append(Message::tool_result(tool_call_id, output));
    }

    /// Read access to the conversation history.
    pub fn messages(&self) -> &[Message] {
        self.thread.messages()
    }

    pub fn thread(&self) -> &Thread {
        self.thread
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs the loop with the configured tool-execution default.
    pub async fn run(&mut self) -> Result<(), AssistantError> {
        self.run_with(self.auto_tool_execution).await
    }

    /// Runs the loop until the model produces a response with no tool calls.
    ///
    /// With `auto_tool_execution` off, the run also ends after appending a
    /// response that *does* carry tool calls, leaving them pending for the
    /// caller. Dispatch failures never abort the run; their description is
    /// submitted as the tool output so the model can react (and logged at
    /// warn). Model failures and an exceeded round bound do abort.
    pub async fn run_with(&mut self, auto_tool_execution: bool) -> Result<(), AssistantError> {
        if self.thread.is_empty() {
            warn!("No messages in the thread");
            return Ok(());
        }

        let definitions = self.registry.definitions();
        let mut rounds = 0;

        loop {
            if rounds == self.max_rounds {
                return Err(AssistantError::LoopExceeded { rounds });
            }
            rounds += 1;

            debug!(round = rounds, "requesting model response");
            let response = self
                .model
                .chat(self.thread.messages(), &definitions)
                .await?;

            let tool_calls = response.tool_calls.clone();
            self.thread.append(Message {
                role: response.role,
                content: Content::Text(response.content),
                tool_calls: response.tool_calls,
                tool_call_id: None,
            });

            if tool_calls.is_empty() || !auto_tool_execution {
                return Ok(());
            }

            // Requests resolve strictly in emission order; their tool
            // messages land before the next generation round.
            for call in &tool_calls {
                let output = match self.registry.dispatch(call).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(target = %call.name, id = %call.id, error = %e, "tool dispatch failed");
                        e.to_string()
                    }
                };
                self.submit_tool_output(call.id.clone(), output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, ModelError};
    use crate::message::{Role, ToolCall};
    use crate::model::ChatResponse;
    use crate::tools::CalculatorTool;
    use std::sync::Mutex;

    /// Model client that replays a fixed script of responses.
    struct ScriptedModel {
        script: Mutex<Vec<ChatResponse>>,
        calls: Mutex<usize>,
    }

    impl ScriptedModel {
        fn new(mut responses: Vec<ChatResponse>) -> Self {
            responses.reverse();
            Self {
                script: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl ChatModel for ScriptedModel {
        async fn chat(
            &self,
            _messages: &[Message],
            _tools: &[crate::tools::ToolDefinition],
        ) -> Result<ChatResponse, ModelError> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ModelError::Other("script exhausted".into()))
        }
    }

    /// Model client that requests the same tool call forever.
    struct LoopingModel;

    #[async_trait::async_trait]
    impl ChatModel for LoopingModel {
        async fn chat(
            &self,
            _messages: &[Message],
            _tools: &[crate::tools::ToolDefinition],
        ) -> Result<ChatResponse, ModelError> {
            Ok(ChatResponse::with_tool_calls(
                "",
                vec![ToolCall::new("call_n", "calculator-execute", r#"{"input":"1+1"}"#)],
            ))
        }
    }

    fn calculator_call() -> ToolCall {
        ToolCall::new("call_1", "calculator-execute", r#"{"input":"2+2"}"#)
    }

    #[test]
    fn construction_rejects_duplicate_tools() {
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        let result = Assistant::new(
            &model,
            &mut thread,
            vec![Arc::new(CalculatorTool::new()), Arc::new(CalculatorTool::new())],
        );
        assert!(matches!(
            result.err(),
            Some(AssistantError::Configuration(ConfigurationError::DuplicateTool(_)))
        ));
        // Fail-fast: nothing was appended before the error.
        assert!(thread.is_empty());
    }

    #[test]
    fn instructions_become_first_system_message() {
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        let _assistant = Assistant::new(&model, &mut thread, vec![])
            .unwrap()
            .with_instructions("You are an expert assistant");

        let first = thread.messages().first().unwrap();
        assert_eq!(first.role, Role::System);
        assert_eq!(first.text(), "You are an expert assistant");
    }

    #[test]
    fn instructions_do_not_displace_existing_messages() {
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        thread.append(Message::user("already here"));
        let _assistant = Assistant::new(&model, &mut thread, vec![])
            .unwrap()
            .with_instructions("You are an expert assistant");

        assert_eq!(thread.len(), 1);
        assert_eq!(thread.messages()[0].role, Role::User);
    }

    #[test]
    fn add_message_defaults_to_user_role() {
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        let mut assistant = Assistant::new(&model, &mut thread, vec![]).unwrap();

        assistant.add_message("foo");
        let last = assistant.messages().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.text(), "foo");
    }

    #[test]
    fn submit_tool_output_appends_tool_message() {
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        let mut assistant = Assistant::new(&model, &mut thread, vec![]).unwrap();

        assistant.submit_tool_output("123", "bar");
        let last = assistant.messages().last().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert_eq!(last.text(), "bar");
        assert_eq!(last.tool_call_id.as_deref(), Some("123"));
    }

    #[tokio::test]
    async fn manual_mode_leaves_tool_calls_pending() {
        let model = ScriptedModel::new(vec![ChatResponse::with_tool_calls(
            "",
            vec![calculator_call()],
        )]);
        let mut thread = Thread::new();
        let mut assistant =
            Assistant::new(&model, &mut thread, vec![Arc::new(CalculatorTool::new())]).unwrap();

        assistant.add_message("Please calculate 2+2");
        assistant.run().await.unwrap();

        let messages = assistant.messages();
        assert_eq!(messages.len(), 2);
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.tool_calls, vec![calculator_call()]);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn auto_mode_executes_tools_and_continues() {
        let model = ScriptedModel::new(vec![
            ChatResponse::with_tool_calls("", vec![calculator_call()]),
            ChatResponse::text("The result of 2 + 2 is 4."),
        ]);
        let mut thread = Thread::new();
        let mut assistant =
            Assistant::new(&model, &mut thread, vec![Arc::new(CalculatorTool::new())]).unwrap();

        assistant.add_message("Please calculate 2+2");
        assistant.run_with(true).await.unwrap();

        let messages = assistant.messages();
        let tool_msg = &messages[messages.len() - 2];
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.text(), "4.0");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));

        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text(), "The result of 2 + 2 is 4.");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn empty_thread_is_a_no_op() {
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        let mut assistant = Assistant::new(&model, &mut thread, vec![]).unwrap();

        assistant.run().await.unwrap();
        assert_eq!(model.calls(), 0);
        assert!(assistant.messages().is_empty());
    }

    #[tokio::test]
    async fn loop_guard_trips_on_runaway_model() {
        let model = LoopingModel;
        let mut thread = Thread::new();
        let mut assistant =
            Assistant::new(&model, &mut thread, vec![Arc::new(CalculatorTool::new())])
                .unwrap()
                .with_max_rounds(3);

        assistant.add_message("loop forever");
        let err = assistant.run_with(true).await.unwrap_err();
        assert!(matches!(err, AssistantError::LoopExceeded { rounds: 3 }));
    }

    #[tokio::test]
    async fn dispatch_errors_are_absorbed_as_tool_output() {
        let model = ScriptedModel::new(vec![
            ChatResponse::with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "abacus-execute", "{}")],
            ),
            ChatResponse::text("I could not reach that tool."),
        ]);
        let mut thread = Thread::new();
        let mut assistant =
            Assistant::new(&model, &mut thread, vec![Arc::new(CalculatorTool::new())]).unwrap();

        assistant.add_message("use the abacus");
        assistant.run_with(true).await.unwrap();

        let messages = assistant.messages();
        let tool_msg = &messages[messages.len() - 2];
        assert_eq!(tool_msg.role, Role::Tool);
        assert!(tool_msg.text().contains("unknown tool"));

        assert_eq!(messages.last().unwrap().text(), "I could not reach that tool.");
    }

    #[tokio::test]
    async fn malformed_arguments_are_absorbed_too() {
        let model = ScriptedModel::new(vec![
            ChatResponse::with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "calculator-execute", "{oops")],
            ),
            ChatResponse::text("Sorry about that."),
        ]);
        let mut thread = Thread::new();
        let mut assistant =
            Assistant::new(&model, &mut thread, vec![Arc::new(CalculatorTool::new())]).unwrap();

        assistant.add_message("calculate");
        assistant.run_with(true).await.unwrap();

        let messages = assistant.messages();
        let tool_msg = &messages[messages.len() - 2];
        assert_eq!(tool_msg.role, Role::Tool);
        assert!(tool_msg.text().contains("invalid arguments"));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        // Empty script: the first chat call fails.
        let model = ScriptedModel::new(vec![]);
        let mut thread = Thread::new();
        let mut assistant = Assistant::new(&model, &mut thread, vec![]).unwrap();

        assistant.add_message("hello");
        let err = assistant.run().await.unwrap_err();
        assert!(matches!(err, AssistantError::Model(_)));
    }
}
