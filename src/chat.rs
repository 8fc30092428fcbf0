//! Interactive chat REPL for haru.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). The full conversation thread is sent
//! with each request so the LLM maintains context across turns; tool calls
//! are resolved by the assistant and echoed as dimmed traffic lines.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

use haru::config::Config;
use haru::format;
use haru::message::{Message, Role};
use haru::provider::{ModelSelection, Provider};
use haru::tools::{CalculatorTool, FileSystemTool, Tool};
use haru::{Assistant, Thread};

/// Action returned by slash command handling.
enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

/// Runs the interactive chat REPL.
///
/// Builds the provider and tools, binds them to an [`Assistant`] over a
/// fresh [`Thread`], and enters a readline loop. Each user input becomes a
/// thread message; `run` drives the model (and any tool calls) to a final
/// answer, which is reprinted with markdown-lite formatting.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/haru/chat_history.txt`
pub async fn run_chat(config: Config, selection: &ModelSelection) -> Result<()> {
    let provider = Provider::from_config(&config, selection)?;
    let root = std::env::current_dir()?;
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(CalculatorTool::new()),
        Arc::new(FileSystemTool::new(root)),
    ];

    let mut thread = Thread::new();
    let mut assistant = Assistant::new(&provider, &mut thread, tools)?
        .with_auto_tool_execution(config.auto_tools_enabled())
        .with_max_rounds(config.max_tool_rounds());
    if let Some(ref sp) = config.system_prompt {
        assistant = assistant.with_instructions(sp.clone());
    }

    println!(
        "{} [model: {}] (Ctrl+D to exit)",
        "haru chat".bold().cyan(),
        selection.model.yellow(),
    );
    println!();

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(haru::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                // Slash commands
                if line.starts_with('/') {
                    match handle_slash_command(&line, &assistant) {
                        CommandAction::Continue => continue,
                        CommandAction::Unknown(cmd) => {
                            println!("{} Unknown command: {}", "?".yellow(), cmd);
                            continue;
                        }
                    }
                }

                let _ = rl.add_history_entry(&line);

                assistant.add_message(&line);
                let before = assistant.messages().len();
                println!();

                match assistant.run().await {
                    Ok(()) => print_turn(&assistant.messages()[before..]),
                    Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Prints the messages a run appended: tool traffic dimmed, the final
/// assistant answer rendered with markdown-lite formatting.
fn print_turn(appended: &[Message]) {
    for msg in appended {
        match msg.role {
            Role::Assistant => {
                for call in &msg.tool_calls {
                    println!("{}", format::format_tool_call(call));
                }
                if !msg.text().is_empty() {
                    println!("{}", format::render_markdown_lite(msg.text()));
                }
            }
            Role::Tool => println!("{}", format::format_tool_output(msg)),
            _ => {}
        }
    }
}

/// Dispatch and handle a slash command.
fn handle_slash_command(command: &str, assistant: &Assistant<'_>) -> CommandAction {
    match command {
        "/history" => {
            for msg in assistant.messages() {
                if msg.role == Role::System {
                    continue;
                }
                println!("{}", format::format_message(msg));
                println!();
            }
            CommandAction::Continue
        }
        "/tools" => {
            for def in assistant.tools().definitions() {
                println!("  {} - {}", def.name.cyan(), def.description);
            }
            CommandAction::Continue
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - list available tool operations", "/tools".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            CommandAction::Continue
        }
        _ => CommandAction::Unknown(command.to_string()),
    }
}
