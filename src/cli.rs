//! Command-line interface definition and dispatch for haru.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;

use haru::config::Config;
use haru::format;
use haru::message::Role;
use haru::provider::{self, Provider};
use haru::tools::{CalculatorTool, FileSystemTool, Tool};
use haru::{Assistant, Thread};

use crate::chat;

/// Top-level CLI structure for haru.
///
/// Parsed from command-line arguments via [`clap::Parser`]. Contains a single
/// required subcommand that determines which action haru performs.
#[derive(Parser)]
#[command(name = "haru", about = "A tool-calling LLM assistant for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the haru CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by
/// clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
        /// Provider to use (openai, openrouter, ollama)
        #[arg(short, long)]
        provider: Option<String>,
        /// Disable tool execution for this question
        #[arg(long)]
        no_tools: bool,
    },
    /// Start an interactive chat session
    Chat {
        /// Provider to use (openai, openrouter, ollama)
        #[arg(long)]
        provider: Option<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
///
/// Controls reading haru's TOML configuration file stored at the XDG config
/// path (`~/.config/haru/config.toml`).
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask {
            prompt,
            model,
            provider: provider_name,
            no_tools,
        } => {
            let prompt = prompt.join(" ");
            if prompt.is_empty() {
                anyhow::bail!("No prompt provided. Usage: haru ask \"your question here\"");
            }

            let config = Config::load()?;
            let selection =
                provider::resolve_model(provider_name.as_deref(), model.as_deref(), &config)?;

            println!(
                "{} [model: {}]",
                "haru".bold().cyan(),
                selection.model.yellow(),
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            let provider = Provider::from_config(&config, &selection)?;
            let root = std::env::current_dir()?;
            let tools: Vec<Arc<dyn Tool>> = if no_tools {
                Vec::new()
            } else {
                vec![
                    Arc::new(CalculatorTool::new()),
                    Arc::new(FileSystemTool::new(root)),
                ]
            };

            let mut thread = Thread::new();
            let mut assistant = Assistant::new(&provider, &mut thread, tools)?
                .with_auto_tool_execution(!no_tools)
                .with_max_rounds(config.max_tool_rounds());
            if let Some(ref sp) = config.system_prompt {
                assistant = assistant.with_instructions(sp.clone());
            }

            assistant.add_message(&prompt);
            assistant.run().await?;

            for msg in assistant.messages() {
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

            Ok(())
        }
        Commands::Chat {
            provider: provider_name,
            model,
        } => {
            let config = Config::load()?;
            let selection =
                provider::resolve_model(provider_name.as_deref(), model.as_deref(), &config)?;
            chat::run_chat(config, &selection).await
        }
        Commands::Config { action } => {
            let config = Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let toml_str = toml::to_string_pretty(&config)?;
                    println!("{}", toml_str);
                }
            }
            Ok(())
        }
    }
}
