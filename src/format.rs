//! Terminal formatting for conversation output.

use colored::Colorize;

use crate::message::{Message, Role, ToolCall};

/// Format a message for terminal display with role label and colors.
pub fn format_message(msg: &Message) -> String {
    let label = format_role_label(&msg.role);
    let body = match msg.role {
        Role::Assistant => render_markdown_lite(msg.text()),
        Role::User => msg.text().to_string(),
        _ => msg.text().dimmed().to_string(),
    };
    format!("{}\n{}", label, body)
}

fn format_role_label(role: &Role) -> String {
    match role {
        Role::User => format!("{}", "you:".green().bold()),
        Role::Assistant => format!("{}", "haru:".cyan().bold()),
        Role::System => format!("{}", "system:".dimmed()),
        Role::Tool => format!("{}", "tool:".yellow()),
    }
}

/// One-line rendering of a tool invocation, shown while tools execute.
pub fn format_tool_call(call: &ToolCall) -> String {
    let args = if call.arguments.trim().is_empty() {
        "{}"
    } else {
        call.arguments.trim()
    };
    format!("{} {}({})", "→".yellow(), call.name.yellow(), args.dimmed())
}

/// One-line rendering of a tool output, truncated to keep the REPL readable.
pub fn format_tool_output(msg: &Message) -> String {
    const MAX_PREVIEW: usize = 200;
    let text = msg.text();
    let preview: String = if text.chars().count() > MAX_PREVIEW {
        let truncated: String = text.chars().take(MAX_PREVIEW).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    };
    format!("{} {}", "←".yellow(), preview.replace('\n', " ").dimmed())
}

/// Minimal markdown renderer for terminal output.
///
/// Not a parser: it only dims fenced code blocks and strips the fences,
/// which covers the bulk of LLM answer formatting without a markdown
/// dependency.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if line.starts_with("```") {
            if !in_code_block {
                let lang = line.trim_start_matches('`');
                if !lang.is_empty() {
                    output.push_str(&format!("  {}\n", lang.dimmed()));
                }
            }
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
        } else {
            output.push_str(line);
            output.push('\n');
        }
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_lite_strips_fences() {
        let rendered = render_markdown_lite("before\n```rust\nlet x = 1;\n```\nafter");
        assert!(rendered.contains("before"));
        assert!(rendered.contains("let x = 1;"));
        assert!(rendered.contains("after"));
        assert!(!rendered.contains("```"));
    }

    #[test]
    fn tool_output_preview_is_single_line() {
        let msg = Message::tool_result("call_1", "line one\nline two");
        let preview = format_tool_output(&msg);
        assert!(!preview.contains('\n'));
    }
}
