//! File loading and merging for haru configuration.

use anyhow::{Context, Result};
use std::fs;

use super::types::{default_model, AssistantConfig, Config};

impl Config {
    /// Loads the global config from `~/.config/haru/config.toml`.
    ///
    /// If no config file exists, creates one with sensible defaults
    /// (including `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = format!(
                r#"model = "{}"

[provider]

[provider.openai]
api_key = "{{env:OPENAI_API_KEY}}"

[provider.openrouter]
api_key = "{{env:OPENROUTER_API_KEY}}"

[provider.ollama]
base_url = "http://localhost:11434"
"#,
                default_model()
            );
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            let config: Config = toml::from_str(&default_toml)
                .with_context(|| "Failed to parse default config".to_string())?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        Ok(config)
    }

    /// Look for haru.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                let contents = fs::read_to_string(&candidate)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(Some(config));
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            provider: global.provider,
            default_provider: project.default_provider.or(global.default_provider),
            system_prompt: project.system_prompt.or(global.system_prompt),
            assistant: AssistantConfig {
                max_tool_rounds: project
                    .assistant
                    .max_tool_rounds
                    .or(global.assistant.max_tool_rounds),
                auto_tools: project.assistant.auto_tools.or(global.assistant.auto_tools),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_project_values() {
        let global = Config {
            system_prompt: Some("global prompt".into()),
            ..Config::default()
        };
        let project = Config {
            model: "llama3".into(),
            default_provider: Some("ollama".into()),
            system_prompt: None,
            ..Config::default()
        };

        let merged = Config::merge(global, project);
        assert_eq!(merged.model, "llama3");
        assert_eq!(merged.default_provider.as_deref(), Some("ollama"));
        // Project left the prompt unset, so the global one survives.
        assert_eq!(merged.system_prompt.as_deref(), Some("global prompt"));
    }

    #[test]
    fn parses_assistant_section() {
        let config: Config = toml::from_str(
            r#"
model = "gpt-4.1"

[assistant]
max_tool_rounds = 5
auto_tools = false
"#,
        )
        .unwrap();
        assert_eq!(config.assistant.max_tool_rounds, Some(5));
        assert_eq!(config.assistant.auto_tools, Some(false));
    }
}
