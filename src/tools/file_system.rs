//! File system tool: read, list, and write files under a root directory.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Tool, ToolFunction, ToolResult};
use crate::constants::{BINARY_DETECTION_BYTES, LIST_MAX_RESULTS, READ_FILE_MAX_SIZE};

/// Tool exposing `read_file`, `list_directory`, and `write_to_file`
/// operations, all rooted at a single directory.
///
/// Path traversal outside the root is rejected for every operation.
pub struct FileSystemTool {
    /// Root directory. Paths are resolved relative to this.
    root: PathBuf,
}

impl FileSystemTool {
    /// Create a new `FileSystemTool` rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve and validate that an existing path stays within the root.
    fn resolve_existing(&self, path: &str) -> Result<PathBuf> {
        let resolved = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        };
        let canonical = resolved.canonicalize()?;
        let root_canonical = self.root.canonicalize()?;
        if !canonical.starts_with(&root_canonical) {
            anyhow::bail!("Path escapes the root directory: {}", path);
        }
        Ok(canonical)
    }

    /// Resolve a write target that may not exist yet.
    ///
    /// The target file may not exist, so the *parent* directory is
    /// canonicalized instead of the file itself. Parent directories are
    /// created if they don't already exist.
    fn resolve_write(&self, path: &str) -> Result<PathBuf> {
        let resolved = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        };

        let parent = resolved
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Path has no parent directory: {}", path))?;
        fs::create_dir_all(parent)?;

        let parent_canonical = parent.canonicalize()?;
        let root_canonical = self.root.canonicalize()?;
        if !parent_canonical.starts_with(&root_canonical) {
            anyhow::bail!("Path escapes the root directory: {}", path);
        }

        let filename = resolved
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Path has no filename: {}", path))?;
        Ok(parent_canonical.join(filename))
    }

    fn read_file(&self, input: ReadFileInput) -> Result<ToolResult> {
        let path = self.resolve_existing(&input.path)?;

        let metadata = fs::metadata(&path)?;
        if metadata.len() > READ_FILE_MAX_SIZE {
            return Ok(ToolResult::error(format!(
                "File too large: {} bytes (max {})",
                metadata.len(),
                READ_FILE_MAX_SIZE
            )));
        }

        let content = fs::read(&path)?;
        // Null bytes near the start mean binary content.
        let check_len = content.len().min(BINARY_DETECTION_BYTES);
        if content[..check_len].contains(&0) {
            return Ok(ToolResult::error(
                "Binary file detected. Cannot display binary content.".into(),
            ));
        }

        let text = String::from_utf8(content)
            .map_err(|_| anyhow::anyhow!("File is not valid UTF-8"))?;
        Ok(ToolResult::success(text))
    }

    fn list_directory(&self, input: ListDirectoryInput) -> Result<ToolResult> {
        let pattern = match input.pattern {
            Some(p) => p,
            None => {
                let dir = input.path.as_deref().unwrap_or(".");
                format!("{}/*", dir.trim_end_matches('/'))
            }
        };
        let full_pattern = self.root.join(&pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let root_canonical = self.root.canonicalize()?;

        let mut paths: Vec<String> = Vec::new();
        for entry in glob::glob(&pattern_str)? {
            if paths.len() >= LIST_MAX_RESULTS {
                paths.push(format!("... truncated at {} results", LIST_MAX_RESULTS));
                break;
            }
            let entry = entry?;
            // Skip entries outside the root, and entries that can't be
            // canonicalized (broken symlinks, etc.).
            match entry.canonicalize() {
                Ok(canonical) if canonical.starts_with(&root_canonical) => {}
                _ => continue,
            }
            let relative = entry.strip_prefix(&self.root).unwrap_or(&entry);
            paths.push(relative.display().to_string());
        }

        if paths.is_empty() {
            Ok(ToolResult::success("No entries matched.".into()))
        } else {
            Ok(ToolResult::success(paths.join("\n")))
        }
    }

    fn write_to_file(&self, input: WriteToFileInput) -> Result<ToolResult> {
        let path = self.resolve_write(&input.path)?;
        fs::write(&path, &input.content)?;
        Ok(ToolResult::success(format!(
            "Wrote {} bytes to {}",
            input.content.len(),
            input.path
        )))
    }
}

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
}

#[derive(Deserialize)]
struct ListDirectoryInput {
    /// Directory to list, relative to the root. Defaults to the root itself.
    path: Option<String>,
    /// Glob pattern overriding `path` (e.g. `src/**/*.rs`).
    pattern: Option<String>,
}

#[derive(Deserialize)]
struct WriteToFileInput {
    path: String,
    content: String,
}

#[async_trait::async_trait]
impl Tool for FileSystemTool {
    fn name(&self) -> &str {
        "file_system"
    }

    fn description(&self) -> &str {
        "Read, list, and write files under the working directory."
    }

    fn functions(&self) -> Vec<ToolFunction> {
        vec![
            ToolFunction {
                name: "read_file".to_string(),
                description: "Read the contents of a file. Path is relative to the root."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "File path relative to the root"
                        }
                    },
                    "required": ["path"]
                }),
            },
            ToolFunction {
                name: "list_directory".to_string(),
                description:
                    "List directory entries, optionally filtered by a glob pattern.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Directory to list, relative to the root"
                        },
                        "pattern": {
                            "type": "string",
                            "description": "Glob pattern (e.g. 'src/**/*.rs'); overrides path"
                        }
                    }
                }),
            },
            ToolFunction {
                name: "write_to_file".to_string(),
                description:
                    "Write content to a file, creating parent directories as needed.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "File path relative to the root"
                        },
                        "content": {
                            "type": "string",
                            "description": "Content to write"
                        }
                    },
                    "required": ["path", "content"]
                }),
            },
        ]
    }

    async fn call(&self, operation: &str, input: Value) -> Result<ToolResult> {
        match operation {
            "read_file" => self.read_file(serde_json::from_value(input)?),
            "list_directory" => self.list_directory(serde_json::from_value(input)?),
            "write_to_file" => self.write_to_file(serde_json::from_value(input)?),
            other => anyhow::bail!("unknown operation: {}", other),
        }
    }
}
