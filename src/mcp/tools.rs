//! MCP tool implementations.
//!
//! Provides tool handlers for the Model Context Protocol.

use crate::models::Category;
use crate::storage::PromptStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of MCP tools.
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolDefinition>,
    /// Backing prompt store.
    store: Arc<dyn PromptStore>,
}

impl ToolRegistry {
    /// Creates a new tool registry over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn PromptStore>) -> Self {
        let mut tools = HashMap::new();

        tools.insert(
            "promptbin_search".to_string(),
            ToolDefinition {
                name: "promptbin_search".to_string(),
                description: "Search prompts by content, title, tags, or description".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query (case-insensitive substring match)"
                        },
                        "category": {
                            "type": "string",
                            "description": "Optional: restrict the search to one category",
                            "enum": ["coding", "writing", "analysis"]
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of results",
                            "minimum": 1
                        }
                    },
                    "required": ["query"]
                }),
            },
        );

        Self { tools, store }
    }

    /// Returns all tool definitions.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Executes a tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or its arguments are invalid.
    pub fn execute(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        match name {
            "promptbin_search" => self.execute_search(arguments),
            _ => Err(Error::Validation(format!("Unknown tool: {name}"))),
        }
    }

    fn execute_search(&self, arguments: Value) -> Result<ToolResult> {
        let args: SearchArgs =
            serde_json::from_value(arguments).map_err(|e| Error::Validation(e.to_string()))?;

        let query = args.query.trim();
        if query.is_empty() {
            return Err(Error::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let category = args.category.as_deref().map(Category::parse).transpose()?;

        let mut results = self.store.search(query, category)?;
        if let Some(limit) = args.limit.filter(|l| *l > 0) {
            results.truncate(limit);
        }

        let formatted: Vec<Value> = results.iter().map(super::format_prompt).collect();

        tracing::debug!(query = %query, results = formatted.len(), "Search tool executed");

        let payload = serde_json::json!({
            "results": formatted,
            "total_count": formatted.len(),
            "query": query,
            "category_filter": args.category,
        });

        Ok(ToolResult {
            content: vec![ToolContent::Text {
                text: serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string()),
            }],
            is_error: false,
        })
    }
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default)]
    pub is_error: bool,
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Arguments for the search tool.
#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    category: Option<String>,
    limit: Option<usize>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::PromptDraft;
    use crate::storage::FilesystemPromptStore;
    use tempfile::TempDir;

    fn registry() -> (TempDir, ToolRegistry) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FilesystemPromptStore::new(dir.path()).unwrap());
        store
            .save(
                &PromptDraft {
                    title: "Code Review".to_string(),
                    content: "Review {{file}} carefully".to_string(),
                    category: "coding".to_string(),
                    tags: "quality, review".to_string(),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        (dir, ToolRegistry::new(store))
    }

    #[test]
    fn test_tool_registry_creation() {
        let (_dir, registry) = registry();
        assert!(registry.get_tool("promptbin_search").is_some());
        assert_eq!(registry.list_tools().len(), 1);
    }

    #[test]
    fn test_execute_search_finds_prompt() {
        let (_dir, registry) = registry();
        let result = registry
            .execute("promptbin_search", serde_json::json!({"query": "review"}))
            .unwrap();

        assert!(!result.is_error);
        let ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("Code Review"));
        assert!(text.contains("\"total_count\": 1"));
    }

    #[test]
    fn test_execute_search_rejects_blank_query() {
        let (_dir, registry) = registry();
        let err = registry
            .execute("promptbin_search", serde_json::json!({"query": "   "}))
            .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_execute_search_rejects_invalid_category() {
        let (_dir, registry) = registry();
        let err = registry
            .execute(
                "promptbin_search",
                serde_json::json!({"query": "review", "category": "poetry"}),
            )
            .unwrap_err();
        assert!(err.to_string().contains("Invalid category"));
    }

    #[test]
    fn test_execute_search_applies_limit() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FilesystemPromptStore::new(dir.path()).unwrap());
        for i in 0..3 {
            store
                .save(
                    &PromptDraft {
                        title: format!("Match {i}"),
                        content: "shared keyword".to_string(),
                        category: "coding".to_string(),
                        ..Default::default()
                    },
                    None,
                )
                .unwrap();
        }
        let registry = ToolRegistry::new(store);

        let result = registry
            .execute(
                "promptbin_search",
                serde_json::json!({"query": "shared", "limit": 2}),
            )
            .unwrap();
        let ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("\"total_count\": 2"));
    }

    #[test]
    fn test_execute_unknown_tool() {
        let (_dir, registry) = registry();
        assert!(
            registry
                .execute("unknown_tool", serde_json::json!({}))
                .is_err()
        );
    }
}
