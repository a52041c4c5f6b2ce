//! MCP server implementation.
//!
//! Provides a Model Context Protocol server for AI agent interoperability.
//!
//! ## Features
//!
//! - **Tools**: `promptbin_search`
//! - **Resources**: Prompt access via `promptbin://prompts`,
//!   `promptbin://prompt/{id-or-name}`, and `promptbin://prompt-by-name/{name}`
//!
//! ## Usage
//!
//! ### Stdio Transport (Claude Desktop)
//!
//! ```bash
//! promptbin serve
//! ```
//!
//! ### Claude Desktop Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "promptbin": {
//!       "command": "promptbin",
//!       "args": ["serve"]
//!     }
//!   }
//! }
//! ```

mod dispatch;
mod resources;
mod server;
mod tools;

pub use dispatch::McpMethod;
pub use resources::{ResourceContent, ResourceDefinition, ResourceHandler};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer, RateLimitConfig};
pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult};

use crate::models::Prompt;
use serde_json::Value;

/// Formats a prompt for protocol consumers.
///
/// Besides the stored fields, the result carries derived metadata: word and
/// estimated token counts plus the `{{variable}}` placeholders found in the
/// content.
#[must_use]
pub fn format_prompt(prompt: &Prompt) -> Value {
    let stats = prompt.content_stats();
    serde_json::json!({
        "id": prompt.id,
        "title": prompt.title,
        "content": prompt.content,
        "category": prompt.category,
        "description": prompt.description,
        "tags": prompt.tags,
        "metadata": {
            "created_at": prompt.created_at,
            "updated_at": prompt.updated_at,
            "word_count": stats.word_count,
            "token_count": stats.token_count,
            "template_variables": stats.template_variables,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_format_prompt_includes_metadata() {
        let prompt = Prompt {
            id: "20240101_120000_deadbeef".to_string(),
            title: "Summarize".to_string(),
            content: "Summarize this: {{text}}".to_string(),
            category: Category::Writing,
            description: String::new(),
            tags: vec!["nlp".to_string()],
            created_at: "2024-01-01T12:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T12:00:00.000000Z".to_string(),
        };

        let value = format_prompt(&prompt);
        assert_eq!(value["category"], "writing");
        assert_eq!(value["metadata"]["word_count"], 3);
        assert_eq!(value["metadata"]["template_variables"][0], "text");
    }
}
