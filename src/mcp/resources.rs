//! MCP resource handlers.
//!
//! Provides resource access for the Model Context Protocol. Resources are
//! addressed via URI scheme: `promptbin://prompts`,
//! `promptbin://prompt/{id-or-name}`, `promptbin://prompt-by-name/{name}`.

use crate::services::NameResolver;
use crate::storage::PromptStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// URI scheme prefix for all promptbin resources.
const URI_SCHEME: &str = "promptbin://";

/// Number of example names included in a not-found hint.
const NAME_HINT_LIMIT: usize = 5;

/// Handler for MCP resources.
pub struct ResourceHandler {
    /// Backing prompt store.
    store: Arc<dyn PromptStore>,
}

impl ResourceHandler {
    /// Creates a new resource handler over the given store.
    #[must_use]
    pub const fn new(store: Arc<dyn PromptStore>) -> Self {
        Self { store }
    }

    /// Returns all resource definitions.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        vec![
            ResourceDefinition {
                uri: "promptbin://prompts".to_string(),
                name: "All Prompts".to_string(),
                description: "Complete list of stored prompts with metadata".to_string(),
                mime_type: "application/json".to_string(),
            },
            ResourceDefinition {
                uri: "promptbin://prompt/{id-or-name}".to_string(),
                name: "Single Prompt".to_string(),
                description: "One prompt, addressed by id or slugified title".to_string(),
                mime_type: "application/json".to_string(),
            },
            ResourceDefinition {
                uri: "promptbin://prompt-by-name/{name}".to_string(),
                name: "Prompt by Name".to_string(),
                description: "One prompt addressed by slugified title, with name hints on a miss"
                    .to_string(),
                mime_type: "application/json".to_string(),
            },
        ]
    }

    /// Reads a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed URIs or unresolvable names,
    /// and an operation error if the store cannot be read.
    pub fn get_resource(&self, uri: &str) -> Result<ResourceContent> {
        let Some(path) = uri.strip_prefix(URI_SCHEME) else {
            return Err(Error::Validation(format!("Unknown resource URI: {uri}")));
        };

        match path.split_once('/') {
            None if path == "prompts" => self.read_all_prompts(uri),
            Some(("prompt", name)) if !name.is_empty() => self.read_prompt(uri, name, false),
            Some(("prompt-by-name", name)) if !name.is_empty() => self.read_prompt(uri, name, true),
            _ => Err(Error::Validation(format!("Unknown resource URI: {uri}"))),
        }
    }

    fn read_all_prompts(&self, uri: &str) -> Result<ResourceContent> {
        let prompts = self.store.list(None)?;
        let formatted: Vec<Value> = prompts.iter().map(super::format_prompt).collect();

        let payload = serde_json::json!({
            "prompts": formatted,
            "total_count": formatted.len(),
        });

        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            text: serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string()),
        })
    }

    fn read_prompt(&self, uri: &str, name: &str, with_hints: bool) -> Result<ResourceContent> {
        let resolver = NameResolver::new(self.store.as_ref());
        let resolved = resolver.resolve(name)?;

        let prompt = match resolved {
            Some(id) => self.store.get(&id)?,
            None => None,
        };

        let Some(prompt) = prompt else {
            if with_hints {
                let names = resolver.example_slugs(NAME_HINT_LIMIT)?;
                return Err(Error::Validation(format!(
                    "Prompt '{name}' not found. Available names: {}",
                    names.join(", ")
                )));
            }
            return Err(Error::Validation(format!("Prompt not found: {name}")));
        };

        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            text: serde_json::to_string_pretty(&super::format_prompt(&prompt))
                .unwrap_or_else(|_| "{}".to_string()),
        })
    }
}

/// Definition of an MCP resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Resource name.
    pub name: String,
    /// Resource description.
    pub description: String,
    /// MIME type of the content.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Content of a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    /// Resource URI.
    pub uri: String,
    /// MIME type of the content.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Text content.
    pub text: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::PromptDraft;
    use crate::storage::FilesystemPromptStore;
    use tempfile::TempDir;

    fn handler_with(titles: &[&str]) -> (TempDir, ResourceHandler, Vec<String>) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FilesystemPromptStore::new(dir.path()).unwrap());
        let ids = titles
            .iter()
            .map(|title| {
                store
                    .save(
                        &PromptDraft {
                            title: (*title).to_string(),
                            content: "body {{var}}".to_string(),
                            category: "coding".to_string(),
                            ..Default::default()
                        },
                        None,
                    )
                    .unwrap()
            })
            .collect();
        (dir, ResourceHandler::new(store), ids)
    }

    #[test]
    fn test_list_resources() {
        let (_dir, handler, _ids) = handler_with(&[]);
        let resources = handler.list_resources();
        assert_eq!(resources.len(), 3);
        assert!(resources.iter().all(|r| r.uri.starts_with("promptbin://")));
    }

    #[test]
    fn test_read_all_prompts() {
        let (_dir, handler, _ids) = handler_with(&["One", "Two"]);
        let content = handler.get_resource("promptbin://prompts").unwrap();
        assert_eq!(content.mime_type, "application/json");
        assert!(content.text.contains("\"total_count\": 2"));
    }

    #[test]
    fn test_read_prompt_by_id_and_slug() {
        let (_dir, handler, ids) = handler_with(&["My Great Prompt!"]);

        let by_id = handler
            .get_resource(&format!("promptbin://prompt/{}", ids[0]))
            .unwrap();
        assert!(by_id.text.contains("My Great Prompt!"));

        let by_slug = handler
            .get_resource("promptbin://prompt/my-great-prompt")
            .unwrap();
        assert!(by_slug.text.contains(&ids[0]));
    }

    #[test]
    fn test_read_prompt_by_name_miss_includes_hints() {
        let (_dir, handler, _ids) = handler_with(&["First Prompt", "Second Prompt"]);

        let err = handler
            .get_resource("promptbin://prompt-by-name/nothing-here")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'nothing-here' not found"));
        assert!(msg.contains("first-prompt"));
        assert!(msg.contains("second-prompt"));
    }

    #[test]
    fn test_unknown_uri_rejected() {
        let (_dir, handler, _ids) = handler_with(&[]);
        assert!(handler.get_resource("other://prompts").is_err());
        assert!(handler.get_resource("promptbin://bogus/path").is_err());
    }
}
