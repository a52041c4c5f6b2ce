//! # PromptBin
//!
//! A personal knowledge-base for reusable text prompts.
//!
//! PromptBin stores categorized prompt snippets as JSON files on disk and
//! exposes them through a CLI, a JSON web API, and an MCP server so AI tools
//! can address prompts by id or by human-friendly name.
//!
//! ## Features
//!
//! - File-based store: one JSON file per prompt, partitioned by category
//! - Linear full-text search over title, content, description, and tags
//! - Name resolution: slugified titles resolve to canonical prompt ids
//! - MCP server (stdio JSON-RPC) for AI agent interoperability
//! - Axum-based JSON API mirroring the web surface
//!
//! ## Example
//!
//! ```rust,ignore
//! use promptbin::{FilesystemPromptStore, PromptDraft, PromptStore};
//!
//! let store = FilesystemPromptStore::new("prompts")?;
//! let id = store.save(
//!     &PromptDraft {
//!         title: "Summarize".to_string(),
//!         content: "Summarize: {{text}}".to_string(),
//!         category: "writing".to_string(),
//!         ..Default::default()
//!     },
//!     None,
//! )?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod mcp;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
pub mod web;

// Re-exports for convenience
pub use config::PromptBinConfig;
pub use models::{
    ActivityEntry, Category, ContentStats, Prompt, PromptDraft, StoreStats,
    extract_template_variables, highlight_template_variables, parse_tags,
};
pub use services::NameResolver;
pub use storage::{FilesystemPromptStore, PromptStore};

/// Error type for promptbin operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Validation` | Missing required fields, empty title, invalid category |
/// | `OperationFailed` | Filesystem I/O errors, JSON serialization failures |
///
/// Absence is never an error: `get` returns `Option`, `delete` returns `bool`,
/// and `resolve` returns `Option`. Unparseable files encountered during a
/// listing scan are logged and skipped rather than propagated.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid caller input.
    ///
    /// Raised when:
    /// - A required field (title, content, category) is missing or empty
    /// - The title is empty after trimming
    /// - The category is not one of the fixed set
    /// - A search query required to be non-blank is blank
    ///
    /// Always caller-recoverable; mapped to a 400-style outcome at the edges.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem reads, writes, or deletes fail
    /// - A prompt record cannot be serialized or deserialized
    /// - The store directories cannot be created
    ///
    /// Surfaced to callers as an opaque failure; the specific cause is logged
    /// but internal paths are not leaked through the web or MCP surfaces.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for promptbin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current time as an RFC 3339 UTC timestamp string.
///
/// Microsecond precision keeps successive saves distinguishable, and the
/// fixed-width UTC format makes lexicographic ordering chronological, which
/// the store relies on when sorting by `updated_at`.
///
/// # Examples
///
/// ```rust
/// let ts = promptbin::current_timestamp();
/// assert!(ts.ends_with('Z'));
/// ```
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("Missing required field: title".to_string());
        assert_eq!(
            err.to_string(),
            "validation failed: Missing required field: title"
        );

        let err = Error::OperationFailed {
            operation: "write_prompt_file".to_string(),
            cause: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operation 'write_prompt_file' failed: permission denied"
        );
    }

    #[test]
    fn test_current_timestamp_sorts_chronologically() {
        let a = current_timestamp();
        let b = current_timestamp();
        assert!(a <= b);
    }
}
