//! Storage layer for prompt records.
//!
//! The store owns the on-disk representation exclusively; no other component
//! writes prompt files. [`FilesystemPromptStore`] is the only backend, keeping
//! one JSON file per prompt under a directory per category.

mod filesystem;

pub use filesystem::FilesystemPromptStore;

use crate::Result;
use crate::models::{Category, Prompt, PromptDraft, StoreStats};

/// Trait for prompt storage backends.
///
/// All operations are synchronous and may block on filesystem I/O. Absence is
/// an ordinary outcome (`Option`/`bool`), never an error.
pub trait PromptStore: Send + Sync {
    /// Saves a prompt.
    ///
    /// When `id` is `None` a new id is generated and the call is a create;
    /// otherwise the existing record keyed by `id` is updated in place,
    /// preserving `created_at` and moving the file if the category changed.
    ///
    /// # Returns
    ///
    /// The id of the saved prompt (new or existing).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] for invalid drafts and
    /// [`crate::Error::OperationFailed`] for I/O failures. Validation errors
    /// are raised before any file is written.
    fn save(&self, draft: &PromptDraft, id: Option<&str>) -> Result<String>;

    /// Gets a prompt by id, scanning all category directories.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O or parse failures on an existing file;
    /// a missing prompt is `Ok(None)`.
    fn get(&self, id: &str) -> Result<Option<Prompt>>;

    /// Lists prompts, optionally restricted to one category.
    ///
    /// Results are sorted descending by `updated_at`. Files that fail to
    /// parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a category directory cannot be read.
    fn list(&self, category: Option<Category>) -> Result<Vec<Prompt>>;

    /// Deletes a prompt by id.
    ///
    /// # Returns
    ///
    /// `true` if a file was removed, `false` if the id was not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Searches prompts by case-insensitive substring match.
    ///
    /// The query is matched against title, content, description, and
    /// space-joined tags. A blank query is equivalent to
    /// [`list`](Self::list); match order follows the listing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying listing fails.
    fn search(&self, query: &str, category: Option<Category>) -> Result<Vec<Prompt>>;

    /// Computes aggregate statistics over the whole store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying listing fails.
    fn stats(&self) -> Result<StoreStats>;
}
