//! Aggregate statistics over the prompt collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Category;

/// Maximum number of entries in the recent-activity list.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// A single entry in the recent-activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Prompt id.
    pub id: String,
    /// Prompt title.
    pub title: String,
    /// Prompt category.
    pub category: Category,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

/// Aggregate statistics for the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of stored prompts.
    pub total_prompts: usize,
    /// Prompt count per category.
    pub by_category: BTreeMap<Category, usize>,
    /// Number of distinct tags across all prompts.
    pub total_tags: usize,
    /// Most recently updated prompts, newest first, capped at
    /// [`RECENT_ACTIVITY_LIMIT`].
    pub recent_activity: Vec<ActivityEntry>,
}
