//! Data models for promptbin.
//!
//! This module contains the core data structures used throughout the system.

mod prompt;
mod stats;

pub use prompt::{
    Category, ContentStats, Prompt, PromptDraft, extract_template_variables,
    highlight_template_variables, parse_tags,
};
pub use stats::{ActivityEntry, RECENT_ACTIVITY_LIMIT, StoreStats};
