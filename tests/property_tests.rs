//! Property-based tests for prompt handling.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Slugification is idempotent and produces a closed character set
//! - Tag parsing never yields empty tags
//! - A blank search query is equivalent to listing
//! - Variable extraction never duplicates names

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use promptbin::models::{PromptDraft, extract_template_variables, parse_tags};
use promptbin::services::slugify;
use promptbin::storage::{FilesystemPromptStore, PromptStore};
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    /// Property: slugify output contains only lowercase word chars and hyphens,
    /// never at the edges.
    #[test]
    fn prop_slug_charset(title in ".{0,80}") {
        let slug = slugify(&title);
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(slug.chars().all(|c| c == '-' || (!c.is_uppercase() && !c.is_whitespace())));
    }

    /// Property: slugify is idempotent.
    #[test]
    fn prop_slug_idempotent(title in ".{0,80}") {
        let once = slugify(&title);
        prop_assert_eq!(slugify(&once), once);
    }

    /// Property: parsed tags are trimmed and non-empty.
    #[test]
    fn prop_tags_trimmed_non_empty(raw in "[a-z, ]{0,60}") {
        let tags = parse_tags(&raw);
        prop_assert!(tags.iter().all(|t| !t.is_empty() && t.trim() == t));
    }

    /// Property: extracted variable names are unique.
    #[test]
    fn prop_variables_unique(content in "[a-z{} ]{0,120}") {
        let vars = extract_template_variables(&content);
        let unique: std::collections::HashSet<_> = vars.iter().collect();
        prop_assert_eq!(unique.len(), vars.len());
    }

    /// Property: a whitespace-only query matches everything a listing returns.
    #[test]
    fn prop_blank_search_equals_list(query in "[ \t]{0,10}", titles in proptest::collection::vec("[a-zA-Z]{1,12}", 0..5)) {
        let dir = TempDir::new().unwrap();
        let store = FilesystemPromptStore::new(dir.path()).unwrap();
        for title in &titles {
            store
                .save(
                    &PromptDraft {
                        title: title.clone(),
                        content: "body".to_string(),
                        category: "coding".to_string(),
                        ..Default::default()
                    },
                    None,
                )
                .unwrap();
        }

        let listed: Vec<String> = store.list(None).unwrap().into_iter().map(|p| p.id).collect();
        let searched: Vec<String> = store.search(&query, None).unwrap().into_iter().map(|p| p.id).collect();
        prop_assert_eq!(listed, searched);
    }
}
