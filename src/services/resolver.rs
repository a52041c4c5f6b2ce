//! Name resolution for prompt addressing.
//!
//! Protocol callers may address a prompt by its canonical id or by a
//! slugified form of its title. The resolver translates either form into the
//! canonical id by delegating to the store.

use crate::storage::PromptStore;
use crate::{Result, models::Prompt};
use regex::Regex;
use std::sync::LazyLock;

/// Strips characters outside word characters, whitespace, and hyphens.
static SLUG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap_or_else(|_| unreachable!()));

/// Collapses runs of whitespace, underscores, and hyphens.
static SLUG_COLLAPSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").unwrap_or_else(|_| unreachable!()));

/// Computes the slug form of a title.
///
/// Lowercases, strips everything outside word characters, whitespace, and
/// hyphens, then collapses separator runs into single hyphens and trims
/// leading and trailing hyphens.
///
/// # Examples
///
/// ```rust
/// assert_eq!(promptbin::services::slugify("My Great Prompt!"), "my-great-prompt");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    SLUG_COLLAPSE
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string()
}

/// Resolves human-supplied names to canonical prompt ids.
pub struct NameResolver<'a> {
    /// The store resolution delegates to.
    store: &'a dyn PromptStore,
}

impl<'a> NameResolver<'a> {
    /// Creates a resolver over the given store.
    #[must_use]
    pub const fn new(store: &'a dyn PromptStore) -> Self {
        Self { store }
    }

    /// Resolves a name to a canonical prompt id.
    ///
    /// Resolution order:
    /// 1. An empty name never resolves.
    /// 2. If the name is an existing id, it is returned unchanged.
    /// 3. Otherwise the first prompt whose slugified title equals the
    ///    lowercased input wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A name with no match is
    /// `Ok(None)`, not an error.
    pub fn resolve(&self, name: &str) -> Result<Option<String>> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        // Direct id lookup first.
        if self.store.get(name)?.is_some() {
            return Ok(Some(name.to_string()));
        }

        // Slugs are already lowercase, so only the input needs folding.
        let wanted = name.to_lowercase();
        let prompts = self.store.list(None)?;

        Ok(prompts
            .iter()
            .find(|p| !p.title.is_empty() && slugify(&p.title) == wanted)
            .map(|p| p.id.clone()))
    }

    /// Returns example slugs for the first `limit` prompts.
    ///
    /// Used to build disambiguation hints when a name fails to resolve. This
    /// is a presentation convenience, not part of the resolution contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn example_slugs(&self, limit: usize) -> Result<Vec<String>> {
        let prompts = self.store.list(None)?;
        Ok(prompts
            .iter()
            .take(limit)
            .filter(|p| !p.title.is_empty())
            .map(|p: &Prompt| slugify(&p.title))
            .collect())
    }
}
