//! Prompt record models.
//!
//! Provides the persisted [`Prompt`] entity, the [`PromptDraft`] caller input,
//! the fixed [`Category`] set, and helpers for `{{variable}}` placeholders.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Creates a compile-time verified regex wrapped in [`LazyLock`].
///
/// # Safety
///
/// The regex pattern is verified by tests and cannot fail at runtime.
/// The `unreachable!()` branch exists only for type checking.
macro_rules! lazy_regex {
    ($pattern:expr) => {
        LazyLock::new(|| Regex::new($pattern).unwrap_or_else(|_| unreachable!()))
    };
}

/// Regex pattern for extracting template variables: `{{variable_name}}`.
static VARIABLE_PATTERN: LazyLock<Regex> = lazy_regex!(r"\{\{(\w+)\}\}");

/// Regex pattern for highlighting any content between `{{` and `}}`.
static HIGHLIGHT_PATTERN: LazyLock<Regex> = lazy_regex!(r"\{\{([^}]+)\}\}");

/// The fixed set of prompt categories.
///
/// A prompt's category determines its storage subdirectory, so membership in
/// this set is validated before anything touches the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Prompts for code generation and review.
    Coding,
    /// Prompts for prose and copywriting.
    Writing,
    /// Prompts for data and document analysis.
    Analysis,
}

impl Category {
    /// All valid categories, in storage-directory order.
    pub const ALL: [Self; 3] = [Self::Coding, Self::Writing, Self::Analysis];

    /// Returns the category name used for directories and wire payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::Writing => "writing",
            Self::Analysis => "analysis",
        }
    }

    /// Parses a category string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the string is not a member of the
    /// fixed category set.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "coding" => Ok(Self::Coding),
            "writing" => Ok(Self::Writing),
            "analysis" => Ok(Self::Analysis),
            other => Err(Error::Validation(format!(
                "Invalid category '{other}'. Must be one of: coding, writing, analysis"
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A stored prompt record.
///
/// This is the sole persisted entity; one JSON file per prompt under the
/// prompt's category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique identifier, generated at creation and never changed.
    pub id: String,
    /// Prompt title, trimmed and non-empty.
    pub title: String,
    /// The prompt body; may contain `{{variable}}` placeholders.
    pub content: String,
    /// Storage category.
    pub category: Category,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: String,
    /// Tags in user-entered order. Duplicates are preserved.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp (RFC 3339), immutable after first write.
    pub created_at: String,
    /// Last update timestamp (RFC 3339), refreshed on every save.
    pub updated_at: String,
}

impl Prompt {
    /// Computes content statistics for this prompt's body.
    #[must_use]
    pub fn content_stats(&self) -> ContentStats {
        ContentStats::from_content(&self.content)
    }
}

/// Caller-supplied prompt data, validated at save time.
///
/// Fields default to empty strings so that missing JSON keys produce the same
/// "Missing required field" validation error as explicitly empty values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PromptDraft {
    /// Prompt title (required, non-empty after trimming).
    #[serde(default)]
    pub title: String,
    /// Prompt body (required).
    #[serde(default)]
    pub content: String,
    /// Category name (required, member of the fixed set).
    #[serde(default)]
    pub category: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Comma-separated tag input, split and trimmed at save time.
    #[serde(default)]
    pub tags: String,
}

impl PromptDraft {
    /// Validates the draft and returns the parsed category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a required field is missing or empty,
    /// the title is empty after trimming, or the category is invalid.
    pub fn validate(&self) -> Result<Category> {
        for (name, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("category", &self.category),
        ] {
            if value.is_empty() {
                return Err(Error::Validation(format!("Missing required field: {name}")));
            }
        }

        let category = Category::parse(&self.category)?;

        if self.title.trim().is_empty() {
            return Err(Error::Validation("Title cannot be empty".to_string()));
        }

        Ok(category)
    }
}

/// Splits comma-separated tag input into trimmed, non-empty tags.
///
/// Order and duplicates are preserved exactly as the user entered them.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Statistics about a prompt body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    /// Number of whitespace-separated words.
    pub word_count: usize,
    /// Estimated token count (`word_count * 1.3`, truncated).
    pub token_count: usize,
    /// Unique `{{variable}}` names in order of first appearance.
    pub template_variables: Vec<String>,
}

impl ContentStats {
    /// Computes statistics for the given content.
    #[must_use]
    pub fn from_content(content: &str) -> Self {
        let word_count = content.split_whitespace().count();

        // Industry-standard rough token approximation.
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let token_count = (word_count as f64 * 1.3) as usize;

        Self {
            word_count,
            token_count,
            template_variables: extract_template_variables(content),
        }
    }
}

/// Extracts unique `{{variable}}` names from content, preserving first-seen order.
#[must_use]
pub fn extract_template_variables(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut variables = Vec::new();

    for cap in VARIABLE_PATTERN.captures_iter(content) {
        if let Some(name) = cap.get(1) {
            let name = name.as_str().to_string();
            if seen.insert(name.clone()) {
                variables.push(name);
            }
        }
    }

    variables
}

/// Wraps `{{variable}}` occurrences in a highlight span for preview rendering.
///
/// This is a plain text substitution; markdown rendering is out of scope.
#[must_use]
pub fn highlight_template_variables(content: &str) -> String {
    HIGHLIGHT_PATTERN
        .replace_all(content, r#"<span class="template-var">{{$1}}</span>"#)
        .into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_category_parse_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn test_category_parse_invalid() {
        let err = Category::parse("poetry").unwrap_err();
        assert!(err.to_string().contains("Invalid category 'poetry'"));
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&Category::Writing).unwrap();
        assert_eq!(json, "\"writing\"");
        let back: Category = serde_json::from_str("\"analysis\"").unwrap();
        assert_eq!(back, Category::Analysis);
    }

    #[test_case("", "Review {{code}}", "coding", "title" ; "missing title")]
    #[test_case("Review", "", "coding", "content" ; "missing content")]
    #[test_case("Review", "Review {{code}}", "", "category" ; "missing category")]
    fn test_draft_missing_field(title: &str, content: &str, category: &str, field: &str) {
        let draft = PromptDraft {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            ..Default::default()
        };
        let err = draft.validate().unwrap_err();
        assert!(
            err.to_string()
                .contains(&format!("Missing required field: {field}"))
        );
    }

    #[test]
    fn test_draft_whitespace_title_rejected() {
        let draft = PromptDraft {
            title: "   ".to_string(),
            content: "body".to_string(),
            category: "writing".to_string(),
            ..Default::default()
        };
        let err = draft.validate().unwrap_err();
        assert!(err.to_string().contains("Title cannot be empty"));
    }

    #[test]
    fn test_draft_invalid_category_rejected() {
        let draft = PromptDraft {
            title: "Review".to_string(),
            content: "body".to_string(),
            category: "poetry".to_string(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_parse_tags_preserves_order_and_duplicates() {
        assert_eq!(
            parse_tags("nlp, summary, nlp,  ,extra "),
            vec!["nlp", "summary", "nlp", "extra"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , , ").is_empty());
    }

    #[test]
    fn test_extract_template_variables() {
        let vars = extract_template_variables("Summarize {{text}} as {{style}}, then {{text}}");
        assert_eq!(vars, vec!["text", "style"]);
        assert!(extract_template_variables("no placeholders").is_empty());
    }

    #[test]
    fn test_content_stats() {
        let stats = ContentStats::from_content("Summarize: {{text}}");
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.token_count, 2);
        assert_eq!(stats.template_variables, vec!["text"]);

        let empty = ContentStats::from_content("");
        assert_eq!(empty.word_count, 0);
        assert_eq!(empty.token_count, 0);
        assert!(empty.template_variables.is_empty());
    }

    #[test]
    fn test_highlight_template_variables() {
        let html = highlight_template_variables("Use {{name}} here");
        assert_eq!(
            html,
            r#"Use <span class="template-var">{{name}}</span> here"#
        );
    }
}
