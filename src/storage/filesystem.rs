//! Filesystem-based prompt storage.
//!
//! Stores each prompt as a JSON file at `{data_dir}/{category}/{id}.json`.

use super::PromptStore;
use crate::current_timestamp;
use crate::models::{
    ActivityEntry, Category, Prompt, PromptDraft, RECENT_ACTIVITY_LIMIT, StoreStats, parse_tags,
};
use crate::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-based prompt store.
///
/// The category directories are created at construction time. Lookup by id is
/// a linear scan over the fixed category set, an accepted O(categories) cost
/// at this scale.
pub struct FilesystemPromptStore {
    /// Root directory holding one subdirectory per category.
    data_dir: PathBuf,
}

impl FilesystemPromptStore {
    /// Creates a new filesystem prompt store, ensuring all category
    /// directories exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a category directory cannot be created.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();

        for category in Category::ALL {
            let dir = data_dir.join(category.as_str());
            fs::create_dir_all(&dir).map_err(|e| Error::OperationFailed {
                operation: "create_category_dir".to_string(),
                cause: e.to_string(),
            })?;
            tracing::debug!(dir = %dir.display(), "Ensured category directory exists");
        }

        Ok(Self { data_dir })
    }

    /// Returns the root data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Generates a unique id for a new prompt: `<timestamp>_<8-hex-random>`.
    ///
    /// The timestamp prefix keeps ids roughly sortable; the random suffix
    /// makes collisions impractical.
    fn generate_id() -> String {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let suffix: String = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        format!("{timestamp}_{suffix}")
    }

    /// Gets the file path for a prompt.
    fn prompt_path(&self, id: &str, category: Category) -> PathBuf {
        self.data_dir
            .join(category.as_str())
            .join(format!("{id}.json"))
    }

    /// Rejects ids that could escape the data directory when joined into a
    /// path. Generated ids never contain these sequences.
    fn is_safe_id(id: &str) -> bool {
        !id.contains(['/', '\\']) && !id.contains("..")
    }

    /// Finds a prompt file by id across all categories.
    fn find_prompt_file(&self, id: &str) -> Option<(Category, PathBuf)> {
        if !Self::is_safe_id(id) {
            return None;
        }
        Category::ALL.into_iter().find_map(|category| {
            let path = self.prompt_path(id, category);
            path.exists().then_some((category, path))
        })
    }

    /// Reads and parses a prompt file.
    fn read_prompt_file(path: &Path) -> Result<Prompt> {
        let content = fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_prompt_file".to_string(),
            cause: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| Error::OperationFailed {
            operation: "parse_prompt_json".to_string(),
            cause: e.to_string(),
        })
    }

    /// Writes a prompt record as pretty-printed UTF-8 JSON.
    fn write_prompt_file(path: &Path, prompt: &Prompt) -> Result<()> {
        let content = serde_json::to_string_pretty(prompt).map_err(|e| Error::OperationFailed {
            operation: "serialize_prompt".to_string(),
            cause: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| Error::OperationFailed {
            operation: "write_prompt_file".to_string(),
            cause: e.to_string(),
        })
    }

    /// Lists the parseable prompts in a single category directory.
    ///
    /// Unreadable or unparseable files are logged and skipped; they never
    /// abort the scan.
    fn list_category(&self, category: Category) -> Result<Vec<Prompt>> {
        let dir = self.data_dir.join(category.as_str());
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| Error::OperationFailed {
            operation: "list_category_dir".to_string(),
            cause: e.to_string(),
        })?;

        let mut prompts = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match Self::read_prompt_file(&path) {
                Ok(prompt) => prompts.push(prompt),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable prompt file"
                    );
                },
            }
        }

        Ok(prompts)
    }
}

impl PromptStore for FilesystemPromptStore {
    fn save(&self, draft: &PromptDraft, id: Option<&str>) -> Result<String> {
        // Validate before anything touches the disk.
        let category = draft.validate()?;

        let (id, is_new) = match id {
            Some(existing) => {
                if !Self::is_safe_id(existing) {
                    return Err(Error::Validation(format!("Invalid prompt id: {existing}")));
                }
                (existing.to_string(), false)
            },
            None => (Self::generate_id(), true),
        };

        let now = current_timestamp();

        // Preserve created_at across updates.
        let created_at = if is_new {
            now.clone()
        } else {
            self.get(&id)?.map_or_else(|| now.clone(), |p| p.created_at)
        };

        // Category move: remove the old file so (id, category) stays unique.
        if !is_new {
            if let Some((old_category, old_path)) = self.find_prompt_file(&id) {
                if old_category != category {
                    fs::remove_file(&old_path).map_err(|e| Error::OperationFailed {
                        operation: "remove_old_prompt_file".to_string(),
                        cause: e.to_string(),
                    })?;
                    tracing::info!(
                        id = %id,
                        from = %old_category,
                        to = %category,
                        "Moved prompt between categories"
                    );
                }
            }
        }

        let prompt = Prompt {
            id: id.clone(),
            title: draft.title.trim().to_string(),
            content: draft.content.clone(),
            category,
            description: draft.description.trim().to_string(),
            tags: parse_tags(&draft.tags),
            created_at,
            updated_at: now,
        };

        let path = self.prompt_path(&id, category);
        Self::write_prompt_file(&path, &prompt)?;

        tracing::info!(
            id = %id,
            category = %category,
            "{} prompt",
            if is_new { "Created" } else { "Updated" }
        );

        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<Prompt>> {
        match self.find_prompt_file(id) {
            Some((_, path)) => Self::read_prompt_file(&path).map(Some),
            None => Ok(None),
        }
    }

    fn list(&self, category: Option<Category>) -> Result<Vec<Prompt>> {
        let categories: Vec<Category> =
            category.map_or_else(|| Category::ALL.to_vec(), |c| vec![c]);

        let mut prompts = Vec::new();
        for cat in categories {
            prompts.extend(self.list_category(cat)?);
        }

        // Lexicographic order on RFC 3339 UTC strings is chronological.
        prompts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(prompts)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let Some((_, path)) = self.find_prompt_file(id) else {
            return Ok(false);
        };

        fs::remove_file(&path).map_err(|e| Error::OperationFailed {
            operation: "delete_prompt_file".to_string(),
            cause: e.to_string(),
        })?;

        tracing::info!(id = %id, "Deleted prompt");
        Ok(true)
    }

    fn search(&self, query: &str, category: Option<Category>) -> Result<Vec<Prompt>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(category);
        }

        let query_lower = query.to_lowercase();
        let prompts = self.list(category)?;

        Ok(prompts
            .into_iter()
            .filter(|p| {
                let haystack = format!(
                    "{} {} {} {}",
                    p.title,
                    p.content,
                    p.description,
                    p.tags.join(" ")
                )
                .to_lowercase();
                haystack.contains(&query_lower)
            })
            .collect())
    }

    fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();
        let mut distinct_tags: HashSet<String> = HashSet::new();
        let mut activity: Vec<ActivityEntry> = Vec::new();

        for category in Category::ALL {
            let prompts = self.list(Some(category))?;
            stats.by_category.insert(category, prompts.len());
            stats.total_prompts += prompts.len();

            for prompt in prompts {
                distinct_tags.extend(prompt.tags.iter().cloned());
                activity.push(ActivityEntry {
                    id: prompt.id,
                    title: prompt.title,
                    category: prompt.category,
                    updated_at: prompt.updated_at,
                });
            }
        }

        activity.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        activity.truncate(RECENT_ACTIVITY_LIMIT);

        stats.total_tags = distinct_tags.len();
        stats.recent_activity = activity;

        Ok(stats)
    }
}
