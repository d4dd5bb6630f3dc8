//! Knowledge store: the aggregation root
//!
//! Owns the in-memory `KnowledgeBase` for the process lifetime. All
//! mutation happens under the write lock; queries and serialization run
//! under the read lock. Persistence is deferred: learning marks the store
//! dirty and the autosave task writes it out.

use super::patterns::{classify_approach, extract_patterns};
use super::preferences::{PreferenceCandidate, detect_preferences};
use super::storage::{FileKnowledgeStorage, InMemoryStorage, KnowledgeStorage};
use super::suggest;
use super::types::{
    CodePattern, CodingStyle, KnowledgeBase, KnowledgeStats, LearnContext, ProblemSolution,
    SuggestionContext, UserPreference,
};
use crate::error::{KnowledgeError, KnowledgeResult};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Default period between autosave ticks
pub const DEFAULT_AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Knowledge store configuration
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Profile path for the persisted document (None for in-memory)
    pub storage_path: Option<PathBuf>,
    /// Period between autosave ticks
    pub auto_save_interval: Duration,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL,
        }
    }
}

impl KnowledgeConfig {
    /// Create config with file storage at the given profile path
    pub fn with_file_storage(path: impl AsRef<Path>) -> Self {
        Self {
            storage_path: Some(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Create config rooted at the platform data directory, when available
    pub fn for_user_profile() -> Option<Self> {
        default_profile_path().map(Self::with_file_storage)
    }

    /// Set the autosave period
    pub fn auto_save_interval(mut self, interval: Duration) -> Self {
        self.auto_save_interval = interval;
        self
    }
}

/// Default profile path under the platform data directory
pub fn default_profile_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("codelore").join("knowledge-base.json"))
}

/// Thread-safe shared knowledge store
pub type SharedKnowledgeStore = Arc<KnowledgeStore>;

/// The adaptive knowledge store
pub struct KnowledgeStore {
    base: Arc<RwLock<KnowledgeBase>>,
    storage: Arc<dyn KnowledgeStorage>,
    dirty: Arc<AtomicBool>,
    auto_save: Mutex<Option<tokio::task::JoinHandle<()>>>,
    auto_save_interval: Duration,
}

impl KnowledgeStore {
    /// Create a new knowledge store
    pub fn new(config: KnowledgeConfig) -> Self {
        let storage: Arc<dyn KnowledgeStorage> = match &config.storage_path {
            Some(path) => Arc::new(FileKnowledgeStorage::new(path)),
            None => Arc::new(InMemoryStorage::new()),
        };

        Self {
            base: Arc::new(RwLock::new(KnowledgeBase::new())),
            storage,
            dirty: Arc::new(AtomicBool::new(false)),
            auto_save: Mutex::new(None),
            auto_save_interval: config.auto_save_interval,
        }
    }

    /// Load the persisted knowledge base and start the autosave task
    ///
    /// A missing document is not an error: a fresh base is created and
    /// immediately persisted so a valid document exists afterwards. An
    /// unreadable document is handled the same way, at a visible severity,
    /// since prior history is lost.
    pub async fn initialize(&self) -> KnowledgeResult<()> {
        match self.storage.load().await {
            Ok(Some(base)) => {
                info!("Loaded knowledge base with {} patterns", base.patterns.len());
                *self.base.write().await = base;
            }
            Ok(None) => {
                info!("No existing knowledge base found, creating a new one");
                self.save().await?;
            }
            Err(err) => {
                warn!("Knowledge base is unreadable, starting fresh: {}", err);
                self.save().await?;
            }
        }

        self.start_auto_save().await;
        info!("Knowledge engine initialized");
        Ok(())
    }

    /// Learn from an accepted solution
    ///
    /// Total over arbitrary text: extraction and preference tracking never
    /// fail, the in-memory merge is synchronous, and persistence is left to
    /// the autosave tick. Increments `total_interactions` exactly once.
    pub async fn learn_from_solution(&self, problem: &str, solution: &str, context: &LearnContext) {
        let candidates = extract_patterns(solution, context);
        let preferences = detect_preferences(solution);
        let record = ProblemSolution::new(problem, solution, classify_approach(solution), context);

        let mut base = self.base.write().await;
        base.solutions.push(record);
        for candidate in candidates {
            merge_pattern(&mut base.patterns, candidate);
        }
        for candidate in preferences {
            merge_preference(&mut base.preferences, candidate);
        }
        base.metadata.total_interactions += 1;
        drop(base);

        self.dirty.store(true, Ordering::SeqCst);
        info!("Learned from solution: {}", preview(problem));
    }

    /// Get ranked suggestions for a context
    ///
    /// Up to five pattern hints for the context language, most frequent
    /// first, then up to three hints from similar past solutions when a
    /// problem description is supplied.
    pub async fn get_suggestions(&self, context: &SuggestionContext) -> Vec<String> {
        let base = self.base.read().await;

        let mut suggestions: Vec<String> =
            suggest::top_patterns(&base.patterns, &context.language, 5)
                .into_iter()
                .map(|p| format!("Consider using {} (used {} times)", p.pattern, p.frequency))
                .collect();

        if let Some(problem) = &context.problem {
            suggestions.extend(
                suggest::similar_solutions(&base.solutions, problem)
                    .into_iter()
                    .take(3)
                    .map(|s| format!("Similar problem solved with: {}", s.approach)),
            );
        }

        suggestions
    }

    /// Find past solutions similar to a problem description
    pub async fn find_similar_solutions(&self, problem: &str) -> Vec<ProblemSolution> {
        let base = self.base.read().await;
        suggest::similar_solutions(&base.solutions, problem)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Summarize the user's coding style
    pub async fn coding_style(&self) -> CodingStyle {
        let base = self.base.read().await;

        let mut preferences = base.preferences.clone();
        preferences.sort_by(|a, b| {
            b.strength
                .partial_cmp(&a.strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        preferences.truncate(10);

        let mut top_patterns = base.patterns.clone();
        top_patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        top_patterns.truncate(10);

        CodingStyle {
            preferences,
            top_patterns,
            favorite_approach: favorite_approach(&base.solutions),
        }
    }

    /// Get store-level statistics
    pub async fn statistics(&self) -> KnowledgeStats {
        let base = self.base.read().await;
        KnowledgeStats {
            total_patterns: base.patterns.len(),
            total_preferences: base.preferences.len(),
            total_solutions: base.solutions.len(),
            total_interactions: base.metadata.total_interactions,
            learning_age_days: (Utc::now() - base.metadata.created_at).num_days(),
        }
    }

    /// Persist the aggregate to the profile path
    pub async fn save(&self) -> KnowledgeResult<()> {
        let snapshot = {
            let mut base = self.base.write().await;
            base.metadata.last_updated = Utc::now();
            base.clone()
        };

        self.storage.save(&snapshot).await?;
        self.dirty.store(false, Ordering::SeqCst);
        debug!("Knowledge base saved");
        Ok(())
    }

    /// Export the aggregate to a caller-chosen path
    pub async fn export_knowledge(&self, path: impl AsRef<Path>) -> KnowledgeResult<()> {
        let snapshot = self.base.read().await.clone();
        let content = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(path.as_ref(), content).await?;
        info!("Knowledge base exported to {}", path.as_ref().display());
        Ok(())
    }

    /// Replace the aggregate from an export file
    ///
    /// A file that does not parse as a full knowledge base fails the call
    /// and leaves the in-memory state untouched.
    pub async fn import_knowledge(&self, path: impl AsRef<Path>) -> KnowledgeResult<()> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let imported: KnowledgeBase =
            serde_json::from_str(&content).map_err(|err| KnowledgeError::import(err.to_string()))?;

        *self.base.write().await = imported;
        self.save().await?;
        info!("Knowledge base imported");
        Ok(())
    }

    /// Reset to an empty knowledge base and persist it
    pub async fn clear(&self) -> KnowledgeResult<()> {
        *self.base.write().await = KnowledgeBase::new();
        self.save().await
    }

    /// Start the periodic autosave task
    ///
    /// Idempotent: a second call while the task runs is a no-op. Ticks that
    /// find the store clean skip I/O entirely; a failed save keeps the
    /// dirty flag set so the next tick retries.
    pub async fn start_auto_save(&self) {
        let mut guard = self.auto_save.lock().await;
        if guard.is_some() {
            return;
        }

        let base = Arc::clone(&self.base);
        let storage = Arc::clone(&self.storage);
        let dirty = Arc::clone(&self.dirty);
        let period = self.auto_save_interval;

        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; consume it so the
            // first save happens one full period after startup.
            interval.tick().await;

            loop {
                interval.tick().await;

                if !dirty.swap(false, Ordering::SeqCst) {
                    continue;
                }

                let snapshot = {
                    let mut locked = base.write().await;
                    locked.metadata.last_updated = Utc::now();
                    locked.clone()
                };

                if let Err(err) = storage.save(&snapshot).await {
                    error!("Failed to save knowledge base: {}", err);
                    dirty.store(true, Ordering::SeqCst);
                } else {
                    debug!("Knowledge base autosaved");
                }
            }
        }));
    }

    /// Stop the autosave task
    pub async fn stop_auto_save(&self) {
        if let Some(handle) = self.auto_save.lock().await.take() {
            handle.abort();
        }
    }

    /// Stop the autosave task and perform one final save
    pub async fn cleanup(&self) -> KnowledgeResult<()> {
        self.stop_auto_save().await;
        self.save().await?;
        info!("Knowledge engine cleaned up");
        Ok(())
    }
}

/// Create a shared knowledge store
pub fn create_knowledge_store(config: KnowledgeConfig) -> SharedKnowledgeStore {
    Arc::new(KnowledgeStore::new(config))
}

/// Merge a pattern candidate into the live collection by natural key
fn merge_pattern(patterns: &mut Vec<CodePattern>, candidate: CodePattern) {
    match patterns
        .iter_mut()
        .find(|p| p.natural_key() == candidate.natural_key())
    {
        Some(existing) => existing.reinforce(candidate.frequency),
        None => patterns.push(candidate),
    }
}

/// Merge a preference candidate into the live collection by natural key
fn merge_preference(preferences: &mut Vec<UserPreference>, candidate: PreferenceCandidate) {
    match preferences
        .iter_mut()
        .find(|p| p.natural_key() == (candidate.category, candidate.preference))
    {
        Some(existing) => existing.reinforce(),
        None => preferences.push(UserPreference::new(candidate.category, candidate.preference)),
    }
}

/// Mode of recorded approaches; ties keep the first-encountered approach
fn favorite_approach(solutions: &[ProblemSolution]) -> Option<super::types::Approach> {
    let mut counts: Vec<(super::types::Approach, usize)> = Vec::new();
    for solution in solutions {
        match counts.iter_mut().find(|(a, _)| *a == solution.approach) {
            Some((_, n)) => *n += 1,
            None => counts.push((solution.approach, 1)),
        }
    }

    let mut best: Option<(super::types::Approach, usize)> = None;
    for (approach, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((approach, count)),
        }
    }
    best.map(|(approach, _)| approach)
}

/// First 50 chars of a problem, for log lines
fn preview(problem: &str) -> String {
    let head: String = problem.chars().take(50).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::types::Approach;
    use tempfile::TempDir;

    const RICH_SNIPPET: &str = r#"
async load(id) {
    try {
        const { data } = await api.get(`user ${id}`);
        const render = (x) => { return x; };
        return data?.name ?? render(data);
    } catch (err) { throw err; }
}
"#;

    fn ts() -> LearnContext {
        LearnContext::new("typescript")
    }

    #[tokio::test]
    async fn test_learn_increments_interactions_once() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        assert_eq!(store.statistics().await.total_interactions, 1);

        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        assert_eq!(store.statistics().await.total_interactions, 2);
    }

    #[tokio::test]
    async fn test_repeat_learn_merges_by_natural_key() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        let first = store.statistics().await;

        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        let second = store.statistics().await;

        // Solutions are append-only, patterns and preferences merge
        assert_eq!(second.total_solutions, first.total_solutions + 1);
        assert_eq!(second.total_patterns, first.total_patterns);
        assert_eq!(second.total_preferences, first.total_preferences);

        let style = store.coding_style().await;
        let async_await = style
            .top_patterns
            .iter()
            .find(|p| p.pattern == "async-await")
            .unwrap();
        assert_eq!(async_await.frequency, 2);
        assert!((async_await.confidence - 0.55).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_suggestions_need_reinforcement() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());
        let context = SuggestionContext::new("typescript");

        // One observation leaves confidence at the 0.5 gate
        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        assert!(store.get_suggestions(&context).await.is_empty());

        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        let suggestions = store.get_suggestions(&context).await;
        assert!(!suggestions.is_empty());
        assert!(suggestions[0].starts_with("Consider using "));
    }

    #[tokio::test]
    async fn test_suggestion_caps_and_order() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        // RICH_SNIPPET trips all seven detectors; reinforce them past the gate
        store.learn_from_solution("fix websocket leak", RICH_SNIPPET, &ts()).await;
        store.learn_from_solution("fix websocket leak", RICH_SNIPPET, &ts()).await;
        store.learn_from_solution("fix websocket retry", RICH_SNIPPET, &ts()).await;
        store.learn_from_solution("fix websocket ping", RICH_SNIPPET, &ts()).await;

        let context = SuggestionContext::new("typescript").with_problem("websocket handler");
        let suggestions = store.get_suggestions(&context).await;

        let pattern_hints: Vec<&String> = suggestions
            .iter()
            .filter(|s| s.starts_with("Consider using "))
            .collect();
        let solution_hints: Vec<&String> = suggestions
            .iter()
            .filter(|s| s.starts_with("Similar problem solved with: "))
            .collect();

        assert_eq!(pattern_hints.len(), 5);
        assert_eq!(solution_hints.len(), 3);

        // Pattern hints come first and are frequency-descending
        assert!(suggestions[0].starts_with("Consider using "));
        let frequencies: Vec<u32> = pattern_hints
            .iter()
            .map(|s| {
                s.split("(used ")
                    .nth(1)
                    .and_then(|tail| tail.split(' ').next())
                    .and_then(|n| n.parse().ok())
                    .unwrap()
            })
            .collect();
        let mut sorted = frequencies.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(frequencies, sorted);
    }

    #[tokio::test]
    async fn test_suggestions_skip_other_languages() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;

        let context = SuggestionContext::new("python");
        assert!(store.get_suggestions(&context).await.is_empty());
    }

    #[tokio::test]
    async fn test_favorite_approach_mode_and_tie_break() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        // First-encountered wins a tie
        store
            .learn_from_solution("transform", "items.map((x) => x * 2)", &ts())
            .await;
        store
            .learn_from_solution("model", "class Repo extends Base {}", &ts())
            .await;
        assert_eq!(
            store.coding_style().await.favorite_approach,
            Some(Approach::Functional)
        );

        // A second class-based solution breaks the tie
        store
            .learn_from_solution("model", "class User extends Base {}", &ts())
            .await;
        assert_eq!(
            store.coding_style().await.favorite_approach,
            Some(Approach::ObjectOriented)
        );
    }

    #[tokio::test]
    async fn test_coding_style_empty_store() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());
        let style = store.coding_style().await;

        assert!(style.preferences.is_empty());
        assert!(style.top_patterns.is_empty());
        assert_eq!(style.favorite_approach, None);
    }

    #[tokio::test]
    async fn test_statistics_fresh_store() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());
        let stats = store.statistics().await;

        assert_eq!(stats.total_patterns, 0);
        assert_eq!(stats.total_interactions, 0);
        assert_eq!(stats.learning_age_days, 0);
    }

    #[tokio::test]
    async fn test_find_similar_solutions() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        store
            .learn_from_solution("close websocket on unmount", "socket.close()", &ts())
            .await;
        // Keyword overlap is substring-based, so the decoy must not even
        // contain "in" (a token of the query below)
        store
            .learn_from_solution("throttle scroll events", "onScroll(throttle(fn))", &ts())
            .await;

        let similar = store
            .find_similar_solutions("fix memory leak in websocket handler")
            .await;
        assert_eq!(similar.len(), 1);
        assert!(similar[0].problem.contains("websocket"));
    }

    #[tokio::test]
    async fn test_export_import_roundtrip() {
        let temp = TempDir::new().unwrap();
        let export_path = temp.path().join("export.json");

        let store = KnowledgeStore::new(KnowledgeConfig::default());
        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        store.export_knowledge(&export_path).await.unwrap();

        let other = KnowledgeStore::new(KnowledgeConfig::default());
        other.import_knowledge(&export_path).await.unwrap();

        let original = store.statistics().await;
        let imported = other.statistics().await;
        assert_eq!(imported.total_patterns, original.total_patterns);
        assert_eq!(imported.total_preferences, original.total_preferences);
        assert_eq!(imported.total_solutions, original.total_solutions);
        assert_eq!(imported.total_interactions, original.total_interactions);

        let style = other.coding_style().await;
        assert!(style.top_patterns.iter().any(|p| p.pattern == "async-await"));
    }

    #[tokio::test]
    async fn test_import_malformed_leaves_state_untouched() {
        let temp = TempDir::new().unwrap();
        let bad_path = temp.path().join("bad.json");
        tokio::fs::write(&bad_path, "{ \"patterns\": 42 }").await.unwrap();

        let store = KnowledgeStore::new(KnowledgeConfig::default());
        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;
        let before = store.statistics().await;

        let result = store.import_knowledge(&bad_path).await;
        assert!(matches!(result, Err(KnowledgeError::Import(_))));

        let after = store.statistics().await;
        assert_eq!(after.total_interactions, before.total_interactions);
        assert_eq!(after.total_patterns, before.total_patterns);
    }

    #[tokio::test]
    async fn test_import_missing_file_is_io_error() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());
        let result = store.import_knowledge("/nonexistent/export.json").await;
        assert!(matches!(result, Err(KnowledgeError::Io(_))));
    }

    #[tokio::test]
    async fn test_clear_resets_aggregate() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());
        store.learn_from_solution("load a user", RICH_SNIPPET, &ts()).await;

        store.clear().await.unwrap();

        let stats = store.statistics().await;
        assert_eq!(stats.total_patterns, 0);
        assert_eq!(stats.total_solutions, 0);
        assert_eq!(stats.total_interactions, 0);
    }

    #[tokio::test]
    async fn test_quote_preference_scenario() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());

        let code = r#"
log("alpha");
log("beta");
log("gamma");
log("delta");
log("epsilon");
"#;
        store.learn_from_solution("log some words", code, &ts()).await;

        let style = store.coding_style().await;
        assert!(style
            .preferences
            .iter()
            .any(|p| p.category == "quote-style" && p.preference == "double-quotes"));
        assert!(!style
            .preferences
            .iter()
            .any(|p| p.preference == "single-quotes"));
    }

    #[tokio::test]
    async fn test_preference_strength_accumulates() {
        let store = KnowledgeStore::new(KnowledgeConfig::default());
        let code = "a;\nb;\nc;\nd;\ne;\nf;\ng;";

        store.learn_from_solution("first", code, &ts()).await;
        store.learn_from_solution("second", code, &ts()).await;

        let style = store.coding_style().await;
        let semis = style
            .preferences
            .iter()
            .find(|p| p.preference == "use-semicolons")
            .unwrap();
        assert!((semis.strength - 0.35).abs() < f32::EPSILON);
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(80);
        let line = preview(&long);
        assert_eq!(line.chars().count(), 53);
        assert!(line.ends_with("..."));
    }
}
