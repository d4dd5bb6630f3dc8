//! Adaptive knowledge engine
//!
//! A per-user, locally-persisted store that:
//! - Learns patterns and preferences from code the user writes or accepts
//! - Records problem/solution pairs with a derived authoring approach
//! - Serves ranked suggestions and a coding-style summary back to an assistant
//! - Persists itself periodically in the background and on shutdown
//!
//! # Example
//!
//! ```rust,ignore
//! use codelore_core::knowledge::{KnowledgeConfig, KnowledgeStore, LearnContext, SuggestionContext};
//!
//! let store = KnowledgeStore::new(KnowledgeConfig::with_file_storage(profile_path));
//! store.initialize().await?;
//!
//! store
//!     .learn_from_solution(
//!         "debounce the search input",
//!         accepted_code,
//!         &LearnContext::new("typescript").with_framework("react"),
//!     )
//!     .await;
//!
//! let hints = store
//!     .get_suggestions(&SuggestionContext::new("typescript").with_problem("search feels laggy"))
//!     .await;
//!
//! store.cleanup().await?;
//! ```

pub mod patterns;
pub mod preferences;
pub mod storage;
pub mod store;
pub mod suggest;
pub mod types;

// Re-export main types from the store module
pub use store::{
    DEFAULT_AUTO_SAVE_INTERVAL, KnowledgeConfig, KnowledgeStore, SharedKnowledgeStore,
    create_knowledge_store, default_profile_path,
};

// Re-export from the extraction modules
pub use patterns::{CONTEXT_SNIPPET_MAX, classify_approach, extract_patterns};
pub use preferences::{EVIDENCE_THRESHOLD, PreferenceCandidate, detect_preferences};

// Re-export from the storage module
pub use storage::{FileKnowledgeStorage, InMemoryStorage, KnowledgeStorage};

// Re-export from the types module
pub use types::{
    Approach, CodePattern, CodingStyle, KnowledgeBase, KnowledgeMetadata, KnowledgeStats,
    LEARNING_VERSION, LearnContext, PatternKind, PatternMetadata, ProblemSolution,
    SuggestionContext, UserPreference,
};
