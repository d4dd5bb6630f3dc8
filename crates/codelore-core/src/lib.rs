//! Codelore Core Library
//!
//! This crate provides the adaptive knowledge engine behind Codelore:
//! a per-user store that learns coding patterns, tracks style preferences,
//! records accepted solutions, and serves ranked suggestions back to an
//! assistant. State lives in memory behind the store and is persisted as a
//! single JSON document per user profile.

pub mod error;
pub mod knowledge;

// Re-export commonly used types
pub use error::{KnowledgeError, KnowledgeResult};
pub use knowledge::{
    Approach, CodePattern, CodingStyle, KnowledgeBase, KnowledgeConfig, KnowledgeStats,
    KnowledgeStore, LearnContext, ProblemSolution, SharedKnowledgeStore, SuggestionContext,
    UserPreference, create_knowledge_store,
};
