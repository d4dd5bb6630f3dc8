//! Knowledge base types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into every persisted knowledge base
pub const LEARNING_VERSION: &str = "1.0.0";

/// Confidence gained by a pattern on every merge
pub const CONFIDENCE_INCREMENT: f32 = 0.05;

/// Confidence assigned to a freshly observed pattern
pub const INITIAL_CONFIDENCE: f32 = 0.5;

/// Strength gained by a preference on every reinforcement
pub const STRENGTH_INCREMENT: f32 = 0.05;

/// Strength assigned to a freshly inferred preference
pub const INITIAL_STRENGTH: f32 = 0.3;

/// Generate a unique record id
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Kind of observation a pattern represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// A reusable solution shape
    Solution,
    /// An inferred preference
    Preference,
    /// A stylistic construct
    Style,
    /// An architectural construct
    Architecture,
}

impl PatternKind {
    /// Get display name
    pub fn name(&self) -> &str {
        match self {
            Self::Solution => "solution",
            Self::Preference => "preference",
            Self::Style => "style",
            Self::Architecture => "architecture",
        }
    }
}

/// Authoring approach of a recorded solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Approach {
    /// Class/inheritance based
    ObjectOriented,
    /// Lambda plus transform based
    Functional,
    /// Asynchronous control flow first
    AsyncFirst,
    /// None of the above
    Procedural,
}

impl Approach {
    /// Get display name
    pub fn name(&self) -> &str {
        match self {
            Self::ObjectOriented => "object-oriented",
            Self::Functional => "functional",
            Self::AsyncFirst => "async-first",
            Self::Procedural => "procedural",
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Language/framework context attached to a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMetadata {
    /// Language the pattern was observed in
    pub language: String,
    /// Framework, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Caller-supplied tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A recurring stylistic or structural observation
///
/// Natural key is `(pattern, category)`: at most one live record exists per
/// key, and repeat observations merge into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodePattern {
    /// Unique identifier
    pub id: String,
    /// Kind of observation (`type` is reserved in Rust, so the wire name
    /// is restored through serde)
    #[serde(rename = "type")]
    pub kind: PatternKind,
    /// Free-form grouping, e.g. `async-programming`
    pub category: String,
    /// Detector name, e.g. `async-await`
    pub pattern: String,
    /// First matched snippet, truncated for human inspection
    pub context: String,
    /// How many times the construct has been observed
    pub frequency: u32,
    /// When the pattern was last observed
    pub last_used: DateTime<Utc>,
    /// Reinforcement score in [0, 1]
    pub confidence: f32,
    /// Observation context
    pub metadata: PatternMetadata,
}

impl CodePattern {
    /// Natural key identifying this pattern for merging
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.pattern, &self.category)
    }

    /// Merge a repeat observation into this record
    ///
    /// Frequency accumulates, confidence steps toward 1.0, and `last_used`
    /// advances to the merge time.
    pub fn reinforce(&mut self, observed: u32) {
        self.frequency += observed;
        self.confidence = (self.confidence + CONFIDENCE_INCREMENT).min(1.0);
        self.last_used = Utc::now();
    }
}

/// An inferred choice among mutually exclusive style alternatives
///
/// Natural key is `(category, preference)`. Conflicting labels within one
/// category are independent records; the strongest wins at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    /// Unique identifier
    pub id: String,
    /// Alternative group, e.g. `quote-style`
    pub category: String,
    /// Chosen label, e.g. `single-quotes`
    pub preference: String,
    /// Reinforcement score in [0, 1]
    pub strength: f32,
    /// Evidence snippets (reserved, not yet populated)
    #[serde(default)]
    pub examples: Vec<String>,
    /// When the preference was first inferred
    pub learned_at: DateTime<Utc>,
    /// When the preference was last reinforced
    pub updated_at: DateTime<Utc>,
}

impl UserPreference {
    /// Create a freshly inferred preference
    pub fn new(category: impl Into<String>, preference: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            category: category.into(),
            preference: preference.into(),
            strength: INITIAL_STRENGTH,
            examples: Vec::new(),
            learned_at: now,
            updated_at: now,
        }
    }

    /// Natural key identifying this preference for merging
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.category, &self.preference)
    }

    /// Reinforce the preference
    pub fn reinforce(&mut self) {
        self.strength = (self.strength + STRENGTH_INCREMENT).min(1.0);
        self.updated_at = Utc::now();
    }
}

/// An immutable record of a problem and its accepted resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSolution {
    /// Unique identifier
    pub id: String,
    /// Problem description, free text
    pub problem: String,
    /// Accepted code, free text
    pub solution: String,
    /// Derived authoring approach
    pub approach: Approach,
    /// Language of the solution
    pub language: String,
    /// Framework, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Caller-supplied tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the solution was recorded
    pub timestamp: DateTime<Utc>,
    /// Feedback score in [0, 1]; defaults to effective
    pub effectiveness: f32,
}

impl ProblemSolution {
    /// Record a new solution
    pub fn new(
        problem: impl Into<String>,
        solution: impl Into<String>,
        approach: Approach,
        context: &LearnContext,
    ) -> Self {
        Self {
            id: generate_id(),
            problem: problem.into(),
            solution: solution.into(),
            approach,
            language: context.language.clone(),
            framework: context.framework.clone(),
            tags: context.tags.clone(),
            timestamp: Utc::now(),
            effectiveness: 1.0,
        }
    }
}

/// Knowledge base bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMetadata {
    /// Owner of this store, generated on creation
    pub user_id: String,
    /// When the store was created
    pub created_at: DateTime<Utc>,
    /// When the store was last persisted
    pub last_updated: DateTime<Utc>,
    /// Number of learning calls recorded
    pub total_interactions: u64,
    /// Schema version of the persisted document
    pub learning_version: String,
}

impl KnowledgeMetadata {
    /// Create metadata for a fresh knowledge base
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            user_id: format!("user-{}", generate_id()),
            created_at: now,
            last_updated: now,
            total_interactions: 0,
            learning_version: LEARNING_VERSION.to_string(),
        }
    }
}

impl Default for KnowledgeMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// The full per-user aggregate owned by the knowledge store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Merged pattern observations
    pub patterns: Vec<CodePattern>,
    /// Merged preference observations
    pub preferences: Vec<UserPreference>,
    /// Append-only solution history
    pub solutions: Vec<ProblemSolution>,
    /// Bookkeeping
    pub metadata: KnowledgeMetadata,
}

impl KnowledgeBase {
    /// Create an empty knowledge base
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            preferences: Vec::new(),
            solutions: Vec::new(),
            metadata: KnowledgeMetadata::new(),
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Context supplied alongside code being learned from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearnContext {
    /// Language of the code sample
    pub language: String,
    /// Framework, when known
    pub framework: Option<String>,
    /// Caller-supplied tags
    pub tags: Vec<String>,
}

impl LearnContext {
    /// Create a context for a language
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            framework: None,
            tags: Vec::new(),
        }
    }

    /// Set the framework
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    /// Add tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }
}

/// Context supplied when requesting suggestions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionContext {
    /// Problem description, when suggestions are requested proactively
    pub problem: Option<String>,
    /// Language suggestions should target
    pub language: String,
    /// Framework, when known
    pub framework: Option<String>,
}

impl SuggestionContext {
    /// Create a context for a language
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            problem: None,
            language: language.into(),
            framework: None,
        }
    }

    /// Set the problem description
    pub fn with_problem(mut self, problem: impl Into<String>) -> Self {
        self.problem = Some(problem.into());
        self
    }
}

/// Summary of the user's coding style
#[derive(Debug, Clone, Serialize)]
pub struct CodingStyle {
    /// Strongest preferences, strength descending
    pub preferences: Vec<UserPreference>,
    /// Most frequent patterns, frequency descending
    pub top_patterns: Vec<CodePattern>,
    /// Mode of recorded approaches; `None` until a solution exists
    pub favorite_approach: Option<Approach>,
}

/// Store-level counters for diagnostics panels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeStats {
    /// Distinct patterns held
    pub total_patterns: usize,
    /// Distinct preferences held
    pub total_preferences: usize,
    /// Solutions recorded
    pub total_solutions: usize,
    /// Learning calls recorded
    pub total_interactions: u64,
    /// Whole days since the store was created
    pub learning_age_days: i64,
}
