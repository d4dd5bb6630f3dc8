//! Pattern extraction from accepted code
//!
//! A fixed, declarative table of detectors is run over every learned
//! solution. Extraction is a total function: unmatched detectors simply
//! contribute nothing, and candidates are merged later by the store.

use super::types::{
    Approach, CodePattern, LearnContext, PatternKind, PatternMetadata, generate_id,
    INITIAL_CONFIDENCE,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest snippet kept as pattern context
pub const CONTEXT_SNIPPET_MAX: usize = 200;

/// A single pattern detector descriptor
struct Detector {
    /// Detector name, becomes `CodePattern::pattern`
    name: &'static str,
    /// Grouping, becomes `CodePattern::category`
    category: &'static str,
    /// Matcher for the construct
    regex: Regex,
}

static DETECTORS: Lazy<Vec<Detector>> = Lazy::new(|| {
    vec![
        Detector {
            name: "async-await",
            category: "async-programming",
            regex: Regex::new(r"async\s+\w+\s*\([^)]*\)\s*\{[\s\S]*?await\s+")
                .expect("valid async-await regex"),
        },
        Detector {
            name: "error-handling",
            category: "error-handling",
            regex: Regex::new(r"try\s*\{[\s\S]*?\}\s*catch\s*\(")
                .expect("valid error-handling regex"),
        },
        Detector {
            name: "arrow-function",
            category: "function-style",
            regex: Regex::new(r"\([^)]*\)\s*=>\s*\{").expect("valid arrow-function regex"),
        },
        Detector {
            name: "destructuring",
            category: "syntax-preference",
            regex: Regex::new(r"const\s*\{[^}]+\}\s*=").expect("valid destructuring regex"),
        },
        Detector {
            name: "template-literals",
            category: "string-formatting",
            regex: Regex::new(r"`[^`]*\$\{[^}]+\}[^`]*`").expect("valid template-literals regex"),
        },
        Detector {
            name: "optional-chaining",
            category: "null-safety",
            regex: Regex::new(r"\?\.").expect("valid optional-chaining regex"),
        },
        Detector {
            name: "nullish-coalescing",
            category: "null-safety",
            regex: Regex::new(r"\?\?").expect("valid nullish-coalescing regex"),
        },
    ]
});

/// Extract pattern candidates from a code sample
///
/// One candidate is emitted per matching detector, carrying the match count
/// as its frequency and the first match as its context snippet.
pub fn extract_patterns(code: &str, context: &LearnContext) -> Vec<CodePattern> {
    let now = Utc::now();
    DETECTORS
        .iter()
        .filter_map(|detector| {
            let mut matches = detector.regex.find_iter(code);
            let first = matches.next()?;
            let count = 1 + matches.count();

            Some(CodePattern {
                id: generate_id(),
                kind: PatternKind::Style,
                category: detector.category.to_string(),
                pattern: detector.name.to_string(),
                context: snippet(first.as_str()),
                frequency: count as u32,
                last_used: now,
                confidence: INITIAL_CONFIDENCE,
                metadata: PatternMetadata {
                    language: context.language.clone(),
                    framework: context.framework.clone(),
                    tags: context.tags.clone(),
                },
            })
        })
        .collect()
}

/// Classify the authoring approach of a solution
///
/// Rules are checked in priority order and the first match wins: class
/// syntax beats a lambda-plus-map combination, which beats asynchronous
/// constructs, with procedural as the fallback.
pub fn classify_approach(solution: &str) -> Approach {
    if solution.contains("class ") || solution.contains("extends ") {
        Approach::ObjectOriented
    } else if solution.contains("=>") && solution.contains("map") {
        Approach::Functional
    } else if solution.contains("async") || solution.contains("await") {
        Approach::AsyncFirst
    } else {
        Approach::Procedural
    }
}

/// Truncate a match to the snippet cap on a char boundary
fn snippet(text: &str) -> String {
    text.chars().take(CONTEXT_SNIPPET_MAX).collect()
}
