//! Read-only ranking queries over the knowledge base
//!
//! These functions never mutate state and never block on persistence; the
//! store calls them under a shared lock.

use super::types::{CodePattern, ProblemSolution};

/// Patterns worth suggesting for a language, most frequent first
///
/// Only patterns that have been reinforced past the initial confidence are
/// considered.
pub fn top_patterns<'a>(
    patterns: &'a [CodePattern],
    language: &str,
    limit: usize,
) -> Vec<&'a CodePattern> {
    let mut relevant: Vec<&CodePattern> = patterns
        .iter()
        .filter(|p| p.metadata.language == language)
        .filter(|p| p.confidence > 0.5)
        .collect();

    relevant.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    relevant.truncate(limit);
    relevant
}

/// Past solutions sharing at least one keyword with the problem
///
/// Keyword overlap is deliberately permissive: a single shared token admits
/// a solution. Results are ordered by effectiveness; the sort is stable, so
/// ties keep their original append order.
pub fn similar_solutions<'a>(
    solutions: &'a [ProblemSolution],
    problem: &str,
) -> Vec<&'a ProblemSolution> {
    let problem = problem.to_lowercase();
    let keywords: Vec<&str> = problem.split_whitespace().collect();

    let mut matches: Vec<&ProblemSolution> = solutions
        .iter()
        .filter(|s| {
            let haystack = format!("{} {}", s.problem, s.solution).to_lowercase();
            keywords.iter().any(|keyword| haystack.contains(keyword))
        })
        .collect();

    matches.sort_by(|a, b| {
        b.effectiveness
            .partial_cmp(&a.effectiveness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}
