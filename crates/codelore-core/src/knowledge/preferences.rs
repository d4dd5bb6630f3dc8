//! Preference inference from accepted code
//!
//! Each detector represents one label inside a category of mutually
//! exclusive alternatives (quote style, indentation width, ...). A label is
//! only reinforced when the sample provides more evidence than the
//! threshold, so single incidental occurrences never move the store.

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum raw match count a detector must exceed within one sample
pub const EVIDENCE_THRESHOLD: usize = 5;

/// A `(category, preference)` pair backed by enough evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceCandidate {
    /// Alternative group, e.g. `quote-style`
    pub category: &'static str,
    /// Label inside the group, e.g. `double-quotes`
    pub preference: &'static str,
}

/// A single preference detector descriptor
struct Detector {
    category: &'static str,
    preference: &'static str,
    regex: Regex,
}

static DETECTORS: Lazy<Vec<Detector>> = Lazy::new(|| {
    vec![
        Detector {
            category: "naming-convention",
            preference: "camelCase",
            regex: Regex::new(r"const\s+[a-z][a-zA-Z0-9]*\s*=")
                .expect("valid naming-convention regex"),
        },
        Detector {
            category: "quote-style",
            preference: "double-quotes",
            regex: Regex::new("\"").expect("valid double-quote regex"),
        },
        Detector {
            category: "quote-style",
            preference: "single-quotes",
            regex: Regex::new("'").expect("valid single-quote regex"),
        },
        Detector {
            category: "semicolons",
            preference: "use-semicolons",
            regex: Regex::new(r"(?m);$").expect("valid semicolon regex"),
        },
        Detector {
            category: "indentation",
            preference: "2-spaces",
            regex: Regex::new(r"(?m)^  ").expect("valid 2-space indent regex"),
        },
        Detector {
            category: "indentation",
            preference: "4-spaces",
            regex: Regex::new(r"(?m)^    ").expect("valid 4-space indent regex"),
        },
    ]
});

/// Detect preference candidates within a code sample
///
/// Total function over arbitrary text. Conflicting labels from one sample
/// are all emitted; accumulation in the store decides which one wins.
pub fn detect_preferences(code: &str) -> Vec<PreferenceCandidate> {
    DETECTORS
        .iter()
        .filter(|detector| detector.regex.find_iter(code).count() > EVIDENCE_THRESHOLD)
        .map(|detector| PreferenceCandidate {
            category: detector.category,
            preference: detector.preference,
        })
        .collect()
}
