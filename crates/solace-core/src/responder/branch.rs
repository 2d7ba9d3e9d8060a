//! Keyword branch dispatch.
//!
//! An ordered rule table of (branch, keyword set) pairs evaluated top to
//! bottom; the first branch with any keyword contained in the case-folded
//! utterance wins. Matching is substring containment, not whole-word
//! ("sadly" hits the sadness branch, "downright" contains "down").

use std::fmt;

/// One of the fixed keyword-triggered response categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Anxiety,
    Sadness,
    Anger,
    Loneliness,
    HelpSeeking,
    Improvement,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Branch::Anxiety => "anxiety",
            Branch::Sadness => "sadness",
            Branch::Anger => "anger",
            Branch::Loneliness => "loneliness",
            Branch::HelpSeeking => "help-seeking",
            Branch::Improvement => "improvement",
        };
        write!(f, "{name}")
    }
}

/// Priority-ordered dispatch table. Order is load-bearing: an utterance
/// containing keywords from several sets resolves to the first row.
const BRANCH_RULES: &[(Branch, &[&str])] = &[
    (Branch::Anxiety, &["anxious", "anxiety", "worried"]),
    (Branch::Sadness, &["sad", "depressed", "down"]),
    (Branch::Anger, &["angry", "frustrated", "mad"]),
    (Branch::Loneliness, &["lonely", "isolated", "alone"]),
    (Branch::HelpSeeking, &["help", "advice", "what should i do"]),
    (Branch::Improvement, &["better", "good", "improving"]),
];

impl Branch {
    /// Resolve the branch for a user utterance, or `None` for the
    /// generic fallback reply.
    pub fn detect(utterance: &str) -> Option<Branch> {
        let folded = utterance.to_lowercase();
        BRANCH_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| folded.contains(k)))
            .map(|(branch, _)| *branch)
    }
}
