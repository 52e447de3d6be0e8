use std::sync::LazyLock;

use regex::Regex;

/// Self-harm, suicide and hopelessness terms, matched as substrings of the
/// lowercased text.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "harm myself",
    "self harm",
    "cut myself",
    "overdose",
    "not worth living",
    "better off dead",
    "hopeless",
    "can't go on",
    "give up",
    "end it all",
    "hurt myself",
    // forms the stems above do not contain
    "suicidal",
    "self-harm",
    "cutting myself",
    "hurting myself",
    "killing myself",
];

/// Terms that share their wording with a pattern target. These must not run
/// on into a longer word ("want to die" inside "want to diet").
const BOUNDED_TERMS: &[&str] = &["want to die", "i want to die", "kill myself", "end my life"];

pub const CRISIS_PHRASES: &[&str] = &[
    "i want to die",
    "i'm going to kill myself",
    "life isn't worth living",
    "i can't take it anymore",
    "nobody would miss me",
    "i'm done with life",
];

pub const CRISIS_PATTERNS: &[&str] = &[
    r"\bi\s+want\s+to\s+die\b",
    r"\bkill\s+myself\b",
    r"\bcommit\s+suicide\b",
    r"\bend\s+my\s+life\b",
];

static COMPILED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CRISIS_PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect()
});

/// Which rule fired first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrisisMatch {
    Keyword(&'static str),
    Phrase(&'static str),
    Pattern(&'static str),
}

/// Pure predicate over message text. Checks keywords, then phrases, then
/// patterns, and stops at the first hit.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrisisDetector;

impl CrisisDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn first_match(&self, text: &str) -> Option<CrisisMatch> {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");

        if let Some(keyword) = CRISIS_KEYWORDS.iter().find(|k| contains_term(&lowered, k)) {
            return Some(CrisisMatch::Keyword(*keyword));
        }
        if let Some(phrase) = CRISIS_PHRASES.iter().find(|p| contains_term(&lowered, p)) {
            return Some(CrisisMatch::Phrase(*phrase));
        }
        COMPILED_PATTERNS
            .iter()
            .zip(CRISIS_PATTERNS)
            .find(|(re, _)| re.is_match(&lowered))
            .map(|(_, source)| CrisisMatch::Pattern(*source))
    }
}

/// Plain substring containment, except for `BOUNDED_TERMS`, where an
/// occurrence followed directly by a letter or digit is skipped.
fn contains_term(haystack: &str, term: &str) -> bool {
    if !BOUNDED_TERMS.contains(&term) {
        return haystack.contains(term);
    }
    haystack.match_indices(term).any(|(start, matched)| {
        haystack[start + matched.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}
