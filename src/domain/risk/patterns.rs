//! Fixed table of crisis-indicator patterns.
//!
//! Every pattern is matched case-insensitively on word boundaries and
//! contributes its weight at most once per text. The table is static and
//! auditable: changing a weight is a code review, not a deployment knob.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How dangerous a pattern is on its own.
///
/// High-severity matches trigger the failsafe floor when the classifier
/// cannot confirm or refute them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug)]
enum Matcher {
    /// The regex matches somewhere in the text.
    Any(Regex),
    /// Every regex matches somewhere in the text.
    All(Vec<Regex>),
}

impl Matcher {
    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Any(re) => re.is_match(text),
            Matcher::All(res) => res.iter().all(|re| re.is_match(text)),
        }
    }
}

/// A single weighted crisis indicator.
#[derive(Debug)]
pub struct CrisisPattern {
    pub id: &'static str,
    pub weight: f64,
    pub severity: Severity,
    matcher: Matcher,
}

impl CrisisPattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

fn word_regex(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("static pattern compiles")
}

const METHOD: &str = r"guns?|firearms?|pistol|rifle|shotgun|weapons?|noose|rope|pills|overdose|razor|blades?";
const IDEATION: &str = r"kill(?:ing)?\s+myself|suicid(?:e|al)|end(?:ing)?\s+it(?:\s+all)?|take\s+my\s+(?:own\s+)?life|better\s+off\s+dead|no\s+point\s+(?:in\s+)?living|want\s+to\s+die";
const GOODBYE: &str = r"goodbye\s+(?:everyone|forever)|this\s+is\s+(?:my\s+)?goodbye|final\s+(?:goodbye|message)|won['’]?t\s+be\s+(?:around|here)|giving\s+away\s+my\s+(?:things|stuff)";
const SELF_HARM: &str = r"cut(?:ting)?\s+myself|hurt(?:ing)?\s+myself|harm(?:ing)?\s+myself|self[\s-]?harm";
const HOPELESSNESS: &str = r"hopeless|no\s+hope|worthless|no\s+way\s+out|can['’]?t\s+go\s+on|give\s+up|giving\s+up|trapped";
const SUBSTANCE: &str = r"drunk|drinking|alcohol|whiskey|vodka|drugs|using\s+again|relapsed?";
const ISOLATION: &str = r"alone|lonely|isolated|nobody\s+cares|no\s+one\s+cares|no\s+one\s+to\s+talk\s+to|a\s+burden";
const SLEEP_TRAUMA: &str = r"can['’]?t\s+sleep|insomnia|nightmares?|flashbacks?";

static CRISIS_PATTERNS: Lazy<Vec<CrisisPattern>> = Lazy::new(|| {
    vec![
        CrisisPattern {
            id: "suicidal_ideation",
            weight: 50.0,
            severity: Severity::High,
            matcher: Matcher::Any(word_regex(IDEATION)),
        },
        CrisisPattern {
            id: "explicit_method",
            weight: 45.0,
            severity: Severity::High,
            matcher: Matcher::Any(word_regex(METHOD)),
        },
        CrisisPattern {
            id: "self_harm",
            weight: 40.0,
            severity: Severity::High,
            matcher: Matcher::Any(word_regex(SELF_HARM)),
        },
        CrisisPattern {
            id: "goodbye_language",
            weight: 35.0,
            severity: Severity::High,
            matcher: Matcher::Any(word_regex(GOODBYE)),
        },
        CrisisPattern {
            id: "hopelessness_substance",
            weight: 30.0,
            severity: Severity::Medium,
            matcher: Matcher::All(vec![word_regex(HOPELESSNESS), word_regex(SUBSTANCE)]),
        },
        CrisisPattern {
            id: "hopelessness",
            weight: 20.0,
            severity: Severity::Medium,
            matcher: Matcher::Any(word_regex(HOPELESSNESS)),
        },
        CrisisPattern {
            id: "substance_use",
            weight: 15.0,
            severity: Severity::Medium,
            matcher: Matcher::Any(word_regex(SUBSTANCE)),
        },
        CrisisPattern {
            id: "isolation",
            weight: 15.0,
            severity: Severity::Low,
            matcher: Matcher::Any(word_regex(ISOLATION)),
        },
        CrisisPattern {
            id: "sleep_trauma",
            weight: 10.0,
            severity: Severity::Low,
            matcher: Matcher::Any(word_regex(SLEEP_TRAUMA)),
        },
    ]
});

/// Words that individually are mild but together signal sustained distress.
static DISTRESS_WORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        "hopeless",
        "worthless",
        "alone",
        "pain",
        r"can['’]?t",
        "tired",
        "done",
        r"give\s+up",
    ]
    .into_iter()
    .map(word_regex)
    .collect()
});

/// The full pattern table, highest weight first.
pub fn crisis_patterns() -> &'static [CrisisPattern] {
    &CRISIS_PATTERNS
}

/// Patterns that match `text`, each at most once.
pub fn matched_patterns(text: &str) -> Vec<&'static CrisisPattern> {
    crisis_patterns().iter().filter(|p| p.is_match(text)).collect()
}

/// Number of distinct distress words present in `text`.
pub fn distress_word_count(text: &str) -> usize {
    DISTRESS_WORDS.iter().filter(|re| re.is_match(text)).count()
}
