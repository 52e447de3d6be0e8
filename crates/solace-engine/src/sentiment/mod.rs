//! Lexicon-and-rules valence scoring (VADER algorithm).
//!
//! Each token gets a valence from the lexicon, adjusted by the words in front
//! of it (intensifiers, negations, "least", idioms), by ALL-CAPS emphasis and
//! by a contrastive "but". The per-token valences are summed, amplified by
//! trailing punctuation and normalized into a compound score in `[-1, 1]`.

mod lexicon;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use lexicon::{ALPHA, BOOSTERS, C_INCR, LEXICON, NEGATIONS, N_SCALAR, SPECIAL_CASES};

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("reading lexicon {path}: {detail}")]
    Io { path: String, detail: String },
    #[error("lexicon line {line}: {detail}")]
    Malformed { line: usize, detail: String },
}

/// Parses the `vader_lexicon.txt` format: one `token<TAB>mean<TAB>...` entry
/// per line. Only the first two columns are read.
pub fn parse_vader_lexicon(text: &str) -> Result<HashMap<String, f64>, LexiconError> {
    let mut entries = HashMap::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut columns = line.split('\t');
        let (Some(token), Some(mean)) = (columns.next(), columns.next()) else {
            return Err(LexiconError::Malformed {
                line: index + 1,
                detail: "expected token and mean separated by a tab".into(),
            });
        };
        let mean: f64 = mean.trim().parse().map_err(|_| LexiconError::Malformed {
            line: index + 1,
            detail: format!("mean {mean:?} is not a number"),
        })?;
        entries.insert(token.to_string(), mean);
    }
    Ok(entries)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= 0.05 {
            Self::Positive
        } else if compound <= -0.05 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Five-step emotional intensity derived from the compound score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentIntensity {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentIntensity {
    pub fn from_compound(compound: f64) -> Self {
        if compound <= -0.5 {
            Self::VeryNegative
        } else if compound <= -0.2 {
            Self::Negative
        } else if compound >= 0.5 {
            Self::VeryPositive
        } else if compound >= 0.2 {
            Self::Positive
        } else {
            Self::Neutral
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub label: SentimentLabel,
    #[serde(rename = "emotional_state")]
    pub intensity: SentimentIntensity,
}

impl SentimentResult {
    fn from_parts(compound: f64, positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            compound,
            positive,
            negative,
            neutral,
            label: SentimentLabel::from_compound(compound),
            intensity: SentimentIntensity::from_compound(compound),
        }
    }

    /// Result for text with no tokens.
    pub fn empty() -> Self {
        Self::from_parts(0.0, 0.0, 0.0, 1.0)
    }
}

/// Stateless scorer over fixed rule tables. Build once and share.
///
/// `new()` uses the built-in word table; `from_vader_file` swaps in the full
/// published VADER lexicon.
pub struct SentimentScorer {
    lexicon: HashMap<String, f64>,
    boosters: HashMap<&'static str, f64>,
    special_cases: HashMap<&'static str, f64>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self::with_lexicon(LEXICON.iter().map(|&(word, valence)| (word.to_string(), valence)).collect())
    }

    pub fn with_lexicon(lexicon: HashMap<String, f64>) -> Self {
        Self {
            lexicon,
            boosters: BOOSTERS.iter().copied().collect(),
            special_cases: SPECIAL_CASES.iter().copied().collect(),
        }
    }

    pub fn from_vader_file(path: &Path) -> Result<Self, LexiconError> {
        let text = std::fs::read_to_string(path).map_err(|e| LexiconError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let lexicon = parse_vader_lexicon(&text)?;
        info!(path = %path.display(), entries = lexicon.len(), "loaded sentiment lexicon");
        Ok(Self::with_lexicon(lexicon))
    }

    pub fn score(&self, text: &str) -> SentimentResult {
        let tokens = tokenize(text);
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let cap_diff = allcap_differential(&tokens);

        let mut sentiments = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let word = lowered[i].as_str();
            if self.boosters.contains_key(word) {
                sentiments.push(0.0);
                continue;
            }
            if word == "kind" && lowered.get(i + 1).is_some_and(|next| next == "of") {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.valence(&tokens, &lowered, i, cap_diff));
        }

        but_check(&lowered, &mut sentiments);
        score_valence(&sentiments, text)
    }

    fn in_lexicon(&self, word: &str) -> bool {
        self.lexicon.contains_key(word)
    }

    fn valence(&self, tokens: &[String], lowered: &[String], i: usize, cap_diff: bool) -> f64 {
        let word = lowered[i].as_str();
        let Some(&base) = self.lexicon.get(word) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" directly in front of another rated word acts as a negator, not a sentiment.
        if word == "no" && lowered.get(i + 1).is_some_and(|next| self.in_lexicon(next)) {
            valence = 0.0;
        }
        if (i > 0 && lowered[i - 1] == "no")
            || (i > 1 && lowered[i - 2] == "no")
            || (i > 2 && lowered[i - 3] == "no" && matches!(lowered[i - 1].as_str(), "or" | "nor"))
        {
            valence = base * N_SCALAR;
        }

        if is_upper(&tokens[i]) && cap_diff {
            if valence > 0.0 {
                valence += C_INCR;
            } else {
                valence -= C_INCR;
            }
        }

        for start in 0..3 {
            if i > start && !self.in_lexicon(&lowered[i - (start + 1)]) {
                let prev = i - (start + 1);
                let mut scalar = self.scalar_inc_dec(&tokens[prev], &lowered[prev], valence, cap_diff);
                if start == 1 && scalar != 0.0 {
                    scalar *= 0.95;
                }
                if start == 2 && scalar != 0.0 {
                    scalar *= 0.9;
                }
                valence += scalar;
                valence = negation_check(valence, lowered, start, i);
                if start == 2 {
                    valence = self.special_idioms_check(valence, lowered, i);
                }
            }
        }

        self.least_check(valence, lowered, i)
    }

    fn scalar_inc_dec(&self, token: &str, word: &str, valence: f64, cap_diff: bool) -> f64 {
        let Some(&boost) = self.boosters.get(word) else {
            return 0.0;
        };
        let mut scalar = if valence < 0.0 { -boost } else { boost };
        if is_upper(token) && cap_diff {
            if valence > 0.0 {
                scalar += C_INCR;
            } else {
                scalar -= C_INCR;
            }
        }
        scalar
    }

    /// Only reached with `i >= 3`.
    fn special_idioms_check(&self, mut valence: f64, lowered: &[String], i: usize) -> f64 {
        let w = |k: usize| lowered[k].as_str();

        let one_zero = format!("{} {}", w(i - 1), w(i));
        let two_one_zero = format!("{} {} {}", w(i - 2), w(i - 1), w(i));
        let two_one = format!("{} {}", w(i - 2), w(i - 1));
        let three_two_one = format!("{} {} {}", w(i - 3), w(i - 2), w(i - 1));
        let three_two = format!("{} {}", w(i - 3), w(i - 2));

        for seq in [&one_zero, &two_one_zero, &two_one, &three_two_one, &three_two] {
            if let Some(&v) = self.special_cases.get(seq.as_str()) {
                valence = v;
                break;
            }
        }

        if lowered.len() > i + 1 {
            let zero_one = format!("{} {}", w(i), w(i + 1));
            if let Some(&v) = self.special_cases.get(zero_one.as_str()) {
                valence = v;
            }
        }
        if lowered.len() > i + 2 {
            let zero_one_two = format!("{} {} {}", w(i), w(i + 1), w(i + 2));
            if let Some(&v) = self.special_cases.get(zero_one_two.as_str()) {
                valence = v;
            }
        }

        // multi-word dampeners such as "sort of"
        for ngram in [&three_two_one, &three_two, &two_one] {
            if let Some(&boost) = self.boosters.get(ngram.as_str()) {
                valence += boost;
            }
        }
        valence
    }

    fn least_check(&self, valence: f64, lowered: &[String], i: usize) -> f64 {
        if i > 1 && !self.in_lexicon(&lowered[i - 1]) && lowered[i - 1] == "least" {
            if lowered[i - 2] != "at" && lowered[i - 2] != "very" {
                return valence * N_SCALAR;
            }
        } else if i > 0 && !self.in_lexicon(&lowered[i - 1]) && lowered[i - 1] == "least" {
            return valence * N_SCALAR;
        }
        valence
    }
}

fn negated(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.contains("n't")
}

fn negation_check(valence: f64, lowered: &[String], start: usize, i: usize) -> f64 {
    let w = |k: usize| lowered[i - k].as_str();
    match start {
        0 if negated(w(1)) => valence * N_SCALAR,
        1 => {
            if w(2) == "never" && matches!(w(1), "so" | "this") {
                valence * 1.25
            } else if w(2) == "without" && w(1) == "doubt" {
                valence
            } else if negated(w(2)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
        2 => {
            if (w(3) == "never" && matches!(w(2), "so" | "this")) || matches!(w(1), "so" | "this") {
                valence * 1.25
            } else if w(3) == "without" && (w(2) == "doubt" || w(1) == "doubt") {
                valence
            } else if negated(w(3)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
        _ => valence,
    }
}

/// Sentiment before "but" is halved, sentiment after it weighted by 1.5.
fn but_check(lowered: &[String], sentiments: &mut [f64]) {
    let Some(pivot) = lowered.iter().position(|w| w == "but") else {
        return;
    };
    for (idx, s) in sentiments.iter_mut().enumerate() {
        if idx < pivot {
            *s *= 0.5;
        } else if idx > pivot {
            *s *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4);
    let questions = text.matches('?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2..=3 => questions as f64 * 0.18,
        _ => 0.96,
    };
    exclamations as f64 * 0.292 + question_amp
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn score_valence(sentiments: &[f64], text: &str) -> SentimentResult {
    if sentiments.is_empty() {
        return SentimentResult::empty();
    }

    let amplifier = punctuation_emphasis(text);
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += amplifier;
    } else if sum < 0.0 {
        sum -= amplifier;
    }
    let compound = normalize(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }

    if pos_sum > neg_sum.abs() {
        pos_sum += amplifier;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= amplifier;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    SentimentResult::from_parts(
        round_to(compound, 4),
        round_to((pos_sum / total).abs(), 3),
        round_to((neg_sum / total).abs(), 3),
        round_to((neu_count / total).abs(), 3),
    )
}

/// Whitespace split; surrounding punctuation is dropped unless that would
/// leave two characters or fewer (keeps emoticons like ":)" intact).
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            let token = raw.replace('\u{2019}', "'");
            let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
            if stripped.chars().count() <= 2 {
                token
            } else {
                stripped.to_string()
            }
        })
        .collect()
}

fn is_upper(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(char::is_lowercase)
}

/// True when some, but not all, tokens are ALL CAPS.
fn allcap_differential(tokens: &[String]) -> bool {
    let upper = tokens.iter().filter(|t| is_upper(t)).count();
    let diff = tokens.len() - upper;
    diff > 0 && diff < tokens.len()
}
