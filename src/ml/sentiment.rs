//! Lexicon-based sentiment scoring for free-text feedback.
//!
//! Text is lowercased, split on whitespace and stripped of surrounding
//! punctuation. The score is `(positive - negative) / max(tokens, 1)`.

use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::util::numeric::finite_or;

const POSITIVE_WORDS: &[&str] = &[
    "excellent",
    "great",
    "amazing",
    "good",
    "outstanding",
    "fantastic",
    "wonderful",
    "awesome",
    "brilliant",
    "impressive",
    "professional",
    "reliable",
    "responsive",
    "helpful",
    "skilled",
    "talented",
    "knowledgeable",
    "creative",
    "dedicated",
    "efficient",
    "friendly",
    "fast",
    "perfect",
    "best",
    "quality",
    "recommend",
    "recommended",
    "love",
    "happy",
    "satisfied",
];

const NEGATIVE_WORDS: &[&str] = &[
    "poor",
    "bad",
    "terrible",
    "awful",
    "horrible",
    "worst",
    "disappointing",
    "disappointed",
    "slow",
    "late",
    "delayed",
    "missed",
    "unprofessional",
    "unreliable",
    "unresponsive",
    "rude",
    "careless",
    "sloppy",
    "incompetent",
    "mediocre",
    "useless",
    "buggy",
    "broken",
    "frustrating",
    "lacking",
    "unhappy",
    "hate",
    "waste",
    "problem",
    "problems",
];

lazy_static! {
    static ref DEFAULT_LEXICON: Arc<SentimentLexicon> = Arc::new(SentimentLexicon {
        positive: POSITIVE_WORDS.iter().map(|w| w.to_string()).collect(),
        negative: NEGATIVE_WORDS.iter().map(|w| w.to_string()).collect(),
    });
}

/// Polarity of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Two disjoint sets of lowercase polarity words.
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl SentimentLexicon {
    /// Build a custom lexicon. Words are lowercased; a word listed under
    /// both polarities is rejected.
    pub fn new<I, S>(positive: I, negative: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positive: HashSet<String> = positive
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        let negative: HashSet<String> = negative
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();

        if let Some(word) = positive.intersection(&negative).next() {
            return Err(MatchError::invalid_argument(format!(
                "sentiment lexicon: '{word}' is both positive and negative"
            )));
        }

        Ok(Self { positive, negative })
    }

    /// The built-in lexicon shared by every default analyzer.
    pub fn shared() -> Arc<SentimentLexicon> {
        Arc::clone(&DEFAULT_LEXICON)
    }

    pub fn is_positive(&self, word: &str) -> bool {
        self.positive.contains(word)
    }

    pub fn is_negative(&self, word: &str) -> bool {
        self.negative.contains(word)
    }
}

/// Configuration for sentiment classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Scores strictly above this are positive.
    pub positive_threshold: f64,
    /// Scores strictly below this are negative.
    pub negative_threshold: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.1,
            negative_threshold: -0.1,
        }
    }
}

/// Sentiment of a single text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    /// `(positive - negative) / max(tokens, 1)`, in `[-1, 1]`.
    pub score: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub token_count: usize,
}

/// Aggregate sentiment over a batch of feedback texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// Mean of the per-text scores, `0.0` for an empty batch.
    pub average_score: f64,
    /// Classification of `average_score` under the same thresholds.
    pub overall: Sentiment,
}

/// Lexicon sentiment analyzer.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Arc<SentimentLexicon>,
    config: SentimentConfig,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(SentimentLexicon::shared(), SentimentConfig::default())
    }
}

impl SentimentAnalyzer {
    /// Create an analyzer over a shared lexicon.
    pub fn new(lexicon: Arc<SentimentLexicon>, config: SentimentConfig) -> Self {
        Self { lexicon, config }
    }

    /// Score one text.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let lowered = text.to_lowercase();
        let mut token_count = 0;
        let mut positive_count = 0;
        let mut negative_count = 0;

        for raw in lowered.split_whitespace() {
            token_count += 1;
            let token = raw.trim_matches(|c: char| c.is_ascii_punctuation());
            if self.lexicon.is_positive(token) {
                positive_count += 1;
            } else if self.lexicon.is_negative(token) {
                negative_count += 1;
            }
        }

        let score = finite_or(
            (positive_count as f64 - negative_count as f64) / token_count.max(1) as f64,
            0.0,
        );

        SentimentResult {
            sentiment: self.classify(score),
            score,
            positive_count,
            negative_count,
            token_count,
        }
    }

    /// Score many texts and summarise them.
    pub fn analyze_batch<S: AsRef<str>>(&self, texts: &[S]) -> FeedbackSummary {
        let results: Vec<SentimentResult> =
            texts.iter().map(|t| self.analyze(t.as_ref())).collect();
        let count = |s: Sentiment| results.iter().filter(|r| r.sentiment == s).count();

        let average_score = if results.is_empty() {
            0.0
        } else {
            finite_or(
                results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64,
                0.0,
            )
        };

        FeedbackSummary {
            total: results.len(),
            positive: count(Sentiment::Positive),
            negative: count(Sentiment::Negative),
            neutral: count(Sentiment::Neutral),
            average_score,
            overall: self.classify(average_score),
        }
    }

    fn classify(&self, score: f64) -> Sentiment {
        if score > self.config.positive_threshold {
            Sentiment::Positive
        } else if score < self.config.negative_threshold {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}
