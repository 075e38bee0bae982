//! Lexicon-based sentiment scoring
//!
//! Each lexicon word contributes a (polarity, subjectivity) pair. A directly
//! preceding intensifier scales the polarity and a negation within the three
//! previous words flips and dampens it. The text score is the mean over all
//! scored phrases.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use revgraph_core::{Assessment, Sentiment};

use crate::Token;

/// (word, polarity, subjectivity)
const LEXICON_ENTRIES: &[(&str, f64, f64)] = &[
    ("lovely", 0.5, 0.75),
    ("delicious", 1.0, 1.0),
    ("excellent", 1.0, 1.0),
    ("superb", 1.0, 1.0),
    ("outstanding", 0.5, 0.75),
    ("wonderful", 1.0, 1.0),
    ("beautiful", 0.85, 1.0),
    ("great", 0.8, 0.75),
    ("good", 0.7, 0.6),
    ("nice", 0.6, 1.0),
    ("fine", 0.42, 0.5),
    ("pleasant", 0.73, 0.97),
    ("elegant", 0.5, 0.75),
    ("balanced", 0.3, 0.4),
    ("fresh", 0.3, 0.5),
    ("bright", 0.7, 0.9),
    ("smooth", 0.4, 0.69),
    ("rich", 0.38, 0.62),
    ("complex", -0.1, 0.4),
    ("juicy", 0.4, 0.6),
    ("crisp", 0.3, 0.5),
    ("impressive", 1.0, 1.0),
    ("harsh", -0.4, 0.6),
    ("bitter", -0.1, 0.1),
    ("thin", -0.4, 0.4),
    ("flat", -0.03, 0.3),
    ("dull", -0.31, 0.65),
    ("bland", -0.5, 0.6),
    ("watery", -0.3, 0.5),
    ("bad", -0.7, 0.67),
    ("poor", -0.4, 0.6),
    ("disappointing", -0.6, 0.7),
    ("unpleasant", -0.5, 0.85),
    ("awful", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
];

/// (word, polarity multiplier)
const INTENSIFIER_ENTRIES: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("quite", 1.1),
    ("so", 1.3),
    ("too", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("fairly", 0.8),
    ("rather", 0.9),
    ("incredibly", 1.5),
    ("super", 1.4),
    ("really", 1.3),
];

const NEGATIONS: &[&str] = &["not", "n't", "n’t", "never", "no", "nor", "hardly"];

/// Polarity factor applied by a negation
const NEGATION_FACTOR: f64 = -0.5;

/// How many words back a negation still applies
const NEGATION_WINDOW: usize = 3;

static LEXICON: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    LEXICON_ENTRIES
        .iter()
        .map(|&(word, polarity, subjectivity)| (word, (polarity, subjectivity)))
        .collect()
});

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIER_ENTRIES.iter().copied().collect());

/// Lexicon sentiment analyzer
#[derive(Debug, Default, Clone)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    /// Score a tokenized text
    pub fn analyze(&self, tokens: &[Token]) -> Sentiment {
        let words: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();

        let mut assessments = Vec::new();
        let mut subjectivity_sum = 0.0;

        for (i, word) in words.iter().enumerate() {
            let Some(&(base, subjectivity)) = LEXICON.get(word.as_str()) else {
                continue;
            };

            let mut polarity = base;
            let mut phrase = vec![word.as_str()];

            if let Some(previous) = i.checked_sub(1).map(|p| words[p].as_str()) {
                if let Some(factor) = INTENSIFIERS.get(previous) {
                    polarity = (polarity * factor).clamp(-1.0, 1.0);
                    phrase.insert(0, previous);
                }
            }

            let window = &words[i.saturating_sub(NEGATION_WINDOW)..i];
            if let Some(negation) = window.iter().rev().find(|w| NEGATIONS.contains(&w.as_str())) {
                polarity *= NEGATION_FACTOR;
                if !phrase.contains(&negation.as_str()) {
                    phrase.insert(0, negation.as_str());
                }
            }

            subjectivity_sum += subjectivity;
            assessments.push(Assessment {
                token: phrase.join(" "),
                score: polarity,
            });
        }

        if assessments.is_empty() {
            return Sentiment::neutral();
        }

        let hits = assessments.len() as f64;
        let polarity = assessments.iter().map(|a| a.score).sum::<f64>() / hits;

        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: (subjectivity_sum / hits).clamp(0.0, 1.0),
            assessments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn analyze(text: &str) -> Sentiment {
        LexiconSentiment::new().analyze(&Tokenizer::new().tokenize(text))
    }

    #[test]
    fn test_single_hit() {
        let sentiment = analyze("A lovely cherry and oak note, quite fruity.");
        assert_eq!(sentiment.polarity, 0.5);
        assert_eq!(sentiment.subjectivity, 0.75);
        assert_eq!(sentiment.assessments.len(), 1);
        assert_eq!(sentiment.assessments[0].token, "lovely");
    }

    #[test]
    fn test_intensifier() {
        let sentiment = analyze("Very good.");
        assert!((sentiment.polarity - 0.91).abs() < 1e-9);
        assert_eq!(sentiment.assessments[0].token, "very good");
    }

    #[test]
    fn test_negation() {
        let sentiment = analyze("It isn't good at all.");
        assert!((sentiment.polarity + 0.35).abs() < 1e-9);
        assert_eq!(sentiment.assessments[0].token, "n't good");
    }

    #[test]
    fn test_mean_over_hits() {
        let sentiment = analyze("Delicious, but the finish is harsh.");
        assert!((sentiment.polarity - 0.3).abs() < 1e-9);
        assert_eq!(sentiment.assessments.len(), 2);
    }

    #[test]
    fn test_no_hits_is_neutral() {
        let sentiment = analyze("Cherry and oak.");
        assert_eq!(sentiment.polarity, 0.0);
        assert_eq!(sentiment.subjectivity, 0.0);
        assert!(sentiment.assessments.is_empty());
    }

    #[test]
    fn test_scores_stay_in_range() {
        let sentiment = analyze("Incredibly superb, extremely excellent, super delicious!");
        assert!(sentiment.polarity <= 1.0);
        assert!(sentiment.subjectivity <= 1.0);
    }
}
