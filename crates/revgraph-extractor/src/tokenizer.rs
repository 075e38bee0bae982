//! Tokenization and sentence segmentation
//!
//! Words, numbers, ellipses and single punctuation marks become tokens.
//! English clitics (`n't`, `'s`, `'re`, ...) are split off as separate
//! tokens, and hyphens stand on their own.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Span, Token};

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\.{3}|\d+(?:[.,:]\d+)*\p{L}*|[\p{L}\p{M}_][\p{L}\p{M}\d_]*(?:['’]\p{L}+)*|\S",
    )
    .expect("token pattern is valid")
});

const CLITICS: &[&str] = &["'s", "'re", "'ll", "'ve", "'d", "'m", "’s", "’re", "’ll", "’ve", "’d", "’m"];
const NEGATIONS: &[&str] = &["n't", "n’t"];

const TERMINATORS: &[&str] = &[".", "!", "?", "..."];
const CLOSERS: &[&str] = &["\"", "'", ")", "]", "”", "’", "»"];
const ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "st", "mt", "vs", "etc", "approx", "no"];

/// Regex-based tokenizer
#[derive(Debug, Default, Clone)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Split text into tokens with byte spans
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();

        for mat in TOKEN_PATTERN.find_iter(text) {
            let (start, end) = (mat.start(), mat.end());
            match split_clitic(mat.as_str()) {
                Some(offset) => {
                    tokens.push(Token::new(&text[start..start + offset], start, start + offset));
                    tokens.push(Token::new(&text[start + offset..end], start + offset, end));
                }
                None => tokens.push(Token::new(mat.as_str(), start, end)),
            }
        }

        tokens
    }

    /// Group tokens into sentences.
    ///
    /// A sentence ends after a run of terminators plus any closing quotes or
    /// brackets. A period glued to a known abbreviation does not end one.
    pub fn sentences(&self, tokens: &[Token]) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start: Option<usize> = None;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            let sentence_start = *start.get_or_insert(token.start);

            if is_terminator(token) && !follows_abbreviation(tokens, i) {
                let mut last = i;
                while last + 1 < tokens.len()
                    && (is_terminator(&tokens[last + 1])
                        || CLOSERS.contains(&tokens[last + 1].text.as_str()))
                {
                    last += 1;
                }
                spans.push(Span {
                    start: sentence_start,
                    end: tokens[last].end,
                });
                start = None;
                i = last + 1;
                continue;
            }

            i += 1;
        }

        if let (Some(sentence_start), Some(last)) = (start, tokens.last()) {
            spans.push(Span {
                start: sentence_start,
                end: last.end,
            });
        }

        spans
    }
}

/// Byte offset at which a trailing clitic begins, if any
fn split_clitic(word: &str) -> Option<usize> {
    let lower = word.to_lowercase();
    if lower.len() != word.len() {
        return None;
    }

    NEGATIONS
        .iter()
        .chain(CLITICS.iter())
        .find(|suffix| lower.ends_with(*suffix) && lower.len() > suffix.len())
        .map(|suffix| word.len() - suffix.len())
}

fn is_terminator(token: &Token) -> bool {
    TERMINATORS.contains(&token.text.as_str())
}

fn follows_abbreviation(tokens: &[Token], i: usize) -> bool {
    if tokens[i].text != "." || i == 0 {
        return false;
    }
    let previous = &tokens[i - 1];
    previous.end == tokens[i].start && ABBREVIATIONS.contains(&previous.text.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_punctuation_is_tokenized() {
        let tokens = Tokenizer::new().tokenize("A lovely cherry and oak note, quite fruity.");
        assert_eq!(
            texts(&tokens),
            vec!["A", "lovely", "cherry", "and", "oak", "note", ",", "quite", "fruity", "."]
        );
    }

    #[test]
    fn test_clitics_are_split() {
        let tokens = Tokenizer::new().tokenize("It doesn't fade; the wine's finish lingers.");
        assert_eq!(
            texts(&tokens),
            vec!["It", "does", "n't", "fade", ";", "the", "wine", "'s", "finish", "lingers", "."]
        );
    }

    #[test]
    fn test_numbers_and_hyphens() {
        let tokens = Tokenizer::new().tokenize("13.5% alcohol, full-bodied 1990s style...");
        assert_eq!(
            texts(&tokens),
            vec!["13.5", "%", "alcohol", ",", "full", "-", "bodied", "1990s", "style", "..."]
        );
    }

    #[test]
    fn test_spans_index_source() {
        let text = "Dry, crisp.";
        for token in Tokenizer::new().tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_sentences() {
        let tokenizer = Tokenizer::new();
        let text = "Ripe plum. Smoky finish! Drink now";
        let spans = tokenizer.sentences(&tokenizer.tokenize(text));

        assert_eq!(spans.len(), 3);
        assert_eq!(&text[spans[0].start..spans[0].end], "Ripe plum.");
        assert_eq!(&text[spans[2].start..spans[2].end], "Drink now");
    }

    #[test]
    fn test_sentences_edge_cases() {
        let tokenizer = Tokenizer::new();
        assert!(tokenizer.sentences(&tokenizer.tokenize("")).is_empty());
        assert_eq!(tokenizer.sentences(&tokenizer.tokenize("No period here")).len(), 1);
        assert_eq!(
            tokenizer
                .sentences(&tokenizer.tokenize("From Mt. Veeder. Superb (truly!)"))
                .len(),
            2
        );
    }
}
