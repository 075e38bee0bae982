//! Default rule-based language pipeline

use revgraph_core::{EntityMention, Result, Sentiment};

use crate::lemma::Lemmatizer;
use crate::ner::RuleBasedNer;
use crate::sentiment::LexiconSentiment;
use crate::tokenizer::Tokenizer;
use crate::{LanguagePipeline, Span, Token};

/// `LanguagePipeline` built from regexes, tables and lexicons
pub struct RulePipeline {
    tokenizer: Tokenizer,
    lemmatizer: Lemmatizer,
    ner: RuleBasedNer,
    sentiment: LexiconSentiment,
}

impl RulePipeline {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            lemmatizer: Lemmatizer::new(),
            ner: RuleBasedNer::new(),
            sentiment: LexiconSentiment::new(),
        }
    }
}

impl Default for RulePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePipeline for RulePipeline {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        Ok(self.tokenizer.tokenize(text))
    }

    fn sentences(&self, _text: &str, tokens: &[Token]) -> Result<Vec<Span>> {
        Ok(self.tokenizer.sentences(tokens))
    }

    fn lemmatize(&self, token: &Token) -> Result<String> {
        Ok(self.lemmatizer.lemma(&token.text))
    }

    fn entities(&self, text: &str) -> Result<Vec<EntityMention>> {
        Ok(self
            .ner
            .recognize(text)
            .into_iter()
            .map(EntityMention::from)
            .collect())
    }

    fn sentiment(&self, text: &str) -> Result<Sentiment> {
        Ok(self.sentiment.analyze(&self.tokenizer.tokenize(text)))
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}
