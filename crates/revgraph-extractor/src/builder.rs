//! Record assembly
//!
//! Collects extraction output into a `ReviewRecord`. Nothing here touches the
//! filesystem or the language pipeline.

use revgraph_core::{EntityMention, ReviewRecord, Sentiment};

/// Builder for a single `ReviewRecord`
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: ReviewRecord,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            record: ReviewRecord::new(name, raw_text),
        }
    }

    /// Token and sentence counts
    pub fn counts(mut self, word_count: usize, sentence_count: usize) -> Self {
        self.record.word_count = word_count as u64;
        self.record.sentence_count = sentence_count as u64;
        self
    }

    pub fn processed_text(mut self, processed: impl Into<String>) -> Self {
        self.record.processed_text = processed.into();
        self
    }

    pub fn flavors(mut self, flavors: Vec<String>) -> Self {
        self.record.flavors = flavors;
        self
    }

    /// Entity mentions; `None` leaves the list empty
    pub fn entities(mut self, entities: Option<Vec<EntityMention>>) -> Self {
        self.record.entities = entities.unwrap_or_default();
        self
    }

    /// Sentiment; `None` leaves it unset
    pub fn sentiment(mut self, sentiment: Option<Sentiment>) -> Self {
        self.record.sentiment = sentiment;
        self
    }

    pub fn build(self) -> ReviewRecord {
        self.record
    }

    /// Build and append to an accumulating batch
    pub fn append_to(self, batch: &mut Vec<ReviewRecord>) {
        batch.push(self.build());
    }
}
