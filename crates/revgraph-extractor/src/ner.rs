//! Named Entity Recognition (NER) module
//!
//! Rule-based recognition for review text:
//! - Regex patterns for dates, percentages, money, quantities and numbers
//! - A gazetteer of wine geography and nationalities
//! - Overlap resolution keeping the most confident, longest match

use std::collections::HashSet;

use regex::Regex;

use revgraph_core::EntityMention;

// ============================================================================
// Entity Labels
// ============================================================================

/// Entity labels, numbered with the conventional label identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Norp,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl EntityLabel {
    /// Label name as stored in records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Norp => "NORP",
            Self::Fac => "FAC",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Loc => "LOC",
            Self::Product => "PRODUCT",
            Self::Event => "EVENT",
            Self::WorkOfArt => "WORK_OF_ART",
            Self::Law => "LAW",
            Self::Language => "LANGUAGE",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Percent => "PERCENT",
            Self::Money => "MONEY",
            Self::Quantity => "QUANTITY",
            Self::Ordinal => "ORDINAL",
            Self::Cardinal => "CARDINAL",
        }
    }

    /// Numeric label identifier
    pub fn code(&self) -> u64 {
        match self {
            Self::Person => 380,
            Self::Norp => 381,
            Self::Fac => 382,
            Self::Org => 383,
            Self::Gpe => 384,
            Self::Loc => 385,
            Self::Product => 386,
            Self::Event => 387,
            Self::WorkOfArt => 388,
            Self::Law => 389,
            Self::Language => 390,
            Self::Date => 391,
            Self::Time => 392,
            Self::Percent => 393,
            Self::Money => 394,
            Self::Quantity => 395,
            Self::Ordinal => 396,
            Self::Cardinal => 397,
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity found in text, with its byte span
#[derive(Debug, Clone)]
pub struct RecognizedEntity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

impl From<RecognizedEntity> for EntityMention {
    fn from(entity: RecognizedEntity) -> Self {
        Self {
            text: entity.text,
            label_code: entity.label.code(),
            label_name: entity.label.as_str().to_string(),
        }
    }
}

// ============================================================================
// Rule-based NER
// ============================================================================

/// Gazetteer entry
#[derive(Debug, Clone)]
pub struct DictionaryEntry {
    pub term: String,
    pub label: EntityLabel,
    pub aliases: Vec<String>,
}

/// Rule-based NER using regex patterns and a gazetteer
pub struct RuleBasedNer {
    /// Pattern rules (regex -> label, confidence)
    patterns: Vec<(Regex, EntityLabel, f32)>,
    /// Gazetteer entries with their compiled matchers
    dictionary: Vec<(DictionaryEntry, Regex)>,
}

impl RuleBasedNer {
    /// Create a recognizer with the default review rules
    pub fn new() -> Self {
        let mut ner = Self {
            patterns: Vec::new(),
            dictionary: Vec::new(),
        };

        ner.init_patterns();
        ner.init_gazetteer();
        ner
    }

    fn init_patterns(&mut self) {
        // Dates
        self.add_pattern(r"\b(?:19|20)\d{2}s?\b", EntityLabel::Date, 0.9);
        self.add_pattern(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b", EntityLabel::Date, 0.95);
        self.add_pattern(
            r"\b(?:\d+|two|three|four|five|six|seven|eight|nine|ten)\s+(?:years?|months?|decades?)\b",
            EntityLabel::Date,
            0.9,
        );
        self.add_pattern(
            r"\b(?:January|February|March|April|June|July|August|September|October|November|December)(?:\s+\d{1,2})?(?:,?\s+\d{4})?\b",
            EntityLabel::Date,
            0.85,
        );

        // Amounts
        self.add_pattern(r"\b\d+(?:\.\d+)?\s?%", EntityLabel::Percent, 0.95);
        self.add_pattern(r"\$\s?\d+(?:[.,]\d+)*", EntityLabel::Money, 0.95);
        self.add_pattern(r"\b\d+(?:\.\d+)?\s(?:dollars|euros)\b", EntityLabel::Money, 0.9);
        self.add_pattern(
            r"\b\d+(?:\.\d+)?\s?(?:ml|mL|liters?|litres?|grams?|hectares?|acres?)\b",
            EntityLabel::Quantity,
            0.9,
        );

        // Numbers
        self.add_pattern(
            r"\b(?i:first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|\d+(?:st|nd|rd|th))\b",
            EntityLabel::Ordinal,
            0.85,
        );
        self.add_pattern(r"\b\d+(?:[.,]\d+)*\b", EntityLabel::Cardinal, 0.6);
        self.add_pattern(
            r"\b(?i:one|two|three|four|five|six|seven|eight|nine|ten|dozen|hundred|thousand)\b",
            EntityLabel::Cardinal,
            0.6,
        );
    }

    fn init_gazetteer(&mut self) {
        // Countries, states and regions
        for place in [
            "France", "Italy", "Spain", "Portugal", "Germany", "Austria", "Greece", "Hungary",
            "Chile", "Argentina", "Australia", "California", "Oregon", "Washington",
            "Bordeaux", "Burgundy", "Champagne", "Tuscany", "Piedmont", "Rioja", "Napa",
            "Sonoma", "Mendoza", "Barossa", "Alsace", "Provence", "Sicily", "Douro", "Mosel",
        ] {
            self.add_term(place, EntityLabel::Gpe, vec![]);
        }
        self.add_term("New Zealand", EntityLabel::Gpe, vec!["NZ"]);
        self.add_term("South Africa", EntityLabel::Gpe, vec![]);
        self.add_term("New York", EntityLabel::Gpe, vec![]);
        self.add_term("Paso Robles", EntityLabel::Gpe, vec![]);

        // Valleys and other named areas
        for area in [
            "Napa Valley",
            "Willamette Valley",
            "Russian River Valley",
            "Columbia Valley",
            "Central Coast",
            "Sonoma Coast",
            "Finger Lakes",
        ] {
            self.add_term(area, EntityLabel::Loc, vec![]);
        }
        self.add_term("Loire Valley", EntityLabel::Loc, vec!["Loire"]);
        self.add_term("Rhône Valley", EntityLabel::Loc, vec!["Rhone Valley", "Rhône", "Rhone"]);

        // Nationalities
        self.add_term("French", EntityLabel::Norp, vec![]);
        self.add_term("Italian", EntityLabel::Norp, vec![]);
        self.add_term("Spanish", EntityLabel::Norp, vec![]);
        self.add_term("Portuguese", EntityLabel::Norp, vec![]);
        self.add_term("German", EntityLabel::Norp, vec![]);
        self.add_term("Austrian", EntityLabel::Norp, vec![]);
        self.add_term("Chilean", EntityLabel::Norp, vec![]);
        self.add_term("Argentine", EntityLabel::Norp, vec!["Argentinian"]);
        self.add_term("Australian", EntityLabel::Norp, vec![]);
        self.add_term("Californian", EntityLabel::Norp, vec![]);
        self.add_term("American", EntityLabel::Norp, vec![]);
    }

    /// Add a regex pattern
    fn add_pattern(&mut self, pattern: &str, label: EntityLabel, confidence: f32) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, label, confidence));
        }
    }

    /// Add a gazetteer term; matching is case-sensitive on word boundaries
    fn add_term(&mut self, term: &str, label: EntityLabel, aliases: Vec<&str>) {
        let entry = DictionaryEntry {
            term: term.to_string(),
            label,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        };

        let mut forms: Vec<&str> = std::iter::once(term).chain(aliases).collect();
        forms.sort_by_key(|f| std::cmp::Reverse(f.len()));
        let alternation = forms
            .iter()
            .map(|f| regex::escape(f))
            .collect::<Vec<_>>()
            .join("|");

        if let Ok(regex) = Regex::new(&format!(r"\b(?:{alternation})\b")) {
            self.dictionary.push((entry, regex));
        }
    }

    fn extract_by_patterns(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut entities = Vec::new();

        for (regex, label, confidence) in &self.patterns {
            for mat in regex.find_iter(text) {
                entities.push(RecognizedEntity {
                    text: mat.as_str().to_string(),
                    label: *label,
                    start: mat.start(),
                    end: mat.end(),
                    confidence: *confidence,
                });
            }
        }

        entities
    }

    fn extract_by_dictionary(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut entities = Vec::new();

        for (entry, regex) in &self.dictionary {
            for mat in regex.find_iter(text) {
                entities.push(RecognizedEntity {
                    text: mat.as_str().to_string(),
                    label: entry.label,
                    start: mat.start(),
                    end: mat.end(),
                    confidence: 0.95,
                });
            }
        }

        entities
    }

    /// Remove overlapping entities, keeping the most confident then longest
    fn deduplicate(&self, mut entities: Vec<RecognizedEntity>) -> Vec<RecognizedEntity> {
        entities.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.confidence.total_cmp(&a.confidence))
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        // Higher-confidence spans claim their bytes first
        let mut by_priority: Vec<usize> = (0..entities.len()).collect();
        by_priority.sort_by(|&x, &y| {
            let (a, b) = (&entities[x], &entities[y]);
            b.confidence
                .total_cmp(&a.confidence)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
                .then(a.start.cmp(&b.start))
        });

        let mut covered: HashSet<usize> = HashSet::new();
        let mut keep = vec![false; entities.len()];
        for index in by_priority {
            let entity = &entities[index];
            if !(entity.start..entity.end).any(|i| covered.contains(&i)) {
                covered.extend(entity.start..entity.end);
                keep[index] = true;
            }
        }

        entities
            .into_iter()
            .zip(keep)
            .filter_map(|(entity, kept)| kept.then_some(entity))
            .collect()
    }

    /// Recognize entities in order of appearance
    pub fn recognize(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut entities = self.extract_by_patterns(text);
        entities.extend(self.extract_by_dictionary(text));
        self.deduplicate(entities)
    }
}

impl Default for RuleBasedNer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
