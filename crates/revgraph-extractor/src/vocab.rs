//! Fixed vocabularies: stop words, punctuation and flavor keywords

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// ASCII punctuation characters
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Flavor keywords matched against processed text.
///
/// The misspellings are part of the vocabulary; `testflavor*` entries are
/// used by upload smoke tests.
pub const FLAVOR_KEYWORDS: &[&str] = &[
    "wood",
    "oak",
    "spices",
    "spice",
    "pepper",
    "blackberry",
    "hicoky",
    "cigar",
    "menthol",
    "smoky",
    "forest",
    "raspberry",
    "berry",
    "berries",
    "currant",
    "currants",
    "licorice",
    "coconut",
    "leather",
    "plum",
    "chocolate",
    "orange",
    "honey",
    "gooseberry",
    "fruit",
    "fruity",
    "strawberry",
    "cherry",
    "oily",
    "coffee",
    "expresso",
    "cranberry",
    "pineapple",
    "tangerine",
    "testflavor1",
    "testflavor2",
    "testflavor3",
    "testflavor4",
];

const STOP_WORD_LIST: &[&str] = &[
    "'d", "'ll", "'m", "'re", "'s", "'ve", "a", "about", "above", "across", "after",
    "afterwards", "again", "against", "all", "almost", "alone", "along", "already", "also",
    "although", "always", "am", "among", "amongst", "amount", "an", "and", "another", "any",
    "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around", "as", "at", "back",
    "be", "became", "because", "become", "becomes", "becoming", "been", "before",
    "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond",
    "both", "bottom", "but", "by", "ca", "call", "can", "cannot", "could", "did", "do",
    "does", "doing", "done", "down", "due", "during", "each", "eight", "either", "eleven",
    "else", "elsewhere", "empty", "enough", "even", "ever", "every", "everyone",
    "everything", "everywhere", "except", "few", "fifteen", "fifty", "first", "five", "for",
    "former", "formerly", "forty", "four", "from", "front", "full", "further", "get", "give",
    "go", "had", "has", "have", "he", "hence", "her", "here", "hereafter", "hereby",
    "herein", "hereupon", "hers", "herself", "him", "himself", "his", "how", "however",
    "hundred", "i", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just",
    "keep", "last", "latter", "latterly", "least", "less", "made", "make", "many", "may",
    "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly", "move",
    "much", "must", "my", "myself", "n't", "name", "namely", "neither", "never",
    "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "n‘t", "n’t", "of", "off", "often", "on", "once", "one",
    "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "part", "per", "perhaps", "please", "put", "quite", "rather", "re",
    "really", "regarding", "same", "say", "see", "seem", "seemed", "seeming", "seems",
    "serious", "several", "she", "should", "show", "side", "since", "six", "sixty", "so",
    "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
    "still", "such", "take", "ten", "than", "that", "the", "their", "them", "themselves",
    "then", "thence", "there", "thereafter", "thereby", "therefore", "therein",
    "thereupon", "these", "they", "third", "this", "those", "though", "three", "through",
    "throughout", "thru", "thus", "to", "together", "too", "top", "toward", "towards",
    "twelve", "twenty", "two", "under", "unless", "until", "up", "upon", "us", "used",
    "using", "various", "very", "via", "was", "we", "well", "were", "what", "whatever",
    "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein",
    "whereupon", "wherever", "whether", "which", "while", "whither", "who", "whoever",
    "whole", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves", "‘d", "‘ll", "‘m", "‘re", "‘s",
    "‘ve", "’d", "’ll", "’m", "’re", "’s", "’ve",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORD_LIST.iter().copied().collect());

static FLAVORS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| FLAVOR_KEYWORDS.iter().copied().collect());

/// Case-sensitive stop-word membership
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// True for the empty string and single ASCII punctuation characters
pub fn is_punctuation(word: &str) -> bool {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some(c), None) => PUNCTUATION.contains(c),
        _ => false,
    }
}

/// Exact-match flavor keyword membership
pub fn is_flavor(word: &str) -> bool {
    FLAVORS.contains(word)
}

/// Every whitespace-separated token of `processed` that is a flavor keyword,
/// in order, duplicates kept
pub fn match_flavors(processed: &str) -> Vec<String> {
    processed
        .split(' ')
        .filter(|word| is_flavor(word))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_are_case_sensitive() {
        assert!(is_stop_word("and"));
        assert!(is_stop_word("quite"));
        assert!(!is_stop_word("And"));
        assert!(!is_stop_word("cherry"));
    }

    #[test]
    fn test_punctuation() {
        assert!(is_punctuation(","));
        assert!(is_punctuation("."));
        assert!(is_punctuation(""));
        assert!(!is_punctuation("..."));
        assert!(!is_punctuation("a"));
        assert!(!is_punctuation("’"));
    }

    #[test]
    fn test_match_flavors_keeps_order_and_duplicates() {
        let flavors = match_flavors("oak cherry note oak cherries");
        assert_eq!(flavors, vec!["oak", "cherry", "oak"]);
    }

    #[test]
    fn test_match_flavors_is_exact() {
        assert!(match_flavors("oaky cherryish Cherry").is_empty());
        assert!(match_flavors("").is_empty());
    }
}
