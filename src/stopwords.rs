//! Word tables shared by boilerplate detection, term extraction and naming.
//!
//! The universal list combines English function words with the temporal,
//! numeric and courtesy noise that dominates operational remark text.

use std::collections::HashSet;

/// Stop words excluded from n-gram vocabularies and RAKE phrases.
pub const UNIVERSAL_STOP_WORDS: &[&str] = &[
    // English function words
    "a", "an", "the", "and", "or", "but", "if", "because", "as", "until", "while",
    "is", "are", "was", "were", "be", "been", "being", "am",
    "have", "has", "had", "having", "do", "does", "did", "doing",
    "will", "would", "could", "should", "may", "might", "must", "shall", "can",
    "to", "of", "in", "for", "on", "with", "at", "from", "by", "up", "down",
    "out", "off", "over", "under", "again", "further", "then", "once",
    "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "here", "there", "when", "where", "why", "how",
    "what", "who", "whom", "which", "whether",
    "this", "that", "these", "those", "it", "its", "itself",
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves",
    "you", "your", "yours", "yourself", "he", "him", "his", "himself",
    "she", "her", "hers", "herself", "they", "them", "their", "theirs",
    "all", "each", "every", "both", "few", "more", "most", "other", "some",
    "such", "nor", "only", "own", "same", "so", "than", "too", "very",
    "just", "don", "now", "any",
    // Temporal noise
    "yesterday", "today", "tomorrow", "morning", "evening", "night",
    "day", "days", "hr", "hrs", "hour", "hours", "time", "date",
    "week", "month", "year", "ago",
    // Number words
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "zero",
    // Domain noise
    "consumer", "customer", "number", "no", "code", "id", "location",
    "address", "phone", "mobile", "call", "report", "registered",
    "ok", "yes", "not", "hi", "hello", "sir", "madam", "pls", "please",
    "regards", "type", "urban", "complaint", "detail", "general",
    "kv", "tf", "na", "service", "request", "feedback", "query",
    "regarding", "given",
];

/// Additional words dropped from final category names, beyond the stop words.
/// These are generic category-speak that carries no information in a label.
pub const UNWANTED_NAME_WORDS: &[&str] = &[
    "problem", "issue", "fault", "category", "item", "uncategorized",
    "line", "output", "summary", "generated", "concise", "text",
    "description", "remark", "remarks", "due", "status", "action",
    "info", "data", "current", "specific", "check", "point",
    "followup", "case", "system", "management", "update", "account",
    "last", "coming", "failed", "resolution", "resolved", "solving",
    "fixing", "solution", "inquiry", "asking", "asked", "related",
    "concerning",
];

/// Short words allowed to survive the <= 2 letter filter in final names.
pub const SHORT_WORD_ALLOWLIST: &[&str] = &[
    "an", "on", "in", "to", "at", "by", "of", "or", "go", "no", "up",
    "us", "my", "me", "he", "we", "is", "as", "if", "it", "do",
];

/// Build the stop-word set for lookups.
pub fn stop_word_set() -> HashSet<&'static str> {
    UNIVERSAL_STOP_WORDS.iter().copied().collect()
}

/// True if `word` (already lower-cased) is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    UNIVERSAL_STOP_WORDS.contains(&word)
}

/// True if `word` (already lower-cased) must not appear in a category name.
pub fn is_unwanted_name_word(word: &str) -> bool {
    is_stop_word(word) || UNWANTED_NAME_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_cover_function_words() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("days"));
        assert!(!is_stop_word("power"));
    }

    #[test]
    fn test_unwanted_includes_stop_words() {
        assert!(is_unwanted_name_word("the"));
        assert!(is_unwanted_name_word("problem"));
        assert!(!is_unwanted_name_word("supply"));
    }

    #[test]
    fn test_no_duplicates_in_universal_list() {
        let set = stop_word_set();
        assert_eq!(set.len(), UNIVERSAL_STOP_WORDS.len());
    }
}
