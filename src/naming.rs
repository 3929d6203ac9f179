//! Category naming via weighted term extraction.
//!
//! The primary strategy scores word n-grams (2-7) by TF-IDF over the
//! cluster's own texts, greedily selects the top terms without repeating
//! words, and cleans the concatenation into a title-cased name. When that
//! yields nothing usable, a RAKE pass over the concatenated text takes over;
//! the caller substitutes a deterministic placeholder if both fail.

use std::collections::{HashMap, HashSet};

use crate::preprocess::{clean_text, tokenize_words, word_ngrams};
use crate::rake;
use crate::stopwords::{is_stop_word, is_unwanted_name_word, stop_word_set, SHORT_WORD_ALLOWLIST};

/// N-gram lengths considered for name terms.
const NAME_NGRAM_MIN: usize = 2;
const NAME_NGRAM_MAX: usize = 7;

/// Vocabulary cap: only the most frequent terms are scored.
const MAX_FEATURES: usize = 500;

/// Capitalize the first letter of a word.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Clean a proposed category name: drop unwanted words, deduplicate,
/// strip non-letters, drop short words, title-case. Returns an empty
/// string when no meaningful words remain.
pub fn clean_final_name(name: &str) -> String {
    let lowered = name.to_lowercase();

    // Drop unwanted words, then duplicate words (first occurrence wins)
    let mut seen: HashSet<&str> = HashSet::new();
    let mut words: Vec<&str> = Vec::new();
    for word in lowered.split_whitespace() {
        if is_unwanted_name_word(word) {
            continue;
        }
        if seen.insert(word) {
            words.push(word);
        }
    }

    // Strip everything but letters and spaces, then re-collapse
    let joined = words.join(" ");
    let stripped: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    let collapsed = clean_text(&stripped);

    // Short words only survive on the allow-list
    let kept: Vec<&str> = collapsed
        .split_whitespace()
        .filter(|w| w.len() > 2 || SHORT_WORD_ALLOWLIST.contains(w))
        .collect();

    kept.iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score the cluster's n-gram vocabulary by aggregate TF-IDF, corpus-local.
/// Returns terms in descending score order (lexicographic tie-break).
fn ranked_terms(cluster_texts: &[String]) -> Vec<(String, f64)> {
    let stop_set = stop_word_set();
    let docs: Vec<Vec<String>> = cluster_texts
        .iter()
        .map(|text| {
            tokenize_words(text)
                .into_iter()
                .filter(|t| !stop_set.contains(t.as_str()))
                .collect()
        })
        .collect();

    // Per-document term counts and document frequencies
    let n_docs = docs.len();
    let mut doc_counts: Vec<HashMap<String, usize>> = Vec::with_capacity(n_docs);
    let mut document_frequency: HashMap<String, usize> = HashMap::new();
    for tokens in &docs {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for ngram in word_ngrams(tokens, NAME_NGRAM_MIN, NAME_NGRAM_MAX) {
            *counts.entry(ngram).or_insert(0) += 1;
        }
        for term in counts.keys() {
            *document_frequency.entry(term.clone()).or_insert(0) += 1;
        }
        doc_counts.push(counts);
    }

    if document_frequency.is_empty() {
        return vec![];
    }

    // Cap the vocabulary at the most frequent terms
    let vocabulary: HashSet<String> = if document_frequency.len() > MAX_FEATURES {
        let mut by_frequency: Vec<(&String, usize)> = document_frequency
            .iter()
            .map(|(term, _)| {
                let total: usize = doc_counts.iter().filter_map(|c| c.get(term)).sum();
                (term, total)
            })
            .collect();
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        by_frequency
            .into_iter()
            .take(MAX_FEATURES)
            .map(|(term, _)| term.clone())
            .collect()
    } else {
        document_frequency.keys().cloned().collect()
    };

    // Aggregate TF-IDF with smoothed IDF
    let mut scored: Vec<(String, f64)> = vocabulary
        .into_iter()
        .map(|term| {
            let df = document_frequency.get(&term).copied().unwrap_or(0);
            let idf = (((1 + n_docs) as f64) / ((1 + df) as f64)).ln() + 1.0;
            let tf_total: usize = doc_counts.iter().filter_map(|c| c.get(&term)).sum();
            let score = tf_total as f64 * idf;
            (term, score)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored
}

/// Primary naming strategy: greedy TF-IDF term selection.
/// Returns None when no name with at least `target_words / 2` words survives
/// cleaning.
fn tfidf_name(cluster_texts: &[String], target_words: usize) -> Option<String> {
    let ranked = ranked_terms(cluster_texts);
    if ranked.is_empty() {
        return None;
    }

    let mut selected: Vec<&str> = Vec::new();
    let mut seen_words: HashSet<&str> = HashSet::new();
    let mut word_count = 0usize;

    for (term, _score) in &ranked {
        let term_words: Vec<&str> = term.split(' ').collect();

        // A multi-word term may not reuse any already-selected word;
        // a single-word term is blocked only by that exact word.
        if term_words.len() > 1 && term_words.iter().any(|w| seen_words.contains(w)) {
            continue;
        }
        if term_words.len() == 1 && seen_words.contains(term_words[0]) {
            continue;
        }
        if term.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if is_stop_word(term) {
            continue;
        }

        selected.push(term.as_str());
        word_count += term_words.len();
        for word in term_words {
            seen_words.insert(word);
        }

        if word_count >= target_words {
            break;
        }
    }

    if selected.is_empty() {
        return None;
    }

    let name = clean_final_name(&selected.join(" "));
    if !name.is_empty() && name.split(' ').count() >= target_words / 2 {
        Some(name)
    } else {
        None
    }
}

/// Derive a name for one cluster's texts, or None when neither strategy
/// produces anything usable (the caller substitutes a placeholder).
pub fn name_cluster(cluster_texts: &[String], target_words: usize) -> Option<String> {
    if cluster_texts.is_empty() {
        return None;
    }

    if let Some(name) = tfidf_name(cluster_texts, target_words) {
        return Some(name);
    }

    println!("[Naming] Term extraction found no usable name. Falling back to keyword ranking.");
    rake::rake_name(&cluster_texts.join(" "))
}

/// Deterministic placeholder for a cluster that produced no name.
pub fn cluster_placeholder(label: i32) -> String {
    format!("Generic Remark Category For Cluster {}", label)
}

/// Deterministic placeholder for a merged group that produced no name.
pub fn merged_placeholder(group: i32) -> String {
    format!("Merged Generic Category Type For Group {}", group)
}
