//! Boilerplate-aware preprocessing.
//!
//! Organizational boilerplate ("consumer visited office regarding", call
//! center sign-offs) shows up in nearly every remark and drowns the signal
//! the embeddings need. Phrases present in at least `min_df` of all remarks
//! are detected by substring document frequency and stripped as whole words
//! before anything downstream sees the text.

use regex::Regex;

use crate::error::PipelineError;
use crate::stopwords::stop_word_set;

/// N-gram lengths considered when mining boilerplate phrases.
const BOILERPLATE_NGRAM_MIN: usize = 2;
const BOILERPLATE_NGRAM_MAX: usize = 5;

/// Collapse runs of whitespace and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased alphabetic tokens of at least 2 letters.
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|s| s.chars().count() >= 2)
        .map(|s| s.to_string())
        .collect()
}

/// Word n-grams of lengths `min_n..=max_n` over a token sequence.
pub fn word_ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in min_n..=max_n {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

/// Detect phrases that occur, as a literal substring of the lower-cased
/// remark, in at least `min_df` fraction of remarks. Candidates are word
/// n-grams (2-5) over stop-word-filtered tokens; detected phrases are
/// returned longest first so containing phrases are stripped before the
/// shorter phrases inside them.
fn detect_boilerplate_phrases(
    remarks: &[String],
    min_df: f64,
) -> Result<Vec<String>, PipelineError> {
    if remarks.len() < 2 {
        return Err(PipelineError::Vectorization(
            "too few texts for boilerplate detection".to_string(),
        ));
    }

    let stop_set = stop_word_set();
    let mut candidates: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for remark in remarks {
        let tokens: Vec<String> = tokenize_words(remark)
            .into_iter()
            .filter(|t| !stop_set.contains(t.as_str()))
            .collect();
        for ngram in word_ngrams(&tokens, BOILERPLATE_NGRAM_MIN, BOILERPLATE_NGRAM_MAX) {
            if seen.insert(ngram.clone()) {
                candidates.push(ngram);
            }
        }
    }

    if candidates.is_empty() {
        return Err(PipelineError::Vectorization(
            "no candidate vocabulary in remarks".to_string(),
        ));
    }

    // Document frequency by substring containment on the lower-cased remark
    let lowered: Vec<String> = remarks.iter().map(|r| r.to_lowercase()).collect();
    let threshold = min_df * remarks.len() as f64;
    let mut phrases: Vec<String> = candidates
        .into_iter()
        .filter(|phrase| {
            let df = lowered.iter().filter(|r| r.contains(phrase.as_str())).count();
            df as f64 >= threshold
        })
        .collect();

    if phrases.is_empty() {
        return Err(PipelineError::Vectorization(
            "no phrase meets the document-frequency threshold".to_string(),
        ));
    }

    // Longest first; ties broken lexicographically for a stable order
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    Ok(phrases)
}

/// Strip detected boilerplate from every remark, preserving order and count.
/// Falls back to plain whitespace normalization when the vocabulary is
/// degenerate (too few texts, nothing frequent enough).
pub fn preprocess_remarks(remarks: &[String], min_df: f64) -> Vec<String> {
    println!("[Preprocess] Started for {} remarks", remarks.len());

    let phrases = match detect_boilerplate_phrases(remarks, min_df) {
        Ok(phrases) => phrases,
        Err(err) => {
            println!("[Preprocess] {}; returning cleaned remarks directly", err);
            return remarks.iter().map(|r| clean_text(r)).collect();
        }
    };

    println!("[Preprocess] Found {} boilerplate phrases", phrases.len());

    let patterns: Vec<Regex> = phrases
        .iter()
        .filter_map(|p| Regex::new(&format!(r"\b{}\b", regex::escape(p))).ok())
        .collect();

    remarks
        .iter()
        .map(|remark| {
            let mut cleaned = clean_text(&remark.to_lowercase());
            for pattern in &patterns {
                cleaned = pattern.replace_all(&cleaned, " ").into_owned();
            }
            clean_text(&cleaned)
        })
        .collect()
}
