//! RAKE-style keyword extraction, used as the fallback naming strategy.
//!
//! Candidate phrases are maximal runs of content words between stop words
//! and punctuation. Each word scores degree/frequency over the candidate
//! set; a phrase scores the sum of its word scores.

use std::collections::{HashMap, HashSet};

use crate::naming::clean_final_name;
use crate::stopwords::stop_word_set;

/// Longest candidate phrase considered, in words.
const MAX_PHRASE_WORDS: usize = 5;

/// Word count bounds on a cleaned candidate name.
const NAME_WORDS_MIN: usize = 2;
const NAME_WORDS_MAX: usize = 6;

/// How many cleaned candidates to collect before picking the best.
const MAX_CANDIDATES: usize = 5;

/// Split text into candidate phrases: runs of non-stop alphabetic words,
/// broken at stop words, digits and punctuation. Runs longer than
/// `MAX_PHRASE_WORDS` are discarded.
fn candidate_phrases(text: &str) -> Vec<Vec<String>> {
    let stop_set = stop_word_set();
    let mut phrases: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    let lowered = text.to_lowercase();
    for fragment in lowered.split(|c: char| !c.is_alphabetic() && c != '\'') {
        let word = fragment.trim_matches('\'');
        let is_break = word.is_empty() || stop_set.contains(word);
        if is_break {
            if !current.is_empty() {
                if current.len() <= MAX_PHRASE_WORDS {
                    phrases.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            continue;
        }
        current.push(word.to_string());
    }
    if !current.is_empty() && current.len() <= MAX_PHRASE_WORDS {
        phrases.push(current);
    }

    phrases
}

/// Rank phrases by summed degree/frequency word scores, descending.
/// Duplicate phrases are ranked once.
fn ranked_phrases(phrases: &[Vec<String>]) -> Vec<(f64, String)> {
    let mut frequency: HashMap<&str, f64> = HashMap::new();
    let mut degree: HashMap<&str, f64> = HashMap::new();
    for phrase in phrases {
        for word in phrase {
            *frequency.entry(word).or_insert(0.0) += 1.0;
            *degree.entry(word).or_insert(0.0) += phrase.len() as f64;
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut ranked: Vec<(f64, String)> = Vec::new();
    for phrase in phrases {
        let joined = phrase.join(" ");
        if !seen.insert(joined.clone()) {
            continue;
        }
        let score: f64 = phrase
            .iter()
            .map(|w| degree[w.as_str()] / frequency[w.as_str()])
            .sum();
        ranked.push((score, joined));
    }

    ranked.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    ranked
}

/// Extract a category name from the concatenated cluster text.
/// Returns None when no phrase survives cleaning.
pub fn rake_name(text: &str) -> Option<String> {
    let phrases = candidate_phrases(text);
    let ranked = ranked_phrases(&phrases);
    if ranked.is_empty() {
        return None;
    }

    // Prefer a cleaned candidate of a reasonable width
    let mut candidates: Vec<(f64, String)> = Vec::new();
    for (score, phrase) in &ranked {
        let cleaned = clean_final_name(phrase);
        let width = cleaned.split(' ').filter(|w| !w.is_empty()).count();
        if (NAME_WORDS_MIN..=NAME_WORDS_MAX).contains(&width) {
            candidates.push((*score, cleaned));
        }
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }
    }
    if !candidates.is_empty() {
        candidates.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.1.split(' ')
                        .count()
                        .cmp(&a.1.split(' ').count())
                })
        });
        return Some(candidates.remove(0).1);
    }

    // Last resort: clean the single top phrase, truncated to NAME_WORDS_MAX
    let top = &ranked[0].1;
    let truncated: Vec<&str> = top.split(' ').take(NAME_WORDS_MAX).collect();
    let cleaned = clean_final_name(&truncated.join(" "));
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
