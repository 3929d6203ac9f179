//! Language segregation for raw remarks.
//!
//! Remarks that are too short or contain no letters defeat statistical
//! language detection, so they bypass the detector entirely and route to
//! the other-language bucket, as do detector failures. Detection itself is
//! deterministic (lingua), so identical input always routes identically.

use lingua::LanguageDetectorBuilder;

use crate::error::PipelineError;
use crate::preprocess::clean_text;

/// Maps text to an ISO 639-1 language tag (lower-case, e.g. "en").
pub trait DetectLanguage {
    fn detect(&self, text: &str) -> Result<String, PipelineError>;
}

/// lingua-backed detector over all supported languages.
pub struct LinguaDetector {
    detector: lingua::LanguageDetector,
}

impl LinguaDetector {
    pub fn new() -> Self {
        let detector = LanguageDetectorBuilder::from_all_languages().build();
        Self { detector }
    }
}

impl Default for LinguaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectLanguage for LinguaDetector {
    fn detect(&self, text: &str) -> Result<String, PipelineError> {
        match self.detector.detect_language_of(text) {
            Some(language) => Ok(language.iso_code_639_1().to_string().to_lowercase()),
            None => Err(PipelineError::Detection(
                "no language could be identified".to_string(),
            )),
        }
    }
}

/// Partition remarks into primary-language and other, preserving original
/// indices and input order within each partition.
pub fn segregate_by_language(
    remarks: &[String],
    detector: &dyn DetectLanguage,
    primary_language: &str,
    min_detect_chars: usize,
) -> (Vec<(usize, String)>, Vec<(usize, String)>) {
    println!(
        "[Language] Starting segregation for {} remarks",
        remarks.len()
    );

    let mut primary: Vec<(usize, String)> = Vec::new();
    let mut other: Vec<(usize, String)> = Vec::new();

    for (index, remark) in remarks.iter().enumerate() {
        let normalized = clean_text(&remark.to_lowercase());

        // Too short or letterless: detection would be a coin flip
        if normalized.chars().count() < min_detect_chars
            || !normalized.chars().any(|c| c.is_alphabetic())
        {
            other.push((index, remark.clone()));
            continue;
        }

        match detector.detect(&normalized) {
            Ok(tag) if tag == primary_language => primary.push((index, remark.clone())),
            Ok(_) => other.push((index, remark.clone())),
            Err(_) => other.push((index, remark.clone())),
        }
    }

    println!(
        "[Language] Segregation complete. Primary: {}, Other: {}",
        primary.len(),
        other.len()
    );
    (primary, other)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flags text containing "bonjour" as French, everything else English.
    struct FakeDetector;

    impl DetectLanguage for FakeDetector {
        fn detect(&self, text: &str) -> Result<String, PipelineError> {
            if text.contains("panic") {
                return Err(PipelineError::Detection("degenerate input".to_string()));
            }
            if text.contains("bonjour") {
                Ok("fr".to_string())
            } else {
                Ok("en".to_string())
            }
        }
    }

    fn remarks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_remark_short_circuits() {
        let input = remarks(&["ok", "the power supply failed again today"]);
        let (primary, other) = segregate_by_language(&input, &FakeDetector, "en", 10);
        assert_eq!(other, vec![(0, "ok".to_string())]);
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].0, 1);
    }

    #[test]
    fn test_non_alphabetic_remark_short_circuits() {
        let input = remarks(&["1234567890 ###", "street light is not working"]);
        let (primary, other) = segregate_by_language(&input, &FakeDetector, "en", 10);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].0, 0);
        assert_eq!(primary.len(), 1);
    }

    #[test]
    fn test_foreign_remark_routes_to_other() {
        let input = remarks(&["bonjour le monde entier", "power cut in sector nine"]);
        let (primary, other) = segregate_by_language(&input, &FakeDetector, "en", 10);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].0, 0);
        assert_eq!(primary[0].0, 1);
    }

    #[test]
    fn test_detector_error_routes_to_other() {
        let input = remarks(&["panic inducing gibberish text", "normal english remark here"]);
        let (primary, other) = segregate_by_language(&input, &FakeDetector, "en", 10);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].0, 0);
        assert_eq!(primary.len(), 1);
    }

    #[test]
    fn test_original_indices_preserved() {
        let input = remarks(&["ok", "power supply failure reported", "no", "meter not working now"]);
        let (primary, other) = segregate_by_language(&input, &FakeDetector, "en", 10);
        let primary_indices: Vec<usize> = primary.iter().map(|(i, _)| *i).collect();
        let other_indices: Vec<usize> = other.iter().map(|(i, _)| *i).collect();
        assert_eq!(primary_indices, vec![1, 3]);
        assert_eq!(other_indices, vec![0, 2]);
    }

    #[test]
    fn test_empty_input() {
        let (primary, other) = segregate_by_language(&[], &FakeDetector, "en", 10);
        assert!(primary.is_empty());
        assert!(other.is_empty());
    }
}
