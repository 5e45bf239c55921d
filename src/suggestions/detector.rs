//! Suggestion trigger detection
//!
//! The system prompt instructs the model to include a fixed phrase
//! when it is suggesting recipes. The detector watches assistant
//! replies for that phrase and pulls the mentioned dietary words out
//! of the reply so the lookup can match them against recipe tags.

use regex::Regex;

/// Phrase an assistant reply must contain to trigger recipe cards
///
/// Matched as a case-sensitive substring; the system prompt asks the
/// model for this exact wording.
pub const TRIGGER_PHRASE: &str = "Here are some recipe suggestions";

/// Recognized dietary vocabulary, matched case-insensitively anywhere
/// in the reply
const DIETARY_PATTERN: &str =
    r"(?i)(?:vegetarian|vegan|gluten-free|dairy-free|keto|paleo|low-carb|high-protein)";

/// Scans assistant replies for the suggestion trigger and dietary tags
#[derive(Debug)]
pub struct TriggerDetector {
    dietary: Regex,
}

impl TriggerDetector {
    pub fn new() -> Self {
        Self {
            dietary: Regex::new(DIETARY_PATTERN).expect("Invalid regex pattern"),
        }
    }

    /// Whether this reply announces recipe suggestions
    pub fn is_triggered(&self, reply: &str) -> bool {
        reply.contains(TRIGGER_PHRASE)
    }

    /// Canonical dietary tags mentioned in the reply
    ///
    /// Tags come back in first-mention order without duplicates, in
    /// the canonical casing recipes use ("gluten-free" becomes
    /// "Gluten-Free"), so they compare directly against stored recipe
    /// tags.
    pub fn dietary_tags(&self, reply: &str) -> Vec<String> {
        let mut tags = Vec::new();
        for found in self.dietary.find_iter(reply) {
            let tag = canonicalize_tag(found.as_str());
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Tags for a triggered reply, or None when the trigger is absent
    ///
    /// A triggered reply with no dietary words yields `Some` of an
    /// empty list, which the lookup turns into the featured fallback.
    pub fn detect(&self, reply: &str) -> Option<Vec<String>> {
        self.is_triggered(reply).then(|| self.dietary_tags(reply))
    }
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Capitalize each hyphen-separated segment of a dietary word
///
/// This is the casing recipes store their tags in, so any user-facing
/// tag input should pass through here before comparing.
pub fn canonicalize_tag(raw: &str) -> String {
    raw.split('-')
        .map(canonicalize_segment)
        .collect::<Vec<_>>()
        .join("-")
}

fn canonicalize_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_phrase_is_detected_anywhere_in_reply() {
        let detector = TriggerDetector::new();

        assert!(detector.is_triggered("Here are some recipe suggestions for you:"));
        assert!(detector.is_triggered(
            "Happy to help! Here are some recipe suggestions based on what you have."
        ));
        assert!(!detector.is_triggered("I can help you plan meals."));
    }

    #[test]
    fn test_trigger_phrase_is_case_sensitive() {
        let detector = TriggerDetector::new();

        assert!(!detector.is_triggered("here are some recipe suggestions"));
        assert!(!detector.is_triggered("HERE ARE SOME RECIPE SUGGESTIONS"));
    }

    #[test]
    fn test_dietary_tags_are_canonicalized() {
        let detector = TriggerDetector::new();

        let tags = detector
            .dietary_tags("Here are some recipe suggestions for vegetarian and GLUTEN-FREE meals");
        assert_eq!(tags, vec!["Vegetarian".to_string(), "Gluten-Free".to_string()]);

        assert_eq!(
            detector.dietary_tags("dairy-FREE and high-protein and PALEO"),
            vec![
                "Dairy-Free".to_string(),
                "High-Protein".to_string(),
                "Paleo".to_string()
            ]
        );
    }

    #[test]
    fn test_tags_keep_first_mention_order_without_duplicates() {
        let detector = TriggerDetector::new();

        let tags = detector.dietary_tags("keto first, then vegan, then keto again, then Keto");
        assert_eq!(tags, vec!["Keto".to_string(), "Vegan".to_string()]);
    }

    #[test]
    fn test_full_vocabulary_is_recognized() {
        let detector = TriggerDetector::new();

        let reply = "vegetarian vegan gluten-free dairy-free keto paleo low-carb high-protein";
        assert_eq!(
            detector.dietary_tags(reply),
            vec![
                "Vegetarian".to_string(),
                "Vegan".to_string(),
                "Gluten-Free".to_string(),
                "Dairy-Free".to_string(),
                "Keto".to_string(),
                "Paleo".to_string(),
                "Low-Carb".to_string(),
                "High-Protein".to_string(),
            ]
        );
    }

    #[test]
    fn test_words_match_inside_larger_words() {
        let detector = TriggerDetector::new();

        // The vocabulary matches as plain substrings.
        assert_eq!(
            detector.dietary_tags("A note on veganism"),
            vec!["Vegan".to_string()]
        );
    }

    #[test]
    fn test_detect_requires_the_trigger() {
        let detector = TriggerDetector::new();

        assert_eq!(detector.detect("I love vegan food"), None);

        let detected = detector.detect("Here are some recipe suggestions for vegan dinners");
        assert_eq!(detected, Some(vec!["Vegan".to_string()]));

        let detected =
            detector.detect("Here are some recipe suggestions for vegan and Gluten-Free meals");
        assert_eq!(
            detected,
            Some(vec!["Vegan".to_string(), "Gluten-Free".to_string()])
        );

        // Triggered with no dietary words: an empty tag list.
        let detected = detector.detect("Here are some recipe suggestions you might enjoy");
        assert_eq!(detected, Some(Vec::new()));
    }
}
