use benign_core::coding::ExplanationCoder;
use benign_core::model::FeatureCodes;

/// Keyword lists per feature type. Matching is case-insensitive substring
/// search, so `expect` also hits `unexpected`.
pub const SEMANTIC: &[&str] = &[
    "ambiguous",
    "ambiguity",
    "double meaning",
    "wordplay",
    "pun",
    "multiple meanings",
    "semantic",
    "reinterpret",
    "frame",
    "shift",
    "incongruity",
    "incongruous",
    "unexpected",
    "twist",
    "surprise",
];

pub const EMBODIED: &[&str] = &[
    "physical",
    "pain",
    "hurt",
    "collision",
    "impact",
    "body",
    "bodily",
    "injury",
    "clumsy",
    "fall",
    "bump",
    "hit",
    "sensory",
    "tactile",
    "kinesthetic",
    "motor",
];

pub const SOCIAL: &[&str] = &[
    "social",
    "norm",
    "awkward",
    "embarrass",
    "inappropriate",
    "expect",
    "convention",
    "etiquette",
    "perspective",
    "understand",
    "recognize",
    "aware",
    "context",
    "situation",
];

pub const THREAT: &[&str] = &[
    "threat",
    "danger",
    "risk",
    "harm",
    "safe",
    "benign",
    "mortality",
    "death",
    "die",
    "kill",
    "taboo",
    "dark",
];

/// Provisional classifier: counts how many keywords of each list occur at
/// least once.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordCoder;

fn hits(text: &str, keywords: &[&str]) -> u32 {
    keywords.iter().filter(|kw| text.contains(*kw)).count() as u32
}

impl ExplanationCoder for KeywordCoder {
    fn code(&self, text: &str) -> FeatureCodes {
        let text = text.to_lowercase();
        let semantic_count = hits(&text, SEMANTIC);
        let embodied_count = hits(&text, EMBODIED);
        let social_count = hits(&text, SOCIAL);
        let threat_count = hits(&text, THREAT);
        FeatureCodes {
            has_semantic: semantic_count > 0,
            has_embodied: embodied_count > 0,
            has_social: social_count > 0,
            has_threat: threat_count > 0,
            semantic_count,
            embodied_count,
            social_count,
            threat_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_features() {
        assert_eq!(KeywordCoder.code(""), FeatureCodes::default());
    }

    #[test]
    fn counts_distinct_keywords_case_insensitively() {
        let c = KeywordCoder.code("A PUN with a Double Meaning. The pun is a pun.");
        assert!(c.has_semantic);
        assert_eq!(c.semantic_count, 2);
        assert!(!c.has_embodied);
        assert!(!c.has_threat);
    }

    #[test]
    fn substring_matching_overlaps_lists() {
        let c = KeywordCoder.code("An unexpected fall, but harmless and safe.");
        // "unexpected" is semantic and also contains "expect"
        assert_eq!(c.semantic_count, 1);
        assert_eq!(c.social_count, 1);
        assert_eq!(c.embodied_count, 1);
        // "harm" and "safe"
        assert_eq!(c.threat_count, 2);
    }
}
