use benign_core::config::LengthBounds;
use benign_core::model::{JokeRecord, StructuralRecord};
use benign_core::parse::count_words;
use regex::Regex;
use std::sync::OnceLock;

fn sentence_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[.!?]+").unwrap_or_else(|e| panic!("invalid sentence regex: {e}"))
    })
}

/// Objective structural properties of one joke. Pure: the same record and
/// bounds always give the same output.
pub fn analyze(joke: &JokeRecord, bounds: LengthBounds) -> StructuralRecord {
    let setup = joke.setup.as_str();
    let punchline = joke.punchline.as_str();
    let full_text = joke.full_text.as_str();

    let has_setup = !setup.trim().is_empty();
    let has_punchline = !punchline.trim().is_empty();
    let setup_words = count_words(setup);
    let punchline_words = count_words(punchline);
    let total_words = setup_words + punchline_words;

    let lower = full_text.to_lowercase();
    let explicit_format_markers = lower.contains("setup:") && lower.contains("punchline:");

    let sentence_count = sentence_split_re()
        .split(full_text)
        .filter(|s| !s.trim().is_empty())
        .count();

    StructuralRecord {
        id: joke.id.clone(),
        model: joke.model.clone(),
        category: joke.category,
        temperature: joke.temperature,
        has_setup,
        has_punchline,
        structure_valid: has_setup && has_punchline,
        setup_words,
        punchline_words,
        total_words,
        within_target_length: bounds.contains(total_words),
        setup_punchline_ratio: (punchline_words > 0)
            .then(|| setup_words as f64 / punchline_words as f64),
        has_question: setup.contains('?'),
        has_exclamation: punchline.contains('!'),
        has_period: punchline.contains('.'),
        explicit_format_markers,
        sentence_count,
    }
}

/// Parsed jokes only; parse failures stay in the raw dataset.
pub fn analyze_all(jokes: &[JokeRecord], bounds: LengthBounds) -> Vec<StructuralRecord> {
    let skipped = jokes.iter().filter(|j| !j.is_parsed()).count();
    if skipped > 0 {
        tracing::info!(event = "structure.skipped", count = skipped, "jokes without a parsed setup/punchline");
    }
    jokes
        .iter()
        .filter(|j| j.is_parsed())
        .map(|j| analyze(j, bounds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use benign_core::model::{joke_id, ApiInfo, Category, JokeStatus};

    fn joke(setup: &str, punchline: &str, full_text: &str) -> JokeRecord {
        JokeRecord {
            id: joke_id("m", Category::Linguistic, 0.5, 0),
            timestamp: String::new(),
            model: "m".into(),
            model_name: "m".into(),
            category: Category::Linguistic,
            temperature: 0.5,
            prompt_index: 0,
            prompt: String::new(),
            raw_response: Some(full_text.into()),
            setup: setup.into(),
            punchline: punchline.into(),
            full_text: full_text.into(),
            word_counts: None,
            status: JokeStatus::Parsed,
            parse_error: None,
            api: ApiInfo::default(),
            manual_ratings: None,
        }
    }

    #[test]
    fn chicken_joke() {
        let j = joke(
            "Why did the chicken cross the road?",
            "To get to the other side.",
            "Setup: Why did the chicken cross the road? Punchline: To get to the other side.",
        );
        let r = analyze(&j, LengthBounds::default());
        assert!(r.structure_valid);
        assert_eq!((r.setup_words, r.punchline_words, r.total_words), (7, 6, 13));
        assert!(!r.within_target_length);
        assert!(r.has_question);
        assert!(r.has_period);
        assert!(!r.has_exclamation);
        assert!(r.explicit_format_markers);
        assert_eq!(r.sentence_count, 2);
        let ratio = r.setup_punchline_ratio.unwrap();
        assert!((ratio - 7.0 / 6.0).abs() < 1e-9);

        let wide = LengthBounds { min: 13, max: 13 };
        assert!(analyze(&j, wide).within_target_length);
    }

    #[test]
    fn missing_fields_count_as_empty() {
        let r = analyze(&joke("", "", ""), LengthBounds::default());
        assert!(!r.has_setup && !r.has_punchline && !r.structure_valid);
        assert_eq!(r.total_words, 0);
        assert_eq!(r.setup_punchline_ratio, None);
        assert_eq!(r.sentence_count, 0);
        assert!(!r.explicit_format_markers);
    }

    #[test]
    fn analysis_is_idempotent() {
        let mut failed = joke("", "", "");
        failed.status = JokeStatus::ParseFailed;
        let jokes = vec![
            joke("Knock knock?", "Nobody!", "Knock knock? Nobody!"),
            failed,
        ];
        let a = analyze_all(&jokes, LengthBounds::default());
        let b = analyze_all(&jokes, LengthBounds::default());
        assert_eq!(a.len(), 1);
        assert_eq!(a, b);
    }
}
