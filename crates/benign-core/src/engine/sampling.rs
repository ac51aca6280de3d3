use crate::model::{Category, JokeRecord};

/// Per-category quota for a total sample size.
pub fn per_category(sample_size: usize) -> usize {
    sample_size / Category::ALL.len()
}

/// Parsed jokes, grouped in category order, first-come within each
/// category. `None` takes every parsed joke.
pub fn sample_parsed(jokes: &[JokeRecord], sample_size: Option<usize>) -> Vec<&JokeRecord> {
    let parsed = jokes.iter().filter(|j| j.is_parsed());
    let Some(n) = sample_size else {
        return parsed.collect();
    };

    let quota = per_category(n);
    let parsed: Vec<&JokeRecord> = parsed.collect();
    Category::ALL
        .iter()
        .flat_map(|cat| {
            parsed
                .iter()
                .copied()
                .filter(move |j| j.category == *cat)
                .take(quota)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{joke_id, ApiInfo, JokeStatus};

    fn joke(cat: Category, i: usize, parsed: bool) -> JokeRecord {
        JokeRecord {
            id: joke_id("m", cat, 0.7, i),
            timestamp: String::new(),
            model: "m".into(),
            model_name: "m".into(),
            category: cat,
            temperature: 0.7,
            prompt_index: i,
            prompt: String::new(),
            raw_response: Some("x".into()),
            setup: if parsed { "s".into() } else { String::new() },
            punchline: if parsed { "p".into() } else { String::new() },
            full_text: "x".into(),
            word_counts: None,
            status: if parsed {
                JokeStatus::Parsed
            } else {
                JokeStatus::ParseFailed
            },
            parse_error: None,
            api: ApiInfo::default(),
            manual_ratings: None,
        }
    }

    #[test]
    fn even_sampling_in_category_order() {
        let jokes = vec![
            joke(Category::Dark, 0, true),
            joke(Category::Linguistic, 0, false),
            joke(Category::Linguistic, 1, true),
            joke(Category::Linguistic, 2, true),
            joke(Category::Linguistic, 3, true),
            joke(Category::Physical, 0, true),
        ];
        let got: Vec<&str> = sample_parsed(&jokes, Some(8))
            .iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(
            got,
            vec![
                "m_linguistic_t0.7_1",
                "m_linguistic_t0.7_2",
                "m_physical_t0.7_0",
                "m_dark_t0.7_0"
            ]
        );
        assert_eq!(sample_parsed(&jokes, None).len(), 5);
        assert!(sample_parsed(&jokes, Some(3)).is_empty());
    }
}
