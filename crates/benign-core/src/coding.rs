//! Feature coding of collected explanations.

use crate::model::{CodedExplanation, ExplanationRecord, FeatureCodes};

/// Maps an explanation text to its feature codes.
pub trait ExplanationCoder: Send + Sync {
    fn code(&self, text: &str) -> FeatureCodes;
}

/// Codes every successful explanation; failed records attach nothing.
pub fn code_records(
    records: &mut [ExplanationRecord],
    coder: &dyn ExplanationCoder,
) -> Vec<CodedExplanation> {
    let mut rows = Vec::new();
    for rec in records.iter_mut() {
        let Some(text) = rec.explanation.as_deref().filter(|_| rec.success) else {
            continue;
        };
        let codes = coder.code(text);
        rec.codes = Some(codes);
        rows.push(CodedExplanation::new(rec, codes));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    struct LengthCoder;

    impl ExplanationCoder for LengthCoder {
        fn code(&self, text: &str) -> FeatureCodes {
            FeatureCodes {
                has_semantic: !text.is_empty(),
                semantic_count: text.len() as u32,
                ..Default::default()
            }
        }
    }

    fn rec(id: &str, explanation: Option<&str>) -> ExplanationRecord {
        ExplanationRecord {
            joke_id: id.into(),
            explaining_model: "m".into(),
            explanation: explanation.map(str::to_string),
            success: explanation.is_some(),
            error: explanation.is_none().then(|| "timeout".to_string()),
            tokens: None,
            latency_ms: None,
            joke_category: Category::Dark,
            joke_generator_model: "g".into(),
            joke_temperature: 0.7,
            timestamp: String::new(),
            codes: None,
        }
    }

    #[test]
    fn failed_explanations_are_not_coded() {
        let mut records = vec![rec("a", Some("pun")), rec("b", None)];
        let rows = code_records(&mut records, &LengthCoder);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].joke_id, "a");
        assert_eq!(rows[0].semantic_count, 3);
        assert!(records[0].codes.is_some());
        assert!(records[1].codes.is_none());
    }
}
