use crate::analysis::{
    ExplanationSummary, Feature, GenerationSummary, RatingsSummary, StructuralSummary,
    SurpriseSummary, PREDICTED_RANKING,
};
use crate::model::{Category, ExplanationRecord};
use crate::stats::Summary;
use std::fmt::Write;

const RULE: &str = "----------------------------------------------------------------------";
const BANNER: &str = "======================================================================";

pub fn pct(x: f64) -> String {
    format!("{:.1}%", 100.0 * x)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{:^70}\n{}", title, RULE);
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}\n{:^70}\n{}", BANNER, title, BANNER);
}

fn summary_line(s: &Summary) -> String {
    format!("M={:.3} SD={:.3} min={:.3} max={:.3} n={}", s.mean, s.std, s.min, s.max, s.n)
}

fn summary_rows<K: std::fmt::Display>(out: &mut String, rows: &[(K, Summary)]) {
    let _ = writeln!(out, "  {:<14} {:>8} {:>8} {:>6}", "", "mean", "std", "n");
    for (k, s) in rows {
        let _ = writeln!(out, "  {:<14} {:>8.3} {:>8.3} {:>6}", k.to_string(), s.mean, s.std, s.n);
    }
}

pub fn render_generation(s: &GenerationSummary) -> String {
    let mut out = String::new();
    banner(&mut out, "GENERATION SUMMARY");
    section(&mut out, "GENERATION STATISTICS");
    let total = s.attempts.max(1) as f64;
    let _ = writeln!(out, "  Total attempts: {}", s.attempts);
    let _ = writeln!(out, "  Successful: {} ({})", s.successes, pct(s.successes as f64 / total));
    let _ = writeln!(out, "  Failed: {} ({})", s.failures, pct(s.failures as f64 / total));
    let _ = writeln!(out, "  Parsed: {}  Parse failures: {}", s.parsed, s.parse_failures);

    for (title, rows) in [
        (
            "SUCCESS RATE BY MODEL",
            s.by_model
                .iter()
                .map(|(k, c)| (k.clone(), *c))
                .collect::<Vec<_>>(),
        ),
        (
            "SUCCESS RATE BY CATEGORY",
            s.by_category
                .iter()
                .map(|(k, c)| (k.to_string(), *c))
                .collect(),
        ),
        (
            "SUCCESS RATE BY TEMPERATURE",
            s.by_temperature
                .iter()
                .map(|(k, c)| (k.to_string(), *c))
                .collect(),
        ),
    ] {
        section(&mut out, title);
        for (k, c) in rows {
            let _ = writeln!(out, "  {}: {}/{} ({})", k, c.success, c.total, pct(c.rate()));
        }
    }

    if let Some(w) = &s.words {
        section(&mut out, "STRUCTURAL METRICS");
        let _ = writeln!(out, "  Average joke length: {:.1} words", w.mean);
        let _ = writeln!(out, "  Shortest: {} words", w.min);
        let _ = writeln!(out, "  Longest: {} words", w.max);
    }

    section(&mut out, "API USAGE");
    let _ = writeln!(out, "  Total tokens (where tracked): {}", s.total_tokens);
    if let Some(t) = s.mean_tokens {
        let _ = writeln!(out, "  Average per call: {:.0}", t);
    }
    if let Some(l) = s.mean_latency_ms {
        let _ = writeln!(out, "  Mean latency: {:.0} ms", l);
    }

    if !s.errors.is_empty() {
        section(&mut out, "ERRORS (first 5)");
        for e in &s.errors {
            let _ = writeln!(out, "  {}", e);
        }
    }

    if !s.examples.is_empty() {
        section(&mut out, "SAMPLE GENERATED JOKES");
        for (cat, text) in &s.examples {
            let short: String = text.chars().take(200).collect();
            let _ = writeln!(out, "\n  {}:\n  {}", cat.as_str().to_uppercase(), short);
        }
    }
    out
}

pub fn render_structure(s: &StructuralSummary) -> String {
    let mut out = String::new();
    banner(&mut out, "STRUCTURAL VALIDITY ANALYSIS");
    section(&mut out, "OVERALL STRUCTURAL QUALITY");
    let n = s.n.max(1) as f64;
    let _ = writeln!(out, "  Analyzed jokes: {}", s.n);
    let _ = writeln!(out, "  Valid structure (setup + punchline): {}/{} ({})", s.valid, s.n, pct(s.valid as f64 / n));
    let _ = writeln!(out, "  Within target length: {}/{} ({})", s.within_length, s.n, pct(s.within_length as f64 / n));
    if let Some(w) = &s.total_words {
        let _ = writeln!(out, "  Average total words: {:.1} (SD={:.1})", w.mean, w.std);
    }
    let _ = writeln!(out, "  Question format: {}/{} ({})", s.questions, s.n, pct(s.questions as f64 / n));

    for (title, groups, with_q) in [
        ("STRUCTURAL QUALITY BY MODEL", &s.by_model, false),
        ("STRUCTURAL QUALITY BY CATEGORY", &s.by_category, true),
    ] {
        section(&mut out, title);
        let _ = write!(out, "  {:<14} {:>6} {:>8} {:>8} {:>8}", "", "n", "valid", "length", "words");
        let _ = writeln!(out, "{}", if with_q { format!(" {:>8}", "question") } else { String::new() });
        for g in groups {
            let _ = write!(
                out,
                "  {:<14} {:>6} {:>8.3} {:>8.3} {:>8.1}",
                g.key, g.n, g.structure_valid, g.within_target_length, g.mean_total_words
            );
            let _ = writeln!(out, "{}", if with_q { format!(" {:>8.3}", g.has_question) } else { String::new() });
        }
    }
    out
}

pub fn render_surprise(s: &SurpriseSummary) -> String {
    let mut out = String::new();
    banner(&mut out, "SURPRISE ANALYSIS RESULTS");
    let _ = writeln!(out, "\nSuccessful analyses: {}/{}", s.successes, s.n);
    if let Some(sc) = &s.surprise {
        section(&mut out, "OVERALL SURPRISE STATISTICS");
        let _ = writeln!(out, "  Mean surprise score: {:.3}", sc.mean);
        let _ = writeln!(out, "  Std deviation: {:.3}", sc.std);
        let _ = writeln!(out, "  Range: {:.3} - {:.3}", sc.min, sc.max);
        if let Some(o) = s.mean_punchline_setup_overlap {
            let _ = writeln!(out, "\n  Mean punchline-setup overlap: {:.3}", o);
            let _ = writeln!(out, "  (Lower = more novel punchline)");
        }
        section(&mut out, "SURPRISE BY CATEGORY");
        summary_rows(&mut out, &s.by_category);
        section(&mut out, "SURPRISE BY MODEL");
        summary_rows(&mut out, &s.by_model);
    }
    out
}

pub fn render_explanations(s: &ExplanationSummary) -> String {
    let mut out = String::new();
    banner(&mut out, "EXPLANATION FEATURE ANALYSIS");
    let _ = writeln!(out, "\nCoded explanations: {}", s.n);
    section(&mut out, "PROPORTION OF EXPLANATIONS CITING EACH FEATURE TYPE");
    for r in &s.by_category {
        let _ = writeln!(out, "\n{} JOKES (n={}):", r.key.to_uppercase(), r.n);
        for (i, f) in Feature::ALL.iter().enumerate() {
            let _ = writeln!(out, "  {:<9} features: {:>7}  mean keywords: {:.2}", f.as_str(), pct(r.cited[i]), r.mean_counts[i]);
        }
    }

    section(&mut out, "FEATURE CITATIONS BY EXPLAINING MODEL");
    let _ = writeln!(out, "  {:<14} {:>9} {:>9} {:>9} {:>9}", "", "semantic", "embodied", "social", "threat");
    for r in &s.by_model {
        let _ = writeln!(
            out,
            "  {:<14} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
            r.key, r.cited[0], r.cited[1], r.cited[2], r.cited[3]
        );
    }

    section(&mut out, "CRITICAL H3 COMPARISONS");
    if let (Some(rate), Some(supports)) = (s.physical_embodied_rate, s.physical_supports_h3()) {
        let _ = writeln!(out, "\nPhysical jokes citing embodied features: {}", pct(rate));
        let _ = writeln!(
            out,
            "  -> {}",
            if supports {
                "SUPPORTS H3: models fail to cite embodied features"
            } else {
                "does not support H3: models cite embodied features"
            }
        );
    }
    if let (Some(rate), Some(supports)) = (s.linguistic_semantic_rate, s.linguistic_supports_h3()) {
        let _ = writeln!(out, "\nLinguistic jokes citing semantic features: {}", pct(rate));
        let _ = writeln!(
            out,
            "  -> {}",
            if supports {
                "SUPPORTS H3: models explain linguistic humor"
            } else {
                "does not support H3: models struggle with semantic features"
            }
        );
    }
    out
}

pub fn render_ratings(s: &RatingsSummary) -> String {
    let mut out = String::new();
    banner(&mut out, "PILOT RATINGS ANALYSIS");
    let _ = writeln!(out, "\n  Total rated jokes: {}", s.rated);
    if s.rated == 0 {
        return out;
    }

    section(&mut out, "OVERALL MEANS (SD)");
    for (name, sum) in [
        ("Funniness", &s.funniness),
        ("Category fit", &s.category_fit),
        ("Structural coherence", &s.structural_coherence),
        ("Originality", &s.originality),
    ] {
        if let Some(v) = sum {
            let _ = writeln!(out, "  {}: M={:.2}, SD={:.2}", name, v.mean, v.std);
        }
    }

    section(&mut out, "OPTIMAL TEMPERATURE");
    summary_rows(&mut out, &s.by_temperature);
    if let Some(t) = s.best_temperature {
        let _ = writeln!(out, "\n  -> Best temperature for funniness: {}", t);
    }

    section(&mut out, "CATEGORY ORDERING (H3)");
    summary_rows(&mut out, &s.category_ranking);
    let observed: Vec<&str> = s.category_ranking.iter().map(|(c, _)| c.as_str()).collect();
    let predicted: Vec<&str> = PREDICTED_RANKING.iter().map(Category::as_str).collect();
    let _ = writeln!(out, "\n  Observed ranking: {}", observed.join(" > "));
    let _ = writeln!(out, "  Predicted ranking: {}", predicted.join(" > "));
    let _ = writeln!(
        out,
        "  {}",
        if s.ranking_matches_prediction {
            "OK H3 supported: observed matches predicted"
        } else {
            "X H3 not supported: order differs from prediction"
        }
    );

    section(&mut out, "MODEL DIFFERENCES");
    summary_rows(&mut out, &s.by_model);

    section(&mut out, "ORIGINALITY CHECK");
    if let (Some(o), Some(verdict)) = (&s.originality, s.originality_verdict()) {
        let _ = writeln!(out, "  Mean originality: {:.2}/7 ({})", o.mean, verdict);
    }
    for (id, cat, t, text) in &s.low_originality {
        let short: String = text.chars().take(60).collect();
        let _ = writeln!(out, "    - {} ({}, temp={}): '{}...'", id, cat, t, short);
    }

    section(&mut out, "STRUCTURAL PREDICTORS");
    let r = |x: Option<f64>| x.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v));
    let _ = writeln!(out, "  Coherence x Funniness: r={}", r(s.coherence_funniness_r));
    let _ = writeln!(out, "  Word count x Funniness: r={}", r(s.words_funniness_r));
    out
}

/// Up to `per_category` successful explanations per category, first-come.
pub fn render_inspection(records: &[ExplanationRecord], per_category: usize) -> String {
    let mut out = String::new();
    banner(&mut out, "EXPLANATION INSPECTION");
    for cat in Category::ALL {
        let samples: Vec<&ExplanationRecord> = records
            .iter()
            .filter(|r| r.joke_category == cat && r.success)
            .take(per_category)
            .collect();
        if samples.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{}\n {} JOKES\n{}", BANNER, cat.as_str().to_uppercase(), BANNER);
        for (i, r) in samples.iter().enumerate() {
            let _ = writeln!(out, "\n{}\nSAMPLE {}\n{}", RULE, i + 1, RULE);
            let _ = writeln!(out, "Joke ID: {}", r.joke_id);
            let _ = writeln!(out, "Explaining model: {}", r.explaining_model);
            let _ = writeln!(out, "\nEXPLANATION:\n{}", r.explanation.as_deref().unwrap_or(""));
            if let Some(c) = &r.codes {
                let _ = writeln!(
                    out,
                    "\nCodes: semantic={} embodied={} social={} threat={}",
                    c.semantic_count, c.embodied_count, c.social_count, c.threat_count
                );
            }
        }
    }
    out
}

pub fn print(text: &str) {
    eprint!("{}", text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{summarize_structure, summarize_surprise};
    use crate::model::{StructuralRecord, SurpriseRecord};

    #[test]
    fn structure_report_lists_groups() {
        let rec = StructuralRecord {
            id: "a".into(),
            model: "gpt4o".into(),
            category: Category::Social,
            temperature: 0.7,
            has_setup: true,
            has_punchline: true,
            structure_valid: true,
            setup_words: 10,
            punchline_words: 6,
            total_words: 16,
            within_target_length: true,
            setup_punchline_ratio: Some(10.0 / 6.0),
            has_question: false,
            has_exclamation: false,
            has_period: true,
            explicit_format_markers: true,
            sentence_count: 2,
        };
        let text = render_structure(&summarize_structure(&[rec]));
        assert!(text.contains("Valid structure (setup + punchline): 1/1 (100.0%)"));
        assert!(text.contains("gpt4o"));
        assert!(text.contains("social"));
    }

    #[test]
    fn surprise_report_without_successes_is_short() {
        let rec = SurpriseRecord {
            id: "a".into(),
            model: "m".into(),
            category: Category::Dark,
            temperature: 0.5,
            setup: "s".into(),
            punchline: "p".into(),
            predicted_punchline: None,
            punchline_overlap_with_setup: None,
            prediction_accuracy: None,
            surprise_score: None,
            success: false,
            error: Some("boom".into()),
        };
        let text = render_surprise(&summarize_surprise(&[rec]));
        assert!(text.contains("Successful analyses: 0/1"));
        assert!(!text.contains("SURPRISE BY CATEGORY"));
    }
}
