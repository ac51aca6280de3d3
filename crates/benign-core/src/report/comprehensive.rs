use crate::analysis::ComprehensiveReport;
use crate::report::console::pct;
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "comprehensive_report.txt";

pub fn render(r: &ComprehensiveReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "BENIGN VIOLATIONS: COMPREHENSIVE ANALYSIS REPORT");
    let _ = writeln!(out, "{}", "=".repeat(70));
    let _ = writeln!(out, "\nHybrid hypothesis prediction: linguistic > social > physical > dark\n");

    let _ = writeln!(
        out,
        "{:<12} {:>20} {:>15} {:>24}",
        "Category", "Structural Validity", "Surprise Score", "Feature Citation"
    );
    for e in &r.evidence {
        let validity = e.structural_validity.map(pct).unwrap_or_else(|| "-".into());
        let surprise = e
            .surprise_score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".into());
        let citation = e
            .feature_citation
            .map(|c| format!("{} {}", pct(c), e.feature.as_str()))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<12} {:>20} {:>15} {:>24}",
            e.category.as_str(),
            validity,
            surprise,
            citation
        );
    }

    let _ = writeln!(out, "\nINTERPRETATION\n{}", "-".repeat(70));
    if let (Some(l), Some(p)) = (r.linguistic_semantic, r.physical_embodied) {
        let _ = writeln!(out, "  Linguistic jokes: {} cite semantic features", pct(l));
        let _ = writeln!(out, "  Physical jokes: {} cite embodied features", pct(p));
    }
    let _ = writeln!(out, "  {}", r.support.as_str());

    let missing: Vec<&str> = [
        (!r.has_structure).then_some("structural"),
        (!r.has_surprise).then_some("surprise"),
        (!r.has_explanations).then_some("explanation"),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !missing.is_empty() {
        let _ = writeln!(out, "\n  Missing measures: {}", missing.join(", "));
    }

    let _ = writeln!(
        out,
        "\nGenerated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

pub fn save(dir: &Path, r: &ComprehensiveReport) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE);
    std::fs::write(&path, render(r))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::comprehensive;
    use crate::model::{Category, CodedExplanation};

    fn coded(cat: Category, semantic: bool, embodied: bool) -> CodedExplanation {
        CodedExplanation {
            joke_id: "x".into(),
            joke_category: cat,
            joke_generator: "g".into(),
            explaining_model: "m".into(),
            has_semantic: semantic,
            has_embodied: embodied,
            has_social: false,
            has_threat: false,
            semantic_count: 0,
            embodied_count: 0,
            social_count: 0,
            threat_count: 0,
        }
    }

    #[test]
    fn report_is_written_with_interpretation() {
        let rows = vec![
            coded(Category::Linguistic, true, false),
            coded(Category::Physical, true, false),
        ];
        let r = comprehensive(None, None, Some(&rows));
        let dir = tempfile::tempdir().unwrap();
        let path = save(dir.path(), &r).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("100.0% semantic"));
        assert!(text.contains("strong support for H3"));
        assert!(text.contains("Missing measures: structural, surprise"));
    }
}
