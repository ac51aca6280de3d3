use benign_core::analysis::{summarize_structure, summarize_surprise};
use benign_core::config::credentials::Credentials;
use benign_core::config::StudyConfig;
use benign_core::dataset::{self, Dataset, DatasetKind};
use benign_core::engine::sampling::sample_parsed;
use benign_core::errors::ConfigError;
use benign_core::model::JokeRecord;
use benign_core::providers::llm::build_client;
use benign_core::report::{console, write_json_summary};
use benign_metrics::{analyze_all, SurpriseAnalyzer};
use std::path::PathBuf;

use super::{load, out_dir, stage_exit, start_audit, timeout};
use crate::cli::args::{InputArgs, SurpriseArgs};

pub const STRUCTURE_CSV: &str = "structural_analysis.csv";
pub const SURPRISE_CSV: &str = "surprise_analysis.csv";

pub(crate) fn load_jokes(
    cfg: &StudyConfig,
    args: &InputArgs,
) -> anyhow::Result<(PathBuf, Dataset<JokeRecord>)> {
    let path = dataset::resolve_input(args.input.as_deref(), &out_dir(cfg), DatasetKind::Jokes)?;
    let ds = dataset::load(&path, DatasetKind::Jokes)?;
    eprintln!("Loaded {} jokes from {}", ds.records.len(), path.display());
    Ok((path, ds))
}

pub fn structure(args: InputArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.common)?;
    let (_, jokes) = load_jokes(&cfg, &args)?;

    let rows = analyze_all(&jokes.records, cfg.analysis.length_bounds);
    let summary = summarize_structure(&rows);

    let dir = out_dir(&cfg);
    dataset::write_csv(&dir.join(STRUCTURE_CSV), &rows)?;
    write_json_summary(&dir, "structural_summary.json", &summary)?;
    let path = dataset::save(
        &dir,
        &Dataset::new(DatasetKind::Structure, &jokes.config_fingerprint, rows),
    )?;

    console::print(&console::render_structure(&summary));
    eprintln!("\nSaved: {}", path.display());
    Ok(super::exit_codes::OK)
}

pub async fn surprise(args: SurpriseArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.input.common)?;
    let spec = cfg.model(&cfg.analysis.surprise_model).ok_or_else(|| {
        ConfigError(format!("unknown surprise model '{}'", cfg.analysis.surprise_model))
    })?;
    let creds = Credentials::from_env();
    let client = build_client(spec, &creds, timeout(&cfg))?;

    let (_, jokes) = load_jokes(&cfg, &args.input)?;
    let sample_size = args.sample_size.unwrap_or(cfg.analysis.surprise_sample_size);
    let sample = sample_parsed(&jokes.records, Some(sample_size));
    eprintln!(
        "Analyzing surprise for {} jokes with {}",
        sample.len(),
        spec.key
    );

    let mut analyzer = SurpriseAnalyzer::new(client, spec.key.clone());
    analyzer.temperature = cfg.analysis.surprise_temperature;
    analyzer.max_tokens = spec.max_tokens;
    analyzer.retries = cfg.settings.retries;
    analyzer.audit = start_audit(&cfg, "surprise", &jokes.config_fingerprint);
    let records = analyzer.analyze(&sample).await;

    let failures = records.iter().filter(|r| !r.success).count();
    let summary = summarize_surprise(&records);
    let dir = out_dir(&cfg);
    dataset::write_csv(&dir.join(SURPRISE_CSV), &records)?;
    write_json_summary(&dir, "surprise_summary.json", &summary)?;
    let path = dataset::save(
        &dir,
        &Dataset::new(DatasetKind::Surprise, &jokes.config_fingerprint, records),
    )?;

    console::print(&console::render_surprise(&summary));
    eprintln!("\nSaved: {}", path.display());
    Ok(stage_exit(args.input.common.strict, failures))
}
