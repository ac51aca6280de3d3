use benign_core::analysis::summarize_explanations;
use benign_core::coding::code_records;
use benign_core::config::credentials::Credentials;
use benign_core::dataset::{self, Dataset, DatasetKind};
use benign_core::engine::sampling::sample_parsed;
use benign_core::engine::ExplanationCollector;
use benign_core::model::ExplanationRecord;
use benign_core::providers::llm::build_clients;
use benign_core::report::{console, write_json_summary};
use benign_metrics::KeywordCoder;

use super::analyze::load_jokes;
use super::{confirm, exit_codes, load, out_dir, stage_exit, start_audit, timeout};
use crate::cli::args::{CodeArgs, ExplainArgs};

pub const EXPLANATION_CSV: &str = "explanation_analysis.csv";

pub async fn run(args: ExplainArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.input.common)?;
    let models = cfg.explanation_models();
    let creds = Credentials::from_env();
    creds.ensure_for(models.iter().copied())?;

    let (_, jokes) = load_jokes(&cfg, &args.input)?;
    let sample_size = if args.all {
        None
    } else {
        args.sample_size.or(cfg.analysis.explanation_sample_size)
    };
    let sample = sample_parsed(&jokes.records, sample_size);
    let calls = sample.len() * models.len();
    eprintln!(
        "Explaining {} jokes with {} models ({} calls)",
        sample.len(),
        models.len(),
        calls
    );
    if calls == 0 {
        eprintln!("nothing to explain");
        return Ok(exit_codes::OK);
    }
    if !args.yes && !confirm("This will call the vendor APIs.").await? {
        eprintln!("aborted");
        return Ok(exit_codes::OK);
    }

    let clients = build_clients(models.iter().copied(), &creds, timeout(&cfg))?;
    let audit = start_audit(&cfg, "explain", &jokes.config_fingerprint);
    let collector = ExplanationCollector {
        clients: &clients,
        temperature: cfg.analysis.explanation_temperature,
        retries: cfg.settings.retries,
        audit: audit.as_ref(),
    };
    let records = collector.collect(&sample, &models).await;

    let failures = records.iter().filter(|r| !r.success).count();
    if let Some(a) = &audit {
        let status = if failures == 0 { "completed" } else { "completed_with_failures" };
        if let Err(e) = a.finish(status) {
            tracing::warn!(event = "audit.finalize_failed", error = %e);
        }
    }

    let path = dataset::save(
        &out_dir(&cfg),
        &Dataset::new(DatasetKind::Explanations, &jokes.config_fingerprint, records),
    )?;
    eprintln!(
        "Collected {} explanations ({} failed)",
        calls - failures,
        failures
    );
    eprintln!("Saved: {}", path.display());
    eprintln!("Next: benign code --config {}", args.input.common.config.display());
    Ok(stage_exit(args.input.common.strict, failures))
}

pub fn code(args: CodeArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.input.common)?;
    let dir = out_dir(&cfg);
    let path = dataset::resolve_input(args.input.input.as_deref(), &dir, DatasetKind::Explanations)?;
    let mut ds: Dataset<ExplanationRecord> = dataset::load(&path, DatasetKind::Explanations)?;

    let rows = code_records(&mut ds.records, &KeywordCoder);
    eprintln!("Coded {} of {} explanations", rows.len(), ds.records.len());

    if let Some(per_category) = args.inspect {
        console::print(&console::render_inspection(&ds.records, per_category));
        return Ok(exit_codes::OK);
    }

    dataset::write(&path, &ds)?;
    dataset::write_csv(&dir.join(EXPLANATION_CSV), &rows)?;
    let summary = summarize_explanations(&rows);
    write_json_summary(&dir, "explanation_summary.json", &summary)?;

    console::print(&console::render_explanations(&summary));
    eprintln!("\nSaved: {}", dir.join(EXPLANATION_CSV).display());
    Ok(exit_codes::OK)
}
