use benign_core::analysis::summarize_generation;
use benign_core::config::credentials::Credentials;
use benign_core::dataset::{self, Dataset, DatasetKind};
use benign_core::engine::{plan_generation, Runner};
use benign_core::fingerprint::{config_fingerprint, short};
use benign_core::providers::llm::build_clients;
use benign_core::report::{console, write_json_summary};

use super::{confirm, exit_codes, load, out_dir, stage_exit, start_audit, timeout};
use crate::cli::args::GenerateArgs;

pub async fn run(args: GenerateArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.common)?;
    let models = cfg.generation_models();
    let creds = Credentials::from_env();
    creds.ensure_for(models.iter().copied())?;

    let tasks = plan_generation(&cfg);
    eprintln!(
        "Study '{}': {} models x {} categories x {} temperatures, {} generations",
        cfg.name,
        models.len(),
        cfg.study.categories.len(),
        cfg.study.temperatures.len(),
        tasks.len()
    );
    if tasks.is_empty() {
        eprintln!("nothing to generate");
        return Ok(exit_codes::OK);
    }
    if !args.yes && !confirm("This will call the vendor APIs.").await? {
        eprintln!("aborted");
        return Ok(exit_codes::OK);
    }

    let clients = build_clients(models.iter().copied(), &creds, timeout(&cfg))?;
    let fingerprint = config_fingerprint(&cfg)?;
    tracing::info!(event = "generate.start", config = short(&fingerprint), total = tasks.len());

    let mut runner = Runner::new(clients, cfg.settings.retries);
    if let Some(audit) = start_audit(&cfg, "generate", &fingerprint) {
        runner = runner.with_audit(audit);
    }
    let jokes = runner.run_generation(&tasks).await;

    let summary = summarize_generation(&jokes);
    let dir = out_dir(&cfg);
    let path = dataset::save(&dir, &Dataset::new(DatasetKind::Jokes, &fingerprint, jokes))?;
    write_json_summary(&dir, "generation_summary.json", &summary)?;

    console::print(&console::render_generation(&summary));
    eprintln!("\nSaved: {}", path.display());
    eprintln!("Next: benign structure --config {}", args.common.config.display());

    Ok(stage_exit(args.common.strict, summary.failures))
}
