pub mod model;

use chrono::Utc;
use std::path::Path;

use crate::config::credentials::Credentials;
use crate::config::{PromptMode, StudyConfig};
use crate::dataset::{latest, DatasetKind};
use crate::model::ModelSpec;
use crate::storage::Store;

use model::*;

/// Best-effort environment check. Never fails; problems land in `diagnostics`.
pub fn doctor(cfg: &StudyConfig, config_path: &Path, creds: &Credentials) -> DoctorReport {
    let mut diagnostics = vec![];
    let mut suggested_actions = vec![];

    let config = Some(summarize_config(cfg));

    // Only providers the study actually uses are required.
    let used: Vec<_> = cfg
        .generation_models()
        .into_iter()
        .chain(cfg.explanation_models())
        .chain(cfg.model(&cfg.analysis.surprise_model))
        .collect();
    if let Err(e) = creds.ensure_for(used.iter().copied()) {
        diagnostics.push(e.to_string());
        suggested_actions.push("export the missing keys or add them to a .env file".to_string());
    }

    let db = summarize_db(&cfg.settings.db, &mut diagnostics);

    let out_dir = Path::new(&cfg.settings.output_dir);
    let datasets = [
        DatasetKind::Jokes,
        DatasetKind::Structure,
        DatasetKind::Surprise,
        DatasetKind::Explanations,
    ]
    .into_iter()
    .filter_map(|k| {
        latest(out_dir, k).ok().flatten().map(|p| DatasetEntry {
            kind: k.prefix().to_string(),
            path: p.display().to_string(),
        })
    })
    .collect::<Vec<_>>();
    if datasets.is_empty() {
        suggested_actions.push("run `benign generate` to create a jokes dataset".to_string());
    }

    DoctorReport {
        schema_version: 1,
        generated_at: Utc::now().to_rfc3339(),
        benign_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        config_path: config_path.display().to_string(),
        config,
        credentials: creds.status(),
        db,
        datasets,
        diagnostics,
        suggested_actions,
    }
}

fn summarize_config(cfg: &StudyConfig) -> ConfigSummary {
    let keys = |ms: Vec<&ModelSpec>| -> Vec<String> { ms.iter().map(|m| m.key.clone()).collect() };
    ConfigSummary {
        name: cfg.name.clone(),
        generation_models: keys(cfg.generation_models()),
        explanation_models: keys(cfg.explanation_models()),
        surprise_model: cfg.analysis.surprise_model.clone(),
        categories: cfg.study.categories.iter().map(|c| c.to_string()).collect(),
        temperatures: cfg.study.temperatures.clone(),
        prompt_mode: match cfg.study.prompts {
            PromptMode::Novel => "novel".to_string(),
            PromptMode::Extended => "extended".to_string(),
        },
        planned_generations: cfg.planned_generations(),
        fingerprint: crate::fingerprint::config_fingerprint(cfg).unwrap_or_default(),
    }
}

fn summarize_db(db: &str, diagnostics: &mut Vec<String>) -> Option<DbSummary> {
    if db == ":memory:" || !Path::new(db).exists() {
        return None;
    }
    let store = match Store::open(Path::new(db)) {
        Ok(s) => s,
        Err(e) => {
            diagnostics.push(format!("audit db {} unreadable: {}", db, e));
            return None;
        }
    };
    let stats = store.stats_best_effort().ok()?;
    Some(DbSummary {
        path: db.to_string(),
        runs: stats.runs,
        attempts: stats.attempts,
        last_run_at: stats.last_run_at,
        recent: store.recent_runs(5).unwrap_or_default(),
    })
}
