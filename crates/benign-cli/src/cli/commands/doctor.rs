use benign_core::config::credentials::Credentials;
use benign_core::fingerprint::short;

use super::{exit_codes, load};
use crate::cli::args::DoctorArgs;

pub fn run(args: DoctorArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.common)?;
    let creds = Credentials::from_env();
    let report = benign_core::doctor::doctor(&cfg, &args.common.config, &creds);

    let rendered = if args.format == "json" {
        serde_json::to_string_pretty(&report)?
    } else {
        let mut s = String::new();
        s.push_str(&format!("Benign Doctor (v{})\n", report.benign_version));
        if let Some(c) = &report.config {
            s.push_str(&format!("Study: {} ({})\n", c.name, short(&c.fingerprint)));
            s.push_str(&format!("Generation models: {}\n", c.generation_models.join(", ")));
            s.push_str(&format!("Explanation models: {}\n", c.explanation_models.join(", ")));
            s.push_str(&format!(
                "Planned generations: {} ({} prompts)\n",
                c.planned_generations, c.prompt_mode
            ));
        }
        s.push_str("\nCredentials:\n");
        for k in &report.credentials {
            let mark = if k.present { "ok" } else { "missing" };
            s.push_str(&format!("- {:<10} {:<18} {}\n", k.provider, k.env_var, mark));
        }
        if let Some(db) = &report.db {
            s.push_str(&format!(
                "\nAudit db: {} (runs={}, attempts={})\n",
                db.path,
                db.runs.unwrap_or(0),
                db.attempts.unwrap_or(0)
            ));
            for r in &db.recent {
                s.push_str(&format!(
                    "- #{} {} {} ({} attempts, {} failed)\n",
                    r.id, r.stage, r.status, r.attempts, r.failed_attempts
                ));
            }
        }
        if !report.datasets.is_empty() {
            s.push_str("\nLatest datasets:\n");
            for d in &report.datasets {
                s.push_str(&format!("- {:<13} {}\n", d.kind, d.path));
            }
        }
        s.push_str(&format!("\nDiagnostics: {}\n", report.diagnostics.len()));
        for d in &report.diagnostics {
            s.push_str(&format!("- {}\n", d));
        }
        if !report.suggested_actions.is_empty() {
            s.push_str("\nNext actions:\n");
            for a in &report.suggested_actions {
                s.push_str(&format!("- {}\n", a));
            }
        }
        s
    };

    if let Some(p) = args.out {
        std::fs::write(&p, rendered)?;
        eprintln!("wrote file: {}", p.display());
    } else if args.format == "json" {
        println!("{}", rendered);
    } else {
        eprintln!("{}", rendered);
    }

    Ok(exit_codes::OK)
}
