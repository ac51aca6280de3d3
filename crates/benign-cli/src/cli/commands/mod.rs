use super::args::*;
use benign_core::config::{load_config, StudyConfig};
use benign_core::engine::RunAudit;
use benign_core::errors::ConfigError;
use benign_core::storage::Store;
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufReadExt;

pub mod analyze;
pub mod doctor;
pub mod explain;
pub mod generate;
pub mod rate;
pub mod report;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const STAGE_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let result = match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Doctor(args) => doctor::run(args),
        Command::Generate(args) => generate::run(args).await,
        Command::Summary(args) => report::summary(args),
        Command::Structure(args) => analyze::structure(args),
        Command::Surprise(args) => analyze::surprise(args).await,
        Command::Explain(args) => explain::run(args).await,
        Command::Code(args) => explain::code(args),
        Command::Report(args) => report::comprehensive(args),
        Command::Rate(args) => rate::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    };

    match result {
        Err(e) if e.chain().any(|c| c.is::<ConfigError>()) => {
            eprintln!("{}", e);
            Ok(exit_codes::CONFIG_ERROR)
        }
        other => other,
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    write_sample_config_if_missing(&args.config)?;

    if args.gitignore {
        write_file_if_missing(Path::new(".gitignore"), crate::templates::GITIGNORE)?;
        write_file_if_missing(Path::new(".env.example"), crate::templates::ENV_EXAMPLE)?;
    }

    Ok(exit_codes::OK)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::write(path, content)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists (skipped)", path.display());
    }
    Ok(())
}

fn write_sample_config_if_missing(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        benign_core::config::write_sample_config(path)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists", path.display());
    }
    Ok(())
}

pub(crate) fn load(args: &ConfigArgs) -> anyhow::Result<StudyConfig> {
    Ok(load_config(&args.config, args.strict)?)
}

pub(crate) fn out_dir(cfg: &StudyConfig) -> PathBuf {
    PathBuf::from(&cfg.settings.output_dir)
}

pub(crate) fn timeout(cfg: &StudyConfig) -> Option<std::time::Duration> {
    cfg.settings
        .timeout_seconds
        .map(std::time::Duration::from_secs)
}

/// Audit run for a stage. A broken audit db only costs the audit trail.
pub(crate) fn start_audit(cfg: &StudyConfig, stage: &str, fingerprint: &str) -> Option<RunAudit> {
    let started = Store::open_configured(&cfg.settings.db)
        .and_then(|store| RunAudit::start(store, stage, fingerprint));
    match started {
        Ok(a) => Some(a),
        Err(e) => {
            tracing::warn!(event = "audit.unavailable", db = %cfg.settings.db, error = %e);
            None
        }
    }
}

/// Waits for ENTER. `false` on end of input.
pub(crate) async fn confirm(message: &str) -> anyhow::Result<bool> {
    use std::io::Write;
    eprint!("{} Press ENTER to continue (Ctrl+C to cancel)... ", message);
    std::io::stderr().flush()?;
    let mut input = String::new();
    let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
    let n = reader.read_line(&mut input).await?;
    Ok(n > 0)
}

pub(crate) fn stage_exit(strict: bool, failures: usize) -> i32 {
    if strict && failures > 0 {
        exit_codes::STAGE_FAILED
    } else {
        exit_codes::OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_mode_turns_failures_into_exit_1() {
        assert_eq!(stage_exit(false, 3), exit_codes::OK);
        assert_eq!(stage_exit(true, 0), exit_codes::OK);
        assert_eq!(stage_exit(true, 1), exit_codes::STAGE_FAILED);
    }
}
