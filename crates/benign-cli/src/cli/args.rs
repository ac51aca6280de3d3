use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "benign",
    version,
    about = "Benign-violation humor study: generate jokes and measure them"
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample study.yaml
    Init(InitArgs),
    /// Check config, credentials, audit db and datasets
    Doctor(DoctorArgs),
    /// Generate jokes for every model, category, temperature and prompt
    Generate(GenerateArgs),
    /// Summarize a jokes dataset
    Summary(InputArgs),
    /// Structural validity analysis
    Structure(InputArgs),
    /// Punchline predictability analysis
    Surprise(SurpriseArgs),
    /// Collect explanations from the explaining models
    Explain(ExplainArgs),
    /// Code explanations for semantic/embodied/social/threat features
    Code(CodeArgs),
    /// Combine all measures into the comprehensive report
    Report(ReportArgs),
    /// Rate jokes interactively on a 1-7 scale
    Rate(RateArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, default_value = "study.yaml")]
    pub config: PathBuf,

    /// Reject unknown config keys and exit 1 when any item failed
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "study.yaml")]
    pub config: PathBuf,

    /// Also write .gitignore and .env.example
    #[arg(long)]
    pub gitignore: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json

    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Dataset to read (default: most recent in the output dir)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SurpriseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Jokes to analyze, split evenly across categories
    pub sample_size: Option<usize>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Jokes to explain, split evenly across categories
    pub sample_size: Option<usize>,

    /// Explain every parsed joke
    #[arg(long, conflicts_with = "sample_size")]
    pub all: bool,

    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print N coded samples per category instead of the summary
    #[arg(long, value_name = "N")]
    pub inspect: Option<usize>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    #[arg(long)]
    pub structure: Option<PathBuf>,

    #[arg(long)]
    pub surprise: Option<PathBuf>,

    #[arg(long)]
    pub explanations: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only analyze existing ratings
    #[arg(long)]
    pub analyze: bool,
}
