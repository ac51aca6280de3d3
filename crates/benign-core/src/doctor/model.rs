use serde::Serialize;

use crate::config::credentials::CredentialStatus;
use crate::storage::RunSummary;

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub schema_version: u32,   // 1
    pub generated_at: String,  // rfc3339
    pub benign_version: String,
    pub platform: PlatformInfo,

    pub config_path: String,
    pub config: Option<ConfigSummary>,
    pub credentials: Vec<CredentialStatus>,
    pub db: Option<DbSummary>,
    pub datasets: Vec<DatasetEntry>,

    pub diagnostics: Vec<String>,
    pub suggested_actions: Vec<String>,
}

impl DoctorReport {
    pub fn healthy(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub name: String,
    pub generation_models: Vec<String>,
    pub explanation_models: Vec<String>,
    pub surprise_model: String,
    pub categories: Vec<String>,
    pub temperatures: Vec<f32>,
    pub prompt_mode: String,
    pub planned_generations: usize,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbSummary {
    pub path: String,
    pub runs: Option<u64>,
    pub attempts: Option<u64>,
    pub last_run_at: Option<String>,
    pub recent: Vec<RunSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetEntry {
    pub kind: String,
    pub path: String,
}
