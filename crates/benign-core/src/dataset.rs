//! JSON dataset files and CSV tables in the output directory.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Jokes,
    Structure,
    Surprise,
    Explanations,
}

impl DatasetKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DatasetKind::Jokes => "jokes",
            DatasetKind::Structure => "structural",
            DatasetKind::Surprise => "surprise",
            DatasetKind::Explanations => "explanations",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset<T> {
    pub schema_version: u32,
    pub kind: DatasetKind,
    pub created_at: String,
    pub config_fingerprint: String,
    pub records: Vec<T>,
}

impl<T> Dataset<T> {
    pub fn new(kind: DatasetKind, config_fingerprint: &str, records: Vec<T>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            kind,
            created_at: chrono::Utc::now().to_rfc3339(),
            config_fingerprint: config_fingerprint.to_string(),
            records,
        }
    }

    /// Same header, different records.
    pub fn with_records<U>(&self, records: Vec<U>) -> Dataset<U> {
        Dataset {
            schema_version: self.schema_version,
            kind: self.kind,
            created_at: self.created_at.clone(),
            config_fingerprint: self.config_fingerprint.clone(),
            records,
        }
    }
}

/// Older runs wrote bare arrays; anything else must be a full dataset.
pub fn load<T: DeserializeOwned>(path: &Path, kind: DatasetKind) -> anyhow::Result<Dataset<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let parse_err = || format!("failed to parse dataset {}", path.display());

    if raw.trim_start().starts_with('[') {
        let records: Vec<T> = serde_json::from_str(&raw).with_context(parse_err)?;
        return Ok(Dataset {
            schema_version: SCHEMA_VERSION,
            kind,
            created_at: String::new(),
            config_fingerprint: String::new(),
            records,
        });
    }

    let ds: Dataset<T> = serde_json::from_str(&raw).with_context(parse_err)?;
    if ds.schema_version != SCHEMA_VERSION {
        anyhow::bail!(
            "dataset {} has schema_version {} (supported: {})",
            path.display(),
            ds.schema_version,
            SCHEMA_VERSION
        );
    }
    if ds.kind != kind {
        anyhow::bail!(
            "dataset {} holds {} records, expected {}",
            path.display(),
            ds.kind.prefix(),
            kind.prefix()
        );
    }
    Ok(ds)
}

/// Write to `{dir}/{prefix}_{timestamp}.json` and return the path.
pub fn save<T: Serialize>(dir: &Path, ds: &Dataset<T>) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
    let path = dir.join(format!("{}_{}.json", ds.kind.prefix(), stamp));
    write(&path, ds)?;
    Ok(path)
}

pub fn write<T: Serialize>(path: &Path, ds: &Dataset<T>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(ds)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Most recent `{prefix}_*.json` in `dir`. File names sort by timestamp.
pub fn latest(dir: &Path, kind: DatasetKind) -> anyhow::Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }
    let prefix = format!("{}_", kind.prefix());
    let mut best: Option<PathBuf> = None;
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // stamped files only: `{prefix}_YYYYmmdd_...json`
        let stamped = name
            .strip_prefix(&prefix)
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()));
        if !stamped || !name.ends_with(".json") {
            continue;
        }
        let newer = best
            .as_ref()
            .and_then(|b| b.file_name())
            .and_then(|n| n.to_str())
            .map_or(true, |b| name > b);
        if newer {
            best = Some(path);
        }
    }
    Ok(best)
}

/// Explicit path if given, else the latest matching dataset.
pub fn resolve_input(
    input: Option<&Path>,
    dir: &Path,
    kind: DatasetKind,
) -> anyhow::Result<PathBuf> {
    if let Some(p) = input {
        return Ok(p.to_path_buf());
    }
    latest(dir, kind)?.ok_or_else(|| {
        anyhow::anyhow!(
            "no {} dataset found in {} (run the earlier stage or pass --input)",
            kind.prefix(),
            dir.display()
        )
    })
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for r in rows {
        w.serialize(r)?;
    }
    w.flush()?;
    Ok(())
}
