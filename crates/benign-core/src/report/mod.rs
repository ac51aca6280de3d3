pub mod comprehensive;
pub mod console;

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pretty JSON summary next to the datasets.
pub fn write_json_summary<T: Serialize>(dir: &Path, name: &str, value: &T) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}
