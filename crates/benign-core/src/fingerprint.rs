use crate::config::StudyConfig;
use sha2::{Digest, Sha256};

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Stable hash of the effective study config, stamped into every dataset.
///
/// Output paths are excluded so the same study moved to another directory
/// keeps its fingerprint.
pub fn config_fingerprint(cfg: &StudyConfig) -> anyhow::Result<String> {
    let mut canonical = cfg.clone();
    canonical.settings.output_dir.clear();
    canonical.settings.db.clear();
    let json = serde_json::to_string(&canonical)?;
    Ok(sha256_hex(&json))
}

/// First 12 hex chars, for log lines and file stamps.
pub fn short(fp: &str) -> &str {
    &fp[..fp.len().min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, SAMPLE_CONFIG};

    #[test]
    fn fingerprint_ignores_paths_but_not_study() {
        let a = parse_config(SAMPLE_CONFIG, true).unwrap();
        let mut b = a.clone();
        b.settings.output_dir = "/elsewhere".into();
        assert_eq!(config_fingerprint(&a).unwrap(), config_fingerprint(&b).unwrap());

        b.study.temperatures.push(1.1);
        assert_ne!(config_fingerprint(&a).unwrap(), config_fingerprint(&b).unwrap());
        assert_eq!(short(&config_fingerprint(&a).unwrap()).len(), 12);
    }
}
