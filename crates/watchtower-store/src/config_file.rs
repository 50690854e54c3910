use std::path::Path;

use anyhow::Context;
use watchtower_core::WatchConfig;

use crate::write_atomic;

/// Load `config.json`.
/// A missing file is created with defaults; an unparsable or invalid one
/// yields defaults without touching the file.
pub fn load_config(path: &Path) -> anyhow::Result<WatchConfig> {
    if !path.exists() {
        let config = WatchConfig::default();
        save_config(path, &config)?;
        return Ok(config);
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|c| serde_json::from_str::<WatchConfig>(&c).map_err(anyhow::Error::from))
        .and_then(|cfg| {
            cfg.validate()?;
            Ok(cfg)
        });
    match parsed {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Ok(WatchConfig::default())
        }
    }
}

pub fn save_config(path: &Path, config: &WatchConfig) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    write_atomic(path, json.as_bytes()).with_context(|| format!("saving {}", path.display()))
}

/// Deep-merge `updates` (a JSON object) into the stored config and save it.
/// Rejected without writing if the merged config is invalid.
pub fn update_config(path: &Path, updates: &serde_json::Value) -> anyhow::Result<WatchConfig> {
    let merged = load_config(path)?.merged(updates)?;
    save_config(path, &merged)?;
    Ok(merged)
}

pub fn reset_config(path: &Path) -> anyhow::Result<WatchConfig> {
    let config = WatchConfig::default();
    save_config(path, &config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_config_is_written_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg, WatchConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(load_config(&path).unwrap(), WatchConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn invalid_thresholds_fall_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"sprint":{"warning_day":9,"danger_day":5}}"#).unwrap();
        assert_eq!(load_config(&path).unwrap().sprint.danger_day, 21);
    }

    #[test]
    fn update_merges_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        update_config(&path, &json!({ "sprint": { "danger_day": 28 } })).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.sprint.danger_day, 28);
        assert_eq!(cfg.sprint.warning_day, 14);
    }

    #[test]
    fn invalid_update_leaves_file_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        load_config(&path).unwrap();
        assert!(update_config(&path, &json!({ "sprint": { "warning_day": 40 } })).is_err());
        assert_eq!(load_config(&path).unwrap().sprint.warning_day, 14);
    }

    #[test]
    fn reset_restores_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        update_config(&path, &json!({ "modules": { "health": true } })).unwrap();
        assert!(reset_config(&path).unwrap() == WatchConfig::default());
        assert!(!load_config(&path).unwrap().modules.health);
    }
}
