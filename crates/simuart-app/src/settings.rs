use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use simuart_core::TransactorConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transactor: TransactorConfig,
    /// Instances created at start-up, in order.
    pub instances: Vec<String>,
    pub step_interval_ms: u64,
    /// Send every received byte straight back to the host.
    pub echo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transactor: TransactorConfig::default(),
            instances: vec!["uart0".to_string()],
            step_interval_ms: 1,
            echo: true,
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("simuart").join("config.json"))
}

/// An explicit path must exist and parse; the default location is optional.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(AppConfig::default()),
        },
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: AppConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn nested_transactor_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "instances": ["console", "debug"], "echo": false,
                 "transactor": {{ "traffic_capacity": 128 }} }}"#
        )
        .unwrap();

        let cfg = load(Some(file.path())).unwrap();
        assert_eq!(cfg.instances, ["console", "debug"]);
        assert!(!cfg.echo);
        assert_eq!(cfg.step_interval_ms, 1);
        assert_eq!(cfg.transactor.traffic_capacity, 128);
        assert!(cfg.transactor.announce);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
