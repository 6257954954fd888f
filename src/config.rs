use crate::sites::Site;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, path::Path, path::PathBuf, time::Duration};
use tokio::fs;
use tracing::{debug, error, info};

const FALLBACK_SETTLE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub navigation_settle_ms: u64,
    pub fade_ms: u64,
    pub settle_ms: BTreeMap<String, u64>,
    pub icon_color: String,
    pub picker_width: String,
    pub picker_offset_px: f64,
    pub picker_gap_px: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1500,
            navigation_settle_ms: 500,
            fade_ms: 200,
            settle_ms: BTreeMap::new(),
            icon_color: "#5f6368".to_string(),
            picker_width: "300px".to_string(),
            picker_offset_px: 150.0,
            picker_gap_px: 8.0,
        }
    }
}

impl Config {
    pub fn settle_delay(&self, site: Option<Site>) -> Duration {
        let millis = match site {
            Some(site) => self
                .settle_ms
                .get(site.id())
                .copied()
                .unwrap_or(site.adapter().descriptor().settle_delay_ms),
            None => FALLBACK_SETTLE_MS,
        };
        Duration::from_millis(millis)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("WEEK_SEARCH_CONFIG") {
        return PathBuf::from(path);
    }

    PathBuf::from("config/week_search.json")
}

pub async fn load_config(path: &Path) -> Config {
    let shown = path.display();
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
            Ok(config) => {
                info!("loaded config from {shown}");
                config
            }
            Err(err) => {
                error!("ignoring {shown}: {err}");
                Config::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config at {shown}, using defaults");
            Config::default()
        }
        Err(err) => {
            error!("cannot read {shown}: {err}");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("week_search_{}_{name}.json", std::process::id()));
        path
    }

    #[test]
    fn settle_delay_prefers_override_then_adapter() {
        let mut config = Config::default();
        assert_eq!(config.settle_delay(Some(Site::Google)), Duration::from_millis(100));
        assert_eq!(config.settle_delay(Some(Site::YouTube)), Duration::from_millis(2000));
        assert_eq!(config.settle_delay(None), Duration::from_millis(500));

        config.settle_ms.insert("google".to_string(), 750);
        assert_eq!(config.settle_delay(Some(Site::Google)), Duration::from_millis(750));
    }

    #[tokio::test]
    async fn partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        fs::write(&path, br#"{"max_retries": 5, "settle_ms": {"twitter": 900}}"#)
            .await
            .unwrap();
        let config = load_config(&path).await;
        let _ = fs::remove_file(&path).await;

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay_ms, 1500);
        assert_eq!(config.settle_delay(Some(Site::Twitter)), Duration::from_millis(900));
    }

    #[tokio::test]
    async fn missing_or_broken_file_yields_defaults() {
        assert_eq!(load_config(&temp_path("missing")).await, Config::default());

        let path = temp_path("broken");
        fs::write(&path, b"{not json").await.unwrap();
        let config = load_config(&path).await;
        let _ = fs::remove_file(&path).await;
        assert_eq!(config, Config::default());
    }
}
