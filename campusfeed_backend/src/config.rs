use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CampusfeedConfig {
    pub api_port: u16,
    pub paths: CampusfeedPaths,
    pub oracles: OracleConfig,
}

impl CampusfeedConfig {
    pub fn from_env() -> Result<Self> {
        let paths = CampusfeedPaths::discover()?;
        let api_port = env::var("CAMPUSFEED_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let oracles = OracleConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            oracles,
        })
    }

    pub fn new(api_port: u16, paths: CampusfeedPaths, oracles: OracleConfig) -> Self {
        Self {
            api_port,
            paths,
            oracles,
        }
    }
}

/// Endpoints and timeout for the external oracles: translation and sentiment
/// classification gate anonymous posts, the asset endpoint hosts uploaded
/// images, and the mailer delivers one-time codes. Asset and mailer URLs are
/// optional; when absent those capabilities degrade (no image, logged code).
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub translate_url: String,
    pub sentiment_url: String,
    pub asset_url: Option<String>,
    pub mailer_url: Option<String>,
    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            translate_url: "http://127.0.0.1:9091/translate".into(),
            sentiment_url: "http://127.0.0.1:9092/classify".into(),
            asset_url: None,
            mailer_url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl OracleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let translate_url =
            env::var("CAMPUSFEED_TRANSLATE_URL").unwrap_or(defaults.translate_url);
        let sentiment_url =
            env::var("CAMPUSFEED_SENTIMENT_URL").unwrap_or(defaults.sentiment_url);
        let asset_url = env::var("CAMPUSFEED_ASSET_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty());
        let mailer_url = env::var("CAMPUSFEED_MAILER_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty());
        let timeout = env::var("CAMPUSFEED_ORACLE_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        Self {
            translate_url,
            sentiment_url,
            asset_url,
            mailer_url,
            timeout,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampusfeedPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl CampusfeedPaths {
    pub fn discover() -> Result<Self> {
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("campusfeed.db");
        let uploads_dir = base.join("uploads");
        let logs_dir = base.join("logs");

        Ok(Self {
            base,
            data_dir,
            db_path,
            uploads_dir,
            logs_dir,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.uploads_dir, &self.logs_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
