use std::{collections::HashMap, fs, str::FromStr, sync::Arc};

use anyhow::Context;
use record_store::{
    MemoryStore, NotionConfig, NotionStore, RecordStore, DEFAULT_NOTION_API_URL,
    DEFAULT_NOTION_VERSION,
};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Notion,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notion" => Ok(Self::Notion),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown record store backend '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub notion_api_key: Option<String>,
    pub notion_database_id: Option<String>,
    pub notion_api_url: String,
    pub notion_version: String,
    pub record_store: StoreBackend,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5001".into(),
            notion_api_key: None,
            notion_database_id: None,
            notion_api_url: DEFAULT_NOTION_API_URL.into(),
            notion_version: DEFAULT_NOTION_VERSION.into(),
            record_store: StoreBackend::Notion,
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    Settings::from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

impl Settings {
    /// Defaults, then `server.toml`, then the environment.
    pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();

        if let Some(raw) = file {
            match toml::from_str::<HashMap<String, String>>(raw) {
                Ok(file_cfg) => settings.apply_file(&file_cfg),
                Err(error) => warn!(%error, "ignoring malformed server.toml"),
            }
        }

        if let Some(port) = env("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => settings.server_bind = format!("0.0.0.0:{port}"),
                Err(error) => warn!(%port, %error, "ignoring invalid PORT"),
            }
        }
        if let Some(v) = env("SERVER_BIND") {
            settings.server_bind = v;
        }
        if let Some(v) = env("APP__BIND_ADDR") {
            settings.server_bind = v;
        }

        if let Some(v) = env("NOTION_API_KEY") {
            settings.notion_api_key = Some(v);
        }
        if let Some(v) = env("NOTION_DATABASE_ID") {
            settings.notion_database_id = Some(v);
        }

        if let Some(v) = env("NOTION_API_URL") {
            settings.notion_api_url = v;
        }
        if let Some(v) = env("APP__NOTION_API_URL") {
            settings.notion_api_url = v;
        }

        if let Some(v) = env("NOTION_VERSION") {
            settings.notion_version = v;
        }

        if let Some(v) = env("APP__RECORD_STORE") {
            match v.parse() {
                Ok(backend) => settings.record_store = backend,
                Err(error) => warn!(%error, "ignoring APP__RECORD_STORE"),
            }
        }

        if let Some(v) = env("RUST_LOG") {
            settings.log_filter = v;
        }

        settings
    }

    fn apply_file(&mut self, file_cfg: &HashMap<String, String>) {
        if let Some(v) = file_cfg.get("bind_addr") {
            self.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("notion_database_id") {
            self.notion_database_id = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("notion_api_url") {
            self.notion_api_url = v.clone();
        }
        if let Some(v) = file_cfg.get("notion_version") {
            self.notion_version = v.clone();
        }
        if let Some(v) = file_cfg.get("record_store") {
            match v.parse() {
                Ok(backend) => self.record_store = backend,
                Err(error) => warn!(%error, "ignoring record_store in server.toml"),
            }
        }
        if let Some(v) = file_cfg.get("log_filter") {
            self.log_filter = v.clone();
        }
    }

    pub fn notion_config(&self) -> NotionConfig {
        NotionConfig {
            api_key: self.notion_api_key.clone(),
            database_id: self.notion_database_id.clone(),
            api_url: self.notion_api_url.clone(),
            version: self.notion_version.clone(),
        }
    }
}

pub fn build_record_store(settings: &Settings) -> anyhow::Result<Arc<dyn RecordStore>> {
    match settings.record_store {
        StoreBackend::Memory => {
            warn!("using in-memory record store; RSVPs will not be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Notion => {
            let store = NotionStore::new(settings.notion_config())
                .with_context(|| format!("invalid Notion API url '{}'", settings.notion_api_url))?;
            if !store.is_configured() {
                warn!("NOTION_API_KEY or NOTION_DATABASE_ID missing; submissions will fail until configured");
            }
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
