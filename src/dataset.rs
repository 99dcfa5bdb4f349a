use crate::config::DatasetConfig;
use crate::error::{GenError, Result};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RaceIndex {
    #[serde(default)]
    pub race: Vec<RaceEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RaceEntry {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Class key → class file reference, e.g. `"wizard": "class-wizard.json"`.
pub type ClassIndex = BTreeMap<String, String>;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassDetail {
    #[serde(default)]
    pub class: Vec<ClassInfo>,
    #[serde(default)]
    pub subclass: Vec<SubclassEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubclassEntry {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn races(&self) -> Result<RaceIndex>;
    async fn class_index(&self) -> Result<ClassIndex>;
    async fn class_detail(&self, file: &str) -> Result<ClassDetail>;
}

/// Reads the 5etools mirror over plain HTTP GETs.
pub struct HttpDataset {
    config: DatasetConfig,
    client: reqwest::Client,
}

impl HttpDataset {
    pub fn new(config: &DatasetConfig) -> Result<Self> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    fn with_builder(config: &DatasetConfig, builder: reqwest::ClientBuilder) -> Result<Self> {
        let client = builder
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GenError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let network = |source: reqwest::Error| GenError::Network {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(network)?;
        if !resp.status().is_success() {
            return Err(GenError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }
        resp.json().await.map_err(network)
    }
}

#[async_trait]
impl DatasetSource for HttpDataset {
    async fn races(&self) -> Result<RaceIndex> {
        self.get_json(&self.config.races_url).await
    }

    async fn class_index(&self) -> Result<ClassIndex> {
        self.get_json(&self.config.class_index_url).await
    }

    async fn class_detail(&self, file: &str) -> Result<ClassDetail> {
        let url = format!("{}{}", self.config.class_base_url, file);
        self.get_json(&url).await
    }
}
