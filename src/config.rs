use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatasetConfig {
    #[serde(default = "default_races_url")]
    pub races_url: String,
    #[serde(default = "default_class_index_url")]
    pub class_index_url: String,
    #[serde(default = "default_class_base_url")]
    pub class_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String, // "openai", "gemini" or "ollama"
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: default_output(),
            dataset: DatasetConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            races_url: default_races_url(),
            class_index_url: default_class_index_url(),
            class_base_url: default_class_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_llm_timeout(),
            base_url: None,
        }
    }
}

fn default_output() -> String {
    ".".to_string()
}
fn default_races_url() -> String {
    "https://raw.githubusercontent.com/5etools-mirror-3/5etools-src/main/data/races.json".to_string()
}
fn default_class_index_url() -> String {
    "https://raw.githubusercontent.com/5etools-mirror-3/5etools-src/main/data/class/index.json"
        .to_string()
}
fn default_class_base_url() -> String {
    "https://raw.githubusercontent.com/5etools-mirror-3/5etools-src/main/data/class/".to_string()
}
fn default_timeout() -> u64 {
    15
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_temperature() -> f32 {
    0.8
}
fn default_max_tokens() -> u32 {
    350
}
fn default_llm_timeout() -> u64 {
    60
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }
}
