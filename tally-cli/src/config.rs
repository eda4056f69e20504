use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tally_finance::{CascadeConfig, DuplicateConfig, LlmConfig, Provider, ReviewConfig};

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub duplicates: DuplicateConfig,
    pub classification: CascadeConfig,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// "anthropic" or "openai"
    pub provider: String,
    pub model: String,
    /// Empty means the provider's public endpoint.
    pub base_url: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: String::new(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Config {
    pub fn review(&self) -> ReviewConfig {
        ReviewConfig {
            duplicates: self.duplicates,
            classification: self.classification,
        }
    }

    pub fn llm_config(&self) -> Result<LlmConfig> {
        let provider: Provider = self.llm.provider.parse()?;
        let base_url = if self.llm.base_url.trim().is_empty() {
            provider.default_base_url().to_string()
        } else {
            self.llm.base_url.trim().to_string()
        };
        Ok(LlmConfig {
            provider,
            model: self.llm.model.clone(),
            base_url,
            temperature: self.llm.temperature,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
