use anyhow::{Context, Result};
use finwise_ingest::ColumnMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_finwise_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user: UserSection,
    pub import: ImportSection,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSection {
    /// Empty means no signed-in user
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub date_column: String,
    pub description_column: String,
    pub amount_column: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        let m = ColumnMapping::default();
        Self {
            date_column: m.date,
            description_column: m.description,
            amount_column: m.amount,
        }
    }
}

impl ImportSection {
    pub fn mapping(&self) -> ColumnMapping {
        ColumnMapping::new(
            self.date_column.clone(),
            self.description_column.clone(),
            self.amount_column.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_finwise_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.import.mapping(), ColumnMapping::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[user]\nid = \"alice\"\n\n[import]\ndate_column = \"Posted\"\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.user.id, "alice");
        assert_eq!(cfg.import.date_column, "Posted");
        assert_eq!(cfg.import.amount_column, "amount");
        assert_eq!(cfg.llm, LlmSection::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.llm.model = "local-model".into();
        save_config_to(&path, &cfg).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }
}
