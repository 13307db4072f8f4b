//! Local storage under `~/.finwise`: the ledger snapshot backing the in-memory store.

use anyhow::{Context, Result};
use finwise_core::{LedgerSnapshot, MemoryStore};
use std::fs;
use std::path::{Path, PathBuf};

/// `$FINWISE_HOME`, or `~/.finwise`
pub fn finwise_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINWISE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".finwise"))
}

pub fn ensure_finwise_home() -> Result<PathBuf> {
    let dir = finwise_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn ledger_path() -> Result<PathBuf> {
    Ok(ensure_finwise_home()?.join("ledger.json"))
}

/// Store loaded from a snapshot file, written back with [`Ledger::save`]
pub struct Ledger {
    path: PathBuf,
    pub store: MemoryStore,
}

impl Ledger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = read_snapshot(&path)?;
        Ok(Self {
            path,
            store: MemoryStore::from_snapshot(snapshot),
        })
    }

    pub async fn save(&self) -> Result<()> {
        write_snapshot(&self.path, &self.store.snapshot().await)
    }
}

fn read_snapshot(path: &Path) -> Result<LedgerSnapshot> {
    if !path.exists() {
        return Ok(LedgerSnapshot::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

fn write_snapshot(path: &Path, snapshot: &LedgerSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    // replace atomically via a sibling temp file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
