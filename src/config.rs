//! Per-user configuration store.
//!
//! A thin collaborator for the provenance core: named install roots and peek
//! commands live here. The parsed table is loaded once and cached as a field
//! on the provider object, not as module state.
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml::value::Table;
use toml::Value;

pub const CONFIG_FILE_NAME: &str = "provstamp.toml";

/// File-backed nested settings with dotted-path access.
pub struct ConfigStore {
    path: PathBuf,
    table: Table,
}

impl ConfigStore {
    /// Open the per-user store, loading the file once. A missing file is an
    /// empty table, not an error.
    pub fn open_default() -> Result<Self> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow!("cannot determine config directory"))?;
        Self::at(base.join(CONFIG_FILE_NAME))
    }

    /// Open a store at an explicit location.
    pub fn at(path: PathBuf) -> Result<Self> {
        let table = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("read config {}", path.display()))?;
            text.parse::<Table>()
                .with_context(|| format!("parse config {}", path.display()))?
        } else {
            Table::new()
        };
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a dotted key path ("peek.nc") in the nested table.
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let mut segments = dotted.split('.');
        let mut current = self.table.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a dotted key path, creating intermediate tables as needed.
    pub fn set(&mut self, dotted: &str, value: Value) -> Result<()> {
        let mut segments: Vec<&str> = dotted.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(anyhow!("malformed config key {dotted:?}"));
        }
        let leaf = segments
            .pop()
            .ok_or_else(|| anyhow!("empty config key"))?;
        let mut table = &mut self.table;
        for segment in segments {
            let entry = table
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            table = entry
                .as_table_mut()
                .ok_or_else(|| anyhow!("config key {dotted:?} crosses a non-table value"))?;
        }
        table.insert(leaf.to_string(), value);
        Ok(())
    }

    /// Persist the table to its file location.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(&self.table).context("serialize config")?;
        fs::write(&self.path, text).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    /// Named install roots from the `[roots]` table.
    pub fn named_roots(&self) -> Vec<(String, PathBuf)> {
        let mut roots = Vec::new();
        if let Some(Value::Table(entries)) = self.table.get("roots") {
            for (name, value) in entries {
                if let Value::String(path) = value {
                    roots.push((name.clone(), PathBuf::from(path)));
                }
            }
        }
        roots
    }

    /// Peek summarizer commands from the `[peek]` table, keyed by asset
    /// extension.
    pub fn peek_commands(&self) -> BTreeMap<String, String> {
        let mut commands = BTreeMap::new();
        if let Some(Value::Table(entries)) = self.table.get("peek") {
            for (extension, value) in entries {
                if let Value::String(command) = value {
                    commands.insert(extension.clone(), command.clone());
                }
            }
        }
        commands
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
