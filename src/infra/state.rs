//! Infrastructure implementation of the `DeploymentStore` port.
//!
//! `RecordStore` persists one JSON record per topology under
//! `<home>/deployments/`, with atomic write (temp file + rename) to prevent
//! record corruption. Async wrappers route file I/O through
//! `tokio::task::spawn_blocking`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::DeploymentStore;
use crate::domain::descriptor::validate_name;
use crate::domain::record::DeploymentRecord;

/// Resolve the stratus home directory: `$STRATUS_HOME` when set (tests,
/// alternate inventories), else `~/.stratus`.
///
/// # Errors
///
/// Returns an error if neither the override nor a home directory exists.
pub fn stratus_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STRATUS_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".stratus"))
}

/// Deployment record store — implements `DeploymentStore` for the infra layer.
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at the default stratus home.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(stratus_home()?))
    }

    /// Create a store with an explicit root (used in tests).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    fn record_path(&self, topology: &str) -> PathBuf {
        self.root.join("deployments").join(format!("{topology}.json"))
    }

    /// Synchronous load — used internally by `load` via `spawn_blocking`.
    fn load_sync(&self, topology: &str) -> Result<Option<DeploymentRecord>> {
        validate_name(topology)?;
        let path = self.record_path(topology);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading deployment record {}", path.display()))?;
        let record: DeploymentRecord = serde_json::from_str(&content)
            .with_context(|| format!("parsing deployment record {}", path.display()))?;
        Ok(Some(record))
    }

    /// Synchronous save — used internally by `save` via `spawn_blocking`.
    fn save_sync(&self, record: &DeploymentRecord) -> Result<()> {
        validate_name(&record.topology)?;
        let path = self.record_path(&record.topology);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(record).context("serializing deployment record")?;

        // Atomic write via temp file then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("finalizing deployment record {}", path.display()))?;
        Ok(())
    }

    /// Synchronous remove — used internally by `remove` via `spawn_blocking`.
    fn remove_sync(&self, topology: &str) -> Result<()> {
        validate_name(topology)?;
        let path = self.record_path(topology);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("removing deployment record {}", path.display()))?;
        }
        Ok(())
    }

    /// List topologies with a recorded deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the deployments directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.root.join("deployments");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("reading deployments directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl DeploymentStore for RecordStore {
    async fn load(&self, topology: &str) -> Result<Option<DeploymentRecord>> {
        let root = self.root.clone();
        let topology = topology.to_owned();
        tokio::task::spawn_blocking(move || RecordStore::with_root(root).load_sync(&topology))
            .await
            .context("record load task panicked")?
    }

    async fn save(&self, record: &DeploymentRecord) -> Result<()> {
        let root = self.root.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || RecordStore::with_root(root).save_sync(&record))
            .await
            .context("record save task panicked")?
    }

    async fn remove(&self, topology: &str) -> Result<()> {
        let root = self.root.clone();
        let topology = topology.to_owned();
        tokio::task::spawn_blocking(move || RecordStore::with_root(root).remove_sync(&topology))
            .await
            .context("record remove task panicked")?
    }
}
