//! Local directory data source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{DataSource, SourceError};
use crate::calculate::snapshots_from_records;
use crate::models::{PlayerId, SnapshotRecord};
use crate::parse::parse_csv;

/// Name mapping file inside the data directory.
pub const NAMES_FILE: &str = "player_names.json";

/// Reads `<dir>/*.csv` and `<dir>/player_names.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of a player's CSV. Codes that could escape the directory are rejected.
    fn csv_path(&self, id: &PlayerId) -> Result<PathBuf, SourceError> {
        let code = id.as_str();
        if code.is_empty() || code.contains(['/', '\\']) || code.contains("..") {
            return Err(SourceError::NotFound(code.to_string()));
        }
        Ok(self.dir.join(id.file_name()))
    }

    async fn read_csv(&self, id: &PlayerId) -> Result<String, SourceError> {
        let path = self.csv_path(id)?;
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DataSource for DirSource {
    fn name(&self) -> &'static str {
        "dir"
    }

    async fn list_files(&self) -> Result<Vec<String>, SourceError> {
        // Missing directory is an error, not an empty board
        fs::metadata(&self.dir).await?;

        let pattern = format!(
            "{}/*.csv",
            glob::Pattern::escape(&self.dir.to_string_lossy())
        );
        debug!("Listing {}", pattern);

        let mut files: Vec<String> = glob::glob(&pattern)?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            })
            .collect();
        files.sort();

        Ok(files)
    }

    async fn player_csv(&self, id: &PlayerId) -> Result<String, SourceError> {
        self.read_csv(id).await
    }

    async fn name_mapping(&self) -> Result<BTreeMap<PlayerId, String>, SourceError> {
        let text = fs::read_to_string(self.dir.join(NAMES_FILE)).await?;
        let mut value: serde_json::Value = serde_json::from_str(&text)?;

        // Accept the backend's `{"nameMapping": {...}}` envelope or a bare map
        if let Some(inner) = value.get_mut("nameMapping") {
            value = inner.take();
        }

        Ok(serde_json::from_value(value)?)
    }

    async fn player_history(
        &self,
        id: &PlayerId,
        days: Option<u32>,
    ) -> Result<Vec<SnapshotRecord>, SourceError> {
        let text = self.read_csv(id).await?;
        let table = parse_csv(&text);
        Ok(snapshots_from_records(
            &table.records,
            days.map(|d| d as usize),
        ))
    }
}
