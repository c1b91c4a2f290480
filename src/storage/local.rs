//! Local filesystem storage implementation.
//!
//! Writes the combined record array to a single JSON file. The file is
//! written to a sibling temp file first and renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{OutputConfig, ReactionRecord};
use crate::storage::{RecordStorage, WriteSummary};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    pretty: bool,
}

impl LocalStorage {
    /// Create a LocalStorage writing pretty-printed JSON to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Create a LocalStorage from output settings.
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.combined_out).with_pretty(config.pretty)
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStorage for LocalStorage {
    async fn write_records(&self, records: &[ReactionRecord]) -> Result<WriteSummary> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(records)?
        } else {
            serde_json::to_vec(records)?
        };
        self.write_bytes(&bytes).await?;

        log::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(WriteSummary {
            path: self.path.clone(),
            count: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn records() -> Vec<ReactionRecord> {
        vec![
            ReactionRecord {
                primary_solvent_name: Some("2-méthoxyéthanol".to_string()),
                reactant_structures: vec!["CCO".to_string()],
                solvent_structures: vec!["COCCO".to_string()],
                product_structures: vec!["CC=O".to_string()],
            },
            ReactionRecord {
                primary_solvent_name: None,
                reactant_structures: Vec::new(),
                solvent_structures: Vec::new(),
                product_structures: Vec::new(),
            },
        ]
    }

    fn read_back(path: &Path) -> Vec<ReactionRecord> {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_write_records() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("out/combined.json"));

        let summary = storage.write_records(&records()).await.unwrap();
        assert_eq!(summary.count, 2);
        assert!(summary.path.exists());
        assert!(!dir.path().join("out/combined.tmp").exists());

        assert_eq!(read_back(storage.path()), records());
    }

    #[tokio::test]
    async fn test_output_layout() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("combined.json"));
        storage.write_records(&records()).await.unwrap();

        let text = std::fs::read_to_string(storage.path()).unwrap();
        assert!(text.contains("\"solvent\": null"));
        assert!(text.contains("2-méthoxyéthanol"));
        assert!(text.contains("\n  {"));

        let keys: Vec<usize> = ["solvent", "reactant_smiles", "solvent_smiles", "product_smiles"]
            .iter()
            .map(|key| text.find(&format!("\"{key}\"")).unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_compact_output() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("combined.json")).with_pretty(false);
        storage.write_records(&records()[1..]).await.unwrap();

        let text = std::fs::read_to_string(storage.path()).unwrap();
        assert_eq!(
            text,
            r#"[{"solvent":null,"reactant_smiles":[],"solvent_smiles":[],"product_smiles":[]}]"#
        );
    }
}
