//! The ordered passage collection and its persisted snapshot.

use crate::error::{Result, RetrieverError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw text plus a source identifier. Immutable once produced by the
/// document loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A passage plus its embedding vector. Created by the pipeline, consumed
/// read-only by the search layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageRecord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub vector: Vec<f32>,
}

/// The ordered collection of final passages and their vectors — the unit
/// the search layer indexes. Record order is passage order and must not
/// change between save and load.
#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    records: Vec<PassageRecord>,
}

impl PassageStore {
    pub fn new(records: Vec<PassageRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PassageRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[PassageRecord] {
        &self.records
    }

    /// Dimensionality of the stored vectors, from the first record.
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.vector.len())
    }

    /// Copy of the vector set in record order, for index construction.
    pub fn vectors(&self) -> Vec<Vec<f32>> {
        self.records.iter().map(|r| r.vector.clone()).collect()
    }

    /// Serialize the store to a JSON snapshot at `path`.
    ///
    /// Schema: an ordered list of `{text, source?, vector}` objects.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(&self.records)?;
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), records = self.len(), "snapshot saved");
        Ok(())
    }

    /// Load a snapshot previously written by [`PassageStore::save`].
    ///
    /// Fails with a config error when the snapshot holds no records or the
    /// records disagree on vector dimensionality.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let records: Vec<PassageRecord> = serde_json::from_slice(&bytes)?;

        let dimension = records
            .first()
            .map(|r| r.vector.len())
            .ok_or_else(|| RetrieverError::config("snapshot holds no passage records"))?;
        if let Some(bad) = records.iter().find(|r| r.vector.len() != dimension) {
            return Err(RetrieverError::config(format!(
                "snapshot vectors have inconsistent dimensions ({} vs {})",
                dimension,
                bad.vector.len()
            )));
        }

        tracing::info!(path = %path.display(), records = records.len(), "snapshot loaded");
        Ok(Self { records })
    }
}
