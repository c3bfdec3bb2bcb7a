use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::{fs, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::{IndexManifest, VectorIndex, INDEX_FORMAT_VERSION};
use crate::error::AppError;

const MANIFEST_FILE: &str = "manifest.json";
const INDEX_FILE: &str = "index.json";

/// Filesystem home of the one global vector index.
///
/// The directory is replaced wholesale on every ingestion. Writers stage the
/// new index into a sibling temp directory and swap it in under a write lock,
/// so in-process readers observe either the previous index or the new one,
/// never a torn write. A crash mid-save leaves the previous index intact.
#[derive(Clone)]
pub struct IndexStore {
    dir: PathBuf,
    gate: Arc<RwLock<()>>,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a persisted index is present.
    pub async fn exists(&self) -> bool {
        let _guard = self.gate.read().await;
        fs::try_exists(self.dir.join(MANIFEST_FILE))
            .await
            .unwrap_or(false)
    }

    /// Persists the index, replacing any previous one.
    pub async fn save(
        &self,
        index: &VectorIndex,
        manifest: &IndexManifest,
    ) -> Result<(), AppError> {
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        let index_json = serde_json::to_string(index)?;

        let _guard = self.gate.write().await;

        let parent = self.dir.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await?;

        let staging = sibling_path(&self.dir, "tmp");
        fs::create_dir_all(&staging).await?;
        fs::write(staging.join(INDEX_FILE), index_json).await?;
        fs::write(staging.join(MANIFEST_FILE), manifest_json).await?;

        // Swap: move the old directory aside, move the staged one in, then
        // discard the old. Readers are held off by the write lock.
        let retired = sibling_path(&self.dir, "old");
        let had_previous = fs::try_exists(&self.dir).await.unwrap_or(false);
        if had_previous {
            fs::rename(&self.dir, &retired).await?;
        }
        if let Err(e) = fs::rename(&staging, &self.dir).await {
            // Put the previous index back before surfacing the failure.
            if had_previous {
                let _ = fs::rename(&retired, &self.dir).await;
            }
            return Err(e.into());
        }
        if had_previous {
            if let Err(e) = fs::remove_dir_all(&retired).await {
                debug!("Failed to remove retired index directory: {e}");
            }
        }

        info!(
            chunk_count = manifest.chunk_count,
            dimension = manifest.dimension,
            dir = %self.dir.display(),
            "Persisted vector index"
        );
        Ok(())
    }

    /// Loads the persisted index in full. Every call re-reads from disk.
    pub async fn load(&self) -> Result<(IndexManifest, VectorIndex), AppError> {
        let _guard = self.gate.read().await;

        let manifest_path = self.dir.join(MANIFEST_FILE);
        if !fs::try_exists(&manifest_path).await.unwrap_or(false) {
            return Err(AppError::NotFound(
                "No article index found. Process URLs before asking questions.".to_string(),
            ));
        }

        let manifest: IndexManifest =
            serde_json::from_str(&fs::read_to_string(&manifest_path).await?)?;
        if manifest.format_version != INDEX_FORMAT_VERSION {
            return Err(AppError::Processing(format!(
                "index format version {} is not supported (expected {})",
                manifest.format_version, INDEX_FORMAT_VERSION
            )));
        }

        let index: VectorIndex =
            serde_json::from_str(&fs::read_to_string(self.dir.join(INDEX_FILE)).await?)?;
        if index.len() != manifest.chunk_count || index.dimension() != manifest.dimension {
            return Err(AppError::Processing(
                "index payload does not match its manifest".to_string(),
            ));
        }

        Ok((manifest, index))
    }
}

fn sibling_path(dir: &Path, label: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    dir.with_file_name(format!(".{name}.{label}-{}", Uuid::new_v4()))
}
