//! File-backed strategy store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use ystrat_models::{ids, Strategy, StrategySummary};

use crate::error::{StoreError, StoreResult};

const INDEX_FILE: &str = "_index.json";

/// Filesystem operations are expected to complete inside this window;
/// longer is treated as a fatal storage error.
const FS_DEADLINE: Duration = Duration::from_secs(5);

/// Append-only store of strategy artifacts under
/// `<root>/strategies/<id>_<iso-utc>.json`.
///
/// `put` is serialized by an in-process mutex held for the short critical
/// section of rename + index update. Multiple processes are not supported.
pub struct StrategyStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl StrategyStore {
    /// Opens (and creates if needed) the store under `root`.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = root.as_ref().join("strategies");
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists a strategy atomically, assigning its id. Returns the
    /// stored record and its file path.
    ///
    /// On any failure nothing remains: the temp file is removed, and if
    /// the index update fails the already-renamed strategy file is
    /// removed too.
    pub async fn put(
        &self,
        mut strategy: Strategy,
        correlation_id: &str,
    ) -> StoreResult<(Strategy, PathBuf)> {
        let _guard = self.write_lock.lock().await;

        let mut index = self.load_index().await?;
        let taken: HashSet<&str> = index.iter().map(|s| s.id.as_str()).collect();

        let mut collision = 0u32;
        let id = loop {
            let candidate = ids::strategy_id(
                &strategy.input_fingerprint,
                &strategy.brief,
                &strategy.created_at,
                collision,
            );
            if !taken.contains(candidate.as_str()) {
                break candidate;
            }
            collision += 1;
        };
        if collision > 0 {
            debug!(collision, id, "strategy id collision resolved");
        }
        strategy.id = id;

        let final_path = self.dir.join(format!("{}.json", strategy.file_stem()));
        let tmp_path = self
            .dir
            .join(format!(".{}-{}.tmp", strategy.file_stem(), correlation_id));

        let mut payload = serde_json::to_string_pretty(&strategy)?;
        payload.push('\n');

        if let Err(err) = self.write_and_rename(&tmp_path, &final_path, payload.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err);
        }

        index.push(strategy.summary(final_path.to_string_lossy()));
        sort_index(&mut index);
        if let Err(err) = self.write_index(&index, correlation_id).await {
            warn!(error = %err, "index update failed, removing strategy file");
            let _ = tokio::fs::remove_file(&final_path).await;
            return Err(err);
        }

        debug!(id = %strategy.id, path = %final_path.display(), "strategy persisted");
        Ok((strategy, final_path))
    }

    /// Loads a strategy by id.
    pub async fn get(&self, id: &str) -> StoreResult<Strategy> {
        let index = self.load_index().await?;
        let entry = index
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found(id))?;
        let bytes = tokio::fs::read(&entry.path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StoreError::not_found(id)
            } else {
                StoreError::Io(err)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Summaries ordered by creation time descending.
    pub async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<StrategySummary>> {
        let index = self.load_index().await?;
        Ok(index.into_iter().skip(offset).take(limit).collect())
    }

    /// Case-insensitive substring search over the brief goal and mined
    /// keyword terms.
    pub async fn search(&self, query: &str) -> StoreResult<Vec<StrategySummary>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list(usize::MAX, 0).await;
        }

        let index = self.load_index().await?;
        let mut hits = Vec::new();
        for summary in index {
            if summary.goal.to_lowercase().contains(&needle) {
                hits.push(summary);
                continue;
            }
            // Keyword terms live in the full record.
            match self.read_strategy_file(&summary.path).await {
                Ok(strategy) => {
                    if strategy
                        .keywords
                        .keywords
                        .iter()
                        .any(|k| k.term.to_lowercase().contains(&needle))
                    {
                        hits.push(summary);
                    }
                }
                Err(err) => warn!(path = %summary.path, error = %err, "skipping unreadable strategy"),
            }
        }
        Ok(hits)
    }

    async fn read_strategy_file(&self, path: &str) -> StoreResult<Strategy> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    async fn load_index(&self) -> StoreResult<Vec<StrategySummary>> {
        match tokio::fs::read(self.index_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn write_index(
        &self,
        index: &[StrategySummary],
        correlation_id: &str,
    ) -> StoreResult<()> {
        let tmp = self.dir.join(format!(".{INDEX_FILE}-{correlation_id}.tmp"));
        let mut payload = serde_json::to_string_pretty(index)?;
        payload.push('\n');
        if let Err(err) = self
            .write_and_rename(&tmp, &self.index_path(), payload.as_bytes())
            .await
        {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err);
        }
        Ok(())
    }

    /// Temp-file-then-rename write with the storage deadline applied.
    async fn write_and_rename(&self, tmp: &Path, target: &Path, bytes: &[u8]) -> StoreResult<()> {
        tokio::time::timeout(FS_DEADLINE, tokio::fs::write(tmp, bytes))
            .await
            .map_err(|_| StoreError::Timeout("write"))??;
        tokio::time::timeout(FS_DEADLINE, tokio::fs::rename(tmp, target))
            .await
            .map_err(|_| StoreError::Timeout("rename"))??;
        Ok(())
    }
}

/// Creation time descending, ties broken by id descending.
fn sort_index(index: &mut [StrategySummary]) {
    index.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
