//! Best-effort JSON snapshots of session data. Never authoritative; write
//! failures are logged and swallowed.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

pub const CV_SNAPSHOT: &str = "cv_store.json";
pub const JOBS_SNAPSHOT: &str = "jobs.json";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `value` as pretty JSON to `<dir>/<name>`. Returns whether it landed.
    pub async fn write<T: Serialize>(&self, name: &str, value: &T) -> bool {
        match self.try_write(name, value).await {
            Ok(path) => {
                debug!("Snapshot written to {}", path.display());
                true
            }
            Err(e) => {
                warn!("Could not save {name} snapshot: {e:#}");
                false
            }
        }
    }

    async fn try_write<T: Serialize>(&self, name: &str, value: &T) -> anyhow::Result<PathBuf> {
        let body = serde_json::to_vec_pretty(value)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_write_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("nested").join("data"));

        assert!(store.write(JOBS_SNAPSHOT, &json!({"count": 2})).await);

        let written = std::fs::read_to_string(store.dir().join(JOBS_SNAPSHOT)).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["count"], 2);
        assert!(written.contains('\n'), "expected pretty-printed JSON");
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let store = SnapshotStore::new(&blocker);
        assert!(!store.write(CV_SNAPSHOT, &json!({"text": "cv"})).await);
    }
}
