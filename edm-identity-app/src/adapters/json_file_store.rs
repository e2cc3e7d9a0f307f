//! JSON file catalog store.
//!
//! The whole catalog lives in one pretty-printed JSON document. Saves go to a
//! sibling temp file which is then renamed over the target, so a crash
//! mid-write leaves the previous snapshot intact. Writes through one store
//! are serialized on the blocking thread, so they never share the temp file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use edm_identity_core::error::{CoreError, CoreResult};
use edm_identity_core::traits::CatalogStore;
use edm_identity_core::types::CatalogSnapshot;

pub struct JsonFileCatalogStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }

    fn read_sync(path: &Path) -> CoreResult<Option<CatalogSnapshot>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::StorageError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write_sync(path: &Path, json: &[u8]) -> CoreResult<()> {
        let storage_err =
            |e: std::io::Error| CoreError::StorageError(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let tmp = Self::temp_path(path);
        let mut file = fs::File::create(&tmp).map_err(storage_err)?;
        file.write_all(json).map_err(storage_err)?;
        file.sync_all().map_err(storage_err)?;
        drop(file);
        fs::rename(&tmp, path).map_err(storage_err)
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalogStore {
    async fn load(&self) -> CoreResult<Option<CatalogSnapshot>> {
        let path = self.path.clone();
        let snapshot = tokio::task::spawn_blocking(move || Self::read_sync(&path))
            .await
            .map_err(|e| CoreError::StorageError(format!("Task join error: {e}")))??;
        if snapshot.is_none() {
            log::debug!("No catalog file at {}", self.path.display());
        }
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &CatalogSnapshot) -> CoreResult<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let path = self.path.clone();
        let write_lock = Arc::clone(&self.write_lock);
        tokio::task::spawn_blocking(move || {
            let _guard = write_lock
                .lock()
                .map_err(|_| CoreError::StorageError("Catalog write lock poisoned".to_string()))?;
            Self::write_sync(&path, &json)
        })
        .await
        .map_err(|e| CoreError::StorageError(format!("Task join error: {e}")))??;
        log::debug!(
            "Saved catalog ({} domains, {} sender identities) to {}",
            snapshot.domains.len(),
            snapshot.sender_identities.len(),
            self.path.display()
        );
        Ok(())
    }
}
