use crate::core::BlobSink;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// 將批次寫到本機目錄
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl BlobSink for LocalStorage {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let full_path = self.base_path.join(key);
        let to_storage_error = |e: std::io::Error| EtlError::StorageWrite {
            key: key.to_string(),
            message: format!("{}: {}", full_path.display(), e),
        };

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(to_storage_error)?;
        }

        tokio::fs::write(&full_path, body)
            .await
            .map_err(to_storage_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage
            .put("daily/countries_data_20240101_000000.json", b"{}".to_vec())
            .await
            .unwrap();

        let written =
            std::fs::read(temp_dir.path().join("daily/countries_data_20240101_000000.json"))
                .unwrap();
        assert_eq!(written, b"{}");
    }

    #[tokio::test]
    async fn test_put_reports_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let storage = LocalStorage::new(&blocker);
        let result = storage.put("countries_data.json", b"{}".to_vec()).await;

        assert!(matches!(result, Err(EtlError::StorageWrite { .. })));
    }
}
