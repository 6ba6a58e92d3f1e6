//! 本地文件系统对象存储，每个 bucket 一个子目录

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use super::ObjectStore;
use crate::authz::Bucket;
use crate::errors::{PortalError, Result};
use crate::models::objects::responses::ObjectInfo;
use crate::utils::validate::{validate_folder, validate_object_path};

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for bucket in Bucket::ALL {
            fs::create_dir_all(root.join(bucket.as_str()))
                .await
                .map_err(|e| {
                    PortalError::file_operation(format!(
                        "Failed to create bucket directory {bucket}: {e}"
                    ))
                })?;
        }
        info!("Local object store ready at {}", root.display());
        Ok(Self { root })
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        let bucket: Bucket = bucket.parse().map_err(PortalError::validation)?;
        validate_object_path(path).map_err(PortalError::validation)?;
        Ok(self.root.join(bucket.as_str()).join(path))
    }

    fn folder_path(&self, bucket: &str, folder: &str) -> Result<PathBuf> {
        let bucket: Bucket = bucket.parse().map_err(PortalError::validation)?;
        validate_folder(folder).map_err(PortalError::validation)?;
        let folder = folder.trim_matches('/');
        let base = self.root.join(bucket.as_str());
        Ok(if folder.is_empty() {
            base
        } else {
            base.join(folder)
        })
    }
}

fn system_time_to_utc(time: std::io::Result<std::time::SystemTime>) -> chrono::DateTime<chrono::Utc> {
    time.map(chrono::DateTime::<chrono::Utc>::from)
        .unwrap_or_else(|_| chrono::Utc::now())
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, bucket: &str, path: &str, data: Vec<u8>) -> Result<u64> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        let size = data.len() as u64;
        fs::write(&target, data).await?;
        debug!("Stored object {}/{} ({} bytes)", bucket, path, size);
        Ok(size)
    }

    async fn get(&self, bucket: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let target = self.object_path(bucket, path)?;
        match fs::read(&target).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<bool> {
        let target = self.object_path(bucket, path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ObjectInfo>> {
        let dir = self.folder_path(bucket, folder)?;
        let prefix = folder.trim_matches('/');

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            objects.push(ObjectInfo {
                name,
                path,
                size: if metadata.is_file() { metadata.len() } else { 0 },
                created_at: system_time_to_utc(metadata.created().or_else(|_| metadata.modified())),
            });
        }

        objects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        Ok(objects.into_iter().skip(offset).take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempRoot(PathBuf);

    impl TempRoot {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("dailyreport-store-{}", uuid::Uuid::new_v4())))
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn test_put_get_list_delete() {
        let root = TempRoot::new();
        let store = LocalObjectStore::new(&root.0).await.unwrap();

        store
            .put("works", "u1/day1_1.txt", b"hello".to_vec())
            .await
            .unwrap();
        assert_eq!(
            store.get("works", "u1/day1_1.txt").await.unwrap(),
            Some(b"hello".to_vec())
        );

        let listed = store.list("works", "u1", 100, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, "u1/day1_1.txt");
        assert_eq!(listed[0].size, 5);

        assert!(store.delete("works", "u1/day1_1.txt").await.unwrap());
        assert!(!store.delete("works", "u1/day1_1.txt").await.unwrap());
        assert!(store.get("works", "u1/day1_1.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_traversal_and_unknown_bucket() {
        let root = TempRoot::new();
        let store = LocalObjectStore::new(&root.0).await.unwrap();

        assert!(store.get("works", "../secrets").await.is_err());
        assert!(store.put("private", "a/b.txt", vec![]).await.is_err());
        assert!(store.list("works", "/etc", 10, 0).await.is_ok());
        assert!(store.list("works", "../..", 10, 0).await.is_err());
    }
}
