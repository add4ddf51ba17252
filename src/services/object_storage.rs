// src/services/object_storage.rs

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;

use crate::common::error::AppError;

/// Where uploaded images live. Implementations must be safe to call without any
/// database transaction open.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str, key: &str)
        -> Result<String, AppError>;

    /// Removes `key`. A missing object is `Ok(false)`, not an error.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Recovers the storage key from a URL previously returned by `upload`.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// Stores objects as files below `root`; a reverse proxy serves them at `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::invalid(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        key: &str,
    ) -> Result<String, AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::UpstreamStorageFailure(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::UpstreamStorageFailure(e.to_string()))?;

        tracing::debug!("stored object {} ({})", key, content_type);
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("object {} was already gone", key);
                Ok(false)
            }
            Err(e) => Err(AppError::UpstreamStorageFailure(e.to_string())),
        }
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}
