//! Uploads compressed artifacts and mints public links.

use std::{error::Error as StdError, path::Path, sync::Arc};

use {async_trait::async_trait, tokio::sync::Mutex, tracing::info};

pub const DEFAULT_LINK_HOST: &str = "drive.google.com";

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{message}")]
    Message { message: String },
}

impl StorageError {
    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Folder-organized cloud storage with public sharing.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Id of a non-trashed folder named exactly `name`, if one exists.
    async fn find_folder(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Create a folder and return its id.
    async fn create_folder(&self, name: &str) -> Result<String, StorageError>;

    /// Upload a PDF into `folder_id` and return the new object's id.
    async fn upload_pdf(
        &self,
        path: &Path,
        filename: &str,
        folder_id: &str,
    ) -> Result<String, StorageError>;

    /// Make the object readable by anyone holding the link.
    async fn share_publicly(&self, file_id: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("publish failed: resolving folder {folder:?}: {source}")]
    Folder {
        folder: String,
        #[source]
        source: StorageError,
    },

    #[error("publish failed: uploading {filename:?}: {source}")]
    Upload {
        filename: String,
        #[source]
        source: StorageError,
    },

    #[error("publish failed: sharing {file_id}: {source}")]
    Share {
        file_id: String,
        #[source]
        source: StorageError,
    },
}

/// A shareable link to a published artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedLink {
    pub url: String,
    pub file_id: String,
    pub folder_id: String,
    pub folder_name: String,
}

/// Places artifacts into per-requester folders and shares them.
pub struct Publisher {
    storage: Arc<dyn Storage>,
    link_host: String,
    // Serializes lookup-or-create so concurrent first-time requests in this
    // process cannot create duplicate folders.
    folder_lock: Mutex<()>,
}

impl Publisher {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_link_host(storage, DEFAULT_LINK_HOST)
    }

    pub fn with_link_host(storage: Arc<dyn Storage>, link_host: impl Into<String>) -> Self {
        Self {
            storage,
            link_host: link_host.into(),
            folder_lock: Mutex::new(()),
        }
    }

    pub async fn publish(
        &self,
        artifact: &Path,
        filename: &str,
        folder_name: &str,
    ) -> Result<PublishedLink, PublishError> {
        let folder_id =
            self.resolve_folder(folder_name)
                .await
                .map_err(|source| PublishError::Folder {
                    folder: folder_name.to_string(),
                    source,
                })?;

        let file_id = self
            .storage
            .upload_pdf(artifact, filename, &folder_id)
            .await
            .map_err(|source| PublishError::Upload {
                filename: filename.to_string(),
                source,
            })?;

        self.storage
            .share_publicly(&file_id)
            .await
            .map_err(|source| PublishError::Share {
                file_id: file_id.clone(),
                source,
            })?;

        let url = view_link(&self.link_host, &file_id);
        info!(file_id = %file_id, folder = %folder_name, "artifact published");

        Ok(PublishedLink {
            url,
            file_id,
            folder_id,
            folder_name: folder_name.to_string(),
        })
    }

    async fn resolve_folder(&self, name: &str) -> Result<String, StorageError> {
        let _guard = self.folder_lock.lock().await;
        if let Some(id) = self.storage.find_folder(name).await? {
            return Ok(id);
        }
        let id = self.storage.create_folder(name).await?;
        info!(folder = %name, folder_id = %id, "created destination folder");
        Ok(id)
    }
}

/// Canonical view URL for a stored object.
pub fn view_link(host: &str, file_id: &str) -> String {
    format!("https://{host}/file/d/{file_id}/view")
}
