//! Object storage service
//!
//! Uploaded images and documents are handed to an [`ObjectStore`], which
//! returns the public URL recorded on the owning entity. The default
//! implementation writes to the local filesystem.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config::{StorageConfig, UploadLimits};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{file_extension, format_bytes, sanitize_filename};

/// Storage folders
pub mod folders {
    pub const LOGOS: &str = "logos";
    pub const EVENTS: &str = "events";
    pub const GALLERY: &str = "gallery";
    pub const DOCUMENTS: &str = "documents";
    pub const FILES: &str = "files";
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];
const FILE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];

/// One file received in a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Extension from the file name, falling back to the MIME subtype
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.file_name).or_else(|| {
            self.content_type
                .split_once('/')
                .map(|(_, subtype)| subtype.to_lowercase())
                .filter(|subtype| !subtype.is_empty())
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Where an upload goes and what it may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Logo,
    EventImage,
    Photo,
    Document,
    File,
}

impl UploadKind {
    pub fn folder(&self) -> &'static str {
        match self {
            UploadKind::Logo => folders::LOGOS,
            UploadKind::EventImage => folders::EVENTS,
            UploadKind::Photo => folders::GALLERY,
            UploadKind::Document => folders::DOCUMENTS,
            UploadKind::File => folders::FILES,
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Logo | UploadKind::EventImage | UploadKind::Photo => IMAGE_EXTENSIONS,
            UploadKind::Document => DOCUMENT_EXTENSIONS,
            UploadKind::File => FILE_EXTENSIONS,
        }
    }

    pub fn max_bytes(&self, limits: &UploadLimits) -> usize {
        match self {
            UploadKind::Logo => limits.logo_max_bytes,
            UploadKind::EventImage | UploadKind::Photo => limits.photo_max_bytes,
            UploadKind::Document | UploadKind::File => limits.file_max_bytes,
        }
    }

    /// Reject files with a disallowed extension or over the size limit
    pub fn validate(&self, file: &UploadedFile, limits: &UploadLimits) -> Result<()> {
        let allowed = self.allowed_extensions();
        match file.extension() {
            Some(ext) if allowed.contains(&ext.as_str()) => {}
            _ => {
                return Err(EventHubError::validation(format!(
                    "Unsupported file type. Allowed: {}",
                    allowed.join(", ")
                )))
            }
        }

        let max = self.max_bytes(limits);
        if file.data.len() > max {
            return Err(EventHubError::validation(format!(
                "File too large. Maximum size is {}",
                format_bytes(max as u64)
            )));
        }

        Ok(())
    }
}

/// Stored object descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
    pub size: u64,
    pub format: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn store(&self, folder: &str, file: &UploadedFile) -> Result<StoredObject>;

    /// Remove a stored object. Returns whether it existed.
    async fn delete(&self, public_id: &str) -> Result<bool>;
}

/// Filesystem-backed object store
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    /// Create a new LocalObjectStore
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let base_url = Url::parse(&config.public_base_url)?;
        Ok(Self {
            root: PathBuf::from(&config.upload_dir),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `public_id` under the root, refusing anything that escapes it
    fn resolve(&self, public_id: &str) -> Result<PathBuf> {
        let relative = Path::new(public_id);
        if relative.components().all(|c| matches!(c, Component::Normal(_))) {
            Ok(self.root.join(relative))
        } else {
            Err(EventHubError::validation(format!("Invalid object id: {}", public_id)))
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn store(&self, folder: &str, file: &UploadedFile) -> Result<StoredObject> {
        let format = file.extension();
        let name = match &format {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), sanitize_filename(ext)),
            None => Uuid::new_v4().to_string(),
        };
        let public_id = format!("{}/{}", folder, name);
        let path = self.resolve(&public_id)?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, &file.data).await?;

        info!(
            public_id = %public_id,
            original = %file.file_name,
            size = %format_bytes(file.size()),
            "Stored uploaded object"
        );

        Ok(StoredObject {
            url: format!("{}/{}", self.base_url, public_id),
            public_id,
            size: file.size(),
            format,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<bool> {
        let path = self.resolve(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(public_id = %public_id, "Deleted stored object");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(EventHubError::ObjectStorage(format!("Failed to delete {}: {}", public_id, e))),
        }
    }
}
