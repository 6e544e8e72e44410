//! Uploaded file metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::target::TargetRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Image,
    Document,
    Video,
    Other,
}

impl FileType {
    /// Classify an upload from its MIME type
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            FileType::Image
        } else if mime == "application/pdf" {
            FileType::Document
        } else if mime.starts_with("video/") {
            FileType::Video
        } else {
            FileType::Other
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    /// Public URL of the stored object
    pub location: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub owner: Uuid,
    #[serde(flatten)]
    pub target: Option<TargetRef>,
    pub public_id: String,
    #[serde(default)]
    pub size: u64,
    pub format: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
    pub target: Option<Uuid>,
    pub target_model: Option<String>,
}

/// Text fields accompanying a multipart upload
#[derive(Debug, Clone, Default)]
pub struct UploadFileFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_type: Option<FileType>,
    pub target: Option<Uuid>,
    pub target_model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    #[serde(flatten)]
    pub file: FileRecord,
    pub owner_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_mime() {
        assert_eq!(FileType::from_mime("image/png"), FileType::Image);
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Document);
        assert_eq!(FileType::from_mime("video/mp4"), FileType::Video);
        assert_eq!(FileType::from_mime("application/zip"), FileType::Other);
    }

    #[test]
    fn test_untargeted_file_round_trips_without_target() {
        let file = FileRecord {
            id: Uuid::new_v4(),
            location: "http://localhost/uploads/files/a.pdf".into(),
            title: None,
            description: None,
            file_type: FileType::Document,
            owner: Uuid::new_v4(),
            target: None,
            public_id: "files/a.pdf".into(),
            size: 10,
            format: Some("pdf".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&file).unwrap();
        assert!(value.get("targetModel").is_none());

        let back: FileRecord = serde_json::from_value(value).unwrap();
        assert!(back.target.is_none());
    }
}
