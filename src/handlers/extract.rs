//! Request extractors whose rejections use the API error body

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::models::{FileType, UploadFileFields};
use crate::services::UploadedFile;
use crate::utils::errors::{EventHubError, Result};

/// `axum::Json` rejecting malformed bodies with `{"message"}` and 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(EventHubError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` rejecting malformed ids with `{"message"}` and 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(EventHubError))]
pub struct PathParams<T>(pub T);

/// A fully read multipart body: file parts by field name plus text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<(String, UploadedFile)>,
    text: HashMap<String, String>,
}

/// Non-multipart requests are rejected with `{"message"}` and 400
#[async_trait]
impl<S: Send + Sync> FromRequest<S> for UploadForm {
    type Rejection = EventHubError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = Multipart::from_request(req, state).await?;
        Self::read(multipart).await
    }
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await?.to_vec();
                    debug!(field = %name, file_name = %file_name, size = data.len(), "Received upload part");
                    form.files.push((
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            data,
                        },
                    ));
                }
                None => {
                    let value = field.text().await?;
                    form.text.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// The single file sent as `field`
    pub fn take_file(&mut self, field: &str) -> Result<UploadedFile> {
        let index = self
            .files
            .iter()
            .position(|(name, _)| name == field)
            .ok_or_else(|| EventHubError::validation(format!("Please upload a file in the '{}' field", field)))?;
        Ok(self.files.remove(index).1)
    }

    /// Every file sent as `field`
    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (matching, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(name, _)| name == field);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    /// Text fields accompanying a generic file upload
    pub fn file_fields(&self) -> Result<UploadFileFields> {
        let file_type = self
            .text("type")
            .map(|raw| {
                serde_json::from_value::<FileType>(serde_json::Value::String(raw.to_lowercase()))
                    .map_err(|_| EventHubError::validation("Type must be image, document, video or other"))
            })
            .transpose()?;
        let target = self
            .text("target")
            .map(|raw| {
                Uuid::parse_str(raw.trim()).map_err(|_| EventHubError::validation("Target must be a valid id"))
            })
            .transpose()?;

        Ok(UploadFileFields {
            title: self.text("title").map(str::to_string),
            description: self.text("description").map(str::to_string),
            file_type,
            target,
            target_model: self.text("targetModel").map(str::to_string),
        })
    }
}
