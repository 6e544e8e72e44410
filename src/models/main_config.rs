//! Application-wide branding configuration (singleton)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainConfig {
    pub id: Uuid,
    #[serde(default)]
    pub logo: String,
    pub title: String,
    pub subtitle: String,
    pub welcome: String,
    pub info_color: String,
    pub bg_color: String,
    pub link_color: String,
    pub btn_color: String,
    pub sec_color: String,
    pub star_color: String,
    pub company: String,
    pub info_mail: String,
    pub info_phone: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl MainConfig {
    pub fn with_defaults(id: Uuid, changed_by: Option<Uuid>) -> Self {
        let mut audit = AuditFields::default();
        audit.changed_by = changed_by;

        Self {
            id,
            logo: String::new(),
            title: "Event App".to_string(),
            subtitle: "Gestión de eventos".to_string(),
            welcome: "Bienvenido a Event App".to_string(),
            info_color: "#000000".to_string(),
            bg_color: "#FFFFFF".to_string(),
            link_color: "#0000FF".to_string(),
            btn_color: "#007BFF".to_string(),
            sec_color: "#6C757D".to_string(),
            star_color: "#FFD700".to_string(),
            company: "Mi Empresa".to_string(),
            info_mail: "info@miempresa.com".to_string(),
            info_phone: "+1234567890".to_string(),
            created_at: Utc::now(),
            audit,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMainConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btn_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sec_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_mail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_phone: Option<String>,
}

impl UpdateMainConfigRequest {
    /// Color fields paired with their wire names
    pub fn colors(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("infoColor", self.info_color.as_deref()),
            ("bgColor", self.bg_color.as_deref()),
            ("linkColor", self.link_color.as_deref()),
            ("btnColor", self.btn_color.as_deref()),
            ("secColor", self.sec_color.as_deref()),
            ("starColor", self.star_color.as_deref()),
        ]
    }
}
