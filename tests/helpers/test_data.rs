//! Test data helpers for request bodies and multipart uploads

#![allow(dead_code)]

use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

/// Satisfies the password strength rule
pub const TEST_PASSWORD: &str = "secret123";

/// Smallest payload accepted as a PNG by extension
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// A unique, valid email derived from `name`
pub fn test_email(name: &str) -> String {
    let slug: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    format!("{}.{}@example.com", slug, &Uuid::new_v4().simple().to_string()[..8])
}

/// Body for `POST /events`
pub fn event_body(is_public: bool) -> Value {
    let title: String = CompanyName().fake();
    let description: String = Sentence(3..8).fake();
    json!({
        "title": format!("{} Festival", title),
        "description": description,
        "place": "Main hall",
        "dateStart": "2026-11-20",
        "timeStart": "10:00",
        "isPublic": is_public,
        "infoColor": "#123abc",
    })
}

/// Body for `POST /events/:id/activities`
pub fn activity_body(title: &str, seats: i64) -> Value {
    json!({
        "title": title,
        "place": "Room A",
        "date": "2026-11-20",
        "time": "11:00",
        "seats": seats,
    })
}

/// Body for `POST /tickets`
pub fn ticket_body(event: Uuid, user: Uuid, activities: &[Uuid]) -> Value {
    json!({
        "title": "General admission",
        "event": event,
        "user": user,
        "type": 1,
        "price": 25.0,
        "activities": activities,
    })
}

/// Hand-built `multipart/form-data` body
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("eventhub-test-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content type header value and the encoded body
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (format!("multipart/form-data; boundary={}", self.boundary), self.body)
    }
}
