//! Helper functions and utilities
//!
//! This module contains common input checks and formatting helpers used
//! throughout the application.

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w{2,})+$").expect("static email pattern")
    })
}

fn hex_color_regex() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| {
        Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
            .expect("static hex color pattern")
    })
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Password strength: at least 6 characters, one letter and one digit
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(|c| c.is_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Validate a hexadecimal color such as `#FFD700` or `#fff`
pub fn is_hex_color(color: &str) -> bool {
    hex_color_regex().is_match(color)
}

/// Treat empty or whitespace-only strings as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Random six digit verification number
pub fn generate_verify_number() -> u32 {
    rand::thread_rng().gen_range(100_000..1_000_000)
}

/// Round a rating average to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Lower-cased extension of a file name, if any
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Convert bytes to human readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email("ana@example"));
    }

    #[test]
    fn test_is_strong_password() {
        assert!(is_strong_password("abc123"));
        assert!(!is_strong_password("abcdef"));
        assert!(!is_strong_password("123456"));
        assert!(!is_strong_password("a1"));
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#FFD700"));
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("000000"));
        assert!(!is_hex_color("#GGGGGG"));
        assert!(!is_hex_color("red"));
        assert!(!is_hex_color("#12345"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Conf ".into())), Some("Conf".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_verify_number_range() {
        for _ in 0..100 {
            let n = generate_verify_number();
            assert!((100_000..1_000_000).contains(&n));
        }
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(4.25), 4.3);
        assert_eq!(round_one_decimal(3.0), 3.0);
        assert_eq!(round_one_decimal(11.0 / 3.0), 3.7);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("README"), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_bytes(500), "500 B");
    }
}
