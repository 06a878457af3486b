//! Intake rules shared by every submission path

use crate::error::Result;
use crate::format::{self, DOCX_CONTENT_TYPE};

/// How a story payload is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    PlainText,
    Document,
}

impl PayloadKind {
    /// Kind for a request `Content-Type` (parameters ignored)
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "text/plain" => Some(PayloadKind::PlainText),
            DOCX_CONTENT_TYPE | "application/msword" => Some(PayloadKind::Document),
            _ => None,
        }
    }

    /// Kind for an attachment name: `.txt`, `.doc` or `.docx`
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".txt") {
            Some(PayloadKind::PlainText)
        } else if lower.ends_with(".doc") || lower.ends_with(".docx") {
            Some(PayloadKind::Document)
        } else {
            None
        }
    }

    /// Extension used for the stored raw payload
    pub fn extension(&self) -> &'static str {
        match self {
            PayloadKind::PlainText => ".txt",
            PayloadKind::Document => ".docx",
        }
    }

    /// Plain text carried by the payload
    pub fn extract_text(&self, payload: &[u8]) -> Result<String> {
        match self {
            PayloadKind::PlainText => Ok(String::from_utf8_lossy(payload).into_owned()),
            PayloadKind::Document => format::extract_text(payload),
        }
    }
}

/// Length in chars; must lie strictly between `min` and `max`
pub fn check_length(text: &str, min: usize, max: usize) -> std::result::Result<usize, String> {
    let chars = text.chars().count();
    if chars <= min || chars >= max {
        return Err(format!(
            "length must be between {} and {}, got {}",
            min, max, chars
        ));
    }
    Ok(chars)
}

/// File-system safe form of an identifier
pub fn safe_name(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `"story.docx"` -> `"story"`; names starting with the only dot are kept
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}
