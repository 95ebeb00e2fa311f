//! Report building for finished requests.
//!
//! Turns raw status, headers and body into a `HarnessReport`, including
//! binary detection for bodies that should not be printed as text.

use super::types::*;
use base64::Engine;
use std::collections::HashMap;
use std::time::Duration;

/// Determines if response body is likely binary based on content-type.
///
/// A missing content-type counts as text.
pub fn is_binary_content(content_type: Option<&str>) -> bool {
    let ct = match content_type {
        Some(ct) => ct.to_lowercase(),
        None => return false,
    };

    let text_types = [
        "text/",
        "application/json",
        "application/ld+json",
        "application/xml",
        "application/javascript",
        "application/x-www-form-urlencoded",
        "+json",
        "+xml",
    ];

    !text_types.iter().any(|t| ct.contains(t))
}

/// Canonical reason phrase for a status code.
pub fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}

/// Parameters for building a report from a completed exchange.
pub struct ReportParams {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body_bytes: Vec<u8>,
    pub final_url: String,
    pub elapsed: Duration,
    /// `error_for_status` message when the status was not a success
    pub status_error: Option<String>,
}

/// Builds a `HarnessReport` from a completed exchange.
///
/// Non-success statuses become a failure carrying the body as text.
pub fn build_report(params: ReportParams) -> HarnessReport {
    let ReportParams {
        status,
        headers,
        body_bytes,
        final_url,
        elapsed,
        status_error,
    } = params;

    if let Some(message) = status_error {
        return HarnessReport::status_error(
            message,
            status,
            String::from_utf8_lossy(&body_bytes).into_owned(),
        );
    }

    let content_type = headers.get("content-type").map(|s| s.as_str());
    let is_binary = is_binary_content(content_type);
    let size = body_bytes.len();

    let (body, body_base64) = if is_binary {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&body_bytes);
        (String::new(), Some(b64))
    } else {
        (String::from_utf8_lossy(&body_bytes).into_owned(), None)
    };

    HarnessReport::success(ResponseData {
        status,
        status_text: status_text(status),
        headers,
        body,
        body_base64,
        is_binary,
        size,
        url: final_url,
        elapsed: elapsed.as_millis() as u64,
    })
}
