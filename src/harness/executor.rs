//! Smoke request execution.
//!
//! Builds one request from a `TestRequest`, sends it through the target's
//! proxy with basic auth, and folds every outcome into a `HarnessReport`.

use super::report::{build_report, ReportParams};
use super::types::*;
use crate::error::HarnessError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use std::{collections::HashMap, str::FromStr, time::Instant};

/// Content type for JSON bodies without an explicit one.
const DEFAULT_JSON_CONTENT_TYPE: &str = "application/json";

/// Joins `path` onto `base_url`.
///
/// An absolute `path` with a host replaces the base entirely.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<url::Url, HarnessError> {
    if let Ok(absolute) = url::Url::parse(path) {
        if absolute.has_host() {
            return Ok(absolute);
        }
    }

    let joined = if path.is_empty() {
        base_url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };

    let parsed = url::Url::parse(&joined)
        .map_err(|e| HarnessError::InvalidUrl(format!("{} for {}", e, joined)))?;
    if parsed.host_str().is_none() {
        return Err(HarnessError::InvalidUrl(format!("URL has no host: {}", joined)));
    }
    Ok(parsed)
}

/// Builds a client for one target.
fn build_client(target: &ApiTarget) -> Result<reqwest::Client, HarnessError> {
    let builder = reqwest::Client::builder();

    let builder = match target.proxy.as_deref() {
        Some(proxy) => builder.proxy(
            reqwest::Proxy::http(proxy)
                .map_err(|e| HarnessError::InvalidProxy(format!("{}: {}", proxy, e)))?,
        ),
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

fn build_header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (HeaderName::from_str(key), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = %key, "Skipping invalid header"),
        }
    }
    map
}

/// Serializes the body onto the builder.
///
/// Attachments are read here, so a missing file fails before anything is sent.
async fn apply_body(
    builder: reqwest::RequestBuilder,
    body: RequestBody,
    has_content_type: bool,
) -> Result<reqwest::RequestBuilder, HarnessError> {
    match body {
        RequestBody::Empty => Ok(builder),
        RequestBody::Json {
            payload,
            content_type,
        } => {
            let text = serde_json::to_string(&payload)?;
            let builder = if has_content_type {
                builder
            } else {
                builder.header(
                    CONTENT_TYPE,
                    content_type.as_deref().unwrap_or(DEFAULT_JSON_CONTENT_TYPE),
                )
            };
            Ok(builder.body(text))
        }
        RequestBody::Multipart { fields, files } => {
            let mut form = Form::new();
            for (name, value) in fields {
                form = form.text(name, value);
            }

            for file in files {
                let bytes = tokio::fs::read(&file.path)
                    .await
                    .map_err(|source| HarnessError::Attachment {
                        path: file.path.clone(),
                        source,
                    })?;
                tracing::debug!(
                    field = %file.field,
                    path = %file.path.display(),
                    size = bytes.len(),
                    "Attaching file"
                );
                let part = Part::bytes(bytes)
                    .file_name(file.resolved_file_name())
                    .mime_str(&file.resolved_mime_type())?;
                form = form.part(file.field, part);
            }

            Ok(builder.multipart(form))
        }
    }
}

async fn send(target: &ApiTarget, request: TestRequest) -> Result<HarnessReport, HarnessError> {
    let url = endpoint_url(&target.base_url, &request.path)?;
    let client = build_client(target)?;

    tracing::debug!(
        method = request.method.as_str(),
        url = %url,
        proxy = ?target.proxy,
        "Sending smoke request"
    );

    let headers = build_header_map(&request.headers);
    let has_content_type = headers.contains_key(CONTENT_TYPE);

    let mut builder = client.request(request.method.into(), url).headers(headers);
    if let Some(credentials) = &target.credentials {
        builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
    }
    let builder = apply_body(builder, request.body, has_content_type).await?;

    let started = Instant::now();
    let response = builder.send().await?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let status_error = response.error_for_status_ref().err().map(|e| e.to_string());
    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    // A failed status is already known; a broken body must not hide it.
    let body_bytes = match response.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) if status_error.is_some() => {
            tracing::warn!(status, error = %e, "Failed to read error body");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(build_report(ReportParams {
        status,
        headers,
        body_bytes,
        final_url,
        elapsed: started.elapsed(),
        status_error,
    }))
}

/// Execute one smoke request.
///
/// Never fails: transport, local and status errors all come back as a
/// failure report.
pub async fn execute_request(target: &ApiTarget, request: TestRequest) -> HarnessReport {
    let report = match send(target, request).await {
        Ok(report) => report,
        Err(e) => HarnessReport::from(e),
    };

    if report.success {
        tracing::debug!("Request succeeded");
    } else if let Some(ref error) = report.error {
        tracing::warn!(code = %error.code, status = ?error.status, message = %error.message, "Request failed");
    }

    report
}
