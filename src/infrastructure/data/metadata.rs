// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::constants::{
    DATA_URI_JSON, DATA_URI_JSON_BASE64, DATA_URI_JSON_UTF8, DEFAULT_METADATA_TIMEOUT_MS,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Resolves a metadata document reference (inline `data:` URI or http(s) link)
/// to its JSON body.
#[derive(Clone, Debug)]
pub struct DocumentResolver {
    client: Client,
}

impl DocumentResolver {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Metadata HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self, AppError> {
        Self::new(Duration::from_millis(DEFAULT_METADATA_TIMEOUT_MS))
    }

    pub async fn resolve(&self, reference: &str) -> Result<Value, AppError> {
        let reference = reference.trim();
        if reference.starts_with("data:") {
            return decode_inline(reference);
        }
        if reference.starts_with("https://") || reference.starts_with("http://") {
            return self.fetch(reference).await;
        }
        Err(AppError::malformed(
            "unsupported document reference",
            reference,
        ))
    }

    async fn fetch(&self, url: &str) -> Result<Value, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("Metadata fetch {}: {}", url, e)))?;
        if !resp.status().is_success() {
            return Err(AppError::Connection(format!(
                "Metadata fetch {} responded with {}",
                url,
                resp.status().as_u16()
            )));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| AppError::Connection(format!("Metadata body {}: {}", url, e)))?;
        parse_json(&body)
    }
}

/// Decode an inline `data:application/json` document. Plain payloads are
/// percent-decoded (RFC 2397); `;utf8,` payloads are taken verbatim.
pub fn decode_inline(reference: &str) -> Result<Value, AppError> {
    if let Some(encoded) = reference.strip_prefix(DATA_URI_JSON_BASE64) {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::malformed(format!("invalid base64 payload: {}", e), reference))?;
        let body = String::from_utf8(bytes)
            .map_err(|e| AppError::malformed(format!("payload is not utf-8: {}", e), reference))?;
        return parse_json(&body);
    }
    if let Some(body) = reference.strip_prefix(DATA_URI_JSON_UTF8) {
        return parse_json(body);
    }
    if let Some(encoded) = reference.strip_prefix(DATA_URI_JSON) {
        let body = urlencoding::decode(encoded)
            .map_err(|e| AppError::malformed(format!("invalid percent-encoding: {}", e), reference))?;
        return parse_json(&body);
    }
    Err(AppError::malformed("unsupported data URI media type", reference))
}

fn parse_json(body: &str) -> Result<Value, AppError> {
    serde_json::from_str(body)
        .map_err(|e| AppError::malformed(format!("invalid JSON document: {}", e), body))
}
