//! HTTP client for third-party witness attestations.
//!
//! A witness is a third party that, given a digest, attests it observed that
//! digest at a point in time. This crate only speaks the wire protocol; it
//! carries no opinion on which witnesses to trust (see
//! [`originals_infosec::WitnessProof`] for the attestation's shape and the
//! `require_witness_signatures` verification option).

use std::time::Duration;

use originals_codec::DigestMultibase;
use originals_infosec::WitnessProof;
use serde::Serialize;
use thiserror::Error;

/// The fields an honest witness response must carry as strings, beyond the
/// ones `WitnessProof`'s `Deserialize` impl already requires.
const REQUIRED_STRING_FIELDS: &[&str] =
    &["type", "cryptosuite", "created", "verificationMethod", "proofPurpose", "proofValue", "witnessedAt"];

/// Errors raised while requesting a witness attestation.
#[derive(Debug, Error)]
pub enum HttpWitnessError {
    /// The witness returned a non-2xx status.
    #[error("witness at {url} returned status {status_code}: {body}")]
    Status {
        /// The witness endpoint.
        url: String,
        /// The HTTP status code.
        status_code: u16,
        /// The response body, for diagnostics.
        body: String,
    },

    /// The witness's response was not a well-formed attestation.
    #[error("witness at {url} returned a malformed attestation: {reason}")]
    MalformedResponse {
        /// The witness endpoint.
        url: String,
        /// What was wrong with the response.
        reason: String,
    },

    /// The request could not be completed (network error, timeout, DNS
    /// failure, ...).
    #[error("request to witness at {url} failed: {cause}")]
    Request {
        /// The witness endpoint.
        url: String,
        /// The underlying transport error.
        cause: String,
    },
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, HttpWitnessError>;

/// Options controlling a witness request.
#[derive(Debug, Clone)]
pub struct WitnessOptions {
    /// Request timeout. Defaults to 10 seconds.
    pub timeout: Duration,
    /// Additional headers to send, e.g. an API key.
    pub extra_headers: Vec<(String, String)>,
}

impl Default for WitnessOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), extra_headers: Vec::new() }
    }
}

#[derive(Debug, Serialize)]
struct WitnessRequest<'a> {
    digest: &'a str,
}

/// Request a witness attestation over `digest` from `witness_url`.
///
/// # Errors
/// [`HttpWitnessError::Request`] on a network failure, timeout, or DNS
/// error; [`HttpWitnessError::Status`] on a non-2xx response;
/// [`HttpWitnessError::MalformedResponse`] if the response body is not valid
/// JSON or is missing a required attestation field.
pub async fn witness(
    witness_url: &str,
    digest: &DigestMultibase,
    opts: &WitnessOptions,
) -> Result<WitnessProof> {
    let client = reqwest::Client::builder()
        .timeout(opts.timeout)
        .build()
        .map_err(|e| HttpWitnessError::Request { url: witness_url.to_string(), cause: e.to_string() })?;

    let mut request = client
        .post(witness_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&WitnessRequest { digest: digest.as_str() });

    for (name, value) in &opts.extra_headers {
        request = request.header(name, value);
    }

    let response = request.send().await.map_err(|e| {
        tracing::warn!(url = witness_url, error = %e, "witness request failed");
        HttpWitnessError::Request { url: witness_url.to_string(), cause: e.to_string() }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpWitnessError::Status {
            url: witness_url.to_string(),
            status_code: status.as_u16(),
            body,
        });
    }

    let body = response.text().await.map_err(|e| HttpWitnessError::Request {
        url: witness_url.to_string(),
        cause: e.to_string(),
    })?;

    let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
        HttpWitnessError::MalformedResponse { url: witness_url.to_string(), reason: e.to_string() }
    })?;

    let object = value.as_object().ok_or_else(|| HttpWitnessError::MalformedResponse {
        url: witness_url.to_string(),
        reason: "response is not a JSON object".to_string(),
    })?;

    for field in REQUIRED_STRING_FIELDS {
        if !object.get(*field).is_some_and(serde_json::Value::is_string) {
            return Err(HttpWitnessError::MalformedResponse {
                url: witness_url.to_string(),
                reason: format!("missing or non-string field {field:?}"),
            });
        }
    }

    serde_json::from_value(value).map_err(|e| HttpWitnessError::MalformedResponse {
        url: witness_url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(WitnessOptions::default().timeout, Duration::from_secs(10));
    }

    #[test]
    fn required_fields_cover_witness_proof_shape() {
        assert!(REQUIRED_STRING_FIELDS.contains(&"witnessedAt"));
        assert!(REQUIRED_STRING_FIELDS.contains(&"proofValue"));
    }
}
