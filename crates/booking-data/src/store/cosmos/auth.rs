//! Master-key request signing for the Cosmos DB REST API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::StoreError;

type HmacSha256 = Hmac<Sha256>;

/// Decoded account key used to sign requests.
#[derive(Clone)]
pub(super) struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Decodes a base64 account key.
    pub(super) fn decode(encoded: &str) -> Result<Self, StoreError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|error| StoreError::unauthorized(format!("account key is not base64: {error}")))?;
        if bytes.is_empty() {
            return Err(StoreError::unauthorized("account key must not be empty"));
        }
        Ok(Self { bytes })
    }

    /// Builds the URL-encoded `authorization` header value.
    ///
    /// `resource_link` is case-sensitive and carries no leading slash; the
    /// verb, resource type, and date are lower-cased before signing.
    pub(super) fn authorization(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> Result<String, StoreError> {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );
        let mut mac = HmacSha256::new_from_slice(&self.bytes)
            .map_err(|error| StoreError::internal(format!("signing key rejected: {error}")))?;
        mac.update(payload.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());
        let token = format!("type=master&ver=1.0&sig={signature}");
        Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Formats `now` as the RFC 1123 date expected in `x-ms-date`.
pub(super) fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
