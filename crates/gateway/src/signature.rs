//! MeSomb request signing.
//!
//! Requests are signed with an AWS-style canonical request hashed with SHA-1
//! and authenticated with HMAC-SHA1 over the secret key:
//!
//! ```text
//! canonical = METHOD \n path \n query \n headers \n signed_headers \n sha1(body)
//! to_sign   = HMAC-SHA1 \n timestamp \n scope \n sha1(canonical)
//! scope     = YYYYMMDD/payment/mesomb_request
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::Url;
use sha1::{Digest, Sha1};
use tandem_core::payout::PayoutError;

type HmacSha1 = Hmac<Sha1>;

const ALGORITHM: &str = "HMAC-SHA1";
const SERVICE: &str = "payment";

/// Headers and authorization computed for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Value of `X-MeSomb-Date`.
    pub timestamp: String,
    /// Value of `X-MeSomb-Nonce`.
    pub nonce: String,
    /// Value of `Authorization`.
    pub authorization: String,
}

/// Signs requests with an access/secret key pair.
#[derive(Clone)]
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Creates a signer.
    #[must_use]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Signs a JSON request sent now with a fresh nonce.
    ///
    /// # Errors
    ///
    /// Returns `PayoutError::Transport` if the secret key cannot key the MAC.
    pub fn sign_now(
        &self,
        method: &str,
        url: &Url,
        body: &str,
    ) -> Result<SignedRequest, PayoutError> {
        self.sign(method, url, body, Utc::now(), &nonce())
    }

    /// Signs a JSON request for the given instant and nonce.
    ///
    /// # Errors
    ///
    /// Returns `PayoutError::Transport` if the secret key cannot key the MAC.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        body: &str,
        at: DateTime<Utc>,
        nonce: &str,
    ) -> Result<SignedRequest, PayoutError> {
        let timestamp = at.timestamp().to_string();

        let mut headers = BTreeMap::new();
        headers.insert("content-type", "application/json".to_string());
        headers.insert("host", host(url));
        headers.insert("x-mesomb-date", timestamp.clone());
        headers.insert("x-mesomb-nonce", nonce.to_string());

        let canonical_headers = headers
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join("\n");
        let signed_headers = headers.keys().copied().collect::<Vec<_>>().join(";");

        let canonical_request = [
            method,
            url.path(),
            url.query().unwrap_or(""),
            canonical_headers.as_str(),
            signed_headers.as_str(),
            sha1_hex(body).as_str(),
        ]
        .join("\n");

        let scope = format!("{}/{SERVICE}/mesomb_request", at.format("%Y%m%d"));
        let string_to_sign = [
            ALGORITHM,
            timestamp.as_str(),
            scope.as_str(),
            sha1_hex(&canonical_request).as_str(),
        ]
        .join("\n");

        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| PayoutError::Transport(format!("Invalid HMAC secret: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedRequest {
            timestamp,
            nonce: nonce.to_string(),
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.access_key
            ),
        })
    }
}

/// `scheme://host[:port]`, the port only when it is not the scheme default.
fn host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

fn sha1_hex(data: &str) -> String {
    hex::encode(Sha1::digest(data.as_bytes()))
}

fn nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_signature_matches_reference_vector() {
        let signer = RequestSigner::new("access", "secret");
        let url = Url::parse("https://mesomb.hachther.com/en/api/v1.1/payment/deposit/").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let signed = signer
            .sign("POST", &url, r#"{"amount":1000}"#, at, "abc123")
            .unwrap();

        assert_eq!(signed.timestamp, "1767225600");
        assert_eq!(signed.nonce, "abc123");
        assert_eq!(
            signed.authorization,
            "HMAC-SHA1 Credential=access/20260101/payment/mesomb_request, \
             SignedHeaders=content-type;host;x-mesomb-date;x-mesomb-nonce, \
             Signature=e8e376453cd374a12aa6b6e41b06a5a0d2675b0d"
        );
    }

    #[test]
    fn test_body_changes_signature() {
        let signer = RequestSigner::new("access", "secret");
        let url = Url::parse("https://mesomb.hachther.com/en/api/v1.1/payment/deposit/").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let a = signer.sign("POST", &url, r#"{"amount":1000}"#, at, "n").unwrap();
        let b = signer.sign("POST", &url, r#"{"amount":1001}"#, at, "n").unwrap();

        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn test_host_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:8089/en/api/v1.1/payment/deposit/").unwrap();
        assert_eq!(host(&url), "http://127.0.0.1:8089");

        let url = Url::parse("https://mesomb.hachther.com:443/x").unwrap();
        assert_eq!(host(&url), "https://mesomb.hachther.com");
    }

    #[test]
    fn test_nonce_is_random_alphanumeric() {
        let a = nonce();
        let b = nonce();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
