//! Types returned by object storage operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifetime of every signed retrieval URL handed to clients (48 hours).
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Receipt for an object durably written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Storage key, `{namespace}/{token}-{sanitized filename}`.
    pub key: String,
    /// Public URL downstream stages fetch the bytes from.
    pub public_url: String,
    /// Number of bytes written.
    pub size_bytes: u64,
}

/// A time-boxed capability to read one storage key.
///
/// Grants are plain signed URLs: they are not recorded anywhere and cannot be
/// revoked before they expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrlGrant {
    pub key: String,
    pub url: String,
    pub expires_in_secs: u64,
    pub expires_at: DateTime<Utc>,
}

impl SignedUrlGrant {
    /// Build a grant issued now that expires after `ttl`.
    pub fn issued_now(key: impl Into<String>, url: impl Into<String>, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        let expires_at = issued_at
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            key: key.into(),
            url: url.into(),
            expires_in_secs: ttl.as_secs(),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_url_ttl_is_48_hours() {
        assert_eq!(SIGNED_URL_TTL.as_secs(), 172_800);
    }

    #[test]
    fn test_grant_expiry_matches_ttl() {
        let before = Utc::now();
        let grant = SignedUrlGrant::issued_now("demo/a.mp4", "https://x", SIGNED_URL_TTL);
        let after = Utc::now();

        assert_eq!(grant.expires_in_secs, 172_800);
        assert!(grant.expires_at >= before + chrono::Duration::hours(48));
        assert!(grant.expires_at <= after + chrono::Duration::hours(48));
    }
}
