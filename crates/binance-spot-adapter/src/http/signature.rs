/*
[INPUT]:  Canonical query-string bytes and the configured API secret
[OUTPUT]: Lowercase hex HMAC-SHA256 signature
[POS]:    HTTP layer - request signing for authenticated endpoints
[UPDATE]: When changing signing algorithm or signature encoding
*/

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// API key plus the secret used to sign requests.
///
/// The secret is kept only as HMAC key bytes and is redacted from `Debug`
/// output. Signatures are computed over the exact query-string bytes that go
/// on the wire; parameter order is part of the signed payload. The exchange
/// verifies the lowercase hex rendering, so the casing is a wire contract.
#[derive(Clone)]
pub struct Credential {
    api_key: String,
    secret: Box<[u8]>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Create a credential from an API key/secret pair.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into().into_bytes().into_boxed_slice(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a query string, returning the lowercase hex digest.
    pub fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
