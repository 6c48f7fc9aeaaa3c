//! Token minting for local deployments and tests
//!
//! Produces tokens the gate can decode. The signature part is a sha256
//! digest of the signing input, NOT a cryptographic signature; the gate
//! never verifies it.

use crate::claims::Claims;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

/// Mint a token for `user_id`/`username` that expires after `ttl`.
pub fn mint_token(user_id: i64, username: &str, ttl: Duration) -> String {
    let claims = Claims {
        user_id,
        sub: username.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    // Claims serialization cannot fail: plain integers and a string.
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());

    let signing_input = format!("{header}.{payload}");
    let digest = Sha256::digest(signing_input.as_bytes());
    let signature = hex::encode(digest);

    format!("{signing_input}.{signature}")
}
