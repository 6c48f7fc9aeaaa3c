//! The identity gate - token decomposition, claim checks, expiry

use crate::claims::{Claims, TokenValidation};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use tracing::trace;

/// Pluggable signature verification strategy.
///
/// Implementations receive the full token and the raw signing input
/// (`header.payload`) and decide whether the signature is acceptable.
pub trait SignatureVerifier: Send + Sync {
    /// Returns `None` when the signature is acceptable, or a rejection
    /// reason otherwise.
    fn verify(&self, signing_input: &str, signature: &str) -> Option<String>;
}

/// Accepts every signature without looking at it.
///
/// This is the default verifier. Tokens are trusted on the strength of
/// their payload alone, which is only defensible on a trusted network.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllSignatures;

impl SignatureVerifier for AcceptAllSignatures {
    fn verify(&self, _signing_input: &str, _signature: &str) -> Option<String> {
        None
    }
}

/// Decodes bearer tokens and reports validity.
///
/// Pure: no I/O, no state mutation. All failures are reported through the
/// returned [`TokenValidation`], never as an `Err`.
pub struct IdentityGate {
    verifier: Box<dyn SignatureVerifier>,
}

impl IdentityGate {
    /// Gate with the default accept-all verifier.
    pub fn new() -> Self {
        Self {
            verifier: Box::new(AcceptAllSignatures),
        }
    }

    /// Gate with a custom signature verifier.
    pub fn with_verifier(verifier: Box<dyn SignatureVerifier>) -> Self {
        Self { verifier }
    }

    /// Validate a token: structure, claims, signature policy, expiry.
    pub fn validate(&self, token: &str) -> TokenValidation {
        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(reason) => return TokenValidation::invalid(reason),
        };

        if claims.exp < Utc::now().timestamp() {
            return TokenValidation::invalid("Invalid or expired token");
        }

        trace!(user_id = claims.user_id, "token accepted");
        TokenValidation::ok(claims.user_id, claims.sub)
    }

    /// Validate a token and additionally require it to belong to
    /// `expected_user_id`.
    ///
    /// A subject mismatch is reported distinctly from an invalid token.
    pub fn validate_for_subject(&self, token: &str, expected_user_id: i64) -> TokenValidation {
        let result = self.validate(token);
        if !result.valid {
            return result;
        }
        if result.user_id != Some(expected_user_id) {
            return TokenValidation::invalid(format!(
                "Token does not belong to user {expected_user_id}"
            ));
        }
        result
    }

    /// Decode the claims out of a token without checking expiry.
    fn decode(&self, token: &str) -> Result<Claims, String> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err("Invalid token format".to_string());
        }

        if let Some(reason) = self
            .verifier
            .verify(&format!("{}.{}", parts[0], parts[1]), parts[2])
        {
            return Err(format!("Signature rejected: {reason}"));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(parts[1].trim_end_matches('='))
            .map_err(|_| "Invalid token payload encoding".to_string())?;

        serde_json::from_slice::<Claims>(&payload)
            .map_err(|_| "Token is missing required claims".to_string())
    }
}

impl Default for IdentityGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::mint_token;
    use chrono::Duration;

    #[test]
    fn test_valid_token() {
        let token = mint_token(42, "alice", Duration::hours(1));
        let result = IdentityGate::new().validate(&token);
        assert!(result.valid);
        assert_eq!(result.user_id, Some(42));
        assert_eq!(result.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_expired_token() {
        let token = mint_token(42, "alice", Duration::hours(-1));
        let result = IdentityGate::new().validate(&token);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Invalid or expired token"));
    }

    #[test]
    fn test_malformed_token() {
        let result = IdentityGate::new().validate("not-a-token");
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Invalid token format"));
    }

    #[test]
    fn test_garbage_payload() {
        let result = IdentityGate::new().validate("aGVhZA.!!!!.c2ln");
        assert!(!result.valid);
    }

    #[test]
    fn test_missing_claims() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"alice"}"#);
        let token = format!("aGVhZA.{payload}.c2ln");
        let result = IdentityGate::new().validate(&token);
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Token is missing required claims")
        );
    }

    #[test]
    fn test_subject_match() {
        let token = mint_token(7, "bob", Duration::hours(1));
        let gate = IdentityGate::new();
        assert!(gate.validate_for_subject(&token, 7).valid);
    }

    #[test]
    fn test_subject_mismatch_distinct_from_invalid() {
        let token = mint_token(7, "bob", Duration::hours(1));
        let gate = IdentityGate::new();
        let result = gate.validate_for_subject(&token, 8);
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Token does not belong to user 8")
        );
    }

    struct RejectAll;

    impl SignatureVerifier for RejectAll {
        fn verify(&self, _signing_input: &str, _signature: &str) -> Option<String> {
            Some("untrusted".to_string())
        }
    }

    #[test]
    fn test_custom_verifier_can_reject() {
        let token = mint_token(7, "bob", Duration::hours(1));
        let gate = IdentityGate::with_verifier(Box::new(RejectAll));
        let result = gate.validate(&token);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Signature rejected: untrusted"));
    }
}
