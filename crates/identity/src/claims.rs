//! Token claims and the validation result

use serde::{Deserialize, Serialize};

/// Claims carried in a token payload.
///
/// `user_id` and `sub` identify the subject; `exp` is a unix timestamp in
/// seconds after which the token is no longer accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub sub: String,
    pub exp: i64,
}

/// Result of validating a token.
///
/// `valid == false` carries the reason in `error`; `user_id`/`username`
/// are only populated on success. This struct is also the wire shape of
/// the `/api/auth/validate` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenValidation {
    /// A successful validation for the given subject.
    pub fn ok(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            valid: true,
            user_id: Some(user_id),
            username: Some(username.into()),
            error: None,
        }
    }

    /// A failed validation with a reason.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            user_id: None,
            username: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims {
            user_id: 42,
            sub: "alice".to_string(),
            exp: 1_900_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 42);
        assert_eq!(json["sub"], "alice");
    }

    #[test]
    fn test_validation_ok() {
        let v = TokenValidation::ok(7, "bob");
        assert!(v.valid);
        assert_eq!(v.user_id, Some(7));
        assert!(v.error.is_none());
    }

    #[test]
    fn test_validation_invalid_has_no_subject() {
        let v = TokenValidation::invalid("expired");
        assert!(!v.valid);
        assert!(v.user_id.is_none());
        assert_eq!(v.error.as_deref(), Some("expired"));
    }
}
