//! Transaction model and request validation

use crate::error::TransactionError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tally_core::Amount;

/// Category name that counts as a credit when computing a balance.
pub const INCOME_CATEGORY: &str = "INCOME";

/// Lifecycle of a recorded transaction. There is no pending or failed
/// state: a transaction exists once it is durably recorded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
}

/// A recorded transaction. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: Amount,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub status: TransactionStatus,
}

/// Incoming request to record a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub user_id: i64,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionRequest {
    /// Field validation. Nothing is persisted for an invalid request.
    pub fn validate(&self) -> Result<Amount, TransactionError> {
        if self.user_id <= 0 {
            return Err(TransactionError::Validation(
                "userId is required".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(TransactionError::Validation(
                "category is required".to_string(),
            ));
        }
        let amount = Amount::new(self.amount).map_err(|_| {
            TransactionError::Validation("amount must be a positive number".to_string())
        })?;
        if !amount.is_positive() {
            return Err(TransactionError::Validation(
                "amount must be a positive number".to_string(),
            ));
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> TransactionRequest {
        TransactionRequest {
            user_id: 1,
            amount: dec!(25),
            category: "food".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert_eq!(request().validate().unwrap().value(), dec!(25));
    }

    #[test]
    fn test_missing_user() {
        let mut r = request();
        r.user_id = 0;
        assert!(matches!(
            r.validate(),
            Err(TransactionError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_category() {
        let mut r = request();
        r.category = "  ".to_string();
        assert!(matches!(
            r.validate(),
            Err(TransactionError::Validation(_))
        ));
    }

    #[test]
    fn test_non_positive_amount() {
        let mut r = request();
        r.amount = dec!(0);
        assert!(r.validate().is_err());
        r.amount = dec!(-5);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_request_wire_names() {
        let json = serde_json::json!({
            "userId": 4,
            "amount": 12.5,
            "category": "fuel",
            "description": "diesel"
        });
        let r: TransactionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(r.user_id, 4);
        assert_eq!(r.amount, dec!(12.5));
    }
}
