//! Alert levels for remaining budget headroom

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Classification of remaining headroom after a hypothetical or actual
/// spend.
///
/// Severity is ordered `SAFE < INFO < WARNING < CRITICAL`. `UNKNOWN` sits
/// below all of them and is only produced for degraded results where the
/// budget could not be consulted at all.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Unknown,
    Safe,
    Info,
    Warning,
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertLevel::Safe < AlertLevel::Info);
        assert!(AlertLevel::Info < AlertLevel::Warning);
        assert!(AlertLevel::Warning < AlertLevel::Critical);
        assert!(AlertLevel::Unknown < AlertLevel::Safe);
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(
            serde_json::to_string(&AlertLevel::Critical).unwrap(),
            "\"CRITICAL\""
        );
        assert_eq!(AlertLevel::Unknown.to_string(), "UNKNOWN");
    }
}
