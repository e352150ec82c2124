use serde::{Deserialize, Serialize};

use crate::decimal::Percentage;
use crate::errors::{LedgerError, Result};

/// environment variable holding the payment gateway's signing secret
pub const GATEWAY_SECRET_ENV: &str = "PAYMENT_KEY_SECRET";

/// default attendance threshold below which a student is a defaulter
pub const DEFAULT_DEFAULTER_THRESHOLD: u32 = 75;

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub gateway: GatewayConfig,
    pub attendance: AttendanceConfig,
    pub allocation: AllocationConfig,
}

/// payment gateway configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// shared secret used to sign `order_id|payment_id`
    pub key_secret: String,
}

// keep the secret out of logs
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

/// attendance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceConfig {
    pub defaulter_threshold: Percentage,
}

/// allocation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// re-reads of the ledger after an insert conflict before giving up
    pub conflict_retries: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            defaulter_threshold: Percentage::from_whole(DEFAULT_DEFAULTER_THRESHOLD),
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self { conflict_retries: 1 }
    }
}

impl GatewayConfig {
    pub fn new(key_secret: impl Into<String>) -> Self {
        Self {
            key_secret: key_secret.into(),
        }
    }

    /// read the secret from `PAYMENT_KEY_SECRET`
    pub fn from_env() -> Result<Self> {
        std::env::var(GATEWAY_SECRET_ENV)
            .map(Self::new)
            .map_err(|_| LedgerError::InvalidConfiguration {
                message: format!("{} is not set", GATEWAY_SECRET_ENV),
            })
    }
}

impl LedgerConfig {
    /// default configuration with the given gateway secret
    pub fn with_secret(key_secret: impl Into<String>) -> Self {
        Self {
            gateway: GatewayConfig::new(key_secret),
            attendance: AttendanceConfig::default(),
            allocation: AllocationConfig::default(),
        }
    }

    /// default configuration with the secret taken from the environment
    pub fn from_env() -> Result<Self> {
        let config = Self {
            gateway: GatewayConfig::from_env()?,
            ..Self::with_secret(String::new())
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gateway.key_secret.is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "gateway key secret must not be empty".to_string(),
            });
        }
        let threshold = self.attendance.defaulter_threshold;
        if threshold <= Percentage::ZERO || threshold > Percentage::HUNDRED {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("defaulter threshold {} must be above 0% and at most 100%", threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::with_secret("s3cret");
        assert!(config.validate().is_ok());
        assert_eq!(config.attendance.defaulter_threshold.as_decimal(), dec!(75));
        assert_eq!(config.allocation.conflict_retries, 1);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = LedgerConfig::with_secret("");
        assert!(matches!(
            config.validate(),
            Err(LedgerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let json = LedgerConfig::with_secret("abc").to_json().unwrap();
        let parsed = LedgerConfig::from_json(&json).unwrap();
        assert_eq!(parsed, LedgerConfig::with_secret("abc"));

        let bad = json.replace("\"abc\"", "\"\"");
        assert!(LedgerConfig::from_json(&bad).is_err());
        assert!(LedgerConfig::from_json("{").is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let json = LedgerConfig::with_secret("abc").to_json().unwrap();
        assert!(json.contains("\"defaulter_threshold\": \"75\""));

        for bad in ["\"150\"", "\"-5\"", "\"0\""] {
            let config = json.replace("\"75\"", bad);
            assert!(
                matches!(LedgerConfig::from_json(&config), Err(LedgerError::InvalidConfiguration { .. })),
                "threshold {} accepted",
                bad
            );
        }

        let edge = json.replace("\"75\"", "\"100\"");
        let config = LedgerConfig::from_json(&edge).unwrap();
        assert_eq!(config.attendance.defaulter_threshold, Percentage::HUNDRED);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = LedgerConfig::with_secret("do-not-print");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("<redacted>"));
    }
}
