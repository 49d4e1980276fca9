use core_config::{ConfigError, FromEnv, env_parse_or};

/// Stock, expiry and pagination thresholds shared by the repository and service.
///
/// Environment variables:
/// - `LOW_STOCK_THRESHOLD` (default: 5)
/// - `CRITICAL_STOCK_THRESHOLD` (default: 2)
/// - `EXPIRY_WARNING_DAYS` (default: 30)
/// - `EXPIRY_CRITICAL_DAYS` (default: 7)
/// - `DEFAULT_PAGE_LIMIT` (default: 10)
/// - `MAX_PAGE_LIMIT` (default: 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryThresholds {
    /// Quantity at or below which an item without its own reorder level is "low"
    pub low_stock: i64,
    /// Quantity at or below which an item is "critical"
    pub critical_stock: i64,
    /// Default forward window for the expiring report, in days
    pub expiry_warning_days: i64,
    /// Days left at or below which an expiring item is "critical"
    pub expiry_critical_days: i64,
    pub default_page_limit: u64,
    pub max_page_limit: u64,
}

impl Default for InventoryThresholds {
    fn default() -> Self {
        Self {
            low_stock: 5,
            critical_stock: 2,
            expiry_warning_days: 30,
            expiry_critical_days: 7,
            default_page_limit: 10,
            max_page_limit: 100,
        }
    }
}

impl FromEnv for InventoryThresholds {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let thresholds = Self {
            low_stock: env_parse_or("LOW_STOCK_THRESHOLD", defaults.low_stock)?,
            critical_stock: env_parse_or("CRITICAL_STOCK_THRESHOLD", defaults.critical_stock)?,
            expiry_warning_days: env_parse_or("EXPIRY_WARNING_DAYS", defaults.expiry_warning_days)?,
            expiry_critical_days: env_parse_or(
                "EXPIRY_CRITICAL_DAYS",
                defaults.expiry_critical_days,
            )?,
            default_page_limit: env_parse_or("DEFAULT_PAGE_LIMIT", defaults.default_page_limit)?,
            max_page_limit: env_parse_or("MAX_PAGE_LIMIT", defaults.max_page_limit)?,
        };

        thresholds.check()?;
        Ok(thresholds)
    }
}

impl InventoryThresholds {
    fn check(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, details: &str| ConfigError::ParseError {
            key: key.to_string(),
            details: details.to_string(),
        };

        if self.low_stock < 0 || self.critical_stock < 0 {
            return Err(invalid("LOW_STOCK_THRESHOLD", "stock thresholds must be non-negative"));
        }
        if self.critical_stock > self.low_stock {
            return Err(invalid(
                "CRITICAL_STOCK_THRESHOLD",
                "must not exceed LOW_STOCK_THRESHOLD",
            ));
        }
        if self.expiry_warning_days < 0 || self.expiry_critical_days < 0 {
            return Err(invalid("EXPIRY_WARNING_DAYS", "expiry windows must be non-negative"));
        }
        if self.default_page_limit == 0 || self.max_page_limit == 0 {
            return Err(invalid("DEFAULT_PAGE_LIMIT", "page limits must be at least 1"));
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(invalid("DEFAULT_PAGE_LIMIT", "must not exceed MAX_PAGE_LIMIT"));
        }
        Ok(())
    }
}
