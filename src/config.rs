//! Run-wide configuration for the reconciliation engine

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;
use crate::utils::validation::{
    validate_non_negative_amount, validate_percentage, validate_unit_interval,
};

/// Configuration for a reconciliation run
///
/// All options are fixed before the run starts; the engine validates the
/// full configuration before any pool is built or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Match rate (percent of GL records) at which the run stops early
    pub target_match_rate: f64,
    /// Maximum number of iteration rounds
    pub max_rounds: usize,
    /// Absolute amount tolerance for the exact-amount and amount-date strategies
    pub exact_amount_tolerance: BigDecimal,
    /// Relative tolerance for the partial-amount strategy (fraction of the GL amount)
    pub partial_amount_tolerance_pct: BigDecimal,
    /// Minimum absolute GL amount for the partial-amount strategy to apply
    pub partial_amount_min: BigDecimal,
    /// Maximum day distance for the amount-date strategy
    pub date_tolerance_days: i64,
    /// Minimum description similarity ratio for the description strategy
    pub description_similarity_threshold: f64,
    /// Relative amount tolerance for the pattern-matching strategy
    pub pattern_amount_tolerance_pct: BigDecimal,
    /// Absolute variance below which the two ledgers are reported as balanced
    pub balance_tolerance: BigDecimal,
    /// Priority weight per strategy
    pub strategy_weights: HashMap<StrategyKind, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let strategy_weights = StrategyKind::all()
            .iter()
            .map(|kind| (*kind, kind.default_weight()))
            .collect();

        Self {
            target_match_rate: 80.0,
            max_rounds: 5,
            exact_amount_tolerance: BigDecimal::from(1) / BigDecimal::from(100),
            partial_amount_tolerance_pct: BigDecimal::from(5) / BigDecimal::from(100),
            partial_amount_min: BigDecimal::from(1000),
            date_tolerance_days: 3,
            description_similarity_threshold: 0.6,
            pattern_amount_tolerance_pct: BigDecimal::from(20) / BigDecimal::from(100),
            balance_tolerance: BigDecimal::from(1000),
            strategy_weights,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    ///
    /// Rejects out-of-range rates, negative tolerances, a zero round limit,
    /// and missing or out-of-range strategy weights.
    pub fn validate(&self) -> ReconciliationResult<()> {
        validate_percentage("target_match_rate", self.target_match_rate)?;

        if self.max_rounds == 0 {
            return Err(ReconciliationError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }

        validate_non_negative_amount("exact_amount_tolerance", &self.exact_amount_tolerance)?;
        validate_non_negative_amount(
            "partial_amount_tolerance_pct",
            &self.partial_amount_tolerance_pct,
        )?;
        validate_non_negative_amount("partial_amount_min", &self.partial_amount_min)?;
        validate_non_negative_amount(
            "pattern_amount_tolerance_pct",
            &self.pattern_amount_tolerance_pct,
        )?;
        validate_non_negative_amount("balance_tolerance", &self.balance_tolerance)?;

        if self.date_tolerance_days < 0 {
            return Err(ReconciliationError::InvalidConfig(
                "date_tolerance_days cannot be negative".to_string(),
            ));
        }

        validate_unit_interval(
            "description_similarity_threshold",
            self.description_similarity_threshold,
        )?;

        for kind in StrategyKind::all() {
            match self.strategy_weights.get(&kind) {
                Some(weight) => {
                    validate_unit_interval(kind.as_str(), *weight)?;
                }
                None => {
                    return Err(ReconciliationError::InvalidConfig(format!(
                        "Missing strategy weight for '{}'",
                        kind.as_str()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Priority weight for a strategy, falling back to the built-in default
    pub fn weight(&self, kind: StrategyKind) -> f64 {
        self.strategy_weights
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_weight())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_match_rate, 80.0);
        assert_eq!(config.max_rounds, 5);
        assert_eq!(
            config.exact_amount_tolerance,
            "0.01".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(config.weight(StrategyKind::ExactAmount), 1.0);
        assert_eq!(config.weight(StrategyKind::PatternMatching), 0.6);
    }

    #[test]
    fn test_rejects_target_rate_out_of_range() {
        let mut config = EngineConfig::default();
        config.target_match_rate = 101.0;
        assert!(matches!(
            config.validate(),
            Err(ReconciliationError::InvalidConfig(_))
        ));

        config.target_match_rate = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let mut config = EngineConfig::default();
        config.exact_amount_tolerance = "-0.01".parse().unwrap();
        assert!(matches!(
            config.validate(),
            Err(ReconciliationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let mut config = EngineConfig::default();
        config.max_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_strategy_weight() {
        let mut config = EngineConfig::default();
        config.strategy_weights.remove(&StrategyKind::AmountDate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_weight_out_of_range() {
        let mut config = EngineConfig::default();
        config
            .strategy_weights
            .insert(StrategyKind::ExactAmount, 1.5);
        assert!(config.validate().is_err());
    }
}
