//! Exact amount matching

use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashSet;

use super::amount_difference;
use crate::config::EngineConfig;
use crate::traits::MatchStrategy;
use crate::types::*;

/// Matches records whose amounts agree within a fixed absolute tolerance
///
/// The highest-priority strategy. Confidence is always 1.0: agreement on
/// the amount alone is treated as conclusive.
pub struct ExactAmountStrategy {
    tolerance: BigDecimal,
    weight: f64,
}

impl ExactAmountStrategy {
    /// Create the strategy from the run configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tolerance: config.exact_amount_tolerance.clone(),
            weight: config.weight(StrategyKind::ExactAmount),
        }
    }
}

impl MatchStrategy for ExactAmountStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExactAmount
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn find_matches(
        &self,
        gl: &[&TransactionRecord],
        bank: &[&TransactionRecord],
    ) -> Vec<MatchCandidate> {
        let mut candidates = Vec::new();
        let mut used_bank: HashSet<&str> = HashSet::new();

        for gl_record in gl {
            for bank_record in bank {
                if used_bank.contains(bank_record.id.as_str()) {
                    continue;
                }

                let difference = amount_difference(&gl_record.amount, &bank_record.amount);
                if difference <= self.tolerance {
                    debug!(
                        "exact_amount: {} <-> {} (difference {})",
                        gl_record.id, bank_record.id, difference
                    );
                    used_bank.insert(bank_record.id.as_str());
                    candidates.push(MatchCandidate {
                        gl_id: gl_record.id.clone(),
                        bank_id: bank_record.id.clone(),
                        strategy: StrategyKind::ExactAmount,
                        confidence: 1.0,
                        amount_difference: difference,
                        rationale: format!(
                            "Amounts match within ${} tolerance",
                            self.tolerance
                        ),
                    });
                    break;
                }
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testutil::{record, refs};

    #[test]
    fn test_matches_within_tolerance() {
        let config = EngineConfig::default();
        let strategy = ExactAmountStrategy::new(&config);

        let gl = vec![
            record(Side::Gl, 0, "1000.00"),
            record(Side::Gl, 1, "1500.50"),
            record(Side::Gl, 2, "2000.00"),
        ];
        let bank = vec![
            record(Side::Bank, 0, "1000.01"),
            record(Side::Bank, 1, "2000.00"),
            record(Side::Bank, 2, "999.00"),
        ];

        let candidates = strategy.find_matches(&refs(&gl), &refs(&bank));
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].gl_id, "0_GL");
        assert_eq!(candidates[0].bank_id, "0_BANK");
        assert_eq!(
            candidates[0].amount_difference,
            "0.01".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(candidates[0].confidence, 1.0);

        assert_eq!(candidates[1].gl_id, "2_GL");
        assert_eq!(candidates[1].bank_id, "1_BANK");
        assert_eq!(candidates[1].amount_difference, BigDecimal::from(0));
    }

    #[test]
    fn test_first_fit_takes_first_admissible() {
        let config = EngineConfig::default();
        let strategy = ExactAmountStrategy::new(&config);

        // both bank records are admissible; the earlier one wins
        let gl = vec![record(Side::Gl, 0, "50.00")];
        let bank = vec![record(Side::Bank, 0, "50.00"), record(Side::Bank, 1, "50.00")];

        let candidates = strategy.find_matches(&refs(&gl), &refs(&bank));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].bank_id, "0_BANK");
    }

    #[test]
    fn test_bank_record_not_reused_within_pass() {
        let config = EngineConfig::default();
        let strategy = ExactAmountStrategy::new(&config);

        let gl = vec![record(Side::Gl, 0, "50.00"), record(Side::Gl, 1, "50.00")];
        let bank = vec![record(Side::Bank, 0, "50.00")];

        let candidates = strategy.find_matches(&refs(&gl), &refs(&bank));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].gl_id, "0_GL");
    }

    #[test]
    fn test_no_match_outside_tolerance() {
        let config = EngineConfig::default();
        let strategy = ExactAmountStrategy::new(&config);

        let gl = vec![record(Side::Gl, 0, "100.00")];
        let bank = vec![record(Side::Bank, 0, "100.02")];

        assert!(strategy.find_matches(&refs(&gl), &refs(&bank)).is_empty());
    }
}
