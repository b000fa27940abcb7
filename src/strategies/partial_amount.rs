//! Partial amount matching for large transactions

use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashSet;

use super::{amount_difference, closeness};
use crate::config::EngineConfig;
use crate::traits::MatchStrategy;
use crate::types::*;

/// Matches large transactions whose amounts agree within a relative band
///
/// Applies only to GL records at or above a minimum magnitude; the
/// admissible band is a percentage of the GL amount. Confidence falls off
/// linearly from 1.0 at a perfect match to 0.0 at the edge of the band.
pub struct PartialAmountStrategy {
    tolerance_pct: BigDecimal,
    min_amount: BigDecimal,
    weight: f64,
}

impl PartialAmountStrategy {
    /// Create the strategy from the run configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tolerance_pct: config.partial_amount_tolerance_pct.clone(),
            min_amount: config.partial_amount_min.clone(),
            weight: config.weight(StrategyKind::PartialAmount),
        }
    }
}

impl MatchStrategy for PartialAmountStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PartialAmount
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
            let gl_magnitude = gl_record.amount.abs();
            if gl_magnitude < self.min_amount {
                continue;
            }

            let band = &gl_magnitude * &self.tolerance_pct;

            for bank_record in bank {
                if used_bank.contains(bank_record.id.as_str()) {
                    continue;
                }

                let difference = amount_difference(&gl_record.amount, &bank_record.amount);
                if difference > band {
                    continue;
                }

                let confidence = closeness(&difference, &band);
                debug!(
                    "partial_amount: {} <-> {} (difference {} inside band {})",
                    gl_record.id, bank_record.id, difference, band
                );
                used_bank.insert(bank_record.id.as_str());
                candidates.push(MatchCandidate {
                    gl_id: gl_record.id.clone(),
                    bank_id: bank_record.id.clone(),
                    strategy: StrategyKind::PartialAmount,
                    confidence,
                    amount_difference: difference,
                    rationale: format!(
                        "Large transaction amounts within {}% tolerance",
                        &self.tolerance_pct * BigDecimal::from(100)
                    ),
                });
                break;
            }
        }

        candidates
    }
}
