//! Pattern matching on classified transaction types

use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashSet;

use super::{amount_difference, closeness};
use crate::config::EngineConfig;
use crate::traits::MatchStrategy;
use crate::types::*;

/// Base confidence contributed by a transaction-type agreement
const TYPE_MATCH_SCORE: f64 = 0.8;

/// Matches records that share a classified transaction type and have
/// amounts inside a wide relative band
///
/// The lowest-priority strategy: it only sees records every other strategy
/// passed over. Records classified `OTHER` never match, since an unknown
/// type carries no signal. Confidence averages a fixed type-match score
/// with amount closeness.
pub struct PatternMatchingStrategy {
    tolerance_pct: BigDecimal,
    weight: f64,
}

impl PatternMatchingStrategy {
    /// Create the strategy from the run configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tolerance_pct: config.pattern_amount_tolerance_pct.clone(),
            weight: config.weight(StrategyKind::PatternMatching),
        }
    }
}

impl MatchStrategy for PatternMatchingStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PatternMatching
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
            if gl_record.transaction_type == TransactionType::Other {
                continue;
            }

            for bank_record in bank {
                if used_bank.contains(bank_record.id.as_str()) {
                    continue;
                }
                if bank_record.transaction_type != gl_record.transaction_type {
                    continue;
                }

                let band = gl_record.amount.abs().max(bank_record.amount.abs())
                    * &self.tolerance_pct;
                let difference = amount_difference(&gl_record.amount, &bank_record.amount);
                if difference > band {
                    continue;
                }

                let confidence = (TYPE_MATCH_SCORE + closeness(&difference, &band)) / 2.0;
                debug!(
                    "pattern_matching: {} <-> {} (type {})",
                    gl_record.id,
                    bank_record.id,
                    gl_record.transaction_type.as_str()
                );
                used_bank.insert(bank_record.id.as_str());
                candidates.push(MatchCandidate {
                    gl_id: gl_record.id.clone(),
                    bank_id: bank_record.id.clone(),
                    strategy: StrategyKind::PatternMatching,
                    confidence,
                    amount_difference: difference,
                    rationale: format!(
                        "Transaction type {} matches and amounts within {}% tolerance",
                        gl_record.transaction_type.as_str(),
                        &self.tolerance_pct * BigDecimal::from(100)
                    ),
                });
                break;
            }
        }

        candidates
    }
}
