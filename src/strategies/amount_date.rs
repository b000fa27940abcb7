//! Amount plus date proximity matching

use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashSet;

use super::amount_difference;
use crate::config::EngineConfig;
use crate::traits::MatchStrategy;
use crate::types::*;

/// Matches records whose amounts agree within the exact tolerance and whose
/// dates fall within a configurable day window
///
/// Records without a date on either side are skipped. Confidence blends
/// amount closeness and date closeness equally.
pub struct AmountDateStrategy {
    amount_tolerance: BigDecimal,
    date_tolerance_days: i64,
    weight: f64,
}

impl AmountDateStrategy {
    /// Create the strategy from the run configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            amount_tolerance: config.exact_amount_tolerance.clone(),
            date_tolerance_days: config.date_tolerance_days,
            weight: config.weight(StrategyKind::AmountDate),
        }
    }

    fn confidence(&self, gl: &TransactionRecord, bank: &TransactionRecord, day_distance: i64) -> f64 {
        use bigdecimal::ToPrimitive;

        // amount closeness is relative to the larger magnitude, floored at 1
        // so that near-zero amounts do not blow the ratio up
        let difference = amount_difference(&gl.amount, &bank.amount);
        let denominator = gl
            .amount
            .abs()
            .max(bank.amount.abs())
            .max(BigDecimal::from(1));
        let amount_score =
            (1.0 - (&difference / &denominator).to_f64().unwrap_or(1.0)).clamp(0.0, 1.0);

        let date_score = if self.date_tolerance_days == 0 {
            1.0
        } else {
            (1.0 - day_distance as f64 / self.date_tolerance_days as f64).clamp(0.0, 1.0)
        };

        (amount_score + date_score) / 2.0
    }
}

impl MatchStrategy for AmountDateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AmountDate
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
            let Some(gl_date) = gl_record.date else {
                continue;
            };

            for bank_record in bank {
                if used_bank.contains(bank_record.id.as_str()) {
                    continue;
                }
                let Some(bank_date) = bank_record.date else {
                    continue;
                };

                let difference = amount_difference(&gl_record.amount, &bank_record.amount);
                if difference > self.amount_tolerance {
                    continue;
                }

                let day_distance = (gl_date - bank_date).num_days().abs();
                if day_distance > self.date_tolerance_days {
                    continue;
                }

                debug!(
                    "amount_date: {} <-> {} ({} days apart)",
                    gl_record.id, bank_record.id, day_distance
                );
                used_bank.insert(bank_record.id.as_str());
                candidates.push(MatchCandidate {
                    gl_id: gl_record.id.clone(),
                    bank_id: bank_record.id.clone(),
                    strategy: StrategyKind::AmountDate,
                    confidence: self.confidence(gl_record, bank_record, day_distance),
                    amount_difference: difference,
                    rationale: format!(
                        "Amounts match within ${} and dates within {} days",
                        self.amount_tolerance, self.date_tolerance_days
                    ),
                });
                break;
            }
        }

        candidates
    }
}
