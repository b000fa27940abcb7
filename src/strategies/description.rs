//! Description similarity matching

use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

use super::amount_difference;
use crate::config::EngineConfig;
use crate::traits::MatchStrategy;
use crate::types::*;

/// Matches records with similar descriptions and amounts inside the exact
/// tolerance
///
/// Similarity is a normalized edit-distance ratio in [0, 1] over the
/// normalized descriptions; records with an empty description on either
/// side never match. Confidence is the similarity ratio itself.
pub struct DescriptionSimilarityStrategy {
    similarity_threshold: f64,
    amount_tolerance: BigDecimal,
    weight: f64,
}

impl DescriptionSimilarityStrategy {
    /// Create the strategy from the run configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            similarity_threshold: config.description_similarity_threshold,
            amount_tolerance: config.exact_amount_tolerance.clone(),
            weight: config.weight(StrategyKind::DescriptionSimilarity),
        }
    }
}

impl MatchStrategy for DescriptionSimilarityStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DescriptionSimilarity
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
            if gl_record.normalized_description.is_empty() {
                continue;
            }

            for bank_record in bank {
                if used_bank.contains(bank_record.id.as_str()) {
                    continue;
                }
                if bank_record.normalized_description.is_empty() {
                    continue;
                }

                let difference = amount_difference(&gl_record.amount, &bank_record.amount);
                if difference > self.amount_tolerance {
                    continue;
                }

                let similarity = normalized_levenshtein(
                    &gl_record.normalized_description,
                    &bank_record.normalized_description,
                );
                if similarity < self.similarity_threshold {
                    continue;
                }

                debug!(
                    "description_similarity: {} <-> {} (ratio {:.2})",
                    gl_record.id, bank_record.id, similarity
                );
                used_bank.insert(bank_record.id.as_str());
                candidates.push(MatchCandidate {
                    gl_id: gl_record.id.clone(),
                    bank_id: bank_record.id.clone(),
                    strategy: StrategyKind::DescriptionSimilarity,
                    confidence: similarity,
                    amount_difference: difference,
                    rationale: format!(
                        "Description similarity {:.2} meets {:.2} threshold with amounts within ${}",
                        similarity, self.similarity_threshold, self.amount_tolerance
                    ),
                });
                break;
            }
        }

        candidates
    }
}
