//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which ledger a transaction record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The internal general ledger
    Gl,
    /// The external bank statement
    Bank,
}

impl Side {
    /// Short tag used in record identifiers and report output
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Gl => "GL",
            Side::Bank => "BANK",
        }
    }
}

/// Transaction classification derived from the normalized description
///
/// Classification happens once at ingestion by keyword match; anything
/// that matches no keyword is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Ach,
    Check,
    Wire,
    Deposit,
    Fee,
    Other,
}

impl TransactionType {
    /// Classify a normalized (uppercased) description by keyword match.
    ///
    /// Keywords are checked in a fixed order, first hit wins:
    /// ACH before CHECK before WIRE before DEPOSIT before FEE.
    pub fn classify(normalized_description: &str) -> Self {
        const KEYWORDS: [(TransactionType, &[&str]); 5] = [
            (TransactionType::Ach, &["ACH"]),
            (TransactionType::Check, &["CHECK", "CHK", "DRAFT"]),
            (TransactionType::Wire, &["WIR"]),
            (TransactionType::Deposit, &["DEP"]),
            (TransactionType::Fee, &["FEE", "CHARGE", "SERVICE"]),
        ];

        for (transaction_type, keywords) in KEYWORDS {
            if keywords.iter().any(|k| normalized_description.contains(k)) {
                return transaction_type;
            }
        }

        TransactionType::Other
    }

    /// Stable display name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Ach => "ACH",
            TransactionType::Check => "CHECK",
            TransactionType::Wire => "WIRE",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Fee => "FEE",
            TransactionType::Other => "OTHER",
        }
    }
}

/// A single normalized ledger entry on one side of the reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier within the run (row index + side tag); never reused
    pub id: String,
    /// Which ledger this record came from
    pub side: Side,
    /// Optional grouping key, e.g. the GL account number
    pub source_account: Option<String>,
    /// Signed net amount (debits and credits already netted)
    pub amount: BigDecimal,
    /// Calendar date of the transaction, when known
    pub date: Option<NaiveDate>,
    /// Description exactly as supplied by the upstream normalizer
    pub raw_description: String,
    /// Uppercased, whitespace-collapsed description used for matching
    pub normalized_description: String,
    /// Classified transaction type
    pub transaction_type: TransactionType,
    /// Set to true exactly once, when the record is matched
    pub consumed: bool,
}

/// The five matching strategies, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    ExactAmount,
    AmountDate,
    DescriptionSimilarity,
    PartialAmount,
    PatternMatching,
}

impl StrategyKind {
    /// All strategies in evaluation priority order
    pub fn all() -> [StrategyKind; 5] {
        [
            StrategyKind::ExactAmount,
            StrategyKind::AmountDate,
            StrategyKind::DescriptionSimilarity,
            StrategyKind::PartialAmount,
            StrategyKind::PatternMatching,
        ]
    }

    /// Stable snake_case name used in reports and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::ExactAmount => "exact_amount",
            StrategyKind::AmountDate => "amount_date",
            StrategyKind::DescriptionSimilarity => "description_similarity",
            StrategyKind::PartialAmount => "partial_amount",
            StrategyKind::PatternMatching => "pattern_matching",
        }
    }

    /// Default priority weight for this strategy
    pub fn default_weight(&self) -> f64 {
        match self {
            StrategyKind::ExactAmount => 1.0,
            StrategyKind::AmountDate => 0.9,
            StrategyKind::DescriptionSimilarity => 0.8,
            StrategyKind::PartialAmount => 0.7,
            StrategyKind::PatternMatching => 0.6,
        }
    }
}

/// A proposed pairing of one GL record with one Bank record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Identifier of the GL record
    pub gl_id: String,
    /// Identifier of the Bank record
    pub bank_id: String,
    /// Strategy that produced the pairing
    pub strategy: StrategyKind,
    /// Confidence score in [0, 1]
    pub confidence: f64,
    /// Absolute difference between the two amounts
    pub amount_difference: BigDecimal,
    /// Human-readable justification for the pairing
    pub rationale: String,
}

/// A candidate accepted by the iteration controller, tagged for the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedMatch {
    /// Sequential number across the whole run, starting at 1
    pub match_number: usize,
    /// Round in which the candidate was accepted, starting at 1
    pub round: usize,
    /// The accepted candidate
    pub candidate: MatchCandidate,
}

/// State of one iteration round, captured for the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based round number
    pub iteration_index: usize,
    /// When the round completed
    pub timestamp: NaiveDateTime,
    /// Matches accepted across all strategies in this round
    pub matches_found_this_round: usize,
    /// Match rate over the full GL input after this round, in percent
    pub cumulative_match_rate: f64,
    /// Matches accepted per strategy in this round
    pub per_strategy_counts: HashMap<StrategyKind, usize>,
}

/// Why the iteration controller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    /// The cumulative match rate reached the configured target
    TargetReached,
    /// The configured round limit was reached
    Exhausted,
    /// A full round produced no new matches; further rounds cannot either
    Converged,
}

/// Aggregate totals, variance, and match statistics for a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Sum of all GL amounts, matched and unmatched
    pub gl_total: BigDecimal,
    /// Sum of all Bank amounts, matched and unmatched
    pub bank_total: BigDecimal,
    /// `gl_total - bank_total`
    pub variance: BigDecimal,
    /// Variance as a percentage of `gl_total`; `None` when `gl_total` is zero
    pub variance_pct: Option<f64>,
    /// Matched GL records over total GL records, in percent
    pub match_rate: f64,
    /// Number of matched GL records
    pub matched_count: usize,
    /// Whether the absolute variance is inside the configured balance tolerance
    pub is_balanced: bool,
    /// Sum of amounts on matched GL records
    pub matched_gl_amount: BigDecimal,
    /// Sum of amounts on matched Bank records
    pub matched_bank_amount: BigDecimal,
    /// Sum of amounts on unmatched GL records
    pub unmatched_gl_amount: BigDecimal,
    /// Sum of amounts on unmatched Bank records
    pub unmatched_bank_amount: BigDecimal,
    /// Identifiers of GL records that found no counterpart
    pub unmatched_gl_ids: Vec<String>,
    /// Identifiers of Bank records that found no counterpart
    pub unmatched_bank_ids: Vec<String>,
    /// Input records rejected at ingestion and excluded from the pools
    pub unparseable_records: usize,
}

/// An input record that failed validation and was excluded from the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Side the record was submitted for
    pub side: Side,
    /// Position of the record in the input sequence
    pub index: usize,
    /// Why the record was rejected
    pub reason: String,
}

/// Errors that can occur in the reconciliation engine
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Consistency error: {0}")]
    Consistency(String),
    #[error("Report sink error: {0}")]
    Sink(String),
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(
            TransactionType::classify("ACH_ADV PAYROLL 0042"),
            TransactionType::Ach
        );
        assert_eq!(
            TransactionType::classify("CHK 1022 VENDOR"),
            TransactionType::Check
        );
        assert_eq!(
            TransactionType::classify("WIRE OUT ACME CORP"),
            TransactionType::Wire
        );
        assert_eq!(
            TransactionType::classify("BRANCH DEPOSIT 17"),
            TransactionType::Deposit
        );
        assert_eq!(
            TransactionType::classify("MONTHLY SERVICE CHARGE"),
            TransactionType::Fee
        );
        assert_eq!(
            TransactionType::classify("MISC ADJUSTMENT"),
            TransactionType::Other
        );
    }

    #[test]
    fn test_classify_priority_order() {
        // ACH wins over FEE when both keywords appear
        assert_eq!(
            TransactionType::classify("ACH SERVICE PAYMENT"),
            TransactionType::Ach
        );
    }

    #[test]
    fn test_strategy_kind_names() {
        for kind in StrategyKind::all() {
            assert!(!kind.as_str().is_empty());
            assert!(kind.default_weight() > 0.0 && kind.default_weight() <= 1.0);
        }
        let weights: Vec<f64> = StrategyKind::all()
            .iter()
            .map(|k| k.default_weight())
            .collect();
        assert!(weights.windows(2).all(|w| w[0] > w[1]));
    }
}
