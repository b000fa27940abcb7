//! Traits for matching strategies, record validation, and report persistence

use async_trait::async_trait;

use crate::audit::{AuditReport, MatchRow};
use crate::ingest::InputRecord;
use crate::types::*;

/// A matching heuristic over the two unmatched pools
///
/// Implementations are deterministic, greedy, first-fit matchers: for each
/// unmatched GL record in pool order they accept the first admissible Bank
/// record in pool order, and neither record may be proposed twice within
/// one pass. Strategies only propose candidates; the iteration controller
/// consumes records and owns the pools.
pub trait MatchStrategy: Send + Sync {
    /// Which of the five strategies this is
    fn kind(&self) -> StrategyKind;

    /// Priority weight of this strategy
    fn weight(&self) -> f64;

    /// Propose match candidates over snapshots of the unmatched pools
    fn find_matches(
        &self,
        gl: &[&TransactionRecord],
        bank: &[&TransactionRecord],
    ) -> Vec<MatchCandidate>;
}

/// Validation applied to each input record during intake
///
/// A rejection diverts the record into the run's rejection list; it never
/// aborts the run.
pub trait RecordValidator: Send + Sync {
    /// Validate a single input record before it enters the pool
    fn validate_record(&self, record: &InputRecord) -> ReconciliationResult<()>;
}

/// Default record validator: an amount is required, everything else is optional
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_record(&self, record: &InputRecord) -> ReconciliationResult<()> {
        if record.amount.is_none() {
            return Err(ReconciliationError::InvalidRecord(
                "missing amount".to_string(),
            ));
        }
        Ok(())
    }
}

/// Persistence collaborator for finished audit output
///
/// The engine only builds the in-memory representation; implementations of
/// this trait decide where the structured report and the flat match listing
/// end up (disk, database, spreadsheet export, ...).
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist the structured audit report
    async fn persist_report(&mut self, report: &AuditReport) -> ReconciliationResult<()>;

    /// Persist the flat one-row-per-match listing
    async fn persist_match_rows(&mut self, rows: &[MatchRow]) -> ReconciliationResult<()>;
}
