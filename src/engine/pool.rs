//! Unmatched transaction pools

use bigdecimal::BigDecimal;

use crate::types::*;

/// One side's transaction records for the duration of a run
///
/// The pool preserves input order and tracks consumption. A record's
/// `consumed` flag transitions false to true exactly once; a second
/// transition is a consistency error, because it would mean the engine
/// accepted the same record into two matches.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPool {
    side: Side,
    records: Vec<TransactionRecord>,
}

impl TransactionPool {
    /// Create a pool over the given records
    pub fn new(side: Side, records: Vec<TransactionRecord>) -> Self {
        Self { side, records }
    }

    /// Which ledger this pool holds
    pub fn side(&self) -> Side {
        self.side
    }

    /// Total number of records, matched and unmatched
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the pool holds no records at all
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in input order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Look up a record by identifier
    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Unconsumed records in input order
    pub fn unmatched(&self) -> Vec<&TransactionRecord> {
        self.records.iter().filter(|r| !r.consumed).collect()
    }

    /// Identifiers of unconsumed records in input order
    pub fn unmatched_ids(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| !r.consumed)
            .map(|r| r.id.clone())
            .collect()
    }

    /// Number of consumed records
    pub fn matched_count(&self) -> usize {
        self.records.iter().filter(|r| r.consumed).count()
    }

    /// Number of unconsumed records
    pub fn unmatched_count(&self) -> usize {
        self.records.iter().filter(|r| !r.consumed).count()
    }

    /// Sum of all amounts, matched and unmatched
    pub fn total_amount(&self) -> BigDecimal {
        self.records.iter().map(|r| &r.amount).sum()
    }

    /// Sum of amounts on consumed records
    pub fn matched_amount(&self) -> BigDecimal {
        self.records
            .iter()
            .filter(|r| r.consumed)
            .map(|r| &r.amount)
            .sum()
    }

    /// Sum of amounts on unconsumed records
    pub fn unmatched_amount(&self) -> BigDecimal {
        self.records
            .iter()
            .filter(|r| !r.consumed)
            .map(|r| &r.amount)
            .sum()
    }

    /// Mark a record as consumed by an accepted match
    ///
    /// Fails with a consistency error if the record does not exist or was
    /// already consumed; both indicate an engine bug, not a data problem.
    pub fn mark_consumed(&mut self, id: &str) -> ReconciliationResult<()> {
        let side = self.side;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                ReconciliationError::Consistency(format!(
                    "No {} record with id '{}' in pool",
                    side.as_str(),
                    id
                ))
            })?;

        if record.consumed {
            return Err(ReconciliationError::Consistency(format!(
                "{} record '{}' was already consumed",
                side.as_str(),
                id
            )));
        }

        record.consumed = true;
        Ok(())
    }

    /// Consume the pool, returning the final record states
    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }
}
