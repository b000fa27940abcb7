//! In-memory report sink implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::audit::{AuditReport, MatchRow};
use crate::traits::ReportSink;
use crate::types::*;

/// In-memory report sink for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<RwLock<Vec<AuditReport>>>,
    rows: Arc<RwLock<Vec<MatchRow>>>,
}

impl MemorySink {
    /// Create a new memory sink instance
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports persisted so far
    pub fn reports(&self) -> Vec<AuditReport> {
        self.reports.read().unwrap().clone()
    }

    /// All flat match rows persisted so far
    pub fn rows(&self) -> Vec<MatchRow> {
        self.rows.read().unwrap().clone()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.reports.write().unwrap().clear();
        self.rows.write().unwrap().clear();
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn persist_report(&mut self, report: &AuditReport) -> ReconciliationResult<()> {
        self.reports.write().unwrap().push(report.clone());
        Ok(())
    }

    async fn persist_match_rows(&mut self, rows: &[MatchRow]) -> ReconciliationResult<()> {
        self.rows.write().unwrap().extend(rows.iter().cloned());
        Ok(())
    }
}
