//! Variance and summary calculation over final pool state

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::config::EngineConfig;
use crate::engine::pool::TransactionPool;
use crate::types::*;

/// Match rate in percent over the full GL input
///
/// An empty GL pool is trivially reconciled and reports 100.0.
pub fn match_rate(matched_count: usize, total_gl_count: usize) -> f64 {
    if total_gl_count == 0 {
        return 100.0;
    }
    matched_count as f64 / total_gl_count as f64 * 100.0
}

/// Compute the reconciliation summary from final pool state
///
/// A pure read over the pools; it can be called at any terminal state and
/// has no side effects. The variance percentage is reported as `None`
/// rather than raising a division error when the GL total is zero.
pub fn summarize(
    gl_pool: &TransactionPool,
    bank_pool: &TransactionPool,
    unparseable_records: usize,
    config: &EngineConfig,
) -> ReconciliationSummary {
    let gl_total = gl_pool.total_amount();
    let bank_total = bank_pool.total_amount();
    let variance = &gl_total - &bank_total;

    let variance_pct = if gl_total == BigDecimal::from(0) {
        None
    } else {
        (&variance / &gl_total * BigDecimal::from(100)).to_f64()
    };

    let matched_count = gl_pool.matched_count();
    let is_balanced = variance.abs() < config.balance_tolerance;

    ReconciliationSummary {
        match_rate: match_rate(matched_count, gl_pool.len()),
        matched_count,
        is_balanced,
        variance_pct,
        matched_gl_amount: gl_pool.matched_amount(),
        matched_bank_amount: bank_pool.matched_amount(),
        unmatched_gl_amount: gl_pool.unmatched_amount(),
        unmatched_bank_amount: bank_pool.unmatched_amount(),
        unmatched_gl_ids: gl_pool.unmatched_ids(),
        unmatched_bank_ids: bank_pool.unmatched_ids(),
        unparseable_records,
        gl_total,
        bank_total,
        variance,
    }
}
