//! # Recon Core
//!
//! A ledger reconciliation engine that pairs entries from an internal
//! general ledger ("GL") with an external bank statement ("Bank"),
//! quantifies the unexplained variance, and records an auditable
//! justification for every decision it makes.
//!
//! ## Features
//!
//! - **Multi-strategy matching**: five deterministic heuristics evaluated
//!   in priority order, from exact amounts down to transaction-type
//!   patterns
//! - **Confidence scoring**: every accepted pairing carries a [0, 1]
//!   score and a human-readable rationale
//! - **Iterative engine**: bounded rounds with early termination on
//!   target match rate or convergence
//! - **Variance analysis**: totals, variance, and match-rate statistics
//!   over the final pool state
//! - **Audit trail**: a structured report plus a flat per-match listing,
//!   handed to a pluggable persistence sink
//!
//! ## Quick Start
//!
//! ```rust
//! use recon_core::{EngineConfig, InputRecord, ReconciliationEngine};
//! use bigdecimal::BigDecimal;
//!
//! let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();
//! let gl = vec![InputRecord::with_amount("1000.00".parse::<BigDecimal>().unwrap())];
//! let bank = vec![InputRecord::with_amount("1000.00".parse::<BigDecimal>().unwrap())];
//! let outcome = engine.reconcile(gl, bank).unwrap();
//! assert_eq!(outcome.summary.matched_count, 1);
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod strategies;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use audit::*;
pub use config::*;
pub use engine::*;
pub use ingest::*;
pub use strategies::*;
pub use traits::*;
pub use types::*;
