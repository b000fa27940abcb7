//! The iteration controller driving strategies across bounded rounds

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::audit::{build_report, AuditRecorder, AuditReport};
use crate::config::EngineConfig;
use crate::engine::pool::TransactionPool;
use crate::engine::summary::{match_rate, summarize};
use crate::ingest::{build_records, InputRecord};
use crate::strategies::default_stack;
use crate::traits::MatchStrategy;
use crate::types::*;

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Unique identifier of the run
    pub run_id: Uuid,
    /// Why the controller stopped
    pub termination: Termination,
    /// Rounds actually executed
    pub rounds_completed: usize,
    /// Aggregate totals, variance, and match statistics
    pub summary: ReconciliationSummary,
    /// Every accepted match in acceptance order
    pub matches: Vec<AcceptedMatch>,
    /// One record per executed round
    pub iterations: Vec<IterationRecord>,
    /// Input records excluded at ingestion
    pub rejected: Vec<RejectedRecord>,
    /// Final state of every GL record
    pub gl_records: Vec<TransactionRecord>,
    /// Final state of every Bank record
    pub bank_records: Vec<TransactionRecord>,
    /// The assembled audit report
    pub report: AuditReport,
}

/// The reconciliation engine
///
/// Owns the strategy stack and drives it over the two pools in bounded
/// rounds. A run is a single blocking, in-memory computation; the engine
/// holds no state between runs and one engine must not be shared across
/// concurrent runs over the same data.
pub struct ReconciliationEngine {
    config: EngineConfig,
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl ReconciliationEngine {
    /// Create an engine with the default strategy stack
    ///
    /// The configuration is validated here, before any pool exists.
    pub fn new(config: EngineConfig) -> ReconciliationResult<Self> {
        config.validate()?;
        let strategies = default_stack(&config);
        Ok(Self { config, strategies })
    }

    /// Create an engine with a caller-supplied strategy stack
    ///
    /// Strategies run in the order given; the configuration is still
    /// validated.
    pub fn with_strategies(
        config: EngineConfig,
        strategies: Vec<Box<dyn MatchStrategy>>,
    ) -> ReconciliationResult<Self> {
        config.validate()?;
        Ok(Self { config, strategies })
    }

    /// The configuration this engine runs with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconcile two ledgers given raw input from the upstream normalizer
    ///
    /// Runs intake on both sides first; invalid records are diverted into
    /// the outcome's rejection list and the run proceeds without them.
    pub fn reconcile(
        &self,
        gl_inputs: Vec<InputRecord>,
        bank_inputs: Vec<InputRecord>,
    ) -> ReconciliationResult<RunOutcome> {
        let gl_intake = build_records(Side::Gl, gl_inputs);
        let bank_intake = build_records(Side::Bank, bank_inputs);

        let mut rejected = gl_intake.rejected;
        rejected.extend(bank_intake.rejected);

        self.run(gl_intake.records, bank_intake.records, rejected)
    }

    /// Reconcile two ledgers from already-built transaction records
    ///
    /// Useful for re-running the engine over a previous run's unmatched
    /// records. Every record must arrive unconsumed.
    pub fn reconcile_records(
        &self,
        gl_records: Vec<TransactionRecord>,
        bank_records: Vec<TransactionRecord>,
    ) -> ReconciliationResult<RunOutcome> {
        for record in gl_records.iter().chain(bank_records.iter()) {
            if record.consumed {
                return Err(ReconciliationError::Consistency(format!(
                    "Record '{}' entered a new run already consumed",
                    record.id
                )));
            }
        }

        self.run(gl_records, bank_records, Vec::new())
    }

    fn run(
        &self,
        gl_records: Vec<TransactionRecord>,
        bank_records: Vec<TransactionRecord>,
        rejected: Vec<RejectedRecord>,
    ) -> ReconciliationResult<RunOutcome> {
        let run_id = Uuid::new_v4();
        let mut gl_pool = TransactionPool::new(Side::Gl, gl_records);
        let mut bank_pool = TransactionPool::new(Side::Bank, bank_records);
        let mut recorder = AuditRecorder::new();

        let total_gl = gl_pool.len();
        info!(
            "Starting reconciliation run {}: {} GL records, {} Bank records, target {}%",
            run_id,
            total_gl,
            bank_pool.len(),
            self.config.target_match_rate
        );

        let mut round = 0;
        let termination = loop {
            round += 1;
            let found_this_round =
                self.run_round(round, &mut gl_pool, &mut bank_pool, &mut recorder)?;

            let rate = match_rate(gl_pool.matched_count(), total_gl);
            info!(
                "Round {round}: {found_this_round} new matches, cumulative match rate {rate:.1}%"
            );

            if rate >= self.config.target_match_rate {
                break Termination::TargetReached;
            }
            if round >= self.config.max_rounds {
                break Termination::Exhausted;
            }
            if found_this_round == 0 {
                // every strategy is static and deterministic, so an empty
                // round guarantees every later round is empty too
                break Termination::Converged;
            }
        };

        info!(
            "Run {} finished after {} round(s): {:?}",
            run_id, round, termination
        );

        let summary = summarize(&gl_pool, &bank_pool, rejected.len(), &self.config);
        let report = build_report(
            run_id,
            &self.config,
            &recorder,
            &gl_pool,
            &bank_pool,
            &summary,
        )?;

        let matches = recorder.matches().to_vec();
        let iterations = recorder.iterations().to_vec();

        Ok(RunOutcome {
            run_id,
            termination,
            rounds_completed: round,
            summary,
            matches,
            iterations,
            rejected,
            gl_records: gl_pool.into_records(),
            bank_records: bank_pool.into_records(),
            report,
        })
    }

    /// Execute one round: all strategies in priority order over the pools
    /// as depleted by the strategies before them
    fn run_round(
        &self,
        round: usize,
        gl_pool: &mut TransactionPool,
        bank_pool: &mut TransactionPool,
        recorder: &mut AuditRecorder,
    ) -> ReconciliationResult<usize> {
        let mut per_strategy_counts: HashMap<StrategyKind, usize> = HashMap::new();
        let mut found_this_round = 0;

        for strategy in &self.strategies {
            let candidates = {
                let gl_unmatched = gl_pool.unmatched();
                let bank_unmatched = bank_pool.unmatched();
                strategy.find_matches(&gl_unmatched, &bank_unmatched)
            };

            if !candidates.is_empty() {
                debug!(
                    "Round {round}: {} proposed {} match(es)",
                    strategy.kind().as_str(),
                    candidates.len()
                );
            }

            for candidate in candidates {
                gl_pool.mark_consumed(&candidate.gl_id)?;
                bank_pool.mark_consumed(&candidate.bank_id)?;
                *per_strategy_counts.entry(candidate.strategy).or_default() += 1;
                found_this_round += 1;
                recorder.record_match(round, candidate);
            }
        }

        let total_gl = gl_pool.len();
        recorder.record_iteration(IterationRecord {
            iteration_index: round,
            timestamp: chrono::Utc::now().naive_utc(),
            matches_found_this_round: found_this_round,
            cumulative_match_rate: match_rate(gl_pool.matched_count(), total_gl),
            per_strategy_counts,
        });

        Ok(found_this_round)
    }
}
