//! Integration tests for recon-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::HashSet;

use recon_core::utils::MemorySink;
use recon_core::{
    AmountDateStrategy, DescriptionSimilarityStrategy, EngineConfig, InputRecord, MatchStrategy,
    ReconciliationEngine, ReportSink, Side, StrategyKind, Termination,
};

fn amount(value: &str) -> BigDecimal {
    value.parse().unwrap()
}

fn plain(value: &str) -> InputRecord {
    InputRecord::with_amount(amount(value))
}

fn described(value: &str, description: &str) -> InputRecord {
    InputRecord {
        amount: Some(amount(value)),
        description: Some(description.to_string()),
        ..InputRecord::default()
    }
}

#[test]
fn test_exact_amount_scenario() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![plain("1000.00"), plain("1500.50"), plain("2000.00")];
    let bank = vec![plain("1000.01"), plain("2000.00"), plain("999.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();

    assert_eq!(outcome.matches.len(), 2);

    let first = &outcome.matches[0].candidate;
    assert_eq!(first.gl_id, "0_GL");
    assert_eq!(first.bank_id, "0_BANK");
    assert_eq!(first.strategy, StrategyKind::ExactAmount);
    assert_eq!(first.amount_difference, amount("0.01"));

    let second = &outcome.matches[1].candidate;
    assert_eq!(second.gl_id, "2_GL");
    assert_eq!(second.bank_id, "1_BANK");
    assert_eq!(second.amount_difference, BigDecimal::from(0));

    assert_eq!(outcome.summary.unmatched_gl_ids, vec!["1_GL"]);
    assert_eq!(outcome.summary.unmatched_bank_ids, vec!["2_BANK"]);
    assert!((outcome.summary.match_rate - 200.0 / 3.0).abs() < 0.1);
}

#[test]
fn test_partial_amount_boundary_scenario() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    // 5% of 5000 is 250, so a difference of 100 is admissible for the
    // partial-amount strategy but far outside the exact tolerance
    let gl = vec![described("5000.00", "ACH PAYMENT BATCH 021")];
    let bank = vec![described("5100.00", "ACH PAYMENT BATCH 021A")];

    let outcome = engine.reconcile(gl, bank).unwrap();

    assert_eq!(outcome.matches.len(), 1);
    let candidate = &outcome.matches[0].candidate;
    assert_eq!(candidate.strategy, StrategyKind::PartialAmount);
    assert!((candidate.confidence - 0.6).abs() < 1e-9);
    assert_eq!(candidate.amount_difference, BigDecimal::from(100));
    assert_eq!(outcome.summary.match_rate, 100.0);
}

#[test]
fn test_zero_gl_total_reports_null_variance_pct() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let outcome = engine.reconcile(Vec::new(), vec![plain("500.00")]).unwrap();

    assert_eq!(outcome.summary.gl_total, BigDecimal::from(0));
    assert_eq!(outcome.summary.bank_total, amount("500.00"));
    assert_eq!(outcome.summary.variance, amount("-500.00"));
    assert_eq!(outcome.summary.variance_pct, None);
}

#[test]
fn test_unparseable_record_degrades_gracefully() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![
        InputRecord {
            description: Some("row without an amount".to_string()),
            ..InputRecord::default()
        },
        plain("250.00"),
    ];
    let bank = vec![plain("250.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();

    assert_eq!(outcome.summary.unparseable_records, 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].side, Side::Gl);
    assert_eq!(outcome.rejected[0].index, 0);
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.summary.match_rate, 100.0);
}

#[test]
fn test_partition_invariant_and_no_double_match() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![
        described("100.00", "MISC A"),
        described("5000.00", "TRANSFER 9"),
        described("800.00", "ACH PAYROLL"),
        plain("42.42"),
    ];
    let bank = vec![
        plain("100.00"),
        plain("5100.00"),
        described("900.00", "ACH SETTLEMENT"),
        plain("7.77"),
    ];

    let outcome = engine.reconcile(gl, bank).unwrap();

    // partition invariant on both sides
    let matched_gl = outcome.gl_records.iter().filter(|r| r.consumed).count();
    let unmatched_gl = outcome.gl_records.iter().filter(|r| !r.consumed).count();
    assert_eq!(matched_gl + unmatched_gl, 4);
    assert_eq!(matched_gl, outcome.summary.matched_count);

    let matched_bank = outcome.bank_records.iter().filter(|r| r.consumed).count();
    let unmatched_bank = outcome
        .bank_records
        .iter()
        .filter(|r| !r.consumed)
        .count();
    assert_eq!(matched_bank + unmatched_bank, 4);
    assert_eq!(matched_bank, matched_gl);

    // no record id appears in two accepted matches
    let mut gl_ids = HashSet::new();
    let mut bank_ids = HashSet::new();
    for accepted in &outcome.matches {
        assert!(gl_ids.insert(accepted.candidate.gl_id.clone()));
        assert!(bank_ids.insert(accepted.candidate.bank_id.clone()));
    }

    // exact-amount soundness
    let tolerance = amount("0.01");
    for accepted in &outcome.matches {
        if accepted.candidate.strategy == StrategyKind::ExactAmount {
            assert!(accepted.candidate.amount_difference <= tolerance);
        }
    }

    // three different strategies contributed
    let strategies: HashSet<StrategyKind> = outcome
        .matches
        .iter()
        .map(|m| m.candidate.strategy)
        .collect();
    assert!(strategies.contains(&StrategyKind::ExactAmount));
    assert!(strategies.contains(&StrategyKind::PartialAmount));
    assert!(strategies.contains(&StrategyKind::PatternMatching));
}

#[test]
fn test_convergence_is_idempotent() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![plain("100.00"), plain("1234.00"), plain("77.00")];
    let bank = vec![plain("100.00"), plain("888.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();
    assert!(outcome.matches.len() < 3);

    // re-running over the final unmatched pools yields nothing new
    let unmatched_gl: Vec<_> = outcome
        .gl_records
        .into_iter()
        .filter(|r| !r.consumed)
        .collect();
    let unmatched_bank: Vec<_> = outcome
        .bank_records
        .into_iter()
        .filter(|r| !r.consumed)
        .collect();

    let rerun = engine
        .reconcile_records(unmatched_gl, unmatched_bank)
        .unwrap();
    assert_eq!(rerun.matches.len(), 0);
    assert_eq!(rerun.termination, Termination::Converged);
}

#[test]
fn test_variance_arithmetic_is_exact() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![plain("1000.00"), plain("1500.50"), plain("-200.25")];
    let bank = vec![plain("1000.01"), plain("999.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();

    assert_eq!(outcome.summary.gl_total, amount("2300.25"));
    assert_eq!(outcome.summary.bank_total, amount("1999.01"));
    assert_eq!(
        outcome.summary.variance,
        &outcome.summary.gl_total - &outcome.summary.bank_total
    );
    assert_eq!(outcome.summary.variance, amount("301.24"));
    assert!(outcome.summary.is_balanced);
}

#[test]
fn test_amount_date_strategy_in_custom_stack() {
    // on its own, the amount-date strategy corroborates amounts with dates
    let config = EngineConfig::default();
    let strategies: Vec<Box<dyn MatchStrategy>> =
        vec![Box::new(AmountDateStrategy::new(&config))];
    let engine = ReconciliationEngine::with_strategies(config, strategies).unwrap();

    let gl = vec![InputRecord {
        amount: Some(amount("750.00")),
        date: NaiveDate::from_ymd_opt(2024, 5, 10),
        ..InputRecord::default()
    }];
    let bank = vec![InputRecord {
        amount: Some(amount("750.00")),
        date: NaiveDate::from_ymd_opt(2024, 5, 12),
        ..InputRecord::default()
    }];

    let outcome = engine.reconcile(gl, bank).unwrap();
    assert_eq!(outcome.matches.len(), 1);

    let candidate = &outcome.matches[0].candidate;
    assert_eq!(candidate.strategy, StrategyKind::AmountDate);
    // amounts identical, dates 2 of 3 days apart
    let expected = (1.0 + (1.0 - 2.0 / 3.0)) / 2.0;
    assert!((candidate.confidence - expected).abs() < 1e-9);
}

#[test]
fn test_description_strategy_in_custom_stack() {
    let config = EngineConfig::default();
    let strategies: Vec<Box<dyn MatchStrategy>> =
        vec![Box::new(DescriptionSimilarityStrategy::new(&config))];
    let engine = ReconciliationEngine::with_strategies(config, strategies).unwrap();

    let gl = vec![described("64.00", "AMAZON WEB SERVICES INV 2210")];
    let bank = vec![described("64.00", "AMAZON WEB SERVICES INV 2211")];

    let outcome = engine.reconcile(gl, bank).unwrap();
    assert_eq!(outcome.matches.len(), 1);

    let candidate = &outcome.matches[0].candidate;
    assert_eq!(candidate.strategy, StrategyKind::DescriptionSimilarity);
    assert!(candidate.confidence >= 0.6);
}

#[test]
fn test_report_structure_serializes() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![described("100.00", "CHK 2210 RENT"), plain("9999.00")];
    let bank = vec![plain("100.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();
    let json = serde_json::to_value(&outcome.report).unwrap();

    for section in [
        "report_metadata",
        "reconciliation_summary",
        "strategy_analysis",
        "iteration_history",
        "detailed_matches",
        "unmatched_analysis",
        "recommendations",
    ] {
        assert!(json.get(section).is_some(), "missing section {section}");
    }

    let detail = &json["detailed_matches"][0];
    assert_eq!(detail["match_number"], 1);
    assert_eq!(detail["match_type"], "exact_amount");
    assert!(detail["gl_transaction"]["id"].is_string());
    assert!(detail["audit_trail"]["match_reason"].is_string());

    assert_eq!(json["strategy_analysis"]["exact_amount"]["matches_found"], 1);
    assert_eq!(json["report_metadata"]["total_matches"], 1);
}

#[tokio::test]
async fn test_report_persists_through_sink() {
    let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();

    let gl = vec![plain("310.00"), plain("20.00")];
    let bank = vec![plain("310.00"), plain("20.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();

    let mut sink = MemorySink::new();
    sink.persist_report(&outcome.report).await.unwrap();
    sink.persist_match_rows(&outcome.report.flat_rows())
        .await
        .unwrap();

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_metadata.run_id, outcome.run_id);

    let rows = sink.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].match_number, 1);
    assert_eq!(rows[1].match_number, 2);
}

#[test]
fn test_target_rate_stops_before_round_limit() {
    let mut config = EngineConfig::default();
    config.target_match_rate = 50.0;
    let engine = ReconciliationEngine::new(config).unwrap();

    let gl = vec![plain("10.00"), plain("77.00")];
    let bank = vec![plain("10.00")];

    let outcome = engine.reconcile(gl, bank).unwrap();
    assert_eq!(outcome.termination, Termination::TargetReached);
    assert_eq!(outcome.rounds_completed, 1);
    assert_eq!(outcome.summary.match_rate, 50.0);
}

#[test]
fn test_invalid_configuration_never_touches_pools() {
    let mut config = EngineConfig::default();
    config.date_tolerance_days = -1;

    assert!(ReconciliationEngine::new(config).is_err());
}
