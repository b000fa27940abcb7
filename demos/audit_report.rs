//! Audit report generation example

use bigdecimal::BigDecimal;
use recon_core::utils::MemorySink;
use recon_core::{EngineConfig, InputRecord, ReconciliationEngine, ReportSink};

fn record(amount: &str, description: &str) -> InputRecord {
    InputRecord {
        source_account: Some("7401".to_string()),
        amount: Some(amount.parse::<BigDecimal>().unwrap()),
        date: None,
        description: Some(description.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("📄 Recon Core - Audit Report Example\n");

    let engine = ReconciliationEngine::new(EngineConfig::default())?;

    let gl = vec![
        record("2400.00", "ACH VENDOR SETTLEMENT 77"),
        record("150.00", "DEP BRANCH 4"),
        record("12000.00", "WIRE OUT PROJECT FUNDING"),
    ];
    let bank = vec![
        record("2400.00", "ACH SETTLEMENT 77"),
        record("150.00", "DEPOSIT BRANCH 4"),
        record("12500.00", "WIRE PROJECT FUNDING"),
    ];

    let outcome = engine.reconcile(gl, bank)?;
    let report = &outcome.report;

    // Per-strategy aggregate performance
    println!("🎯 Strategy analysis:");
    for (kind, analysis) in &report.strategy_analysis {
        println!(
            "   {}: {} matches, avg confidence {:.2}, matched amount {}",
            kind.as_str(),
            analysis.matches_found,
            analysis.avg_confidence,
            analysis.total_matched_amount
        );
    }
    println!();

    // Reviewer-facing recommendations
    println!("💡 Recommendations:");
    for rec in &report.recommendations {
        println!("   {:?}: {}", rec.priority, rec.recommendation);
        println!("      Action: {}", rec.action);
    }
    println!();

    // The structured document is plain serde data
    println!("🗂  Structured report (metadata section):");
    println!(
        "{}",
        serde_json::to_string_pretty(&report.report_metadata)?
    );
    println!();

    // The flat listing is one row per match
    println!("📋 Flat match rows:");
    for row in report.flat_rows() {
        println!("{}", serde_json::to_string(&row)?);
    }
    println!();

    // Hand both shapes to a persistence sink
    let mut sink = MemorySink::new();
    sink.persist_report(report).await?;
    sink.persist_match_rows(&report.flat_rows()).await?;
    println!(
        "✅ Persisted {} report(s) and {} row(s) to the sink",
        sink.reports().len(),
        sink.rows().len()
    );

    Ok(())
}
