//! Basic reconciliation usage example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use recon_core::{EngineConfig, InputRecord, ReconciliationEngine};

fn record(amount: &str, date: (i32, u32, u32), description: &str) -> InputRecord {
    InputRecord {
        source_account: None,
        amount: Some(amount.parse::<BigDecimal>().unwrap()),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        description: Some(description.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("🧾 Recon Core - Basic Reconciliation Example\n");

    // 1. Build the engine with default configuration
    let engine = ReconciliationEngine::new(EngineConfig::default())?;
    println!("📊 Target match rate: {}%", engine.config().target_match_rate);
    println!("📊 Max rounds: {}\n", engine.config().max_rounds);

    // 2. Two small ledgers, as they would arrive from the normalizer
    let gl = vec![
        record("1250.00", (2024, 6, 3), "ACH PAYROLL RUN 112"),
        record("-89.50", (2024, 6, 4), "CHK 2210 OFFICE SUPPLIES"),
        record("5000.00", (2024, 6, 5), "WIRE OUT ACME HOLDINGS"),
        record("42.00", (2024, 6, 6), "ADJUSTMENT"),
    ];
    let bank = vec![
        record("1250.00", (2024, 6, 3), "ACH PAYROLL 112"),
        record("-89.50", (2024, 6, 5), "CHECK 2210"),
        record("5050.00", (2024, 6, 5), "WIRE ACME HOLDINGS"),
    ];

    // 3. Run the reconciliation
    let outcome = engine.reconcile(gl, bank)?;

    println!("✅ Run {} finished: {:?}", outcome.run_id, outcome.termination);
    println!("   Rounds: {}", outcome.rounds_completed);
    println!("   Match rate: {:.1}%\n", outcome.summary.match_rate);

    // 4. Walk the accepted matches
    println!("🔍 Accepted matches:");
    for accepted in &outcome.matches {
        let c = &accepted.candidate;
        println!(
            "   #{} [{}] {} <-> {} (confidence {:.2})",
            accepted.match_number,
            c.strategy.as_str(),
            c.gl_id,
            c.bank_id,
            c.confidence
        );
        println!("      {}", c.rationale);
    }
    println!();

    // 5. Variance analysis
    let summary = &outcome.summary;
    println!("💰 GL total:   {}", summary.gl_total);
    println!("💰 Bank total: {}", summary.bank_total);
    println!("💰 Variance:   {}", summary.variance);
    match summary.variance_pct {
        Some(pct) => println!("💰 Variance %: {pct:.2}%"),
        None => println!("💰 Variance %: n/a (zero GL total)"),
    }
    println!(
        "💰 Balanced:   {}\n",
        if summary.is_balanced { "yes" } else { "no" }
    );

    // 6. What was left over
    println!("❌ Unmatched GL:   {:?}", summary.unmatched_gl_ids);
    println!("❌ Unmatched Bank: {:?}", summary.unmatched_bank_ids);

    Ok(())
}
