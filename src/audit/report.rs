//! Structured audit report and flat match listing

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::audit::recorder::AuditRecorder;
use crate::config::EngineConfig;
use crate::engine::pool::TransactionPool;
use crate::types::*;

/// Identification and headline figures for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Unique identifier of the run
    pub run_id: Uuid,
    /// When the report was assembled
    pub generated_at: NaiveDateTime,
    /// Configured target match rate, in percent
    pub target_match_rate: f64,
    /// Match rate actually achieved, in percent
    pub achieved_match_rate: f64,
    /// GL records that entered the pool
    pub total_gl_transactions: usize,
    /// Bank records that entered the pool
    pub total_bank_transactions: usize,
    /// Matches accepted across all rounds
    pub total_matches: usize,
    /// GL records left unmatched
    pub unmatched_gl_count: usize,
    /// Bank records left unmatched
    pub unmatched_bank_count: usize,
}

/// One side of a match as shown in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub id: String,
    pub source_account: Option<String>,
    pub description: String,
    pub amount: BigDecimal,
    pub date: Option<NaiveDate>,
    pub transaction_type: TransactionType,
}

impl TransactionDetail {
    fn from_record(record: &TransactionRecord) -> Self {
        Self {
            id: record.id.clone(),
            source_account: record.source_account.clone(),
            description: record.raw_description.clone(),
            amount: record.amount.clone(),
            date: record.date,
            transaction_type: record.transaction_type,
        }
    }
}

/// The per-match justification carried into the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAudit {
    /// Strategy that accepted the pairing
    pub strategy: StrategyKind,
    /// Human-readable reason the pairing was accepted
    pub match_reason: String,
}

/// Full detail of one accepted match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMatch {
    pub match_number: usize,
    pub round: usize,
    pub match_type: StrategyKind,
    pub match_confidence: f64,
    pub amount_difference: BigDecimal,
    pub gl_transaction: TransactionDetail,
    pub bank_transaction: TransactionDetail,
    pub audit_trail: MatchAudit,
}

/// Aggregate performance of one strategy across the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    /// Matches this strategy contributed
    pub matches_found: usize,
    /// Mean confidence over those matches; 0.0 when none were found
    pub avg_confidence: f64,
    /// Sum of GL amounts over those matches
    pub total_matched_amount: BigDecimal,
    /// Configured priority weight
    pub weight: f64,
}

/// Coarse size classification used in the unmatched listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountBand {
    Large,
    Small,
}

/// One unmatched record, annotated for manual review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedTransaction {
    pub id: String,
    pub description: String,
    pub amount: BigDecimal,
    pub date: Option<NaiveDate>,
    pub transaction_type: TransactionType,
    pub amount_band: AmountBand,
    pub has_description: bool,
}

/// Everything that found no counterpart, per side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedAnalysis {
    pub gl: Vec<UnmatchedTransaction>,
    pub bank: Vec<UnmatchedTransaction>,
    pub unmatched_gl_amount: BigDecimal,
    pub unmatched_bank_amount: BigDecimal,
}

/// Urgency of a generated recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

/// What a generated recommendation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    StrategyPerformance,
    StrategyTuning,
    UnmatchedReview,
}

/// A reviewer-facing suggestion derived from the run's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: RecommendationPriority,
    pub recommendation: String,
    pub action: String,
}

/// The complete structured audit document for one run
///
/// Serializes to a self-contained, language-agnostic hierarchy suitable
/// for nested inspection; [`AuditReport::flat_rows`] derives the tabular
/// one-row-per-match view from the same data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub report_metadata: ReportMetadata,
    pub reconciliation_summary: ReconciliationSummary,
    pub strategy_analysis: HashMap<StrategyKind, StrategyAnalysis>,
    pub iteration_history: Vec<IterationRecord>,
    pub detailed_matches: Vec<DetailedMatch>,
    pub unmatched_analysis: UnmatchedAnalysis,
    pub recommendations: Vec<Recommendation>,
}

impl AuditReport {
    /// The flat one-row-per-match listing for spreadsheet review
    pub fn flat_rows(&self) -> Vec<MatchRow> {
        self.detailed_matches
            .iter()
            .map(|detail| MatchRow {
                match_number: detail.match_number,
                match_type: detail.match_type,
                match_confidence: detail.match_confidence,
                gl_id: detail.gl_transaction.id.clone(),
                gl_account: detail.gl_transaction.source_account.clone(),
                gl_description: detail.gl_transaction.description.clone(),
                gl_amount: detail.gl_transaction.amount.clone(),
                gl_date: detail.gl_transaction.date,
                gl_type: detail.gl_transaction.transaction_type,
                bank_id: detail.bank_transaction.id.clone(),
                bank_description: detail.bank_transaction.description.clone(),
                bank_amount: detail.bank_transaction.amount.clone(),
                bank_date: detail.bank_transaction.date,
                bank_type: detail.bank_transaction.transaction_type,
                match_reason: detail.audit_trail.match_reason.clone(),
            })
            .collect()
    }
}

/// One row of the flat match listing
///
/// Field names serialize in the spreadsheet column convention expected by
/// downstream reviewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    #[serde(rename = "Match_Number")]
    pub match_number: usize,
    #[serde(rename = "Match_Type")]
    pub match_type: StrategyKind,
    #[serde(rename = "Match_Confidence")]
    pub match_confidence: f64,
    #[serde(rename = "GL_ID")]
    pub gl_id: String,
    #[serde(rename = "GL_Account")]
    pub gl_account: Option<String>,
    #[serde(rename = "GL_Description")]
    pub gl_description: String,
    #[serde(rename = "GL_Amount")]
    pub gl_amount: BigDecimal,
    #[serde(rename = "GL_Date")]
    pub gl_date: Option<NaiveDate>,
    #[serde(rename = "GL_Type")]
    pub gl_type: TransactionType,
    #[serde(rename = "Bank_ID")]
    pub bank_id: String,
    #[serde(rename = "Bank_Description")]
    pub bank_description: String,
    #[serde(rename = "Bank_Amount")]
    pub bank_amount: BigDecimal,
    #[serde(rename = "Bank_Date")]
    pub bank_date: Option<NaiveDate>,
    #[serde(rename = "Bank_Type")]
    pub bank_type: TransactionType,
    #[serde(rename = "Match_Reason")]
    pub match_reason: String,
}

/// Assemble the structured audit report for a finished run
///
/// Every candidate's record references are resolved against the pools; a
/// dangling reference means the matching engine corrupted its own state,
/// so assembly fails with a consistency error instead of omitting the
/// match.
pub fn build_report(
    run_id: Uuid,
    config: &EngineConfig,
    recorder: &AuditRecorder,
    gl_pool: &TransactionPool,
    bank_pool: &TransactionPool,
    summary: &ReconciliationSummary,
) -> ReconciliationResult<AuditReport> {
    let mut detailed_matches = Vec::with_capacity(recorder.total_matches());
    let mut analysis: HashMap<StrategyKind, StrategyAnalysis> = HashMap::new();
    let mut confidence_sums: HashMap<StrategyKind, f64> = HashMap::new();

    for accepted in recorder.matches() {
        let candidate = &accepted.candidate;
        let gl_record = resolve(gl_pool, &candidate.gl_id)?;
        let bank_record = resolve(bank_pool, &candidate.bank_id)?;

        let entry = analysis
            .entry(candidate.strategy)
            .or_insert_with(|| StrategyAnalysis {
                matches_found: 0,
                avg_confidence: 0.0,
                total_matched_amount: BigDecimal::from(0),
                weight: config.weight(candidate.strategy),
            });
        entry.matches_found += 1;
        entry.total_matched_amount += &gl_record.amount;
        *confidence_sums.entry(candidate.strategy).or_default() += candidate.confidence;

        detailed_matches.push(DetailedMatch {
            match_number: accepted.match_number,
            round: accepted.round,
            match_type: candidate.strategy,
            match_confidence: candidate.confidence,
            amount_difference: candidate.amount_difference.clone(),
            gl_transaction: TransactionDetail::from_record(gl_record),
            bank_transaction: TransactionDetail::from_record(bank_record),
            audit_trail: MatchAudit {
                strategy: candidate.strategy,
                match_reason: candidate.rationale.clone(),
            },
        });
    }

    for (kind, entry) in analysis.iter_mut() {
        let sum = confidence_sums.get(kind).copied().unwrap_or(0.0);
        entry.avg_confidence = sum / entry.matches_found as f64;
    }

    let unmatched_analysis = UnmatchedAnalysis {
        gl: unmatched_listing(gl_pool, &config.partial_amount_min),
        bank: unmatched_listing(bank_pool, &config.partial_amount_min),
        unmatched_gl_amount: gl_pool.unmatched_amount(),
        unmatched_bank_amount: bank_pool.unmatched_amount(),
    };

    let recommendations = build_recommendations(config, &analysis, &unmatched_analysis.gl);

    let report_metadata = ReportMetadata {
        run_id,
        generated_at: chrono::Utc::now().naive_utc(),
        target_match_rate: config.target_match_rate,
        achieved_match_rate: summary.match_rate,
        total_gl_transactions: gl_pool.len(),
        total_bank_transactions: bank_pool.len(),
        total_matches: recorder.total_matches(),
        unmatched_gl_count: gl_pool.unmatched_count(),
        unmatched_bank_count: bank_pool.unmatched_count(),
    };

    Ok(AuditReport {
        report_metadata,
        reconciliation_summary: summary.clone(),
        strategy_analysis: analysis,
        iteration_history: recorder.iterations().to_vec(),
        detailed_matches,
        unmatched_analysis,
        recommendations,
    })
}

fn resolve<'a>(
    pool: &'a TransactionPool,
    id: &str,
) -> ReconciliationResult<&'a TransactionRecord> {
    pool.get(id).ok_or_else(|| {
        ReconciliationError::Consistency(format!(
            "Match references {} record '{}' that is missing from the pool",
            pool.side().as_str(),
            id
        ))
    })
}

fn unmatched_listing(pool: &TransactionPool, large_threshold: &BigDecimal) -> Vec<UnmatchedTransaction> {
    pool.unmatched()
        .into_iter()
        .map(|record| UnmatchedTransaction {
            id: record.id.clone(),
            description: record.raw_description.clone(),
            amount: record.amount.clone(),
            date: record.date,
            transaction_type: record.transaction_type,
            amount_band: if record.amount.abs() >= *large_threshold {
                AmountBand::Large
            } else {
                AmountBand::Small
            },
            has_description: !record.normalized_description.is_empty(),
        })
        .collect()
}

fn build_recommendations(
    config: &EngineConfig,
    analysis: &HashMap<StrategyKind, StrategyAnalysis>,
    unmatched_gl: &[UnmatchedTransaction],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let exact_count = analysis
        .get(&StrategyKind::ExactAmount)
        .map(|a| a.matches_found)
        .unwrap_or(0);
    if exact_count > 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::StrategyPerformance,
            priority: RecommendationPriority::High,
            recommendation: format!(
                "Exact amount matching found {exact_count} matches - continue using this strategy"
            ),
            action: "Maintain exact amount matching with current tolerance".to_string(),
        });
    }

    let similarity_count = analysis
        .get(&StrategyKind::DescriptionSimilarity)
        .map(|a| a.matches_found)
        .unwrap_or(0);
    if similarity_count == 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::StrategyTuning,
            priority: RecommendationPriority::Medium,
            recommendation:
                "Description similarity matching found no matches - consider adjusting the similarity threshold"
                    .to_string(),
            action: format!(
                "Lower the similarity threshold below {:.2} or review description normalization",
                config.description_similarity_threshold
            ),
        });
    }

    let large_unmatched = unmatched_gl
        .iter()
        .filter(|t| t.amount_band == AmountBand::Large)
        .count();
    if large_unmatched > 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::UnmatchedReview,
            priority: RecommendationPriority::High,
            recommendation: format!(
                "Found {large_unmatched} large unmatched GL transactions - investigate manually"
            ),
            action:
                "Review large unmatched transactions for potential aggregation or timing differences"
                    .to_string(),
        });
    }

    recommendations
}
