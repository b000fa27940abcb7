//! Intake of normalized transaction data into matchable records
//!
//! The upstream normalizer hands over one [`InputRecord`] per ledger row.
//! Intake assigns stable identifiers, derives the matching fields
//! (normalized description, transaction type) exactly once, and diverts
//! records that fail validation into a rejection list instead of failing
//! the run.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::traits::{DefaultRecordValidator, RecordValidator};
use crate::types::*;

/// A transaction row as delivered by the upstream normalizer
///
/// Every field is optional at this point; intake decides which absences
/// are acceptable. An amount is always required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Optional grouping key, e.g. the GL account number
    pub source_account: Option<String>,
    /// Signed net amount
    pub amount: Option<BigDecimal>,
    /// Transaction date
    pub date: Option<NaiveDate>,
    /// Free-text description
    pub description: Option<String>,
}

impl InputRecord {
    /// Convenience constructor for a record carrying only an amount
    pub fn with_amount(amount: BigDecimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}

/// Outcome of intake for one side
#[derive(Debug, Clone, PartialEq)]
pub struct Intake {
    /// Records accepted into the pool, in input order
    pub records: Vec<TransactionRecord>,
    /// Records excluded from the pool, with reasons
    pub rejected: Vec<RejectedRecord>,
}

/// Uppercase a description and collapse runs of whitespace
pub fn normalize_description(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Build matchable records for one side using the default validator
pub fn build_records(side: Side, inputs: Vec<InputRecord>) -> Intake {
    build_records_with_validator(side, inputs, &DefaultRecordValidator)
}

/// Build matchable records for one side with a caller-supplied validator
///
/// Invalid records are never silently dropped: each one becomes a
/// [`RejectedRecord`] carrying its input position and the reason.
pub fn build_records_with_validator(
    side: Side,
    inputs: Vec<InputRecord>,
    validator: &dyn RecordValidator,
) -> Intake {
    let mut records = Vec::with_capacity(inputs.len());
    let mut rejected = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        if let Err(error) = validator.validate_record(&input) {
            warn!(
                "Excluding {} record at position {}: {}",
                side.as_str(),
                index,
                error
            );
            rejected.push(RejectedRecord {
                side,
                index,
                reason: error.to_string(),
            });
            continue;
        }

        // The validator guarantees an amount is present.
        let Some(amount) = input.amount else {
            rejected.push(RejectedRecord {
                side,
                index,
                reason: "missing amount".to_string(),
            });
            continue;
        };

        let raw_description = input.description.unwrap_or_default();
        let normalized_description = normalize_description(&raw_description);
        let transaction_type = TransactionType::classify(&normalized_description);

        records.push(TransactionRecord {
            id: format!("{}_{}", index, side.as_str()),
            side,
            source_account: input.source_account,
            amount,
            date: input.date,
            raw_description,
            normalized_description,
            transaction_type,
            consumed: false,
        });
    }

    Intake { records, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_description() {
        assert_eq!(
            normalize_description("  ach   payroll \t run "),
            "ACH PAYROLL RUN"
        );
        assert_eq!(normalize_description(""), "");
    }

    #[test]
    fn test_build_records_assigns_ids_and_types() {
        let inputs = vec![
            InputRecord {
                source_account: Some("7401".to_string()),
                amount: Some(BigDecimal::from(250)),
                date: NaiveDate::from_ymd_opt(2024, 3, 4),
                description: Some("ACH vendor payment".to_string()),
            },
            InputRecord::with_amount(BigDecimal::from(-75)),
        ];

        let intake = build_records(Side::Gl, inputs);
        assert!(intake.rejected.is_empty());
        assert_eq!(intake.records.len(), 2);

        let first = &intake.records[0];
        assert_eq!(first.id, "0_GL");
        assert_eq!(first.side, Side::Gl);
        assert_eq!(first.normalized_description, "ACH VENDOR PAYMENT");
        assert_eq!(first.transaction_type, TransactionType::Ach);
        assert!(!first.consumed);

        let second = &intake.records[1];
        assert_eq!(second.id, "1_GL");
        assert_eq!(second.transaction_type, TransactionType::Other);
        assert!(second.date.is_none());
    }

    #[test]
    fn test_missing_amount_is_rejected_not_fatal() {
        let inputs = vec![
            InputRecord {
                description: Some("no amount here".to_string()),
                ..InputRecord::default()
            },
            InputRecord::with_amount(BigDecimal::from(10)),
        ];

        let intake = build_records(Side::Bank, inputs);
        assert_eq!(intake.records.len(), 1);
        assert_eq!(intake.rejected.len(), 1);

        let rejection = &intake.rejected[0];
        assert_eq!(rejection.side, Side::Bank);
        assert_eq!(rejection.index, 0);
        assert!(rejection.reason.contains("amount"));

        // identifiers keep their input position even after a rejection
        assert_eq!(intake.records[0].id, "1_BANK");
    }
}
