//! Validation utilities

use bigdecimal::BigDecimal;

use crate::ingest::InputRecord;
use crate::traits::RecordValidator;
use crate::types::*;

/// Validate that a rate expressed in percent lies in [0, 100]
pub fn validate_percentage(name: &str, value: f64) -> ReconciliationResult<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ReconciliationError::InvalidConfig(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a ratio lies in [0, 1]
pub fn validate_unit_interval(name: &str, value: f64) -> ReconciliationResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ReconciliationError::InvalidConfig(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

/// Validate that an amount-valued option is not negative
pub fn validate_non_negative_amount(name: &str, value: &BigDecimal) -> ReconciliationResult<()> {
    if *value < BigDecimal::from(0) {
        return Err(ReconciliationError::InvalidConfig(format!(
            "{name} cannot be negative, got {value}"
        )));
    }
    Ok(())
}

/// Record validator that also insists on the recommended optional fields
///
/// The default validator only requires an amount; this one additionally
/// rejects records without a date or a non-empty description, for callers
/// that want date- and description-based strategies to see every record.
pub struct StrictRecordValidator;

impl RecordValidator for StrictRecordValidator {
    fn validate_record(&self, record: &InputRecord) -> ReconciliationResult<()> {
        if record.amount.is_none() {
            return Err(ReconciliationError::InvalidRecord(
                "missing amount".to_string(),
            ));
        }

        if record.date.is_none() {
            return Err(ReconciliationError::InvalidRecord(
                "missing date".to_string(),
            ));
        }

        let has_description = record
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if !has_description {
            return Err(ReconciliationError::InvalidRecord(
                "missing description".to_string(),
            ));
        }

        Ok(())
    }
}
