//! The five matching heuristics, in priority order

pub mod amount_date;
pub mod description;
pub mod exact_amount;
pub mod partial_amount;
pub mod pattern;

pub use amount_date::AmountDateStrategy;
pub use description::DescriptionSimilarityStrategy;
pub use exact_amount::ExactAmountStrategy;
pub use partial_amount::PartialAmountStrategy;
pub use pattern::PatternMatchingStrategy;

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::config::EngineConfig;
use crate::traits::MatchStrategy;

/// Build the default strategy stack in evaluation priority order
pub fn default_stack(config: &EngineConfig) -> Vec<Box<dyn MatchStrategy>> {
    vec![
        Box::new(ExactAmountStrategy::new(config)),
        Box::new(AmountDateStrategy::new(config)),
        Box::new(DescriptionSimilarityStrategy::new(config)),
        Box::new(PartialAmountStrategy::new(config)),
        Box::new(PatternMatchingStrategy::new(config)),
    ]
}

/// Absolute difference between two amounts
pub(crate) fn amount_difference(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    (a - b).abs()
}

/// Closeness score `1 - difference / tolerance`, clamped to [0, 1]
///
/// A zero tolerance only admits a zero difference, which scores 1.0.
pub(crate) fn closeness(difference: &BigDecimal, tolerance: &BigDecimal) -> f64 {
    if tolerance == &BigDecimal::from(0) {
        return 1.0;
    }
    let ratio = (difference / tolerance).to_f64().unwrap_or(1.0);
    (1.0 - ratio).clamp(0.0, 1.0)
}
