//! Accumulation of per-match and per-round audit state

use crate::types::*;

/// Collects every decision the engine makes during a run
///
/// Accepted candidates are tagged with their round and a sequential global
/// match number; each completed round contributes one [`IterationRecord`].
/// The recorder is append-only; report assembly reads it after the run.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    matches: Vec<AcceptedMatch>,
    iterations: Vec<IterationRecord>,
}

impl AuditRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted candidate, assigning the next global match number
    pub fn record_match(&mut self, round: usize, candidate: MatchCandidate) -> usize {
        let match_number = self.matches.len() + 1;
        self.matches.push(AcceptedMatch {
            match_number,
            round,
            candidate,
        });
        match_number
    }

    /// Record the completed state of one iteration round
    pub fn record_iteration(&mut self, record: IterationRecord) {
        self.iterations.push(record);
    }

    /// All accepted matches in acceptance order
    pub fn matches(&self) -> &[AcceptedMatch] {
        &self.matches
    }

    /// All iteration records in round order
    pub fn iterations(&self) -> &[IterationRecord] {
        &self.iterations
    }

    /// Number of accepted matches so far
    pub fn total_matches(&self) -> usize {
        self.matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn candidate(gl_id: &str, bank_id: &str) -> MatchCandidate {
        MatchCandidate {
            gl_id: gl_id.to_string(),
            bank_id: bank_id.to_string(),
            strategy: StrategyKind::ExactAmount,
            confidence: 1.0,
            amount_difference: BigDecimal::from(0),
            rationale: "Amounts match within $0.01 tolerance".to_string(),
        }
    }

    #[test]
    fn test_match_numbers_are_sequential() {
        let mut recorder = AuditRecorder::new();
        assert_eq!(recorder.record_match(1, candidate("0_GL", "0_BANK")), 1);
        assert_eq!(recorder.record_match(1, candidate("1_GL", "1_BANK")), 2);
        assert_eq!(recorder.record_match(2, candidate("2_GL", "2_BANK")), 3);

        let rounds: Vec<usize> = recorder.matches().iter().map(|m| m.round).collect();
        assert_eq!(rounds, vec![1, 1, 2]);
        assert_eq!(recorder.total_matches(), 3);
    }
}
