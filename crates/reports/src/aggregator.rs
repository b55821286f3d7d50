//! Outcome aggregation over a set of operative reports.

use dcis_domain::SuccessState;

/// How a set of individual outcomes rolls up into one aggregate.
pub trait AggregationPolicy {
    fn aggregate(&self, outcomes: &[SuccessState]) -> SuccessState;
}

/// The default policy: the aggregate is the worst recorded outcome.
///
/// An empty set, or a set containing any unrecorded outcome, yields
/// `Undetermined`: a roll-up is only as settled as its least settled
/// contribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstCase;

impl AggregationPolicy for WorstCase {
    fn aggregate(&self, outcomes: &[SuccessState]) -> SuccessState {
        if outcomes.is_empty() || outcomes.iter().any(|o| !o.is_determined()) {
            return SuccessState::Undetermined;
        }

        outcomes
            .iter()
            .copied()
            .max()
            .unwrap_or(SuccessState::Undetermined)
    }
}
