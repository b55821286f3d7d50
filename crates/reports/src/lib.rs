//! Mission report aggregation for DCIS.
//!
//! Operative reports file against a parent (a mission report, or a
//! special mission acting as its own), and the parent stores the
//! aggregate outcome. The default policy is worst-case: the roll-up is
//! the worst recorded outcome, and any unrecorded contribution leaves
//! the whole aggregate undetermined.

pub mod aggregator;
pub mod service;

pub use aggregator::{AggregationPolicy, WorstCase};
pub use service::{
    retire_mission, OutcomeReport, ReportError, ReportParent, Result, RollupService,
};
