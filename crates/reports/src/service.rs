//! The roll-up service.
//!
//! A report parent (a mission report, or a special mission acting as its
//! own) stores the aggregate outcome of its operative reports. Every
//! filing, amendment, or strike recomputes the aggregate from the full
//! surviving child set (never incrementally) and writes it back
//! under the parent's version, so a concurrent edit of the parent
//! surfaces as a `Conflict` rather than a silently lost roll-up.

use thiserror::Error;
use tracing::{debug, info};

use dcis_core::{Entity, EntityId, EntityStore, StoreError};
use dcis_domain::{
    Mission, MissionReport, OperativeReport, OperativeSpecialReport, SpecialMission, SuccessState,
};

use crate::aggregator::{AggregationPolicy, WorstCase};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report is finalized")]
    Finalized,
    #[error("an override must be a recorded outcome")]
    UndeterminedOverride,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// A record that aggregates operative reports filed against it.
pub trait ReportParent: Entity {
    fn objectives_met(&self) -> SuccessState;
    fn set_objectives_met(&mut self, state: SuccessState);
    fn success_override(&self) -> Option<SuccessState>;
    fn set_success_override(&mut self, state: Option<SuccessState>);
    fn finalized(&self) -> bool;
    fn set_finalized(&mut self);
}

/// A child record contributing one outcome to its parent's aggregate.
pub trait OutcomeReport: Entity {
    fn outcome(&self) -> SuccessState;
}

impl ReportParent for MissionReport {
    fn objectives_met(&self) -> SuccessState {
        self.objectives_met
    }
    fn set_objectives_met(&mut self, state: SuccessState) {
        self.objectives_met = state;
    }
    fn success_override(&self) -> Option<SuccessState> {
        self.success_override
    }
    fn set_success_override(&mut self, state: Option<SuccessState>) {
        self.success_override = state;
    }
    fn finalized(&self) -> bool {
        self.finalized
    }
    fn set_finalized(&mut self) {
        self.finalized = true;
    }
}

impl ReportParent for SpecialMission {
    fn objectives_met(&self) -> SuccessState {
        self.objectives_met
    }
    fn set_objectives_met(&mut self, state: SuccessState) {
        self.objectives_met = state;
    }
    fn success_override(&self) -> Option<SuccessState> {
        self.success_override
    }
    fn set_success_override(&mut self, state: Option<SuccessState>) {
        self.success_override = state;
    }
    fn finalized(&self) -> bool {
        self.finalized
    }
    fn set_finalized(&mut self) {
        self.finalized = true;
    }
}

impl OutcomeReport for OperativeReport {
    fn outcome(&self) -> SuccessState {
        self.outcome
    }
}

impl OutcomeReport for OperativeSpecialReport {
    fn outcome(&self) -> SuccessState {
        self.outcome
    }
}

/// Files and amends operative reports under one parent, keeping the
/// parent's stored aggregate current.
pub struct RollupService<P, C, PS, CS, A = WorstCase>
where
    P: ReportParent,
    C: OutcomeReport,
    PS: EntityStore<P>,
    CS: EntityStore<C>,
    A: AggregationPolicy,
{
    parents: PS,
    children: CS,
    policy: A,
    _marker: std::marker::PhantomData<fn() -> (P, C)>,
}

impl<P, C, PS, CS> RollupService<P, C, PS, CS, WorstCase>
where
    P: ReportParent,
    C: OutcomeReport,
    PS: EntityStore<P>,
    CS: EntityStore<C>,
{
    pub fn new(parents: PS, children: CS) -> Self {
        Self::with_policy(parents, children, WorstCase)
    }
}

impl<P, C, PS, CS, A> RollupService<P, C, PS, CS, A>
where
    P: ReportParent,
    C: OutcomeReport,
    PS: EntityStore<P>,
    CS: EntityStore<C>,
    A: AggregationPolicy,
{
    pub fn with_policy(parents: PS, children: CS, policy: A) -> Self {
        Self {
            parents,
            children,
            policy,
            _marker: std::marker::PhantomData,
        }
    }

    /// File a new operative report against its parent and fold it into
    /// the aggregate. Rejected once the parent is finalized.
    pub fn file(&self, child: &C, actor: Option<EntityId>) -> Result<C> {
        let parent_id = self.parent_of(child)?;
        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }

        let saved = self.children.insert(child, actor)?;
        self.recompute(parent_id, actor)?;
        Ok(saved)
    }

    /// Write an amended operative report under its version and refresh
    /// the aggregate.
    pub fn amend(&self, child: &C, expected_version: u64, actor: Option<EntityId>) -> Result<C> {
        let parent_id = self.parent_of(child)?;
        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }

        let saved = self.children.save(child, expected_version, actor)?;
        self.recompute(parent_id, actor)?;
        Ok(saved)
    }

    /// Strike an operative report from the record (tombstone it) and
    /// refresh the aggregate over the survivors.
    pub fn strike(
        &self,
        child_id: EntityId,
        expected_version: u64,
        actor: Option<EntityId>,
    ) -> Result<C> {
        let child = self.children.load(child_id)?;
        let parent_id = self.parent_of(&child)?;
        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }

        let struck = self.children.soft_delete(child_id, expected_version, actor)?;
        self.recompute(parent_id, actor)?;
        Ok(struck)
    }

    /// Pin the parent's outcome, suppressing automatic roll-up until the
    /// override is cleared. An override must name a recorded outcome.
    pub fn set_override(
        &self,
        parent_id: EntityId,
        state: SuccessState,
        actor: Option<EntityId>,
    ) -> Result<P> {
        if !state.is_determined() {
            return Err(ReportError::UndeterminedOverride);
        }

        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }

        let mut updated = parent.clone();
        updated.set_success_override(Some(state));
        updated.set_objectives_met(state);
        let saved = self.parents.save(&updated, parent.version(), actor)?;
        info!(parent = %parent_id, ?state, "Outcome override set");
        Ok(saved)
    }

    /// Drop the override and recompute the aggregate from the children.
    pub fn clear_override(&self, parent_id: EntityId, actor: Option<EntityId>) -> Result<P> {
        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }

        let mut updated = parent.clone();
        updated.set_success_override(None);
        updated.set_objectives_met(self.aggregate_children(parent_id)?);
        let saved = self.parents.save(&updated, parent.version(), actor)?;
        info!(parent = %parent_id, "Outcome override cleared");
        Ok(saved)
    }

    /// Close the parent. Finalization is one-way; it ends the authors'
    /// edit window on the children.
    pub fn finalize(&self, parent_id: EntityId, actor: Option<EntityId>) -> Result<P> {
        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }

        let mut updated = parent.clone();
        updated.set_finalized();
        let saved = self.parents.save(&updated, parent.version(), actor)?;
        info!(parent = %parent_id, outcome = ?saved.objectives_met(), "Report finalized");
        Ok(saved)
    }

    /// Recompute and store the parent's aggregate from the surviving
    /// child set. A no-op while an override is pinned; refused once the
    /// parent is finalized, so an interleaved finalize can never have
    /// its frozen aggregate overwritten.
    ///
    /// The parent is written under its version even when the aggregate
    /// value is unchanged. The version bump is what serializes a
    /// recomputation against a concurrent parent edit or finalize: the
    /// later write loses with `Conflict` instead of clobbering.
    pub fn recompute(&self, parent_id: EntityId, actor: Option<EntityId>) -> Result<P> {
        let parent = self.live_parent(parent_id)?;
        if parent.finalized() {
            return Err(ReportError::Finalized);
        }
        if parent.success_override().is_some() {
            return Ok(parent);
        }

        let aggregate = self.aggregate_children(parent_id)?;
        let mut updated = parent.clone();
        updated.set_objectives_met(aggregate);
        let saved = self.parents.save(&updated, parent.version(), actor)?;
        debug!(parent = %parent_id, ?aggregate, "Aggregate outcome recomputed");
        Ok(saved)
    }

    fn aggregate_children(&self, parent_id: EntityId) -> Result<SuccessState> {
        let outcomes: Vec<SuccessState> = self
            .children
            .children_of(parent_id)?
            .iter()
            .map(|c| c.outcome())
            .collect();
        Ok(self.policy.aggregate(&outcomes))
    }

    /// A retired parent is terminal: no further filings or aggregation.
    fn live_parent(&self, parent_id: EntityId) -> Result<P> {
        let parent = self.parents.load(parent_id)?;
        if parent.meta().is_deleted() {
            return Err(ReportError::Store(StoreError::Validation(format!(
                "{} {} is retired",
                P::KIND,
                parent_id
            ))));
        }
        Ok(parent)
    }

    fn parent_of(&self, child: &C) -> Result<EntityId> {
        child.parent_id().ok_or_else(|| {
            ReportError::Store(StoreError::Validation(
                "operative report is not attached to a parent".into(),
            ))
        })
    }
}

/// Retire a mission: tombstone it and cascade the tombstone onto every
/// report filed against it. The mission delete is guarded by the caller's
/// expected version; the cascade then walks the surviving reports.
pub fn retire_mission<MS, RS>(
    missions: &MS,
    reports: &RS,
    mission_id: EntityId,
    expected_version: u64,
    actor: Option<EntityId>,
) -> Result<()>
where
    MS: EntityStore<Mission>,
    RS: EntityStore<MissionReport>,
{
    missions.soft_delete(mission_id, expected_version, actor)?;

    let children = reports.children_of(mission_id)?;
    for report in &children {
        reports.soft_delete(report.meta.id, report.meta.version, actor)?;
    }

    info!(mission = %mission_id, reports = children.len(), "Mission retired");
    Ok(())
}
