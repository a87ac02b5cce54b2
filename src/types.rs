//! Common scalar types shared across the scheduling core.

use serde::{Deserialize, Serialize};

/// A slot index on the discretised time axis. Slot 0 is the earliest
/// schedulable position.
pub type Slot = u32;

/// A 1-indexed court (resource) id.
pub type Court = u32;

/// Opaque match identifier, as supplied by the caller.
pub type MatchId = String;

/// Opaque participant identifier, as supplied by the caller.
pub type ParticipantId = String;

/// Status of a [`crate::model::ScheduleResult`], mirroring OR-Tools'
/// `CpSolverStatus` values used by the engine this crate replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    /// A provably optimal schedule was found.
    Optimal,
    /// A feasible schedule was found but optimality was not proven
    /// (e.g. the time budget ran out before the search closed the gap).
    Feasible,
    /// The request admits no feasible schedule.
    Infeasible,
    /// The solve did not reach a verdict within the time budget.
    Unknown,
    /// The model itself was invalid (should not occur for requests that
    /// passed validation; reserved for engine-internal anomalies).
    ModelInvalid,
}

impl ScheduleStatus {
    /// Whether this status carries a usable set of assignments.
    pub fn has_assignments(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}
