//! # tourney-scheduler-core
//!
//! A constraint-programming tournament scheduler: given matches,
//! participants and a court/slot grid, produces an assignment of every
//! match to a `(slot, court)` pair that respects court capacity,
//! participant non-overlap, availability, locks and rest requirements,
//! while minimizing a weighted objective over disruption, court
//! utilization, game spacing and schedule compactness.
//!
//! ## Modules
//!
//! - [`cp`] - A small constraint-programming layer over a SAT engine,
//!   independent of the scheduling domain.
//! - [`model`] - Domain types: participants, matches, configuration,
//!   requests and results.
//! - [`variables`] - Decision variable construction.
//! - [`constraints`] - Hard and soft constraint posting.
//! - [`objective`] - Weighted objective assembly.
//! - [`extract`] - Solution extraction from a solved model.
//! - [`diagnostics`] - Human-readable infeasibility diagnostics.
//! - [`backend`] - The closed set of engines (`CpSat`, `Greedy`) a
//!   request can be solved with.
//! - [`greedy`] - The first-feasible-placement fallback backend.
//! - [`liveops`] - Re-optimization on top of a prior schedule.
//!
//! ## Quick Start
//!
//! ```rust
//! use tourney_scheduler_core::model::{Match, Participant, ScheduleConfig, ScheduleRequest};
//!
//! let request = ScheduleRequest {
//!     config: ScheduleConfig::new(8, 2),
//!     participants: vec![
//!         Participant {
//!             id: "p1".to_string(),
//!             name: "Alice".to_string(),
//!             availability: Vec::new(),
//!             rest_slots: 1,
//!             rest_is_hard: true,
//!             rest_penalty: 10.0,
//!         },
//!     ],
//!     matches: vec![Match {
//!         id: "m1".to_string(),
//!         event_code: "R1".to_string(),
//!         duration_slots: 1,
//!         side_a: vec!["p1".to_string()],
//!         side_b: Vec::new(),
//!     }],
//!     previous_assignments: Vec::new(),
//!     solver_options: None,
//! };
//!
//! let result = tourney_scheduler_core::solve(request).unwrap();
//! assert!(result.status.has_assignments());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cp;

pub mod model;
pub mod types;

pub mod variables;

pub mod constraints;
pub mod objective;

pub mod extract;
pub mod diagnostics;

pub mod backend;
pub mod greedy;
pub mod liveops;

mod error;

pub use error::{Error, Result};

use model::ScheduleRequest;

/// Solve a complete scheduling request with the CP-over-SAT backend.
///
/// Returns `Err` only for a structurally invalid request (unknown
/// participant references, non-positive durations, and so on); an
/// infeasible/unknown/model-invalid outcome is still `Ok`, with the
/// corresponding `ScheduleStatus` and `infeasible_reasons`.
pub fn solve(request: ScheduleRequest) -> Result<model::ScheduleResult> {
    request.validate()?;
    let backend = backend::Backend::CpSat(request.solver_options.unwrap_or_default());
    Ok(backend::solve_with(&backend, &request))
}

/// Re-optimize the ready subset of a live schedule. See
/// [`liveops::reschedule`].
pub fn reschedule(
    state: &liveops::ScheduleState,
    ready_matches: &[types::MatchId],
    config: &model::ScheduleConfig,
    backend: &backend::Backend,
    live_config: &liveops::LiveOpsConfig,
) -> Result<model::ScheduleResult> {
    liveops::reschedule(state, ready_matches, config, backend, live_config)
}

/// Mark every assignment within the freeze horizon as locked. See
/// [`liveops::apply_freeze_horizon`].
pub fn apply_freeze_horizon(state: &mut liveops::ScheduleState, config: &model::ScheduleConfig) {
    liveops::apply_freeze_horizon(state, config)
}

/// Reduce a config's court set by the excluded courts, renumbering what
/// remains. See [`liveops::handle_court_outage`].
pub fn handle_court_outage(
    config: &model::ScheduleConfig,
    excluded_courts: &std::collections::BTreeSet<types::Court>,
) -> model::ScheduleConfig {
    liveops::handle_court_outage(config, excluded_courts)
}

/// Record a no-show as a walkover result. See [`liveops::handle_no_show`].
pub fn handle_no_show(state: &mut liveops::ScheduleState, match_id: &str, winner_side: liveops::WinnerSide) {
    liveops::handle_no_show(state, match_id, winner_side)
}

/// Common imports for callers embedding the scheduler.
pub mod prelude {
    pub use crate::backend::Backend;
    pub use crate::liveops::{LiveOpsConfig, MatchResult, ScheduleState, StateAssignment, WinnerSide};
    pub use crate::model::{
        Assignment, Match, Participant, PreviousAssignment, ScheduleConfig, ScheduleRequest,
        ScheduleResult, SoftViolation, SolverOptions,
    };
    pub use crate::types::ScheduleStatus;
    pub use crate::{apply_freeze_horizon, handle_court_outage, handle_no_show, reschedule, solve};
    pub use crate::{Error, Result};
}
