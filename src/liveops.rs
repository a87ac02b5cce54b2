//! Re-optimization support: tracking a live schedule's state, freezing a
//! near-term horizon, and re-solving the remainder. Grounded on
//! `live_ops.py` and `backends.py`.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::error::Result;
use crate::model::{Assignment, Match, Participant, PreviousAssignment, ScheduleConfig, ScheduleRequest, ScheduleResult};
use crate::types::{Court, MatchId, ParticipantId, Slot};

/// Which side of a match won, for no-show/walkover bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinnerSide {
    A,
    B,
    None,
}

/// Recorded outcome of a match, set by [`handle_no_show`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_side: WinnerSide,
    pub walkover: bool,
}

/// A single match's placement within a live schedule, with the telemetry
/// a wall-clock-driven live-ops loop layers on top of the bare
/// [`Assignment`] the solver returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAssignment {
    pub match_id: MatchId,
    pub slot_id: Slot,
    pub court_id: Court,
    pub duration_slots: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub pinned_slot_id: Option<Slot>,
    #[serde(default)]
    pub pinned_court_id: Option<Court>,
    #[serde(default)]
    pub actual_start_slot: Option<Slot>,
    #[serde(default)]
    pub actual_end_slot: Option<Slot>,
}

/// The live, mutable slice of tournament state this crate's scheduling
/// operations read and write. Carries the match/participant catalog
/// alongside the assignment map (rather than just assignments in
/// isolation) because `reschedule` must be able to build a fresh
/// `ScheduleRequest` from nothing but a state and a list of ready match
/// ids; bracket advancement and other event bookkeeping remain out of
/// scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleState {
    pub matches: HashMap<MatchId, Match>,
    pub participants: HashMap<ParticipantId, Participant>,
    pub assignments: HashMap<MatchId, StateAssignment>,
    #[serde(default)]
    pub results: HashMap<MatchId, MatchResult>,
}

/// Live-ops specific overrides layered on top of a [`ScheduleConfig`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LiveOpsConfig {
    #[serde(default)]
    pub freeze_horizon_slots: Option<u32>,
    #[serde(default)]
    pub current_slot: Option<Slot>,
}

/// Record the actual start/end slots observed for a match once it's been
/// played (or started); a no-op if the match has no assignment.
pub fn update_actuals(state: &mut ScheduleState, match_id: &str, actual_start: Slot, actual_end: Slot) {
    if let Some(a) = state.assignments.get_mut(match_id) {
        a.actual_start_slot = Some(actual_start);
        a.actual_end_slot = Some(actual_end);
    }
}

/// Mark every assignment in `[current_slot, current_slot + freeze_horizon_slots)`
/// as locked, so the next reschedule treats it as fixed.
pub fn apply_freeze_horizon(state: &mut ScheduleState, config: &ScheduleConfig) {
    let freeze_until = config.current_slot + config.freeze_horizon_slots;
    for a in state.assignments.values_mut() {
        if config.current_slot <= a.slot_id && a.slot_id < freeze_until {
            a.locked = true;
        }
    }
}

/// Build a request from `state`'s match/participant catalog and current
/// assignments, restricted to `ready_matches`, then solve with `backend`.
/// Frozen/locked matches in `state` are passed through as previous
/// assignments so the backend can keep them fixed; only `ready_matches`
/// are free to move.
pub fn reschedule(
    state: &ScheduleState,
    ready_matches: &[MatchId],
    config: &ScheduleConfig,
    backend: &Backend,
    live_config: &LiveOpsConfig,
) -> Result<ScheduleResult> {
    let effective_config = ScheduleConfig {
        freeze_horizon_slots: live_config.freeze_horizon_slots.unwrap_or(config.freeze_horizon_slots),
        current_slot: live_config.current_slot.unwrap_or(config.current_slot),
        ..config.clone()
    };

    let request_matches: Vec<Match> = ready_matches
        .iter()
        .filter_map(|id| state.matches.get(id))
        .cloned()
        .collect();

    let previous_assignments: Vec<PreviousAssignment> = state
        .assignments
        .values()
        .map(|a| PreviousAssignment {
            match_id: a.match_id.clone(),
            slot_id: a.slot_id,
            court_id: a.court_id,
            locked: a.locked,
            pinned_slot_id: a.pinned_slot_id,
            pinned_court_id: a.pinned_court_id,
        })
        .collect();

    let request = ScheduleRequest {
        config: effective_config,
        participants: state.participants.values().cloned().collect(),
        matches: request_matches,
        previous_assignments,
        solver_options: None,
    };
    request.validate()?;

    tracing::info!(
        ready_matches = request.matches.len(),
        previous_assignments = request.previous_assignments.len(),
        "rescheduling"
    );
    Ok(crate::backend::solve_with(backend, &request))
}

/// Apply a solved [`ScheduleResult`]'s assignments onto `state`, replacing
/// whatever was there for each touched match.
pub fn apply_result(state: &mut ScheduleState, result: &ScheduleResult) {
    for a in &result.assignments {
        apply_assignment(state, a);
    }
}

fn apply_assignment(state: &mut ScheduleState, a: &Assignment) {
    state.assignments.insert(
        a.match_id.clone(),
        StateAssignment {
            match_id: a.match_id.clone(),
            slot_id: a.slot_id,
            court_id: a.court_id,
            duration_slots: a.duration_slots,
            locked: false,
            pinned_slot_id: None,
            pinned_court_id: None,
            actual_start_slot: None,
            actual_end_slot: None,
        },
    );
}

/// Record a no-show as a walkover result. Advancement policy (who plays
/// next) is out of scope; this only records the outcome.
pub fn handle_no_show(state: &mut ScheduleState, match_id: &str, winner_side: WinnerSide) {
    state.results.insert(
        match_id.to_string(),
        MatchResult {
            winner_side,
            walkover: true,
        },
    );
}

/// Return a config with `excluded_courts` removed from the court set,
/// renumbered to `1..=new_count`. Callers reschedule affected matches
/// against the returned config. Every other field is copied unchanged.
pub fn handle_court_outage(config: &ScheduleConfig, excluded_courts: &BTreeSet<Court>) -> ScheduleConfig {
    let available = (1..=config.court_count)
        .filter(|c| !excluded_courts.contains(c))
        .count();
    ScheduleConfig {
        court_count: available.max(1) as Court,
        ..config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_horizon_locks_near_term_assignments() {
        let mut state = ScheduleState::default();
        state.assignments.insert(
            "a".to_string(),
            StateAssignment {
                match_id: "a".to_string(),
                slot_id: 1,
                court_id: 1,
                duration_slots: 1,
                locked: false,
                pinned_slot_id: None,
                pinned_court_id: None,
                actual_start_slot: None,
                actual_end_slot: None,
            },
        );
        let mut config = ScheduleConfig::new(10, 2);
        config.current_slot = 0;
        config.freeze_horizon_slots = 2;

        apply_freeze_horizon(&mut state, &config);
        assert!(state.assignments["a"].locked);
    }

    #[test]
    fn court_outage_reduces_and_renumbers_courts() {
        let config = ScheduleConfig::new(10, 4);
        let mut excluded = BTreeSet::new();
        excluded.insert(2);
        excluded.insert(3);
        let reduced = handle_court_outage(&config, &excluded);
        assert_eq!(reduced.court_count, 2);
    }

    #[test]
    fn court_outage_never_goes_below_one_court() {
        let config = ScheduleConfig::new(10, 2);
        let mut excluded = BTreeSet::new();
        excluded.insert(1);
        excluded.insert(2);
        let reduced = handle_court_outage(&config, &excluded);
        assert_eq!(reduced.court_count, 1);
    }

    #[test]
    fn no_show_records_walkover_result() {
        let mut state = ScheduleState::default();
        handle_no_show(&mut state, "a", WinnerSide::B);
        assert_eq!(
            state.results["a"],
            MatchResult {
                winner_side: WinnerSide::B,
                walkover: true,
            }
        );
    }
}
