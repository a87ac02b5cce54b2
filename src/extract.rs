//! Solution extraction: reads a solved [`CpModel`](crate::cp::CpModel)'s
//! values back into [`Assignment`]s and [`SoftViolation`]s. Grounded on
//! `extraction.py::extract_solution`, generalized to the proximity
//! min/max slack maps the original never extracted.

use std::collections::HashMap;

use crate::constraints::ConstraintOutputs;
use crate::cp::CpSolution;
use crate::model::{Assignment, Participant, PreviousAssignment, ScheduleConfig, SoftViolation, SoftViolationKind};
use crate::types::{MatchId, ParticipantId};
use crate::variables::Variables;

/// Walk every match's placement variables and the slack variables
/// `constraints` recorded, turning a solved model into the
/// caller-visible result shape.
pub fn extract(
    solution: &CpSolution,
    vars: &Variables,
    participants: &HashMap<ParticipantId, Participant>,
    previous: &HashMap<MatchId, PreviousAssignment>,
    constraints: &ConstraintOutputs,
    config: &ScheduleConfig,
) -> (Vec<Assignment>, Vec<SoftViolation>, u32) {
    let mut assignments = Vec::with_capacity(vars.matches.len());
    let mut moved_count = 0u32;

    for (match_id, mv) in vars.matches.iter() {
        let Some((t, c, _)) = mv.placements.iter().find(|(_, _, x)| solution.value(*x) == 1) else {
            continue;
        };

        let prev = previous.get(match_id);
        let mut moved = false;
        let mut previous_slot_id = None;
        let mut previous_court_id = None;

        if let Some(prev) = prev {
            if !constraints.locked_matches.contains(match_id) && (prev.slot_id != *t || prev.court_id != *c) {
                moved = true;
                moved_count += 1;
                previous_slot_id = Some(prev.slot_id);
                previous_court_id = Some(prev.court_id);
            }
        }

        assignments.push(Assignment {
            match_id: match_id.clone(),
            slot_id: *t,
            court_id: *c,
            duration_slots: mv.duration,
            moved,
            previous_slot_id,
            previous_court_id,
        });
    }

    let mut soft_violations = Vec::new();

    if config.soft_rest_enabled {
        extract_slack_violations(
            solution,
            &constraints.rest_slack,
            participants,
            SoftViolationKind::Rest,
            "less rest than required",
            &mut soft_violations,
            |pid, slack_val| {
                participants
                    .get(pid)
                    .map_or(config.rest_slack_penalty, |p| p.rest_penalty)
                    * slack_val as f64
            },
        );
    }

    if config.enable_game_proximity {
        extract_slack_violations(
            solution,
            &constraints.proximity_min_slack,
            participants,
            SoftViolationKind::GameProximityMin,
            "closer than minimum spacing",
            &mut soft_violations,
            |_pid, slack_val| config.game_proximity_penalty * slack_val as f64,
        );
        extract_slack_violations(
            solution,
            &constraints.proximity_max_slack,
            participants,
            SoftViolationKind::GameProximityMax,
            "farther than maximum spacing",
            &mut soft_violations,
            |_pid, slack_val| config.game_proximity_penalty * slack_val as f64,
        );
    }

    (assignments, soft_violations, moved_count)
}

fn extract_slack_violations(
    solution: &CpSolution,
    slacks: &HashMap<(ParticipantId, MatchId, MatchId), crate::cp::IntVarId>,
    participants: &HashMap<ParticipantId, Participant>,
    kind: SoftViolationKind,
    description_suffix: &str,
    out: &mut Vec<SoftViolation>,
    penalty: impl Fn(&ParticipantId, i64) -> f64,
) {
    for ((pid, _mi, _mj), slack) in slacks {
        let slack_val = solution.value(*slack);
        if slack_val <= 0 {
            continue;
        }
        let name = participants.get(pid).map_or(pid.as_str(), |p| p.name.as_str());
        out.push(SoftViolation {
            kind,
            match_id: None,
            participant_id: Some(pid.clone()),
            description: format!("Participant {name} has games {slack_val} slots {description_suffix}"),
            penalty_incurred: penalty(pid, slack_val),
        });
    }
}
