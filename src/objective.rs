//! Weighted linear objective assembly. Grounded on
//! `cpsat_backend.py::_build_objective` (rest slack, disruption, court
//! change, late finish) plus the court-idle, game-proximity,
//! compact-schedule and overlap terms absent from that trimmed original.
//!
//! Every weight is a float; `scale` turns it into the truncated integer
//! coefficient the underlying SAT-backed solver needs, matching
//! `int(penalty * 10)` in the source exactly (truncation, not rounding).

use std::collections::HashMap;

use crate::constraints::ConstraintOutputs;
use crate::cp::{CpModel, IntVarId};
use crate::model::{CompactScheduleMode, Match, Participant, PreviousAssignment, ScheduleConfig};
use crate::types::{Court, ParticipantId, Slot};
use crate::variables::Variables;

/// Non-decision values the objective needs that aren't already slack
/// variables in [`ConstraintOutputs`]: per-`(slot, court)` occupancy
/// indicators and the compact-schedule makespan/overshoot variables, kept
/// around because the extractor reports them too.
pub struct ObjectiveOutputs {
    pub court_occupied: HashMap<(Slot, Court), IntVarId>,
    pub makespan: Option<IntVarId>,
}

fn scale(weight: f64) -> i64 {
    (weight * 10.0) as i64
}

/// Build every enabled soft term and set the model's objective. Returns
/// the auxiliary variables the extractor may want to report on.
pub fn build(
    model: &mut CpModel,
    vars: &Variables,
    matches: &[Match],
    participants: &HashMap<ParticipantId, Participant>,
    previous: &HashMap<crate::types::MatchId, PreviousAssignment>,
    constraints: &ConstraintOutputs,
    config: &ScheduleConfig,
) -> ObjectiveOutputs {
    let mut terms: Vec<(IntVarId, i64)> = Vec::new();
    let mut court_occupied = HashMap::new();
    let mut makespan = None;

    if config.enable_court_utilization {
        add_court_idle(model, vars, config, &mut terms, &mut court_occupied);
    }

    for ((pid, mi, mj), slack) in &constraints.rest_slack {
        let weight = participants.get(pid).map_or(config.rest_slack_penalty, |p| p.rest_penalty);
        terms.push((*slack, scale(weight)));
        let _ = (mi, mj);
    }

    for slack in constraints.proximity_min_slack.values() {
        terms.push((*slack, scale(config.game_proximity_penalty)));
    }
    for slack in constraints.proximity_max_slack.values() {
        terms.push((*slack, scale(config.game_proximity_penalty)));
    }

    if config.disruption_penalty > 0.0 {
        add_disruption(
            model,
            vars,
            matches,
            previous,
            &constraints.locked_matches,
            config,
            &mut terms,
        );
    }

    if config.late_finish_penalty > 0.0 {
        for (id, mv) in vars.matches.iter() {
            if constraints.locked_matches.contains(id) {
                continue;
            }
            terms.push((mv.start, scale(config.late_finish_penalty)));
        }
    }

    if config.enable_compact_schedule {
        makespan = add_compact_schedule(model, vars, constraints, config, &mut terms, &court_occupied);
    }

    for slack in constraints.overlap_slack.values() {
        terms.push((*slack, scale(config.player_overlap_penalty)));
    }

    if !terms.is_empty() {
        model.minimize(&terms);
    }

    ObjectiveOutputs {
        court_occupied,
        makespan,
    }
}

/// `occ[s,c] = OR(O(s,c))`, penalising unoccupied `(slot, court)` pairs.
/// `occ <= sum(x)` and, per term, `x_i <= occ` together pin `occ` to the
/// exact OR rather than the weaker one-directional relaxation: both
/// directions are plain boolean-cardinality constraints, no reification
/// machinery required.
fn add_court_idle(
    model: &mut CpModel,
    vars: &Variables,
    config: &ScheduleConfig,
    terms: &mut Vec<(IntVarId, i64)>,
    court_occupied: &mut HashMap<(Slot, Court), IntVarId>,
) {
    let occupied_weight = scale(config.court_utilization_penalty);

    for s in 0..config.total_slots {
        for c in 1..=config.court_count {
            let occupants = vars.court_occupants(s, c);
            if occupants.is_empty() {
                continue;
            }
            let occ = model.new_int_var(0, 1, &format!("occ_{s}_{c}"));
            // occ <= sum(occupants): occ - sum(x_i) <= 0
            let mut le_vars = occupants.to_vec();
            le_vars.push(occ);
            let mut le_coeffs = vec![-1i64; occupants.len()];
            le_coeffs.push(1);
            model.add_linear_le(&le_vars, &le_coeffs, 0);
            // x_i <= occ for every i
            for x in occupants {
                model.add_linear_le(&[*x, occ], &[1, -1], 0);
            }
            terms.push((occ, -occupied_weight));
            court_occupied.insert((s, c), occ);
        }
    }
    // The constant (total_slots*court_count)*penalty term the source adds
    // alongside `-sum(occ)` is dropped: it shifts every candidate
    // objective value by the same amount and never changes which
    // solution is optimal.
}

fn add_disruption(
    model: &mut CpModel,
    vars: &Variables,
    matches: &[Match],
    previous: &HashMap<crate::types::MatchId, PreviousAssignment>,
    locked: &std::collections::HashSet<crate::types::MatchId>,
    config: &ScheduleConfig,
    terms: &mut Vec<(IntVarId, i64)>,
) {
    for (match_id, prev) in previous {
        if locked.contains(match_id) {
            continue;
        }
        let Some(mv) = vars.matches.get(match_id) else {
            continue;
        };

        let diff_pos = model.new_int_var(0, config.total_slots as i64, &format!("diff_pos_{match_id}"));
        let diff_neg = model.new_int_var(0, config.total_slots as i64, &format!("diff_neg_{match_id}"));
        // start - prev_start == diff_pos - diff_neg
        model.add_linear_eq(
            &[mv.start, diff_pos, diff_neg],
            &[1, -1, 1],
            prev.slot_id as i64,
        );
        let disruption_weight = scale(config.disruption_penalty);
        terms.push((diff_pos, disruption_weight));
        terms.push((diff_neg, disruption_weight));

        if config.court_change_penalty > 0.0 {
            let event_code = matches
                .iter()
                .find(|m| &m.id == match_id)
                .map(|m| m.event_code.as_str())
                .unwrap_or(match_id.as_str());
            let same_court_vars: Vec<IntVarId> = mv
                .placements
                .iter()
                .filter(|(_, c, _)| *c == prev.court_id)
                .map(|(_, _, x)| *x)
                .collect();
            if !same_court_vars.is_empty() {
                let changed = model.new_bool_var(&format!("court_changed_{event_code}"));
                // sum(same_court_vars) + changed == 1
                let mut eq_vars = same_court_vars.clone();
                eq_vars.push(changed);
                let eq_coeffs = vec![1i64; eq_vars.len()];
                model.add_linear_eq(&eq_vars, &eq_coeffs, 1);
                terms.push((changed, scale(config.court_change_penalty)));
            }
        }
    }
}

fn add_compact_schedule(
    model: &mut CpModel,
    vars: &Variables,
    constraints: &ConstraintOutputs,
    config: &ScheduleConfig,
    terms: &mut Vec<(IntVarId, i64)>,
    court_occupied: &HashMap<(Slot, Court), IntVarId>,
) -> Option<IntVarId> {
    let weight = scale(config.compact_schedule_penalty);
    match config.compact_schedule_mode {
        CompactScheduleMode::MinimizeMakespan => {
            let mk = model.new_int_var(0, config.total_slots as i64, "makespan");
            for (id, mv) in vars.matches.iter() {
                if constraints.locked_matches.contains(id) {
                    continue;
                }
                model.add_linear_ge(&[mk, mv.end], &[1, -1], 0);
            }
            terms.push((mk, weight));
            Some(mk)
        }
        CompactScheduleMode::NoGaps => {
            for (i, occ) in court_occupied.values().enumerate() {
                let idle = model.new_int_var(0, 1, &format!("idle_{i}"));
                model.add_linear_eq(&[idle, *occ], &[1, 1], 1);
                terms.push((idle, weight));
            }
            None
        }
        CompactScheduleMode::FinishByTime => {
            let Some(target) = config.target_finish_slot else {
                return None;
            };
            for (id, mv) in vars.matches.iter() {
                if constraints.locked_matches.contains(id) {
                    continue;
                }
                let overshoot = model.new_int_var(
                    0,
                    config.total_slots as i64,
                    &format!("overshoot_{id}"),
                );
                // overshoot >= end - target
                model.add_linear_ge(&[overshoot, mv.end], &[1, -1], -(target as i64));
                terms.push((overshoot, weight));
            }
            None
        }
    }
}
