//! Hard and soft constraint posting: H1-H7 from the exactly-once/capacity/
//! non-overlap/availability/lock-pin/freeze-horizon/rest family, plus the
//! game-proximity addition. Grounded line-for-line on
//! `cpsat_backend.py`'s `_add_*_constraint` methods, with
//! `model.Add(...).OnlyEnforceIf(b)` translated to [`crate::cp`]'s reified
//! posting.

use std::collections::{HashMap, HashSet};

use crate::cp::{CpModel, IntVarId};
use crate::model::{Match, Participant, PreviousAssignment, ScheduleConfig};
use crate::types::{MatchId, ParticipantId};
use crate::variables::Variables;

/// Slack/bookkeeping produced while posting constraints, consumed by the
/// objective compiler and the solution extractor.
#[derive(Default)]
pub struct ConstraintOutputs {
    /// Reasons a match could never be scheduled, discovered while posting
    /// constraints rather than from the solver (e.g. no valid placement,
    /// an invalid lock). A non-empty list means the model is infeasible
    /// before a single SAT call is made.
    pub infeasible_reasons: Vec<String>,
    /// Matches pinned to their previous placement, either explicitly
    /// locked or pulled inside the freeze horizon.
    pub locked_matches: HashSet<MatchId>,
    /// Soft-rest slack, one per ordered pair of matches sharing a
    /// participant, when `soft_rest_enabled`.
    pub rest_slack: HashMap<(ParticipantId, MatchId, MatchId), IntVarId>,
    /// Game-proximity slack for spacing below the configured minimum.
    pub proximity_min_slack: HashMap<(ParticipantId, MatchId, MatchId), IntVarId>,
    /// Game-proximity slack for spacing above the configured maximum.
    pub proximity_max_slack: HashMap<(ParticipantId, MatchId, MatchId), IntVarId>,
    /// Player-overlap slack, when `allow_player_overlap` turns H3 soft.
    pub overlap_slack: HashMap<(ParticipantId, crate::types::Slot), IntVarId>,
}

/// Post every hard and soft constraint for `matches` against `vars`.
pub fn build(
    model: &mut CpModel,
    vars: &Variables,
    matches: &[Match],
    participants: &HashMap<ParticipantId, Participant>,
    previous: &HashMap<MatchId, PreviousAssignment>,
    config: &ScheduleConfig,
) -> ConstraintOutputs {
    let mut out = ConstraintOutputs::default();

    add_exactly_once(model, vars, matches, &mut out);
    add_court_capacity(model, vars, config);
    add_participant_nonoverlap(model, vars, config, &mut out);
    add_availability(model, vars, matches, participants);
    add_lock_pin(model, vars, matches, previous, &mut out);
    add_freeze_horizon(model, vars, previous, config, &mut out);
    add_rest(model, vars, participants, config, &mut out);
    if config.enable_game_proximity {
        add_game_proximity(model, vars, config, &mut out);
    }

    out
}

fn add_exactly_once(
    model: &mut CpModel,
    vars: &Variables,
    matches: &[Match],
    out: &mut ConstraintOutputs,
) {
    for id in &vars.unplaceable {
        let event_code = matches
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.event_code.as_str())
            .unwrap_or(id.as_str());
        out.infeasible_reasons.push(format!(
            "Match {event_code}: no valid time slots available"
        ));
    }

    for mv in vars.matches.values() {
        let xs: Vec<IntVarId> = mv.placements.iter().map(|(_, _, x)| *x).collect();
        model.add_linear_eq(&xs, &vec![1; xs.len()], 1);
    }
}

fn add_court_capacity(model: &mut CpModel, vars: &Variables, config: &ScheduleConfig) {
    for s in 0..config.total_slots {
        for c in 1..=config.court_count {
            let occupants = vars.court_occupants(s, c);
            if occupants.len() > 1 {
                model.add_linear_le(occupants, &vec![1; occupants.len()], 1);
            }
        }
    }
}

fn add_participant_nonoverlap(
    model: &mut CpModel,
    vars: &Variables,
    config: &ScheduleConfig,
    out: &mut ConstraintOutputs,
) {
    for pid in vars.participants() {
        if vars.matches_for(pid).len() <= 1 {
            continue;
        }
        for s in 0..config.total_slots {
            let occupants = vars.participant_occupants(pid, s);
            if occupants.len() <= 1 {
                continue;
            }
            if config.allow_player_overlap {
                let slack = model.new_int_var(
                    0,
                    occupants.len() as i64 - 1,
                    &format!("overlap_slack_{pid}_{s}"),
                );
                let mut eq_vars = occupants.to_vec();
                eq_vars.push(slack);
                let mut coeffs = vec![1i64; occupants.len()];
                coeffs.push(-1);
                model.add_linear_le(&eq_vars, &coeffs, 1);
                out.overlap_slack.insert((pid.clone(), s), slack);
            } else {
                model.add_linear_le(occupants, &vec![1; occupants.len()], 1);
            }
        }
    }
}

fn add_availability(
    model: &mut CpModel,
    vars: &Variables,
    matches: &[Match],
    participants: &HashMap<ParticipantId, Participant>,
) {
    for m in matches {
        let Some(mv) = vars.matches.get(&m.id) else {
            continue;
        };
        for pid in m.participant_ids() {
            let Some(participant) = participants.get(pid) else {
                continue;
            };
            if participant.availability.is_empty() {
                continue;
            }
            for (t, _c, x) in &mv.placements {
                let range_covered = (*t..*t + mv.duration).all(|s| {
                    participant
                        .availability
                        .iter()
                        .any(|(start, end)| *start <= s && s < *end)
                });
                if !range_covered {
                    model.fix_bool(*x, false);
                }
            }
        }
    }
}

fn add_lock_pin(
    model: &mut CpModel,
    vars: &Variables,
    matches: &[Match],
    previous: &HashMap<MatchId, PreviousAssignment>,
    out: &mut ConstraintOutputs,
) {
    for (match_id, pa) in previous {
        let Some(mv) = vars.matches.get(match_id) else {
            continue;
        };
        let event_code = matches
            .iter()
            .find(|m| &m.id == match_id)
            .map(|m| m.event_code.as_str())
            .unwrap_or(match_id.as_str());

        if pa.locked {
            match mv
                .placements
                .iter()
                .find(|(t, c, _)| *t == pa.slot_id && *c == pa.court_id)
            {
                Some((_, _, x)) => model.fix_bool(*x, true),
                None => out.infeasible_reasons.push(format!(
                    "Match {event_code}: locked assignment ({}, {}) is invalid",
                    pa.slot_id, pa.court_id
                )),
            }
            continue;
        }

        if let Some(pin_slot) = pa.pinned_slot_id {
            for (t, _c, x) in &mv.placements {
                if *t != pin_slot {
                    model.fix_bool(*x, false);
                }
            }
        }
        if let Some(pin_court) = pa.pinned_court_id {
            for (_t, c, x) in &mv.placements {
                if *c != pin_court {
                    model.fix_bool(*x, false);
                }
            }
        }
    }
}

fn add_freeze_horizon(
    model: &mut CpModel,
    vars: &Variables,
    previous: &HashMap<MatchId, PreviousAssignment>,
    config: &ScheduleConfig,
    out: &mut ConstraintOutputs,
) {
    let freeze_until = config.current_slot + config.freeze_horizon_slots;
    for (match_id, pa) in previous {
        if pa.locked {
            continue;
        }
        let Some(mv) = vars.matches.get(match_id) else {
            continue;
        };
        if pa.slot_id >= freeze_until {
            continue;
        }
        if let Some((_, _, x)) = mv
            .placements
            .iter()
            .find(|(t, c, _)| *t == pa.slot_id && *c == pa.court_id)
        {
            model.fix_bool(*x, true);
            out.locked_matches.insert(match_id.clone());
        }
    }
}

fn add_rest(
    model: &mut CpModel,
    vars: &Variables,
    participants: &HashMap<ParticipantId, Participant>,
    config: &ScheduleConfig,
    out: &mut ConstraintOutputs,
) {
    for pid in vars.participants() {
        let matches = vars.matches_for(pid);
        if matches.len() <= 1 {
            continue;
        }
        let participant = participants.get(pid);
        let rest_slots = participant.map_or(config.default_rest_slots, |p| p.rest_slots);
        let is_hard = participant.map_or(true, |p| p.rest_is_hard);

        for i in 0..matches.len() {
            for j in (i + 1)..matches.len() {
                let (mi, mj) = (&matches[i], &matches[j]);
                let Some(vi) = vars.matches.get(mi) else {
                    continue;
                };
                let Some(vj) = vars.matches.get(mj) else {
                    continue;
                };

                let order = model.new_bool_var(&format!("order_{mi}_{mj}_{pid}"));
                let order_true = model.bool_lit(order);
                let order_false = order_true.negated();

                if is_hard || !config.soft_rest_enabled {
                    // order => end[i] + rest <= start[j]
                    model.add_linear_le_reified(
                        &[order_true],
                        &[vi.end, vj.start],
                        &[1, -1],
                        -(rest_slots as i64),
                    );
                    // !order => end[j] + rest <= start[i]
                    model.add_linear_le_reified(
                        &[order_false],
                        &[vj.end, vi.start],
                        &[1, -1],
                        -(rest_slots as i64),
                    );
                } else {
                    let slack = model.new_int_var(
                        0,
                        rest_slots as i64,
                        &format!("rest_slack_{mi}_{mj}_{pid}"),
                    );
                    // order => end[i] + rest - slack <= start[j]
                    model.add_linear_le_reified(
                        &[order_true],
                        &[vi.end, vj.start, slack],
                        &[1, -1, -1],
                        -(rest_slots as i64),
                    );
                    model.add_linear_le_reified(
                        &[order_false],
                        &[vj.end, vi.start, slack],
                        &[1, -1, -1],
                        -(rest_slots as i64),
                    );
                    out.rest_slack
                        .insert((pid.clone(), mi.clone(), mj.clone()), slack);
                }
            }
        }
    }
}

/// Spacing between successive games for the same participant, bounded
/// above and below by slack variables (soft in both directions; a
/// participant with only one match, or a pair with no ordering pressure,
/// never gets a slack variable).
fn add_game_proximity(
    model: &mut CpModel,
    vars: &Variables,
    config: &ScheduleConfig,
    out: &mut ConstraintOutputs,
) {
    for pid in vars.participants() {
        let matches = vars.matches_for(pid);
        if matches.len() <= 1 {
            continue;
        }
        for i in 0..matches.len() {
            for j in (i + 1)..matches.len() {
                let (mi, mj) = (&matches[i], &matches[j]);
                let Some(vi) = vars.matches.get(mi) else {
                    continue;
                };
                let Some(vj) = vars.matches.get(mj) else {
                    continue;
                };

                // Reuse a fresh ordering boolean local to this feature: the
                // rest constraint's `order_*` variable already encodes
                // "which of the pair comes first" but is only created when
                // the pair shares a rest requirement, so proximity needs
                // its own.
                let order = model.new_bool_var(&format!("proximity_order_{mi}_{mj}_{pid}"));
                let order_true = model.bool_lit(order);
                let order_false = order_true.negated();

                if let Some(min_spacing) = config.min_game_spacing_slots {
                    let slack = model.new_int_var(
                        0,
                        min_spacing as i64,
                        &format!("prox_min_slack_{mi}_{mj}_{pid}"),
                    );
                    model.add_linear_le_reified(
                        &[order_true],
                        &[vi.end, vj.start, slack],
                        &[1, -1, -1],
                        -(min_spacing as i64),
                    );
                    model.add_linear_le_reified(
                        &[order_false],
                        &[vj.end, vi.start, slack],
                        &[1, -1, -1],
                        -(min_spacing as i64),
                    );
                    out.proximity_min_slack
                        .insert((pid.clone(), mi.clone(), mj.clone()), slack);
                }

                if let Some(max_spacing) = config.max_game_spacing_slots {
                    let slack = model.new_int_var(
                        0,
                        config.total_slots as i64,
                        &format!("prox_max_slack_{mi}_{mj}_{pid}"),
                    );
                    // order => start[j] - end[i] - slack <= max_spacing
                    model.add_linear_le_reified(
                        &[order_true],
                        &[vj.start, vi.end, slack],
                        &[1, -1, -1],
                        max_spacing as i64,
                    );
                    model.add_linear_le_reified(
                        &[order_false],
                        &[vi.start, vj.end, slack],
                        &[1, -1, -1],
                        max_spacing as i64,
                    );
                    out.proximity_max_slack
                        .insert((pid.clone(), mi.clone(), mj.clone()), slack);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::SolveOptions;

    fn participant(id: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: id.to_string(),
            availability: Vec::new(),
            rest_slots: 1,
            rest_is_hard: true,
            rest_penalty: 10.0,
        }
    }

    fn m(id: &str, duration: u32, side_a: &[&str]) -> Match {
        Match {
            id: id.to_string(),
            event_code: id.to_string(),
            duration_slots: duration,
            side_a: side_a.iter().map(|s| s.to_string()).collect(),
            side_b: Vec::new(),
        }
    }

    #[test]
    fn court_capacity_prevents_double_booking() {
        let mut model = CpModel::new();
        let config = ScheduleConfig::new(2, 1);
        let matches = vec![m("a", 1, &["p1"]), m("b", 1, &["p2"])];
        let vars = crate::variables::build(&mut model, &matches, &config);
        let participants = HashMap::new();
        let previous = HashMap::new();
        build(&mut model, &vars, &matches, &participants, &previous, &config);

        let solution = model.solve(&SolveOptions::default());
        assert!(solution.status.has_solution());

        let a = &vars.matches["a"];
        let b = &vars.matches["b"];
        let (a_slot, _, _) = a
            .placements
            .iter()
            .find(|(_, _, x)| solution.value(*x) == 1)
            .unwrap();
        let (b_slot, _, _) = b
            .placements
            .iter()
            .find(|(_, _, x)| solution.value(*x) == 1)
            .unwrap();
        assert_ne!(a_slot, b_slot, "only one court available, matches must not collide");
    }

    #[test]
    fn hard_rest_enforces_gap_between_shared_participant_matches() {
        let mut model = CpModel::new();
        let config = ScheduleConfig::new(6, 2);
        let matches = vec![m("a", 1, &["p1"]), m("b", 1, &["p1"])];
        let vars = crate::variables::build(&mut model, &matches, &config);
        let mut participants = HashMap::new();
        let mut p = participant("p1");
        p.rest_slots = 2;
        participants.insert("p1".to_string(), p);
        let previous = HashMap::new();
        build(&mut model, &vars, &matches, &participants, &previous, &config);

        let solution = model.solve(&SolveOptions::default());
        assert!(solution.status.has_solution());

        let start_a = solution.value(vars.matches["a"].start);
        let start_b = solution.value(vars.matches["b"].start);
        assert!((start_a - start_b).abs() >= 3, "need >= duration + rest_slots gap");
    }

    #[test]
    fn locked_assignment_is_respected() {
        let mut model = CpModel::new();
        let config = ScheduleConfig::new(4, 2);
        let matches = vec![m("a", 1, &["p1"])];
        let vars = crate::variables::build(&mut model, &matches, &config);
        let participants = HashMap::new();
        let mut previous = HashMap::new();
        previous.insert(
            "a".to_string(),
            PreviousAssignment {
                match_id: "a".to_string(),
                slot_id: 2,
                court_id: 1,
                locked: true,
                pinned_slot_id: None,
                pinned_court_id: None,
            },
        );
        build(&mut model, &vars, &matches, &participants, &previous, &config);

        let solution = model.solve(&SolveOptions::default());
        assert!(solution.status.has_solution());
        assert_eq!(solution.value(vars.matches["a"].start), 2);
    }
}
