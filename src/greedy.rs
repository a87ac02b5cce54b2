//! First-feasible-slot fallback scheduler for fast re-solves during live
//! operations. No soft optimisation. Grounded on
//! `backends.py::GreedyBackend`.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::model::{Assignment, Match, Participant, PreviousAssignment, ScheduleConfig, ScheduleResult};
use crate::types::{Court, MatchId, ParticipantId, ScheduleStatus, Slot};

struct Placer<'a> {
    config: &'a ScheduleConfig,
    matches_by_id: HashMap<&'a MatchId, &'a Match>,
    participants_by_id: HashMap<&'a ParticipantId, &'a Participant>,
    slot_court_to_match: HashMap<(Slot, Court), &'a MatchId>,
}

impl<'a> Placer<'a> {
    fn occupies(slot: Slot, court: Court, duration: u32) -> Vec<(Slot, Court)> {
        (0..duration).map(|i| (slot + i, court)).collect()
    }

    fn participant_busy(&self, pid: &ParticipantId, slot: Slot, duration: u32) -> bool {
        for t in slot..slot + duration {
            for c in 1..=self.config.court_count {
                let Some(mid) = self.slot_court_to_match.get(&(t, c)) else {
                    continue;
                };
                if let Some(m) = self.matches_by_id.get(mid) {
                    if m.participant_ids().any(|p| p == pid) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn available(&self, pid: &ParticipantId, slot: Slot, duration: u32) -> bool {
        let Some(p) = self.participants_by_id.get(pid) else {
            return true;
        };
        if p.availability.is_empty() {
            return true;
        }
        p.availability
            .iter()
            .any(|(start, end)| *start <= slot && slot + duration <= *end)
    }

    fn feasible(&self, m: &Match, slot: Slot, court: Court) -> bool {
        if slot + m.duration_slots > self.config.total_slots {
            return false;
        }
        for (t, c) in Self::occupies(slot, court, m.duration_slots) {
            if self.slot_court_to_match.contains_key(&(t, c)) {
                return false;
            }
        }
        for pid in m.participant_ids() {
            if self.participant_busy(pid, slot, m.duration_slots) {
                return false;
            }
            if !self.available(pid, slot, m.duration_slots) {
                return false;
            }
        }
        true
    }
}

/// Solve `matches` with the first-feasible-placement heuristic: locked or
/// frozen matches keep their previous slot, everything else is placed at
/// the first `(slot, court)` (increasing slot, then court) that respects
/// capacity, non-overlap and availability. Never fails with an error —
/// matches it cannot place land in `unscheduled_matches` and the status
/// is downgraded to `Infeasible`.
pub fn solve(
    matches: &[Match],
    participants: &[Participant],
    previous_assignments: &[PreviousAssignment],
    config: &ScheduleConfig,
) -> ScheduleResult {
    let start_time = Instant::now();

    let freeze_until = config.current_slot + config.freeze_horizon_slots;
    let matches_by_id: HashMap<&MatchId, &Match> = matches.iter().map(|m| (&m.id, m)).collect();
    let participants_by_id: HashMap<&ParticipantId, &Participant> =
        participants.iter().map(|p| (&p.id, p)).collect();
    let prev_by_match: HashMap<&MatchId, &PreviousAssignment> =
        previous_assignments.iter().map(|pa| (&pa.match_id, pa)).collect();

    let mut locked: HashSet<&MatchId> = previous_assignments
        .iter()
        .filter(|pa| pa.locked)
        .map(|pa| &pa.match_id)
        .collect();
    for pa in previous_assignments {
        if pa.slot_id < freeze_until && !pa.locked {
            locked.insert(&pa.match_id);
        }
    }

    let mut placer = Placer {
        config,
        matches_by_id: matches_by_id.clone(),
        participants_by_id,
        slot_court_to_match: HashMap::new(),
    };

    let order: Vec<&MatchId> = matches.iter().map(|m| &m.id).collect();
    let mut assignments: HashMap<&MatchId, Assignment> = HashMap::new();
    let mut moved_count = 0u32;

    for &match_id in &order {
        if !locked.contains(match_id) {
            continue;
        }
        let Some(m) = matches_by_id.get(match_id) else {
            continue;
        };
        let Some(prev) = prev_by_match.get(match_id) else {
            continue;
        };
        if prev.slot_id + m.duration_slots > config.total_slots {
            continue;
        }
        assignments.insert(
            match_id,
            Assignment {
                match_id: match_id.clone(),
                slot_id: prev.slot_id,
                court_id: prev.court_id,
                duration_slots: m.duration_slots,
                moved: false,
                previous_slot_id: None,
                previous_court_id: None,
            },
        );
        for (t, c) in Placer::occupies(prev.slot_id, prev.court_id, m.duration_slots) {
            placer.slot_court_to_match.insert((t, c), match_id);
        }
    }

    for &match_id in &order {
        if assignments.contains_key(match_id) {
            continue;
        }
        let Some(&m) = matches_by_id.get(match_id) else {
            continue;
        };
        let prev = prev_by_match.get(match_id);

        let mut placed = false;
        for t in 0..=(config.total_slots.saturating_sub(m.duration_slots)) {
            if placed {
                break;
            }
            for c in 1..=config.court_count {
                if !placer.feasible(m, t, c) {
                    continue;
                }
                let moved = prev.map_or(false, |p| p.slot_id != t || p.court_id != c);
                if moved {
                    moved_count += 1;
                }
                assignments.insert(
                    match_id,
                    Assignment {
                        match_id: match_id.clone(),
                        slot_id: t,
                        court_id: c,
                        duration_slots: m.duration_slots,
                        moved,
                        previous_slot_id: prev.map(|p| p.slot_id),
                        previous_court_id: prev.map(|p| p.court_id),
                    },
                );
                for (s, cx) in Placer::occupies(t, c, m.duration_slots) {
                    placer.slot_court_to_match.insert((s, cx), match_id);
                }
                placed = true;
                break;
            }
        }
    }

    let ordered_assignments: Vec<Assignment> = order
        .iter()
        .filter_map(|mid| assignments.get(mid).cloned())
        .collect();
    let unscheduled: Vec<MatchId> = order
        .iter()
        .filter(|mid| !assignments.contains_key(*mid))
        .map(|mid| (*mid).clone())
        .collect();

    let status = if unscheduled.is_empty() {
        ScheduleStatus::Feasible
    } else {
        ScheduleStatus::Infeasible
    };
    let infeasible_reasons = if unscheduled.is_empty() {
        Vec::new()
    } else {
        vec![format!("Greedy backend could not place: {unscheduled:?}")]
    };

    tracing::debug!(
        placed = ordered_assignments.len(),
        unscheduled = unscheduled.len(),
        moved_count,
        "greedy placement done"
    );

    ScheduleResult {
        status,
        objective_score: None,
        runtime: start_time.elapsed(),
        assignments: ordered_assignments,
        soft_violations: Vec::new(),
        infeasible_reasons,
        unscheduled_matches: unscheduled,
        moved_count,
        locked_count: locked.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn places_matches_on_separate_courts() {
        let config = ScheduleConfig::new(4, 2);
        let matches = vec![m("a", 1, &["p1"]), m("b", 1, &["p2"])];
        let result = solve(&matches, &[], &[], &config);
        assert_eq!(result.status, ScheduleStatus::Feasible);
        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.assignments[0].slot_id, 0);
        assert_eq!(result.assignments[1].slot_id, 0);
        assert_ne!(result.assignments[0].court_id, result.assignments[1].court_id);
    }

    #[test]
    fn reports_unscheduled_when_capacity_exhausted() {
        let config = ScheduleConfig::new(1, 1);
        let matches = vec![m("a", 1, &["p1"]), m("b", 1, &["p2"])];
        let result = solve(&matches, &[], &[], &config);
        assert_eq!(result.status, ScheduleStatus::Infeasible);
        assert_eq!(result.unscheduled_matches.len(), 1);
    }

    #[test]
    fn locked_match_keeps_previous_slot() {
        let config = ScheduleConfig::new(4, 1);
        let matches = vec![m("a", 1, &["p1"])];
        let previous = vec![PreviousAssignment {
            match_id: "a".to_string(),
            slot_id: 2,
            court_id: 1,
            locked: true,
            pinned_slot_id: None,
            pinned_court_id: None,
        }];
        let result = solve(&matches, &[], &previous, &config);
        assert_eq!(result.assignments[0].slot_id, 2);
        assert!(!result.assignments[0].moved);
    }
}
