//! Decision variable construction: `x[m,t,c]`, `start[m]`, `end[m]`, plus
//! the `(slot, court)` and `(participant, slot)` occupancy indexes the
//! constraint compiler scans to post court-capacity and non-overlap
//! constraints without re-deriving them from scratch.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::cp::{CpModel, IntVarId};
use crate::model::{Match, ScheduleConfig};
use crate::types::{Court, MatchId, ParticipantId, Slot};

/// Variables sharing a `(slot, court)` or `(participant, slot)` cell are
/// almost always few enough (a handful of concurrently-placeable matches)
/// to live inline rather than spill to the heap.
type Occupants = SmallVec<[IntVarId; 4]>;

/// Decision variables for a single match: which `(slot, court)` it starts
/// on, plus the derived `start`/`end` slot variables linked to them.
pub struct MatchVars {
    pub duration: u32,
    pub start: IntVarId,
    pub end: IntVarId,
    /// Every `(t, c, x)` this match could start at.
    pub placements: Vec<(Slot, Court, IntVarId)>,
}

/// All decision variables for a schedule, plus lookup indexes.
#[derive(Default)]
pub struct Variables {
    pub matches: IndexMap<MatchId, MatchVars>,
    /// Matches with no valid `(slot, court)` at all (duration exceeds the
    /// horizon) — never given variables, reported as an infeasible reason
    /// by the constraint compiler's exactly-once pass.
    pub unplaceable: Vec<MatchId>,
    /// `x` variables whose occupied interval covers slot `s` on court `c`.
    court_occupancy: HashMap<(Slot, Court), Occupants>,
    /// `x` variables whose occupied interval covers slot `s` for a match
    /// involving this participant, regardless of court.
    participant_occupancy: HashMap<(ParticipantId, Slot), Occupants>,
    /// Every match a participant appears in, for rest/proximity pairing.
    participant_matches: HashMap<ParticipantId, Vec<MatchId>>,
}

impl Variables {
    pub fn court_occupants(&self, slot: Slot, court: Court) -> &[IntVarId] {
        self.court_occupancy
            .get(&(slot, court))
            .map(SmallVec::as_slice)
            .unwrap_or(&[])
    }

    pub fn participant_occupants(&self, participant: &ParticipantId, slot: Slot) -> &[IntVarId] {
        self.participant_occupancy
            .get(&(participant.clone(), slot))
            .map(SmallVec::as_slice)
            .unwrap_or(&[])
    }

    pub fn matches_for(&self, participant: &ParticipantId) -> &[MatchId] {
        self.participant_matches
            .get(participant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participant_matches.keys()
    }
}

/// Build decision variables for every match and link `start[m]` to the
/// `x[m,t,c]` variables that place it.
pub fn build(model: &mut CpModel, matches: &[Match], config: &ScheduleConfig) -> Variables {
    let total_slots = config.total_slots;
    let court_count = config.court_count;
    let mut out = Variables::default();

    for m in matches {
        let d = m.duration_slots;
        if d > total_slots {
            out.unplaceable.push(m.id.clone());
            continue;
        }
        let max_start = total_slots - d;

        let mut placements = Vec::with_capacity(((max_start + 1) * court_count) as usize);
        for t in 0..=max_start {
            for c in 1..=court_count {
                let x = model.new_bool_var(&format!("x_{}_{t}_{c}", m.id));
                for s in t..t + d {
                    out.court_occupancy.entry((s, c)).or_default().push(x);
                }
                placements.push((t, c, x));
            }
        }

        let start = model.new_int_var(0, max_start as i64, &format!("start_{}", m.id));
        let end = model.new_int_var(d as i64, total_slots as i64, &format!("end_{}", m.id));
        // end == start + d
        model.add_linear_eq(&[end, start], &[1, -1], d as i64);

        // x[t,c] => start == t, one reified pair per placement rather than
        // a single `start == sum(t * x)` equality: every term here keeps a
        // unit coefficient against a lone wide-domain variable, so the
        // link can never overflow into the bound-propagation fallback
        // (which would drop the reification) the way the wide sum would
        // for any match with more than a handful of placements.
        for (t, _c, x) in &placements {
            let placed = model.bool_lit(*x);
            model.add_linear_le_reified(&[placed], &[start], &[1], *t as i64);
            model.add_linear_ge_reified(&[placed], &[start], &[1], *t as i64);
        }

        let participants: HashSet<&ParticipantId> = m.participant_ids().collect();
        for pid in participants {
            out.participant_matches
                .entry(pid.clone())
                .or_default()
                .push(m.id.clone());
            for (t, _c, x) in &placements {
                for s in *t..*t + d {
                    out.participant_occupancy
                        .entry((pid.clone(), s))
                        .or_default()
                        .push(*x);
                }
            }
        }

        out.matches.insert(
            m.id.clone(),
            MatchVars {
                duration: d,
                start,
                end,
                placements,
            },
        );
    }

    out
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
    fn builds_placements_within_horizon() {
        let mut model = CpModel::new();
        let config = ScheduleConfig::new(4, 2);
        let matches = vec![m("m1", 2, &["p1"])];
        let vars = build(&mut model, &matches, &config);

        let mv = &vars.matches["m1"];
        // start in [0, 2], 2 courts => 3*2 = 6 placements
        assert_eq!(mv.placements.len(), 6);
        assert!(vars.unplaceable.is_empty());
    }

    #[test]
    fn flags_matches_longer_than_horizon() {
        let mut model = CpModel::new();
        let config = ScheduleConfig::new(2, 1);
        let matches = vec![m("too_long", 3, &["p1"])];
        let vars = build(&mut model, &matches, &config);

        assert!(vars.matches.is_empty());
        assert_eq!(vars.unplaceable, vec!["too_long".to_string()]);
    }

    #[test]
    fn indexes_occupancy_across_duration() {
        let mut model = CpModel::new();
        let config = ScheduleConfig::new(4, 1);
        let matches = vec![m("m1", 2, &["p1"])];
        let vars = build(&mut model, &matches, &config);

        // slot 0 is only covered by the t=0 placement; slot 1 is covered by
        // both the t=0 (start 0, duration 2) and t=1 placements.
        assert_eq!(vars.court_occupants(0, 1).len(), 1);
        assert_eq!(vars.court_occupants(1, 1).len(), 2);
        assert_eq!(vars.participant_occupants(&"p1".to_string(), 0).len(), 1);
    }
}
