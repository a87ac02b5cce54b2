//! Human-readable infeasibility reasons, used when the solver proves a
//! request has no feasible schedule. Grounded on `diagnostics.py`.

use std::collections::HashMap;

use crate::model::{Match, Participant, ScheduleConfig};
use crate::types::ParticipantId;

/// Attempt to explain why a model is infeasible, starting from the
/// reasons already recorded while posting constraints (e.g. locked
/// assignments that don't fit, matches longer than the horizon).
pub fn diagnose(
    matches: &[Match],
    participants: &HashMap<ParticipantId, Participant>,
    config: &ScheduleConfig,
    existing_reasons: &[String],
) -> Vec<String> {
    let mut reasons = existing_reasons.to_vec();

    if matches.is_empty() {
        reasons.push("No matches to schedule".to_string());
    }

    let total_match_slots: u64 = matches.iter().map(|m| m.duration_slots as u64).sum();
    let total_capacity = config.total_slots as u64 * config.court_count as u64;
    if total_match_slots > total_capacity {
        reasons.push(format!(
            "Not enough capacity: {total_match_slots} match-slots needed, but only {total_capacity} available"
        ));
    }

    let mut participant_slots_needed: HashMap<&ParticipantId, u64> = HashMap::new();
    for m in matches {
        for pid in m.participant_ids() {
            *participant_slots_needed.entry(pid).or_insert(0) += m.duration_slots as u64;
        }
    }

    for (pid, slots_needed) in participant_slots_needed {
        let Some(participant) = participants.get(pid) else {
            continue;
        };
        if participant.availability.is_empty() {
            continue;
        }
        let available_slots: u64 = participant
            .availability
            .iter()
            .map(|(start, end)| (*end - *start) as u64)
            .sum();
        if slots_needed > available_slots {
            reasons.push(format!(
                "Participant {} needs {slots_needed} slots but only available for {available_slots}",
                participant.name
            ));
        }
    }

    if reasons.is_empty() {
        reasons.push("Could not determine specific cause - constraints may be too restrictive".to_string());
    }

    reasons
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
    fn flags_insufficient_capacity() {
        let config = ScheduleConfig::new(2, 1);
        let matches = vec![m("a", 2, &["p1"]), m("b", 1, &["p1"])];
        let reasons = diagnose(&matches, &HashMap::new(), &config, &[]);
        assert!(reasons.iter().any(|r| r.contains("Not enough capacity")));
    }

    #[test]
    fn falls_back_to_generic_reason() {
        let config = ScheduleConfig::new(10, 4);
        let matches = vec![m("a", 1, &["p1"])];
        let reasons = diagnose(&matches, &HashMap::new(), &config, &[]);
        assert_eq!(reasons, vec!["Could not determine specific cause - constraints may be too restrictive"]);
    }
}
