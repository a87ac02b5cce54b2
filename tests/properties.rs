//! Property tests over the quantified invariants every `FEASIBLE`/
//! `OPTIMAL` result must satisfy, generated over small random
//! tournaments small enough for the SAT engine to solve quickly.

use proptest::prelude::*;

use tourney_scheduler_core::model::{Match, Participant, ScheduleConfig, ScheduleRequest};

fn arb_request() -> impl Strategy<Value = ScheduleRequest> {
    (2usize..=5, 1u32..=3, 4u32..=8).prop_flat_map(|(num_matches, court_count, total_slots)| {
        let num_participants = num_matches * 2;
        let matches: Vec<Match> = (0..num_matches)
            .map(|i| Match {
                id: format!("m{i}"),
                event_code: format!("R{i}"),
                duration_slots: 1,
                side_a: vec![format!("p{}", i * 2 % num_participants)],
                side_b: vec![format!("p{}", (i * 2 + 1) % num_participants)],
            })
            .collect();
        let participants: Vec<Participant> = (0..num_participants)
            .map(|i| Participant {
                id: format!("p{i}"),
                name: format!("Player {i}"),
                availability: Vec::new(),
                rest_slots: 0,
                rest_is_hard: true,
                rest_penalty: 10.0,
            })
            .collect();

        Just(ScheduleRequest {
            config: ScheduleConfig::new(total_slots, court_count),
            participants,
            matches,
            previous_assignments: Vec::new(),
            solver_options: None,
        })
    })
}

proptest! {
    #[test]
    fn feasible_results_respect_court_and_participant_invariants(request in arb_request()) {
        let matches = request.matches.clone();
        let result = tourney_scheduler_core::solve(request).unwrap();
        if !result.status.has_assignments() {
            return Ok(());
        }

        // Exactly one assignment per requested match.
        prop_assert_eq!(result.assignments.len(), matches.len());

        // No two assignments share a (slot, court) interval.
        for i in 0..result.assignments.len() {
            for j in (i + 1)..result.assignments.len() {
                let a = &result.assignments[i];
                let b = &result.assignments[j];
                if a.court_id == b.court_id {
                    let disjoint = a.slot_id + a.duration_slots <= b.slot_id
                        || b.slot_id + b.duration_slots <= a.slot_id;
                    prop_assert!(disjoint, "court collision between {} and {}", a.match_id, b.match_id);
                }
            }
        }

        // No participant appears in two overlapping intervals.
        for m_a in &matches {
            for m_b in &matches {
                if m_a.id >= m_b.id {
                    continue;
                }
                let shares_participant = m_a
                    .participant_ids()
                    .any(|p| m_b.participant_ids().any(|q| p == q));
                if !shares_participant {
                    continue;
                }
                let a = result.assignments.iter().find(|a| a.match_id == m_a.id).unwrap();
                let b = result.assignments.iter().find(|a| a.match_id == m_b.id).unwrap();
                let disjoint = a.slot_id + a.duration_slots <= b.slot_id
                    || b.slot_id + b.duration_slots <= a.slot_id;
                prop_assert!(disjoint, "participant overlap between {} and {}", a.match_id, b.match_id);
            }
        }

        prop_assert_eq!(
            result.moved_count as usize,
            result.assignments.iter().filter(|a| a.moved).count()
        );
    }
}

#[test]
fn empty_match_list_is_trivially_optimal() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(4, 2),
        participants: Vec::new(),
        matches: Vec::new(),
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert_eq!(result.status, tourney_scheduler_core::types::ScheduleStatus::Optimal);
    assert!(result.assignments.is_empty());
}

#[test]
fn duration_equal_to_total_slots_forces_slot_zero() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(3, 1),
        participants: vec![
            Participant {
                id: "p1".to_string(),
                name: "p1".to_string(),
                availability: Vec::new(),
                rest_slots: 0,
                rest_is_hard: true,
                rest_penalty: 10.0,
            },
            Participant {
                id: "p2".to_string(),
                name: "p2".to_string(),
                availability: Vec::new(),
                rest_slots: 0,
                rest_is_hard: true,
                rest_penalty: 10.0,
            },
        ],
        matches: vec![Match {
            id: "m1".to_string(),
            event_code: "m1".to_string(),
            duration_slots: 3,
            side_a: vec!["p1".to_string()],
            side_b: vec!["p2".to_string()],
        }],
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert!(result.status.has_assignments());
    assert_eq!(result.assignments[0].slot_id, 0);
}
