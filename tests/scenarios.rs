//! End-to-end scenarios exercised against the public `solve` entry point.

use tourney_scheduler_core::model::{Match, Participant, PreviousAssignment, ScheduleConfig, ScheduleRequest};
use tourney_scheduler_core::types::ScheduleStatus;

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

fn m(id: &str, duration: u32, side_a: &[&str], side_b: &[&str]) -> Match {
    Match {
        id: id.to_string(),
        event_code: id.to_string(),
        duration_slots: duration,
        side_a: side_a.iter().map(|s| s.to_string()).collect(),
        side_b: side_b.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn s1_single_match_ample_capacity() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(10, 2),
        participants: vec![participant("p1"), participant("p2")],
        matches: vec![m("m1", 1, &["p1"], &["p2"])],
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert_eq!(result.status, ScheduleStatus::Optimal);
    assert_eq!(result.assignments.len(), 1);
    let a = &result.assignments[0];
    assert!(a.slot_id <= 9);
    assert!((1..=2).contains(&a.court_id));
}

#[test]
fn s2_participant_no_overlap() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(10, 4),
        participants: vec![participant("p1"), participant("p2"), participant("p3")],
        matches: vec![m("m1", 1, &["p1"], &["p2"]), m("m2", 1, &["p1"], &["p3"])],
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert!(result.status.has_assignments());
    assert_eq!(result.assignments.len(), 2);
    let a1 = &result.assignments[0];
    let a2 = &result.assignments[1];
    let disjoint = a1.slot_id + a1.duration_slots <= a2.slot_id || a2.slot_id + a2.duration_slots <= a1.slot_id;
    assert!(a1.slot_id != a2.slot_id || disjoint);
}

#[test]
fn s3_forced_infeasibility() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(1, 1),
        participants: vec![participant("p1"), participant("p2"), participant("p3")],
        matches: vec![m("m1", 1, &["p1"], &["p2"]), m("m2", 1, &["p1"], &["p3"])],
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert_eq!(result.status, ScheduleStatus::Infeasible);
    let mut unscheduled = result.unscheduled_matches.clone();
    unscheduled.sort();
    assert_eq!(unscheduled, vec!["m1".to_string(), "m2".to_string()]);
    assert!(!result.infeasible_reasons.is_empty());
}

#[test]
fn s4_lock_preservation() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(10, 2),
        participants: vec![participant("p1"), participant("p2")],
        matches: vec![m("m1", 1, &["p1"], &["p2"])],
        previous_assignments: vec![PreviousAssignment {
            match_id: "m1".to_string(),
            slot_id: 5,
            court_id: 2,
            locked: true,
            pinned_slot_id: None,
            pinned_court_id: None,
        }],
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert!(result.status.has_assignments());
    assert_eq!(result.assignments.len(), 1);
    let a = &result.assignments[0];
    assert_eq!(a.slot_id, 5);
    assert_eq!(a.court_id, 2);
    assert_eq!(result.locked_count, 1);
    assert_eq!(result.moved_count, 0);
}

#[test]
fn s5_availability_window() {
    let mut p1 = participant("p1");
    p1.availability = vec![(0, 3)];
    let request = ScheduleRequest {
        config: ScheduleConfig::new(10, 2),
        participants: vec![p1, participant("p2")],
        matches: vec![m("m1", 1, &["p1"], &["p2"])],
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert!(result.status.has_assignments());
    let a = &result.assignments[0];
    assert!(a.slot_id < 3);
    assert!(a.slot_id + a.duration_slots <= 3);
}

#[test]
fn s6_multi_slot_match_single_court() {
    let request = ScheduleRequest {
        config: ScheduleConfig::new(10, 1),
        participants: vec![participant("p1"), participant("p2")],
        matches: vec![m("m1", 3, &["p1"], &["p2"])],
        previous_assignments: Vec::new(),
        solver_options: None,
    };
    let result = tourney_scheduler_core::solve(request).unwrap();
    assert!(result.status.has_assignments());
    let a = &result.assignments[0];
    assert!(a.slot_id + 3 <= 10);
    assert_eq!(a.court_id, 1);
}
