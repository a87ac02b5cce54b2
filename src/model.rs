//! Sport-agnostic domain types: participants, matches, schedule
//! configuration, and the request/response shapes at the crate boundary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Court, MatchId, ParticipantId, ScheduleStatus, Slot};

/// A participant (player, team, crew — whatever side_a/side_b reference)
/// with rest and availability constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Half-open `[start, end)` slot windows during which this participant
    /// can play. Empty means "always available".
    #[serde(default)]
    pub availability: Vec<(Slot, Slot)>,
    #[serde(default = "default_rest_slots")]
    pub rest_slots: u32,
    #[serde(default = "default_true")]
    pub rest_is_hard: bool,
    #[serde(default = "default_rest_penalty")]
    pub rest_penalty: f64,
}

fn default_rest_slots() -> u32 {
    1
}
fn default_rest_penalty() -> f64 {
    10.0
}
fn default_true() -> bool {
    true
}

/// A match to be scheduled onto a `(slot, court)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub event_code: String,
    #[serde(default = "default_duration")]
    pub duration_slots: u32,
    #[serde(default)]
    pub side_a: Vec<ParticipantId>,
    #[serde(default)]
    pub side_b: Vec<ParticipantId>,
}

fn default_duration() -> u32 {
    1
}

impl Match {
    /// Every participant referenced by either side, deduplicated.
    pub fn participant_ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.side_a.iter().chain(self.side_b.iter())
    }
}

/// A previous placement of a match, used for re-optimization: disruption
/// scoring, locks, and pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousAssignment {
    pub match_id: MatchId,
    pub slot_id: Slot,
    pub court_id: Court,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub pinned_slot_id: Option<Slot>,
    #[serde(default)]
    pub pinned_court_id: Option<Court>,
}

/// Spacing requirement between two games for the same participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CompactScheduleMode {
    MinimizeMakespan,
    NoGaps,
    FinishByTime,
}

/// Tournament/schedule configuration: dimensions plus every objective
/// weight and feature toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub total_slots: Slot,
    pub court_count: Court,
    /// Wall-clock minutes per slot. Never read by any constraint or
    /// objective term; carried only so a caller can round-trip slot
    /// indices to wall-clock times without the core needing to know about
    /// calendars.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_rest_slots")]
    pub default_rest_slots: u32,
    #[serde(default)]
    pub freeze_horizon_slots: u32,
    #[serde(default)]
    pub current_slot: Slot,

    #[serde(default)]
    pub soft_rest_enabled: bool,
    #[serde(default = "default_rest_penalty")]
    pub rest_slack_penalty: f64,
    #[serde(default = "default_one")]
    pub disruption_penalty: f64,
    #[serde(default = "default_half")]
    pub late_finish_penalty: f64,
    #[serde(default = "default_half")]
    pub court_change_penalty: f64,
    #[serde(default = "default_true")]
    pub enable_court_utilization: bool,
    #[serde(default = "default_fifty")]
    pub court_utilization_penalty: f64,

    #[serde(default)]
    pub enable_game_proximity: bool,
    #[serde(default)]
    pub min_game_spacing_slots: Option<u32>,
    #[serde(default)]
    pub max_game_spacing_slots: Option<u32>,
    #[serde(default = "default_five")]
    pub game_proximity_penalty: f64,

    #[serde(default)]
    pub enable_compact_schedule: bool,
    #[serde(default = "default_compact_mode")]
    pub compact_schedule_mode: CompactScheduleMode,
    #[serde(default = "default_hundred")]
    pub compact_schedule_penalty: f64,
    #[serde(default)]
    pub target_finish_slot: Option<Slot>,

    #[serde(default)]
    pub allow_player_overlap: bool,
    #[serde(default = "default_fifty")]
    pub player_overlap_penalty: f64,
}

fn default_interval_minutes() -> u32 {
    30
}
fn default_one() -> f64 {
    1.0
}
fn default_half() -> f64 {
    0.5
}
fn default_five() -> f64 {
    5.0
}
fn default_fifty() -> f64 {
    50.0
}
fn default_hundred() -> f64 {
    100.0
}
fn default_compact_mode() -> CompactScheduleMode {
    CompactScheduleMode::MinimizeMakespan
}

impl ScheduleConfig {
    /// A bare config with every penalty/feature toggle at its default, for
    /// callers that only care about dimensions.
    pub fn new(total_slots: Slot, court_count: Court) -> Self {
        Self {
            total_slots,
            court_count,
            interval_minutes: default_interval_minutes(),
            default_rest_slots: default_rest_slots(),
            freeze_horizon_slots: 0,
            current_slot: 0,
            soft_rest_enabled: false,
            rest_slack_penalty: default_rest_penalty(),
            disruption_penalty: default_one(),
            late_finish_penalty: default_half(),
            court_change_penalty: default_half(),
            enable_court_utilization: true,
            court_utilization_penalty: default_fifty(),
            enable_game_proximity: false,
            min_game_spacing_slots: None,
            max_game_spacing_slots: None,
            game_proximity_penalty: default_five(),
            enable_compact_schedule: false,
            compact_schedule_mode: default_compact_mode(),
            compact_schedule_penalty: default_hundred(),
            target_finish_slot: None,
            allow_player_overlap: false,
            player_overlap_penalty: default_fifty(),
        }
    }
}

/// Solver execution options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: f64,
    /// Forwarded for interface fidelity with engines that parallelize
    /// search; this crate's SAT engine is single-threaded, so beyond
    /// clamping to `[1, 16]` at validation time this field has no effect.
    #[serde(default = "default_num_workers")]
    pub num_workers: u32,
    #[serde(default)]
    pub log_progress: bool,
}

fn default_time_limit() -> f64 {
    5.0
}
fn default_num_workers() -> u32 {
    4
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            time_limit_seconds: default_time_limit(),
            num_workers: default_num_workers(),
            log_progress: false,
        }
    }
}

/// A scheduled assignment in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub match_id: MatchId,
    pub slot_id: Slot,
    pub court_id: Court,
    pub duration_slots: u32,
    pub moved: bool,
    pub previous_slot_id: Option<Slot>,
    pub previous_court_id: Option<Court>,
}

/// A soft-constraint violation incurred by the chosen solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftViolation {
    pub kind: SoftViolationKind,
    pub match_id: Option<MatchId>,
    pub participant_id: Option<ParticipantId>,
    pub description: String,
    pub penalty_incurred: f64,
}

/// The kind of soft constraint a [`SoftViolation`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftViolationKind {
    Rest,
    GameProximityMin,
    GameProximityMax,
}

/// Complete scheduling result. Always returned on `Ok`, even when
/// infeasible — see the crate-level error-handling design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub status: ScheduleStatus,
    pub objective_score: Option<f64>,
    pub runtime: std::time::Duration,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub soft_violations: Vec<SoftViolation>,
    #[serde(default)]
    pub infeasible_reasons: Vec<String>,
    #[serde(default)]
    pub unscheduled_matches: Vec<MatchId>,
    #[serde(default)]
    pub moved_count: u32,
    #[serde(default)]
    pub locked_count: u32,
}

/// A complete scheduling request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub config: ScheduleConfig,
    pub participants: Vec<Participant>,
    pub matches: Vec<Match>,
    #[serde(default)]
    pub previous_assignments: Vec<PreviousAssignment>,
    #[serde(default)]
    pub solver_options: Option<SolverOptions>,
}

impl ScheduleRequest {
    /// Check the request for structural problems that would make building
    /// a model meaningless: unknown participant references, previous
    /// assignments for matches that don't exist, and non-positive
    /// durations. Collects every violation rather than stopping at the
    /// first.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let known_participants: std::collections::HashSet<&ParticipantId> =
            self.participants.iter().map(|p| &p.id).collect();
        let known_matches: std::collections::HashSet<&MatchId> =
            self.matches.iter().map(|m| &m.id).collect();

        if self.config.total_slots == 0 {
            errors.push("config.total_slots must be positive".to_string());
        }
        if self.config.court_count == 0 {
            errors.push("config.court_count must be positive".to_string());
        }

        for m in &self.matches {
            if m.duration_slots == 0 {
                errors.push(format!("match {}: duration_slots must be positive", m.id));
            }
            for pid in m.participant_ids() {
                if !known_participants.contains(pid) {
                    errors.push(format!(
                        "match {}: references unknown participant {pid}",
                        m.id
                    ));
                }
            }
        }

        for pa in &self.previous_assignments {
            if !known_matches.contains(&pa.match_id) {
                errors.push(format!(
                    "previous_assignment references unknown match {}",
                    pa.match_id
                ));
            }
        }

        if let Some(opts) = &self.solver_options {
            if opts.time_limit_seconds <= 0.0 {
                errors.push("solver_options.time_limit_seconds must be positive".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation_many(errors))
        }
    }
}
