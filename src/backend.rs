//! Closed set of scheduling engines a request can be solved with.

use crate::model::{Participant, PreviousAssignment, ScheduleRequest, ScheduleResult, SolverOptions};
use crate::{constraints, extract, objective, variables};

/// Which engine `solve`/`reschedule` dispatch to. A closed enum rather
/// than a trait object: there are exactly two engines in this crate and
/// callers need to be able to match on which one produced a result.
#[derive(Debug, Clone)]
pub enum Backend {
    CpSat(SolverOptions),
    Greedy,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::CpSat(SolverOptions::default())
    }
}

/// Build and solve `request` with `backend`.
pub fn solve_with(backend: &Backend, request: &ScheduleRequest) -> ScheduleResult {
    match backend {
        Backend::CpSat(options) => solve_cp_sat(request, options),
        Backend::Greedy => crate::greedy::solve(
            &request.matches,
            &request.participants,
            &request.previous_assignments,
            &request.config,
        ),
    }
}

fn solve_cp_sat(request: &ScheduleRequest, options: &SolverOptions) -> ScheduleResult {
    use std::collections::HashMap;
    use std::time::{Duration, Instant};

    let start_time = Instant::now();
    let config = &request.config;

    tracing::debug!(
        matches = request.matches.len(),
        participants = request.participants.len(),
        court_count = config.court_count,
        total_slots = config.total_slots,
        "build start"
    );

    let participants: HashMap<_, Participant> = request
        .participants
        .iter()
        .map(|p| (p.id.clone(), p.clone()))
        .collect();
    let previous: HashMap<_, PreviousAssignment> = request
        .previous_assignments
        .iter()
        .map(|pa| (pa.match_id.clone(), pa.clone()))
        .collect();

    let mut model = crate::cp::CpModel::new();
    let vars = variables::build(&mut model, &request.matches, config);
    let constraint_outputs = constraints::build(
        &mut model,
        &vars,
        &request.matches,
        &participants,
        &previous,
        config,
    );

    tracing::debug!(locked = constraint_outputs.locked_matches.len(), "build end");

    if !constraint_outputs.infeasible_reasons.is_empty() {
        let reasons = crate::diagnostics::diagnose(
            &request.matches,
            &participants,
            config,
            &constraint_outputs.infeasible_reasons,
        );
        tracing::info!(reasons = reasons.len(), "infeasible before solve, diagnostics run");
        return crate::model::ScheduleResult {
            status: crate::types::ScheduleStatus::Infeasible,
            objective_score: None,
            runtime: start_time.elapsed(),
            assignments: Vec::new(),
            soft_violations: Vec::new(),
            infeasible_reasons: reasons,
            unscheduled_matches: request.matches.iter().map(|m| m.id.clone()).collect(),
            moved_count: 0,
            locked_count: constraint_outputs.locked_matches.len() as u32,
        };
    }

    objective::build(
        &mut model,
        &vars,
        &request.matches,
        &participants,
        &previous,
        &constraint_outputs,
        config,
    );

    let solve_options = crate::cp::SolveOptions {
        time_limit: Duration::from_secs_f64(options.time_limit_seconds),
        progress: None,
    };
    tracing::debug!(time_limit_seconds = options.time_limit_seconds, "solve start");
    let solution = model.solve(&solve_options);
    tracing::debug!(status = ?solution.status, elapsed_ms = start_time.elapsed().as_millis() as u64, "solve end");

    if solution.status.has_solution() {
        let (assignments, soft_violations, moved_count) = extract::extract(
            &solution,
            &vars,
            &participants,
            &previous,
            &constraint_outputs,
            config,
        );
        tracing::debug!(
            assignments = assignments.len(),
            soft_violations = soft_violations.len(),
            moved_count,
            "solution extracted"
        );
        crate::model::ScheduleResult {
            status: to_schedule_status(solution.status),
            objective_score: solution.objective_value.map(|v| v as f64 / 10.0),
            runtime: start_time.elapsed(),
            assignments,
            soft_violations,
            infeasible_reasons: Vec::new(),
            unscheduled_matches: Vec::new(),
            moved_count,
            locked_count: constraint_outputs.locked_matches.len() as u32,
        }
    } else {
        let reasons = crate::diagnostics::diagnose(&request.matches, &participants, config, &[]);
        tracing::info!(reasons = reasons.len(), "solver returned no solution, diagnostics run");
        crate::model::ScheduleResult {
            status: to_schedule_status(solution.status),
            objective_score: None,
            runtime: start_time.elapsed(),
            assignments: Vec::new(),
            soft_violations: Vec::new(),
            infeasible_reasons: reasons,
            unscheduled_matches: request.matches.iter().map(|m| m.id.clone()).collect(),
            moved_count: 0,
            locked_count: constraint_outputs.locked_matches.len() as u32,
        }
    }
}

fn to_schedule_status(status: crate::cp::CpStatus) -> crate::types::ScheduleStatus {
    match status {
        crate::cp::CpStatus::Optimal => crate::types::ScheduleStatus::Optimal,
        crate::cp::CpStatus::Feasible => crate::types::ScheduleStatus::Feasible,
        crate::cp::CpStatus::Infeasible => crate::types::ScheduleStatus::Infeasible,
        crate::cp::CpStatus::Unknown => crate::types::ScheduleStatus::Unknown,
    }
}
