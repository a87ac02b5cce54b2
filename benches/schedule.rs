//! Benchmark comparing the CP-over-SAT backend against the greedy
//! fallback on synthetic tournaments of increasing size.
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use tourney_scheduler_core::backend::{self, Backend};
use tourney_scheduler_core::model::{Match, Participant, ScheduleConfig, ScheduleRequest, SolverOptions};

fn synthetic_request(num_matches: usize, court_count: u32) -> ScheduleRequest {
    let participants: Vec<Participant> = (0..num_matches * 2)
        .map(|i| Participant {
            id: format!("p{i}"),
            name: format!("Player {i}"),
            availability: Vec::new(),
            rest_slots: 1,
            rest_is_hard: true,
            rest_penalty: 10.0,
        })
        .collect();

    let matches: Vec<Match> = (0..num_matches)
        .map(|i| Match {
            id: format!("m{i}"),
            event_code: format!("R{i}"),
            duration_slots: 1,
            side_a: vec![format!("p{}", i * 2)],
            side_b: vec![format!("p{}", i * 2 + 1)],
        })
        .collect();

    let total_slots = (num_matches as u32).div_ceil(court_count) + 4;

    ScheduleRequest {
        config: ScheduleConfig::new(total_slots, court_count),
        participants,
        matches,
        previous_assignments: Vec::new(),
        solver_options: Some(SolverOptions {
            time_limit_seconds: 5.0,
            ..SolverOptions::default()
        }),
    }
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");

    for size in [4usize, 8, 16, 32] {
        let request = synthetic_request(size, 4);

        group.bench_with_input(BenchmarkId::new("cp_sat", size), &request, |b, request| {
            let cp_sat = Backend::CpSat(request.solver_options.unwrap_or_default());
            b.iter(|| backend::solve_with(&cp_sat, request));
        });

        group.bench_with_input(BenchmarkId::new("greedy", size), &request, |b, request| {
            b.iter(|| backend::solve_with(&Backend::Greedy, request));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
