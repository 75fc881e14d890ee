
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use policyshard_core::{ShardReducer, dedupe_policy_shards};
use reduce_common::{build_scenario, scenario_specs};
use std::hint::black_box;

fn benchmark_effect(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_shards_effect");
    group.sample_size(40);

    let reducer = ShardReducer::default();
    let scenarios: Vec<_> = scenario_specs().into_iter().map(build_scenario).collect();

    for scenario in &scenarios {
        group.bench_with_input(BenchmarkId::from_parameter(scenario.name), scenario, |b, s| {
            b.iter(|| {
                let allowed = reducer
                    .effect(black_box(&s.shards))
                    .expect("benchmark shards reduce");
                black_box(allowed.len());
            });
        });
    }

    group.finish();
}

fn benchmark_dedupe(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedupe_policy_shards");
    group.sample_size(20);

    let reducer = ShardReducer::default();
    let scenarios: Vec<_> = scenario_specs()
        .into_iter()
        .map(build_scenario)
        .map(|s| {
            let allowed = reducer.effect(&s.shards).expect("benchmark shards reduce");
            (s.name, allowed)
        })
        .collect();

    for (name, shards) in &scenarios {
        group.bench_with_input(BenchmarkId::from_parameter(name), shards, |b, s| {
            b.iter(|| {
                let deduped = dedupe_policy_shards(black_box(s)).expect("benchmark shards dedupe");
                black_box(deduped.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_effect, benchmark_dedupe);
criterion_main!(benches);
