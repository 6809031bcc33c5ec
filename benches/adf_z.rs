use std::hint::black_box;
use std::time::Duration;

use adf_zsim::simulation::simulate;
use adf_zsim::simulation::BatchRunner;
use adf_zsim::simulation::TrendSpec;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_simulate(c: &mut Criterion) {
  let mut group = c.benchmark_group("AdfZ/simulate");
  group.measurement_time(Duration::from_secs(3));
  group.warm_up_time(Duration::from_millis(500));
  let b = 1_000usize;

  for trend in TrendSpec::ALL {
    group.bench_with_input(BenchmarkId::new(trend.tag(), 100), &100usize, |bench, &n| {
      let mut rng = StdRng::seed_from_u64(0);
      bench.iter(|| black_box(simulate(n, trend, b, &mut rng).unwrap()));
    });
  }

  group.finish();
}

fn bench_batch_runner(c: &mut Criterion) {
  let mut group = c.benchmark_group("AdfZ/BatchRunner");
  group.measurement_time(Duration::from_secs(3));
  group.warm_up_time(Duration::from_millis(500));
  let total = 20_000usize;

  for budget in [1.0, 10.0, 100.0] {
    let runner = BatchRunner::new(budget).unwrap();
    group.bench_with_input(BenchmarkId::new("budget_mib", budget), &500usize, |bench, &n| {
      let mut rng = StdRng::seed_from_u64(0);
      bench.iter(|| black_box(runner.run(n, TrendSpec::Constant, total, &mut rng).unwrap()));
    });
  }

  group.finish();
}

criterion_group!(benches, bench_simulate, bench_batch_runner);
criterion_main!(benches);
