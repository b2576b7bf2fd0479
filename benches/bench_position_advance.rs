use chrono::NaiveDateTime;
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use journey_simulator::global_variables::{BIRMINGHAM, LONDON, VEHICLE_ID};
use journey_simulator::shared_data::SimulationState;
use journey_simulator::simulation_engine::clock::VirtualClock;
use journey_simulator::simulation_engine::movement::PositionModel;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_position_advance(c: &mut Criterion) {
    let model = PositionModel::new(LONDON, BIRMINGHAM);
    let clock = VirtualClock::new();
    let step_counts = [1, 100, 1000];

    let mut group = c.benchmark_group("clock_and_position_advance");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &steps in &step_counts {
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, &steps| {
            b.iter(|| {
                let mut state = SimulationState::new(VEHICLE_ID, LONDON, NaiveDateTime::default());
                let mut rng = StdRng::seed_from_u64(42);
                for _ in 0..steps {
                    clock.advance(&mut state, &mut rng);
                    black_box(model.advance(&mut state, &mut rng));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_position_advance);
criterion_main!(benches);
