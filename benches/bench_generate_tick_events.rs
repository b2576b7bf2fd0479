use chrono::NaiveDateTime;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use journey_simulator::communication::publisher::encode_event;
use journey_simulator::global_variables::{CAMERA_ID, GPS_VEHICLE_TYPE, LONDON, VEHICLE_ID};
use journey_simulator::shared_data::SimulationState;
use journey_simulator::simulation_engine::events::generate_tick_events;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_generate_tick_events(c: &mut Criterion) {
    let state = SimulationState::new(VEHICLE_ID, LONDON, NaiveDateTime::default());
    let mut rng = StdRng::seed_from_u64(42);

    let mut group = c.benchmark_group("tick_events");

    group.bench_function("generate", |b| {
        b.iter(|| {
            let events = generate_tick_events(
                1,
                state.snapshot(),
                CAMERA_ID,
                GPS_VEHICLE_TYPE,
                &mut rng,
            );
            black_box(events);
        });
    });

    // Generation plus JSON encoding of all five events, i.e. the CPU side of a tick.
    group.bench_function("generate_and_encode", |b| {
        b.iter(|| {
            let events = generate_tick_events(
                1,
                state.snapshot(),
                CAMERA_ID,
                GPS_VEHICLE_TYPE,
                &mut rng,
            );
            for event in events.to_events() {
                black_box(encode_event(&event).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_generate_tick_events);
criterion_main!(benches);
