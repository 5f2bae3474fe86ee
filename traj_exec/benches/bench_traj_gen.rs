//! # Trajectory Generation Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use traj_lib::{
    optimiser::VariableDomain,
    path::{ControlLockMode, Path, PolarLock, SpeedZone, Vec2Lock, Waypoint},
    traj_builder::{TrajBuilder, TrajectoryConstraints},
    vec2::Vec2,
};

fn traj_gen_benchmark(c: &mut Criterion) {
    // ---- Build an S-shaped path with a slow zone ----

    let constraints = TrajectoryConstraints {
        drivetrain_rpm: 300.0,
        wheel_diameter_in: 3.25,
        max_wheel_accel_ins2: 200.0,
        track_width_in: 12.0,
        mass_lb: 15.0,
        friction_coefficient: 0.8,
    };

    let mut path = Path::new();
    path.append_waypoints(vec![
        Waypoint::new(Vec2::new(0.0, 0.0), Vec2::new(48.0, 0.0), Vec2::zeros()),
        Waypoint::new(Vec2::new(48.0, 24.0), Vec2::new(48.0, 0.0), Vec2::zeros())
            .with_position_lock(Vec2Lock {
                x: None,
                y: Some(VariableDomain::new(12.0, 36.0, 4, 0.5)),
            })
            .with_derivative_lock(PolarLock::from_mode(ControlLockMode::DirectionLocked)),
        Waypoint::new(Vec2::new(96.0, 48.0), Vec2::new(48.0, 0.0), Vec2::zeros()),
    ]);
    path.append_speed_callback(
        SpeedZone {
            centre: [96.0, 48.0],
            radius: 12.0,
            max_speed: 20.0,
        }
        .into_callback(),
    );

    let builder = TrajBuilder::new(constraints);

    c.bench_function("TrajBuilder::build", |b| {
        b.iter(|| builder.build(&path, 3.0).unwrap())
    });

    c.bench_function("Path::discretize", |b| {
        b.iter(|| path.discretize(3.0).unwrap())
    });

    c.bench_function("Path::optimise", |b| {
        b.iter(|| {
            let mut p = path.clone();
            p.optimise(2, &constraints, 1.0).unwrap()
        })
    });
}

criterion_group!(benches, traj_gen_benchmark);
criterion_main!(benches);
