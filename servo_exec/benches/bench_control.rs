//! # Control Benchmark
//!
//! Measures one control cycle's computation, from pose and goal to limited wheel demands.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use servo_lib::{
    conv_ctrl::{self, ConvCtrl},
    loc::Pose,
    loco_ctrl::{self, LocoCtrl},
};
use util::module::State;

fn control_benchmark(c: &mut Criterion) {
    // ---- Build the controllers ----

    let mut conv_ctrl = ConvCtrl::new(conv_ctrl::Params {
        gain: 130.0,
        offset_px: 25.0,
    })
    .unwrap();

    let mut loco_ctrl = LocoCtrl::new(loco_ctrl::Params {
        wheel_radius_px: 58.0,
        axle_length_px: 120.0,
        max_wheel_rate: 150.0,
    })
    .unwrap();

    let input = conv_ctrl::InputData {
        pose: Pose {
            x: -120.0,
            y: 45.0,
            theta: 2.1,
        },
        goal_px: [-250.0, -100.0],
    };

    // ---- Run the benchmarks ----

    c.bench_function("conv_ctrl", |b| {
        b.iter(|| conv_ctrl.proc(black_box(&input)).unwrap())
    });

    let (speed_dems, _) = conv_ctrl.proc(&input).unwrap();

    c.bench_function("loco_ctrl", |b| {
        b.iter(|| loco_ctrl.proc(black_box(&speed_dems)).unwrap())
    });

    c.bench_function("control_cycle", |b| {
        b.iter(|| {
            let (speed_dems, _) = conv_ctrl.proc(black_box(&input)).unwrap();
            loco_ctrl.proc(&speed_dems).unwrap()
        })
    });
}

criterion_group!(benches, control_benchmark);
criterion_main!(benches);
