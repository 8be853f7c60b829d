//! Benchmark for per-ray integration and whole frames.
//!
//! TARGET: 320x180 frame at default quality in under 250 ms
//!
//! Run with: cargo bench --package stratus_rendering --bench raymarch_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glam::Vec3;
use stratus_core::{NoiseConfig, ParameterSet, Ray, RenderConfig};
use stratus_procedural::{CloudVolumes, NoiseFieldGenerator};
use stratus_rendering::{CameraRig, CloudRenderer, DensitySampler, FrameInputs, RaymarchIntegrator};

fn volumes() -> CloudVolumes {
    let config = NoiseConfig {
        shape_resolution: 64,
        ..NoiseConfig::default()
    };
    NoiseFieldGenerator::new(config)
        .expect("valid config")
        .generate_all()
        .expect("allocates")
}

fn benchmark_density_sample(c: &mut Criterion) {
    let volumes = volumes();
    let params = ParameterSet::default();
    let sampler = DensitySampler::new(&volumes, &params, 0.0);

    c.bench_function("density_sample", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x += 3.7;
            black_box(sampler.sample_density(black_box(Vec3::new(x, 2_500.0, x * 0.3))))
        });
    });
}

fn benchmark_single_ray(c: &mut Criterion) {
    let volumes = volumes();
    let params = ParameterSet::default();
    let integrator = RaymarchIntegrator::new(DensitySampler::new(&volumes, &params, 0.0));
    let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(-1.0, 0.4, 0.1));

    c.bench_function("integrate_ray_128_steps", |b| {
        b.iter(|| black_box(integrator.integrate(black_box(&ray), 0.5)));
    });
}

fn benchmark_frame(c: &mut Criterion) {
    let config = RenderConfig {
        width: 320,
        height: 180,
        ..RenderConfig::default()
    };
    let renderer = CloudRenderer::new(Arc::new(volumes()), config).expect("valid config");
    let params = ParameterSet::default();
    let camera = CameraRig::perspective(
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(-1.0, 0.5, 0.0),
        60.0,
        320.0 / 180.0,
        1.0,
        1000.0,
    );

    let mut group = c.benchmark_group("frame");
    group.sample_size(10);
    group.throughput(Throughput::Elements(320 * 180));
    group.bench_function("render_320x180", |b| {
        let mut time = 0.0f32;
        b.iter(|| {
            time += 1.0 / 60.0;
            black_box(renderer.render(&FrameInputs {
                camera,
                elapsed_time: time,
                params: &params,
            }))
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_density_sample,
    benchmark_single_ray,
    benchmark_frame
);
criterion_main!(benches);
