use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use vactrace::particle::hemisphere_direction;
use vactrace::{Background, Geometry, Particle, Reflector, ReflectorKind, Surface, Tracer, Vec3};

fn mirror_cube() -> Geometry {
    let v = Vec3::new;
    let contours = [
        vec![v(0., 0., 0.), v(0., 1., 0.), v(0., 1., 1.), v(0., 0., 1.)],
        vec![v(0., 0., 0.), v(0., 0., 1.), v(1., 0., 1.), v(1., 0., 0.)],
        vec![v(0., 0., 0.), v(1., 0., 0.), v(1., 1., 0.), v(0., 1., 0.)],
        vec![v(1., 0., 0.), v(1., 0., 1.), v(1., 1., 1.), v(1., 1., 0.)],
        vec![v(0., 1., 0.), v(1., 1., 0.), v(1., 1., 1.), v(0., 1., 1.)],
        vec![v(0., 0., 1.), v(0., 1., 1.), v(1., 1., 1.), v(1., 0., 1.)],
    ];
    let surfaces = contours
        .into_iter()
        .enumerate()
        .map(|(i, contour)| {
            let reflector = Reflector::new(ReflectorKind::Lambertian, 1.0).unwrap();
            Surface::new(format!("wall_{}", i), contour, reflector, false).unwrap()
        })
        .collect();
    Geometry::new(surfaces).unwrap()
}

fn bench_trace_step(c: &mut Criterion) {
    let cube = mirror_cube();
    let gas = Background::new(2e-16, 300.0, 5.0).unwrap();
    let tracer = Tracer::new(&cube, &gas);
    let mut rng = StdRng::seed_from_u64(42);
    let mut particle = Particle::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.3, 0.2, 1.0));

    c.bench_function("trace_step_unit_cube", |b| {
        b.iter(|| black_box(tracer.step(&mut particle, &mut rng)))
    });
}

fn bench_hemisphere_sampling(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let axis = Vec3::new(-2.0, 5.0, 10.0).unit();

    c.bench_function("hemisphere_direction", |b| {
        b.iter(|| black_box(hemisphere_direction(black_box(&axis), &mut rng)))
    });
}

criterion_group!(benches, bench_trace_step, bench_hemisphere_sampling);
criterion_main!(benches);
