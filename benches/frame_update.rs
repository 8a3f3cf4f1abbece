use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scroll_scene::core::{Canvas, ColorStop, DrawOp, Viewport};
use scroll_scene::render::HeadlessSurface;
use scroll_scene::scene::{GeometryAnimator, LightingRig, MaterialFactory, SceneGraph};
use scroll_scene::{EngineConfig, SceneEngine};

fn seeded_config() -> EngineConfig {
    EngineConfig {
        seed: Some(42),
        ..EngineConfig::default()
    }
}

/// Benchmark: Full engine tick (input latch, geometry, lighting, frame collection)
fn bench_engine_tick(c: &mut Criterion) {
    let viewport = Viewport::new(1280, 720).unwrap();
    let mut engine = SceneEngine::new(HeadlessSurface::new(viewport), seeded_config()).unwrap();
    let mut time = 0.0f32;

    c.bench_function("engine_tick", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            engine.set_scroll_progress((time * 0.1).fract());
            engine.set_cursor_position(640.0, 360.0, viewport);
            black_box(engine.tick_at(black_box(time)))
        })
    });
}

/// Benchmark: Geometry update alone (plane wave dominates)
fn bench_geometry_update(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let materials = MaterialFactory::new(&mut rng);
    let mut graph = SceneGraph::new();
    let mut animator = GeometryAnimator::new(&materials, &mut graph, &mut rng);
    let mut time = 0.0f32;

    c.bench_function("geometry_update", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            animator.update(black_box(time));
        })
    });
}

/// Benchmark: Lighting update
fn bench_lighting_update(c: &mut Criterion) {
    let mut graph = SceneGraph::new();
    let mut lighting = LightingRig::new(&mut graph);
    let mut time = 0.0f32;

    c.bench_function("lighting_update", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            lighting.update(black_box(time));
        })
    });
}

/// Benchmark: Procedural gradient textures at several sizes
fn bench_gradient_texture(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_gradient");

    for size in [64u32, 256, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let canvas = Canvas::new(size, size)
                    .draw(DrawOp::LinearGradient {
                        x0: 0.0,
                        y0: 0.0,
                        x1: size as f32,
                        y1: size as f32,
                        stops: vec![
                            ColorStop::hex(0.0, 0xe94560),
                            ColorStop::hex(0.5, 0xf27121),
                            ColorStop::hex(1.0, 0x00ff88),
                        ],
                    })
                    .execute_ops();
                black_box(canvas)
            })
        });
    }

    group.finish();
}

/// Benchmark: Building every texture and material
fn bench_material_factory(c: &mut Criterion) {
    c.bench_function("material_factory_new", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            black_box(MaterialFactory::new(&mut rng))
        })
    });
}

criterion_group!(
    benches,
    bench_engine_tick,
    bench_geometry_update,
    bench_lighting_update,
    bench_gradient_texture,
    bench_material_factory,
);

criterion_main!(benches);
