use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use blitwin::core::scaling::stretch_smooth;
use blitwin::core::{BackbufferSlot, ClientSize, Presenter};
use blitwin::traits::PresentSurface;

/// Surface that only touches the pixels it is given
struct NullSurface;

impl PresentSurface for NullSurface {
    fn present(&mut self, pixels: &[u32], _size: ClientSize) -> bool {
        black_box(pixels.first());
        true
    }
}

fn filled_slot(size: ClientSize) -> BackbufferSlot<NullSurface> {
    let mut slot = BackbufferSlot::new();
    if let Some(buffer) = slot.ensure(size, |_| Some(NullSurface)) {
        for (i, pixel) in buffer.pixels_mut().iter_mut().enumerate() {
            *pixel = 0xFF00_0000 | (i as u32 & 0x00FF_FFFF);
        }
    }
    slot
}

/// Benchmark: 1:1 present at common resolutions
fn bench_direct_present(c: &mut Criterion) {
    let mut group = c.benchmark_group("present_direct");
    for (w, h) in [(640, 480), (1280, 720), (1920, 1080)] {
        let size = ClientSize::new(w, h);
        let mut slot = filled_slot(size);
        let mut presenter = Presenter::new();

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &size, |b, &size| {
            b.iter(|| presenter.present(&mut slot, black_box(size)))
        });
    }
    group.finish();
}

/// Benchmark: stretched present, fixed 1200x600 buffer into other client sizes
fn bench_scaled_present(c: &mut Criterion) {
    let mut group = c.benchmark_group("present_scaled");
    let source = ClientSize::new(1200, 600);
    for (w, h) in [(640, 512), (800, 400), (2400, 1200)] {
        let client = ClientSize::new(w, h);
        let mut slot = filled_slot(source);
        let mut presenter = Presenter::new();

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &client, |b, &client| {
            b.iter(|| presenter.present(&mut slot, black_box(client)))
        });
    }
    group.finish();
}

/// Benchmark: raw resampler, no surface
fn bench_stretch_smooth(c: &mut Criterion) {
    let src_size = ClientSize::new(320, 240);
    let dst_size = ClientSize::new(1280, 960);
    let src = vec![0xFF33_6699u32; src_size.pixel_count()];
    let mut dst = vec![0u32; dst_size.pixel_count()];

    c.bench_function("stretch_smooth_4x_up", |b| {
        b.iter(|| stretch_smooth(black_box(&src), src_size, &mut dst, dst_size))
    });
}

criterion_group!(benches, bench_direct_present, bench_scaled_present, bench_stretch_smooth);
criterion_main!(benches);
