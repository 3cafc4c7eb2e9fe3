//! Performance benchmarks for the touch decode path.
//!
//! A poll runs every 17 ms, so the decode itself should stay far below a
//! microsecond per point. These benchmarks cover the bit-field decode, a full
//! poll against the mock bus, and evdev encoding of the resulting frame.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench decoder_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use touchpoll_core::{PointRecord, TouchEventType, TouchId, TouchSample};
use touchpoll_hardware::config::TouchscreenConfig;
use touchpoll_hardware::decoder::TouchDecoder;
use touchpoll_hardware::evdev::EvdevEncoder;
use touchpoll_hardware::frame::FrameRecorder;
use touchpoll_hardware::mock::{MockRegisterBus, RegisterSnapshot};
use touchpoll_hardware::types::DeviceDescriptor;

/// Report with `points` contacts spread across the panel.
fn create_report(points: usize) -> Vec<TouchSample> {
    (0..points)
        .map(|n| {
            TouchSample::new(
                TouchId::new(n as u8).unwrap(),
                (n as u16) * 70 + 15,
                (n as u16) * 40 + 10,
                TouchEventType::Contact,
            )
        })
        .collect()
}

/// Benchmark decoding a single point record.
fn bench_point_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_decode");
    group.throughput(Throughput::Elements(1));

    let raw = [0x81, 0x2C, 0x20, 0x96];

    group.bench_function("decode_point_record", |b| {
        b.iter(|| {
            let record = PointRecord::from_bytes(black_box(&raw)).unwrap();
            black_box(record.decode());
        });
    });

    group.finish();
}

/// Benchmark a complete poll for increasing numbers of contacts.
fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll");

    for points in [0usize, 1, 5, 10] {
        group.throughput(Throughput::Elements(points.max(1) as u64));

        let (mut bus, handle) = MockRegisterBus::new();
        let mut decoder = TouchDecoder::default();
        let mut sink = FrameRecorder::new();

        // Zero points with nothing active measures the idle path.
        handle.set_snapshot(RegisterSnapshot::from_samples(&create_report(points)));

        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, _| {
            b.iter(|| {
                black_box(decoder.poll(&mut bus, &mut sink));
                sink.drain_frames().for_each(|frame| {
                    black_box(frame);
                });
            });
        });
    }

    group.finish();
}

/// Benchmark encoding a full ten-contact frame as input events.
fn bench_evdev_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("evdev_encode");
    group.throughput(Throughput::Elements(10));

    let (mut bus, handle) = MockRegisterBus::new();
    let mut decoder = TouchDecoder::default();
    let mut sink = FrameRecorder::new();
    let descriptor = DeviceDescriptor::from_config(&TouchscreenConfig::default());

    handle.set_snapshot(RegisterSnapshot::from_samples(&create_report(10)));
    decoder.poll(&mut bus, &mut sink);
    let pressed = sink.take_frame().unwrap();

    handle.set_snapshot(RegisterSnapshot::empty());
    decoder.poll(&mut bus, &mut sink);
    let released = sink.take_frame().unwrap();

    group.bench_function("press_and_release_ten", |b| {
        let mut encoder = EvdevEncoder::new(&descriptor);
        b.iter(|| {
            black_box(encoder.encode(black_box(&pressed)));
            black_box(encoder.encode(black_box(&released)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_point_decode, bench_poll, bench_evdev_encode);
criterion_main!(benches);
