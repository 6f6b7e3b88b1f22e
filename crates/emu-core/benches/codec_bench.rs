//! Criterion benchmarks for the device-event codec.
//!
//! Touch snapshots are the hot path: a ten-finger drag re-encodes every live
//! contact on each move.
//!
//! Run with:
//! ```bash
//! cargo bench --package emu-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_core::protocol::codec::{decode_event, encode_event};
use emu_core::protocol::messages::{
    ButtonMask, DeviceEvent, KeyEvent, MouseEvent, TouchContact, TouchEvent, PRESSURE_MAX,
};
use emu_core::SlotTracker;

// ── Event fixtures ────────────────────────────────────────────────────────────

fn make_mouse() -> DeviceEvent {
    DeviceEvent::Mouse(MouseEvent {
        buttons: ButtonMask(ButtonMask::LEFT),
        x: 540,
        y: 960,
    })
}

fn make_key() -> DeviceEvent {
    DeviceEvent::Key(KeyEvent::down("Enter"))
}

fn make_touch(contacts: usize) -> DeviceEvent {
    DeviceEvent::Touch(TouchEvent::new(
        (0..contacts)
            .map(|i| TouchContact {
                slot: i as u32,
                tracking_id: i as i32 + 1,
                x: 100 * i as i32,
                y: 1900 - 100 * i as i32,
                pressure: Some(PRESSURE_MAX),
                major_radius: Some(22),
            })
            .collect(),
    ))
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks `encode_event` for every record type.
fn bench_encode(c: &mut Criterion) {
    let events: &[(&str, DeviceEvent)] = &[
        ("Mouse", make_mouse()),
        ("Key", make_key()),
        ("Touch(1)", make_touch(1)),
        ("Touch(10)", make_touch(10)),
    ];

    let mut group = c.benchmark_group("encode_event");
    for (name, event) in events {
        group.bench_with_input(BenchmarkId::new("event", name), event, |b, event| {
            b.iter(|| encode_event(black_box(event)))
        });
    }
    group.finish();
}

/// Benchmarks `decode_event` from pre-encoded bytes.
fn bench_decode(c: &mut Criterion) {
    let events: &[(&str, DeviceEvent)] = &[
        ("Mouse", make_mouse()),
        ("Key", make_key()),
        ("Touch(10)", make_touch(10)),
    ];

    let mut group = c.benchmark_group("decode_event");
    for (name, event) in events {
        let bytes = encode_event(event);
        let kind = event.kind();
        group.bench_with_input(BenchmarkId::new("event", name), &bytes, |b, bytes| {
            b.iter(|| decode_event(kind, black_box(bytes)).expect("decode must succeed"))
        });
    }
    group.finish();
}

/// Benchmarks one touch-move step: update a tracked contact, snapshot, encode.
fn bench_touch_move_hot_path(c: &mut Criterion) {
    let mut tracker = SlotTracker::default();
    for id in 0..10 {
        tracker.on_contact_start(id).expect("free slot");
    }

    c.bench_function("touch_move_snapshot_encode", |b| {
        let mut x = 0;
        b.iter(|| {
            x = (x + 1) % 1080;
            tracker
                .on_contact_update(black_box(3), x, 500, Some(PRESSURE_MAX), None)
                .expect("live");
            encode_event(&DeviceEvent::Touch(TouchEvent::new(tracker.snapshot())))
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_touch_move_hot_path);
criterion_main!(benches);
