//! End-to-end tests: raw surface events → adapter → dispatcher → channel.
//!
//! The capture surface is 200x200, as a small embedded emulator view would
//! be; every send is recorded with its encoded bytes.

use emu_core::{decode_event, encode_event, CaptureSurface, DeviceEvent, DeviceResolution, EventKind};
use emu_input::application::{replay, DispatchStats, InputCaptureAdapter};
use emu_input::infrastructure::input_capture::mock::MockInputSource;
use emu_input::infrastructure::input_capture::{
    CaptureSubscription, KeySample, PointerSample, RawInputEvent, TouchPoint, TouchSample,
};
use emu_session::{InputChannel, SendError};

#[derive(Default)]
struct RecordingChannel {
    sends: Vec<(String, Vec<u8>)>,
}

impl InputChannel for RecordingChannel {
    fn send(&mut self, stream: &str, event: &DeviceEvent) -> Result<(), SendError> {
        self.sends.push((stream.to_string(), encode_event(event)));
        Ok(())
    }
}

impl RecordingChannel {
    fn streams(&self) -> Vec<&str> {
        self.sends.iter().map(|(s, _)| s.as_str()).collect()
    }

    fn decoded(&self, index: usize) -> DeviceEvent {
        let (stream, bytes) = &self.sends[index];
        let kind = EventKind::from_stream_name(stream).expect("known stream");
        decode_event(kind, bytes).expect("well-formed payload")
    }
}

fn pointer(offset: f64) -> PointerSample {
    PointerSample {
        offset_x: offset,
        offset_y: offset,
        buttons: 0,
    }
}

fn key(key: &str) -> KeySample {
    KeySample {
        key: key.into(),
        code: key.into(),
    }
}

fn touch(at: f64, force: f64) -> TouchSample {
    TouchSample {
        touches: vec![TouchPoint {
            identifier: 0,
            client_x: at,
            client_y: at,
            radius_x: 4.0,
            radius_y: 4.0,
            force: Some(force),
        }],
        changed_touches: None,
    }
}

/// Feeds `events` through a fresh adapter and returns what reached the channel.
async fn run(events: Vec<RawInputEvent>) -> (RecordingChannel, DispatchStats) {
    let source = MockInputSource::new();
    let feed = source.clone();
    let subscription = CaptureSubscription::attach(source).expect("attach");
    for event in events {
        feed.inject_event(event);
    }
    feed.finish();

    let adapter = InputCaptureAdapter::new(
        CaptureSurface::new(200, 200),
        DeviceResolution::new(1080, 1920),
        10,
    )
    .expect("valid geometry");
    let mut channel = RecordingChannel::default();
    let stats = replay(subscription, adapter, &mut channel).await;
    (channel, stats)
}

fn first_contact_pressure(channel: &RecordingChannel) -> Option<i16> {
    match channel.decoded(0) {
        DeviceEvent::Touch(t) => t.contacts[0].pressure,
        other => panic!("expected touch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forwards_mouse_events() {
    // Arrange / Act
    let (channel, stats) = run(vec![
        RawInputEvent::MouseDown(pointer(10.0)),
        RawInputEvent::MouseUp(pointer(20.0)),
    ])
    .await;

    // Assert
    assert_eq!(channel.streams(), vec!["mouse", "mouse"]);
    assert_eq!(stats.sent, 2);
}

#[tokio::test]
async fn test_forwards_keyboard_events() {
    let (channel, _) = run(vec![
        RawInputEvent::KeyDown(key("Enter")),
        RawInputEvent::KeyUp(key("Enter")),
    ])
    .await;

    assert_eq!(channel.streams(), vec!["keyboard", "keyboard"]);
    assert!(matches!(channel.decoded(0), DeviceEvent::Key(k) if k.down && k.key_code == "Enter"));
    assert!(matches!(channel.decoded(1), DeviceEvent::Key(k) if !k.down));
}

#[tokio::test]
async fn test_forwards_touch_events() {
    // Arrange / Act
    let (channel, _) = run(vec![
        RawInputEvent::TouchStart(touch(10.0, 1.0)),
        RawInputEvent::TouchMove(touch(20.0, 2.0)),
        RawInputEvent::TouchEnd(touch(30.0, 0.0)),
    ])
    .await;

    // Assert: three full snapshots, the last one with the contact released
    assert_eq!(channel.streams(), vec!["touch", "touch", "touch"]);
    let DeviceEvent::Touch(moved) = channel.decoded(1) else {
        panic!("expected touch");
    };
    assert_eq!(moved.contacts.len(), 1);
    assert_eq!(moved.contacts[0].pressure, Some(0x7fff), "force above 1 is clamped");
    let DeviceEvent::Touch(ended) = channel.decoded(2) else {
        panic!("expected touch");
    };
    assert!(ended.contacts.is_empty());
}

#[tokio::test]
async fn test_normalizes_full_touch_pressure_to_max() {
    let (channel, _) = run(vec![RawInputEvent::TouchStart(touch(10.0, 1.0))]).await;
    assert_eq!(first_contact_pressure(&channel), Some(0x7fff));
}

#[tokio::test]
async fn test_zero_touch_pressure_is_absent_on_the_wire() {
    let (channel, _) = run(vec![RawInputEvent::TouchStart(touch(10.0, 0.0))]).await;
    assert_eq!(first_contact_pressure(&channel), None);
}

#[tokio::test]
async fn test_normalizes_half_touch_pressure() {
    let (channel, _) = run(vec![RawInputEvent::TouchStart(touch(10.0, 0.5))]).await;
    assert_eq!(first_contact_pressure(&channel), Some(16384));
}

#[tokio::test]
async fn test_touch_coordinates_and_radius_are_scaled_to_the_device() {
    // Arrange / Act
    let (channel, _) = run(vec![RawInputEvent::TouchStart(touch(10.0, 1.0))]).await;

    // Assert: x 10/200*1080, y 10/200*1920, radius 4/200*1080
    let DeviceEvent::Touch(t) = channel.decoded(0) else {
        panic!("expected touch");
    };
    assert_eq!((t.contacts[0].x, t.contacts[0].y), (54, 96));
    assert_eq!(t.contacts[0].major_radius, Some(22));
}

#[tokio::test]
async fn test_hover_moves_are_not_sent() {
    let (channel, stats) = run(vec![
        RawInputEvent::MouseMove(pointer(1.0)),
        RawInputEvent::MouseMove(pointer(2.0)),
    ])
    .await;

    assert!(channel.sends.is_empty());
    assert_eq!(stats, DispatchStats::default());
}
