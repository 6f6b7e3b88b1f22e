//! InputCaptureAdapter: turns raw surface input into device events.
//!
//! The adapter owns the surface → device geometry and the touch
//! [`SlotTracker`].  Each call to [`InputCaptureAdapter::handle`] yields at
//! most one [`DeviceEvent`]:
//!
//! | Raw event                  | Device event                            |
//! |----------------------------|-----------------------------------------|
//! | `mousedown` / `mouseup`    | `Mouse` (always)                        |
//! | `mousemove`                | `Mouse` only while a button is held     |
//! | `keydown` / `keyup`        | `Key` (always, no repeat suppression)   |
//! | `touchstart` / `touchmove` | `Touch` snapshot of all live contacts   |
//! | `touchend` / `touchcancel` | `Touch` snapshot without the released   |
//!
//! Stray touch identifiers and slot exhaustion are local conditions: they are
//! logged and the offending contact is skipped.

use emu_core::protocol::normalize_pressure;
use emu_core::{
    ButtonMask, CaptureSurface, ConfigurationError, DeviceEvent, DeviceResolution, KeyEvent,
    MouseEvent, SlotTracker, SurfaceGeometry, TouchContact, TouchEvent,
};
use tracing::{debug, warn};

use crate::infrastructure::input_capture::{
    KeySample, PointerSample, RawInputEvent, TouchPoint, TouchSample,
};

/// Force assumed for contacts on hardware that does not report pressure.
const DEFAULT_FORCE: f64 = 1.0;

/// `key` value browsers report when they cannot name the key.
const UNIDENTIFIED_KEY: &str = "Unidentified";

/// Maps raw input on one capture surface to device events.
#[derive(Debug)]
pub struct InputCaptureAdapter {
    geometry: SurfaceGeometry,
    slots: SlotTracker,
}

impl InputCaptureAdapter {
    /// Creates an adapter for `surface` driving a device of `device` pixels.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if either extent is zero.
    pub fn new(
        surface: CaptureSurface,
        device: DeviceResolution,
        max_slots: usize,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            geometry: SurfaceGeometry::new(surface, device)?,
            slots: SlotTracker::new(max_slots),
        })
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    /// Replaces the capture surface, e.g. after a layout change.
    ///
    /// Live contacts keep their slots.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if the new surface has a zero extent; the
    /// previous geometry stays in effect.
    pub fn resize(&mut self, surface: CaptureSurface) -> Result<(), ConfigurationError> {
        self.geometry = SurfaceGeometry::new(surface, self.geometry.device())?;
        debug!(width = surface.width, height = surface.height, "capture surface resized");
        Ok(())
    }

    /// Number of touch contacts currently holding a slot.
    pub fn live_contacts(&self) -> usize {
        self.slots.live_count()
    }

    /// Frees every touch slot, e.g. on session teardown.
    pub fn release_all(&mut self) {
        self.slots.release_all();
    }

    /// Translates one raw event; `None` when it carries nothing to forward.
    pub fn handle(&mut self, event: &RawInputEvent) -> Option<DeviceEvent> {
        match event {
            RawInputEvent::MouseDown(p) | RawInputEvent::MouseUp(p) => Some(self.pointer(p)),
            RawInputEvent::MouseMove(p) if p.buttons != ButtonMask::NONE => Some(self.pointer(p)),
            RawInputEvent::MouseMove(_) => None,
            RawInputEvent::KeyDown(k) => Self::key(k, true),
            RawInputEvent::KeyUp(k) => Self::key(k, false),
            RawInputEvent::TouchStart(t) => self.touch_start(t),
            RawInputEvent::TouchMove(t) => self.touch_move(t),
            RawInputEvent::TouchEnd(t) | RawInputEvent::TouchCancel(t) => self.touch_end(t),
        }
    }

    // ── Pointer / keyboard ────────────────────────────────────────────────────

    fn pointer(&self, sample: &PointerSample) -> DeviceEvent {
        let (x, y) = self.geometry.scale_offset(sample.offset_x, sample.offset_y);
        DeviceEvent::Mouse(MouseEvent {
            buttons: ButtonMask(sample.buttons),
            x,
            y,
        })
    }

    fn key(sample: &KeySample, down: bool) -> Option<DeviceEvent> {
        let key_code = if sample.key.is_empty() || sample.key == UNIDENTIFIED_KEY {
            &sample.code
        } else {
            &sample.key
        };
        if key_code.is_empty() {
            warn!("dropping key event with neither key nor code");
            return None;
        }
        Some(DeviceEvent::Key(KeyEvent {
            key_code: key_code.clone(),
            down,
        }))
    }

    // ── Touch ─────────────────────────────────────────────────────────────────

    fn touch_start(&mut self, sample: &TouchSample) -> Option<DeviceEvent> {
        let mut accepted = false;
        for point in sample.changed() {
            if let Err(e) = self.slots.on_contact_start(point.identifier) {
                warn!("touch start ignored: {e}");
                continue;
            }
            accepted |= self.update_contact(point).is_some();
        }
        self.snapshot_if(accepted)
    }

    fn touch_move(&mut self, sample: &TouchSample) -> Option<DeviceEvent> {
        let mut accepted = false;
        for point in sample.changed() {
            accepted |= self.update_contact(point).is_some();
        }
        self.snapshot_if(accepted)
    }

    fn touch_end(&mut self, sample: &TouchSample) -> Option<DeviceEvent> {
        let mut accepted = false;
        for point in sample.changed() {
            match self.slots.on_contact_end(point.identifier) {
                Ok(_) => accepted = true,
                Err(e) => warn!("touch end ignored: {e}"),
            }
        }
        self.snapshot_if(accepted)
    }

    fn update_contact(&mut self, point: &TouchPoint) -> Option<TouchContact> {
        let (x, y) = self.geometry.scale_client(point.client_x, point.client_y);
        let pressure = normalize_pressure(point.force.unwrap_or(DEFAULT_FORCE));
        let radius = self.geometry.scale_contact_radius(point.radius_x, point.radius_y);
        match self
            .slots
            .on_contact_update(point.identifier, x, y, pressure, radius)
        {
            Ok(contact) => Some(contact),
            Err(e) => {
                warn!("touch update ignored: {e}");
                None
            }
        }
    }

    fn snapshot_if(&self, accepted: bool) -> Option<DeviceEvent> {
        accepted.then(|| DeviceEvent::Touch(TouchEvent::new(self.slots.snapshot())))
    }
}
