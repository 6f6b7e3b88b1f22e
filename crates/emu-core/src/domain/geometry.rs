//! Capture-surface geometry.
//!
//! The capture surface is the local element that receives input; the device
//! resolution is the emulator's display.  [`SurfaceGeometry`] validates both
//! once and then maps surface coordinates onto device coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::normalize::{scale_coordinate, scale_radius};

/// Setup errors that make input mapping impossible.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigurationError {
    #[error("capture surface has zero extent ({width}x{height})")]
    ZeroSizedSurface { width: u32, height: u32 },

    #[error("device resolution has zero extent ({width}x{height})")]
    ZeroSizedDevice { width: u32, height: u32 },
}

/// Logical size and viewport offset of the capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSurface {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset of the surface inside the viewport.
    #[serde(default)]
    pub origin_x: i32,
    /// Vertical offset of the surface inside the viewport.
    #[serde(default)]
    pub origin_y: i32,
}

impl CaptureSurface {
    /// A surface anchored at the viewport origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            origin_x: 0,
            origin_y: 0,
        }
    }

    pub fn with_origin(mut self, origin_x: i32, origin_y: i32) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }
}

/// Emulator display size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceResolution {
    pub width: u32,
    pub height: u32,
}

impl DeviceResolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Validated surface → device mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceGeometry {
    surface: CaptureSurface,
    device: DeviceResolution,
}

impl SurfaceGeometry {
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if either extent is zero on any axis.
    pub fn new(surface: CaptureSurface, device: DeviceResolution) -> Result<Self, ConfigurationError> {
        if surface.width == 0 || surface.height == 0 {
            return Err(ConfigurationError::ZeroSizedSurface {
                width: surface.width,
                height: surface.height,
            });
        }
        if device.width == 0 || device.height == 0 {
            return Err(ConfigurationError::ZeroSizedDevice {
                width: device.width,
                height: device.height,
            });
        }
        Ok(Self { surface, device })
    }

    pub fn surface(&self) -> CaptureSurface {
        self.surface
    }

    pub fn device(&self) -> DeviceResolution {
        self.device
    }

    /// Maps a point already relative to the surface's top-left corner.
    pub fn scale_offset(&self, offset_x: f64, offset_y: f64) -> (i32, i32) {
        (
            scale_coordinate(offset_x, self.surface.width, self.device.width),
            scale_coordinate(offset_y, self.surface.height, self.device.height),
        )
    }

    /// Maps a viewport point by first subtracting the surface origin.
    pub fn scale_client(&self, client_x: f64, client_y: f64) -> (i32, i32) {
        self.scale_offset(
            client_x - f64::from(self.surface.origin_x),
            client_y - f64::from(self.surface.origin_y),
        )
    }

    /// Scales the larger of two contact radii using the horizontal factor.
    pub fn scale_contact_radius(&self, radius_x: f64, radius_y: f64) -> Option<i16> {
        scale_radius(radius_x.max(radius_y), self.surface.width, self.device.width)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
