//! Numeric normalization applied before a value reaches the wire.
//!
//! All rounding is round-half-up.  A normalized value of zero is reported as
//! `None` for optional fields, since the codec omits zero-valued fields.

use crate::protocol::messages::PRESSURE_MAX;

/// Converts a touch force in `[0.0, 1.0]` into the device pressure range.
///
/// Out-of-range input is clamped and `NaN` is treated as `0.0`.  Returns
/// `None` when the result is zero.
///
/// # Examples
///
/// ```rust
/// use emu_core::protocol::normalize_pressure;
///
/// assert_eq!(normalize_pressure(1.0), Some(0x7fff));
/// assert_eq!(normalize_pressure(0.5), Some(16384));
/// assert_eq!(normalize_pressure(0.0), None);
/// ```
pub fn normalize_pressure(force: f64) -> Option<i16> {
    let force = if force.is_nan() { 0.0 } else { force.clamp(0.0, 1.0) };
    let scaled = round_half_up(force * f64::from(PRESSURE_MAX)) as i16;
    (scaled != 0).then_some(scaled)
}

/// Maps a surface-relative coordinate onto one device axis.
///
/// Computes `round(value / surface_extent * device_extent)` clamped to
/// `[0, device_extent - 1]`.  Extents must be non-zero; a zero extent yields
/// `0` rather than dividing by zero.
pub fn scale_coordinate(value: f64, surface_extent: u32, device_extent: u32) -> i32 {
    if surface_extent == 0 || device_extent == 0 || value.is_nan() {
        return 0;
    }
    let scaled = round_half_up(value / f64::from(surface_extent) * f64::from(device_extent));
    let max = f64::from(device_extent - 1);
    scaled.clamp(0.0, max) as i32
}

/// Scales a contact radius from surface units to device units.
///
/// Returns `None` for a zero (or negative, or `NaN`) result.
pub fn scale_radius(radius: f64, surface_extent: u32, device_extent: u32) -> Option<i16> {
    if surface_extent == 0 || radius.is_nan() || radius <= 0.0 {
        return None;
    }
    let scaled = round_half_up(radius * f64::from(device_extent) / f64::from(surface_extent));
    let scaled = scaled.min(f64::from(i16::MAX)) as i16;
    (scaled != 0).then_some(scaled)
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_full_force_is_max() {
        assert_eq!(normalize_pressure(1.0), Some(32767));
    }

    #[test]
    fn test_pressure_half_force_rounds_up() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(normalize_pressure(0.5), Some(16384));
    }

    #[test]
    fn test_pressure_zero_is_absent() {
        assert_eq!(normalize_pressure(0.0), None);
    }

    #[test]
    fn test_pressure_out_of_range_is_clamped() {
        assert_eq!(normalize_pressure(3.2), Some(32767));
        assert_eq!(normalize_pressure(-0.4), None);
    }

    #[test]
    fn test_pressure_nan_is_treated_as_zero() {
        assert_eq!(normalize_pressure(f64::NAN), None);
    }

    #[test]
    fn test_pressure_tiny_force_rounds_to_absent() {
        // 0.00001 * 32767 = 0.33
        assert_eq!(normalize_pressure(0.000_01), None);
    }

    #[test]
    fn test_scale_coordinate_maps_midpoint() {
        // 100 of 200 surface px onto a 1080 px axis
        assert_eq!(scale_coordinate(100.0, 200, 1080), 540);
    }

    #[test]
    fn test_scale_coordinate_clamps_to_last_device_pixel() {
        assert_eq!(scale_coordinate(200.0, 200, 1080), 1079);
        assert_eq!(scale_coordinate(5000.0, 200, 1080), 1079);
    }

    #[test]
    fn test_scale_coordinate_clamps_negative_to_zero() {
        assert_eq!(scale_coordinate(-12.0, 200, 1080), 0);
    }

    #[test]
    fn test_scale_coordinate_rounds_half_up() {
        // 1 / 4 * 10 = 2.5
        assert_eq!(scale_coordinate(1.0, 4, 10), 3);
    }

    #[test]
    fn test_scale_radius_zero_is_absent() {
        assert_eq!(scale_radius(0.0, 200, 1080), None);
    }

    #[test]
    fn test_scale_radius_scales_by_axis_ratio() {
        // 4 * 1080 / 200 = 21.6
        assert_eq!(scale_radius(4.0, 200, 1080), Some(22));
    }
}
