//! Vector helpers for straight-line track segments.

use crate::prelude::Vec3;

/// Unit vector along `segment`, or `None` when the segment has zero or
/// non-finite length.
pub fn safe_direction(segment: &Vec3) -> Option<Vec3> {
    let norm = segment.norm();
    if !norm.is_finite() || norm == 0.0 {
        return None;
    }
    Some(segment / norm)
}

/// Opening angle between two unit vectors in radians.
///
/// The dot product is clamped to [-1, 1] before `acos`, so rounding past the
/// domain resolves to exactly 0 or pi.
pub fn space_angle(incoming: &Vec3, outgoing: &Vec3) -> f64 {
    incoming.dot(outgoing).clamp(-1.0, 1.0).acos()
}

/// Signed angle change in one transverse plane, measured against the z axis.
pub fn projected_angle(incoming_t: f64, incoming_z: f64, outgoing_t: f64, outgoing_z: f64) -> f64 {
    outgoing_t.atan2(outgoing_z) - incoming_t.atan2(incoming_z)
}
