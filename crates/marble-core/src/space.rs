//! Listener-space conventions shared by the render nodes.
//!
//! Right-handed: +X right, +Y up, −Z in front of the listener. The listener
//! sits at the origin; only its orientation changes.

use glam::{EulerRot, Quat, Vec3};

/// Listener head orientation in radians.
///
/// Positive yaw turns the head left, positive pitch looks up, positive roll
/// tilts the right ear down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListenerOrientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl ListenerOrientation {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }

    /// Head rotation from listener space to world space.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, -self.roll)
    }

    /// Express a world-space source position in the listener's head frame.
    pub fn to_head(&self, world: Vec3) -> Vec3 {
        self.rotation().inverse() * world
    }

    /// Degrees, for backends that want them.
    pub fn to_degrees(&self) -> (f32, f32, f32) {
        (
            self.yaw.to_degrees(),
            self.pitch.to_degrees(),
            self.roll.to_degrees(),
        )
    }
}

/// Azimuth in degrees for a head-frame direction: 0 = front, +90 = left,
/// −90 = right, ±180 = behind.
pub fn azimuth_degrees(head: Vec3) -> f32 {
    (-head.x).atan2(-head.z).to_degrees()
}

/// Elevation in degrees for a head-frame direction: 0 = ear level, +90 = up.
pub fn elevation_degrees(head: Vec3) -> f32 {
    head.y.atan2(head.x.hypot(head.z)).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_keeps_positions() {
        let o = ListenerOrientation::default();
        let p = Vec3::new(0.3, 0.1, -1.0);
        assert_abs_diff_eq!(o.to_head(p).x, p.x, epsilon = 1e-6);
        assert_abs_diff_eq!(o.to_head(p).z, p.z, epsilon = 1e-6);
    }

    #[test]
    fn test_turning_left_moves_front_source_right() {
        let o = ListenerOrientation::new(FRAC_PI_2, 0.0, 0.0);
        let head = o.to_head(Vec3::new(0.0, 0.0, -1.0));
        assert_abs_diff_eq!(azimuth_degrees(head), -90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_azimuth_conventions() {
        assert_abs_diff_eq!(azimuth_degrees(Vec3::new(0.0, 0.0, -1.0)), 0.0);
        assert_abs_diff_eq!(
            azimuth_degrees(Vec3::new(-1.0, 0.0, 0.0)),
            90.0,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(
            azimuth_degrees(Vec3::new(1.0, 0.0, 0.0)),
            -90.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_elevation() {
        assert_abs_diff_eq!(
            elevation_degrees(Vec3::new(0.0, 1.0, 0.0)),
            90.0,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(elevation_degrees(Vec3::new(0.0, 0.0, -2.0)), 0.0);
    }

    #[test]
    fn test_degrees_at_boundary() {
        let o = ListenerOrientation::new(FRAC_PI_2, 0.0, 0.0);
        let (yaw, pitch, roll) = o.to_degrees();
        assert_abs_diff_eq!(yaw, 90.0, epsilon = 1e-4);
        assert_eq!(pitch, 0.0);
        assert_eq!(roll, 0.0);
    }
}
