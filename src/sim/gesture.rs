//! Swipe gesture to throw impulse
//!
//! Screen positions are in pixels with +Y pointing up the screen, so a swipe
//! toward the top of the screen throws along the camera's forward axis.

use glam::{Vec2, Vec3};

use crate::consts::GESTURE_PIXEL_SCALE;
use crate::platform::CameraPose;
use crate::settings::ThrowSettings;

/// A completed drag, consumed immediately to produce an impulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub start: Vec2,
    pub end: Vec2,
}

impl GestureSample {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Drag vector in pixels
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Drag length in pixels
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.direction().length()
    }

    /// Unit world-space throw direction.
    ///
    /// Swipe Y drives camera forward, swipe X drives camera right, and a fixed
    /// lift along camera up lofts the shot.
    pub fn throw_direction(&self, camera: &CameraPose, loft_bias: f32) -> Vec3 {
        let d = self.direction().normalize_or_zero();
        (camera.forward * d.y + camera.right * d.x + camera.up * loft_bias).normalize_or_zero()
    }

    /// Impulse to apply for this gesture
    pub fn impulse(&self, camera: &CameraPose, tuning: &ThrowSettings) -> Vec3 {
        let strength = self.magnitude() / GESTURE_PIXEL_SCALE * tuning.force_multiplier;
        self.throw_direction(camera, tuning.loft_bias) * strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_upward_swipe_magnitude() {
        let gesture = GestureSample::new(Vec2::new(100.0, 100.0), Vec2::new(100.0, 300.0));
        let tuning = ThrowSettings {
            force_multiplier: 0.1,
            ..Default::default()
        };

        assert_eq!(gesture.magnitude(), 200.0);
        let impulse = gesture.impulse(&CameraPose::default(), &tuning);
        assert!((impulse.length() - 0.2).abs() < 1e-6);

        // Forward (-Z) and lofted (+Y), no sideways drift
        assert!(impulse.z < 0.0);
        assert!(impulse.y > 0.0);
        assert!(impulse.x.abs() < 1e-6);
    }

    #[test]
    fn test_sideways_swipe_goes_right() {
        let gesture = GestureSample::new(Vec2::ZERO, Vec2::new(50.0, 0.0));
        let dir = gesture.throw_direction(&CameraPose::default(), 0.7);
        assert!(dir.x > 0.0);
        assert!(dir.z.abs() < 1e-6);
    }

    #[test]
    fn test_zero_gesture_is_inert() {
        let gesture = GestureSample::new(Vec2::new(40.0, 40.0), Vec2::new(40.0, 40.0));
        let impulse = gesture.impulse(&CameraPose::default(), &ThrowSettings::default());
        assert_eq!(impulse, Vec3::ZERO);
    }

    fn arb_pose() -> impl Strategy<Value = CameraPose> {
        (-1.0f32..1.0, -1.0f32..1.0, 0.1f32..1.0).prop_map(|(x, y, z)| {
            CameraPose::new(Vec3::ZERO, Vec3::new(x, y * 0.5, -z), Vec3::Y)
        })
    }

    proptest! {
        #[test]
        fn prop_throw_direction_is_unit(
            sx in -2000.0f32..2000.0, sy in -2000.0f32..2000.0,
            ex in -2000.0f32..2000.0, ey in -2000.0f32..2000.0,
            pose in arb_pose(),
        ) {
            let gesture = GestureSample::new(Vec2::new(sx, sy), Vec2::new(ex, ey));
            let dir = gesture.throw_direction(&pose, 0.7);
            prop_assert!((dir.length() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn prop_zero_magnitude_gives_zero_impulse(x in -2000.0f32..2000.0, y in -2000.0f32..2000.0, pose in arb_pose()) {
            let p = Vec2::new(x, y);
            let impulse = GestureSample::new(p, p).impulse(&pose, &ThrowSettings::default());
            prop_assert_eq!(impulse.length(), 0.0);
        }

        #[test]
        fn prop_impulse_scales_with_length(
            dx in -1000.0f32..1000.0, dy in -1000.0f32..1000.0, mult in 0.01f32..5.0,
        ) {
            let gesture = GestureSample::new(Vec2::ZERO, Vec2::new(dx, dy));
            let tuning = ThrowSettings { force_multiplier: mult, ..Default::default() };
            let expected = gesture.magnitude() / GESTURE_PIXEL_SCALE * mult;
            let impulse = gesture.impulse(&CameraPose::default(), &tuning);
            prop_assert!((impulse.length() - expected).abs() <= expected * 1e-4 + 1e-6);
        }
    }
}
