//! Per-frame motion: float oscillation and signal channels

use glam::{DQuat, DVec3, EulerRot};

use lightform_math::{fnv1a, map_linear, PanelTransform};
use lightform_scene::{Animation, SignalProperty, SignalSample};

/// Range of the per-light phase offset, in seconds
const PHASE_RANGE: u64 = 10_000;

/// Deterministic time offset so lights sharing a speed do not move in lockstep
pub fn float_phase(light_id: &str) -> f64 {
    (fnv1a(light_id) % PHASE_RANGE) as f64
}

/// Outer transform of the float oscillation at `time` seconds
///
/// With `s = (time + phase) / 4 · speed` the rotation is
/// `(cos s / 8, sin s / 8, sin s / 20) · rotationIntensity` and the height is
/// `sin s / 10` remapped from `[-0.1, 0.1]` into the floating range, times
/// `floatIntensity`.
pub fn float_transform(light_id: &str, animation: &Animation, time: f64) -> PanelTransform {
    if !animation.enabled {
        return PanelTransform::IDENTITY;
    }
    let t = time + float_phase(light_id);
    let s = t / 4.0 * animation.speed;
    let (sin, cos) = s.sin_cos();

    let rot = DVec3::new(cos / 8.0, sin / 8.0, sin / 20.0) * animation.rotation_intensity;
    let (low, high) = animation.floating_range;
    let y = map_linear(sin / 10.0, -0.1, 0.1, low, high) * animation.float_intensity;

    let transform = PanelTransform::IDENTITY
        .with_position(DVec3::new(0.0, y, 0.0))
        .with_rotation(DQuat::from_euler(EulerRot::XYZ, rot.x, rot.y, rot.z));
    if transform.position.is_finite() && transform.rotation.is_finite() {
        transform
    } else {
        PanelTransform::IDENTITY
    }
}

/// Write evaluated signal channels into a panel transform
///
/// Additive samples offset the current value; the rest replace it.
/// Rotation channels address the XYZ Euler angles.
pub fn apply_signals(transform: &mut PanelTransform, samples: &[SignalSample]) {
    for sample in samples {
        if !sample.value.is_finite() {
            continue;
        }
        let axis = sample.axis.index();
        let write = |current: f64| if sample.additive { current + sample.value } else { sample.value };

        match sample.property {
            SignalProperty::Position => {
                transform.position[axis] = write(transform.position[axis]);
            }
            SignalProperty::Scale => {
                transform.scale[axis] = write(transform.scale[axis]).max(0.0);
            }
            SignalProperty::Rotation => {
                let mut euler = transform.euler();
                euler[axis] = write(euler[axis]);
                transform.set_euler(euler);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightform_scene::Axis;

    fn enabled() -> Animation {
        Animation { enabled: true, ..Animation::default() }
    }

    #[test]
    fn test_disabled_is_identity() {
        assert_eq!(float_transform("a", &Animation::default(), 12.0), PanelTransform::IDENTITY);
    }

    #[test]
    fn test_float_bounded_by_range() {
        let mut anim = enabled();
        anim.floating_range = (-0.5, 0.25);
        for i in 0..200 {
            let t = float_transform("light-1", &anim, i as f64 * 0.37);
            assert!(t.position.y >= -0.5 - 1e-9 && t.position.y <= 0.25 + 1e-9);
            let e = t.euler();
            assert!(e.x.abs() <= 0.125 + 1e-9);
        }
    }

    #[test]
    fn test_phase_is_deterministic_per_id() {
        assert_eq!(float_phase("light-1"), float_phase("light-1"));
        let a = float_transform("light-1", &enabled(), 1.0);
        let b = float_transform("light-1", &enabled(), 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_apply_replace_and_additive() {
        let mut t = PanelTransform::IDENTITY.with_position(DVec3::new(1.0, 2.0, 3.0));
        apply_signals(
            &mut t,
            &[
                SignalSample { property: SignalProperty::Position, axis: Axis::X, value: 5.0, additive: false },
                SignalSample { property: SignalProperty::Position, axis: Axis::Y, value: 0.5, additive: true },
                SignalSample { property: SignalProperty::Scale, axis: Axis::Z, value: -2.0, additive: false },
            ],
        );
        assert_eq!(t.position, DVec3::new(5.0, 2.5, 3.0));
        assert_eq!(t.scale.z, 0.0);
    }

    #[test]
    fn test_apply_rotation_channel() {
        let mut t = PanelTransform::IDENTITY;
        apply_signals(
            &mut t,
            &[SignalSample { property: SignalProperty::Rotation, axis: Axis::Z, value: 0.5, additive: false }],
        );
        assert!((t.euler().z - 0.5).abs() < 1e-9);
    }
}
