// Tank-steer stick mixing
// Converts (power, turn) stick values into left/right motor power percentages.

/// Largest motor power magnitude (percent)
pub const MAX_POWER: f32 = 100.0;

/// Left/right motor power targets before slew limiting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorTargets {
    pub left: f32,
    pub right: f32,
}

/// Intermediate values of one mix, kept for telemetry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mix {
    pub targets: MotorTargets,
    /// Angle of the (power, turn) vector in radians
    pub angle: f32,
    /// Multiplier applied to both axes (0..=100)
    pub scale_factor: f32,
}

/// Mix forward `power` and `turn` (both in [-1, 1]) into motor targets
///
/// The scale factor is the squared cosine (power dominant) or squared sine
/// (turn dominant) of the stick vector angle, times 100. A single axis at
/// full deflection gives full speed: straight ahead for power, spin in place
/// for turn. Results are clamped to ±100 since the blended diagonal region
/// overshoots (peak ~120.7 at |turn| ≈ 0.414·|power|).
pub fn mix(power: f32, turn: f32) -> Mix {
    let angle = turn.atan2(power);

    let scale = if power.abs() > turn.abs() {
        angle.cos()
    } else {
        angle.sin()
    };
    let scale_factor = scale * scale * MAX_POWER;

    let adj_power = power * scale_factor;
    let adj_turn = turn * scale_factor;

    Mix {
        targets: MotorTargets {
            left: (adj_power + adj_turn).clamp(-MAX_POWER, MAX_POWER),
            right: (adj_power - adj_turn).clamp(-MAX_POWER, MAX_POWER),
        },
        angle,
        scale_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_zero_input() {
        let m = mix(0.0, 0.0);
        assert_eq!(m.targets.left, 0.0);
        assert_eq!(m.targets.right, 0.0);
    }

    #[test]
    fn test_full_forward() {
        let m = mix(1.0, 0.0);
        assert!(close(m.targets.left, 100.0));
        assert!(close(m.targets.right, 100.0));
    }

    #[test]
    fn test_full_reverse() {
        let m = mix(-1.0, 0.0);
        assert!(close(m.targets.left, -100.0));
        assert!(close(m.targets.right, -100.0));
    }

    #[test]
    fn test_spin_in_place() {
        let m = mix(0.0, 1.0);
        assert!(close(m.targets.left, 100.0));
        assert!(close(m.targets.right, -100.0));

        let m = mix(0.0, -1.0);
        assert!(close(m.targets.left, -100.0));
        assert!(close(m.targets.right, 100.0));
    }

    #[test]
    fn test_full_diagonal_pivots_on_one_track() {
        // Equal power and turn: sin²(45°) = 0.5, so one side stops
        let m = mix(1.0, 1.0);
        assert!(close(m.scale_factor, 50.0));
        assert!(close(m.targets.left, 100.0));
        assert!(close(m.targets.right, 0.0));
    }

    #[test]
    fn test_damped_forward() {
        let power = 1.0 / 1.3;
        let m = mix(power, 0.0);
        assert!(close(m.targets.left, 76.923));
        assert!(close(m.targets.right, 76.923));
    }

    #[test]
    fn test_overshoot_region_is_clamped() {
        let m = mix(1.0, 0.414);
        assert_eq!(m.targets.left, 100.0);
        assert!(m.targets.right > 0.0 && m.targets.right < 100.0);
    }

    #[test]
    fn test_outputs_bounded_over_input_grid() {
        let steps = 200;
        for i in 0..=steps {
            for j in 0..=steps {
                let power = -1.0 + 2.0 * i as f32 / steps as f32;
                let turn = -1.0 + 2.0 * j as f32 / steps as f32;
                let m = mix(power, turn);
                assert!(
                    m.targets.left.abs() <= MAX_POWER && m.targets.right.abs() <= MAX_POWER,
                    "mix({}, {}) = {:?} out of range",
                    power,
                    turn,
                    m.targets
                );
                assert!(m.scale_factor >= 0.0 && m.scale_factor <= MAX_POWER + 1e-3);
            }
        }
    }

    #[test]
    fn test_mirror_symmetry() {
        // Negating turn swaps the sides
        for &(p, t) in &[(0.3, 0.2), (0.9, -0.1), (-0.5, 0.7)] {
            let a = mix(p, t).targets;
            let b = mix(p, -t).targets;
            assert!(close(a.left, b.right), "({}, {})", p, t);
            assert!(close(a.right, b.left), "({}, {})", p, t);
        }
    }
}
