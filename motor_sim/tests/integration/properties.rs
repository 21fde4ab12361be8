//! Property tests: ramp convergence and encoder wraparound.

use motor_common::motor::{EncoderConfig, RegisterWidth, UnitSystem};
use motor_sim::motor::{Encoder, MotionProfile};
use proptest::prelude::*;

fn width_strategy() -> impl Strategy<Value = RegisterWidth> {
    prop::sample::select(RegisterWidth::ALL.to_vec())
}

fn make_encoder(width: RegisterWidth, pulses_per_unit: f64) -> Encoder {
    Encoder::new(&EncoderConfig {
        enabled: false,
        width,
        pulses_per_unit,
        unit_system: UnitSystem::Metric,
    })
}

/// Distance between two readings modulo the register span.
fn wrapped_gap(a: f64, b: f64, span: f64) -> f64 {
    let gap = (a - b).rem_euclid(span);
    gap.min(span - gap)
}

proptest! {
    #[test]
    fn profile_converges_without_overshoot(
        start in -5.0f64..5.0,
        target in -5.0f64..5.0,
        ramp_up in 0.01f64..2.0,
        ramp_down in 0.01f64..2.0,
        dt in 0.001f64..0.1,
    ) {
        let mut profile = MotionProfile::new();
        profile.set_target(start, 0.0, 0.0).unwrap();
        profile.step(dt);
        prop_assert_eq!(profile.current(), start);

        profile.set_target(target, ramp_up, ramp_down).unwrap();
        let steps = (ramp_up.max(ramp_down) / dt).ceil() as usize + 2;
        let mut previous = profile.current();
        for _ in 0..steps {
            let current = profile.step(dt);
            let before = target - previous;
            let after = target - current;
            prop_assert!(after == 0.0 || after.signum() == before.signum());
            prop_assert!(after.abs() <= before.abs());
            previous = current;
        }
        prop_assert!((profile.current() - target).abs() < 1e-9);
    }

    #[test]
    fn encoder_split_matches_single_addition(
        width in width_strategy(),
        pulses_per_unit in 1.0f64..1000.0,
        total in -50.0f64..50.0,
        pieces in 1usize..50,
    ) {
        let mut single = make_encoder(width, pulses_per_unit);
        let mut split = make_encoder(width, pulses_per_unit);

        single.add_distance(total);
        for _ in 0..pieces {
            split.add_distance(total / pieces as f64);
        }

        // Each addition rounds once at the magnitude of the larger of the
        // register span and the total pulse count.
        let span = width.span() as f64;
        let scale = span.max(total.abs() * pulses_per_unit);
        let tolerance = 4.0 * scale * f64::EPSILON * (pieces as f64 + 1.0);
        prop_assert!(wrapped_gap(single.value(), split.value(), span) <= tolerance);
        prop_assert!(single.pulses() >= width.min() && single.pulses() <= width.max());
        prop_assert!(split.pulses() >= width.min() && split.pulses() <= width.max());
    }

    #[test]
    fn encoder_stays_in_register_range(
        width in width_strategy(),
        deltas in prop::collection::vec(-10.0f64..10.0, 1..100),
    ) {
        let mut encoder = make_encoder(width, 100.0);
        for delta in deltas {
            encoder.add_distance(delta);
            let pulses = encoder.pulses();
            prop_assert!(pulses >= width.min() && pulses <= width.max());
        }
    }
}
