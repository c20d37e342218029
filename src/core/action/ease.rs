//=========================================================================
// Easing
//=========================================================================
//
// Maps linear progress (0..=1) onto eased progress. Endpoints are
// preserved: every curve maps 0 → 0 and 1 → 1 (back curves overshoot in
// between).
//
//=========================================================================

use std::f64::consts::PI;

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub enum Ease {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    BackIn,
    BackOut,
    BackInOut,
    Custom(fn(f64) -> f64),
}

impl Ease {
    /// Eased value of `t`, with `t` clamped to 0..=1.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,

            Ease::QuadIn => t * t,
            Ease::QuadOut => 1.0 - (1.0 - t).powi(2),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Ease::CubicIn => t * t * t,
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Ease::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Ease::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Ease::ExpoInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            Ease::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Ease::BackOut => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Ease::BackInOut => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }

            Ease::Custom(f) => f(t),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BUILT_IN: [Ease; 16] = [
        Ease::Linear,
        Ease::QuadIn,
        Ease::QuadOut,
        Ease::QuadInOut,
        Ease::CubicIn,
        Ease::CubicOut,
        Ease::CubicInOut,
        Ease::SineIn,
        Ease::SineOut,
        Ease::SineInOut,
        Ease::ExpoIn,
        Ease::ExpoOut,
        Ease::ExpoInOut,
        Ease::BackIn,
        Ease::BackOut,
        Ease::BackInOut,
    ];

    #[test]
    fn endpoints_are_preserved() {
        for ease in BUILT_IN {
            assert!(ease.apply(0.0).abs() < 1e-9, "{:?} at 0", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{:?} at 1", ease);
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Ease::Linear.apply(2.0), 1.0);
        assert_eq!(Ease::QuadIn.apply(-1.0), 0.0);
    }

    #[test]
    fn in_out_curves_are_symmetric_at_half() {
        for ease in [Ease::QuadInOut, Ease::CubicInOut, Ease::SineInOut, Ease::ExpoInOut] {
            assert!((ease.apply(0.5) - 0.5).abs() < 1e-9, "{:?}", ease);
        }
    }

    #[test]
    fn back_overshoots() {
        assert!(Ease::BackIn.apply(0.2) < 0.0);
        assert!(Ease::BackOut.apply(0.8) > 1.0);
    }

    #[test]
    fn custom_function_is_used() {
        fn step(t: f64) -> f64 {
            if t < 1.0 { 0.0 } else { 1.0 }
        }
        assert_eq!(Ease::Custom(step).apply(0.9), 0.0);
    }
}
