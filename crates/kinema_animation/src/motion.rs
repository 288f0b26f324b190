//! Motion curves for tweens
//!
//! A motion maps `(start, target, t)` to an output value, with `t` the
//! normalized progress supplied by the tween driver. Linear and eased motions
//! interpolate between start and target; the spring motion overshoots and
//! rings down; the shake motion offsets the start value by decaying noise.

use noise::{NoiseFn, Perlin};

use crate::value::Animatable;

/// Fixed sample-line offsets that decorrelate the noise driving each axis of
/// a shake. Arbitrary, well separated, and off the integer lattice.
const SHAKE_AXIS_OFFSETS: [f64; 3] = [0.5, 193.5, 517.5];

/// Polynomial easing applied to tween progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
}

impl Easing {
    /// Remap a progress value in `[0, 1]`.
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::InQuad => ease_in(t, 2),
            Easing::OutQuad => ease_out(t, 2),
            Easing::InOutQuad => ease_in_out(t, 2),
            Easing::InCubic => ease_in(t, 3),
            Easing::OutCubic => ease_out(t, 3),
            Easing::InOutCubic => ease_in_out(t, 3),
            Easing::InQuart => ease_in(t, 4),
            Easing::OutQuart => ease_out(t, 4),
            Easing::InOutQuart => ease_in_out(t, 4),
        }
    }
}

fn ease_in(t: f32, power: i32) -> f32 {
    t.powi(power)
}

fn ease_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

fn ease_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        2.0f32.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

/// Decay envelope shared by the spring and shake motions.
///
/// Three regimes around `steepness`: zero gives linear decay `1 - t`,
/// positive gives convex decay through a power curve (clamped at 1),
/// negative gives concave decay through an inverse power curve (clamped
/// at -1).
pub fn damping_profile(t: f32, steepness: f32) -> f32 {
    if steepness == 0.0 {
        return 1.0 - t;
    }
    if steepness > 0.0 {
        return 1.0 - t.powf(1.0 - steepness.min(1.0));
    }
    1.0 - t.powf(1.0 / (steepness.max(-1.0) + 1.0))
}

/// A tween's motion curve.
#[derive(Clone)]
pub enum Motion {
    /// Unclamped linear interpolation.
    Linear,
    /// Linear interpolation with eased progress.
    Ease(Easing),
    /// Oscillates past the target and rings down: progress is remapped to
    /// `sin(t * frequency) * damping_profile(t, steepness)` before the lerp.
    Spring { frequency: f32, steepness: f32 },
    /// Offsets the start value by decaying per-axis noise scaled by the
    /// target's per-axis magnitude. The noise source is seeded once at
    /// construction and is deterministic thereafter.
    Shake {
        frequency: f32,
        steepness: f32,
        noise: Perlin,
    },
}

impl Motion {
    pub fn linear() -> Self {
        Motion::Linear
    }

    pub fn ease(easing: Easing) -> Self {
        Motion::Ease(easing)
    }

    pub fn spring(frequency: f32, steepness: f32) -> Self {
        Motion::Spring {
            frequency,
            steepness,
        }
    }

    /// Shake with a seed drawn at construction.
    pub fn shake(frequency: f32, steepness: f32) -> Self {
        Self::shake_seeded(frequency, steepness, rand::random())
    }

    /// Shake with an explicit seed, for reproducible trajectories.
    pub fn shake_seeded(frequency: f32, steepness: f32, seed: u32) -> Self {
        Motion::Shake {
            frequency,
            steepness,
            noise: Perlin::new(seed),
        }
    }

    /// Evaluate the motion at normalized progress `t`.
    pub fn evaluate<V: Animatable>(&self, start: V, target: V, t: f32) -> V {
        match self {
            Motion::Linear => V::lerp_unclamped(start, target, t),
            Motion::Ease(easing) => V::lerp_unclamped(start, target, easing.apply(t)),
            Motion::Spring {
                frequency,
                steepness,
            } => {
                let progress = (t * frequency).sin() * damping_profile(t, *steepness);
                V::lerp_unclamped(start, target, progress)
            }
            Motion::Shake {
                frequency,
                steepness,
                noise,
            } => {
                let decay = damping_profile(t, *steepness);
                let sample = (t * frequency) as f64;
                let mut out = start;
                for axis in 0..V::AXES {
                    let n = noise.get([sample, SHAKE_AXIS_OFFSETS[axis]]) as f32;
                    out.set_axis(axis, start.axis(axis) + target.axis(axis) * n * decay);
                }
                out
            }
        }
    }
}
