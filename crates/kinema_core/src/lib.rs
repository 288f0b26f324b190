//! Kinema Core
//!
//! Foundational primitives for the Kinema animation system:
//!
//! - **Geometry**: plain `Vec2`/`Vec3` value types
//! - **Oscillator**: closed-form damped harmonic oscillator integration,
//!   stable at arbitrary time steps

pub mod geometry;
pub mod oscillator;

pub use geometry::{Vec2, Vec3};
pub use oscillator::SpringCoefficients;
