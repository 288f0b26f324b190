//! Kinema Animation System
//!
//! Spring physics, tween motions, and per-frame scheduling.
//!
//! # Features
//!
//! - **Springs**: closed-form damped harmonic motion, stable at any time step
//! - **Tweens**: duration-bound interpolation with pluggable motion curves
//! - **Scheduler**: an explicit per-frame registry that drives values into
//!   host-owned objects and prunes entries whose targets are gone
//! - **Interruptible**: springs keep their velocity when retargeted

pub mod motion;
pub mod scheduler;
pub mod spring;
pub mod tween;
pub mod value;

pub use motion::{Easing, Motion};
pub use scheduler::{FrameDelta, Scheduler, SpringBindingId, TweenId};
pub use spring::{Spring, Spring2, Spring3, SpringHandle, SpringParams};
pub use tween::TweenHandle;
pub use value::Animatable;
