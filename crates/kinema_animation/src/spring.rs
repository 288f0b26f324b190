//! Damped springs over scalar and vector values
//!
//! A spring holds a current value, a velocity, and a target, and is advanced
//! analytically by the closed-form oscillator step in `kinema_core`. Springs
//! have no terminal state: they run for as long as something drives them,
//! and retargeting mid-flight keeps the accumulated velocity.

use std::cell::RefCell;
use std::rc::Rc;

use kinema_core::{SpringCoefficients, Vec2, Vec3};

use crate::scheduler::FrameDelta;
use crate::value::Animatable;

/// Displacement and velocity below this count as settled.
const SETTLE_EPSILON: f32 = 1e-3;

/// Spring tuning: angular frequency and damping ratio.
///
/// Both invariants are enforced on every write: frequency is kept
/// non-negative and damping is kept in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringParams {
    frequency: f32,
    damping: f32,
}

impl SpringParams {
    pub fn new(frequency: f32, damping: f32) -> Self {
        Self {
            frequency: frequency.max(0.0),
            damping: damping.clamp(0.0, 1.0),
        }
    }

    /// Soft, critically damped. Good for slow drifts.
    pub fn gentle() -> Self {
        Self::new(6.0, 1.0)
    }

    /// Fast with a hint of overshoot.
    pub fn snappy() -> Self {
        Self::new(18.0, 0.9)
    }

    /// Fast, critically damped. No overshoot.
    pub fn stiff() -> Self {
        Self::new(26.0, 1.0)
    }

    /// Pronounced, slowly decaying oscillation.
    pub fn wobbly() -> Self {
        Self::new(12.0, 0.35)
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.max(0.0);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::new(10.0, 0.5)
    }
}

/// A damped spring animating a value of type `V`.
#[derive(Clone, Copy, Debug)]
pub struct Spring<V: Animatable> {
    params: SpringParams,
    value: V,
    target: V,
    velocity: V,
    use_unscaled_time: bool,
}

/// Spring over a 2-vector.
pub type Spring2 = Spring<Vec2>;

/// Spring over a 3-vector.
pub type Spring3 = Spring<Vec3>;

impl<V: Animatable> Spring<V> {
    /// Spring at rest on `value`, targeting it.
    pub fn new(params: SpringParams, value: V) -> Self {
        Self {
            params,
            value,
            target: value,
            velocity: V::default(),
            use_unscaled_time: false,
        }
    }

    /// Spring starting at `value` and immediately heading for `target`.
    pub fn with_target(params: SpringParams, value: V, target: V) -> Self {
        Self {
            target,
            ..Self::new(params, value)
        }
    }

    pub fn value(&self) -> V {
        self.value
    }

    pub fn set_value(&mut self, value: V) {
        self.value = value;
    }

    pub fn target(&self) -> V {
        self.target
    }

    pub fn set_target(&mut self, target: V) {
        self.target = target;
    }

    pub fn velocity(&self) -> V {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: V) {
        self.velocity = velocity;
    }

    pub fn params(&self) -> SpringParams {
        self.params
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    pub fn use_unscaled_time(&self) -> bool {
        self.use_unscaled_time
    }

    /// When set, a scheduler drives this spring with the raw frame delta,
    /// ignoring the scheduler's time scale.
    pub fn set_use_unscaled_time(&mut self, unscaled: bool) {
        self.use_unscaled_time = unscaled;
    }

    /// Add an instantaneous impulse to the velocity. Position is untouched.
    pub fn nudge(&mut self, force: V) {
        for axis in 0..V::AXES {
            self.velocity
                .set_axis(axis, self.velocity.axis(axis) + force.axis(axis));
        }
    }

    /// Advance by `delta_time` seconds and return the new value.
    pub fn step(&mut self, delta_time: f32) -> V {
        let coeffs = SpringCoefficients::compute(
            self.params.damping,
            self.params.frequency,
            delta_time,
        );

        for axis in 0..V::AXES {
            let (position, velocity) = coeffs.advance(
                self.value.axis(axis),
                self.velocity.axis(axis),
                self.target.axis(axis),
            );
            self.value.set_axis(axis, position);
            self.velocity.set_axis(axis, velocity);
        }

        self.value
    }

    /// Retarget, then advance.
    pub fn step_toward(&mut self, target: V, delta_time: f32) -> V {
        self.target = target;
        self.step(delta_time)
    }

    /// True when every axis is within the settle epsilon of the target with
    /// negligible velocity.
    pub fn is_settled(&self) -> bool {
        for axis in 0..V::AXES {
            let displacement = self.value.axis(axis) - self.target.axis(axis);
            if displacement.abs() > SETTLE_EPSILON || self.velocity.axis(axis).abs() > SETTLE_EPSILON
            {
                return false;
            }
        }
        true
    }
}

pub(crate) struct SpringCell<V: Animatable> {
    pub(crate) spring: Spring<V>,
    pub(crate) last_step_frame: u64,
}

/// Shared, clonable handle to a spring driven by a scheduler.
///
/// The scheduler and the application both hold the handle: the scheduler
/// steps the spring once per frame and applies its value to the bound
/// object, while the application retargets or nudges it at any time. One
/// spring may back several bindings; the frame stamp inside the cell keeps
/// it from being stepped more than once per frame.
#[derive(Clone)]
pub struct SpringHandle<V: Animatable> {
    pub(crate) cell: Rc<RefCell<SpringCell<V>>>,
}

impl<V: Animatable> SpringHandle<V> {
    pub fn new(spring: Spring<V>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(SpringCell {
                spring,
                last_step_frame: 0,
            })),
        }
    }

    pub fn value(&self) -> V {
        self.cell.borrow().spring.value()
    }

    pub fn set_value(&self, value: V) {
        self.cell.borrow_mut().spring.set_value(value);
    }

    pub fn target(&self) -> V {
        self.cell.borrow().spring.target()
    }

    pub fn set_target(&self, target: V) {
        self.cell.borrow_mut().spring.set_target(target);
    }

    pub fn velocity(&self) -> V {
        self.cell.borrow().spring.velocity()
    }

    pub fn set_velocity(&self, velocity: V) {
        self.cell.borrow_mut().spring.set_velocity(velocity);
    }

    pub fn nudge(&self, force: V) {
        self.cell.borrow_mut().spring.nudge(force);
    }

    pub fn params(&self) -> SpringParams {
        self.cell.borrow().spring.params()
    }

    pub fn set_params(&self, params: SpringParams) {
        self.cell.borrow_mut().spring.set_params(params);
    }

    pub fn is_settled(&self) -> bool {
        self.cell.borrow().spring.is_settled()
    }

    /// Step the spring for `frame`, or return the current value if some
    /// other binding already stepped it this frame.
    pub(crate) fn step_for_frame(&self, frame: u64, delta: FrameDelta) -> V {
        let mut cell = self.cell.borrow_mut();
        if cell.last_step_frame < frame {
            cell.last_step_frame = frame;
            let dt = if cell.spring.use_unscaled_time() {
                delta.unscaled
            } else {
                delta.scaled
            };
            cell.spring.step(dt)
        } else {
            cell.spring.value()
        }
    }
}

impl<V: Animatable> From<Spring<V>> for SpringHandle<V> {
    fn from(spring: Spring<V>) -> Self {
        Self::new(spring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_clamped_on_construction_and_write() {
        let mut params = SpringParams::new(-5.0, 3.0);
        assert_eq!(params.frequency(), 0.0);
        assert_eq!(params.damping(), 1.0);

        params.set_frequency(-1.0);
        params.set_damping(-0.5);
        assert_eq!(params.frequency(), 0.0);
        assert_eq!(params.damping(), 0.0);
    }

    #[test]
    fn test_zero_delta_time_changes_nothing() {
        let mut spring = Spring::with_target(SpringParams::new(10.0, 0.5), 1.0f32, 9.0);
        spring.set_velocity(4.0);

        spring.step(0.0);

        assert_eq!(spring.value(), 1.0);
        assert_eq!(spring.velocity(), 4.0);
    }

    #[test]
    fn test_critical_damping_converges_without_overshoot() {
        let mut spring = Spring::with_target(SpringParams::new(10.0, 1.0), 0.0f32, 10.0);
        let mut prev = spring.value();

        for _ in 0..60 {
            let value = spring.step(1.0 / 60.0);
            assert!(value >= prev);
            assert!(value <= 10.0 + 1e-4);
            prev = value;
        }

        assert!((spring.value() - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_nudge_touches_velocity_only() {
        let mut spring = Spring::new(SpringParams::default(), 2.0f32);
        spring.nudge(5.0);

        assert_eq!(spring.value(), 2.0);
        assert_eq!(spring.velocity(), 5.0);
    }

    #[test]
    fn test_zero_frequency_never_approaches_target() {
        let mut spring = Spring::with_target(SpringParams::new(0.0, 1.0), 0.0f32, 10.0);

        for _ in 0..120 {
            spring.step(1.0 / 60.0);
        }

        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn test_axes_are_independent() {
        // An axis already on target stays put while the others move.
        let mut spring = Spring3::with_target(
            SpringParams::new(12.0, 0.8),
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(10.0, 5.0, -10.0),
        );

        for _ in 0..30 {
            spring.step(1.0 / 60.0);
        }

        assert_eq!(spring.value().y, 5.0);
        assert!(spring.value().x > 0.0);
        assert!(spring.value().z < 0.0);
    }

    #[test]
    fn test_retarget_preserves_velocity() {
        let mut spring = Spring::with_target(SpringParams::stiff(), 0.0f32, 100.0);

        for _ in 0..10 {
            spring.step(1.0 / 60.0);
        }
        let mid_velocity = spring.velocity();
        assert!(mid_velocity > 0.0);

        spring.set_target(0.0);
        assert_eq!(spring.velocity(), mid_velocity);
    }

    #[test]
    fn test_settles_on_target() {
        let mut spring = Spring::with_target(SpringParams::stiff(), 0.0f32, 1.5);
        assert!(!spring.is_settled());

        for _ in 0..120 {
            spring.step(1.0 / 60.0);
        }

        assert!(spring.is_settled());
        assert!((spring.value() - 1.5).abs() < 0.01);
    }

    #[test]
    fn test_handle_shares_state() {
        let handle = SpringHandle::new(Spring::new(SpringParams::default(), 0.0f32));
        let alias = handle.clone();

        handle.set_target(3.0);
        assert_eq!(alias.target(), 3.0);

        alias.nudge(1.0);
        assert_eq!(handle.velocity(), 1.0);
    }
}
