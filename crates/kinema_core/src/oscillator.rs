//! Closed-form damped harmonic oscillator integration
//!
//! A spring is advanced analytically rather than by explicit sub-stepping:
//! for a given damping ratio, angular frequency, and time step we evaluate
//! the exact solution of `x'' = -2*zeta*omega*x' - omega^2*(x - target)` and
//! express one step as a linear map of the current state. This keeps the
//! integration stable for arbitrarily large time steps.
//!
//! The step is captured as four coefficients (position-from-position,
//! position-from-velocity, velocity-from-position, velocity-from-velocity)
//! that can be reused across every axis and every spring sharing the same
//! parameters within a frame.

/// Angular frequency below this is treated as no restoring force.
const FREQUENCY_EPSILON: f32 = 1e-5;

/// Damping ratio above this is treated as critically damped.
const CRITICAL_THRESHOLD: f32 = 1.0 - 1e-4;

/// One analytic integration step, as a linear map of `(position, velocity)`
/// relative to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringCoefficients {
    pos_from_pos: f32,
    pos_from_vel: f32,
    vel_from_pos: f32,
    vel_from_vel: f32,
}

impl SpringCoefficients {
    /// The do-nothing step: position and velocity pass through unchanged.
    pub const IDENTITY: SpringCoefficients = SpringCoefficients {
        pos_from_pos: 1.0,
        pos_from_vel: 0.0,
        vel_from_pos: 0.0,
        vel_from_vel: 1.0,
    };

    /// Compute the step coefficients for one `delta_time` advance.
    ///
    /// `damping` is the damping ratio (0 = undamped oscillation, 1 = critical
    /// damping); callers clamp it to `[0, 1]`, so the over-damped branch of
    /// the general solution is not modeled. `angular_frequency` controls
    /// oscillation speed; at (or near) zero there is no restoring force and
    /// the state passes through unchanged.
    ///
    /// Pure numeric function: no error states, NaN inputs propagate.
    pub fn compute(damping: f32, angular_frequency: f32, delta_time: f32) -> Self {
        if angular_frequency < FREQUENCY_EPSILON {
            return Self::IDENTITY;
        }

        let omega = angular_frequency;

        if damping > CRITICAL_THRESHOLD {
            // Critically damped: x(t) = e^(-w*t) * (j0 + (v0 + w*j0)*t)
            let exp_term = (-omega * delta_time).exp();
            let omega_dt = omega * delta_time;

            return Self {
                pos_from_pos: exp_term * (1.0 + omega_dt),
                pos_from_vel: exp_term * delta_time,
                vel_from_pos: exp_term * -omega * omega_dt,
                vel_from_vel: exp_term * (1.0 - omega_dt),
            };
        }

        // Under-damped: decaying oscillation at frequency alpha = w*sqrt(1 - zeta^2)
        let omega_zeta = omega * damping;
        let alpha = omega * (1.0 - damping * damping).sqrt();

        let exp_term = (-omega_zeta * delta_time).exp();
        let cos_term = (alpha * delta_time).cos();
        let sin_term = (alpha * delta_time).sin();
        let inv_alpha = 1.0 / alpha;

        Self {
            pos_from_pos: exp_term * (cos_term + omega_zeta * sin_term * inv_alpha),
            pos_from_vel: exp_term * sin_term * inv_alpha,
            vel_from_pos: -exp_term * sin_term * omega * omega * inv_alpha,
            vel_from_vel: exp_term * (cos_term - omega_zeta * sin_term * inv_alpha),
        }
    }

    /// Advance one scalar axis toward `target`, returning the new
    /// `(position, velocity)`.
    pub fn advance(&self, position: f32, velocity: f32, target: f32) -> (f32, f32) {
        let displacement = position - target;

        (
            displacement * self.pos_from_pos + velocity * self.pos_from_vel + target,
            displacement * self.vel_from_pos + velocity * self.vel_from_vel,
        )
    }
}
