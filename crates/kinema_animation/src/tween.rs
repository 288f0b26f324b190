//! Tween bookkeeping and the handle surface
//!
//! A tween interpolates a captured start value to a target over a fixed
//! duration. The scheduler owns the typed driver (motion, endpoints, target
//! object, setter); the application keeps a `TweenHandle` onto the shared
//! bookkeeping state to query progress and to pause, resume, or stop.

use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct TweenState {
    pub(crate) elapsed: f32,
    pub(crate) duration: f32,
    pub(crate) paused: bool,
    pub(crate) running: bool,
    pub(crate) use_unscaled_time: bool,
}

/// Shared, clonable handle to a scheduled tween.
#[derive(Clone)]
pub struct TweenHandle {
    pub(crate) state: Rc<RefCell<TweenState>>,
}

impl TweenHandle {
    pub(crate) fn new(duration: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(TweenState {
                elapsed: 0.0,
                duration,
                paused: false,
                running: true,
                use_unscaled_time: false,
            })),
        }
    }

    /// True once elapsed time has reached the duration.
    pub fn is_complete(&self) -> bool {
        let state = self.state.borrow();
        state.elapsed >= state.duration
    }

    /// Progress in `[0, 1]`. Non-decreasing while running and unpaused,
    /// exactly `1.0` once complete.
    pub fn proportion_complete(&self) -> f32 {
        let state = self.state.borrow();
        (state.elapsed / state.duration).clamp(0.0, 1.0)
    }

    /// Elapsed running time, capped at the duration.
    pub fn elapsed(&self) -> f32 {
        let state = self.state.borrow();
        state.elapsed.min(state.duration)
    }

    pub fn duration(&self) -> f32 {
        self.state.borrow().duration
    }

    /// True while the tween is in the scheduler's running set.
    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn pause(&self) {
        self.set_paused(true);
    }

    pub fn resume(&self) {
        self.set_paused(false);
    }

    /// Gate updates. Elapsed time does not advance while paused.
    pub fn set_paused(&self, paused: bool) {
        self.state.borrow_mut().paused = paused;
    }

    /// Leave the running set. The target keeps whatever value the last
    /// completed tick wrote; no final snapshot is taken.
    pub fn stop(&self) {
        self.state.borrow_mut().running = false;
    }

    /// When set, the scheduler advances this tween with the raw frame delta,
    /// ignoring the scheduler's time scale.
    pub fn set_use_unscaled_time(&self, unscaled: bool) {
        self.state.borrow_mut().use_unscaled_time = unscaled;
    }
}
