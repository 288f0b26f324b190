//! Per-frame animation scheduler
//!
//! An explicit registry that owns every live spring binding and running
//! tween, advanced exactly once per frame by the host's `tick`. Nothing here
//! is global: the embedding application owns the `Scheduler` and passes it
//! where it is needed.
//!
//! Entries hold weak back-references to the host objects they write into.
//! An entry whose target has been dropped is silently pruned on the next
//! pass; an entry whose target is inactive is skipped that tick but kept.
//! The running sets are compacted in two phases (advance all, then remove
//! the finished keys) so removal never skips or double-processes a
//! neighbor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::trace;

use crate::motion::Motion;
use crate::spring::SpringHandle;
use crate::tween::TweenHandle;
use crate::value::Animatable;

new_key_type! {
    /// Key of a spring binding in the scheduler.
    pub struct SpringBindingId;
    /// Key of a running tween in the scheduler.
    pub struct TweenId;
}

/// The two clocks a tick advances: the host delta with the scheduler's time
/// scale applied, and the raw delta.
#[derive(Clone, Copy, Debug)]
pub struct FrameDelta {
    pub scaled: f32,
    pub unscaled: f32,
}

/// What an entry wants after one advance.
enum Advance {
    /// Keep the entry in the running set.
    Retained,
    /// Remove the entry: target gone, stopped, or complete.
    Finished,
}

trait SpringDrive {
    fn advance(&mut self, frame: u64, delta: FrameDelta) -> Advance;
    fn is_active(&self) -> bool;
}

struct SpringBinding<T, V: Animatable> {
    spring: SpringHandle<V>,
    target: Weak<RefCell<T>>,
    active: Option<Box<dyn Fn(&T) -> bool>>,
    apply: Box<dyn FnMut(&mut T, V)>,
}

impl<T, V: Animatable> SpringDrive for SpringBinding<T, V> {
    fn advance(&mut self, frame: u64, delta: FrameDelta) -> Advance {
        let Some(object) = self.target.upgrade() else {
            return Advance::Finished;
        };

        if let Some(active) = &self.active {
            if !active(&object.borrow()) {
                return Advance::Retained;
            }
        }

        // A spring shared by several bindings steps on the first one only.
        let value = self.spring.step_for_frame(frame, delta);
        (self.apply)(&mut object.borrow_mut(), value);

        Advance::Retained
    }

    fn is_active(&self) -> bool {
        self.target.strong_count() > 0 && !self.spring.is_settled()
    }
}

trait TweenDrive {
    fn advance(&mut self, delta: FrameDelta) -> Advance;
    fn is_active(&self) -> bool;
}

struct TweenDriver<T, V: Animatable> {
    handle: TweenHandle,
    motion: Motion,
    start: V,
    end: V,
    target: Weak<RefCell<T>>,
    active: Option<Box<dyn Fn(&T) -> bool>>,
    set: Box<dyn FnMut(&mut T, V)>,
}

impl<T, V: Animatable> TweenDrive for TweenDriver<T, V> {
    fn advance(&mut self, delta: FrameDelta) -> Advance {
        let Some(object) = self.target.upgrade() else {
            self.handle.state.borrow_mut().running = false;
            return Advance::Finished;
        };

        {
            let state = self.handle.state.borrow();
            if !state.running {
                return Advance::Finished;
            }
            if state.paused {
                return Advance::Retained;
            }
        }

        if let Some(active) = &self.active {
            if !active(&object.borrow()) {
                return Advance::Retained;
            }
        }

        let t = {
            let mut state = self.handle.state.borrow_mut();
            state.elapsed += if state.use_unscaled_time {
                delta.unscaled
            } else {
                delta.scaled
            };
            (state.elapsed / state.duration).clamp(0.0, 1.0)
        };

        let value = self.motion.evaluate(self.start, self.end, t);
        (self.set)(&mut object.borrow_mut(), value);

        let mut state = self.handle.state.borrow_mut();
        if state.elapsed >= state.duration {
            // The write above was the final update, at t = 1.
            state.running = false;
            Advance::Finished
        } else {
            Advance::Retained
        }
    }

    fn is_active(&self) -> bool {
        self.target.strong_count() > 0 && self.handle.is_running()
    }
}

/// Owns and advances every live spring binding and running tween.
pub struct Scheduler {
    frame: u64,
    time_scale: f32,
    springs: SlotMap<SpringBindingId, Box<dyn SpringDrive>>,
    spring_order: Vec<SpringBindingId>,
    tweens: SlotMap<TweenId, Box<dyn TweenDrive>>,
    tween_order: Vec<TweenId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            frame: 0,
            time_scale: 1.0,
            springs: SlotMap::with_key(),
            spring_order: Vec::new(),
            tweens: SlotMap::with_key(),
            tween_order: Vec::new(),
        }
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Scale applied to the host delta for entries on scaled time.
    /// Zero freezes them; unscaled-time entries keep moving.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Bind a spring to `target`: each frame the spring is stepped and its
    /// value pushed through `apply`. The binding lives until the target is
    /// dropped or [`Scheduler::unbind`] is called.
    pub fn drive<T, V, F>(
        &mut self,
        target: &Rc<RefCell<T>>,
        spring: &SpringHandle<V>,
        apply: F,
    ) -> SpringBindingId
    where
        T: 'static,
        V: Animatable,
        F: FnMut(&mut T, V) + 'static,
    {
        self.insert_binding(target, spring, None, Box::new(apply))
    }

    /// Like [`Scheduler::drive`], but skipped (not dropped) on ticks where
    /// `active` returns false for the target.
    pub fn drive_when<T, V, A, F>(
        &mut self,
        target: &Rc<RefCell<T>>,
        spring: &SpringHandle<V>,
        active: A,
        apply: F,
    ) -> SpringBindingId
    where
        T: 'static,
        V: Animatable,
        A: Fn(&T) -> bool + 'static,
        F: FnMut(&mut T, V) + 'static,
    {
        self.insert_binding(target, spring, Some(Box::new(active)), Box::new(apply))
    }

    fn insert_binding<T, V>(
        &mut self,
        target: &Rc<RefCell<T>>,
        spring: &SpringHandle<V>,
        active: Option<Box<dyn Fn(&T) -> bool>>,
        apply: Box<dyn FnMut(&mut T, V)>,
    ) -> SpringBindingId
    where
        T: 'static,
        V: Animatable,
    {
        let id = self.springs.insert(Box::new(SpringBinding {
            spring: spring.clone(),
            target: Rc::downgrade(target),
            active,
            apply,
        }));
        self.spring_order.push(id);
        trace!(?id, "spring binding registered");
        id
    }

    /// Remove a spring binding. Returns false if it was already gone.
    pub fn unbind(&mut self, id: SpringBindingId) -> bool {
        if self.springs.remove(id).is_some() {
            self.spring_order.retain(|&other| other != id);
            trace!(?id, "spring binding removed");
            true
        } else {
            false
        }
    }

    /// Start a tween: capture the current value through `get`, then
    /// interpolate it to `to` over `duration` seconds, writing each sample
    /// through `set`. The tween enters the running set immediately.
    pub fn tween<T, V, G, F>(
        &mut self,
        target: &Rc<RefCell<T>>,
        to: V,
        duration: f32,
        motion: Motion,
        get: G,
        set: F,
    ) -> TweenHandle
    where
        T: 'static,
        V: Animatable,
        G: FnOnce(&T) -> V,
        F: FnMut(&mut T, V) + 'static,
    {
        self.insert_tween(target, to, duration, motion, None, get, Box::new(set))
    }

    /// Like [`Scheduler::tween`], but skipped (elapsed time frozen) on ticks
    /// where `active` returns false for the target.
    #[allow(clippy::too_many_arguments)]
    pub fn tween_when<T, V, A, G, F>(
        &mut self,
        target: &Rc<RefCell<T>>,
        to: V,
        duration: f32,
        motion: Motion,
        active: A,
        get: G,
        set: F,
    ) -> TweenHandle
    where
        T: 'static,
        V: Animatable,
        A: Fn(&T) -> bool + 'static,
        G: FnOnce(&T) -> V,
        F: FnMut(&mut T, V) + 'static,
    {
        self.insert_tween(
            target,
            to,
            duration,
            motion,
            Some(Box::new(active)),
            get,
            Box::new(set),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_tween<T, V, G>(
        &mut self,
        target: &Rc<RefCell<T>>,
        to: V,
        duration: f32,
        motion: Motion,
        active: Option<Box<dyn Fn(&T) -> bool>>,
        get: G,
        set: Box<dyn FnMut(&mut T, V)>,
    ) -> TweenHandle
    where
        T: 'static,
        V: Animatable,
        G: FnOnce(&T) -> V,
    {
        let start = get(&target.borrow());
        let handle = TweenHandle::new(duration);

        let id = self.tweens.insert(Box::new(TweenDriver {
            handle: handle.clone(),
            motion,
            start,
            end: to,
            target: Rc::downgrade(target),
            active,
            set,
        }));
        self.tween_order.push(id);
        trace!(?id, duration, "tween started");

        handle
    }

    /// Advance every entry by `delta_seconds`. The host calls this exactly
    /// once per frame; entries advance in insertion order, springs first.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.frame += 1;
        let delta = FrameDelta {
            scaled: delta_seconds * self.time_scale,
            unscaled: delta_seconds,
        };

        let mut finished: SmallVec<[SpringBindingId; 8]> = SmallVec::new();
        for &id in &self.spring_order {
            if let Some(binding) = self.springs.get_mut(id) {
                if let Advance::Finished = binding.advance(self.frame, delta) {
                    finished.push(id);
                }
            }
        }
        if !finished.is_empty() {
            for &id in &finished {
                self.springs.remove(id);
                trace!(?id, "spring binding pruned");
            }
            self.spring_order.retain(|id| !finished.contains(id));
        }

        let mut finished: SmallVec<[TweenId; 8]> = SmallVec::new();
        for &id in &self.tween_order {
            if let Some(tween) = self.tweens.get_mut(id) {
                if let Advance::Finished = tween.advance(delta) {
                    finished.push(id);
                }
            }
        }
        if !finished.is_empty() {
            for &id in &finished {
                self.tweens.remove(id);
                trace!(?id, "tween left the running set");
            }
            self.tween_order.retain(|id| !finished.contains(id));
        }
    }

    /// Number of live spring bindings.
    pub fn spring_binding_count(&self) -> usize {
        self.springs.len()
    }

    /// Number of tweens in the running set, paused ones included.
    pub fn running_tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// True while anything would still visibly move: an unsettled spring
    /// binding or a running tween with a live target.
    pub fn has_active_animations(&self) -> bool {
        self.springs.values().any(|binding| binding.is_active())
            || self.tweens.values().any(|tween| tween.is_active())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
