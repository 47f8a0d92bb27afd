//! Cooperative scheduler
//!
//! Timeouts and animation frames on a virtual clock. Nothing here runs a
//! task; the runtime pops due work and executes it so tasks can borrow the
//! whole runtime mutably.

use std::fmt;

/// Handle returned by `set_timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

/// Handle returned by `request_animation_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub(crate) u64);

struct Timer<T> {
    id: u64,
    due_ms: f64,
    task: T,
}

struct Frame<T> {
    id: u64,
    due_ms: f64,
    task: T,
}

/// Pending timeouts and animation frames
pub(crate) struct Scheduler<T> {
    timers: Vec<Timer<T>>,
    frames: Vec<Frame<T>>,
    /// Shared id counter; also gives insertion order among equal due times
    next_id: u64,
    frame_interval_ms: f64,
    now_ms: f64,
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("timers", &self.timers.len())
            .field("frames", &self.frames.len())
            .field("now_ms", &self.now_ms)
            .finish()
    }
}

impl<T> Scheduler<T> {
    pub(crate) fn new(frame_interval_ms: u64) -> Self {
        Self {
            timers: Vec::new(),
            frames: Vec::new(),
            next_id: 1,
            frame_interval_ms: frame_interval_ms.max(1) as f64,
            now_ms: 0.0,
        }
    }

    /// Current time (ms)
    pub(crate) fn now(&self) -> f64 {
        self.now_ms
    }

    pub(crate) fn set_now(&mut self, now_ms: f64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Run `task` once `delay_ms` has elapsed
    pub(crate) fn set_timeout(&mut self, delay_ms: f64, task: T) -> TimerId {
        let id = self.alloc_id();
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            task,
        });
        TimerId(id)
    }

    /// Cancel a timeout. Returns false if it already ran or was cancelled.
    pub(crate) fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id.0);
        self.timers.len() != before
    }

    /// Run `task` at the next frame boundary strictly after now
    pub(crate) fn request_animation_frame(&mut self, task: T) -> FrameId {
        let id = self.alloc_id();
        let interval = self.frame_interval_ms;
        let due_ms = ((self.now_ms / interval).floor() + 1.0) * interval;
        self.frames.push(Frame { id, due_ms, task });
        FrameId(id)
    }

    pub(crate) fn cancel_animation_frame(&mut self, id: FrameId) -> bool {
        let before = self.frames.len();
        self.frames.retain(|f| f.id != id.0);
        self.frames.len() != before
    }

    pub(crate) fn next_timer_due(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|t| t.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub(crate) fn next_frame_due(&self) -> Option<f64> {
        self.frames
            .iter()
            .map(|f| f.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Remove the earliest timer due at or before `now_ms`.
    /// Ties go to the timer scheduled first.
    pub(crate) fn pop_due_timer(&mut self, now_ms: f64) -> Option<T> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index).task)
    }

    /// Remove every frame due at or before `now_ms`, in request order
    pub(crate) fn take_due_frames(&mut self, now_ms: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut kept = Vec::with_capacity(self.frames.len());
        for frame in self.frames.drain(..) {
            if frame.due_ms <= now_ms {
                due.push(frame);
            } else {
                kept.push(frame);
            }
        }
        self.frames = kept;
        due.sort_by_key(|f| f.id);
        due.into_iter().map(|f| f.task).collect()
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn pending_frames(&self) -> usize {
        self.frames.len()
    }
}
