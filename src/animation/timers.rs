//! Single-threaded delayed callbacks.
//!
//! Node flashes end on a timer that runs outside the frame loop. The host
//! owns the clock: it calls [`TimerQueue::run_due`] from its event loop, and
//! anything still pending when the queue is dropped never runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use web_time::{Duration, Instant};

struct Timer {
    deadline: Instant,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Queue {
    timers: Vec<Timer>,
    next_seq: u64,
}

/// Shared handle to a queue of one-shot delayed tasks.
///
/// Cloning the handle shares the queue. Tasks run in deadline order (ties in
/// scheduling order) and may schedule further tasks, which become eligible
/// on the next [`run_due`](Self::run_due).
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<Queue>>,
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

impl TimerQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has passed.
    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) {
        self.schedule_at(Instant::now() + delay, task);
    }

    /// Run `task` once `deadline` has been reached.
    pub fn schedule_at(&self, deadline: Instant, task: impl FnOnce() + 'static) {
        let mut queue = self.inner.borrow_mut();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.timers.push(Timer {
            deadline,
            seq,
            task: Box::new(task),
        });
    }

    /// Run every task whose deadline is at or before `now`. Returns how many
    /// ran.
    pub fn run_due(&self, now: Instant) -> usize {
        let mut due: Vec<Timer> = {
            let mut queue = self.inner.borrow_mut();
            let (due, pending): (Vec<_>, Vec<_>) =
                std::mem::take(&mut queue.timers)
                .into_iter()
                .partition(|t| t.deadline <= now);
            queue.timers = pending;
            due
        };
        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.seq.cmp(&b.seq)));

        let count = due.len();
        for timer in due {
            (timer.task)();
        }
        count
    }

    /// Number of tasks not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Earliest pending deadline, for hosts that sleep until it.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.borrow().timers.iter().map(|t| t.deadline).min()
    }

    /// Drop every pending task without running it.
    pub fn clear(&self) {
        self.inner.borrow_mut().timers.clear();
    }
}
