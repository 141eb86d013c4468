//! Cooperative single-threaded task scheduler with a virtual clock.
//!
//! Models the two suspension points the pipeline needs: "run after the
//! current rendering pass completes" ([`Scheduler::schedule`]) and "run after
//! an additional fixed delay" ([`Scheduler::schedule_after`]). There is no
//! cancellation; a task whose target node has been detached simply finds
//! nothing to do when it runs.

use std::collections::BinaryHeap;

struct Entry<T> {
    due: u64,
    seq: u64,
    task: T,
}

// Min-heap ordering on (due, seq): earliest deadline first, FIFO for equal
// deadlines.
impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

/// Single-threaded task queue driven by a virtual millisecond clock.
pub struct Scheduler<T> {
    now_ms: u64,
    seq: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a task for the next tick (due immediately).
    pub fn schedule(&mut self, task: T) {
        self.schedule_after(0, task);
    }

    /// Schedule a task to run `delay_ms` after the current virtual time.
    pub fn schedule_after(&mut self, delay_ms: u64, task: T) {
        let entry = Entry {
            due: self.now_ms + delay_ms,
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.queue.push(entry);
    }

    /// Pop the next task that is due at the current time, if any.
    pub fn pop_due(&mut self) -> Option<T> {
        if self.queue.peek().is_some_and(|e| e.due <= self.now_ms) {
            self.queue.pop().map(|e| e.task)
        } else {
            None
        }
    }

    /// Advance the virtual clock.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Jump the clock to the next pending deadline. Returns `false` when the
    /// queue is empty.
    pub fn advance_to_next(&mut self) -> bool {
        match self.queue.peek() {
            Some(entry) => {
                self.now_ms = self.now_ms.max(entry.due);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_tasks_fifo() {
        let mut sched = Scheduler::new();
        sched.schedule("a");
        sched.schedule("b");
        sched.schedule("c");

        assert_eq!(sched.pop_due(), Some("a"));
        assert_eq!(sched.pop_due(), Some("b"));
        assert_eq!(sched.pop_due(), Some("c"));
        assert_eq!(sched.pop_due(), None);
    }

    #[test]
    fn test_delayed_task_not_due_until_advance() {
        let mut sched = Scheduler::new();
        sched.schedule_after(50, "later");

        assert_eq!(sched.pop_due(), None);
        assert!(!sched.is_idle());

        sched.advance(49);
        assert_eq!(sched.pop_due(), None);

        sched.advance(1);
        assert_eq!(sched.pop_due(), Some("later"));
    }

    #[test]
    fn test_deadline_ordering_beats_insertion_order() {
        let mut sched = Scheduler::new();
        sched.schedule_after(100, "slow");
        sched.schedule_after(10, "fast");

        sched.advance(100);
        assert_eq!(sched.pop_due(), Some("fast"));
        assert_eq!(sched.pop_due(), Some("slow"));
    }

    #[test]
    fn test_advance_to_next() {
        let mut sched = Scheduler::new();
        sched.schedule_after(200, "x");

        assert!(sched.advance_to_next());
        assert_eq!(sched.now(), 200);
        assert_eq!(sched.pop_due(), Some("x"));
        assert!(!sched.advance_to_next());
    }

    #[test]
    fn test_tasks_scheduled_during_drain_run_same_tick() {
        let mut sched = Scheduler::new();
        sched.schedule(1);
        let mut ran = Vec::new();
        while let Some(task) = sched.pop_due() {
            ran.push(task);
            if task == 1 {
                sched.schedule(2);
            }
        }
        assert_eq!(ran, vec![1, 2]);
    }
}
