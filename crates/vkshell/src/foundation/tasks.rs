//! Deferred main-thread task queue
//!
//! Arbitrary callables can be queued from anywhere on the owning thread and
//! are drained once per loop iteration, after frame submission. Ordering is
//! FIFO within a drain; there is no ordering guarantee across iterations.

use std::collections::VecDeque;

/// Boxed deferred callable
pub type Task = Box<dyn FnOnce()>;

/// FIFO queue of callables run on the thread that owns the event loop.
///
/// Single-threaded by design; if concurrent producers are ever needed this
/// must become a channel instead of an unsynchronized list.
#[derive(Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a callable for the next drain
    pub fn push(&mut self, task: impl FnOnce() + 'static) {
        self.tasks.push_back(Box::new(task));
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every queued task in enqueue order and clear the queue.
    ///
    /// Tasks queued by a running task are executed in the same drain.
    pub fn drain(&mut self) {
        while let Some(task) = self.tasks.pop_front() {
            task();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn drains_in_fifo_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut queue = TaskQueue::new();

        for i in 0..4 {
            let order = Rc::clone(&order);
            queue.push(move || order.borrow_mut().push(i));
        }

        queue.drain();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_on_empty_queue_is_noop() {
        let mut queue = TaskQueue::new();
        queue.drain();
        assert!(queue.is_empty());
    }
}
