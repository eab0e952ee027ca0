// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/queue.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the bounded work queue between the producer and the
// workers. Besides blocking put/get it supports clearing every queued item
// under the same lock that guards put and get, so a clear can never
// interleave with a half-finished transfer, and closing the queue to release
// blocked threads at shutdown.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Why a `put_timeout` handed the item back.
#[derive(Debug, PartialEq)]
pub enum PutError<T> {
    Timeout(T),
    Closed(T),
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> WorkQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue, blocking while full. Returns the item if the queue is closed.
    pub fn put(&self, item: T) -> Result<(), T> {
        let mut state = self.lock();
        while state.items.len() >= self.capacity && !state.closed {
            state = self.not_full.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Enqueue, waiting at most `timeout` for room.
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        let state = self.lock();
        let (mut state, _) = self
            .not_full
            .wait_timeout_while(state, timeout, |s| s.items.len() >= self.capacity && !s.closed)
            .unwrap_or_else(|e| e.into_inner());
        if state.closed {
            return Err(PutError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(PutError::Timeout(item));
        }
        state.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue, blocking while empty. `None` once the queue is closed.
    pub fn get(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            state = self.not_empty.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Dequeue, waiting at most `timeout`. `None` on timeout or close.
    pub fn get_timeout(&self, timeout: Duration) -> Option<T> {
        let state = self.lock();
        let (mut state, _) = self
            .not_empty
            .wait_timeout_while(state, timeout, |s| s.items.is_empty() && !s.closed)
            .unwrap_or_else(|e| e.into_inner());
        if state.closed {
            return None;
        }
        let item = state.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Drop every queued item, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.items.len();
        state.items.clear();
        self.not_full.notify_all();
        dropped
    }

    /// Release every blocked caller; later puts fail and gets return `None`.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new(4);
        for i in 0..4 {
            queue.put(i).unwrap();
        }
        let drained: Vec<_> = (0..4).filter_map(|_| queue.get_timeout(Duration::ZERO)).collect();
        assert_eq!(drained, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_put_timeout_when_full() {
        let queue = WorkQueue::new(1);
        queue.put(1).unwrap();
        assert_eq!(queue.put_timeout(2, Duration::from_millis(10)), Err(PutError::Timeout(2)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_clear_unblocks_producer() {
        let queue = Arc::new(WorkQueue::new(1));
        queue.put(1).unwrap();
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.put(2))
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(queue.clear(), 1);
        producer.join().unwrap().unwrap();
        assert_eq!(queue.get_timeout(Duration::ZERO), Some(2));
    }

    #[test]
    fn test_close_wakes_blocked_get() {
        let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::new(2));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.get())
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(consumer.join().unwrap(), None);
        assert_eq!(queue.put(7), Err(7));
    }

    #[test]
    fn test_get_timeout_on_empty() {
        let queue: WorkQueue<u8> = WorkQueue::new(2);
        assert_eq!(queue.get_timeout(Duration::from_millis(5)), None);
    }
}
