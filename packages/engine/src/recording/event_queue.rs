// packages/engine/src/recording/event_queue.rs
//! Lock-free MPMC queue for round events
//!
//! Bounded so a long simulation cannot grow memory without limit; pushes
//! beyond capacity are rejected and counted.

use crate::recording::recorder::RoundEvent;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free event queue
#[derive(Debug)]
pub struct EventQueue {
    /// Underlying bounded queue
    queue: ArrayQueue<RoundEvent>,

    /// Push counter
    push_count: AtomicU64,

    /// Pop counter
    pop_count: AtomicU64,

    /// Drop counter (queue full)
    drop_count: AtomicU64,
}

impl EventQueue {
    /// Create a new event queue; `capacity` must be non-zero
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: ArrayQueue::new(capacity),
            push_count: AtomicU64::new(0),
            pop_count: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
        })
    }

    /// Push an event, handing it back if the queue is full
    pub fn push(&self, event: RoundEvent) -> Result<(), RoundEvent> {
        match self.queue.push(event) {
            Ok(()) => {
                self.push_count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(event) => {
                self.drop_count.fetch_add(1, Ordering::Relaxed);
                Err(event)
            }
        }
    }

    /// Try to pop the oldest event (non-blocking)
    pub fn try_pop(&self) -> Option<RoundEvent> {
        let event = self.queue.pop()?;
        self.pop_count.fetch_add(1, Ordering::Relaxed);
        Some(event)
    }

    /// Pop everything currently queued, oldest first
    pub fn drain(&self) -> Vec<RoundEvent> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.try_pop() {
            events.push(event);
        }
        events
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            pop_count: self.pop_count.load(Ordering::Relaxed),
            drop_count: self.drop_count.load(Ordering::Relaxed),
            current_size: self.queue.len(),
            capacity: self.queue.capacity(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Queue statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Total events pushed
    pub push_count: u64,

    /// Total events popped
    pub pop_count: u64,

    /// Total events dropped (queue full)
    pub drop_count: u64,

    /// Current queue size
    pub current_size: usize,

    /// Queue capacity
    pub capacity: usize,
}
