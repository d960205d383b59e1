//! In-memory queue of pending team allocations.
//!
//! FIFO, deduplicated by user id, process-local. Nothing here survives a
//! restart; team-status polling re-enqueues users whose team is missing.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct QueueState {
    order: VecDeque<i64>,
    members: HashSet<i64>,
}

/// Pending "assign a team to this user" jobs.
#[derive(Debug, Default)]
pub struct AllocationQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl AllocationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        // The critical sections never panic midway, so a poisoned lock still
        // holds consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a user to the back of the queue.
    ///
    /// Returns `false` if the user was already waiting.
    pub fn enqueue(&self, user_id: i64) -> bool {
        let inserted = {
            let mut state = self.state();
            if state.members.insert(user_id) {
                state.order.push_back(user_id);
                true
            } else {
                false
            }
        };
        if inserted {
            self.notify.notify_one();
        }
        inserted
    }

    /// Remove and return the oldest pending user, if any.
    pub fn dequeue(&self) -> Option<i64> {
        let mut state = self.state();
        let user_id = state.order.pop_front()?;
        state.members.remove(&user_id);
        Some(user_id)
    }

    pub fn is_queued(&self, user_id: i64) -> bool {
        self.state().members.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.state().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until a job is available and take it.
    pub async fn next(&self) -> i64 {
        loop {
            if let Some(user_id) = self.dequeue() {
                return user_id;
            }
            self.notify.notified().await;
        }
    }
}
