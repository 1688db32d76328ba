//! The process-wide wait queues behind `memory.atomic.wait` and
//! `memory.atomic.notify`.
//!
//! Queues are keyed by shared buffer identity and effective address.
//! The registry is lazily initialised on first use and never torn down
//! within the process.

use std::{
    collections::HashMap,
    sync::{Arc, Condvar, Mutex, OnceLock},
    time::{Duration, Instant},
};

/// The outcome of a `memory.atomic.wait`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum WaitResult {
    /// The thread was woken by a notify.
    Ok = 0,
    /// The expected value did not match.
    NotEqual = 1,
    /// The timeout expired before a notify arrived.
    TimedOut = 2,
}

/// One wait queue: the waiter bookkeeping behind a condition variable.
#[derive(Debug, Default)]
struct QueueState {
    /// The number of currently parked waiters.
    waiting: u64,
    /// Wakeups granted by notifies but not yet consumed by a waiter.
    wakeups: u64,
}

#[derive(Debug, Default)]
struct Queue {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

/// The process-wide registry of wait queues.
#[derive(Debug, Default)]
pub struct WaitRegistry {
    queues: Mutex<HashMap<(usize, u64), Arc<Queue>>>,
}

/// Returns the lazily initialised process-wide registry.
pub fn registry() -> &'static WaitRegistry {
    static REGISTRY: OnceLock<WaitRegistry> = OnceLock::new();
    REGISTRY.get_or_init(WaitRegistry::default)
}

impl WaitRegistry {
    fn queue(&self, key: (usize, u64)) -> Arc<Queue> {
        let mut queues = self.queues.lock().unwrap_or_else(|poison| poison.into_inner());
        queues.entry(key).or_default().clone()
    }

    /// Parks the current thread on `(buffer, addr)`.
    ///
    /// `still_expected` re-reads the memory and compares against the
    /// expected value; it runs under the queue lock so that a concurrent
    /// notify cannot slip between the check and the park.
    ///
    /// A negative `timeout_nanos` waits forever.
    pub fn wait(
        &self,
        buffer: usize,
        addr: u64,
        timeout_nanos: i64,
        still_expected: impl FnOnce() -> bool,
    ) -> WaitResult {
        let queue = self.queue((buffer, addr));
        let mut state = queue
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        if !still_expected() {
            return WaitResult::NotEqual;
        }
        state.waiting += 1;
        let deadline = (timeout_nanos >= 0)
            .then(|| Instant::now() + Duration::from_nanos(timeout_nanos as u64));
        loop {
            if state.wakeups > 0 {
                state.wakeups -= 1;
                state.waiting -= 1;
                return WaitResult::Ok;
            }
            let remaining = match deadline {
                None => None,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.waiting -= 1;
                        return WaitResult::TimedOut;
                    }
                    Some(deadline - now)
                }
            };
            state = match remaining {
                None => queue
                    .condvar
                    .wait(state)
                    .unwrap_or_else(|poison| poison.into_inner()),
                Some(remaining) => {
                    queue
                        .condvar
                        .wait_timeout(state, remaining)
                        .unwrap_or_else(|poison| poison.into_inner())
                        .0
                }
            };
        }
    }

    /// Wakes up to `count` waiters parked on `(buffer, addr)`.
    ///
    /// Returns the number of waiters actually woken.
    pub fn notify(&self, buffer: usize, addr: u64, count: u32) -> u32 {
        let queue = self.queue((buffer, addr));
        let mut state = queue
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let pending = state.waiting.saturating_sub(state.wakeups);
        let woken = pending.min(u64::from(count));
        state.wakeups += woken;
        drop(state);
        queue.condvar.notify_all();
        woken as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_not_equal() {
        let result = registry().wait(0xDEAD, 0, 0, || false);
        assert_eq!(result, WaitResult::NotEqual);
    }

    #[test]
    fn wait_times_out() {
        let result = registry().wait(0xDEAD, 8, 1_000, || true);
        assert_eq!(result, WaitResult::TimedOut);
    }

    #[test]
    fn notify_without_waiters_wakes_none() {
        assert_eq!(registry().notify(0xDEAD, 16, 5), 0);
    }

    #[test]
    fn notify_wakes_parked_waiter() {
        let key = 0xBEEF;
        let waiter = std::thread::spawn(move || registry().wait(key, 0, 5_000_000_000, || true));
        // spin until the waiter is parked, then notify
        loop {
            if registry().notify(key, 0, 1) == 1 {
                break;
            }
            std::thread::yield_now();
        }
        assert_eq!(waiter.join().unwrap(), WaitResult::Ok);
    }
}
