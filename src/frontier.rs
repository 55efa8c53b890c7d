//! Frontier queue and visited set
//!
//! The frontier holds URLs awaiting fetch; the visited set is the single
//! dedup gate. Together they maintain the partition invariant: every URL
//! ever accepted for a job is in exactly one of {queued, in-flight,
//! completed} at any time.
//!
//! Drain detection is what makes the controller's completion transition
//! correct: a worker observing an empty queue must not conclude the job is
//! over while another worker's fetch is still in flight, because that fetch
//! may enqueue new URLs. The queue and the in-flight count therefore live
//! under one lock, and [`Frontier::pop`] only returns `None` once both are
//! zero. Idle workers park on a [`Notify`] instead of busy-waiting and are
//! woken by new pushes or by the drain becoming final.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

use tokio::sync::Notify;

/// A URL admitted to the frontier, tagged with its discovery depth.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// Normalized URL to fetch.
    pub url: url::Url,
    /// Link hops from the seed (seed is depth 0).
    pub depth: usize,
    /// When the target entered the frontier.
    pub queued_at: Instant,
}

impl CrawlTarget {
    pub fn new(url: url::Url, depth: usize) -> Self {
        Self {
            url,
            depth,
            queued_at: Instant::now(),
        }
    }
}

#[derive(Default)]
struct FrontierState {
    queue: VecDeque<CrawlTarget>,
    in_flight: usize,
    closed: bool,
}

/// FIFO work queue with linearizable push/pop and race-free drain detection.
#[derive(Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    wake: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a target and wake parked workers.
    ///
    /// Returns false without enqueueing once the frontier is closed
    /// (cancellation or fatal failure); no new work is honored after that.
    pub fn push(&self, target: CrawlTarget) -> bool {
        let mut state = self.state.lock().expect("frontier lock poisoned");
        if state.closed {
            return false;
        }
        state.queue.push_back(target);
        drop(state);
        self.wake.notify_waiters();
        true
    }

    /// Dequeue the next target, parking while the queue is empty but the job
    /// is not yet drained.
    ///
    /// Returns `None` exactly when the frontier is drained (queue empty and
    /// zero in-flight fetches) or closed. A returned target counts as
    /// in-flight until the worker calls [`Frontier::complete`].
    pub async fn pop(&self) -> Option<CrawlTarget> {
        loop {
            // Register for wakeup before checking state, so a push between
            // the check and the await cannot be lost. notified() only joins
            // the waiter list once polled, hence the explicit enable().
            let mut parked = std::pin::pin!(self.wake.notified());
            parked.as_mut().enable();
            {
                let mut state = self.state.lock().expect("frontier lock poisoned");
                if state.closed {
                    return None;
                }
                if let Some(target) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(target);
                }
                if state.in_flight == 0 {
                    return None;
                }
            }
            parked.await;
        }
    }

    /// Mark one in-flight fetch as finished.
    ///
    /// Must be called exactly once per target returned by [`Frontier::pop`],
    /// whether the fetch succeeded or not. When this was the last in-flight
    /// fetch and the queue is empty, parked workers are woken so they can
    /// observe the drain and exit.
    pub fn complete(&self) {
        let mut state = self.state.lock().expect("frontier lock poisoned");
        debug_assert!(state.in_flight > 0, "complete() without matching pop()");
        state.in_flight -= 1;
        let drained = state.queue.is_empty() && state.in_flight == 0;
        drop(state);
        if drained {
            self.wake.notify_waiters();
        }
    }

    /// Refuse all future pushes and release parked workers.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("frontier lock poisoned");
        state.closed = true;
        state.queue.clear();
        drop(state);
        self.wake.notify_waiters();
    }

    /// True when no queued or in-flight work remains.
    pub fn is_drained(&self) -> bool {
        let state = self.state.lock().expect("frontier lock poisoned");
        state.queue.is_empty() && state.in_flight == 0
    }

    /// Number of queued (not in-flight) targets.
    pub fn queued(&self) -> usize {
        self.state.lock().expect("frontier lock poisoned").queue.len()
    }
}

/// Set of URLs already claimed for fetching.
///
/// [`Visited::try_claim`] is the sole dedup gate: the controller claims a
/// URL before pushing it, so each URL enters the frontier (and is fetched)
/// at most once per job. Claims are linearizable across workers.
#[derive(Default)]
pub struct Visited {
    seen: Mutex<HashSet<String>>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a URL. Returns true iff it was not claimed before.
    pub fn try_claim(&self, url: &url::Url) -> bool {
        self.seen
            .lock()
            .expect("visited lock poisoned")
            .insert(url.as_str().to_string())
    }

    /// Number of claimed URLs.
    pub fn len(&self) -> usize {
        self.seen.lock().expect("visited lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
