//! Display-synchronized frame scheduling and run timing.

use crate::FrameRequestId;
use slotmap::SlotMap;

/// Hands out one-shot frame callbacks, fired on the next display refresh.
///
/// A request fires at most once. Whoever owns a [FrameRequestId] is
/// responsible for cancelling it when the surface it draws to goes away.
#[derive(Default)]
pub struct FrameScheduler {
    /// Pending requests, with the order they were made in.
    pending: SlotMap<FrameRequestId, u64>,
    /// The next sequence number.
    seq: u64,
    /// The timestamp of the last refresh in s.
    last_tick: Option<f64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Requests a callback on the next refresh.
    pub fn request_frame(&mut self) -> FrameRequestId {
        let seq = self.seq;
        self.seq += 1;
        let id = self.pending.insert(seq);
        log::debug!("frame requested: {:?}", id);
        id
    }

    /// Cancels a pending request. Returns false if it had already fired or been cancelled.
    pub fn cancel(&mut self, id: FrameRequestId) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// The number of requests waiting for the next refresh.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Signals a display refresh at time `now` (in s), firing every pending request.
    ///
    /// Returns the fired requests in the order they were made.
    pub fn tick(&mut self, now: f64) -> Vec<FrameRequestId> {
        self.last_tick = Some(now);
        let mut fired = self.pending.drain().collect::<Vec<_>>();
        fired.sort_by_key(|(_, seq)| *seq);
        fired.into_iter().map(|(id, _)| id).collect()
    }

    /// The time of the most recent refresh.
    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }
}

/// Wall-clock time a run has spent running.
///
/// Time only accumulates between [start](Self::start) and [pause](Self::pause).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElapsedClock {
    /// Time accumulated before the current running stretch, in s.
    accumulated: f64,
    /// When the current running stretch began.
    running_since: Option<f64>,
}

impl ElapsedClock {
    /// Starts or resumes the clock.
    pub fn start(&mut self, now: f64) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stops the clock, keeping the time so far.
    pub fn pause(&mut self, now: f64) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += (now - since).max(0.0);
        }
    }

    /// Stops the clock and forgets the elapsed time.
    pub fn reset(&mut self) {
        *self = Default::default();
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// The elapsed running time at `now`, in s.
    pub fn elapsed(&self, now: f64) -> f64 {
        let current = self
            .running_since
            .map(|since| (now - since).max(0.0))
            .unwrap_or(0.0);
        self.accumulated + current
    }
}
