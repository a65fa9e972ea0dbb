//! One-shot timers on a frame-driven clock
//!
//! The clock only moves when the host ticks it, so every delayed transition
//! is reproducible. Each `schedule` call returns a [`TimerHandle`]; callers
//! keep the handle for the purpose it serves and cancel it when the purpose
//! is superseded. Cancelling an already fired or cancelled handle is a no-op.

/// Identity of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending<K> {
    id: u64,
    key: K,
    due_ms: f64,
}

/// Timers due at a future point of the session clock
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now_ms: f64,
    next_id: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Milliseconds elapsed on this clock
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `key` to fire `delay_ms` from now
    pub fn schedule(&mut self, key: K, delay_ms: f64) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            key,
            due_ms: self.now_ms + delay_ms.max(0.0),
        });
        TimerHandle(id)
    }

    /// Cancel a timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != handle.0);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.id == handle.0)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move the clock forward and return the keys that came due, oldest first
    pub fn advance(&mut self, dt_ms: f64) -> Vec<K> {
        self.now_ms += dt_ms.max(0.0);
        let now = self.now_ms;

        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now);
        self.pending = rest;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));
        due.into_iter().map(|p| p.key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fires_once_at_due_time() {
        let mut timers = Scheduler::new();
        timers.schedule("alert", 4000.0);

        assert!(timers.advance(3999.0).is_empty());
        assert_eq!(timers.advance(1.0), vec!["alert"]);
        assert!(timers.advance(10_000.0).is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = Scheduler::new();
        let handle = timers.schedule(1, 100.0);
        assert!(timers.is_pending(handle));
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(timers.advance(500.0).is_empty());
    }

    #[test]
    fn test_due_order_is_stable() {
        let mut timers = Scheduler::new();
        timers.schedule('c', 300.0);
        timers.schedule('a', 100.0);
        timers.schedule('b', 100.0);
        assert_eq!(timers.advance(1000.0), vec!['a', 'b', 'c']);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut timers = Scheduler::new();
        timers.advance(6000.0);
        timers.schedule("defense", 4000.0);
        assert!(timers.advance(3000.0).is_empty());
        assert_eq!(timers.now_ms(), 9000.0);
        assert_eq!(timers.advance(1000.0), vec!["defense"]);
    }

    proptest! {
        #[test]
        fn prop_frame_size_does_not_change_fire_order(
            delays in prop::collection::vec(0u32..5000, 1..12),
            frame_ms in 1u32..500,
        ) {
            let mut chopped = Scheduler::new();
            let mut whole = Scheduler::new();
            for (i, d) in delays.iter().enumerate() {
                chopped.schedule(i, f64::from(*d));
                whole.schedule(i, f64::from(*d));
            }

            let mut fired = Vec::new();
            for _ in 0..(5000 / frame_ms + 2) {
                fired.extend(chopped.advance(f64::from(frame_ms)));
            }
            let expected = whole.advance(10_000.0);

            // Same timers, never a later one before an earlier one
            prop_assert_eq!(fired.len(), delays.len());
            for pair in fired.windows(2) {
                prop_assert!(delays[pair[0]] <= delays[pair[1]]);
            }
            let mut sorted = fired.clone();
            sorted.sort();
            let mut expected_sorted = expected;
            expected_sorted.sort();
            prop_assert_eq!(sorted, expected_sorted);
        }
    }
}
