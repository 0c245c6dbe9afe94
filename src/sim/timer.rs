//! One-shot timers keyed by a monotonic clock
//!
//! Entries are never cancelled; overlapping schedules simply fire in turn.

/// Handle for a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    due: f64,
    action: T,
}

/// Pending one-shot actions, polled once per tick
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `delay` seconds have passed since `now`
    pub fn schedule(&mut self, now: f64, delay: f32, action: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: now + f64::from(delay.max(0.0)),
            action,
        });
        id
    }

    /// Remove and return every action due at `now`, earliest first
    pub fn poll(&mut self, now: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}
