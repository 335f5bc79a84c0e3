/// Wall-clock deadline queue.
///
/// Delayed transitions (end of a flight cycle, start of the second death
/// blast) are stored here with an absolute due time and drained once per
/// tick, so every mutation still happens inside the frame update.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The current flight cycle has run its full duration.
    CycleComplete,
    /// Switch a death explosion from the damage flash to the main blast.
    DeathPhaseTwo { explosion_id: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    due_ms: u64,
    event: TimerEvent,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, event: TimerEvent) {
        self.entries.push(Entry { due_ms, event });
    }

    /// Drop every pending entry equal to `event`.  Returns how many went.
    pub fn cancel(&mut self, event: TimerEvent) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.event != event);
        before - self.entries.len()
    }

    /// Remove and return all events due at or before `now_ms`, earliest first,
    /// each paired with its deadline.  Entries with equal deadlines keep their
    /// scheduling order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<(u64, TimerEvent)> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due_ms <= now_ms {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due_ms);
        due.into_iter().map(|e| (e.due_ms, e.event)).collect()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    pub fn is_pending(&self, event: TimerEvent) -> bool {
        self.entries.iter().any(|e| e.event == event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
