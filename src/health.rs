/// Plane damage state machine.
///
/// `Alive(hits < max)` --hit--> `Alive(hits + 1)` or, on the last hit,
/// `Destroyed`.  Hits on a destroyed plane are ignored.  `reset` always
/// returns to a fresh `Alive(0)`.

use crate::entities::PlaneHealth;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Ignored,
    Damaged { hits_taken: u32 },
    Destroyed,
}

impl PlaneHealth {
    /// A plane always survives at least one hit.
    pub fn new(max_hits: u32) -> Self {
        Self {
            hits_taken: 0,
            max_hits: max_hits.max(1),
            alive: true,
        }
    }

    pub fn take_hit(&mut self) -> HitOutcome {
        if !self.alive {
            return HitOutcome::Ignored;
        }
        self.hits_taken = (self.hits_taken + 1).min(self.max_hits);
        self.alive = self.hits_taken < self.max_hits;
        if self.alive {
            HitOutcome::Damaged {
                hits_taken: self.hits_taken,
            }
        } else {
            HitOutcome::Destroyed
        }
    }

    pub fn reset(&mut self) {
        self.hits_taken = 0;
        self.alive = true;
    }
}
