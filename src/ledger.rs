/// Ammo, score and round bookkeeping.

use crate::entities::{AmmoLedger, RoundState, ScoreState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    Fired { remaining: u32 },
    Empty,
}

impl AmmoLedger {
    pub fn new(initial: u32) -> Self {
        Self {
            remaining: initial,
            initial,
        }
    }

    /// Spend one round.  Rejected without side effects when empty.
    pub fn fire(&mut self) -> FireOutcome {
        if self.remaining == 0 {
            return FireOutcome::Empty;
        }
        self.remaining -= 1;
        FireOutcome::Fired {
            remaining: self.remaining,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = self.initial;
    }
}

impl ScoreState {
    pub fn record_destroyed(&mut self) -> u32 {
        self.planes_destroyed += 1;
        self.planes_destroyed
    }

    pub fn reset(&mut self) {
        self.planes_destroyed = 0;
    }
}

impl RoundState {
    /// The round ends when the magazine is empty.
    pub fn for_ammo(ammo: &AmmoLedger) -> Self {
        if ammo.is_empty() {
            RoundState::GameOver
        } else {
            RoundState::Active
        }
    }

    pub fn is_over(&self) -> bool {
        *self == RoundState::GameOver
    }
}
