/// Plane motion: one straight, timed pass from off-screen left to
/// off-screen right.  The pose is a pure function of the cycle and the
/// current time; only `new_cycle` touches the RNG.

use rand::Rng;

use crate::config::FlightConfig;
use crate::entities::{FlightCycle, PlanePose, Playfield};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Horizontal distance covered by one pass.
pub fn travel_distance(field: Playfield, cfg: &FlightConfig) -> f32 {
    field.width + 2.0 * cfg.offscreen_margin
}

/// Roll a fresh pass starting at `now_ms`, with entry and exit altitudes
/// drawn from the configured band.
pub fn new_cycle(
    field: Playfield,
    cfg: &FlightConfig,
    now_ms: u64,
    rng: &mut impl Rng,
) -> FlightCycle {
    let a = field.height * cfg.min_altitude_frac;
    let b = field.height * cfg.max_altitude_frac;
    let (lo, hi) = (a.min(b), a.max(b));

    let start_y = rng.gen_range(lo..=hi);
    let end_y = rng.gen_range(lo..=hi);
    let rotation = cfg.base_rotation + (end_y - start_y).atan2(travel_distance(field, cfg));

    FlightCycle {
        start_y,
        end_y,
        rotation,
        started_at_ms: now_ms,
        duration_ms: cfg.duration_ms,
    }
}

/// Fraction of the pass completed, clamped to `0..=1`.
pub fn progress(cycle: &FlightCycle, now_ms: u64) -> f32 {
    if cycle.duration_ms == 0 {
        return 1.0;
    }
    let elapsed = now_ms.saturating_sub(cycle.started_at_ms) as f32;
    (elapsed / cycle.duration_ms as f32).min(1.0)
}

pub fn pose_at(
    cycle: &FlightCycle,
    field: Playfield,
    cfg: &FlightConfig,
    scale: f32,
    now_ms: u64,
) -> PlanePose {
    let t = progress(cycle, now_ms);
    PlanePose {
        x: lerp(-cfg.offscreen_margin, field.width + cfg.offscreen_margin, t),
        y: lerp(cycle.start_y, cycle.end_y, t),
        rotation: cycle.rotation,
        scale,
    }
}
