/// Crosshair kick after a shot, settling back on the pointer.
///
/// Decay is driven by elapsed wall-clock time, so the crosshair settles at
/// the same speed regardless of frame rate.

use rand::Rng;

use crate::config::RecoilConfig;
use crate::entities::{Crosshair, Point};

/// Reference frame length the damping factor is expressed in (60 Hz).
const DAMPING_FRAME_MS: f32 = 1000.0 / 60.0;

/// Below this the kick snaps back to zero.
const SETTLE_EPSILON: f32 = 0.1;

impl Crosshair {
    /// Pointer position plus any active kick.
    pub fn position(&self) -> Point {
        Point::new(self.target.x + self.recoil.x, self.target.y + self.recoil.y)
    }
}

/// Kick the crosshair mostly upwards.  A kick already in progress is left
/// alone.
pub fn kick(crosshair: &mut Crosshair, cfg: &RecoilConfig, rng: &mut impl Rng) {
    if crosshair.recoiling {
        return;
    }
    let (lo, hi) = (
        cfg.min_intensity.min(cfg.max_intensity),
        cfg.min_intensity.max(cfg.max_intensity),
    );
    let intensity = rng.gen_range(lo..=hi);
    let spread = cfg.spread.abs();
    let angle = std::f32::consts::FRAC_PI_2 + rng.gen_range(-spread..=spread);

    crosshair.recoil = Point::new(angle.cos() * intensity, -angle.sin() * intensity);
    crosshair.recoiling = true;
}

pub fn settle(crosshair: &mut Crosshair, cfg: &RecoilConfig, dt_ms: u64) {
    if !crosshair.recoiling {
        return;
    }
    let factor = cfg.damping.clamp(0.0, 1.0).powf(dt_ms as f32 / DAMPING_FRAME_MS);
    crosshair.recoil.x *= factor;
    crosshair.recoil.y *= factor;

    if crosshair.recoil.x.abs() < SETTLE_EPSILON && crosshair.recoil.y.abs() < SETTLE_EPSILON {
        crosshair.recoil = Point::default();
        crosshair.recoiling = false;
    }
}
