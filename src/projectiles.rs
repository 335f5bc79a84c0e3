/// Projectile simulation: spawning aimed bullets, gravity integration and
/// culling by lifetime or bounds.
///
/// The live set is a `VecDeque` ordered oldest-first so capacity eviction is
/// a `pop_front`.

use std::collections::VecDeque;

use crate::config::BulletConfig;
use crate::entities::{Bullet, Playfield, Point, RemovalReason};

/// Aim vectors shorter than this are treated as "no direction".
const MIN_AIM_LENGTH: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub enum SpawnOutcome {
    Spawned { id: u64, evicted: Vec<u64> },
    /// Origin and target coincide; nothing was added.
    Degenerate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BulletRemoval {
    pub id: u64,
    pub reason: RemovalReason,
}

/// Screen rectangle grown by a margin on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn around(field: Playfield, margin: f32) -> Self {
        Self {
            left: -margin,
            top: -margin,
            right: field.width + margin,
            bottom: field.height + margin,
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Fire a bullet from `origin` towards `target` at the configured speed.
/// If the set is over capacity afterwards, the oldest bullets are dropped.
pub fn spawn(
    bullets: &mut VecDeque<Bullet>,
    id: u64,
    origin: Point,
    target: Point,
    now_ms: u64,
    cfg: &BulletConfig,
) -> SpawnOutcome {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let length = (dx * dx + dy * dy).sqrt();
    if !(length > MIN_AIM_LENGTH) {
        return SpawnOutcome::Degenerate;
    }

    bullets.push_back(Bullet {
        id,
        x: origin.x,
        y: origin.y,
        velocity_x: dx / length * cfg.speed,
        velocity_y: dy / length * cfg.speed,
        created_at_ms: now_ms,
    });

    let mut evicted = Vec::new();
    while bullets.len() > cfg.max_live {
        match bullets.pop_front() {
            Some(old) => evicted.push(old.id),
            None => break,
        }
    }

    SpawnOutcome::Spawned { id, evicted }
}

/// Semi-implicit Euler step: velocity first, then position.
pub fn integrate(bullets: &mut VecDeque<Bullet>, dt_secs: f32, gravity: f32) {
    let dt = dt_secs.max(0.0);
    for b in bullets.iter_mut() {
        b.velocity_y += gravity * dt;
        b.x += b.velocity_x * dt;
        b.y += b.velocity_y * dt;
    }
}

/// Cull bullets that are too old or outside `bounds`.
pub fn expire(
    bullets: &mut VecDeque<Bullet>,
    now_ms: u64,
    bounds: &Bounds,
    lifetime_ms: u64,
) -> Vec<BulletRemoval> {
    let mut removed = Vec::new();
    bullets.retain(|b| {
        let reason = if now_ms.saturating_sub(b.created_at_ms) >= lifetime_ms {
            Some(RemovalReason::Expired)
        } else if !bounds.contains(b.x, b.y) {
            Some(RemovalReason::OutOfBounds)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                removed.push(BulletRemoval { id: b.id, reason });
                false
            }
            None => true,
        }
    });
    removed
}

/// Integrate then cull, for callers that don't interleave collision checks.
pub fn advance(
    bullets: &mut VecDeque<Bullet>,
    dt_secs: f32,
    now_ms: u64,
    field: Playfield,
    cfg: &BulletConfig,
) -> Vec<BulletRemoval> {
    integrate(bullets, dt_secs, cfg.gravity);
    expire(
        bullets,
        now_ms,
        &Bounds::around(field, cfg.bounds_margin),
        cfg.lifetime_ms,
    )
}
