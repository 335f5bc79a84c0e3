/// Explosion sequencing: timing and stage only, no drawing.
///
/// Impact explosions live for a fixed time and ride along with the plane.
/// A death explosion shows the damage flash first; once the delayed second
/// phase is triggered it fades in, fades out, and reports completion so the
/// plane can respawn.  Nothing here depends on whether a texture or sound
/// actually played.

use crate::config::ExplosionConfig;
use crate::entities::{Explosion, ExplosionKind, ExplosionStage, PlanePose, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplosionEvent {
    /// An impact explosion ran its course and was removed.
    Expired(u64),
    /// The death sequence finished and was removed.
    DeathComplete(u64),
}

/// Keep the live set within `max_live`, dropping the oldest impact
/// explosions.  Death sequences are never evicted.
fn enforce_capacity(explosions: &mut Vec<Explosion>, max_live: usize) -> Vec<u64> {
    let mut evicted = Vec::new();
    while explosions.len() > max_live {
        let Some(idx) = explosions
            .iter()
            .position(|e| matches!(e.kind, ExplosionKind::Impact { .. }))
        else {
            break;
        };
        evicted.push(explosions.remove(idx).id);
    }
    evicted
}

/// Start a non-lethal hit explosion at `at`, remembering where the plane was.
/// Returns ids evicted to make room.
pub fn start_impact(
    explosions: &mut Vec<Explosion>,
    id: u64,
    at: Point,
    plane: &PlanePose,
    now_ms: u64,
    cfg: &ExplosionConfig,
) -> Vec<u64> {
    explosions.push(Explosion {
        id,
        x: at.x,
        y: at.y,
        created_at_ms: now_ms,
        kind: ExplosionKind::Impact {
            plane_at_hit: Point::new(plane.x, plane.y),
        },
        stage: ExplosionStage::Impact,
    });
    enforce_capacity(explosions, cfg.max_live)
}

/// Start the two-phase death sequence at `at`.  The caller is responsible
/// for calling `begin_phase_two` after `death_delay_ms`.
pub fn start_death(
    explosions: &mut Vec<Explosion>,
    id: u64,
    at: Point,
    now_ms: u64,
    cfg: &ExplosionConfig,
) -> Vec<u64> {
    explosions.push(Explosion {
        id,
        x: at.x,
        y: at.y,
        created_at_ms: now_ms,
        kind: ExplosionKind::Death {
            phase_two_at_ms: None,
        },
        stage: ExplosionStage::DamageFlash,
    });
    enforce_capacity(explosions, cfg.max_live)
}

/// Switch a death explosion from the damage flash to the fading blast.
/// Returns `false` if `id` is not a death explosion still in its flash.
pub fn begin_phase_two(explosions: &mut [Explosion], id: u64, now_ms: u64) -> bool {
    let Some(ex) = explosions.iter_mut().find(|e| e.id == id) else {
        return false;
    };
    match ex.kind {
        ExplosionKind::Death {
            phase_two_at_ms: None,
        } => {
            ex.kind = ExplosionKind::Death {
                phase_two_at_ms: Some(now_ms),
            };
            ex.stage = ExplosionStage::DeathFadeIn;
            true
        }
        _ => false,
    }
}

fn stage_at(ex: &Explosion, now_ms: u64, cfg: &ExplosionConfig) -> ExplosionStage {
    match ex.kind {
        ExplosionKind::Impact { .. } => {
            if now_ms.saturating_sub(ex.created_at_ms) >= cfg.impact_duration_ms {
                ExplosionStage::Done
            } else {
                ExplosionStage::Impact
            }
        }
        ExplosionKind::Death {
            phase_two_at_ms: None,
        } => ExplosionStage::DamageFlash,
        ExplosionKind::Death {
            phase_two_at_ms: Some(start),
        } => {
            let elapsed = now_ms.saturating_sub(start);
            if elapsed >= cfg.fade_in_ms + cfg.fade_out_ms {
                ExplosionStage::Done
            } else if elapsed <= cfg.fade_in_ms {
                ExplosionStage::DeathFadeIn
            } else {
                ExplosionStage::DeathFadeOut
            }
        }
    }
}

/// Move every explosion to its stage for `now_ms` and drop finished ones.
pub fn advance(
    explosions: &mut Vec<Explosion>,
    now_ms: u64,
    cfg: &ExplosionConfig,
) -> Vec<ExplosionEvent> {
    let mut events = Vec::new();
    explosions.retain_mut(|ex| {
        ex.stage = stage_at(ex, now_ms, cfg);
        if ex.stage != ExplosionStage::Done {
            return true;
        }
        events.push(match ex.kind {
            ExplosionKind::Impact { .. } => ExplosionEvent::Expired(ex.id),
            ExplosionKind::Death { .. } => ExplosionEvent::DeathComplete(ex.id),
        });
        false
    });
    events
}

/// Where to draw the explosion given the plane's current pose.
pub fn rendered_position(ex: &Explosion, plane: &PlanePose) -> Point {
    match ex.kind {
        ExplosionKind::Impact { plane_at_hit } => Point::new(
            plane.x + (ex.x - plane_at_hit.x),
            plane.y + (ex.y - plane_at_hit.y),
        ),
        ExplosionKind::Death { .. } => Point::new(ex.x, ex.y),
    }
}

/// Opacity in `0..=1`.  Only the death blast fades; everything else is solid.
pub fn alpha(ex: &Explosion, now_ms: u64, cfg: &ExplosionConfig) -> f32 {
    let ExplosionKind::Death {
        phase_two_at_ms: Some(start),
    } = ex.kind
    else {
        return 1.0;
    };
    let elapsed = now_ms.saturating_sub(start) as f32;
    let fade_in = cfg.fade_in_ms as f32;
    let fade_out = cfg.fade_out_ms as f32;
    if elapsed <= fade_in {
        if fade_in == 0.0 {
            1.0
        } else {
            elapsed / fade_in
        }
    } else if fade_out == 0.0 {
        0.0
    } else {
        (1.0 - (elapsed - fade_in) / fade_out).max(0.0)
    }
}

pub fn scale(ex: &Explosion, cfg: &ExplosionConfig) -> f32 {
    match ex.stage {
        ExplosionStage::Impact => cfg.impact_scale,
        ExplosionStage::DamageFlash => cfg.damage_scale,
        ExplosionStage::DeathFadeIn | ExplosionStage::DeathFadeOut => cfg.death_scale,
        ExplosionStage::Done => 0.0,
    }
}

pub fn has_death_sequence(explosions: &[Explosion]) -> bool {
    explosions
        .iter()
        .any(|e| matches!(e.kind, ExplosionKind::Death { .. }))
}
