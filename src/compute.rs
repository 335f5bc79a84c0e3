/// Per-frame game logic.
///
/// The host owns one `GameState` and drives it with three entry points:
/// `apply` for queued player commands (between frames), `tick` once per
/// rendered frame, and `reset` for a new round.  Each returns the
/// `GameEvent`s it produced.  All randomness comes through the injected
/// `rng`, and all time through `now_ms`, so a seeded RNG plus a scripted
/// clock replays identically.

use std::collections::VecDeque;

use rand::Rng;

use crate::collision;
use crate::config::GameConfig;
use crate::entities::{
    AmmoLedger, Crosshair, GameEvent, GameState, PlaneHealth, Playfield, Point, RemovalReason,
    RoundState, ScoreState, SoundCue,
};
use crate::explosions::{self, ExplosionEvent};
use crate::flight;
use crate::health::HitOutcome;
use crate::ledger::FireOutcome;
use crate::projectiles::{self, Bounds, SpawnOutcome};
use crate::recoil;
use crate::schedule::{Scheduler, TimerEvent};

/// Longest step fed to the integrator.  A stalled host resumes with a
/// short step instead of teleporting bullets through the plane.
pub const MAX_FRAME_MS: u64 = 100;

/// Player intent, queued by the input layer and applied between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    AimAt(Point),
    FireAt(Point),
    Reset,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Fresh round: full magazine, healthy plane starting its first pass.
pub fn init_state(
    config: GameConfig,
    playfield: Playfield,
    now_ms: u64,
    rng: &mut impl Rng,
) -> GameState {
    let cycle = flight::new_cycle(playfield, &config.flight, now_ms, rng);
    let pose = flight::pose_at(&cycle, playfield, &config.flight, config.plane.scale, now_ms);
    let ammo = AmmoLedger::new(config.ammo.initial);
    let mut state = GameState {
        health: PlaneHealth::new(config.plane.max_hits),
        round: RoundState::for_ammo(&ammo),
        ammo,
        score: ScoreState::default(),
        cycle,
        pose,
        bullets: VecDeque::new(),
        explosions: Vec::new(),
        crosshair: Crosshair {
            target: Point::new(playfield.width / 2.0, playfield.height / 2.0),
            ..Crosshair::default()
        },
        timers: Scheduler::new(),
        next_id: 1,
        last_tick_ms: now_ms,
        frame: 0,
        playfield,
        config,
    };
    state
        .timers
        .schedule(now_ms + state.cycle.duration_ms, TimerEvent::CycleComplete);
    state
}

/// Muzzle position: bottom centre, raised by the configured offset.
pub fn cannon_origin(state: &GameState) -> Point {
    Point::new(
        state.playfield.width / 2.0,
        state.playfield.height - state.config.cannon.bottom_offset,
    )
}

fn next_id(state: &mut GameState) -> u64 {
    let id = state.next_id;
    state.next_id += 1;
    id
}

// ── Input-driven transitions ─────────────────────────────────────────────────

pub fn apply(
    state: &mut GameState,
    command: Command,
    now_ms: u64,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    match command {
        Command::AimAt(p) => {
            aim(state, p);
            Vec::new()
        }
        Command::FireAt(p) => {
            aim(state, p);
            fire(state, p, now_ms, rng)
        }
        Command::Reset => reset(state, now_ms, rng),
    }
}

pub fn aim(state: &mut GameState, target: Point) {
    state.crosshair.target = target;
}

/// Spend one round and launch a bullet from the cannon towards `target`.
///
/// An empty magazine rejects the shot outright.  A degenerate aim (target on
/// the muzzle) still spends the round but launches nothing.
pub fn fire(
    state: &mut GameState,
    target: Point,
    now_ms: u64,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    let remaining = match state.ammo.fire() {
        FireOutcome::Empty => {
            state.round = RoundState::GameOver;
            events.push(GameEvent::ShotRejected);
            events.push(GameEvent::Sound(SoundCue::EmptyMagazine));
            return events;
        }
        FireOutcome::Fired { remaining } => remaining,
    };

    let id = next_id(state);
    let origin = cannon_origin(state);
    let bullet_id = match projectiles::spawn(
        &mut state.bullets,
        id,
        origin,
        target,
        now_ms,
        &state.config.bullet,
    ) {
        SpawnOutcome::Spawned { id, evicted } => {
            events.extend(evicted.into_iter().map(|id| GameEvent::BulletRemoved {
                id,
                reason: RemovalReason::Evicted,
            }));
            Some(id)
        }
        SpawnOutcome::Degenerate => {
            tracing::debug!(x = target.x, y = target.y, "aim on the muzzle, no bullet");
            None
        }
    };

    recoil::kick(&mut state.crosshair, &state.config.recoil, rng);
    events.push(GameEvent::Sound(SoundCue::Shot));
    events.push(GameEvent::ShotFired {
        bullet_id,
        ammo_remaining: remaining,
    });
    update_round(state, &mut events);
    events
}

// ── Lifecycle helpers ────────────────────────────────────────────────────────

fn start_cycle(state: &mut GameState, now_ms: u64, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    state.cycle = flight::new_cycle(state.playfield, &state.config.flight, now_ms, rng);
    state.pose = flight::pose_at(
        &state.cycle,
        state.playfield,
        &state.config.flight,
        state.config.plane.scale,
        now_ms,
    );
    state.timers.cancel(TimerEvent::CycleComplete);
    state
        .timers
        .schedule(now_ms + state.cycle.duration_ms, TimerEvent::CycleComplete);
    tracing::trace!(
        start_y = state.cycle.start_y,
        end_y = state.cycle.end_y,
        "new flight cycle"
    );
    events.push(GameEvent::Sound(SoundCue::EngineStart));
    events.push(GameEvent::NewFlightCycle);
}

fn respawn(state: &mut GameState, now_ms: u64, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    state.health.reset();
    start_cycle(state, now_ms, rng, events);
    tracing::debug!("plane respawned");
    events.push(GameEvent::PlaneRespawned);
}

fn update_round(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let next = RoundState::for_ammo(&state.ammo);
    if !state.round.is_over() && next.is_over() {
        tracing::info!(planes_destroyed = state.score.planes_destroyed, "round over");
        events.push(GameEvent::RoundOver {
            planes_destroyed: state.score.planes_destroyed,
        });
    }
    state.round = next;
}

fn register_hit(
    state: &mut GameState,
    hit: collision::Hit,
    now_ms: u64,
    events: &mut Vec<GameEvent>,
) {
    let at = Point::new(hit.x, hit.y);
    match state.health.take_hit() {
        HitOutcome::Ignored => {}
        HitOutcome::Damaged { hits_taken } => {
            let id = next_id(state);
            let evicted = explosions::start_impact(
                &mut state.explosions,
                id,
                at,
                &state.pose,
                now_ms,
                &state.config.explosion,
            );
            events.extend(evicted.into_iter().map(|id| GameEvent::ExplosionRemoved { id }));
            events.push(GameEvent::ExplosionStarted { id });
            events.push(GameEvent::Sound(SoundCue::ImpactExplosion));
            events.push(GameEvent::PlaneHit {
                x: hit.x,
                y: hit.y,
                hits_taken,
            });
        }
        HitOutcome::Destroyed => {
            events.push(GameEvent::PlaneHit {
                x: hit.x,
                y: hit.y,
                hits_taken: state.health.hits_taken,
            });
            let planes_destroyed = state.score.record_destroyed();
            tracing::info!(planes_destroyed, "plane destroyed");

            // The wreck stays put until the death sequence completes.
            state.timers.cancel(TimerEvent::CycleComplete);
            let id = next_id(state);
            let wreck = Point::new(state.pose.x, state.pose.y);
            let evicted = explosions::start_death(
                &mut state.explosions,
                id,
                wreck,
                now_ms,
                &state.config.explosion,
            );
            state.timers.schedule(
                now_ms + state.config.explosion.death_delay_ms,
                TimerEvent::DeathPhaseTwo { explosion_id: id },
            );
            events.extend(evicted.into_iter().map(|id| GameEvent::ExplosionRemoved { id }));
            events.push(GameEvent::ExplosionStarted { id });
            events.push(GameEvent::Sound(SoundCue::EngineStop));
            events.push(GameEvent::Sound(SoundCue::ImpactExplosion));
            events.push(GameEvent::PlaneDestroyed { planes_destroyed });
        }
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation to `now_ms`.
///
/// Order: due timers → plane motion → bullet integration → collision →
/// bullet expiry → explosion stages → crosshair → round state.
///
/// Integration steps longer than `MAX_FRAME_MS` are clamped; bullet
/// lifetimes and explosion stages still follow wall-clock `now_ms`.
/// Timers act at their own deadline, not at the frame that noticed them.
pub fn tick(state: &mut GameState, now_ms: u64, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt_ms = now_ms.saturating_sub(state.last_tick_ms).min(MAX_FRAME_MS);
    let dt_secs = dt_ms as f32 / 1000.0;
    state.last_tick_ms = state.last_tick_ms.max(now_ms);
    state.frame += 1;

    // ── 1. Timers ─────────────────────────────────────────────────────────────
    for (due_ms, timer) in state.timers.drain_due(now_ms) {
        match timer {
            TimerEvent::CycleComplete => {
                if state.health.alive {
                    events.push(GameEvent::Sound(SoundCue::EngineFadeOut));
                    // After a long stall, restart from now rather than replay missed passes.
                    let start = if now_ms - due_ms >= state.cycle.duration_ms {
                        now_ms
                    } else {
                        due_ms
                    };
                    start_cycle(state, start, rng, &mut events);
                }
            }
            TimerEvent::DeathPhaseTwo { explosion_id } => {
                if explosions::begin_phase_two(&mut state.explosions, explosion_id, due_ms) {
                    events.push(GameEvent::Sound(SoundCue::DeathExplosion));
                }
            }
        }
    }

    // ── 2. Plane motion ───────────────────────────────────────────────────────
    if state.health.alive {
        state.pose = flight::pose_at(
            &state.cycle,
            state.playfield,
            &state.config.flight,
            state.config.plane.scale,
            now_ms,
        );
    }

    // ── 3. Bullets ────────────────────────────────────────────────────────────
    projectiles::integrate(&mut state.bullets, dt_secs, state.config.bullet.gravity);

    // ── 4. Collision (at most one hit per frame) ──────────────────────────────
    if let Some(hit) = collision::detect(
        &mut state.bullets,
        &state.pose,
        &state.health,
        &state.config.plane,
        state.config.bullet.radius,
    ) {
        events.push(GameEvent::BulletRemoved {
            id: hit.bullet_id,
            reason: RemovalReason::Hit,
        });
        register_hit(state, hit, now_ms, &mut events);
    }

    // ── 5. Expiry ─────────────────────────────────────────────────────────────
    let bounds = Bounds::around(state.playfield, state.config.bullet.bounds_margin);
    for removal in projectiles::expire(
        &mut state.bullets,
        now_ms,
        &bounds,
        state.config.bullet.lifetime_ms,
    ) {
        events.push(GameEvent::BulletRemoved {
            id: removal.id,
            reason: removal.reason,
        });
    }

    // ── 6. Explosions ─────────────────────────────────────────────────────────
    for ev in explosions::advance(&mut state.explosions, now_ms, &state.config.explosion) {
        match ev {
            ExplosionEvent::Expired(id) => events.push(GameEvent::ExplosionRemoved { id }),
            ExplosionEvent::DeathComplete(id) => {
                events.push(GameEvent::ExplosionRemoved { id });
                respawn(state, now_ms, rng, &mut events);
            }
        }
    }

    // ── 7. Crosshair ──────────────────────────────────────────────────────────
    recoil::settle(&mut state.crosshair, &state.config.recoil, dt_ms);

    // ── 8. Round ──────────────────────────────────────────────────────────────
    update_round(state, &mut events);

    events
}

/// True once the round is over and nothing in flight can still change the
/// score: no live bullets and no death sequence playing out.
pub fn round_settled(state: &GameState) -> bool {
    state.round.is_over()
        && state.bullets.is_empty()
        && !explosions::has_death_sequence(&state.explosions)
}

/// Start a new round.  Safe to call repeatedly; also the only way out of
/// `GameOver`.
pub fn reset(state: &mut GameState, now_ms: u64, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.ammo.reset();
    state.score.reset();
    state.health = PlaneHealth::new(state.config.plane.max_hits);
    state.bullets.clear();
    state.explosions.clear();
    state.timers.clear();
    state.crosshair.recoil = Point::default();
    state.crosshair.recoiling = false;
    state.last_tick_ms = now_ms;
    state.round = RoundState::for_ammo(&state.ammo);
    start_cycle(state, now_ms, rng, &mut events);
    events
}
