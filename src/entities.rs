/// Simulation data types.  Nothing here has behaviour.
///
/// Behaviour lives in the component modules (`flight`, `projectiles`,
/// `collision`, `health`, `explosions`, `ledger`, `recoil`) and is composed
/// per frame by `compute`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::schedule::Scheduler;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Logical size of the play area.  Origin top-left, +y points down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

// ── Plane ─────────────────────────────────────────────────────────────────────

/// Where the plane is this frame.  Derived from the flight cycle, never
/// edited directly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanePose {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
}

/// One left-to-right pass across the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightCycle {
    pub start_y: f32,
    pub end_y: f32,
    pub rotation: f32,
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneHealth {
    pub hits_taken: u32,
    pub max_hits: u32,
    pub alive: bool,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// px / s
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub created_at_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    /// Lived longer than the configured lifetime.
    Expired,
    /// Left the screen rectangle plus margin.
    OutOfBounds,
    /// Pushed out by a newer bullet when the live set was full.
    Evicted,
    /// Consumed by a plane hit.
    Hit,
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplosionStage {
    Impact,
    DamageFlash,
    DeathFadeIn,
    DeathFadeOut,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExplosionKind {
    /// Non-lethal hit.  Follows the plane by the offset between the hit
    /// point and this pose.
    Impact { plane_at_hit: Point },
    /// Lethal hit.  `phase_two_at_ms` is set when the big blast begins.
    Death { phase_two_at_ms: Option<u64> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub created_at_ms: u64,
    pub kind: ExplosionKind,
    pub stage: ExplosionStage,
}

// ── Ledgers ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmmoLedger {
    pub remaining: u32,
    pub initial: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreState {
    pub planes_destroyed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Active,
    GameOver,
}

/// One row of the high-score table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: String,
    pub player_name: String,
    pub score: u32,
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    #[serde(default)]
    pub recorded_at_unix_s: u64,
}

// ── Crosshair ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Crosshair {
    /// Last pointer position.
    pub target: Point,
    /// Temporary kick added on top of `target` after a shot.
    pub recoil: Point,
    pub recoiling: bool,
}

// ── Audio cues ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Shot,
    EmptyMagazine,
    ImpactExplosion,
    DeathExplosion,
    EngineStart,
    EngineFadeOut,
    EngineStop,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Everything observable that happened during one `fire` / `tick` / `reset`.
/// The host forwards sounds to the audio sink and may log the rest.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ShotFired {
        /// `None` when the aim vector was degenerate.
        bullet_id: Option<u64>,
        ammo_remaining: u32,
    },
    ShotRejected,
    BulletRemoved {
        id: u64,
        reason: RemovalReason,
    },
    PlaneHit {
        x: f32,
        y: f32,
        hits_taken: u32,
    },
    PlaneDestroyed {
        planes_destroyed: u32,
    },
    PlaneRespawned,
    NewFlightCycle,
    ExplosionStarted {
        id: u64,
    },
    ExplosionRemoved {
        id: u64,
    },
    RoundOver {
        planes_destroyed: u32,
    },
    Sound(SoundCue),
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation.  Owned by the host and passed by `&mut` into
/// `compute`; nothing in the crate keeps global state.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub playfield: Playfield,
    pub cycle: FlightCycle,
    pub pose: PlanePose,
    pub health: PlaneHealth,
    /// Oldest first.
    pub bullets: VecDeque<Bullet>,
    pub explosions: Vec<Explosion>,
    pub ammo: AmmoLedger,
    pub score: ScoreState,
    pub round: RoundState,
    pub crosshair: Crosshair,
    pub timers: Scheduler,
    pub next_id: u64,
    pub last_tick_ms: u64,
    pub frame: u64,
}
