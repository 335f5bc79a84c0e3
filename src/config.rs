/// Gameplay tunables.
///
/// Every value the simulation reads lives here.  The defaults are the
/// shipped balance; a JSON file may override any subset of them at startup
/// (missing keys fall back to the defaults section by section).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Muzzle speed, logical px per second.
    pub speed: f32,
    /// Downward acceleration, px / s².
    pub gravity: f32,
    /// Used to inflate the plane hit-box.
    pub radius: f32,
    pub lifetime_ms: u64,
    pub max_live: usize,
    /// How far past the screen edge a bullet may travel before it is culled.
    pub bounds_margin: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 800.0,
            gravity: 400.0,
            radius: 4.0,
            lifetime_ms: 3000,
            max_live: 50,
            bounds_margin: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Unscaled hit-box size; multiplied by `scale` at test time.
    pub collision_width: f32,
    pub collision_height: f32,
    pub scale: f32,
    pub max_hits: u32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            collision_width: 800.0,
            collision_height: 150.0,
            scale: 0.25,
            max_hits: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub duration_ms: u64,
    /// Altitude band as fractions of the screen height.
    pub min_altitude_frac: f32,
    pub max_altitude_frac: f32,
    /// The plane enters this far left of the screen and leaves this far right.
    pub offscreen_margin: f32,
    pub base_rotation: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            duration_ms: 4000,
            min_altitude_frac: 0.2,
            max_altitude_frac: 0.8,
            offscreen_margin: 200.0,
            base_rotation: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    pub impact_duration_ms: u64,
    pub impact_scale: f32,
    pub max_live: usize,
    pub damage_scale: f32,
    pub death_scale: f32,
    /// Delay between the damage flash and the big death blast.
    pub death_delay_ms: u64,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            impact_duration_ms: 1000,
            impact_scale: 0.1,
            max_live: 10,
            damage_scale: 0.5,
            death_scale: 1.0,
            death_delay_ms: 100,
            fade_in_ms: 100,
            fade_out_ms: 1500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmoConfig {
    pub initial: u32,
}

impl Default for AmmoConfig {
    fn default() -> Self {
        Self { initial: 50 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonConfig {
    /// Distance of the muzzle above the bottom edge; the cannon is centred.
    pub bottom_offset: f32,
}

impl Default for CannonConfig {
    fn default() -> Self {
        Self { bottom_offset: 50.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoilConfig {
    pub min_intensity: f32,
    pub max_intensity: f32,
    /// Half-angle of the kick cone around straight up, radians.
    pub spread: f32,
    /// Fraction of the offset kept per 1/60 s.
    pub damping: f32,
}

impl Default for RecoilConfig {
    fn default() -> Self {
        Self {
            min_intensity: 35.0,
            max_intensity: 45.0,
            spread: std::f32::consts::PI / 6.0,
            damping: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub capacity: usize,
    pub max_name_len: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            max_name_len: 15,
        }
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub bullet: BulletConfig,
    pub plane: PlaneConfig,
    pub flight: FlightConfig,
    pub explosion: ExplosionConfig,
    pub ammo: AmmoConfig,
    pub cannon: CannonConfig,
    pub recoil: RecoilConfig,
    pub ranking: RankingConfig,
}

impl GameConfig {
    /// Read a JSON config file.  Keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
