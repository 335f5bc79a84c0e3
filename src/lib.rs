//! Anti-aircraft gunnery: a plane crosses the sky on timed passes, the
//! player fires gravity-bound shells at it from a ground cannon with a
//! limited magazine.
//!
//! The library is the simulation only.  Rendering, audio output and input
//! capture belong to the host (see `main.rs`), which talks to the core
//! through `compute` and the `GameEvent`s it returns.

pub mod audio;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod explosions;
pub mod flight;
pub mod health;
pub mod ledger;
pub mod projectiles;
pub mod ranking;
pub mod recoil;
pub mod schedule;
