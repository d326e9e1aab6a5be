//! Tile Tussle - top-down tile arena with autonomous townsfolk and monsters
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, NPC brains, world state)
//! - `tuning`: Data-driven game balance and archetypes
//! - `error`: Typed errors for the simulation and for tuning files

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, SimError};
pub use tuning::Tuning;

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one pixel step per tick at speed 1)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Grid granularity
    pub const TILE_SIZE: i32 = 16;

    /// Humanoid actor footprint
    pub const ENTITY_WIDTH: i32 = 16;
    pub const ENTITY_HEIGHT: i32 = 20;
    /// Humanoid hitbox width change (narrower than the sprite)
    pub const ENTITY_HITBOX_OFFSET: i32 = -4;

    /// Speeds in pixels per step
    pub const DEFAULT_SPEED: i32 = 1;
    pub const FAST_SPEED: i32 = 3;
    pub const PLAYER_SPEED: i32 = 2;
    pub const ESCAPE_SPEED: i32 = 1;
}

/// Unit heading from `from` to `to` in screen space (y down).
///
/// The angle is measured clockwise from straight up, so the heading is
/// `(sin a, -cos a)`. Coincident points have no heading.
#[inline]
pub fn heading_towards(from: IVec2, to: IVec2) -> Vec2 {
    let delta = (to - from).as_vec2();
    if delta == Vec2::ZERO {
        return Vec2::ZERO;
    }
    let angle = delta.x.atan2(-delta.y);
    Vec2::new(angle.sin(), -angle.cos())
}
