//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (timers read the simulation clock, never the wall clock)
//! - Seeded RNG only
//! - Stable iteration order (by faction, then actor ID)
//! - No rendering or platform dependencies

pub mod actor;
pub mod behavior;
pub mod body;
pub mod brain;
pub mod collision;
pub mod events;
pub mod radar;
pub mod rect;
pub mod state;
pub mod tick;
pub mod timer;

pub use actor::{ActorId, EatenPower, Faction, Npc, Player, PlayerAction, Target};
pub use behavior::{Neighbors, UpdateCtx, update_npc};
pub use body::{Body, Facing, Movable};
pub use brain::{Brain, NpcState, Sighting};
pub use collision::{CollisionReport, Contact, Side, detect, reflect_compass, reflect_velocity};
pub use events::{EventLog, GameEvent, Hooks, NoHooks};
pub use radar::Radar;
pub use rect::Rect;
pub use state::World;
pub use tick::{TickInput, tick};
pub use timer::{Timer, TimerKind};
