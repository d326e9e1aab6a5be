//! Actors: the player and the NPC arena entries
//!
//! NPCs refer to each other through [`ActorId`] handles, never by reference.
//! Ids are allocated monotonically and never reused, so a handle to a dead
//! actor simply fails to resolve.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{Body, Movable};
use super::brain::Brain;
use super::radar::Radar;
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::tuning::{Archetype, Tuning};

/// Stable handle into the world's NPC list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whoever an NPC is currently reacting to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Player,
    Actor(ActorId),
}

/// Group an NPC belongs to. Groups double as collision/radar candidate sets
/// and fix the update order within a tick (bad, then good, then neutral).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Bad,
    Good,
    Neutral,
}

impl Faction {
    /// Update order within a tick
    pub const ORDER: [Faction; 3] = [Faction::Bad, Faction::Good, Faction::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Bad => "bad",
            Faction::Good => "good",
            Faction::Neutral => "neutral",
        }
    }
}

/// Power the player gains from consuming an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EatenPower {
    #[default]
    EmptyStomach,
    BasicSkeleton,
    Damsel,
    Minotaur,
}

/// What the player does to an NPC that touches them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Consume,
    Destroy,
    Throw,
    /// Empty queue; does nothing
    None,
}

impl PlayerAction {
    /// Actions the queue refills from
    pub const POOL: [PlayerAction; 3] = [
        PlayerAction::Consume,
        PlayerAction::Destroy,
        PlayerAction::Throw,
    ];
}

/// An autonomous actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub id: ActorId,
    /// Stats and reactions this NPC was spawned from
    pub archetype: Archetype,
    pub body: Body,
    pub brain: Brain,
    pub radar: Radar,
    /// Walking speed, resolved against the tuning at spawn
    pub speed: i32,
    pub alive: bool,
}

impl Npc {
    /// Build an NPC from its archetype, top-left corner at `pos`
    pub fn spawn(id: ActorId, archetype: &Archetype, pos: IVec2, tuning: &Tuning, now: f64) -> Self {
        let body = Body::new(pos, archetype.size, archetype.hitbox_inflate);
        Self {
            id,
            archetype: archetype.clone(),
            radar: Radar::around(&body.rect, tuning.radar_inflation()),
            body,
            brain: Brain::new(now),
            speed: archetype.speed.unwrap_or(tuning.default_speed),
            alive: true,
        }
    }

    /// Archetype name (also the score key)
    #[inline]
    pub fn kind(&self) -> &str {
        &self.archetype.name
    }

    #[inline]
    pub fn faction(&self) -> Faction {
        self.archetype.faction
    }

    /// Remove from play; the world drops dead actors at the end of the tick
    pub fn die(&mut self) {
        if self.alive {
            log::debug!("{} {} died", self.kind(), self.id);
        }
        self.alive = false;
    }
}

impl Movable for Npc {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// The player-controlled actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Pending reactions for NPCs that touch the player (front pops first)
    actions: VecDeque<PlayerAction>,
    max_actions: usize,
    pub eaten_power: EatenPower,
}

impl Player {
    pub fn new(pos: IVec2, tuning: &Tuning) -> Self {
        let body = Body::new(pos, IVec2::new(ENTITY_WIDTH, ENTITY_HEIGHT), IVec2::new(2, 0))
            .with_hitbox_offset(IVec2::new(1, 0));
        Self {
            body,
            actions: VecDeque::with_capacity(tuning.action_queue_len),
            max_actions: tuning.action_queue_len,
            eaten_power: EatenPower::EmptyStomach,
        }
    }

    /// Rotate the heading by `degrees` (positive turns clockwise on screen)
    pub fn rotate(&mut self, degrees: f32) {
        let turn = Vec2::from_angle(degrees.to_radians());
        self.body.compass = turn.rotate(self.body.compass);
    }

    /// Top the queue up by one random action if below its bound
    pub fn refill_actions(&mut self, rng: &mut impl Rng) {
        if self.actions.len() < self.max_actions {
            let action = PlayerAction::POOL[rng.random_range(0..PlayerAction::POOL.len())];
            self.actions.push_back(action);
        }
    }

    /// Next reaction; an empty queue yields [`PlayerAction::None`]
    pub fn pop_action(&mut self) -> PlayerAction {
        self.actions.pop_front().unwrap_or(PlayerAction::None)
    }

    /// Replace the queue (tests and scripted setups)
    pub fn set_actions(&mut self, actions: impl IntoIterator<Item = PlayerAction>) {
        self.actions = actions.into_iter().collect();
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &PlayerAction> {
        self.actions.iter()
    }

    /// Swallow an NPC's power; archetypes without one can't be consumed
    pub fn feed(&mut self, kind: &str, power: Option<EatenPower>) -> SimResult<()> {
        let power = power.ok_or_else(|| SimError::NoEatenPower {
            kind: kind.to_string(),
        })?;
        log::debug!("player consumed {} and gained {:?}", kind, power);
        self.eaten_power = power;
        Ok(())
    }
}

impl Movable for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
