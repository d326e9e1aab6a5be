//! World state
//!
//! Everything one simulation run needs: obstacles, the player, the NPC
//! arena, the simulation clock and the seeded RNG. Serializable so a run can
//! be snapshotted and replayed.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, Faction, Npc, Player};
use super::rect::Rect;
use crate::error::ConfigResult;
use crate::tuning::Tuning;

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation clock in seconds; every timer reads this
    pub time: f64,
    /// Ticks run so far
    pub time_ticks: u64,
    pub tuning: Tuning,
    /// Solid tiles
    pub obstacles: Vec<Rect>,
    pub player: Option<Player>,
    /// NPCs sorted by (faction, id), which is also the update order
    pub npcs: Vec<Npc>,
    /// Drives the player's action refills
    pub(crate) rng: Pcg32,
    /// Next actor id
    next_id: u32,
}

impl World {
    /// Create an empty world with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        log::info!("New world (seed {}, {} archetypes)", seed, tuning.archetypes.len());
        Self {
            seed,
            time: 0.0,
            time_ticks: 0,
            tuning,
            obstacles: Vec::new(),
            player: None,
            npcs: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new actor ID (never reused)
    pub fn next_actor_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place (or replace) the player, top-left corner at `pos`
    pub fn spawn_player(&mut self, pos: IVec2) {
        self.player = Some(Player::new(pos, &self.tuning));
    }

    /// Spawn an NPC of the named archetype, top-left corner at `pos`
    pub fn spawn(&mut self, name: &str, pos: IVec2) -> ConfigResult<ActorId> {
        let archetype = self.tuning.archetype(name)?.clone();
        let id = self.next_actor_id();
        let npc = Npc::spawn(id, &archetype, pos, &self.tuning, self.time);
        log::debug!("spawned {} {} at {}", archetype.name, id, pos);
        self.npcs.push(npc);
        self.normalize_order();
        Ok(id)
    }

    pub fn add_obstacle(&mut self, rect: Rect) {
        self.obstacles.push(rect);
    }

    /// Solid tile at grid cell (`col`, `row`)
    pub fn add_obstacle_tile(&mut self, col: i32, row: i32) {
        let size = self.tuning.tile_size;
        self.add_obstacle(Rect::new(col * size, row * size, size, size));
    }

    /// Ring of solid tiles around a `cols` x `rows` room
    pub fn add_walls(&mut self, cols: i32, rows: i32) {
        for col in 0..cols {
            self.add_obstacle_tile(col, 0);
            self.add_obstacle_tile(col, rows - 1);
        }
        for row in 1..rows - 1 {
            self.add_obstacle_tile(0, row);
            self.add_obstacle_tile(cols - 1, row);
        }
    }

    /// Look up a living NPC; stale handles resolve to `None`
    pub fn npc(&self, id: ActorId) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.id == id && npc.alive)
    }

    pub fn npc_mut(&mut self, id: ActorId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|npc| npc.id == id && npc.alive)
    }

    pub fn count(&self, faction: Faction) -> usize {
        self.npcs
            .iter()
            .filter(|npc| npc.alive && npc.faction() == faction)
            .count()
    }

    /// Keep NPCs in update order: bad, good, neutral; by id within a group
    pub fn normalize_order(&mut self) {
        self.npcs.sort_by_key(|npc| (npc.faction(), npc.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_spawn_orders_by_group_then_id() {
        let mut world = World::new(1, Tuning::default());
        let postman = world.spawn("Postman", IVec2::new(0, 0)).unwrap();
        let damsel = world.spawn("Damsel", IVec2::new(0, 0)).unwrap();
        let skeleton = world.spawn("Skeleton", IVec2::new(0, 0)).unwrap();
        let minotaur = world.spawn("Minotaur", IVec2::new(0, 0)).unwrap();

        let order: Vec<ActorId> = world.npcs.iter().map(|n| n.id).collect();
        assert_eq!(order, vec![skeleton, minotaur, damsel, postman]);
        assert_eq!(world.count(Faction::Bad), 2);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut world = World::new(1, Tuning::default());
        let first = world.spawn("Skeleton", IVec2::ZERO).unwrap();
        world.npcs.clear();
        let second = world.spawn("Skeleton", IVec2::ZERO).unwrap();
        assert_ne!(first, second);
        assert!(world.npc(first).is_none());
        assert!(world.npc(second).is_some());
    }

    #[test]
    fn test_spawn_unknown_archetype() {
        let mut world = World::new(1, Tuning::default());
        assert!(matches!(
            world.spawn("Dragon", IVec2::ZERO),
            Err(ConfigError::UnknownArchetype(_))
        ));
        assert!(world.npcs.is_empty());
    }

    #[test]
    fn test_walls_enclose_room() {
        let mut world = World::new(1, Tuning::default());
        world.add_walls(10, 8);
        assert_eq!(world.obstacles.len(), 2 * 10 + 2 * 6);
        assert!(world.obstacles.contains(&Rect::new(9 * 16, 7 * 16, 16, 16)));
    }
}
