//! Fixed-timestep simulation tick
//!
//! Advances the world by exactly one tick: the clock, then the player, then
//! every NPC in (faction, id) order. Later actors see earlier actors'
//! already-updated positions, so the order is part of the observable
//! behavior.

use super::behavior::{Neighbors, UpdateCtx, update_npc};
use super::body::Movable;
use super::events::Hooks;
use super::state::World;

/// Input for a single simulation tick (already polled by the host)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Turn key held: rotate the heading counter-clockwise
    pub rotate_left: bool,
    /// Turn key held: rotate the heading clockwise
    pub rotate_right: bool,
}

/// Advance the simulation by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32, hooks: &mut dyn Hooks) {
    world.time += f64::from(dt);
    world.time_ticks += 1;

    update_player(world, input);
    update_npcs(world, hooks);
}

fn update_player(world: &mut World, input: &TickInput) {
    let Some(player) = world.player.as_mut() else {
        return;
    };
    let turn = world.tuning.player_rotation_deg;
    if input.rotate_left {
        player.rotate(-turn);
    }
    if input.rotate_right {
        player.rotate(turn);
    }

    player.refill_actions(&mut world.rng);
    player.body.step(world.tuning.player_speed);
    player.collision_handler(&world.obstacles, world.tuning.escape_speed);
    player.body.update_facing();
}

fn update_npcs(world: &mut World, hooks: &mut dyn Hooks) {
    let now = world.time;
    let World {
        npcs,
        player,
        tuning,
        obstacles,
        ..
    } = world;

    for i in 0..npcs.len() {
        let (before, rest) = npcs.split_at_mut(i);
        let Some((npc, after)) = rest.split_first_mut() else {
            break;
        };
        let was_alive = npc.alive;

        let mut ctx = UpdateCtx {
            now,
            tuning: &*tuning,
            obstacles: obstacles.as_slice(),
            player: player.as_mut(),
        };
        let neighbors = Neighbors {
            before: &*before,
            after: &*after,
        };
        if let Err(err) = update_npc(npc, neighbors, &mut ctx, hooks) {
            // one broken actor must not stall the rest of the tick
            log::warn!("skipping {} {} this tick: {}", npc.kind(), npc.id, err);
        }

        if was_alive && !npc.alive {
            hooks.actor_destroyed(npc.kind(), npc.faction());
        }
    }

    npcs.retain(|npc| npc.alive);
}
