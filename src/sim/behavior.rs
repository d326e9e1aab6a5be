//! Per-state movement policies and the NPC per-tick update
//!
//! One NPC update runs, in order: radar recenter, radar evaluation, the
//! active state's movement policy, obstacle collision, contact rule, facing.
//! Other actors are only visible through [`Neighbors`], which exposes their
//! live positions (earlier actors this tick have already moved).

use super::actor::{ActorId, Faction, Npc, Player, PlayerAction, Target};
use super::body::{Body, Movable};
use super::brain::{NpcState, Sighting};
use super::collision;
use super::events::Hooks;
use super::rect::Rect;
use crate::error::{SimError, SimResult};
use crate::tuning::{ContactRule, Reaction, Tuning, Watch};

/// Every other NPC, split around the one being updated
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    pub before: &'a [Npc],
    pub after: &'a [Npc],
}

impl Neighbors<'static> {
    pub const EMPTY: Self = Neighbors {
        before: &[],
        after: &[],
    };
}

impl<'a> Neighbors<'a> {
    /// Living neighbors
    pub fn iter(self) -> impl Iterator<Item = &'a Npc> {
        self.before
            .iter()
            .chain(self.after.iter())
            .filter(|npc| npc.alive)
    }

    pub fn of_faction(self, faction: Faction) -> impl Iterator<Item = &'a Npc> {
        self.iter().filter(move |npc| npc.faction() == faction)
    }

    /// Resolve a handle; dead or unknown ids come back as `None`
    pub fn get(self, id: ActorId) -> Option<&'a Npc> {
        self.iter().find(|npc| npc.id == id)
    }
}

/// Everything outside the NPC that its update reads or touches
pub struct UpdateCtx<'a> {
    pub now: f64,
    pub tuning: &'a Tuning,
    pub obstacles: &'a [Rect],
    pub player: Option<&'a mut Player>,
}

impl UpdateCtx<'_> {
    fn player_body(&self) -> Option<&Body> {
        self.player.as_deref().map(|p| &p.body)
    }
}

/// Run one tick for one NPC
pub fn update_npc(
    npc: &mut Npc,
    neighbors: Neighbors<'_>,
    ctx: &mut UpdateCtx<'_>,
    hooks: &mut dyn Hooks,
) -> SimResult<()> {
    if !npc.alive {
        return Ok(());
    }
    let now = ctx.now;

    npc.radar.recenter(npc.body.center());
    let alert = scan(npc, npc.archetype.alert, ctx, neighbors);
    let engage = scan(npc, npc.archetype.engage, ctx, neighbors);
    npc.brain.evaluate(now, alert, engage);

    move_by_state(npc, neighbors, ctx)?;

    if npc.alive && npc.brain.state() != NpcState::Thrown {
        let report = npc.collision_handler(ctx.obstacles, ctx.tuning.escape_speed);
        if report.detected() {
            npc.brain.restart_patrol_timer(now);
            if npc.brain.state() == NpcState::Charging {
                log::debug!("{} {} charge stopped by obstacle", npc.kind(), npc.id);
                npc.brain.set_default(now);
            }
        }
    }

    if npc.alive {
        apply_contact(npc, neighbors, ctx, hooks);
    }

    npc.body.update_facing();
    Ok(())
}

/// Run one radar reaction
fn scan(
    npc: &Npc,
    reaction: Option<Reaction>,
    ctx: &UpdateCtx<'_>,
    neighbors: Neighbors<'_>,
) -> Option<Sighting> {
    let reaction = reaction?;
    let target = match reaction.watch {
        Watch::Player => {
            let player = ctx.player_body()?;
            npc.radar.sees(&player.hitbox).then_some(Target::Player)?
        }
        Watch::Faction(faction) => {
            let candidates = neighbors
                .of_faction(faction)
                .map(|other| (other.id, other.body.hitbox));
            Target::Actor(npc.radar.nearest(npc.body.center(), candidates)?)
        }
    };
    Some(Sighting {
        state: reaction.state,
        target,
    })
}

/// Snapshot of the target's body, `None` if it is gone
fn resolve_target(npc: &Npc, ctx: &UpdateCtx<'_>, neighbors: Neighbors<'_>) -> SimResult<Option<Body>> {
    let target = npc.brain.target.ok_or(SimError::TargetNotSet {
        state: npc.brain.state(),
    })?;
    Ok(match target {
        Target::Player => ctx.player_body().copied(),
        Target::Actor(id) => neighbors.get(id).map(|other| other.body),
    })
}

fn move_by_state(npc: &mut Npc, neighbors: Neighbors<'_>, ctx: &UpdateCtx<'_>) -> SimResult<()> {
    match npc.brain.state() {
        NpcState::Default => {}
        NpcState::Patrol => patrol(npc, ctx),
        NpcState::Attack | NpcState::Follow => approach(npc, ctx, neighbors)?,
        NpcState::Flee => flee(npc, ctx, neighbors)?,
        NpcState::Thrown => thrown(npc, ctx)?,
        NpcState::Tracking => track(npc, ctx, neighbors)?,
        NpcState::Charging => {}
    }

    // tracking may have just promoted to a charge
    if npc.brain.state() == NpcState::Charging {
        charge(npc, ctx)?;
    }
    Ok(())
}

/// Walk along the compass; turn around every patrol interval
fn patrol(npc: &mut Npc, ctx: &UpdateCtx<'_>) {
    if npc.brain.patrol_due(ctx.now, ctx.tuning.patrol_interval_secs) {
        let compass = &mut npc.body.compass;
        compass.x = if compass.x == 0.0 { 1.0 } else { -compass.x.signum() };
        compass.y = 0.0;
        npc.brain.restart_patrol_timer(ctx.now);
    }
    npc.body.step(npc.speed);
}

/// Attack and Follow: close in on the target and mirror its heading
fn approach(npc: &mut Npc, ctx: &UpdateCtx<'_>, neighbors: Neighbors<'_>) -> SimResult<()> {
    let Some(target) = resolve_target(npc, ctx, neighbors)? else {
        npc.brain.set_patrol(ctx.now);
        return Ok(());
    };
    npc.body.step_towards(target.rect.top_left(), npc.speed);
    npc.body.compass = target.compass;
    Ok(())
}

/// Run the way the target is looking, once it looks at us
fn flee(npc: &mut Npc, ctx: &UpdateCtx<'_>, neighbors: Neighbors<'_>) -> SimResult<()> {
    let Some(target) = resolve_target(npc, ctx, neighbors)? else {
        npc.brain.set_patrol(ctx.now);
        return Ok(());
    };
    if npc.body.is_faced_by(&target) {
        npc.body.compass = target.compass;
    }
    npc.body.step(npc.speed);
    Ok(())
}

/// Fly along the throw heading; any obstacle is fatal
fn thrown(npc: &mut Npc, ctx: &UpdateCtx<'_>) -> SimResult<()> {
    if npc.brain.thrown_elapsed(ctx.now, ctx.tuning.thrown_duration_secs)? {
        npc.brain.set_default(ctx.now);
        return Ok(());
    }
    if collision::detect(&npc.body, ctx.obstacles).detected() {
        log::debug!("{} {} thrown into an obstacle", npc.kind(), npc.id);
        npc.die();
        return Ok(());
    }
    npc.body.step(ctx.tuning.fast_speed);
    Ok(())
}

/// Stand still, turn towards the target, then lock the heading and charge
fn track(npc: &mut Npc, ctx: &UpdateCtx<'_>, neighbors: Neighbors<'_>) -> SimResult<()> {
    let Some(target) = resolve_target(npc, ctx, neighbors)? else {
        npc.brain.set_patrol(ctx.now);
        return Ok(());
    };
    npc.body.face_towards(target.center());
    if npc.brain.tracking_elapsed(ctx.now, ctx.tuning.tracking_dwell_secs)? {
        let heading = npc.body.compass;
        npc.brain.set_charging(ctx.now, heading);
    }
    Ok(())
}

/// Straight-line rush on the locked heading
fn charge(npc: &mut Npc, ctx: &UpdateCtx<'_>) -> SimResult<()> {
    if npc.brain.charge_elapsed(ctx.now, ctx.tuning.charge_duration_secs)? {
        npc.brain.set_default(ctx.now);
        return Ok(());
    }
    npc.body.compass = npc.brain.charge_compass;
    npc.body.step(ctx.tuning.fast_speed);
    Ok(())
}

fn apply_contact(npc: &mut Npc, neighbors: Neighbors<'_>, ctx: &mut UpdateCtx<'_>, hooks: &mut dyn Hooks) {
    let now = ctx.now;
    let touching_player = ctx
        .player_body()
        .is_some_and(|player| npc.body.rect.intersects(&player.hitbox));

    match npc.archetype.contact.clone() {
        ContactRule::PlayerActions => {
            if !touching_player || npc.brain.state() == NpcState::Thrown {
                return;
            }
            let Some(player) = ctx.player.as_deref_mut() else {
                return;
            };
            match player.pop_action() {
                PlayerAction::Destroy => npc.die(),
                PlayerAction::Consume => {
                    npc.die();
                    if let Err(err) = player.feed(&npc.archetype.name, npc.archetype.eaten_power) {
                        log::warn!("{} {}: {}", npc.kind(), npc.id, err);
                    }
                }
                PlayerAction::Throw => {
                    if npc.brain.set_thrown(now) {
                        npc.body.compass = player.body.compass;
                    }
                }
                PlayerAction::None => {}
            }
        }
        ContactRule::DiesTouching(faction) => {
            let rect = npc.body.rect;
            if neighbors
                .of_faction(faction)
                .any(|other| other.body.rect.intersects(&rect))
            {
                npc.die();
            }
        }
        ContactRule::Hint(text) => {
            if touching_player {
                hooks.show_hint(npc.id, &text);
            } else {
                hooks.try_close_hint(npc.id);
            }
        }
        ContactRule::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{EventLog, NoHooks};
    use crate::sim::actor::EatenPower;
    use crate::tuning::Archetype;
    use glam::{IVec2, Vec2};

    fn npc(name: &str, id: u32, pos: IVec2, tuning: &Tuning) -> Npc {
        let archetype = tuning.archetype(name).unwrap();
        Npc::spawn(ActorId(id), archetype, pos, tuning, 0.0)
    }

    fn ctx<'a>(now: f64, tuning: &'a Tuning, obstacles: &'a [Rect], player: Option<&'a mut Player>) -> UpdateCtx<'a> {
        UpdateCtx {
            now,
            tuning,
            obstacles,
            player,
        }
    }

    #[test]
    fn test_first_update_wakes_to_patrol() {
        let tuning = Tuning::default();
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        let mut ctx = ctx(0.1, &tuning, &[], None);
        update_npc(&mut skeleton, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(skeleton.brain.state(), NpcState::Patrol);
        assert_eq!(skeleton.body.rect.x, 101);
    }

    #[test]
    fn test_attack_steps_towards_target() {
        let tuning = Tuning::default();
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        let mut damsel = npc("Damsel", 2, IVec2::new(140, 90), &tuning);
        damsel.body.compass = Vec2::new(0.0, -1.0);
        let others = [damsel];
        let neighbors = Neighbors {
            before: &[],
            after: &others,
        };

        let mut ctx = ctx(0.1, &tuning, &[], None);
        update_npc(&mut skeleton, neighbors, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(skeleton.brain.state(), NpcState::Attack);
        assert_eq!(skeleton.brain.target, Some(Target::Actor(ActorId(2))));
        assert_eq!(skeleton.body.rect.top_left(), IVec2::new(101, 99));
        assert_eq!(skeleton.body.compass, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_dead_target_sends_back_to_patrol() {
        let tuning = Tuning::default();
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        skeleton.brain.set_attack(0.0);
        // handle to an actor that no longer exists
        skeleton.brain.target = Some(Target::Actor(ActorId(99)));

        let mut ctx = ctx(0.1, &tuning, &[], None);
        move_by_state(&mut skeleton, Neighbors::EMPTY, &mut ctx).unwrap();
        assert_eq!(skeleton.brain.state(), NpcState::Patrol);
    }

    #[test]
    fn test_targeted_state_without_target_is_an_error() {
        let tuning = Tuning::default();
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        skeleton.brain.set_follow(0.0);
        let mut ctx = ctx(0.1, &tuning, &[], None);
        assert_eq!(
            move_by_state(&mut skeleton, Neighbors::EMPTY, &mut ctx),
            Err(SimError::TargetNotSet {
                state: NpcState::Follow
            })
        );
    }

    #[test]
    fn test_flee_copies_heading_when_faced() {
        let tuning = Tuning::default();
        let mut player = Player::new(IVec2::new(60, 100), &tuning);
        player.body.compass = Vec2::new(1.0, 0.0);
        player.body.update_facing();

        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        skeleton.body.compass = Vec2::new(-1.0, 0.0);
        let mut ctx = ctx(0.1, &tuning, &[], Some(&mut player));
        update_npc(&mut skeleton, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();

        assert_eq!(skeleton.brain.state(), NpcState::Flee);
        assert_eq!(skeleton.body.compass, Vec2::new(1.0, 0.0));
        assert_eq!(skeleton.body.rect.x, 101);
    }

    #[test]
    fn test_thrown_into_wall_dies() {
        let tuning = Tuning::default();
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        skeleton.brain.set_thrown(0.0);
        let wall = [Rect::new(110, 96, 16, 16)];
        let mut ctx = ctx(0.1, &tuning, &wall, None);
        update_npc(&mut skeleton, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert!(!skeleton.alive);
    }

    #[test]
    fn test_thrown_times_out_to_default() {
        let tuning = Tuning::default();
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        skeleton.brain.set_thrown(0.0);
        let mut ctx = ctx(0.5, &tuning, &[], None);
        move_by_state(&mut skeleton, Neighbors::EMPTY, &mut ctx).unwrap();
        assert_eq!(skeleton.body.rect.x, 103);

        ctx.now = 1.0;
        move_by_state(&mut skeleton, Neighbors::EMPTY, &mut ctx).unwrap();
        assert_eq!(skeleton.brain.state(), NpcState::Default);
        assert!(skeleton.alive);
    }

    #[test]
    fn test_charge_stops_on_obstacle() {
        let tuning = Tuning::default();
        let mut minotaur = npc("Minotaur", 1, IVec2::new(100, 100), &tuning);
        minotaur.archetype.alert = None;
        minotaur.archetype.engage = None;
        minotaur.brain.set_patrol(0.0);
        minotaur.brain.set_tracking(0.0);
        minotaur.brain.set_charging(2.0, Vec2::new(1.0, 0.0));

        let wall = [Rect::new(150, 100, 16, 48)];
        let mut ctx = ctx(2.1, &tuning, &wall, None);
        update_npc(&mut minotaur, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Default);
        assert!(!minotaur.body.hitbox.intersects(&wall[0]));
    }

    #[test]
    fn test_charge_times_out_to_default() {
        let tuning = Tuning::default();
        let mut minotaur = npc("Minotaur", 1, IVec2::new(100, 100), &tuning);
        minotaur.brain.set_patrol(0.0);
        minotaur.brain.set_tracking(0.0);
        minotaur.brain.set_charging(0.5, Vec2::new(1.0, 0.0));

        let mut ctx = ctx(3.4, &tuning, &[], None);
        update_npc(&mut minotaur, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Charging);
        assert_eq!(minotaur.body.rect.x, 103);

        ctx.now = 3.5;
        update_npc(&mut minotaur, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Default);
        assert!(minotaur.brain.target.is_none());
        assert_eq!(minotaur.body.rect.x, 103, "no step on the tick the charge ends");
    }

    #[test]
    fn test_tracking_drops_to_patrol_when_target_leaves_or_dies() {
        let tuning = Tuning::default();
        let mut minotaur = npc("Minotaur", 1, IVec2::new(100, 100), &tuning);
        let mut others = [npc("Damsel", 2, IVec2::new(200, 160), &tuning)];
        let mut ctx = ctx(0.1, &tuning, &[], None);

        fn neighbors(others: &[Npc]) -> Neighbors<'_> {
            Neighbors {
                before: &[],
                after: others,
            }
        }

        update_npc(&mut minotaur, neighbors(&others), &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Tracking);
        assert_eq!(minotaur.brain.target, Some(Target::Actor(ActorId(2))));

        // off the radar
        others[0].body.move_right(1000);
        ctx.now = 0.2;
        update_npc(&mut minotaur, neighbors(&others), &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Patrol);

        others[0].body.move_left(1000);
        ctx.now = 0.3;
        update_npc(&mut minotaur, neighbors(&others), &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Tracking);

        others[0].die();
        ctx.now = 0.4;
        update_npc(&mut minotaur, neighbors(&others), &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Patrol);
        assert!(minotaur.brain.tracking_elapsed(0.4, 2.0).is_err());
    }

    #[test]
    fn test_charging_holds_locked_heading_despite_sightings() {
        let tuning = Tuning::default();
        // on the radar below: alert wants Flee
        let mut player = Player::new(IVec2::new(100, 200), &tuning);
        // on the radar up and to the left: engage wants Tracking
        let others = [npc("Damsel", 2, IVec2::new(60, 40), &tuning)];
        let neighbors = Neighbors {
            before: &[],
            after: &others,
        };

        let mut minotaur = npc("Minotaur", 1, IVec2::new(100, 100), &tuning);
        minotaur.brain.set_patrol(0.0);
        minotaur.brain.set_tracking(0.0);
        minotaur.brain.target = Some(Target::Actor(ActorId(9)));
        minotaur.brain.set_charging(2.0, Vec2::new(1.0, 0.0));

        let mut ctx = ctx(2.1, &tuning, &[], Some(&mut player));
        update_npc(&mut minotaur, neighbors, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(minotaur.brain.state(), NpcState::Charging);
        assert_eq!(minotaur.brain.target, Some(Target::Actor(ActorId(9))));
        assert_eq!(minotaur.body.compass, Vec2::new(1.0, 0.0));
        assert_eq!(minotaur.body.rect.top_left(), IVec2::new(103, 100));
    }

    #[test]
    fn test_consume_grants_power() {
        let tuning = Tuning::default();
        let mut player = Player::new(IVec2::new(100, 100), &tuning);
        player.set_actions([PlayerAction::Consume]);
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);

        let mut ctx = ctx(0.1, &tuning, &[], Some(&mut player));
        update_npc(&mut skeleton, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert!(!skeleton.alive);
        assert_eq!(player.eaten_power, EatenPower::BasicSkeleton);
    }

    #[test]
    fn test_consume_without_power_is_logged_not_fatal() {
        let tuning = Tuning::default();
        let mut player = Player::new(IVec2::new(100, 100), &tuning);
        player.set_actions([PlayerAction::Consume]);

        let mut archetype: Archetype = tuning.archetype("Skeleton").unwrap().clone();
        archetype.eaten_power = None;
        let mut husk = Npc::spawn(ActorId(1), &archetype, IVec2::new(100, 100), &tuning, 0.0);

        let mut ctx = ctx(0.1, &tuning, &[], Some(&mut player));
        assert!(update_npc(&mut husk, Neighbors::EMPTY, &mut ctx, &mut NoHooks).is_ok());
        assert!(!husk.alive);
        assert_eq!(player.eaten_power, EatenPower::EmptyStomach);
    }

    #[test]
    fn test_throw_copies_player_heading() {
        let tuning = Tuning::default();
        let mut player = Player::new(IVec2::new(100, 100), &tuning);
        player.body.compass = Vec2::new(0.0, 1.0);
        player.set_actions([PlayerAction::Throw]);
        let mut skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);

        let mut ctx = ctx(0.1, &tuning, &[], Some(&mut player));
        update_npc(&mut skeleton, Neighbors::EMPTY, &mut ctx, &mut NoHooks).unwrap();
        assert_eq!(skeleton.brain.state(), NpcState::Thrown);
        assert_eq!(skeleton.body.compass, Vec2::new(0.0, 1.0));
        assert!(skeleton.alive);
    }

    #[test]
    fn test_damsel_dies_touching_bad() {
        let tuning = Tuning::default();
        let skeleton = npc("Skeleton", 1, IVec2::new(100, 100), &tuning);
        let mut damsel = npc("Damsel", 2, IVec2::new(105, 100), &tuning);
        let others = [skeleton];
        let neighbors = Neighbors {
            before: &others,
            after: &[],
        };
        let mut ctx = ctx(0.1, &tuning, &[], None);
        update_npc(&mut damsel, neighbors, &mut ctx, &mut NoHooks).unwrap();
        assert!(!damsel.alive);
    }

    #[test]
    fn test_postman_hint_opens_and_closes() {
        let tuning = Tuning::default();
        let mut player = Player::new(IVec2::new(100, 100), &tuning);
        let mut postman = npc("Postman", 1, IVec2::new(100, 100), &tuning);
        let mut log = EventLog::new();

        let mut ctx = ctx(0.1, &tuning, &[], Some(&mut player));
        update_npc(&mut postman, Neighbors::EMPTY, &mut ctx, &mut log).unwrap();
        assert_eq!(log.hint.as_deref(), Some(crate::tuning::POSTMAN_HINT));

        postman.body.move_right(200);
        update_npc(&mut postman, Neighbors::EMPTY, &mut ctx, &mut log).unwrap();
        assert!(log.hint.is_none());
    }
}
