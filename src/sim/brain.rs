//! NPC state machine
//!
//! States only change through the named setters below, which is where the
//! guards live:
//! - Thrown and Charging can't be interrupted by radar (Patrol, Attack,
//!   Flee, Follow are all refused)
//! - Tracking is only reachable from Patrol
//! - Charging is only reachable from Tracking
//!
//! Entering or leaving a state also starts or clears the timers tied to it,
//! so callers never juggle timestamps themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Target;
use super::timer::{Timer, TimerKind};
use crate::error::SimResult;

/// Behavior state of an autonomous actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcState {
    /// Standing still; woken by the next radar pass
    #[default]
    Default,
    /// Walking back and forth on a timer
    Patrol,
    /// Closing in on a target
    Attack,
    /// Running the way the target is facing
    Flee,
    /// Closing in on a friendly target
    Follow,
    /// Launched by the player; lethal on impact
    Thrown,
    /// Stopped, turning to face the target before a charge
    Tracking,
    /// Straight-line rush at the heading locked in while tracking
    Charging,
}

impl NpcState {
    /// States a radar reaction may ask for
    pub fn is_radar_triggered(&self) -> bool {
        matches!(
            self,
            NpcState::Attack | NpcState::Flee | NpcState::Follow | NpcState::Tracking
        )
    }

    /// States that ignore radar until they run their course
    #[inline]
    pub fn is_locked(&self) -> bool {
        matches!(self, NpcState::Thrown | NpcState::Charging)
    }
}

/// A radar reaction that fired this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub state: NpcState,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    state: NpcState,
    /// Who Attack/Flee/Follow/Tracking act on (non-owning)
    pub target: Option<Target>,
    /// Heading captured while tracking; replayed every charging tick
    pub charge_compass: Vec2,
    /// Last patrol turn (or bounce)
    last_direction_change: f64,
    tracking: Timer,
    charge: Timer,
    thrown: Timer,
}

impl Brain {
    pub fn new(now: f64) -> Self {
        Self {
            state: NpcState::Default,
            target: None,
            charge_compass: Vec2::ZERO,
            last_direction_change: now,
            tracking: Timer::new(TimerKind::Tracking),
            charge: Timer::new(TimerKind::Charge),
            thrown: Timer::new(TimerKind::Thrown),
        }
    }

    #[inline]
    pub fn state(&self) -> NpcState {
        self.state
    }

    pub fn set_default(&mut self, now: f64) -> bool {
        self.transition(NpcState::Default, now);
        true
    }

    pub fn set_patrol(&mut self, now: f64) -> bool {
        if self.state.is_locked() {
            return false;
        }
        self.transition(NpcState::Patrol, now);
        true
    }

    pub fn set_attack(&mut self, now: f64) -> bool {
        if self.state.is_locked() {
            return false;
        }
        self.transition(NpcState::Attack, now);
        true
    }

    pub fn set_flee(&mut self, now: f64) -> bool {
        if self.state.is_locked() {
            return false;
        }
        self.transition(NpcState::Flee, now);
        true
    }

    pub fn set_follow(&mut self, now: f64) -> bool {
        if self.state.is_locked() {
            return false;
        }
        self.transition(NpcState::Follow, now);
        true
    }

    pub fn set_tracking(&mut self, now: f64) -> bool {
        if self.state != NpcState::Patrol {
            return false;
        }
        self.transition(NpcState::Tracking, now);
        true
    }

    /// Lock in the tracking heading and start the charge
    pub fn set_charging(&mut self, now: f64, heading: Vec2) -> bool {
        if self.state != NpcState::Tracking {
            return false;
        }
        self.charge_compass = heading;
        self.transition(NpcState::Charging, now);
        true
    }

    pub fn set_thrown(&mut self, now: f64) -> bool {
        if self.state == NpcState::Thrown {
            return false;
        }
        self.transition(NpcState::Thrown, now);
        true
    }

    /// Ask for a radar-triggered state. Returns true if the brain is in
    /// `state` afterwards (including when it already was).
    pub fn request(&mut self, state: NpcState, now: f64) -> bool {
        if self.state == state {
            return true;
        }
        match state {
            NpcState::Patrol => self.set_patrol(now),
            NpcState::Attack => self.set_attack(now),
            NpcState::Flee => self.set_flee(now),
            NpcState::Follow => self.set_follow(now),
            NpcState::Tracking => self.set_tracking(now),
            NpcState::Default | NpcState::Thrown | NpcState::Charging => false,
        }
    }

    /// Apply one tick of radar results.
    ///
    /// A brain sitting in Default is woken to Patrol first so engage
    /// reactions that need Patrol (Tracking) can fire. `alert` is applied
    /// next and falls back to Patrol when nothing is seen. `engage` goes
    /// last and overrides whatever alert decided when its request is
    /// accepted. The Patrol fallback is skipped while engage keeps the brain
    /// in its current state, so a running dwell timer is not restarted.
    pub fn evaluate(&mut self, now: f64, alert: Option<Sighting>, engage: Option<Sighting>) {
        if self.state == NpcState::Default {
            self.set_patrol(now);
        }

        let engage_holds = engage.is_some_and(|sighting| sighting.state == self.state);
        match alert {
            Some(sighting) => {
                if self.request(sighting.state, now) {
                    self.target = Some(sighting.target);
                }
            }
            None if engage_holds => {}
            None => {
                self.set_patrol(now);
            }
        }

        if let Some(sighting) = engage {
            if self.request(sighting.state, now) {
                self.target = Some(sighting.target);
            }
        }
    }

    /// Has the patrol interval elapsed since the last turn?
    pub fn patrol_due(&self, now: f64, interval_secs: f64) -> bool {
        now >= self.last_direction_change + interval_secs
    }

    /// Restart the patrol cadence (after a turn or a bounce)
    pub fn restart_patrol_timer(&mut self, now: f64) {
        self.last_direction_change = now;
    }

    pub fn tracking_elapsed(&self, now: f64, dwell_secs: f64) -> SimResult<bool> {
        self.tracking.is_finished(now, dwell_secs)
    }

    pub fn charge_elapsed(&self, now: f64, duration_secs: f64) -> SimResult<bool> {
        self.charge.is_finished(now, duration_secs)
    }

    pub fn thrown_elapsed(&self, now: f64, duration_secs: f64) -> SimResult<bool> {
        self.thrown.is_finished(now, duration_secs)
    }

    fn transition(&mut self, next: NpcState, now: f64) {
        let previous = self.state;
        if previous == next {
            return;
        }

        match previous {
            NpcState::Tracking => self.tracking.reset(),
            NpcState::Charging => self.charge.reset(),
            NpcState::Thrown => self.thrown.reset(),
            _ => {}
        }
        match next {
            NpcState::Patrol => self.last_direction_change = now,
            NpcState::Tracking => self.tracking.start(now),
            NpcState::Charging => self.charge.start(now),
            NpcState::Thrown => self.thrown.start(now),
            NpcState::Default => self.target = None,
            _ => {}
        }

        log::debug!("npc state {:?} -> {:?} at {:.3}s", previous, next, now);
        self.state = next;
    }
}
