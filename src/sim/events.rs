//! Outbound notifications
//!
//! The simulation never talks to score keeping or UI directly; hosts pass a
//! [`Hooks`] implementation into `tick`.

use serde::{Deserialize, Serialize};

use super::actor::{ActorId, Faction};

/// Callbacks the simulation fires mid-tick. All default to no-ops.
pub trait Hooks {
    /// An NPC died (score key is `kind`)
    fn actor_destroyed(&mut self, _kind: &str, _faction: Faction) {}

    /// Show a prompt while the player touches the talking NPC `owner`
    fn show_hint(&mut self, _owner: ActorId, _text: &str) {}

    /// `owner` lost contact; hide the prompt only if `owner` opened it
    fn try_close_hint(&mut self, _owner: ActorId) {}
}

/// Ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// Events recorded by [`EventLog`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ActorDestroyed { kind: String, faction: Faction },
    HintShown(String),
}

/// Hook sink that keeps everything for inspection after the tick
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
    /// Text currently on screen, if any
    pub hint: Option<String>,
    /// NPC that opened `hint`
    pub hint_owner: Option<ActorId>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destroyed_count(&self, kind: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::ActorDestroyed { kind: k, .. } if k == kind))
            .count()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Hooks for EventLog {
    fn actor_destroyed(&mut self, kind: &str, faction: Faction) {
        self.events.push(GameEvent::ActorDestroyed {
            kind: kind.to_string(),
            faction,
        });
    }

    fn show_hint(&mut self, owner: ActorId, text: &str) {
        if self.hint_owner.is_some_and(|current| current != owner) {
            return;
        }
        if self.hint.as_deref() != Some(text) {
            self.events.push(GameEvent::HintShown(text.to_string()));
        }
        self.hint = Some(text.to_string());
        self.hint_owner = Some(owner);
    }

    fn try_close_hint(&mut self, owner: ActorId) {
        if self.hint_owner == Some(owner) {
            self.hint = None;
            self.hint_owner = None;
        }
    }
}
