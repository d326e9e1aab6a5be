//! Data-driven game balance
//!
//! Every speed, duration and range the simulation reads, plus the archetype
//! table NPCs are spawned from. Loaded from JSON so balance can change
//! without a rebuild; [`Tuning::default`] is the shipped game.

use std::collections::HashSet;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult};
use crate::sim::actor::{EatenPower, Faction};
use crate::sim::brain::NpcState;

/// Hint the postman shows on contact
pub const POSTMAN_HINT: &str = "Traveler, you are strong enough to fight off the monsters, \
but others are not. Please help protect the townsfolk.";

/// What a radar pass looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Watch {
    Player,
    Faction(Faction),
}

/// "When I see `watch`, switch to `state` and target it"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub watch: Watch,
    pub state: NpcState,
}

impl Reaction {
    pub const fn new(watch: Watch, state: NpcState) -> Self {
        Self { watch, state }
    }
}

/// What happens when an NPC's rect touches something
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRule {
    /// Touching the player pops the player's next action
    PlayerActions,
    /// Dies on touching any member of the faction
    DiesTouching(Faction),
    /// Shows this hint while touching the player
    Hint(String),
    None,
}

/// One kind of NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Unique name; reported to the score hook on death
    pub name: String,
    pub faction: Faction,
    /// Display rect size in pixels
    pub size: IVec2,
    /// Hitbox growth over the display rect (negative shrinks)
    pub hitbox_inflate: IVec2,
    /// Walking speed in pixels per step; `None` walks at `Tuning::default_speed`
    #[serde(default)]
    pub speed: Option<i32>,
    /// Checked first; a miss falls back to Patrol
    pub alert: Option<Reaction>,
    /// Checked second; overrides `alert` when accepted
    pub engage: Option<Reaction>,
    pub contact: ContactRule,
    /// Power granted when the player consumes this NPC
    pub eaten_power: Option<EatenPower>,
}

impl Archetype {
    fn skeleton() -> Self {
        Self {
            name: "Skeleton".to_string(),
            faction: Faction::Bad,
            size: IVec2::new(ENTITY_WIDTH, ENTITY_HEIGHT),
            hitbox_inflate: IVec2::new(ENTITY_HITBOX_OFFSET, 0),
            speed: None,
            alert: Some(Reaction::new(Watch::Player, NpcState::Flee)),
            engage: Some(Reaction::new(Watch::Faction(Faction::Good), NpcState::Attack)),
            contact: ContactRule::PlayerActions,
            eaten_power: Some(EatenPower::BasicSkeleton),
        }
    }

    fn minotaur() -> Self {
        Self {
            name: "Minotaur".to_string(),
            faction: Faction::Bad,
            size: IVec2::new(48, 48),
            hitbox_inflate: IVec2::ZERO,
            speed: None,
            alert: Some(Reaction::new(Watch::Player, NpcState::Flee)),
            engage: Some(Reaction::new(Watch::Faction(Faction::Good), NpcState::Tracking)),
            contact: ContactRule::PlayerActions,
            eaten_power: Some(EatenPower::Minotaur),
        }
    }

    fn damsel() -> Self {
        Self {
            name: "Damsel".to_string(),
            faction: Faction::Good,
            size: IVec2::new(ENTITY_WIDTH, ENTITY_HEIGHT),
            hitbox_inflate: IVec2::new(ENTITY_HITBOX_OFFSET, 0),
            speed: None,
            alert: Some(Reaction::new(Watch::Faction(Faction::Bad), NpcState::Flee)),
            engage: Some(Reaction::new(Watch::Player, NpcState::Follow)),
            contact: ContactRule::DiesTouching(Faction::Bad),
            eaten_power: Some(EatenPower::Damsel),
        }
    }

    fn postman() -> Self {
        Self {
            name: "Postman".to_string(),
            faction: Faction::Neutral,
            size: IVec2::new(ENTITY_WIDTH, ENTITY_HEIGHT),
            hitbox_inflate: IVec2::new(ENTITY_HITBOX_OFFSET, 0),
            speed: None,
            alert: Some(Reaction::new(Watch::Faction(Faction::Bad), NpcState::Flee)),
            engage: None,
            contact: ContactRule::Hint(POSTMAN_HINT.to_string()),
            eaten_power: None,
        }
    }
}

/// Balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Grid granularity in pixels
    pub tile_size: i32,
    /// Radar reach, in tiles added to the owner's rect
    pub radar_tiles: i32,

    // === Speeds (pixels per step) ===
    pub default_speed: i32,
    /// Charging and thrown
    pub fast_speed: i32,
    pub player_speed: i32,
    /// Nudge size when pushing out of obstacles
    pub escape_speed: i32,

    // === Timers (seconds of simulation time) ===
    pub patrol_interval_secs: f64,
    pub tracking_dwell_secs: f64,
    pub charge_duration_secs: f64,
    pub thrown_duration_secs: f64,

    // === Player ===
    /// Heading change per tick while a turn key is held
    pub player_rotation_deg: f32,
    /// Bound on pending contact actions
    pub action_queue_len: usize,

    pub archetypes: Vec<Archetype>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            radar_tiles: 8,

            default_speed: DEFAULT_SPEED,
            fast_speed: FAST_SPEED,
            player_speed: PLAYER_SPEED,
            escape_speed: ESCAPE_SPEED,

            patrol_interval_secs: 3.0,
            tracking_dwell_secs: 2.0,
            charge_duration_secs: 3.0,
            thrown_duration_secs: 1.0,

            player_rotation_deg: 5.0,
            action_queue_len: 3,

            archetypes: vec![
                Archetype::skeleton(),
                Archetype::minotaur(),
                Archetype::damsel(),
                Archetype::postman(),
            ],
        }
    }
}

impl Tuning {
    /// Radar growth in pixels
    #[inline]
    pub fn radar_inflation(&self) -> i32 {
        self.radar_tiles * self.tile_size
    }

    pub fn archetype(&self, name: &str) -> ConfigResult<&Archetype> {
        self.archetypes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| ConfigError::UnknownArchetype(name.to_string()))
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!(
            "Loaded tuning from {} ({} archetypes)",
            path.display(),
            tuning.archetypes.len()
        );
        Ok(tuning)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Tuning saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.tile_size <= 0 {
            return Err(invalid("tile_size must be positive"));
        }
        if self.radar_tiles < 0 {
            return Err(invalid("radar_tiles must not be negative"));
        }
        if self.default_speed < 0 || self.fast_speed < 0 || self.player_speed < 0 {
            return Err(invalid("speeds must not be negative"));
        }
        if self.escape_speed < 1 {
            return Err(invalid("escape_speed must be at least 1"));
        }
        let durations = [
            ("patrol_interval_secs", self.patrol_interval_secs),
            ("tracking_dwell_secs", self.tracking_dwell_secs),
            ("charge_duration_secs", self.charge_duration_secs),
            ("thrown_duration_secs", self.thrown_duration_secs),
        ];
        for (name, secs) in durations {
            if secs.is_nan() || secs <= 0.0 {
                return Err(invalid(&format!("{name} must be positive")));
            }
        }
        if self.action_queue_len == 0 {
            return Err(invalid("action_queue_len must be at least 1"));
        }

        let mut seen = HashSet::new();
        for archetype in &self.archetypes {
            if !seen.insert(archetype.name.as_str()) {
                return Err(invalid(&format!("duplicate archetype {}", archetype.name)));
            }
            if archetype.size.x <= 0 || archetype.size.y <= 0 {
                return Err(invalid(&format!("{} has an empty size", archetype.name)));
            }
            if archetype.speed.is_some_and(|speed| speed < 0) {
                return Err(invalid(&format!("{} has a negative speed", archetype.name)));
            }
            for reaction in [archetype.alert, archetype.engage].into_iter().flatten() {
                if !reaction.state.is_radar_triggered() {
                    return Err(ConfigError::InvalidReaction {
                        archetype: archetype.name.clone(),
                        state: reaction.state,
                    });
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.radar_inflation(), 128);
        assert_eq!(tuning.archetypes.len(), 4);
    }

    #[test]
    fn test_json_round_trip_keeps_archetypes() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back, tuning);
        assert_eq!(
            back.archetype("Postman").unwrap().contact,
            ContactRule::Hint(POSTMAN_HINT.to_string())
        );
    }

    #[test]
    fn test_unknown_archetype() {
        let tuning = Tuning::default();
        assert!(matches!(
            tuning.archetype("Dragon"),
            Err(ConfigError::UnknownArchetype(name)) if name == "Dragon"
        ));
    }

    #[test]
    fn test_rejects_unreachable_reaction() {
        let mut tuning = Tuning::default();
        tuning.archetypes[0].engage = Some(Reaction::new(Watch::Player, NpcState::Charging));
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InvalidReaction { state: NpcState::Charging, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let mut tuning = Tuning::default();
        tuning.charge_duration_secs = 0.0;
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));

        let mut tuning = Tuning::default();
        tuning.action_queue_len = 0;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.archetypes.push(Archetype::skeleton());
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.archetypes[0].speed = Some(-1);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_archetype_speed_is_optional_in_json() {
        let mut json: serde_json::Value = serde_json::from_str(&Tuning::default().to_json().unwrap()).unwrap();
        json["archetypes"][0]
            .as_object_mut()
            .unwrap()
            .remove("speed");
        json["archetypes"][1]["speed"] = serde_json::json!(4);
        let tuning = Tuning::from_json(&json.to_string()).unwrap();
        assert_eq!(tuning.archetypes[0].speed, None);
        assert_eq!(tuning.archetypes[1].speed, Some(4));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("tile_tussle_tuning_{}.json", std::process::id()));
        let mut tuning = Tuning::default();
        tuning.patrol_interval_secs = 4.5;
        tuning.save(&path).unwrap();
        let loaded = Tuning::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.patrol_interval_secs, 4.5);
    }
}
