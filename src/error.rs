//! Error types
//!
//! `SimError` covers per-tick failures inside the simulation; the world
//! logs them and moves on to the next actor. `ConfigError` covers loading
//! and validating [`Tuning`](crate::tuning::Tuning).

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::brain::NpcState;
use crate::sim::timer::TimerKind;

#[derive(Error, Debug, PartialEq)]
pub enum SimError {
    /// A countdown was read before it was ever started
    #[error("{timer} timer read before it was started")]
    TimerNotStarted { timer: TimerKind },

    /// A targeted movement policy ran without a target
    #[error("{state:?} movement requires a target")]
    TargetNotSet { state: NpcState },

    /// The player tried to consume an actor that grants no power
    #[error("{kind} cannot be consumed")]
    NoEatenPower { kind: String },
}

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tuning data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),

    #[error("archetype {archetype} reacts with {state:?}, which radar cannot trigger")]
    InvalidReaction { archetype: String, state: NpcState },

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
