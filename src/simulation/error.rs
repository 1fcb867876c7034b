//! Error types for the simulation core.
//!
//! Player-facing precondition failures are `ActionError`s and never mutate state.
//! `SimulationFault` is reserved for corrupted state and always ends the game.

use thiserror::Error;

use crate::simulation::TrackKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("not enough capital: need {needed:.2}, have {available:.2}")]
    InsufficientCapital { needed: f64, available: f64 },

    #[error("{track} is already at max level")]
    MaxLevel { track: TrackKind },

    #[error("science has not been unlocked yet")]
    ScienceLocked,

    #[error("research item '{0}' not found")]
    UnknownResearch(String),

    #[error("not enough science points: need {needed:.2}, have {available:.2}")]
    InsufficientSciencePoints { needed: f64, available: f64 },

    #[error("factory '{0}' not found")]
    UnknownFactory(String),

    #[error("factory '{0}' is already owned")]
    FactoryAlreadyOwned(String),

    #[error("factory '{0}' must be bought before it can be upgraded")]
    FactoryNotOwned(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationFault {
    #[error("{field} is not finite ({value})")]
    NonFinite { field: String, value: f64 },

    #[error("{field} = {value} outside [0, 100]")]
    VitalOutOfRange { field: &'static str, value: f64 },

    #[error("{track} level {level} exceeds max level {max_level}")]
    LevelOutOfRange {
        track: String,
        level: u32,
        max_level: u32,
    },

    #[error("{track} upgrade cost {cost} disagrees with level {level}/{max_level}")]
    CostMismatch {
        track: String,
        cost: f64,
        level: u32,
        max_level: u32,
    },

    #[error("stage index {index} outside stage table of {len}")]
    StageOutOfRange { index: usize, len: usize },

    #[error("unlocked research '{0}' is not in the catalog")]
    UnknownResearchUnlocked(String),

    #[error("panic during {phase}: {message}")]
    Panicked { phase: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("stage table is empty")]
    NoStages,

    #[error("stage '{stage}' does not raise the activation threshold")]
    StageOrder { stage: String },

    #[error("{track} {table} table has {len} entries, needs {needed}")]
    ShortTable {
        track: &'static str,
        table: &'static str,
        len: usize,
        needed: usize,
    },

    #[error("{what} has a max level of zero")]
    ZeroMaxLevel { what: String },

    #[error("duplicate factory id '{0}'")]
    DuplicateFactory(String),

    #[error("duplicate research key '{0}'")]
    DuplicateResearch(String),

    #[error("non-finite constant in {what}")]
    NonFinite { what: String },
}
