//! Progression state held as world resources.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::simulation::{EconomyCatalog, FactoryDef, TrackCatalog};

pub const MAX_STAT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    Food,
    Shelter,
}

impl NeedKind {
    pub fn label(&self) -> &'static str {
        match self {
            NeedKind::Food => "food",
            NeedKind::Shelter => "shelter",
        }
    }
}

/// Every independently levelable progression axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum TrackKind {
    Promotion,
    Need(NeedKind),
    Science,
    Factory(String),
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Promotion => f.write_str("promotion"),
            TrackKind::Need(kind) => f.write_str(kind.label()),
            TrackKind::Science => f.write_str("science"),
            TrackKind::Factory(id) => write!(f, "factory '{id}'"),
        }
    }
}

/// Level plus cost-curve parameters and the derived fields cached from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub level: u32,
    pub max_level: u32,
    /// Zero until the track first reaches level 1, then locked in.
    pub base_maintenance: f64,
    pub maintenance_per_level: f64,
    /// Flat maintenance added by pressure events.
    pub maintenance_surcharge: f64,
    pub base_upgrade_cost: f64,
    pub upgrade_cost_multiplier: f64,
    pub current_production: f64,
    pub current_maintenance: f64,
    /// `f64::INFINITY` at max level.
    pub current_upgrade_cost: f64,
    pub current_name: String,
}

impl Track {
    pub fn new(entry: &TrackCatalog) -> Self {
        Self {
            level: 0,
            max_level: entry.max_level,
            base_maintenance: 0.0,
            maintenance_per_level: entry.maintenance_per_level,
            maintenance_surcharge: 0.0,
            base_upgrade_cost: entry.base_upgrade_cost,
            upgrade_cost_multiplier: entry.upgrade_cost_multiplier,
            current_production: 0.0,
            current_maintenance: 0.0,
            current_upgrade_cost: entry.base_upgrade_cost,
            current_name: String::new(),
        }
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }
}

#[derive(Debug, Clone, PartialEq, Resource, Serialize)]
pub struct Career {
    pub level: u32,
    pub current_wage: f64,
    pub clicks_needed: u32,
    pub current_clicks: u32,
}

impl Career {
    pub fn new(clicks_needed: u32) -> Self {
        Self {
            level: 0,
            current_wage: 0.0,
            clicks_needed,
            current_clicks: 0,
        }
    }

    pub fn can_promote(&self) -> bool {
        self.current_clicks >= self.clicks_needed
    }
}

#[derive(Debug, Clone, Resource)]
pub struct Needs {
    pub food: Track,
    pub shelter: Track,
    /// Absolute tick at which manual foraging is available again.
    pub forage_cooldown_end_tick: u64,
}

impl Needs {
    pub fn new(catalog: &EconomyCatalog) -> Self {
        Self {
            food: Track::new(&catalog.food),
            shelter: Track::new(&catalog.shelter),
            forage_cooldown_end_tick: 0,
        }
    }

    pub fn track(&self, kind: NeedKind) -> &Track {
        match kind {
            NeedKind::Food => &self.food,
            NeedKind::Shelter => &self.shelter,
        }
    }

    pub fn track_mut(&mut self, kind: NeedKind) -> &mut Track {
        match kind {
            NeedKind::Food => &mut self.food,
            NeedKind::Shelter => &mut self.shelter,
        }
    }
}

/// Multipliers accumulated from completed research.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResearchModifiers {
    pub maintenance_multiplier: f64,
    pub factory_multiplier: f64,
}

impl Default for ResearchModifiers {
    fn default() -> Self {
        Self {
            maintenance_multiplier: 1.0,
            factory_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Resource)]
pub struct Laboratory {
    /// One-way gate: never reverts once set.
    pub unlocked: bool,
    pub science: Track,
    pub science_points: f64,
    pub unlocked_research: BTreeSet<String>,
    pub modifiers: ResearchModifiers,
}

impl Laboratory {
    pub fn new(catalog: &EconomyCatalog) -> Self {
        Self {
            unlocked: false,
            science: Track::new(&catalog.science),
            science_points: 0.0,
            unlocked_research: BTreeSet::new(),
            modifiers: ResearchModifiers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factory {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub current_cps: f64,
    /// Purchase price at level 0, `f64::INFINITY` at max level.
    pub current_upgrade_cost: f64,
}

impl Factory {
    pub fn new(def: &FactoryDef) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            level: 0,
            max_level: def.max_level,
            current_cps: 0.0,
            current_upgrade_cost: def.base_cost,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.level > 0
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }
}

#[derive(Debug, Clone, Resource)]
pub struct Industry {
    pub factories: Vec<Factory>,
}

impl Industry {
    pub fn new(catalog: &EconomyCatalog) -> Self {
        Self {
            factories: catalog.factories.iter().map(Factory::new).collect(),
        }
    }

    pub fn factory(&self, id: &str) -> Option<&Factory> {
        self.factories.iter().find(|factory| factory.id == id)
    }

    pub fn factory_mut(&mut self, id: &str) -> Option<&mut Factory> {
        self.factories.iter_mut().find(|factory| factory.id == id)
    }

    pub fn total_cps(&self) -> f64 {
        self.factories
            .iter()
            .filter(|factory| factory.is_owned())
            .map(|factory| factory.current_cps)
            .sum()
    }
}

#[derive(Debug, Clone, Resource, Default)]
pub struct Treasury {
    /// May go negative; nothing clamps it.
    pub capital: f64,
}

/// Health and hunger, clamped to `[0, MAX_STAT]` on every write.
#[derive(Debug, Clone, Resource)]
pub struct Vitals {
    health: f64,
    hunger: f64,
}

impl Vitals {
    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn set_health(&mut self, value: f64) {
        self.health = value.clamp(0.0, MAX_STAT);
    }

    pub fn set_hunger(&mut self, value: f64) {
        self.hunger = value.clamp(0.0, MAX_STAT);
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: MAX_STAT,
            hunger: MAX_STAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    Hunger,
    Health,
    Error,
}

impl GameOverReason {
    pub fn code(&self) -> &'static str {
        match self {
            GameOverReason::Hunger => "hunger",
            GameOverReason::Health => "health",
            GameOverReason::Error => "error",
        }
    }
}

/// Write-once terminal flag. Only a fresh world clears it.
#[derive(Debug, Clone, Resource, Default)]
pub struct GameStatus {
    over: Option<GameOverReason>,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        self.over.is_some()
    }

    pub fn reason(&self) -> Option<GameOverReason> {
        self.over
    }

    /// Returns true only for the call that actually ended the game.
    pub fn end(&mut self, reason: GameOverReason) -> bool {
        if self.over.is_some() {
            return false;
        }
        self.over = Some(reason);
        true
    }
}

#[derive(Debug, Clone, Resource, Default)]
pub struct Storyline {
    pub stage_index: usize,
}

/// Escalating survival pressure driven by the catalog's pressure schedule.
#[derive(Debug, Clone, Resource)]
pub struct Pressure {
    pub current_food_need: f64,
    pub next_event_index: usize,
    /// `None` once the event table is exhausted.
    pub ticks_until_next_event: Option<u64>,
}

impl Pressure {
    pub fn new(catalog: &EconomyCatalog) -> Self {
        let schedule = &catalog.pressure;
        let countdown = (!schedule.events.is_empty() && schedule.interval_ticks > 0)
            .then_some(schedule.interval_ticks);
        Self {
            current_food_need: catalog.survival.base_food_need,
            next_event_index: 0,
            ticks_until_next_event: countdown,
        }
    }
}

#[derive(Debug, Clone, Resource, Default)]
pub struct WorldTime {
    pub tick: u64,
}

#[derive(Debug, Clone, Resource)]
pub struct SimulationConfig {
    pub tick_duration: Duration,
    /// A status header is logged every this many ticks. Zero disables it.
    pub status_log_interval: u64,
    pub catalog: EconomyCatalog,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_duration: Duration::from_secs(1),
            status_log_interval: 30,
            catalog: EconomyCatalog::default(),
        }
    }
}
