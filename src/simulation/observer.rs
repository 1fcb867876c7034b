//! Read-only progression snapshot shared with observers.

use bevy_ecs::prelude::*;
use serde::Serialize;

use crate::simulation::systems::{stage_progress, total_maintenance};
use crate::simulation::{
    Career, EconomyCatalog, Factory, GameOverReason, GameStatus, Industry, Laboratory, Needs,
    Pressure, ResearchModifiers, Storyline, Track, Treasury, Vitals, WorldEvent, WorldEventLog,
    WorldTime,
};

#[derive(Debug, Clone, Serialize, Default)]
pub struct StageSnapshot {
    pub index: usize,
    pub name: String,
    pub text: String,
    /// `None` at the final stage.
    pub next_threshold: Option<f64>,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingPressureSnapshot {
    pub name: String,
    pub ticks_until: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressionSnapshot {
    pub tick: u64,
    pub capital: f64,
    pub is_game_over: bool,
    pub game_over_reason: Option<GameOverReason>,
    pub health: f64,
    pub hunger: f64,
    pub stage: StageSnapshot,
    pub promotion: Career,
    pub food: Track,
    pub shelter: Track,
    pub forage_cooldown_end_tick: u64,
    pub forage_available: bool,
    pub food_need: f64,
    pub maintenance_per_tick: f64,
    pub science_unlocked: bool,
    pub science: Track,
    pub science_points: f64,
    pub unlocked_research: Vec<String>,
    pub research_modifiers: ResearchModifiers,
    pub factories: Vec<Factory>,
    pub total_cps: f64,
    pub pending_pressure: Option<PendingPressureSnapshot>,
    pub events: Vec<WorldEvent>,
    /// Bumped on every restart so observers can tell games apart.
    pub generation: u64,
}

impl ProgressionSnapshot {
    pub fn new() -> Self {
        let catalog = EconomyCatalog::default();
        Self {
            tick: 0,
            capital: 0.0,
            is_game_over: false,
            game_over_reason: None,
            health: 0.0,
            hunger: 0.0,
            stage: StageSnapshot::default(),
            promotion: Career::new(0),
            food: Track::new(&catalog.food),
            shelter: Track::new(&catalog.shelter),
            forage_cooldown_end_tick: 0,
            forage_available: false,
            food_need: 0.0,
            maintenance_per_tick: 0.0,
            science_unlocked: false,
            science: Track::new(&catalog.science),
            science_points: 0.0,
            unlocked_research: Vec::new(),
            research_modifiers: ResearchModifiers::default(),
            factories: Vec::new(),
            total_cps: 0.0,
            pending_pressure: None,
            events: Vec::new(),
            generation: 0,
        }
    }

    pub fn capture(world: &World, generation: u64) -> Self {
        let catalog = world.resource::<EconomyCatalog>();
        let tick = world.resource::<WorldTime>().tick;
        let capital = world.resource::<Treasury>().capital;
        let status = world.resource::<GameStatus>();
        let vitals = world.resource::<Vitals>();
        let needs = world.resource::<Needs>();
        let lab = world.resource::<Laboratory>();
        let industry = world.resource::<Industry>();
        let pressure = world.resource::<Pressure>();

        let stage_index = world.resource::<Storyline>().stage_index;
        let stage = catalog
            .stages
            .get(stage_index)
            .map(|current| StageSnapshot {
                index: stage_index,
                name: current.name.clone(),
                text: current.text.clone(),
                next_threshold: catalog
                    .stages
                    .get(stage_index + 1)
                    .map(|next| next.activation_threshold),
                progress: stage_progress(catalog, stage_index, capital),
            })
            .unwrap_or_default();

        let pending_pressure = pressure.ticks_until_next_event.and_then(|ticks_until| {
            catalog
                .pressure
                .events
                .get(pressure.next_event_index)
                .map(|event| PendingPressureSnapshot {
                    name: event.name.clone(),
                    ticks_until,
                })
        });

        let forage_available = needs.food.level <= catalog.survival.forage_max_food_level
            && tick >= needs.forage_cooldown_end_tick;

        Self {
            tick,
            capital,
            is_game_over: status.is_over(),
            game_over_reason: status.reason(),
            health: vitals.health(),
            hunger: vitals.hunger(),
            stage,
            promotion: world.resource::<Career>().clone(),
            food: needs.food.clone(),
            shelter: needs.shelter.clone(),
            forage_cooldown_end_tick: needs.forage_cooldown_end_tick,
            forage_available,
            food_need: pressure.current_food_need,
            maintenance_per_tick: total_maintenance(needs, lab),
            science_unlocked: lab.unlocked,
            science: lab.science.clone(),
            science_points: lab.science_points,
            unlocked_research: lab.unlocked_research.iter().cloned().collect(),
            research_modifiers: lab.modifiers,
            factories: industry.factories.clone(),
            total_cps: industry.total_cps() * lab.modifiers.factory_multiplier,
            pending_pressure,
            events: world.resource::<WorldEventLog>().snapshot(),
            generation,
        }
    }
}

impl Default for ProgressionSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
