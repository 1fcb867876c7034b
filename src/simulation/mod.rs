use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, Schedule};
use bevy_ecs::system::RunSystemOnce;
use tracing::{debug, error, info};

pub mod actions;
pub mod catalog;
pub mod error;
pub mod events;
pub mod format;
pub mod invariants;
pub mod observer;
pub mod resources;
pub mod stats;
pub mod systems;


pub use actions::*;
pub use catalog::*;
pub use error::*;
pub use events::*;
pub use observer::*;
pub use resources::*;
pub use systems::*;

use stats::{recalculate_career, recalculate_factory, recalculate_track};

/// What one call to [`SimulationWorld::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    /// Returned exactly once, by the call that first observes the game ending.
    Ended(GameOverReason),
    /// Already over; nothing was mutated.
    Halted,
}

/// Fresh progression state with every derived field computed.
pub fn build_world(config: SimulationConfig) -> World {
    let catalog = config.catalog.clone();

    let mut career = Career::new(catalog.promotion.clicks_needed);
    recalculate_career(&mut career, &catalog.promotion);

    let mut needs = Needs::new(&catalog);
    recalculate_track(&mut needs.food, &catalog.food);
    recalculate_track(&mut needs.shelter, &catalog.shelter);

    let mut lab = Laboratory::new(&catalog);
    recalculate_track(&mut lab.science, &catalog.science);

    let mut industry = Industry::new(&catalog);
    for (factory, def) in industry.factories.iter_mut().zip(&catalog.factories) {
        recalculate_factory(factory, def);
    }

    let mut world = World::default();
    world.insert_resource(Pressure::new(&catalog));
    world.insert_resource(career);
    world.insert_resource(needs);
    world.insert_resource(lab);
    world.insert_resource(industry);
    world.insert_resource(catalog);
    world.insert_resource(config);
    world.insert_resource(Treasury::default());
    world.insert_resource(Vitals::default());
    world.insert_resource(GameStatus::default());
    world.insert_resource(Storyline::default());
    world.insert_resource(WorldTime::default());
    world.insert_resource(WorldEventLog::default());
    world
}

fn single_threaded() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule
}

struct TickSchedules {
    survival: Schedule,
    economy: Schedule,
    report: Schedule,
}

impl TickSchedules {
    fn new() -> Self {
        let mut survival = single_threaded();
        survival.add_systems(survival_system);

        let mut economy = single_threaded();
        economy.add_systems(
            (
                maintenance_system,
                interest_system,
                income_system,
                science_unlock_system,
                stage_system,
                pressure_system,
            )
                .chain(),
        );

        let mut report = single_threaded();
        report.add_systems(logging_system);

        Self {
            survival,
            economy,
            report,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run_phase(
    world: &mut World,
    schedule: &mut Schedule,
    phase: &'static str,
) -> Result<(), SimulationFault> {
    panic::catch_unwind(AssertUnwindSafe(|| schedule.run(world))).map_err(|payload| {
        SimulationFault::Panicked {
            phase,
            message: panic_message(payload),
        }
    })
}

fn dispatch(world: &mut World, action: Action) -> ActionResult {
    match action {
        Action::EarnWage => world.run_system_once(earn_wage),
        Action::Promote => world.run_system_once(promote),
        Action::UpgradeNeed(kind) => world.run_system_once_with(kind, upgrade_need),
        Action::ManualForage => world.run_system_once(manual_forage),
        Action::UpgradeScience => world.run_system_once(upgrade_science),
        Action::UnlockResearch(key) => world.run_system_once_with(key, unlock_research),
        Action::BuyFactory(id) => world.run_system_once_with(id, buy_factory),
        Action::UpgradeFactory(id) => world.run_system_once_with(id, upgrade_factory),
    }
}

/// Owns the progression world. Ticks and actions both take `&mut self`, so
/// neither can ever observe the other half-applied.
pub struct SimulationWorld {
    world: World,
    schedules: TickSchedules,
    config: SimulationConfig,
    observer: Arc<RwLock<ProgressionSnapshot>>,
    generation: u64,
    end_reported: bool,
    game_over_noted: bool,
    pending_game_over: Option<GameOverReason>,
}

impl SimulationWorld {
    pub fn new(config: SimulationConfig) -> Result<Self, CatalogError> {
        Self::with_observer(config, Arc::new(RwLock::new(ProgressionSnapshot::default())))
    }

    /// Rejects a catalog that could not produce a consistent first tick.
    pub fn with_observer(
        config: SimulationConfig,
        observer: Arc<RwLock<ProgressionSnapshot>>,
    ) -> Result<Self, CatalogError> {
        config.catalog.validate()?;
        let mut simulation = Self {
            world: build_world(config.clone()),
            schedules: TickSchedules::new(),
            config,
            observer,
            generation: 0,
            end_reported: false,
            game_over_noted: false,
            pending_game_over: None,
        };
        simulation.refresh_observer_snapshot();
        Ok(simulation)
    }

    pub fn observer(&self) -> Arc<RwLock<ProgressionSnapshot>> {
        Arc::clone(&self.observer)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<WorldTime>().tick
    }

    pub fn is_game_over(&self) -> bool {
        self.world.resource::<GameStatus>().is_over()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.world.resource::<GameStatus>().reason()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs one tick: survival, then the economy unless survival ended the game,
    /// then the invariant guard and the report.
    pub fn advance(&mut self) -> TickStatus {
        if let Some(reason) = self.game_over_reason() {
            if self.end_reported {
                return TickStatus::Halted;
            }
            self.end_reported = true;
            return TickStatus::Ended(reason);
        }

        self.world.resource_mut::<WorldTime>().tick += 1;

        let mut outcome = run_phase(&mut self.world, &mut self.schedules.survival, "survival");
        if outcome.is_ok() && !self.is_game_over() {
            outcome = run_phase(&mut self.world, &mut self.schedules.economy, "economy");
        }
        if let Err(fault) = outcome.and_then(|_| invariants::verify(&self.world)) {
            self.force_error(&fault);
        }

        if let Err(fault) = run_phase(&mut self.world, &mut self.schedules.report, "report") {
            self.force_error(&fault);
        }

        self.note_game_over();
        self.refresh_observer_snapshot();

        match self.game_over_reason() {
            Some(reason) => {
                self.end_reported = true;
                TickStatus::Ended(reason)
            }
            None => TickStatus::Running,
        }
    }

    /// The reason the game ended, handed out once per game.
    pub fn take_game_over(&mut self) -> Option<GameOverReason> {
        self.pending_game_over.take()
    }

    pub fn apply(&mut self, action: Action) -> ActionResult {
        let label = format!("{action:?}");
        let result = match panic::catch_unwind(AssertUnwindSafe(|| {
            dispatch(&mut self.world, action)
        })) {
            Ok(result) => result,
            Err(payload) => {
                let fault = SimulationFault::Panicked {
                    phase: "action",
                    message: panic_message(payload),
                };
                self.force_error(&fault);
                Ok(ActionOutcome::Ignored(IgnoreReason::GameOver))
            }
        };

        match &result {
            Ok(ActionOutcome::Applied(feedback)) => {
                debug!(action = %label, ?feedback, "action applied");
                if let Err(fault) = invariants::verify(&self.world) {
                    self.force_error(&fault);
                }
            }
            Ok(ActionOutcome::Ignored(reason)) => debug!(action = %label, ?reason, "action ignored"),
            Err(err) => debug!(action = %label, %err, "action rejected"),
        }

        self.note_game_over();
        self.refresh_observer_snapshot();
        result
    }

    pub fn earn_wage(&mut self) -> ActionResult {
        self.apply(Action::EarnWage)
    }

    pub fn promote(&mut self) -> ActionResult {
        self.apply(Action::Promote)
    }

    pub fn upgrade_need(&mut self, kind: NeedKind) -> ActionResult {
        self.apply(Action::UpgradeNeed(kind))
    }

    pub fn manual_forage(&mut self) -> ActionResult {
        self.apply(Action::ManualForage)
    }

    pub fn upgrade_science(&mut self) -> ActionResult {
        self.apply(Action::UpgradeScience)
    }

    pub fn unlock_research(&mut self, key: &str) -> ActionResult {
        self.apply(Action::UnlockResearch(key.to_string()))
    }

    pub fn buy_factory(&mut self, id: &str) -> ActionResult {
        self.apply(Action::BuyFactory(id.to_string()))
    }

    pub fn upgrade_factory(&mut self, id: &str) -> ActionResult {
        self.apply(Action::UpgradeFactory(id.to_string()))
    }

    /// Discards the current game, over or not, and starts a fresh one.
    pub fn restart(&mut self) {
        self.world = build_world(self.config.clone());
        self.schedules = TickSchedules::new();
        self.generation += 1;
        self.end_reported = false;
        self.game_over_noted = false;
        self.pending_game_over = None;
        info!(generation = self.generation, "game restarted");
        self.refresh_observer_snapshot();
    }

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot::capture(&self.world, self.generation)
    }

    fn force_error(&mut self, fault: &SimulationFault) {
        let tick = self.tick();
        error!(tick, %fault, "simulation fault, forcing game over");
        if self.world.resource_mut::<GameStatus>().end(GameOverReason::Error) {
            self.world.resource_mut::<WorldEventLog>().push(
                tick,
                WorldEventKind::GameOver {
                    reason: GameOverReason::Error,
                },
            );
        }
    }

    fn note_game_over(&mut self) {
        if self.game_over_noted {
            return;
        }
        if let Some(reason) = self.game_over_reason() {
            self.game_over_noted = true;
            self.pending_game_over = Some(reason);
        }
    }

    fn refresh_observer_snapshot(&mut self) {
        let snapshot = self.snapshot();
        if let Ok(mut shared) = self.observer.write() {
            *shared = snapshot;
        }
    }
}
