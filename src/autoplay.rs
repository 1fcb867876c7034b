//! Greedy autopilot that plays the game through a [`GameHandle`].
//!
//! Priorities each round: forage when starving, promote when ready, keep
//! survival needs ahead of the pressure curve, then buy whatever pays back
//! fastest. Clicks are jittered with a seeded RNG so runs are reproducible.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::time;
use tracing::debug;

use crate::scheduler::{GameHandle, SchedulerError};
use crate::simulation::{Action, EconomyCatalog, NeedKind, ProgressionSnapshot, Track};

/// Ticks of upkeep kept in reserve before spending on anything optional.
const UPKEEP_RESERVE_TICKS: f64 = 10.0;

fn affordable(cost: f64, budget: f64) -> bool {
    cost.is_finite() && cost <= budget
}

fn next_need(snapshot: &ProgressionSnapshot, shelter_target: u32) -> Option<NeedKind> {
    let starving = snapshot.food.current_production < snapshot.food_need;
    let exposed = snapshot.shelter.level < shelter_target;
    let food_first = starving
        || (!exposed && snapshot.food.current_upgrade_cost <= snapshot.shelter.current_upgrade_cost);
    let food = (NeedKind::Food, &snapshot.food);
    let shelter = (NeedKind::Shelter, &snapshot.shelter);
    let order: [(NeedKind, &Track); 2] = if food_first {
        [food, shelter]
    } else {
        [shelter, food]
    };
    let (kind, track) = order.into_iter().find(|(_, track)| !track.is_maxed())?;
    affordable(track.current_upgrade_cost, snapshot.capital).then_some(kind)
}

fn best_factory(snapshot: &ProgressionSnapshot, catalog: &EconomyCatalog, budget: f64) -> Option<Action> {
    let mut best: Option<(f64, Action)> = None;
    for factory in &snapshot.factories {
        let Some(def) = catalog.factory(&factory.id) else {
            continue;
        };
        if factory.is_maxed() || !affordable(factory.current_upgrade_cost, budget) {
            continue;
        }
        let (gain, action) = if factory.is_owned() {
            (
                factory.current_cps * (def.cps_multiplier - 1.0),
                Action::UpgradeFactory(factory.id.clone()),
            )
        } else {
            (def.base_cps, Action::BuyFactory(factory.id.clone()))
        };
        if gain <= 0.0 {
            continue;
        }
        let payback = factory.current_upgrade_cost / gain;
        let dominated = best.as_ref().is_some_and(|(current, _)| *current <= payback);
        if !dominated {
            best = Some((payback, action));
        }
    }
    best.map(|(_, action)| action)
}

/// Deterministic part of a round: at most one purchase, since capital moves after it.
pub fn plan(snapshot: &ProgressionSnapshot, catalog: &EconomyCatalog) -> Vec<Action> {
    let mut actions = Vec::new();
    if snapshot.is_game_over {
        return actions;
    }

    if snapshot.forage_available && snapshot.hunger < catalog.survival.health_regen_hunger_floor {
        actions.push(Action::ManualForage);
    }
    if snapshot.promotion.current_clicks >= snapshot.promotion.clicks_needed {
        actions.push(Action::Promote);
    }

    if snapshot.science_unlocked {
        if let Some(item) = catalog.research.iter().find(|item| {
            !snapshot.unlocked_research.contains(&item.key) && item.cost <= snapshot.science_points
        }) {
            actions.push(Action::UnlockResearch(item.key.clone()));
        }
    }

    if let Some(kind) = next_need(snapshot, catalog.survival.shelter_health_maintenance_level) {
        actions.push(Action::UpgradeNeed(kind));
        return actions;
    }

    let budget = snapshot.capital - snapshot.maintenance_per_tick * UPKEEP_RESERVE_TICKS;
    if snapshot.science_unlocked
        && !snapshot.science.is_maxed()
        && affordable(snapshot.science.current_upgrade_cost, budget)
    {
        actions.push(Action::UpgradeScience);
    } else if let Some(action) = best_factory(snapshot, catalog, budget) {
        actions.push(action);
    }
    actions
}

pub struct Autopilot {
    catalog: EconomyCatalog,
    rng: SmallRng,
    max_clicks_per_round: u32,
}

impl Autopilot {
    pub fn new(catalog: EconomyCatalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: SmallRng::seed_from_u64(seed),
            max_clicks_per_round: 6,
        }
    }

    pub fn next_round(&mut self, snapshot: &ProgressionSnapshot) -> Vec<Action> {
        let mut actions = plan(snapshot, &self.catalog);
        if !snapshot.is_game_over {
            let clicks = self.rng.gen_range(1..=self.max_clicks_per_round);
            actions.extend((0..clicks).map(|_| Action::EarnWage));
        }
        actions
    }

    /// Plays until the game ends or `max_ticks` is reached, returning the final snapshot.
    pub async fn drive(
        &mut self,
        handle: &GameHandle,
        tick_duration: Duration,
        max_ticks: Option<u64>,
    ) -> Result<ProgressionSnapshot, SchedulerError> {
        let mut game_over = handle.subscribe_game_over();
        let mut pace = time::interval((tick_duration / 2).max(Duration::from_millis(1)));

        loop {
            tokio::select! {
                _ = pace.tick() => {},
                _ = game_over.recv() => {},
            }

            let snapshot = handle.snapshot().await?;
            if snapshot.is_game_over || max_ticks.is_some_and(|max| snapshot.tick >= max) {
                return Ok(snapshot);
            }

            for action in self.next_round(&snapshot) {
                if let Err(err) = handle.act(action.clone()).await? {
                    debug!(?action, %err, "autopilot action rejected");
                }
            }
        }
    }
}
