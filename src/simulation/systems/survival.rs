//! Hunger and health update, the first phase of every tick.

use bevy_ecs::prelude::*;

use crate::simulation::{
    EconomyCatalog, GameOverReason, GameStatus, MAX_STAT, Needs, Pressure, SurvivalTuning, Track,
    Vitals, WorldEventKind, WorldEventLog, WorldTime,
};

/// Hunger delta for one tick given the food track and the current food need.
pub fn hunger_change(food: &Track, food_need: f64, hunger: f64, tuning: &SurvivalTuning) -> f64 {
    let food_balance = food.current_production - food_need;
    if food_balance < 0.0 {
        return food_balance;
    }
    if hunger >= MAX_STAT || food.level < tuning.hunger_stability_level {
        // Non-negative balance below the stability level freezes hunger.
        return 0.0;
    }
    tuning
        .stat_regen_rate
        .min(food_balance * 0.2 + tuning.stat_regen_rate * 0.1)
}

/// Health delta for one tick. `hunger` is the value after this tick's hunger update.
pub fn health_change(shelter_level: u32, hunger: f64, health: f64, tuning: &SurvivalTuning) -> f64 {
    let mut change = 0.0;
    if shelter_level < tuning.shelter_health_maintenance_level {
        change -= tuning.health_decay_no_shelter;
    }
    if hunger < tuning.low_hunger_threshold {
        change -= tuning.health_decay_low_hunger;
    }
    if change == 0.0 && hunger >= tuning.health_regen_hunger_floor && health < MAX_STAT {
        change = tuning.stat_regen_rate;
    }
    change
}

pub fn survival_system(
    catalog: Res<EconomyCatalog>,
    needs: Res<Needs>,
    pressure: Res<Pressure>,
    time: Res<WorldTime>,
    mut vitals: ResMut<Vitals>,
    mut status: ResMut<GameStatus>,
    mut event_log: ResMut<WorldEventLog>,
) {
    let tuning = &catalog.survival;

    let hunger = vitals.hunger();
    vitals.set_hunger(hunger + hunger_change(&needs.food, pressure.current_food_need, hunger, tuning));

    let hunger = vitals.hunger();
    let health = vitals.health();
    vitals.set_health(health + health_change(needs.shelter.level, hunger, health, tuning));

    // Hunger wins the tie when both vitals bottom out together.
    let reason = if vitals.hunger() <= 0.0 {
        Some(GameOverReason::Hunger)
    } else if vitals.health() <= 0.0 {
        Some(GameOverReason::Health)
    } else {
        None
    };

    if let Some(reason) = reason {
        if status.end(reason) {
            event_log.push(time.tick, WorldEventKind::GameOver { reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::stats::recalculate_track;

    fn food_at(level: u32, catalog: &EconomyCatalog) -> Track {
        let mut food = Track::new(&catalog.food);
        food.level = level;
        recalculate_track(&mut food, &catalog.food);
        food
    }

    #[test]
    fn deficit_decays_hunger_by_its_magnitude() {
        let catalog = EconomyCatalog::default();
        let food = food_at(0, &catalog);
        assert_eq!(hunger_change(&food, 2.5, 100.0, &catalog.survival), -2.5);

        let food = food_at(1, &catalog);
        assert_eq!(hunger_change(&food, 2.5, 80.0, &catalog.survival), -1.0);
    }

    #[test]
    fn surplus_below_stability_level_freezes_hunger() {
        let catalog = EconomyCatalog::default();
        let food = food_at(5, &catalog);
        assert_eq!(hunger_change(&food, 2.5, 60.0, &catalog.survival), 0.0);
    }

    #[test]
    fn surplus_at_stability_level_regenerates_capped() {
        let catalog = EconomyCatalog::default();
        let food = food_at(15, &catalog);
        let change = hunger_change(&food, 2.5, 60.0, &catalog.survival);
        assert_eq!(change, catalog.survival.stat_regen_rate);
        assert_eq!(hunger_change(&food, 2.5, 100.0, &catalog.survival), 0.0);
    }

    #[test]
    fn small_surplus_regenerates_proportionally() {
        let catalog = EconomyCatalog::default();
        let food = food_at(15, &catalog);
        // balance 0.5 -> 0.1 + 0.035
        let change = hunger_change(&food, 66.0, 60.0, &catalog.survival);
        assert!((change - 0.135).abs() < 1e-12);
    }

    #[test]
    fn health_penalties_stack() {
        let tuning = SurvivalTuning::default();
        assert_eq!(health_change(0, 80.0, 100.0, &tuning), -0.15);
        assert!((health_change(0, 10.0, 100.0, &tuning) - -0.75).abs() < 1e-12);
        assert_eq!(health_change(15, 10.0, 100.0, &tuning), -0.6);
    }

    #[test]
    fn health_regenerates_only_without_penalties() {
        let tuning = SurvivalTuning::default();
        assert_eq!(health_change(15, 50.0, 90.0, &tuning), 0.35);
        assert_eq!(health_change(15, 49.0, 90.0, &tuning), 0.0);
        assert_eq!(health_change(15, 80.0, 100.0, &tuning), 0.0);
    }
}
