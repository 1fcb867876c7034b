//! Stat calculators: derived fields as pure functions of a track's level.
//!
//! Each `recalculate_*` overwrites the cached fields from scratch, so calling
//! one twice without a level change is a no-op.

use crate::simulation::{Career, Factory, FactoryDef, PromotionCatalog, Track, TrackCatalog};

pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    pub production: f64,
    pub maintenance: f64,
    pub base_maintenance: f64,
    pub upgrade_cost: f64,
    pub name: String,
}

pub fn upgrade_cost(base: f64, multiplier: f64, level: u32, max_level: u32) -> f64 {
    if level >= max_level {
        return f64::INFINITY;
    }
    (base * multiplier.powi(level as i32)).floor()
}

pub fn derive_track_stats(track: &Track, entry: &TrackCatalog) -> DerivedStats {
    let level = track.level.min(track.max_level);

    let (production, maintenance, base_maintenance) = if level == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let production = entry
            .production
            .get(level as usize)
            .copied()
            .unwrap_or(0.0);
        let base = if level == 1 && track.base_maintenance == 0.0 {
            entry.locked_base_maintenance
        } else {
            track.base_maintenance
        };
        let maintenance = base
            + (level - 1) as f64 * track.maintenance_per_level
            + track.maintenance_surcharge;
        (production, maintenance, base)
    };

    DerivedStats {
        production,
        maintenance,
        base_maintenance,
        upgrade_cost: upgrade_cost(
            track.base_upgrade_cost,
            track.upgrade_cost_multiplier,
            level,
            track.max_level,
        ),
        name: entry
            .names
            .get(level as usize)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
    }
}

pub fn recalculate_track(track: &mut Track, entry: &TrackCatalog) {
    track.level = track.level.min(track.max_level);
    let derived = derive_track_stats(track, entry);
    track.current_production = derived.production;
    track.current_maintenance = derived.maintenance;
    track.base_maintenance = derived.base_maintenance;
    track.current_upgrade_cost = derived.upgrade_cost;
    track.current_name = derived.name;
}

/// Wage = base + level step + a milestone bonus for every completed interval.
pub fn promotion_wage(level: u32, promotion: &PromotionCatalog) -> f64 {
    let milestones = if promotion.bonus_interval == 0 {
        0
    } else {
        level / promotion.bonus_interval
    };
    promotion.base_wage
        + level as f64 * promotion.wage_increase_per_level
        + milestones as f64 * promotion.bonus_increment
}

/// The one-off bonus reached by landing exactly on a milestone level.
pub fn milestone_bonus(level: u32, promotion: &PromotionCatalog) -> Option<f64> {
    (promotion.bonus_interval > 0 && level > 0 && level % promotion.bonus_interval == 0)
        .then_some(promotion.bonus_increment)
}

pub fn recalculate_career(career: &mut Career, promotion: &PromotionCatalog) {
    career.clicks_needed = promotion.clicks_needed;
    career.current_clicks = career.current_clicks.min(career.clicks_needed);
    career.current_wage = promotion_wage(career.level, promotion);
}

/// Returns `(cps, next cost)`; at level 0 the cost is the purchase price.
pub fn derive_factory_stats(level: u32, def: &FactoryDef) -> (f64, f64) {
    let level = level.min(def.max_level);
    if level == 0 {
        return (0.0, def.base_cost);
    }
    let cps = def.base_cps * def.cps_multiplier.powi(level as i32 - 1);
    let cost = upgrade_cost(def.base_cost, def.cost_multiplier, level, def.max_level);
    (cps, cost)
}

pub fn recalculate_factory(factory: &mut Factory, def: &FactoryDef) {
    factory.max_level = def.max_level;
    factory.level = factory.level.min(factory.max_level);
    let (cps, cost) = derive_factory_stats(factory.level, def);
    factory.current_cps = cps;
    factory.current_upgrade_cost = cost;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::EconomyCatalog;
    use proptest::prelude::*;

    fn food_at(level: u32, catalog: &EconomyCatalog) -> Track {
        let mut track = Track::new(&catalog.food);
        for next in 1..=level {
            track.level = next;
            recalculate_track(&mut track, &catalog.food);
        }
        recalculate_track(&mut track, &catalog.food);
        track
    }

    #[test]
    fn level_zero_has_no_production_or_maintenance() {
        let catalog = EconomyCatalog::default();
        let mut food = Track::new(&catalog.food);
        recalculate_track(&mut food, &catalog.food);
        assert_eq!(food.current_production, 0.0);
        assert_eq!(food.current_maintenance, 0.0);
        assert_eq!(food.current_upgrade_cost, 10.0);
        assert_eq!(food.current_name, "None");
    }

    #[test]
    fn first_level_locks_in_base_maintenance() {
        let catalog = EconomyCatalog::default();
        let food = food_at(1, &catalog);
        assert_eq!(food.base_maintenance, 0.06);
        assert_eq!(food.current_maintenance, 0.06);
        assert_eq!(food.current_production, 1.5);
        assert_eq!(food.current_upgrade_cost, 16.0);
        assert_eq!(food.current_name, "Foraging Party");

        let food = food_at(3, &catalog);
        assert_eq!(food.base_maintenance, 0.06);
        assert!((food.current_maintenance - (0.06 + 2.0 * 0.18)).abs() < 1e-12);
    }

    #[test]
    fn dropping_to_level_zero_resets_base_maintenance() {
        let catalog = EconomyCatalog::default();
        let mut food = food_at(2, &catalog);
        food.level = 0;
        recalculate_track(&mut food, &catalog.food);
        assert_eq!(food.base_maintenance, 0.0);
        assert_eq!(food.current_maintenance, 0.0);
    }

    #[test]
    fn shelter_has_no_production_table() {
        let catalog = EconomyCatalog::default();
        let mut shelter = Track::new(&catalog.shelter);
        shelter.level = 1;
        recalculate_track(&mut shelter, &catalog.shelter);
        assert_eq!(shelter.current_production, 0.0);
        assert_eq!(shelter.current_maintenance, 0.09);
    }

    #[test]
    fn surcharge_only_applies_to_owned_levels() {
        let catalog = EconomyCatalog::default();
        let mut shelter = Track::new(&catalog.shelter);
        shelter.maintenance_surcharge = 0.5;
        recalculate_track(&mut shelter, &catalog.shelter);
        assert_eq!(shelter.current_maintenance, 0.0);

        shelter.level = 1;
        recalculate_track(&mut shelter, &catalog.shelter);
        assert!((shelter.current_maintenance - 0.59).abs() < 1e-12);
    }

    #[test]
    fn max_level_cost_is_infinite() {
        let catalog = EconomyCatalog::default();
        let food = food_at(catalog.food.max_level, &catalog);
        assert!(food.current_upgrade_cost.is_infinite());
        assert_eq!(food.current_name, "Bio-Engineered Food Labs");
    }

    #[test]
    fn out_of_table_name_falls_back_to_unknown() {
        let mut catalog = EconomyCatalog::default();
        catalog.food.names.truncate(2);
        let mut food = Track::new(&catalog.food);
        food.level = 5;
        recalculate_track(&mut food, &catalog.food);
        assert_eq!(food.current_name, UNKNOWN_NAME);
    }

    #[test]
    fn level_is_clamped_to_max() {
        let catalog = EconomyCatalog::default();
        let mut food = Track::new(&catalog.food);
        food.level = 99;
        recalculate_track(&mut food, &catalog.food);
        assert_eq!(food.level, catalog.food.max_level);
        assert!(food.current_upgrade_cost.is_infinite());
    }

    #[test]
    fn wage_includes_milestone_bonus_step() {
        let promotion = PromotionCatalog::default();
        assert_eq!(promotion_wage(0, &promotion), 1.0);
        assert_eq!(promotion_wage(1, &promotion), 2.0);
        assert_eq!(promotion_wage(4, &promotion), 5.0);
        assert_eq!(promotion_wage(5, &promotion), 16.0);
        assert_eq!(promotion_wage(10, &promotion), 31.0);
    }

    #[test]
    fn milestone_bonus_only_on_exact_multiples() {
        let promotion = PromotionCatalog::default();
        assert_eq!(milestone_bonus(0, &promotion), None);
        assert_eq!(milestone_bonus(4, &promotion), None);
        assert_eq!(milestone_bonus(5, &promotion), Some(10.0));
        assert_eq!(milestone_bonus(15, &promotion), Some(10.0));
    }

    #[test]
    fn factory_stats_follow_compounding_curve() {
        let catalog = EconomyCatalog::default();
        let workshop = catalog.factory("workshop").unwrap();
        assert_eq!(derive_factory_stats(0, workshop), (0.0, 100.0));

        let (cps, cost) = derive_factory_stats(1, workshop);
        assert_eq!(cps, 1.0);
        assert_eq!(cost, (100.0 * 1.2_f64).floor());

        let (cps, cost) = derive_factory_stats(3, workshop);
        assert!((cps - 1.1_f64.powi(2)).abs() < 1e-12);
        assert_eq!(cost, (100.0 * 1.2_f64.powi(3)).floor());

        let (_, cost) = derive_factory_stats(workshop.max_level, workshop);
        assert!(cost.is_infinite());
    }

    proptest! {
        #[test]
        fn prop_recalculate_is_idempotent(level in 0u32..=20) {
            let catalog = EconomyCatalog::default();
            let mut once = food_at(level, &catalog);
            recalculate_track(&mut once, &catalog.food);
            let mut twice = once.clone();
            recalculate_track(&mut twice, &catalog.food);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_cost_infinite_iff_max(level in 0u32..=20) {
            let catalog = EconomyCatalog::default();
            let shelter = {
                let mut track = Track::new(&catalog.shelter);
                track.level = level;
                recalculate_track(&mut track, &catalog.shelter);
                track
            };
            prop_assert_eq!(shelter.current_upgrade_cost.is_infinite(), level == catalog.shelter.max_level);
        }

        #[test]
        fn prop_upgrade_cost_never_decreases(level in 0u32..19) {
            let catalog = EconomyCatalog::default();
            let now = upgrade_cost(10.0, 1.6, level, catalog.food.max_level);
            let next = upgrade_cost(10.0, 1.6, level + 1, catalog.food.max_level);
            prop_assert!(next >= now, "{} -> {}", now, next);
        }
    }
}
