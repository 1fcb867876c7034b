//! Maintenance costs and interest on positive capital.

use bevy_ecs::prelude::*;

use crate::simulation::{EconomyCatalog, Laboratory, Needs, Treasury};

/// Total upkeep charged this tick, after research discounts.
pub fn total_maintenance(needs: &Needs, lab: &Laboratory) -> f64 {
    let mut upkeep = needs.food.current_maintenance + needs.shelter.current_maintenance;
    if lab.unlocked {
        upkeep += lab.science.current_maintenance;
    }
    upkeep * lab.modifiers.maintenance_multiplier
}

pub fn maintenance_system(needs: Res<Needs>, lab: Res<Laboratory>, mut treasury: ResMut<Treasury>) {
    treasury.capital -= total_maintenance(&needs, &lab);
}

pub fn interest_system(catalog: Res<EconomyCatalog>, mut treasury: ResMut<Treasury>) {
    // No interest either way on non-positive capital.
    if treasury.capital > 0.0 {
        treasury.capital += treasury.capital * catalog.interest_rate;
    }
}
