//! Passive income: factory output and science points.

use bevy_ecs::prelude::*;

use crate::simulation::{Industry, Laboratory, Treasury};

pub fn income_system(
    industry: Res<Industry>,
    mut lab: ResMut<Laboratory>,
    mut treasury: ResMut<Treasury>,
) {
    treasury.capital += industry.total_cps() * lab.modifiers.factory_multiplier;

    if lab.unlocked {
        let produced = lab.science.current_production;
        lab.science_points += produced;
    }
}
