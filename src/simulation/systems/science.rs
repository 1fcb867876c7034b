//! Laboratory unlock, checked every economy phase.

use bevy_ecs::prelude::*;

use crate::simulation::stats::recalculate_track;
use crate::simulation::{
    EconomyCatalog, Laboratory, Needs, WorldEventKind, WorldEventLog, WorldTime,
};

/// Opens the laboratory once both survival needs are fully upgraded.
pub fn science_unlock_system(
    catalog: Res<EconomyCatalog>,
    needs: Res<Needs>,
    time: Res<WorldTime>,
    mut lab: ResMut<Laboratory>,
    mut event_log: ResMut<WorldEventLog>,
) {
    if lab.unlocked || !needs.food.is_maxed() || !needs.shelter.is_maxed() {
        return;
    }

    lab.unlocked = true;
    lab.science.level = 1;
    lab.science_points = 0.0;
    recalculate_track(&mut lab.science, &catalog.science);

    event_log.push(time.tick, WorldEventKind::ScienceUnlocked);
}
