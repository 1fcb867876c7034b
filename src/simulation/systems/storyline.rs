//! Narrative stage progression keyed by capital thresholds.

use bevy_ecs::prelude::*;

use crate::simulation::{EconomyCatalog, Storyline, Treasury, WorldEventKind, WorldEventLog, WorldTime};

/// At most one step per tick; a larger leap is picked up on later ticks.
pub fn stage_system(
    catalog: Res<EconomyCatalog>,
    treasury: Res<Treasury>,
    time: Res<WorldTime>,
    mut storyline: ResMut<Storyline>,
    mut event_log: ResMut<WorldEventLog>,
) {
    let Some(next) = catalog.stages.get(storyline.stage_index + 1) else {
        return;
    };
    if treasury.capital < next.activation_threshold {
        return;
    }

    storyline.stage_index += 1;
    event_log.push(
        time.tick,
        WorldEventKind::StageAdvanced {
            index: storyline.stage_index,
            name: next.name.clone(),
            text: next.text.clone(),
        },
    );
}

/// Fraction of the way from the current stage's threshold to the next one.
pub fn stage_progress(catalog: &EconomyCatalog, stage_index: usize, capital: f64) -> f64 {
    let (Some(current), Some(next)) = (
        catalog.stages.get(stage_index),
        catalog.stages.get(stage_index + 1),
    ) else {
        return 1.0;
    };
    let range = next.activation_threshold - current.activation_threshold;
    if range <= 0.0 {
        return 1.0;
    }
    ((capital - current.activation_threshold) / range).clamp(0.0, 1.0)
}
