//! Timed pressure events that raise food need and shelter upkeep.

use bevy_ecs::prelude::*;
use tracing::debug;

use crate::simulation::stats::recalculate_track;
use crate::simulation::{
    EconomyCatalog, Needs, Pressure, WorldEventKind, WorldEventLog, WorldTime,
};

pub fn pressure_system(
    catalog: Res<EconomyCatalog>,
    time: Res<WorldTime>,
    mut pressure: ResMut<Pressure>,
    mut needs: ResMut<Needs>,
    mut event_log: ResMut<WorldEventLog>,
) {
    let Some(remaining) = pressure.ticks_until_next_event else {
        return;
    };
    let remaining = remaining.saturating_sub(1);
    if remaining > 0 {
        pressure.ticks_until_next_event = Some(remaining);
        return;
    }

    let schedule = &catalog.pressure;
    let Some(event) = schedule.events.get(pressure.next_event_index) else {
        pressure.ticks_until_next_event = None;
        return;
    };

    pressure.current_food_need += event.food_need_increase;
    needs.shelter.maintenance_surcharge += event.shelter_maintenance_increase;
    recalculate_track(&mut needs.shelter, &catalog.shelter);

    pressure.next_event_index += 1;
    pressure.ticks_until_next_event = (pressure.next_event_index < schedule.events.len())
        .then_some(schedule.interval_ticks);

    debug!(
        event = %event.name,
        food_need = pressure.current_food_need,
        surcharge = needs.shelter.maintenance_surcharge,
        "pressure event fired"
    );
    event_log.push(
        time.tick,
        WorldEventKind::PressureRising {
            name: event.name.clone(),
            food_need: pressure.current_food_need,
        },
    );
}
