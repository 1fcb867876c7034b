//! Post-mutation guard over the progression state.
//!
//! Runs after every tick and every applied action. Any violation means derived
//! state is corrupt; the caller ends the game with reason `Error`.

use bevy_ecs::prelude::*;

use crate::simulation::{
    EconomyCatalog, Factory, Industry, Laboratory, MAX_STAT, Needs, SimulationFault, Storyline,
    Track, Treasury, Vitals,
};

fn finite(field: impl Into<String>, value: f64) -> Result<(), SimulationFault> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationFault::NonFinite {
            field: field.into(),
            value,
        })
    }
}

fn vital(field: &'static str, value: f64) -> Result<(), SimulationFault> {
    if (0.0..=MAX_STAT).contains(&value) {
        Ok(())
    } else {
        Err(SimulationFault::VitalOutOfRange { field, value })
    }
}

fn level_and_cost(name: &str, level: u32, max_level: u32, cost: f64) -> Result<(), SimulationFault> {
    if level > max_level {
        return Err(SimulationFault::LevelOutOfRange {
            track: name.to_string(),
            level,
            max_level,
        });
    }
    // Infinity is the max-level marker and nothing else.
    if cost.is_nan() || cost.is_infinite() != (level == max_level) {
        return Err(SimulationFault::CostMismatch {
            track: name.to_string(),
            cost,
            level,
            max_level,
        });
    }
    Ok(())
}

fn check_track(name: &str, track: &Track) -> Result<(), SimulationFault> {
    level_and_cost(name, track.level, track.max_level, track.current_upgrade_cost)?;
    finite(format!("{name} production"), track.current_production)?;
    finite(format!("{name} maintenance"), track.current_maintenance)
}

fn check_factory(factory: &Factory) -> Result<(), SimulationFault> {
    level_and_cost(
        &factory.id,
        factory.level,
        factory.max_level,
        factory.current_upgrade_cost,
    )?;
    finite(format!("{} cps", factory.id), factory.current_cps)
}

pub fn verify(world: &World) -> Result<(), SimulationFault> {
    let catalog = world.resource::<EconomyCatalog>();

    finite("capital", world.resource::<Treasury>().capital)?;

    let vitals = world.resource::<Vitals>();
    vital("health", vitals.health())?;
    vital("hunger", vitals.hunger())?;

    let needs = world.resource::<Needs>();
    check_track("food", &needs.food)?;
    check_track("shelter", &needs.shelter)?;

    let lab = world.resource::<Laboratory>();
    check_track("science", &lab.science)?;
    finite("science points", lab.science_points)?;
    if let Some(key) = lab
        .unlocked_research
        .iter()
        .find(|key| catalog.research_item(key).is_none())
    {
        return Err(SimulationFault::UnknownResearchUnlocked(key.clone()));
    }

    for factory in &world.resource::<Industry>().factories {
        check_factory(factory)?;
    }

    let index = world.resource::<Storyline>().stage_index;
    if index >= catalog.stages.len() {
        return Err(SimulationFault::StageOutOfRange {
            index,
            len: catalog.stages.len(),
        });
    }

    Ok(())
}
