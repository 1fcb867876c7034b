//! Player actions, each a one-shot system that validates before it mutates.
//!
//! A precondition failure returns an `ActionError` or an `Ignored` outcome and
//! leaves every resource untouched. Mutation happens only after all checks pass,
//! followed by the matching stat recalculation.

use bevy_ecs::prelude::*;

use crate::simulation::stats::{milestone_bonus, recalculate_career, recalculate_factory, recalculate_track};
use crate::simulation::{
    ActionError, Career, EconomyCatalog, GameStatus, Industry, Laboratory, NeedKind, Needs,
    ResearchEffect, TrackCatalog, TrackKind, Treasury, Vitals, WorldEventKind, WorldEventLog,
    WorldTime,
};

pub type ActionResult = Result<ActionOutcome, ActionError>;

/// Everything the player can ask the simulation to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EarnWage,
    Promote,
    UpgradeNeed(NeedKind),
    ManualForage,
    UpgradeScience,
    UnlockResearch(String),
    BuyFactory(String),
    UpgradeFactory(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied(Feedback),
    Ignored(IgnoreReason),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }
}

/// Silent no-ops: expected states, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    GameOver,
    NotEnoughClicks,
    CoolingDown { ready_at: u64 },
    AlreadyUnlocked,
}

/// What changed, for the presentation layer's short-lived message.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    WageEarned {
        amount: f64,
        clicks: u32,
        clicks_needed: u32,
    },
    Promoted {
        level: u32,
        wage: f64,
        milestone_bonus: Option<f64>,
    },
    Upgraded {
        track: TrackKind,
        level: u32,
        name: String,
        cost: f64,
    },
    Foraged {
        hunger_gained: f64,
        ready_at: u64,
    },
    ResearchUnlocked {
        key: String,
        name: String,
        effect: ResearchEffect,
    },
    FactoryBought {
        id: String,
        name: String,
        cost: f64,
    },
}

fn need_catalog(catalog: &EconomyCatalog, kind: NeedKind) -> &TrackCatalog {
    match kind {
        NeedKind::Food => &catalog.food,
        NeedKind::Shelter => &catalog.shelter,
    }
}

fn ensure_affordable(cost: f64, capital: f64) -> Result<(), ActionError> {
    if capital >= cost {
        Ok(())
    } else {
        Err(ActionError::InsufficientCapital {
            needed: cost,
            available: capital,
        })
    }
}

pub fn earn_wage(
    status: Res<GameStatus>,
    mut career: ResMut<Career>,
    mut treasury: ResMut<Treasury>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }

    treasury.capital += career.current_wage;
    career.current_clicks = (career.current_clicks + 1).min(career.clicks_needed);

    Ok(ActionOutcome::Applied(Feedback::WageEarned {
        amount: career.current_wage,
        clicks: career.current_clicks,
        clicks_needed: career.clicks_needed,
    }))
}

pub fn promote(
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    time: Res<WorldTime>,
    mut career: ResMut<Career>,
    mut event_log: ResMut<WorldEventLog>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }
    if !career.can_promote() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::NotEnoughClicks));
    }

    career.level += 1;
    career.current_clicks = 0;
    recalculate_career(&mut career, &catalog.promotion);

    let bonus = milestone_bonus(career.level, &catalog.promotion);
    event_log.push(
        time.tick,
        WorldEventKind::Promoted {
            level: career.level,
            milestone_bonus: bonus,
        },
    );

    Ok(ActionOutcome::Applied(Feedback::Promoted {
        level: career.level,
        wage: career.current_wage,
        milestone_bonus: bonus,
    }))
}

pub fn upgrade_need(
    In(kind): In<NeedKind>,
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    mut needs: ResMut<Needs>,
    mut treasury: ResMut<Treasury>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }

    let track = needs.track_mut(kind);
    if track.is_maxed() {
        return Err(ActionError::MaxLevel {
            track: TrackKind::Need(kind),
        });
    }
    let cost = track.current_upgrade_cost;
    ensure_affordable(cost, treasury.capital)?;

    treasury.capital -= cost;
    track.level += 1;
    recalculate_track(track, need_catalog(&catalog, kind));

    Ok(ActionOutcome::Applied(Feedback::Upgraded {
        track: TrackKind::Need(kind),
        level: track.level,
        name: track.current_name.clone(),
        cost,
    }))
}

pub fn manual_forage(
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    time: Res<WorldTime>,
    mut needs: ResMut<Needs>,
    mut vitals: ResMut<Vitals>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }
    if time.tick < needs.forage_cooldown_end_tick {
        return Ok(ActionOutcome::Ignored(IgnoreReason::CoolingDown {
            ready_at: needs.forage_cooldown_end_tick,
        }));
    }

    let tuning = &catalog.survival;
    let before = vitals.hunger();
    vitals.set_hunger(before + tuning.forage_hunger_gain);
    needs.forage_cooldown_end_tick = time.tick + tuning.forage_cooldown_ticks;

    Ok(ActionOutcome::Applied(Feedback::Foraged {
        hunger_gained: vitals.hunger() - before,
        ready_at: needs.forage_cooldown_end_tick,
    }))
}

pub fn upgrade_science(
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    mut lab: ResMut<Laboratory>,
    mut treasury: ResMut<Treasury>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }
    if !lab.unlocked {
        return Err(ActionError::ScienceLocked);
    }
    if lab.science.is_maxed() {
        return Err(ActionError::MaxLevel {
            track: TrackKind::Science,
        });
    }
    let cost = lab.science.current_upgrade_cost;
    ensure_affordable(cost, treasury.capital)?;

    treasury.capital -= cost;
    lab.science.level += 1;
    recalculate_track(&mut lab.science, &catalog.science);

    Ok(ActionOutcome::Applied(Feedback::Upgraded {
        track: TrackKind::Science,
        level: lab.science.level,
        name: lab.science.current_name.clone(),
        cost,
    }))
}

pub fn unlock_research(
    In(key): In<String>,
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    time: Res<WorldTime>,
    mut lab: ResMut<Laboratory>,
    mut event_log: ResMut<WorldEventLog>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }
    if !lab.unlocked {
        return Err(ActionError::ScienceLocked);
    }
    let Some(item) = catalog.research_item(&key) else {
        return Err(ActionError::UnknownResearch(key));
    };
    if lab.unlocked_research.contains(&item.key) {
        return Ok(ActionOutcome::Ignored(IgnoreReason::AlreadyUnlocked));
    }
    if lab.science_points < item.cost {
        return Err(ActionError::InsufficientSciencePoints {
            needed: item.cost,
            available: lab.science_points,
        });
    }

    lab.science_points -= item.cost;
    lab.unlocked_research.insert(item.key.clone());
    let message = match &item.effect {
        ResearchEffect::Feedback { message } => Some(message.clone()),
        ResearchEffect::MaintenanceDiscount { fraction } => {
            lab.modifiers.maintenance_multiplier *= (1.0 - fraction).max(0.0);
            None
        }
        ResearchEffect::FactoryBoost { fraction } => {
            lab.modifiers.factory_multiplier *= 1.0 + fraction.max(0.0);
            None
        }
    };

    event_log.push(
        time.tick,
        WorldEventKind::ResearchCompleted {
            key: item.key.clone(),
            name: item.name.clone(),
            message,
        },
    );

    Ok(ActionOutcome::Applied(Feedback::ResearchUnlocked {
        key: item.key.clone(),
        name: item.name.clone(),
        effect: item.effect.clone(),
    }))
}

pub fn buy_factory(
    In(id): In<String>,
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    mut industry: ResMut<Industry>,
    mut treasury: ResMut<Treasury>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }
    let (Some(def), Some(factory)) = (catalog.factory(&id), industry.factory_mut(&id)) else {
        return Err(ActionError::UnknownFactory(id));
    };
    if factory.is_owned() {
        return Err(ActionError::FactoryAlreadyOwned(id));
    }
    ensure_affordable(def.base_cost, treasury.capital)?;

    treasury.capital -= def.base_cost;
    factory.level = 1;
    recalculate_factory(factory, def);

    Ok(ActionOutcome::Applied(Feedback::FactoryBought {
        id,
        name: factory.name.clone(),
        cost: def.base_cost,
    }))
}

pub fn upgrade_factory(
    In(id): In<String>,
    status: Res<GameStatus>,
    catalog: Res<EconomyCatalog>,
    mut industry: ResMut<Industry>,
    mut treasury: ResMut<Treasury>,
) -> ActionResult {
    if status.is_over() {
        return Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
    }
    let (Some(def), Some(factory)) = (catalog.factory(&id), industry.factory_mut(&id)) else {
        return Err(ActionError::UnknownFactory(id));
    };
    if !factory.is_owned() {
        return Err(ActionError::FactoryNotOwned(id));
    }
    if factory.is_maxed() {
        return Err(ActionError::MaxLevel {
            track: TrackKind::Factory(id),
        });
    }
    let cost = factory.current_upgrade_cost;
    ensure_affordable(cost, treasury.capital)?;

    treasury.capital -= cost;
    factory.level += 1;
    recalculate_factory(factory, def);

    Ok(ActionOutcome::Applied(Feedback::Upgraded {
        track: TrackKind::Factory(id),
        level: factory.level,
        name: factory.name.clone(),
        cost,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{SimulationConfig, build_world};
    use bevy_ecs::system::RunSystemOnce;

    fn fresh() -> World {
        build_world(SimulationConfig::default())
    }

    fn capital(world: &World) -> f64 {
        world.resource::<Treasury>().capital
    }

    fn set_capital(world: &mut World, capital: f64) {
        world.resource_mut::<Treasury>().capital = capital;
    }

    fn open_lab(world: &mut World, points: f64) {
        let science = world.resource::<EconomyCatalog>().science.clone();
        let mut lab = world.resource_mut::<Laboratory>();
        lab.unlocked = true;
        lab.science.level = 1;
        lab.science_points = points;
        recalculate_track(&mut lab.science, &science);
    }

    #[test]
    fn clicks_saturate_at_clicks_needed() {
        let mut world = fresh();
        for _ in 0..15 {
            world.run_system_once(earn_wage).unwrap();
        }
        let career = world.resource::<Career>();
        assert_eq!(career.current_clicks, career.clicks_needed);
        assert_eq!(capital(&world), 15.0);
    }

    #[test]
    fn promote_without_clicks_is_ignored() {
        let mut world = fresh();
        let outcome = world.run_system_once(promote).unwrap();
        assert_eq!(outcome, ActionOutcome::Ignored(IgnoreReason::NotEnoughClicks));
        assert_eq!(world.resource::<Career>().level, 0);
    }

    #[test]
    fn fifth_promotion_reports_milestone_bonus() {
        let mut world = fresh();
        world.resource_mut::<Career>().level = 4;
        world.resource_mut::<Career>().current_clicks = 10;
        let outcome = world.run_system_once(promote).unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Applied(Feedback::Promoted {
                level: 5,
                wage: 16.0,
                milestone_bonus: Some(10.0),
            })
        );
    }

    #[test]
    fn max_level_reported_before_capital() {
        let mut world = fresh();
        let max = world.resource::<Needs>().shelter.max_level;
        let shelter = world.resource::<EconomyCatalog>().shelter.clone();
        {
            let mut needs = world.resource_mut::<Needs>();
            needs.shelter.level = max;
            recalculate_track(&mut needs.shelter, &shelter);
        }
        let err = world
            .run_system_once_with(NeedKind::Shelter, upgrade_need)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::MaxLevel {
                track: TrackKind::Need(NeedKind::Shelter)
            }
        );
    }

    #[test]
    fn failed_upgrade_leaves_state_untouched() {
        let mut world = fresh();
        set_capital(&mut world, 9.0);
        let err = world
            .run_system_once_with(NeedKind::Food, upgrade_need)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::InsufficientCapital {
                needed: 10.0,
                available: 9.0
            }
        );
        assert_eq!(capital(&world), 9.0);
        assert_eq!(world.resource::<Needs>().food.level, 0);
    }

    #[test]
    fn forage_respects_inclusive_cooldown() {
        let mut world = fresh();
        world.resource_mut::<Vitals>().set_hunger(50.0);
        let first = world.run_system_once(manual_forage).unwrap();
        assert_eq!(
            first,
            ActionOutcome::Applied(Feedback::Foraged {
                hunger_gained: 3.0,
                ready_at: 3
            })
        );

        world.resource_mut::<WorldTime>().tick = 2;
        let early = world.run_system_once(manual_forage).unwrap();
        assert_eq!(
            early,
            ActionOutcome::Ignored(IgnoreReason::CoolingDown { ready_at: 3 })
        );

        world.resource_mut::<WorldTime>().tick = 3;
        assert!(world.run_system_once(manual_forage).unwrap().is_applied());
        assert_eq!(world.resource::<Vitals>().hunger(), 56.0);
    }

    #[test]
    fn forage_gain_is_clamped() {
        let mut world = fresh();
        let outcome = world.run_system_once(manual_forage).unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Applied(Feedback::Foraged {
                hunger_gained: 0.0,
                ready_at: 3
            })
        );
        assert_eq!(world.resource::<Vitals>().hunger(), 100.0);
    }

    #[test]
    fn science_actions_require_unlock() {
        let mut world = fresh();
        set_capital(&mut world, 1e9);
        assert_eq!(
            world.run_system_once(upgrade_science).unwrap_err(),
            ActionError::ScienceLocked
        );
        assert_eq!(
            world
                .run_system_once_with("scientific_method".to_string(), unlock_research)
                .unwrap_err(),
            ActionError::ScienceLocked
        );
    }

    #[test]
    fn science_upgrade_at_exact_cost_deducts_and_recalculates() {
        let mut world = fresh();
        open_lab(&mut world, 0.0);
        let cost = world.resource::<Laboratory>().science.current_upgrade_cost;
        set_capital(&mut world, cost);

        let outcome = world.run_system_once(upgrade_science).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(capital(&world), 0.0);

        let expected_name = world.resource::<EconomyCatalog>().science.names[2].clone();
        let science = &world.resource::<Laboratory>().science;
        assert_eq!(science.level, 2);
        assert_eq!(science.current_name, expected_name);
        assert!(science.current_upgrade_cost > cost);
    }

    #[test]
    fn maxed_science_refuses_upgrade_regardless_of_capital() {
        let mut world = fresh();
        open_lab(&mut world, 0.0);
        let science = world.resource::<EconomyCatalog>().science.clone();
        {
            let mut lab = world.resource_mut::<Laboratory>();
            lab.science.level = science.max_level;
            recalculate_track(&mut lab.science, &science);
        }
        set_capital(&mut world, 1e15);

        assert_eq!(
            world.run_system_once(upgrade_science).unwrap_err(),
            ActionError::MaxLevel {
                track: TrackKind::Science
            }
        );
        assert_eq!(capital(&world), 1e15);
    }

    #[test]
    fn research_checks_run_in_order() {
        let mut world = fresh();
        open_lab(&mut world, 5.0);

        let unknown = world
            .run_system_once_with("alchemy".to_string(), unlock_research)
            .unwrap_err();
        assert_eq!(unknown, ActionError::UnknownResearch("alchemy".to_string()));

        let poor = world
            .run_system_once_with("scientific_method".to_string(), unlock_research)
            .unwrap_err();
        assert_eq!(
            poor,
            ActionError::InsufficientSciencePoints {
                needed: 10.0,
                available: 5.0
            }
        );
    }

    #[test]
    fn second_unlock_is_noop_without_double_deduction() {
        let mut world = fresh();
        open_lab(&mut world, 25.0);

        let first = world
            .run_system_once_with("scientific_method".to_string(), unlock_research)
            .unwrap();
        assert!(first.is_applied());
        assert_eq!(world.resource::<Laboratory>().science_points, 15.0);

        let second = world
            .run_system_once_with("scientific_method".to_string(), unlock_research)
            .unwrap();
        assert_eq!(second, ActionOutcome::Ignored(IgnoreReason::AlreadyUnlocked));
        assert_eq!(world.resource::<Laboratory>().science_points, 15.0);
    }

    #[test]
    fn research_effects_feed_modifiers() {
        let mut world = fresh();
        open_lab(&mut world, 1_000.0);
        world
            .run_system_once_with("efficient_logistics".to_string(), unlock_research)
            .unwrap();
        world
            .run_system_once_with("assembly_automation".to_string(), unlock_research)
            .unwrap();

        let modifiers = world.resource::<Laboratory>().modifiers;
        assert!((modifiers.maintenance_multiplier - 0.9).abs() < 1e-12);
        assert!((modifiers.factory_multiplier - 1.25).abs() < 1e-12);
    }

    #[test]
    fn factory_lifecycle() {
        let mut world = fresh();
        set_capital(&mut world, 100.0);

        let not_owned = world
            .run_system_once_with("workshop".to_string(), upgrade_factory)
            .unwrap_err();
        assert_eq!(not_owned, ActionError::FactoryNotOwned("workshop".to_string()));

        let bought = world
            .run_system_once_with("workshop".to_string(), buy_factory)
            .unwrap();
        assert!(bought.is_applied());
        assert_eq!(capital(&world), 0.0);
        let workshop = world.resource::<Industry>().factory("workshop").cloned().unwrap();
        assert_eq!(workshop.level, 1);
        assert_eq!(workshop.current_cps, 1.0);

        let again = world
            .run_system_once_with("workshop".to_string(), buy_factory)
            .unwrap_err();
        assert_eq!(again, ActionError::FactoryAlreadyOwned("workshop".to_string()));

        let unknown = world
            .run_system_once_with("mint".to_string(), buy_factory)
            .unwrap_err();
        assert_eq!(unknown, ActionError::UnknownFactory("mint".to_string()));
    }

    #[test]
    fn factory_upgrade_at_exact_cost_leaves_zero_capital() {
        let mut world = fresh();
        set_capital(&mut world, 100.0);
        world
            .run_system_once_with("workshop".to_string(), buy_factory)
            .unwrap();

        let cost = world.resource::<Industry>().factory("workshop").unwrap().current_upgrade_cost;
        set_capital(&mut world, cost);
        let outcome = world
            .run_system_once_with("workshop".to_string(), upgrade_factory)
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(capital(&world), 0.0);

        let def = world.resource::<EconomyCatalog>().factory("workshop").cloned().unwrap();
        let workshop = world.resource::<Industry>().factory("workshop").cloned().unwrap();
        assert_eq!(workshop.level, 2);
        assert!((workshop.current_cps - def.base_cps * def.cps_multiplier).abs() < 1e-12);
    }

    #[test]
    fn maxed_factory_refuses_upgrade_regardless_of_capital() {
        let mut world = fresh();
        set_capital(&mut world, 10.0);
        world
            .run_system_once_with("scrap_yard".to_string(), buy_factory)
            .unwrap();

        let def = world.resource::<EconomyCatalog>().factory("scrap_yard").cloned().unwrap();
        {
            let mut industry = world.resource_mut::<Industry>();
            let yard = industry.factory_mut("scrap_yard").unwrap();
            yard.level = def.max_level;
            recalculate_factory(yard, &def);
        }
        set_capital(&mut world, 1e15);

        let maxed = world
            .run_system_once_with("scrap_yard".to_string(), upgrade_factory)
            .unwrap_err();
        assert_eq!(
            maxed,
            ActionError::MaxLevel {
                track: TrackKind::Factory("scrap_yard".to_string())
            }
        );
        assert_eq!(capital(&world), 1e15);
    }

    #[test]
    fn game_over_turns_every_action_into_noop() {
        let mut world = fresh();
        world
            .resource_mut::<GameStatus>()
            .end(crate::simulation::GameOverReason::Hunger);
        set_capital(&mut world, 1e9);

        let ignored: ActionResult = Ok(ActionOutcome::Ignored(IgnoreReason::GameOver));
        assert_eq!(world.run_system_once(earn_wage), ignored);
        assert_eq!(world.run_system_once_with(NeedKind::Food, upgrade_need), ignored);
        assert_eq!(world.run_system_once(manual_forage), ignored);
        assert_eq!(
            world.run_system_once_with("workshop".to_string(), buy_factory),
            ignored
        );
        assert_eq!(capital(&world), 1e9);
    }
}
