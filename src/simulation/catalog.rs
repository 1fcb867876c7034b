//! Static economy catalog: level tables, cost curves, stages, factories and research.
//!
//! The catalog is loaded once when a world is built and never mutated afterwards.
//! Every tuning constant lives here so a balance pass only touches data.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::simulation::CatalogError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivalTuning {
    pub base_food_need: f64,
    /// Food level at which a non-negative food balance starts regenerating hunger.
    pub hunger_stability_level: u32,
    /// Shelter level below which health decays every tick.
    pub shelter_health_maintenance_level: u32,
    pub health_decay_no_shelter: f64,
    pub health_decay_low_hunger: f64,
    pub stat_regen_rate: f64,
    pub low_hunger_threshold: f64,
    pub health_regen_hunger_floor: f64,
    pub forage_hunger_gain: f64,
    pub forage_cooldown_ticks: u64,
    pub forage_max_food_level: u32,
}

impl Default for SurvivalTuning {
    fn default() -> Self {
        Self {
            base_food_need: 2.5,
            hunger_stability_level: 15,
            shelter_health_maintenance_level: 15,
            health_decay_no_shelter: 0.15,
            health_decay_low_hunger: 0.6,
            stat_regen_rate: 0.35,
            low_hunger_threshold: 25.0,
            health_regen_hunger_floor: 50.0,
            forage_hunger_gain: 3.0,
            forage_cooldown_ticks: 3,
            forage_max_food_level: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCatalog {
    pub base_wage: f64,
    pub wage_increase_per_level: f64,
    pub clicks_needed: u32,
    pub bonus_interval: u32,
    pub bonus_increment: f64,
}

impl Default for PromotionCatalog {
    fn default() -> Self {
        Self {
            base_wage: 1.0,
            wage_increase_per_level: 1.0,
            clicks_needed: 10,
            bonus_interval: 5,
            bonus_increment: 10.0,
        }
    }
}

/// Cost curve and per-level tables for a levelable track (food, shelter, science).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCatalog {
    pub max_level: u32,
    /// Base maintenance locked in the first time the track reaches level 1.
    pub locked_base_maintenance: f64,
    pub maintenance_per_level: f64,
    pub base_upgrade_cost: f64,
    pub upgrade_cost_multiplier: f64,
    pub names: Vec<String>,
    /// Production by level. Empty for tracks that produce nothing (shelter).
    #[serde(default)]
    pub production: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryDef {
    pub id: String,
    pub name: String,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub base_cps: f64,
    pub cps_multiplier: f64,
    pub max_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub text: String,
    pub activation_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEffect {
    Feedback { message: String },
    /// Reduces every maintenance charge by `fraction`.
    MaintenanceDiscount { fraction: f64 },
    /// Raises factory income by `fraction`.
    FactoryBoost { fraction: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchItem {
    pub key: String,
    pub name: String,
    pub cost: f64,
    pub effect: ResearchEffect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureEvent {
    pub name: String,
    pub food_need_increase: f64,
    pub shelter_maintenance_increase: f64,
}

/// Escalating needs: one event fires every `interval_ticks` until the table runs out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureSchedule {
    pub interval_ticks: u64,
    pub events: Vec<PressureEvent>,
}

#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
pub struct EconomyCatalog {
    pub survival: SurvivalTuning,
    pub interest_rate: f64,
    pub promotion: PromotionCatalog,
    pub food: TrackCatalog,
    pub shelter: TrackCatalog,
    pub science: TrackCatalog,
    pub factories: Vec<FactoryDef>,
    pub stages: Vec<Stage>,
    pub research: Vec<ResearchItem>,
    pub pressure: PressureSchedule,
}

impl EconomyCatalog {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading economy catalog {}", path.display()))?;
        let catalog: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing economy catalog {}", path.display()))?;
        catalog
            .validate()
            .with_context(|| format!("validating economy catalog {}", path.display()))?;
        Ok(catalog)
    }

    pub fn research_item(&self, key: &str) -> Option<&ResearchItem> {
        self.research.iter().find(|item| item.key == key)
    }

    pub fn factory(&self, id: &str) -> Option<&FactoryDef> {
        self.factories.iter().find(|def| def.id == id)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.stages.is_empty() {
            return Err(CatalogError::NoStages);
        }
        for pair in self.stages.windows(2) {
            if pair[1].activation_threshold <= pair[0].activation_threshold {
                return Err(CatalogError::StageOrder {
                    stage: pair[1].name.clone(),
                });
            }
        }

        for (track, entry) in [
            ("food", &self.food),
            ("shelter", &self.shelter),
            ("science", &self.science),
        ] {
            if entry.max_level == 0 {
                return Err(CatalogError::ZeroMaxLevel { what: track.to_string() });
            }
            let needed = entry.max_level as usize + 1;
            if entry.names.len() < needed {
                return Err(CatalogError::ShortTable {
                    track,
                    table: "names",
                    len: entry.names.len(),
                    needed,
                });
            }
            if !entry.production.is_empty() && entry.production.len() < needed {
                return Err(CatalogError::ShortTable {
                    track,
                    table: "production",
                    len: entry.production.len(),
                    needed,
                });
            }
            let constants = [
                entry.locked_base_maintenance,
                entry.maintenance_per_level,
                entry.base_upgrade_cost,
                entry.upgrade_cost_multiplier,
            ];
            if constants.iter().chain(&entry.production).any(|v| !v.is_finite()) {
                return Err(CatalogError::NonFinite { what: track.to_string() });
            }
        }

        let mut seen = HashSet::new();
        for def in &self.factories {
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateFactory(def.id.clone()));
            }
            if def.max_level == 0 {
                return Err(CatalogError::ZeroMaxLevel { what: def.id.clone() });
            }
            let constants = [def.base_cost, def.cost_multiplier, def.base_cps, def.cps_multiplier];
            if constants.iter().any(|v| !v.is_finite()) {
                return Err(CatalogError::NonFinite { what: def.id.clone() });
            }
        }

        let mut seen = HashSet::new();
        for item in &self.research {
            if !seen.insert(item.key.as_str()) {
                return Err(CatalogError::DuplicateResearch(item.key.clone()));
            }
            if !item.cost.is_finite() {
                return Err(CatalogError::NonFinite { what: item.key.clone() });
            }
        }

        if !self.interest_rate.is_finite() || !self.survival.base_food_need.is_finite() {
            return Err(CatalogError::NonFinite {
                what: "economy constants".to_string(),
            });
        }

        Ok(())
    }
}

fn names(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|name| name.to_string()).collect()
}

impl Default for EconomyCatalog {
    fn default() -> Self {
        let food = TrackCatalog {
            max_level: 20,
            locked_base_maintenance: 0.06,
            maintenance_per_level: 0.18,
            base_upgrade_cost: 10.0,
            upgrade_cost_multiplier: 1.60,
            names: names(&[
                "None",
                "Foraging Party",
                "Basic Traps",
                "Small Garden Plot",
                "Hunting & Gathering",
                "Simple Farming",
                "Crop Rotation Fields",
                "Fishing Nets",
                "Livestock Pen",
                "Orchard Groves",
                "Granary Storage",
                "Irrigated Farmland",
                "Aquaculture Ponds",
                "Selective Breeding Program",
                "Greenhouse Cultivation",
                "Food Preservation Techniques",
                "Mechanized Farming Tools",
                "Automated Crop Harvesting",
                "Hydroponics Bay",
                "Nutrient Paste Synthesis",
                "Bio-Engineered Food Labs",
            ]),
            production: vec![
                0.0, 1.5, 3.0, 5.0, 7.5, 10.0, 13.0, 16.5, 20.5, 25.0, 30.0, 36.0, 42.5, 50.0,
                58.0, 66.5, 75.0, 85.0, 96.0, 108.0, 120.0,
            ],
        };

        let shelter = TrackCatalog {
            max_level: 20,
            locked_base_maintenance: 0.09,
            maintenance_per_level: 0.22,
            base_upgrade_cost: 12.0,
            upgrade_cost_multiplier: 1.75,
            names: names(&[
                "None",
                "Leaf Lean-To",
                "Crude Dugout",
                "Basic Shack",
                "Wattle and Daub Hut",
                "Log Cabin",
                "Timber Frame House",
                "Stone Cottage",
                "Fortified Wooden Walls",
                "Community Longhouse",
                "Watchtower Outpost",
                "Underground Bunker Access",
                "Reinforced Structures",
                "Small Barracks",
                "Defensive Perimeter",
                "Medical Bay",
                "Multi-Story Habitation Block",
                "Geothermal Climate Control",
                "Blast-Proof Shelters",
                "Self-Sustaining Arcology",
                "Island Citadel",
            ]),
            production: Vec::new(),
        };

        let science = TrackCatalog {
            max_level: 10,
            locked_base_maintenance: 1.5,
            maintenance_per_level: 0.75,
            base_upgrade_cost: 2_500.0,
            upgrade_cost_multiplier: 1.9,
            names: names(&[
                "Dormant",
                "Field Notes",
                "Tinkerer's Bench",
                "Survey Team",
                "Analytical Lab",
                "Materials Workshop",
                "Research Institute",
                "Applied Physics Wing",
                "Orbital Observatory",
                "Propulsion Lab",
                "Launch Program",
            ]),
            production: vec![0.0, 0.5, 1.0, 1.8, 2.8, 4.0, 5.5, 7.5, 10.0, 13.0, 17.0],
        };

        let factory = |id: &str, name: &str, base_cost, cost_multiplier, base_cps, cps_multiplier| {
            FactoryDef {
                id: id.to_string(),
                name: name.to_string(),
                base_cost,
                cost_multiplier,
                base_cps,
                cps_multiplier,
                max_level: 50,
            }
        };

        let stage = |name: &str, text: &str, activation_threshold| Stage {
            name: name.to_string(),
            text: text.to_string(),
            activation_threshold,
        };

        let research = |key: &str, name: &str, cost, effect| ResearchItem {
            key: key.to_string(),
            name: name.to_string(),
            cost,
            effect,
        };

        let pressure = |name: &str, food_need_increase, shelter_maintenance_increase| PressureEvent {
            name: name.to_string(),
            food_need_increase,
            shelter_maintenance_increase,
        };

        Self {
            survival: SurvivalTuning::default(),
            interest_rate: 0.01,
            promotion: PromotionCatalog::default(),
            food,
            shelter,
            science,
            factories: vec![
                factory("scrap_yard", "Scrap Yard", 10.0, 1.15, 0.1, 1.08),
                factory("workshop", "Basic Workshop", 100.0, 1.20, 1.0, 1.10),
                factory("assembler", "Component Assembler", 1_200.0, 1.25, 8.0, 1.12),
                factory("refinery", "Ore Refinery", 15_000.0, 1.30, 50.0, 1.15),
                factory("lab", "Advanced Lab", 200_000.0, 1.35, 300.0, 1.18),
            ],
            stages: vec![
                stage(
                    "The Shore",
                    "Survival is paramount. Manage Health & Hunger. Earn capital for basic upgrades.",
                    0.0,
                ),
                stage(
                    "Early Survival",
                    "Basic needs are costly. Upgrade Food/Shelter towards Lvl 15 and seek Promotions for better wages.",
                    75.0,
                ),
                stage(
                    "Stabilizing?",
                    "Can you afford a Scrap Yard? Balancing survival needs and industrial investment is key.",
                    400.0,
                ),
                stage(
                    "First Industry",
                    "Factories add passive income, but don't neglect survival needs or promotions!",
                    2_000.0,
                ),
                stage(
                    "Growing Hub",
                    "Expand your factories while ensuring your population's well-being.",
                    10_000.0,
                ),
                stage(
                    "Technological Growth",
                    "Advanced factories require significant capital. Are your basic needs fully automated/stable?",
                    50_000.0,
                ),
                stage(
                    "Regional Power",
                    "Your island nation is influential. What's next on the horizon?",
                    250_000.0,
                ),
                stage(
                    "The Space Dream",
                    "The stars beckon. Can your economy support interstellar ambitions?",
                    1_000_000.0,
                ),
            ],
            research: vec![
                research(
                    "scientific_method",
                    "Scientific Method",
                    10.0,
                    ResearchEffect::Feedback {
                        message: "Hypotheses tested. The lab hums with possibility.".to_string(),
                    },
                ),
                research(
                    "efficient_logistics",
                    "Efficient Logistics",
                    40.0,
                    ResearchEffect::MaintenanceDiscount { fraction: 0.10 },
                ),
                research(
                    "assembly_automation",
                    "Assembly Automation",
                    120.0,
                    ResearchEffect::FactoryBoost { fraction: 0.25 },
                ),
                research(
                    "orbital_mechanics",
                    "Orbital Mechanics",
                    600.0,
                    ResearchEffect::Feedback {
                        message: "Trajectories plotted. The launch pad is within reach.".to_string(),
                    },
                ),
            ],
            pressure: PressureSchedule {
                interval_ticks: 180,
                events: vec![
                    pressure("Cold Snap", 0.5, 0.10),
                    pressure("Drought", 1.0, 0.05),
                    pressure("Population Boom", 2.0, 0.30),
                    pressure("Storm Season", 0.5, 0.50),
                ],
            },
        }
    }
}
