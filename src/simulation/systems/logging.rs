//! Colorized tick logging for quick CLI scanning.

use bevy_ecs::prelude::*;
use colored::{Color, Colorize};
use tracing::{debug, info, warn};

use crate::simulation::format::format_number;
use crate::simulation::{
    EconomyCatalog, Industry, Needs, Pressure, Sentiment, SimulationConfig, Storyline, Treasury,
    Vitals, WorldEvent, WorldEventKind, WorldEventLog, WorldTime,
};

fn badge(label: &str, color: Color) -> String {
    format!("[{}]", label).color(color).to_string()
}

fn category_color(category: &str) -> Color {
    match category {
        "Stage" => Color::BrightBlue,
        "Career" => Color::BrightGreen,
        "Science" | "Research" => Color::BrightCyan,
        "Pressure" => Color::Yellow,
        "GameOver" => Color::BrightRed,
        _ => Color::White,
    }
}

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::BrightGreen,
        Sentiment::Neutral => Color::BrightBlack,
        Sentiment::Negative => Color::BrightRed,
    }
}

fn vital_color(value: f64) -> Color {
    if value < 25.0 {
        Color::BrightRed
    } else if value < 50.0 {
        Color::Yellow
    } else {
        Color::BrightGreen
    }
}

fn format_event_line(event: &WorldEvent) -> String {
    let category = event.category();
    format!(
        "{} {} {} {}",
        badge(category, category_color(category)),
        badge(&format!("{:?}", event.sentiment()), sentiment_color(event.sentiment())),
        badge(&format!("Tick {}", event.tick), Color::BrightBlack),
        event.headline(),
    )
}

fn format_status_line(
    tick: u64,
    capital: f64,
    vitals: &Vitals,
    stage: &str,
    food_need: f64,
    needs: &Needs,
    cps: f64,
) -> String {
    format!(
        "{} {} {} {} {} {} {}",
        badge(&format!("Tick {}", tick), Color::BrightBlack),
        badge(stage, Color::BrightBlue),
        badge(&format!("${}", format_number(capital, 2)), Color::BrightYellow),
        badge(
            &format!("Health {:.1}", vitals.health()),
            vital_color(vitals.health())
        ),
        badge(
            &format!("Hunger {:.1}", vitals.hunger()),
            vital_color(vitals.hunger())
        ),
        badge(
            &format!(
                "Food L{} {:.1}/{:.1}",
                needs.food.level, needs.food.current_production, food_need
            ),
            Color::Green
        ),
        badge(
            &format!("Shelter L{} | {}/s", needs.shelter.level, format_number(cps, 2)),
            Color::Cyan
        ),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn logging_system(
    mut cursor: Local<u64>,
    config: Res<SimulationConfig>,
    catalog: Res<EconomyCatalog>,
    time: Res<WorldTime>,
    treasury: Res<Treasury>,
    vitals: Res<Vitals>,
    needs: Res<Needs>,
    industry: Res<Industry>,
    pressure: Res<Pressure>,
    storyline: Res<Storyline>,
    events: Res<WorldEventLog>,
) {
    for event in events.since(*cursor) {
        let line = format_event_line(event);
        match event.kind {
            WorldEventKind::GameOver { .. } | WorldEventKind::PressureRising { .. } => {
                warn!("{}", line)
            }
            _ => info!("{}", line),
        }
    }
    *cursor = events.next_seq();

    if config.status_log_interval > 0 && time.tick % config.status_log_interval == 0 {
        let stage = catalog
            .stages
            .get(storyline.stage_index)
            .map(|stage| stage.name.as_str())
            .unwrap_or("Unknown");
        debug!(
            "{}",
            format_status_line(
                time.tick,
                treasury.capital,
                &vitals,
                stage,
                pressure.current_food_need,
                &needs,
                industry.total_cps(),
            )
        );
    }
}
