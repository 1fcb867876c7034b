//! Structured world events and the bounded log observers read them from.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::simulation::GameOverReason;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEventKind {
    StageAdvanced {
        index: usize,
        name: String,
        text: String,
    },
    Promoted {
        level: u32,
        milestone_bonus: Option<f64>,
    },
    ScienceUnlocked,
    ResearchCompleted {
        key: String,
        name: String,
        message: Option<String>,
    },
    PressureRising {
        name: String,
        food_need: f64,
    },
    GameOver {
        reason: GameOverReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// Monotonic sequence number within one game.
    pub seq: u64,
    pub tick: u64,
    pub kind: WorldEventKind,
}

impl WorldEvent {
    pub fn category(&self) -> &'static str {
        match &self.kind {
            WorldEventKind::StageAdvanced { .. } => "Stage",
            WorldEventKind::Promoted { .. } => "Career",
            WorldEventKind::ScienceUnlocked => "Science",
            WorldEventKind::ResearchCompleted { .. } => "Research",
            WorldEventKind::PressureRising { .. } => "Pressure",
            WorldEventKind::GameOver { .. } => "GameOver",
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        match &self.kind {
            WorldEventKind::StageAdvanced { .. } => Sentiment::Positive,
            WorldEventKind::Promoted { .. } => Sentiment::Positive,
            WorldEventKind::ScienceUnlocked => Sentiment::Positive,
            WorldEventKind::ResearchCompleted { .. } => Sentiment::Positive,
            WorldEventKind::PressureRising { .. } => Sentiment::Negative,
            WorldEventKind::GameOver { .. } => Sentiment::Negative,
        }
    }

    pub fn headline(&self) -> String {
        match &self.kind {
            WorldEventKind::StageAdvanced { name, text, .. } => format!("{name}: {text}"),
            WorldEventKind::Promoted {
                level,
                milestone_bonus: Some(bonus),
            } => format!("Promoted to level {level}! Prize: +${bonus:.2} bonus wage per click"),
            WorldEventKind::Promoted { level, .. } => {
                format!("Promoted to level {level}! Wage increased")
            }
            WorldEventKind::ScienceUnlocked => {
                "Food and shelter are secured. Science is now unlocked".to_string()
            }
            WorldEventKind::ResearchCompleted {
                name,
                message: Some(message),
                ..
            } => format!("Research complete: {name}. {message}"),
            WorldEventKind::ResearchCompleted { name, .. } => format!("Research complete: {name}"),
            WorldEventKind::PressureRising { name, food_need } => {
                format!("{name}! Needs increased, food need now {food_need:.2}/s")
            }
            WorldEventKind::GameOver { reason } => match reason {
                GameOverReason::Hunger => "Game over: the population starved".to_string(),
                GameOverReason::Health => "Game over: health collapsed".to_string(),
                GameOverReason::Error => "Game over: the simulation hit an internal fault".to_string(),
            },
        }
    }
}

#[derive(Debug, Resource)]
pub struct WorldEventLog {
    events: VecDeque<WorldEvent>,
    capacity: usize,
    next_seq: u64,
}

impl WorldEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn push(&mut self, tick: u64, kind: WorldEventKind) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(WorldEvent {
            seq: self.next_seq,
            tick,
            kind,
        });
        self.next_seq += 1;
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Events with `seq >= cursor`, oldest first.
    pub fn since(&self, cursor: u64) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter().filter(move |event| event.seq >= cursor)
    }

    pub fn snapshot(&self) -> Vec<WorldEvent> {
        self.events.iter().cloned().collect()
    }
}

impl Default for WorldEventLog {
    fn default() -> Self {
        Self::new(64)
    }
}
