//! Tick scheduler: a tokio task that owns the simulation.
//!
//! Ticks fire on a fixed interval; actions, snapshot queries and restarts
//! arrive over a command channel and are handled between ticks, so the two
//! never interleave. The task stops ticking by itself once the game is over
//! and resumes after a restart.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Notify, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::simulation::{
    Action, ActionResult, GameOverReason, NeedKind, ProgressionSnapshot, SimulationWorld,
    TickStatus,
};

const COMMAND_BUFFER: usize = 64;
const NOTICE_BUFFER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("simulation scheduler has stopped")]
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverNotice {
    pub reason: GameOverReason,
    pub tick: u64,
    pub generation: u64,
}

enum Command {
    Act(Action, oneshot::Sender<ActionResult>),
    Snapshot(oneshot::Sender<ProgressionSnapshot>),
    Restart(oneshot::Sender<()>),
}

/// Cheap to clone; every clone talks to the same scheduler task.
#[derive(Clone)]
pub struct GameHandle {
    commands: mpsc::Sender<Command>,
    game_over: broadcast::Sender<GameOverNotice>,
    shutdown: Arc<Notify>,
    observer: Arc<RwLock<ProgressionSnapshot>>,
}

impl GameHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SchedulerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| SchedulerError::Stopped)?;
        response.await.map_err(|_| SchedulerError::Stopped)
    }

    pub async fn act(&self, action: Action) -> Result<ActionResult, SchedulerError> {
        self.request(|reply| Command::Act(action, reply)).await
    }

    pub async fn earn_wage(&self) -> Result<ActionResult, SchedulerError> {
        self.act(Action::EarnWage).await
    }

    pub async fn promote(&self) -> Result<ActionResult, SchedulerError> {
        self.act(Action::Promote).await
    }

    pub async fn upgrade_need(&self, kind: NeedKind) -> Result<ActionResult, SchedulerError> {
        self.act(Action::UpgradeNeed(kind)).await
    }

    pub async fn manual_forage(&self) -> Result<ActionResult, SchedulerError> {
        self.act(Action::ManualForage).await
    }

    pub async fn upgrade_science(&self) -> Result<ActionResult, SchedulerError> {
        self.act(Action::UpgradeScience).await
    }

    pub async fn unlock_research(&self, key: &str) -> Result<ActionResult, SchedulerError> {
        self.act(Action::UnlockResearch(key.to_string())).await
    }

    pub async fn buy_factory(&self, id: &str) -> Result<ActionResult, SchedulerError> {
        self.act(Action::BuyFactory(id.to_string())).await
    }

    pub async fn upgrade_factory(&self, id: &str) -> Result<ActionResult, SchedulerError> {
        self.act(Action::UpgradeFactory(id.to_string())).await
    }

    /// Fresh snapshot taken inside the scheduler task.
    pub async fn snapshot(&self) -> Result<ProgressionSnapshot, SchedulerError> {
        self.request(Command::Snapshot).await
    }

    pub async fn restart(&self) -> Result<(), SchedulerError> {
        self.request(Command::Restart).await
    }

    pub fn subscribe_game_over(&self) -> broadcast::Receiver<GameOverNotice> {
        self.game_over.subscribe()
    }

    /// Last published snapshot, readable without a round trip to the task.
    pub fn observer(&self) -> Arc<RwLock<ProgressionSnapshot>> {
        Arc::clone(&self.observer)
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

pub fn spawn(world: SimulationWorld, tick_duration: Duration) -> (GameHandle, JoinHandle<()>) {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (game_over_tx, _) = broadcast::channel(NOTICE_BUFFER);
    let shutdown = Arc::new(Notify::new());

    let handle = GameHandle {
        commands: commands_tx,
        game_over: game_over_tx.clone(),
        shutdown: Arc::clone(&shutdown),
        observer: world.observer(),
    };
    let task = tokio::spawn(run(world, tick_duration, commands_rx, game_over_tx, shutdown));
    (handle, task)
}

fn publish_game_over(world: &mut SimulationWorld, game_over: &broadcast::Sender<GameOverNotice>) {
    let Some(reason) = world.take_game_over() else {
        return;
    };
    let notice = GameOverNotice {
        reason,
        tick: world.tick(),
        generation: world.generation(),
    };
    warn!(reason = reason.code(), tick = notice.tick, "game over, ticking stopped");
    // No subscribers is fine.
    let _ = game_over.send(notice);
}

async fn run(
    mut world: SimulationWorld,
    tick_duration: Duration,
    mut commands: mpsc::Receiver<Command>,
    game_over: broadcast::Sender<GameOverNotice>,
    shutdown: Arc<Notify>,
) {
    let period = tick_duration.max(Duration::from_millis(1));
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticking = !world.is_game_over();

    info!(tick_ms = period.as_millis() as u64, "scheduler started");
    loop {
        tokio::select! {
            _ = interval.tick(), if ticking => {
                if world.advance() != TickStatus::Running {
                    ticking = false;
                }
                publish_game_over(&mut world, &game_over);
            },
            command = commands.recv() => {
                let Some(command) = command else {
                    // Every handle is gone.
                    break;
                };
                match command {
                    Command::Act(action, reply) => {
                        let _ = reply.send(world.apply(action));
                        publish_game_over(&mut world, &game_over);
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(world.snapshot());
                    }
                    Command::Restart(reply) => {
                        world.restart();
                        interval.reset();
                        ticking = true;
                        let _ = reply.send(());
                    }
                }
            },
            _ = shutdown.notified() => break,
        }
    }
    info!(tick = world.tick(), "scheduler stopped");
}
