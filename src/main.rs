use std::env;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use castaway_capital::autoplay::Autopilot;
use castaway_capital::scheduler;
use castaway_capital::simulation::{EconomyCatalog, SimulationConfig, SimulationWorld};

const DEFAULT_SEED: u64 = 7;

fn env_u64(name: &str) -> anyhow::Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be an unsigned integer, got {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn load_config() -> anyhow::Result<SimulationConfig> {
    let mut config = SimulationConfig::default();
    if let Some(path) = env::args().nth(1) {
        config.catalog = EconomyCatalog::from_json_file(&path)?;
        info!(%path, "loaded economy catalog");
    }
    if let Some(ms) = env_u64("CASTAWAY_TICK_MS")? {
        config.tick_duration = Duration::from_millis(ms.max(1));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let max_ticks = env_u64("CASTAWAY_MAX_TICKS")?;
    let seed = env_u64("CASTAWAY_SEED")?.unwrap_or(DEFAULT_SEED);
    let tick_duration = config.tick_duration;
    let mut autopilot = Autopilot::new(config.catalog.clone(), seed);

    let world = SimulationWorld::new(config)?;
    let (handle, scheduler_task) = scheduler::spawn(world, tick_duration);

    let finished = tokio::select! {
        result = autopilot.drive(&handle, tick_duration, max_ticks) => Some(result?),
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
            None
        }
    };
    let snapshot = match finished {
        Some(snapshot) => snapshot,
        None => handle.snapshot().await?,
    };

    handle.shutdown();
    scheduler_task.await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
