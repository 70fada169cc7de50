//! Periodic tick background task

use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::engine::Engine;

/// Background task that ticks the engine once per `period` until the engine
/// retires this `generation` of tick source
pub async fn tick_task(engine: Engine, generation: u64, period: Duration) {
    debug!("Tick source {} running every {:?}", generation, period);

    // First tick lands one full period after start
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if !engine.tick(generation) {
            break;
        }
    }

    debug!("Tick source {} finished", generation);
}
