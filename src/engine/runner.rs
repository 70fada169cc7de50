//! Engine runner: owns the queue, the countdown and its single tick source

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

use super::{
    countdown::{Completion, Countdown, Effect, RunStatus},
    snapshot::EngineSnapshot,
};
use crate::{notify::NotificationSink, queue::Queue, tasks::tick_task};

/// Handle to the running engine. Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

struct Shared {
    session: Mutex<Session>,
    period: Duration,
    sink: Arc<dyn NotificationSink>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
}

/// Mutable playback context guarded by the engine lock
struct Session {
    queue: Queue,
    countdown: Countdown,
    /// The only tick source. Always cancelled before being replaced.
    ticker: Option<Ticker>,
    generation: u64,
}

struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Session {
    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("Cancelling tick source {}", ticker.generation);
            ticker.handle.abort();
        }
    }

    fn ticker_generation(&self) -> Option<u64> {
        self.ticker.as_ref().map(|t| t.generation)
    }
}

impl Engine {
    /// Create an idle engine over `queue`, ticking every `period` once started
    pub fn new(queue: Queue, period: Duration, sink: Arc<dyn NotificationSink>) -> Self {
        let (snapshot_tx, _) = watch::channel(EngineSnapshot::idle(&queue));
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session {
                    queue,
                    countdown: Countdown::new(),
                    ticker: None,
                    generation: 0,
                }),
                period,
                sink,
                snapshot_tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.shared
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive a snapshot after every command and every tick
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let session = self.lock();
        EngineSnapshot::capture(&session.countdown, &session.queue)
    }

    pub fn status(&self) -> RunStatus {
        self.lock().countdown.status()
    }

    pub fn queue(&self) -> Queue {
        self.lock().queue.clone()
    }

    /// Mutate the queue, but only while idle. Returns `None` when a run is
    /// in progress.
    pub fn edit_queue<R>(&self, edit: impl FnOnce(&mut Queue) -> R) -> Option<R> {
        let mut session = self.lock();
        if !session.countdown.is_idle() {
            return None;
        }
        let result = edit(&mut session.queue);
        self.publish(&session);
        Some(result)
    }

    pub fn start(&self, index: usize) -> EngineSnapshot {
        info!("Start requested at index {}", index);
        self.command(|countdown, queue| countdown.start(queue.items(), index))
    }

    pub fn pause(&self) -> EngineSnapshot {
        self.command(|countdown, _| countdown.pause())
    }

    pub fn resume(&self) -> EngineSnapshot {
        self.command(|countdown, _| countdown.resume())
    }

    pub fn stop(&self) -> EngineSnapshot {
        self.command(|countdown, _| countdown.stop())
    }

    fn command<F>(&self, transition: F) -> EngineSnapshot
    where
        F: FnOnce(&mut Countdown, &Queue) -> Vec<Effect>,
    {
        let (snapshot, completions) = {
            let mut guard = self.lock();
            let session = &mut *guard;
            let before = session.countdown;
            let effects = transition(&mut session.countdown, &session.queue);
            if effects.is_empty() {
                debug!("Command ignored in {:?} state", before.status());
            } else {
                info!(
                    "Engine {:?} -> {:?} (item {:?}, {}s left)",
                    before.status(),
                    session.countdown.status(),
                    session.countdown.active_index(),
                    session.countdown.remaining()
                );
            }
            let completions = self.apply(session, effects);
            (self.publish(session), completions)
        };
        self.deliver(&completions);
        snapshot
    }

    /// Advance the countdown by one unit on behalf of tick source
    /// `generation`. Returns false when that source is no longer current.
    pub(crate) fn tick(&self, generation: u64) -> bool {
        let (alive, completions) = {
            let mut guard = self.lock();
            let session = &mut *guard;
            if session.ticker_generation() != Some(generation) {
                debug!("Dropping stale tick from source {}", generation);
                return false;
            }
            let effects = session.countdown.tick(session.queue.items());
            let completions = self.apply(session, effects);
            debug!(
                "Tick: {:?}, {}s left",
                session.countdown.status(),
                session.countdown.remaining()
            );
            self.publish(session);
            (session.ticker_generation() == Some(generation), completions)
        };
        self.deliver(&completions);
        alive
    }

    fn apply(&self, session: &mut Session, effects: Vec<Effect>) -> Vec<Completion> {
        let mut completions = Vec::new();
        for effect in effects {
            match effect {
                Effect::CancelTicks => session.cancel_ticker(),
                Effect::ScheduleTicks => {
                    session.cancel_ticker();
                    session.generation += 1;
                    let generation = session.generation;
                    debug!("Starting tick source {}", generation);
                    let handle = tokio::spawn(tick_task(self.clone(), generation, self.shared.period));
                    session.ticker = Some(Ticker { generation, handle });
                }
                Effect::Notify(completion) => {
                    info!("Item {} completed", completion.index);
                    completions.push(completion);
                }
            }
        }
        completions
    }

    fn publish(&self, session: &Session) -> EngineSnapshot {
        let snapshot = EngineSnapshot::capture(&session.countdown, &session.queue);
        self.shared.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Runs outside the lock; sinks are fire-and-forget
    fn deliver(&self, completions: &[Completion]) {
        for completion in completions {
            self.shared
                .sink
                .notify(&completion.completed, completion.next.as_ref());
        }
    }

    #[cfg(test)]
    fn active_tick_sources(&self) -> usize {
        let session = self.lock();
        usize::from(
            session
                .ticker
                .as_ref()
                .is_some_and(|t| !t.handle.is_finished()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ItemFields;
    use tokio::time::sleep;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(ItemFields, Option<ItemFields>)>>,
    }

    impl NotificationSink for Recorder {
        fn notify(&self, completed: &ItemFields, next: Option<&ItemFields>) {
            self.seen.lock().unwrap().push((*completed, next.copied()));
        }
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    fn engine_with(seconds: &[u32]) -> (Engine, Arc<Recorder>) {
        let fields: Vec<ItemFields> = seconds
            .iter()
            .map(|&s| ItemFields::new(0, s, 5.0))
            .collect();
        let mut queue = Queue::new();
        queue.load_all(&fields);
        let recorder = Arc::new(Recorder::default());
        let engine = Engine::new(queue, Duration::from_secs(1), recorder.clone());
        (engine, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_period() {
        let (engine, _) = engine_with(&[10]);
        engine.start(0);
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(engine.snapshot().remaining, 7);
        assert_eq!(engine.active_tick_sources(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_never_double_decrements() {
        let (engine, _) = engine_with(&[10]);
        engine.start(0);
        sleep(Duration::from_millis(500)).await;
        engine.start(0);
        engine.start(0);
        sleep(Duration::from_millis(4500)).await;

        assert_eq!(engine.snapshot().remaining, 6);
        assert_eq!(engine.active_tick_sources(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_remaining() {
        let (engine, _) = engine_with(&[10]);
        engine.start(0);
        sleep(Duration::from_millis(2500)).await;
        let paused = engine.pause();
        assert_eq!(paused.status, RunStatus::Paused);
        assert_eq!(paused.remaining, 8);
        assert_eq!(engine.active_tick_sources(), 0);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.snapshot().remaining, 8);

        let resumed = engine.resume();
        assert_eq!(resumed.status, RunStatus::Running);
        assert_eq!(resumed.remaining, 8);
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(engine.snapshot().remaining, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_without_notifying() {
        let (engine, recorder) = engine_with(&[2, 2]);
        engine.start(0);
        sleep(Duration::from_millis(1500)).await;
        let stopped = engine.stop();
        assert_eq!(stopped.status, RunStatus::Idle);
        assert_eq!(stopped.remaining, 0);
        assert_eq!(stopped.active_index, None);
        assert_eq!(engine.active_tick_sources(), 0);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(recorder.count(), 0);
        assert_eq!(engine.stop().status, RunStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn chains_through_queue_and_notifies() {
        let (engine, recorder) = engine_with(&[1, 1]);
        engine.start(0);

        sleep(Duration::from_millis(1500)).await;
        let mid = engine.snapshot();
        assert_eq!(mid.status, RunStatus::Running);
        assert_eq!(mid.active_index, Some(1));
        assert_eq!(mid.remaining, 1);
        assert_eq!(recorder.count(), 1);

        sleep(Duration::from_secs(1)).await;
        let end = engine.snapshot();
        assert_eq!(end.status, RunStatus::Idle);
        assert_eq!(end.active_index, None);

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, Some(ItemFields::new(0, 1, 5.0)));
        assert_eq!(seen[1].1, None);
        assert_eq!(engine.active_tick_sources(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_successor_halts_chain() {
        let (engine, recorder) = engine_with(&[2, 0, 3]);
        engine.start(0);
        sleep(Duration::from_millis(2500)).await;

        assert_eq!(engine.status(), RunStatus::Idle);
        assert_eq!(recorder.count(), 1);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(recorder.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn queue_is_locked_during_run() {
        let (engine, _) = engine_with(&[5]);
        assert!(engine.edit_queue(|q| q.add()).is_some());
        engine.start(0);
        assert!(engine.edit_queue(|q| q.add()).is_none());
        engine.pause();
        assert!(engine.edit_queue(|q| q.add()).is_none());
        engine.stop();
        assert!(engine.edit_queue(|q| q.add()).is_some());
        assert_eq!(engine.queue().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_tick() {
        let (engine, _) = engine_with(&[3]);
        let mut rx = engine.subscribe();
        engine.start(0);
        assert_eq!(rx.borrow_and_update().remaining, 3);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().remaining, 2);
    }
}
