//! Drives a [`Game`] on a tokio interval.
//!
//! The whole game sits behind one mutex, so each tick is applied atomically
//! and readers only ever see fully advanced state. After every tick an
//! immutable [`Snapshot`] is published on a watch channel for renderers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use super::utils::millis_since;
use super::Game;
use crate::types::{RoundState, Snapshot};

pub struct GameRuntime {
    game: Arc<Mutex<Game>>,
    sender: watch::Sender<Snapshot>,
    snapshots: watch::Receiver<Snapshot>,
    origin: Instant,
    period: Duration,
    handle: Mutex<JoinHandle<RoundState>>,
}

impl GameRuntime {
    /// Starts the round (if not started yet) and spawns the tick task. Must be
    /// called from within a tokio runtime.
    pub fn spawn(mut game: Game) -> Self {
        let origin = Instant::now();
        let period = Duration::from_millis(game.config().tick_ms.max(1));
        game.start(millis_since(origin));

        let (sender, snapshots) = watch::channel(game.snapshot());
        let game = Arc::new(Mutex::new(game));
        let handle = tokio::spawn(run_ticks(
            Arc::clone(&game),
            sender.clone(),
            origin,
            period,
        ));

        Self {
            game,
            sender,
            snapshots,
            origin,
            period,
            handle: Mutex::new(handle),
        }
    }

    fn now_ms(&self) -> u64 {
        millis_since(self.origin)
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Exclusive access between ticks.
    pub async fn lock(&self) -> MutexGuard<'_, Game> {
        self.game.lock().await
    }

    pub async fn pause(&self) {
        let now = self.now_ms();
        self.game.lock().await.pause(now);
    }

    pub async fn resume(&self) {
        let now = self.now_ms();
        self.game.lock().await.resume(now);
    }

    pub async fn toggle_pause(&self) {
        let now = self.now_ms();
        self.game.lock().await.toggle_pause(now);
    }

    /// Fresh round on the same game. A finished round gets a new tick task
    /// once the old one has exited.
    pub async fn restart(&self) {
        let mut handle = self.handle.lock().await;
        let finished = self.game.lock().await.state().is_finished();
        if finished {
            // A finished game is left alone by the old task until it exits.
            if let Err(err) = (&mut *handle).await {
                tracing::warn!(error = %err, "previous tick task failed");
            }
        }

        let now = self.now_ms();
        {
            let mut game = self.game.lock().await;
            game.restart(now);
            self.sender.send_replace(game.snapshot());
        }

        if finished {
            *handle = tokio::spawn(run_ticks(
                Arc::clone(&self.game),
                self.sender.clone(),
                self.origin,
                self.period,
            ));
            tracing::debug!("tick task respawned");
        }
    }

    /// The tick task exits at its next tick boundary.
    pub async fn destroy(&self) {
        self.game.lock().await.destroy();
    }

    /// Waits for the round to finish and returns its final state.
    pub async fn join(self) -> Result<RoundState, JoinError> {
        self.handle.into_inner().await
    }
}

async fn run_ticks(
    game: Arc<Mutex<Game>>,
    sender: watch::Sender<Snapshot>,
    origin: Instant,
    period: Duration,
) -> RoundState {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let mut game = game.lock().await;
        let state = game.tick(millis_since(origin));
        sender.send_replace(game.snapshot());
        drop(game);

        if state.is_finished() {
            tracing::debug!(?state, "tick task finished");
            return state;
        }
    }
}
