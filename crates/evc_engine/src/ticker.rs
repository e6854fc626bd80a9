//! Once-per-second elapsed time of the current charging session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::Engine;
use crate::charging::elapsed_seconds;

const TICK: Duration = Duration::from_secs(1);

/// Background task publishing whole elapsed seconds of one session.
///
/// The task stops on its own once the session is no longer current and is
/// aborted when the ticker is dropped.
#[derive(Debug)]
pub struct ElapsedTicker {
    session_id: String,
    receiver: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Latest published value.
    pub fn elapsed(&self) -> u64 {
        *self.receiver.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.receiver.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl Engine {
    /// Starts ticking for the current session; `None` when nothing charges.
    pub fn watch_elapsed(self: &Arc<Self>) -> Option<ElapsedTicker> {
        let session = self.current_session()?;
        let base = elapsed_seconds(&session, Utc::now());
        let (sender, receiver) = watch::channel(base);
        let engine = Arc::downgrade(self);
        let session_id = session.id.clone();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut interval = tokio::time::interval_at(started + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                let is_current = engine.read(|store| {
                    store
                        .charging()
                        .current()
                        .is_some_and(|current| current.id == session.id)
                });
                if !is_current {
                    tracing::debug!("Session {} is over, ticker exits", session.id);
                    break;
                }
                if sender.send(base + started.elapsed().as_secs()).is_err() {
                    break;
                }
            }
        });

        tracing::info!("Ticking session {} from {} s", session_id, base);
        Some(ElapsedTicker {
            session_id,
            receiver,
            handle,
        })
    }
}
