//! Sequential playback queue
//!
//! Background play requests land here. Enqueueing never waits for audio:
//! the target is appended and, if no drain loop is running, one is spawned.
//! The drain loop plays targets strictly one after another in submission
//! order until the queue is empty. At most one drain loop exists at a time.
//!
//! There is no priority, cancellation or deduplication; a queued target plays
//! unless the process exits first.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use super::chain::Playback;
use super::types::{PlayTarget, PlaybackEvent};

struct QueueState {
    /// Targets with the volume they were requested at
    pending: VecDeque<(PlayTarget, f32)>,
    /// Set while a drain loop owns the queue
    playing: bool,
}

/// Single-flight FIFO of play requests
pub struct PlaybackQueue {
    player: Arc<dyn Playback>,
    volume: f32,
    state: Mutex<QueueState>,
    event_tx: broadcast::Sender<PlaybackEvent>,
    /// `true` while no drain loop is running
    idle_tx: watch::Sender<bool>,
}

impl PlaybackQueue {
    /// Create an empty queue playing through `player` at `volume`
    pub fn new(player: Arc<dyn Playback>, volume: f32) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(100);
        let (idle_tx, _) = watch::channel(true);
        Arc::new(Self {
            player,
            volume: mist_common::config::clamp_volume(volume),
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                playing: false,
            }),
            event_tx,
            idle_tx,
        })
    }

    /// Append `target` at the queue's volume; starts a drain loop if none is
    /// running. Returns at once.
    pub async fn enqueue(self: &Arc<Self>, target: PlayTarget) {
        let volume = self.volume;
        self.enqueue_with_volume(target, volume).await;
    }

    /// Append `target` to be played at `volume`
    pub async fn enqueue_with_volume(self: &Arc<Self>, target: PlayTarget, volume: f32) {
        let volume = mist_common::config::clamp_volume(volume);
        let start_drain = {
            let mut state = self.state.lock().await;
            state.pending.push_back((target, volume));
            debug!("Enqueued sound ({} pending)", state.pending.len());
            if state.playing {
                false
            } else {
                state.playing = true;
                self.idle_tx.send_replace(false);
                true
            }
        };

        if start_drain {
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                queue.drain().await;
            });
        }
    }

    /// Play queued targets in order until none remain
    async fn drain(&self) {
        info!("Playback queue drain started");
        loop {
            let (target, volume) = {
                let mut state = self.state.lock().await;
                match state.pending.pop_front() {
                    Some(entry) => entry,
                    None => {
                        // Cleared under the same lock an enqueue checks
                        state.playing = false;
                        self.idle_tx.send_replace(true);
                        break;
                    }
                }
            };

            // Ignore send errors (no receivers is OK)
            let _ = self.event_tx.send(PlaybackEvent::Started {
                target: target.clone(),
            });
            // A panicking player counts as a failure and the loop keeps going
            let player = Arc::clone(&self.player);
            let playing = target.clone();
            let success = tokio::spawn(async move { player.play(&playing, volume).await })
                .await
                .unwrap_or_else(|e| {
                    warn!("Player task for {} failed: {}", target, e);
                    false
                });
            let _ = self
                .event_tx
                .send(PlaybackEvent::Finished { target, success });
        }
        let _ = self.event_tx.send(PlaybackEvent::Idle);
        info!("Playback queue drained");
    }

    /// Default volume for queued targets
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Number of targets waiting (excludes the one playing)
    pub async fn len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.pending.is_empty()
    }

    /// Whether a drain loop is currently running
    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.playing
    }

    /// Subscribe to queue events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    /// Resolve once the queue is empty and no drain loop is running
    pub async fn wait_idle(&self) {
        let mut rx = self.idle_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|idle| *idle).await;
    }
}
