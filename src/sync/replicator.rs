//! Debounced, single-flight replication of the state snapshot.
//!
//! The producer side writes snapshots into a single-slot mailbox
//! ([`tokio::sync::watch`]); one sender task owns the transport and drains
//! it. Bursts of pushes coalesce to the latest value, a push that lands
//! while a send is in flight re-triggers another send afterwards, and a
//! periodic force push resends the latest snapshot.

use super::protocol::{Envelope, SyncError};
use crate::core::config::ReplicationConfig;
use crate::core::game_state::{encode_snapshot, ProgressionState};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Something that can deliver encoded envelopes to the companion.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), SyncError>;
}

/// In-process transport, used for a local companion and in tests.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), SyncError> {
        self.tx.send(bytes).map_err(|_| SyncError::TransportClosed)
    }
}

/// An immutable copy of the state taken at push time.
#[derive(Debug, Clone)]
struct PendingSnapshot {
    sequence: u64,
    taken_at_ms: i64,
    payload: Arc<Vec<u8>>,
}

/// Producer end of the mailbox. Dropping every handle flushes the latest
/// unsent snapshot and stops the sender task.
#[derive(Debug)]
pub struct ReplicationHandle {
    slot: watch::Sender<Option<PendingSnapshot>>,
    next_sequence: AtomicU64,
}

impl ReplicationHandle {
    /// Snapshots `state` and schedules it for sending. Never blocks.
    pub fn push(&self, state: &ProgressionState, now_ms: i64) {
        let payload = match encode_snapshot(state) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "could not encode snapshot for replication");
                return;
            }
        };
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.slot.send_replace(Some(PendingSnapshot {
            sequence,
            taken_at_ms: now_ms,
            payload: Arc::new(payload),
        }));
    }

    /// Sequence number of the most recent push, 0 before the first.
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence.load(Ordering::Relaxed)
    }
}

/// What the sender task did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicatorStats {
    pub sent: u64,
    pub failed: u64,
    pub force_pushes: u64,
}

/// Starts the sender task on the current runtime.
pub fn spawn_replicator<T>(
    transport: T,
    config: ReplicationConfig,
) -> (ReplicationHandle, JoinHandle<ReplicatorStats>)
where
    T: Transport + 'static,
{
    let (slot, rx) = watch::channel(None);
    let handle = ReplicationHandle {
        slot,
        next_sequence: AtomicU64::new(0),
    };
    let task = tokio::spawn(run_sender(rx, transport, config));
    (handle, task)
}

struct Sender<T> {
    transport: T,
    last_sent: u64,
    stats: ReplicatorStats,
}

impl<T: Transport> Sender<T> {
    async fn deliver(&mut self, snapshot: Option<PendingSnapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        let envelope = Envelope::state_push(
            snapshot.sequence,
            snapshot.taken_at_ms,
            snapshot.payload.as_ref().clone(),
        );
        let result = match envelope.encode() {
            Ok(bytes) => self.transport.send(bytes).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                debug!(sequence = snapshot.sequence, "snapshot replicated");
                self.last_sent = snapshot.sequence;
                self.stats.sent += 1;
            }
            // Best effort: no retry, the next push or force push will try again
            Err(e) => {
                warn!(sequence = snapshot.sequence, error = %e, "snapshot replication failed");
                self.stats.failed += 1;
            }
        }
    }
}

async fn run_sender<T: Transport>(
    mut rx: watch::Receiver<Option<PendingSnapshot>>,
    transport: T,
    config: ReplicationConfig,
) -> ReplicatorStats {
    let mut sender = Sender {
        transport,
        last_sent: 0,
        stats: ReplicatorStats::default(),
    };
    let period = config.force_push_interval;
    let mut force = interval_at(Instant::now() + period, period);
    force.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // Debounce: every further push restarts the quiet period
                loop {
                    tokio::select! {
                        more = rx.changed() => {
                            if more.is_err() {
                                break;
                            }
                        }
                        _ = sleep(config.debounce) => break,
                    }
                }
                let latest = rx.borrow_and_update().clone();
                sender.deliver(latest).await;
            }
            _ = force.tick() => {
                let latest = rx.borrow().clone();
                if latest.is_some() {
                    sender.stats.force_pushes += 1;
                    sender.deliver(latest).await;
                }
            }
        }
    }

    // Producer gone: flush anything that never made it out
    let latest = rx.borrow().clone();
    if latest.as_ref().is_some_and(|s| s.sequence != sender.last_sent) {
        sender.deliver(latest).await;
    }
    sender.stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game_state::decode_snapshot;
    use std::sync::Mutex;
    use std::time::Duration;

    fn state_at(level: u32) -> ProgressionState {
        let mut state = ProgressionState::new(0);
        state.level = level;
        state
    }

    fn level_of(bytes: &[u8]) -> u32 {
        match Envelope::decode(bytes).unwrap() {
            Envelope::StatePush { payload, .. } => decode_snapshot(&payload).unwrap().level,
            other => panic!("unexpected {:?}", other),
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&mut self, _bytes: Vec<u8>) -> Result<(), SyncError> {
            Err(SyncError::Transport("unreachable".into()))
        }
    }

    /// Takes `delay` to deliver each envelope, recording levels in order.
    struct SlowTransport {
        delay: Duration,
        delivered: Arc<Mutex<Vec<u32>>>,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn send(&mut self, bytes: Vec<u8>) -> Result<(), SyncError> {
            sleep(self.delay).await;
            self.delivered.lock().unwrap().push(level_of(&bytes));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_latest() {
        let (transport, mut rx) = ChannelTransport::new();
        let (handle, task) = spawn_replicator(transport, ReplicationConfig::default());

        handle.push(&state_at(2), 1);
        handle.push(&state_at(3), 2);
        handle.push(&state_at(4), 3);
        sleep(Duration::from_millis(600)).await;

        let first = rx.try_recv().unwrap();
        assert_eq!(level_of(&first), 4);
        assert!(rx.try_recv().is_err());

        drop(handle);
        let stats = task.await.unwrap();
        assert_eq!(stats.sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_sent_inside_debounce_window() {
        let (transport, mut rx) = ChannelTransport::new();
        let (handle, _task) = spawn_replicator(transport, ReplicationConfig::default());

        handle.push(&state_at(2), 1);
        sleep(Duration::from_millis(300)).await;
        handle.push(&state_at(5), 2);
        sleep(Duration::from_millis(300)).await;
        // 600ms after the first push, but only 300ms after the second
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_millis(300)).await;
        assert_eq!(level_of(&rx.try_recv().unwrap()), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_push_resends_latest() {
        let (transport, mut rx) = ChannelTransport::new();
        let (handle, _task) = spawn_replicator(transport, ReplicationConfig::default());

        handle.push(&state_at(7), 1);
        sleep(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_ok());

        sleep(Duration::from_secs(300)).await;
        assert_eq!(level_of(&rx.try_recv().unwrap()), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_flushes_pending_snapshot() {
        let (transport, mut rx) = ChannelTransport::new();
        let (handle, task) = spawn_replicator(transport, ReplicationConfig::default());

        handle.push(&state_at(9), 1);
        drop(handle);
        let stats = task.await.unwrap();

        assert_eq!(stats.sent, 1);
        assert_eq!(level_of(&rx.try_recv().unwrap()), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_send_releases_for_next_push() {
        let (handle, task) = spawn_replicator(FailingTransport, ReplicationConfig::default());

        handle.push(&state_at(2), 1);
        sleep(Duration::from_millis(600)).await;
        handle.push(&state_at(3), 2);
        sleep(Duration::from_millis(600)).await;
        drop(handle);

        let stats = task.await.unwrap();
        assert_eq!(stats.sent, 0);
        // Two debounced attempts plus the flush on shutdown
        assert_eq!(stats.failed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequences_increase() {
        let (transport, _rx) = ChannelTransport::new();
        let (handle, _task) = spawn_replicator(transport, ReplicationConfig::default());
        assert_eq!(handle.last_sequence(), 0);
        handle.push(&state_at(1), 0);
        handle.push(&state_at(1), 0);
        assert_eq!(handle.last_sequence(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_during_send_is_delivered_after_it() {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let transport = SlowTransport {
            delay: Duration::from_secs(2),
            delivered: Arc::clone(&delivered),
        };
        let (handle, task) = spawn_replicator(transport, ReplicationConfig::default());

        handle.push(&state_at(2), 1);
        // Debounce elapses at 500ms, the send of level 2 runs until 2.5s
        sleep(Duration::from_millis(700)).await;
        assert!(delivered.lock().unwrap().is_empty());
        handle.push(&state_at(3), 2);
        handle.push(&state_at(4), 3);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(*delivered.lock().unwrap(), vec![2]);

        // The pushes made mid-send coalesce into one follow-up send
        sleep(Duration::from_secs(3)).await;
        assert_eq!(*delivered.lock().unwrap(), vec![2, 4]);

        drop(handle);
        let stats = task.await.unwrap();
        assert_eq!(stats.sent, 2);
        assert_eq!(*delivered.lock().unwrap(), vec![2, 4]);
    }
}
