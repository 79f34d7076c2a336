//! Memory Sequencer Service
//!
//! Two background tasks share a [`DependencyGraph`]:
//!
//! - **ingestion** takes pushed messages off the ingestion buffer and places
//!   them in the graph. A message whose dependency is not stored yet is parked
//!   under the awaited id and re-ingested when storage reports it. A message
//!   whose dependency lookup failed is retried on a timer.
//! - **emission** takes ready vertices off the graph frontier and hands the
//!   messages to the bounded ready queue that `pop_msg` reads.
//!
//! Ingestion stops reading the ingestion buffer while the frontier holds
//! `buffer` ready vertices, so a full pipeline blocks `push_msg`.
//!
//! Responses recorded in storage complete graph vertices, which releases
//! their dependents.

use crate::config::SequencerConfig;
use crate::domain::errors::{GraphError, SequencerError};
use crate::domain::graph::DependencyGraph;
use crate::ports::inbound::MessageSequencer;
use crate::ports::outbound::{MessageStorage, StorageEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Message, MessageId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Ingested messages that could not be placed in the graph yet
#[derive(Default)]
struct Backlog {
    /// Waiting for their dependency to show up in storage
    parked: HashMap<MessageId, Vec<Message>>,
    /// Dependency lookup failed
    retry: Vec<Message>,
}

impl Backlog {
    fn is_empty(&self) -> bool {
        self.parked.is_empty() && self.retry.is_empty()
    }
}

#[derive(Default)]
struct Frontier {
    graph: DependencyGraph,
    /// Pushed copies of ingested messages not yet emitted
    messages: HashMap<MessageId, Message>,
}

impl Frontier {
    fn complete(&mut self, id: MessageId) -> usize {
        self.messages.remove(&id);
        self.graph.complete(id)
    }
}

struct Shared {
    storage: Arc<dyn MessageStorage>,
    frontier: Mutex<Frontier>,
    ready_signal: Notify,
    /// Signalled when emission takes a vertex off the frontier
    room: Notify,
    capacity: usize,
    closed: AtomicBool,
    queued: AtomicI64,
    pending: AtomicI64,
    in_flight: AtomicUsize,
    drained: Notify,
}

/// In-process implementation of [`MessageSequencer`].
pub struct MemorySequencer {
    shared: Arc<Shared>,
    ingress: Mutex<Option<mpsc::Sender<Message>>>,
    ready: tokio::sync::Mutex<mpsc::Receiver<Message>>,
    shutdown: watch::Sender<bool>,
    config: SequencerConfig,
}

impl MemorySequencer {
    /// Create a sequencer with the default configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(storage: Arc<dyn MessageStorage>) -> Self {
        Self::with_config(storage, SequencerConfig::default())
    }

    pub fn with_config(storage: Arc<dyn MessageStorage>, config: SequencerConfig) -> Self {
        let (ingress_tx, ingress_rx) = mpsc::channel(config.capacity());
        let (ready_tx, ready_rx) = mpsc::channel(config.capacity());
        let (shutdown, _) = watch::channel(false);
        let events = storage.subscribe();

        let shared = Arc::new(Shared {
            storage,
            frontier: Mutex::new(Frontier::default()),
            ready_signal: Notify::new(),
            room: Notify::new(),
            capacity: config.capacity(),
            closed: AtomicBool::new(false),
            queued: AtomicI64::new(0),
            pending: AtomicI64::new(0),
            in_flight: AtomicUsize::new(0),
            drained: Notify::new(),
        });

        tokio::spawn(Arc::clone(&shared).run_ingestion(
            ingress_rx,
            events,
            shutdown.subscribe(),
            config.retry_interval(),
        ));
        tokio::spawn(Arc::clone(&shared).run_emission(ready_tx, shutdown.subscribe()));

        debug!(buffer = config.buffer, "[tr-01] Sequencer started");

        Self {
            shared,
            ingress: Mutex::new(Some(ingress_tx)),
            ready: tokio::sync::Mutex::new(ready_rx),
            shutdown,
            config,
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSequencer for MemorySequencer {
    async fn push_msg(&self, msg: Message) -> Result<(), SequencerError> {
        if self.is_closed() {
            return Err(SequencerError::Closed);
        }
        let sender = self.ingress.lock().clone().ok_or(SequencerError::Closed)?;

        self.shared.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(msg).await.is_err() {
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(SequencerError::Closed);
        }
        Ok(())
    }

    async fn pop_msg(&self) -> Result<Message, SequencerError> {
        let mut ready = self.ready.lock().await;
        match ready.recv().await {
            Some(msg) => {
                self.shared.pending.fetch_sub(1, Ordering::SeqCst);
                Ok(msg)
            }
            None => Err(SequencerError::Closed),
        }
    }

    fn peek_msg(&self) -> Option<Message> {
        let frontier = self.shared.frontier.lock();
        let id = frontier.graph.peek_ready()?;
        frontier.messages.get(&id).cloned()
    }

    fn queued_msg_count(&self) -> usize {
        clamp(self.shared.queued.load(Ordering::SeqCst))
    }

    fn pending_msg_count(&self) -> usize {
        clamp(self.shared.pending.load(Ordering::SeqCst))
    }

    async fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.ingress.lock().take();

        // Let hand-offs that started before the flag flipped finish
        let drained = self.shared.drained.notified();
        tokio::pin!(drained);
        drained.as_mut().enable();
        if self.shared.in_flight.load(Ordering::SeqCst) > 0 {
            let timeout = self.config.drain_timeout();
            if tokio::time::timeout(timeout, drained).await.is_err() {
                warn!(
                    in_flight = self.shared.in_flight.load(Ordering::SeqCst),
                    timeout_ms = self.config.drain_timeout_ms,
                    "[tr-01] Drain timed out, abandoning in-flight hand-offs"
                );
            }
        }

        self.shutdown.send_replace(true);
        info!(
            queued = self.queued_msg_count(),
            pending = self.pending_msg_count(),
            "[tr-01] Sequencer closed"
        );
    }
}

impl Drop for MemorySequencer {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

fn clamp(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

impl Shared {
    async fn run_ingestion(
        self: Arc<Self>,
        mut ingress: mpsc::Receiver<Message>,
        mut events: broadcast::Receiver<StorageEvent>,
        mut shutdown: watch::Receiver<bool>,
        retry_interval: Duration,
    ) {
        let mut backlog = Backlog::default();
        let mut events_open = true;
        let mut ingress_open = true;
        let mut retry_timer = tokio::time::interval(retry_interval);
        retry_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let accepting = self.has_room();
            tokio::select! {
                _ = shutdown.changed() => break,
                event = events.recv(), if events_open => match event {
                    Ok(StorageEvent::Stored(id)) => {
                        if let Some(released) = backlog.parked.remove(&id) {
                            debug!(dependency = ?id, count = released.len(), "[tr-01] Dependency stored");
                            for msg in released {
                                self.ingest(msg, &mut backlog).await;
                            }
                        }
                    }
                    Ok(StorageEvent::Responded(id)) => self.complete(id),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "[tr-01] Storage events lagged, rescanning");
                        self.rescan(&mut backlog).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => events_open = false,
                },
                msg = ingress.recv(), if ingress_open && accepting => match msg {
                    Some(msg) => self.ingest(msg, &mut backlog).await,
                    None => ingress_open = false,
                },
                _ = self.room.notified(), if ingress_open && !accepting => {}
                _ = retry_timer.tick(), if !backlog.retry.is_empty() => {
                    let retry = std::mem::take(&mut backlog.retry);
                    debug!(count = retry.len(), "[tr-01] Retrying dependency lookups");
                    for msg in retry {
                        self.ingest(msg, &mut backlog).await;
                    }
                }
            }
        }

        if !backlog.is_empty() {
            warn!(
                dependencies = backlog.parked.len(),
                retrying = backlog.retry.len(),
                "[tr-01] Shutting down with messages still waiting on dependencies"
            );
        }
    }

    fn has_room(&self) -> bool {
        self.frontier.lock().graph.ready_len() < self.capacity
    }

    /// Place a pushed message in the graph, or hold it in the backlog until
    /// its dependency can be resolved.
    async fn ingest(&self, msg: Message, backlog: &mut Backlog) {
        let id = msg.id();
        let after_msg = msg.after_msg;
        let dependency = match after_msg {
            None => None,
            Some(after) => match self.storage.get_msg(after).await {
                Ok(Some(stored)) if stored.resp.is_some() => None,
                Ok(Some(_)) => Some(after),
                Ok(None) => {
                    debug!(msg_id = ?id, dependency = ?after, "[tr-01] Dependency not stored yet, parking");
                    backlog.parked.entry(after).or_default().push(msg);
                    return;
                }
                Err(e) => {
                    warn!(msg_id = ?id, dependency = ?after, error = %e, "[tr-01] Dependency lookup failed, will retry");
                    backlog.retry.push(msg);
                    return;
                }
            },
        };

        let placed = {
            let mut frontier = self.frontier.lock();
            let placed = match dependency {
                None if frontier.graph.add_vertex(id) => Ok(true),
                None => Err(GraphError::AlreadyIngested(id)),
                Some(after) => frontier.graph.add_edge(after, id).map(|_| false),
            };
            if placed.is_ok() {
                frontier.messages.insert(id, msg);
            }
            placed
        };
        self.queued.fetch_sub(1, Ordering::SeqCst);

        match placed {
            Ok(true) => self.ready_signal.notify_one(),
            Ok(false) => {}
            Err(e) => error!(msg_id = ?id, error = %e, "[tr-01] Message dropped"),
        }
    }

    fn complete(&self, id: MessageId) {
        let released = self.frontier.lock().complete(id);
        if released > 0 {
            debug!(msg_id = ?id, released, "[tr-01] Dependents released");
            self.ready_signal.notify_one();
        }
    }

    /// Recover from missed storage events.
    async fn rescan(&self, backlog: &mut Backlog) {
        let dependencies: Vec<MessageId> = backlog.parked.keys().copied().collect();
        for dependency in dependencies {
            match self.storage.get_msg(dependency).await {
                Ok(None) => {}
                Ok(Some(_)) => {
                    for msg in backlog.parked.remove(&dependency).unwrap_or_default() {
                        self.ingest(msg, backlog).await;
                    }
                }
                Err(_) => {
                    let waiting = backlog.parked.remove(&dependency).unwrap_or_default();
                    backlog.retry.extend(waiting);
                }
            }
        }

        let awaited = self.frontier.lock().graph.awaited();
        for id in awaited {
            if let Ok(Some(stored)) = self.storage.get_msg(id).await {
                if stored.resp.is_some() {
                    self.complete(id);
                }
            }
        }
    }

    async fn run_emission(
        self: Arc<Self>,
        ready: mpsc::Sender<Message>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            let Some(id) = self.next_ready() else {
                tokio::select! {
                    _ = self.ready_signal.notified() => continue,
                    _ = shutdown.changed() => break,
                }
            };
            self.hand_off(id, &ready, &mut shutdown).await;
            if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                self.drained.notify_waiters();
            }
        }
        debug!("[tr-01] Emission loop stopped");
    }

    fn next_ready(&self) -> Option<MessageId> {
        let id = self.frontier.lock().graph.pop_ready()?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.room.notify_one();
        Some(id)
    }

    async fn hand_off(
        &self,
        id: MessageId,
        ready: &mpsc::Sender<Message>,
        shutdown: &mut watch::Receiver<bool>,
    ) {
        let pushed = self.frontier.lock().messages.remove(&id);
        let msg = match self.storage.get_msg(id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => match pushed {
                Some(msg) => msg,
                None => {
                    error!(msg_id = ?id, "[tr-01] Ready message missing");
                    return;
                }
            },
            Err(e) => {
                warn!(msg_id = ?id, error = %e, "[tr-01] Storage lookup failed, using pushed copy");
                match pushed {
                    Some(msg) => msg,
                    None => return,
                }
            }
        };

        if msg.resp.is_some() {
            debug!(msg_id = ?id, "[tr-01] Already responded, skipping");
            self.complete(id);
            return;
        }

        if self.closed.load(Ordering::SeqCst) {
            warn!(msg_id = ?id, "[tr-01] Sequencer closing, dropping ready message");
            return;
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            sent = ready.send(msg) => {
                if sent.is_err() {
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                    warn!(msg_id = ?id, "[tr-01] Ready queue gone, dropping message");
                }
            }
            _ = shutdown.changed() => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                warn!(msg_id = ?id, "[tr-01] Shut down during hand-off, dropping message");
            }
        }
    }
}
