//! Non-blocking, ordered URL writes.
//!
//! Commits are queued on a channel and written to the router by a single
//! worker task, so callers never wait on the write and writes land in the
//! order they were started.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot, watch};

use crate::codec::UrlStateCodec;
use crate::router::{HistoryMode, Router};
use crate::state::TableState;

/// Tracks whether a user-initiated update is still waiting for its data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TransitionStatus {
    /// Most recent state a commit asked for.
    requested: Option<TableState>,
    /// Most recent state whose data finished loading.
    resolved: Option<TableState>,
}

impl TransitionStatus {
    fn is_pending(&self) -> bool {
        match &self.requested {
            Some(requested) => self.resolved.as_ref() != Some(requested),
            None => false,
        }
    }
}

/// The pending-transition flag of one controller.
///
/// Set when a commit is started. Cleared once the data for the requested
/// state has resolved, when the requested state's data is already on screen,
/// when the URL write of the newest commit fails, or when the location moves
/// without a commit and its data resolves.
#[derive(Debug, Clone)]
pub struct PendingTransition {
    status: Arc<watch::Sender<TransitionStatus>>,
}

impl PendingTransition {
    pub fn new() -> Self {
        let (status, _) = watch::channel(TransitionStatus::default());
        Self {
            status: Arc::new(status),
        }
    }

    /// Whether a transition is waiting for its data.
    pub fn is_pending(&self) -> bool {
        self.status.borrow().is_pending()
    }

    /// Records that the data for `state` is now rendered.
    pub fn resolve(&self, state: &TableState) {
        self.status.send_if_modified(|status| {
            let was_pending = status.is_pending();
            status.resolved = Some(state.clone());
            was_pending != status.is_pending()
        });
    }

    /// Waits until no transition is pending.
    pub async fn wait_idle(&self) {
        let mut status = self.status.subscribe();
        let _ = status.wait_for(|status| !status.is_pending()).await;
    }

    /// Records that the data for `state` is rendered and nothing newer was
    /// requested, e.g. after back/forward navigation.
    pub(crate) fn settle(&self, state: &TableState) {
        self.status.send_if_modified(|status| {
            let was_pending = status.is_pending();
            status.requested = Some(state.clone());
            status.resolved = Some(state.clone());
            was_pending
        });
    }

    fn request(&self, state: TableState) {
        self.status.send_if_modified(|status| {
            let was_pending = status.is_pending();
            status.requested = Some(state);
            was_pending != status.is_pending()
        });
    }

    /// Gives up on the current request.
    fn release(&self) {
        self.status.send_if_modified(|status| {
            let was_pending = status.is_pending();
            status.resolved = status.requested.clone();
            was_pending
        });
    }
}

impl Default for PendingTransition {
    fn default() -> Self {
        Self::new()
    }
}

enum TransitionMsg {
    Commit { seq: u64, state: TableState },
    Settle(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct Queued {
    seq: u64,
    state: Option<TableState>,
}

/// Queue of state commits waiting to be written to the URL.
#[derive(Debug)]
pub(crate) struct Transitions {
    tx: mpsc::UnboundedSender<TransitionMsg>,
    queued: Arc<Mutex<Queued>>,
    written: Arc<AtomicU64>,
    pending: PendingTransition,
}

impl Transitions {
    /// Spawns the worker task. Must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        router: Arc<dyn Router>,
        codec: UrlStateCodec,
        mode: HistoryMode,
        pending: PendingTransition,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let written = Arc::new(AtomicU64::new(0));
        let queued = Arc::new(Mutex::new(Queued::default()));

        let worker_written = Arc::clone(&written);
        let worker_queued = Arc::clone(&queued);
        let worker_pending = pending.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    TransitionMsg::Commit { seq, state } => {
                        let query = codec.merge(&router.query(), &state);
                        match router.navigate(mode, &query) {
                            Ok(()) => log::debug!("Transition {} wrote ?{}", seq, query),
                            Err(e) => {
                                log::warn!("Transition {} failed to write query: {}", seq, e);
                                // A newer commit still owns the flag.
                                if let Ok(queued) = worker_queued.lock()
                                    && queued.seq == seq
                                {
                                    worker_pending.release();
                                }
                            }
                        }
                        worker_written.store(seq, Ordering::SeqCst);
                    }
                    TransitionMsg::Settle(done) => {
                        let _ = done.send(());
                    }
                }
            }
            log::debug!("Transition worker stopped");
        });

        Self {
            tx,
            queued,
            written,
            pending,
        }
    }

    /// Queues a commit and marks the transition pending.
    pub(crate) fn start(&self, state: TableState) {
        let seq = match self.queued.lock() {
            Ok(mut guard) => {
                guard.seq += 1;
                guard.state = Some(state.clone());
                guard.seq
            }
            Err(_) => return,
        };

        self.pending.request(state.clone());
        if self.tx.send(TransitionMsg::Commit { seq, state }).is_err() {
            log::warn!("Transition worker is gone, dropping commit {}", seq);
            self.pending.release();
            self.written.store(seq, Ordering::SeqCst);
        }
    }

    /// The most recently queued state, if the worker has not written it yet.
    pub(crate) fn in_flight(&self) -> Option<TableState> {
        let guard = self.queued.lock().ok()?;
        if self.written.load(Ordering::SeqCst) < guard.seq {
            guard.state.clone()
        } else {
            None
        }
    }

    /// Waits until every commit queued so far has been written.
    pub(crate) async fn settled(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(TransitionMsg::Settle(done)).is_ok() {
            let _ = wait.await;
        }
    }
}
