// src/exec/worker_pool.rs

//! Pool of remote execution contexts.
//!
//! Each worker is a Tokio task running its own [`Runtime`] with its own core
//! and task tracker. Workers share nothing but [`Services`]; task state reaches them
//! only as serialized envelopes. Inboxes are unbounded so that a worker can
//! dispatch to itself without blocking.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::{CoreRuntime, Envelope, Message, Placement, Runtime, Services, Task};
use crate::errors::{Result, SpectreeError};
use crate::exec::backend::RemoteBackend;
use crate::hierarchy::TaskId;

#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: Arc<Vec<UnboundedSender<Message>>>,
    cursor: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Start `size` worker contexts on the current Tokio runtime.
    ///
    /// The workers stop on [`WorkerPool::shutdown`], or with an error when a
    /// simulated crash fires inside them.
    pub fn spawn<T: Task>(size: usize, services: Arc<Services>) -> (Self, JoinSet<Result<()>>) {
        let mut senders = Vec::with_capacity(size);
        let mut receivers = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push(rx);
        }

        let pool = Self {
            workers: Arc::new(senders),
            cursor: Arc::new(AtomicUsize::new(0)),
        };

        let mut handles = JoinSet::new();
        for (index, rx) in receivers.into_iter().enumerate() {
            let core = CoreRuntime::<T>::new(services.clone(), Placement::new(true));
            let runtime = Runtime::with_inbox(core, pool.clone(), pool.workers[index].clone(), rx);
            handles.spawn(async move {
                debug!(worker = index, "worker context started");
                runtime.serve().await
            });
        }

        info!(workers = size, "remote worker pool started");
        (pool, handles)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Ask every worker to stop after the messages already queued.
    pub fn shutdown(&self) {
        for worker in self.workers.iter() {
            // A worker that already stopped has nothing left to shut down.
            let _ = worker.send(Message::Shutdown);
        }
    }

    fn next_worker(&self) -> Option<&UnboundedSender<Message>> {
        if self.workers.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers.get(index)
    }
}

impl RemoteBackend for WorkerPool {
    fn dispatch(
        &mut self,
        child: TaskId,
        envelope: Envelope,
        reply_to: UnboundedSender<Message>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let worker = self.next_worker().cloned();

        Box::pin(async move {
            let worker = worker.ok_or_else(|| {
                SpectreeError::PlacementError("worker pool is empty".to_string())
            })?;
            let kind = envelope.kind;
            let message = Message::Dispatch {
                child,
                envelope,
                reply_to,
            };
            if worker.send(message).is_err() {
                warn!(%child, kind, "worker context is gone; task dropped");
            }
            Ok(())
        })
    }
}
