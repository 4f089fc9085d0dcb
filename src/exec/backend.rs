// src/exec/backend.rs

//! Pluggable remote backend abstraction.
//!
//! The runtime talks to a `RemoteBackend` instead of a raw channel. This makes
//! it easy to swap in a fake backend in tests while keeping the production
//! worker pool in [`super::worker_pool`].
//!
//! - [`super::WorkerPool`] is the implementation used by `spectree`. It
//!   forwards envelopes round-robin to worker contexts.
//! - [`LocalOnly`] rejects every dispatch, for runs without remote contexts.
//! - Tests can provide their own `RemoteBackend` that, for example, records
//!   envelopes and answers with `Message::Completed` directly.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc::UnboundedSender;

use crate::engine::{Envelope, Message};
use crate::errors::{Result, SpectreeError};
use crate::hierarchy::TaskId;

/// Trait abstracting how remote tasks reach another execution context.
pub trait RemoteBackend: Send {
    /// Hand `envelope` to some remote context.
    ///
    /// The receiving context must eventually answer on `reply_to` with a
    /// `Message::Completed` carrying `child`, unless it dies.
    fn dispatch(
        &mut self,
        child: TaskId,
        envelope: Envelope,
        reply_to: UnboundedSender<Message>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Backend for a process without remote contexts.
///
/// Placement checks already reject remote spawns in that configuration, so a
/// dispatch reaching this backend is an engine bug.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

impl RemoteBackend for LocalOnly {
    fn dispatch(
        &mut self,
        child: TaskId,
        envelope: Envelope,
        _reply_to: UnboundedSender<Message>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            Err(SpectreeError::PlacementError(format!(
                "cannot dispatch {} task {child}: no remote context",
                envelope.kind
            )))
        })
    }
}
