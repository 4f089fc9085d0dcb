// src/engine/mod.rs

//! Task execution engine.
//!
//! This module ties together:
//! - the [`task::Task`] contract (act / react / commit)
//! - the [`context::TaskContext`] through which tasks request effects
//! - placement checks for Local and Remote spawns
//! - the serialized form of tasks crossing a context boundary
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. Every execution context (the main one and each
//! remote worker) runs one `Runtime` around its own `CoreRuntime`.

use tokio::sync::mpsc::UnboundedSender;

use crate::hierarchy::{RemoteOrigin, TaskId};

pub mod context;
pub mod core;
pub mod event_handlers;
pub mod placement;
pub mod runtime;
pub mod task;
pub mod wire;

/// Events fed into a core by its IO shell.
#[derive(Debug)]
pub enum CoreEvent {
    /// A task was dispatched to this context by another one.
    RemoteArrived {
        origin: RemoteOrigin,
        envelope: Envelope,
    },
    /// A remote child of one of our tasks committed.
    RemoteCompleted { child: TaskId, kernel: Wire },
}

/// Messages exchanged between execution contexts.
#[derive(Debug)]
pub enum Message {
    /// Run `envelope` here and send the completion to `reply_to`.
    Dispatch {
        child: TaskId,
        envelope: Envelope,
        reply_to: UnboundedSender<Message>,
    },
    Completed { child: TaskId, kernel: Wire },
    Shutdown,
}

pub use context::{Effect, Services, TaskContext};
pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use placement::Placement;
pub use runtime::Runtime;
pub use task::Task;
pub use wire::{Envelope, Wire};
