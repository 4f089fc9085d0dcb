// src/engine/task.rs

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::engine::context::TaskContext;
use crate::errors::Result;

/// A unit of hierarchical work.
///
/// The engine calls [`Task::act`] exactly once when the task starts and
/// [`Task::react`] once for every child that committed, in arrival order.
/// Both run to completion; spawns, the commit and simulated crashes are
/// requested through the context and applied by the engine afterwards.
///
/// Tasks must serialize because a remotely placed task is copied into
/// another execution context.
pub trait Task: Serialize + DeserializeOwned + Send + Debug + Sized + 'static {
    /// Short variant name used in logs and envelopes.
    fn kind(&self) -> &'static str;

    fn act(&mut self, ctx: &mut TaskContext<'_, Self>) -> Result<()>;

    /// `child` is the committed child, handed over by value.
    fn react(&mut self, child: Self, ctx: &mut TaskContext<'_, Self>) -> Result<()>;
}
