// src/hierarchy/node.rs

//! Task identities, parent links and the per-task phase machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::wire::Wire;
use crate::types::Target;

/// Identity of a task inside one execution context. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-task phase.
///
/// `Created -> Spawning -> {WaitingChildren} -> AllChildrenReported -> Committed`
///
/// A task re-enters `Spawning` when it spawns from a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Created,
    Spawning,
    WaitingChildren,
    AllChildrenReported,
    Committed,
}

/// Identifies the execution context a remotely placed task must report to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyToken(pub u64);

/// Where a remote root came from: the reply channel of the spawning context
/// and the placeholder id in that context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteOrigin {
    pub token: ReplyToken,
    pub child: TaskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// No parent: committing ends the run.
    Root,
    Local(TaskId),
    Remote(RemoteOrigin),
}

impl ParentLink {
    /// The target a commit must use to reach this parent, if constrained.
    pub fn required_target(&self) -> Option<Target> {
        match self {
            ParentLink::Root => None,
            ParentLink::Local(_) => Some(Target::Local),
            ParentLink::Remote(_) => Some(Target::Remote),
        }
    }
}

#[derive(Debug)]
pub struct TaskNode<T> {
    pub id: TaskId,
    /// `None` while the task is executing, or for an in-flight remote child.
    pub kernel: Option<T>,
    pub parent: ParentLink,
    /// Spawned children that have not been reacted to yet.
    pub pending: usize,
    pub phase: TaskPhase,
    pub location: Target,
    /// Serialized parent state that travelled with a remote task.
    pub carried_parent: Option<Wire>,
}

impl<T> TaskNode<T> {
    /// Placeholder standing for a child that runs in another context.
    pub fn is_in_flight(&self) -> bool {
        self.location == Target::Remote && self.kernel.is_none() && self.phase == TaskPhase::Created
    }
}
