// src/hierarchy/tracker.rs

//! Live tasks with parent links and pending-children counters.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::engine::wire::Wire;
use crate::errors::{Result, SpectreeError};
use crate::hierarchy::node::{ParentLink, RemoteOrigin, TaskId, TaskNode, TaskPhase};
use crate::types::Target;

/// Owns every live task of one execution context.
///
/// Ids come from a counter and are never reused, so a stale id keeps failing
/// after its task is gone. A committed task is removed and handed back to the
/// caller, which routes it to its parent; storage only holds live tasks.
#[derive(Debug)]
pub struct HierarchyTracker<T> {
    nodes: HashMap<TaskId, TaskNode<T>>,
    next_id: u64,
}

impl<T> Default for HierarchyTracker<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> HierarchyTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        kernel: Option<T>,
        parent: ParentLink,
        location: Target,
        carried_parent: Option<Wire>,
    ) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            TaskNode {
                id,
                kernel,
                parent,
                pending: 0,
                phase: TaskPhase::Created,
                location,
                carried_parent,
            },
        );
        id
    }

    /// Register the task that ends the run when it commits.
    pub fn insert_root(&mut self, kernel: T) -> TaskId {
        self.push(Some(kernel), ParentLink::Root, Target::Local, None)
    }

    /// Register a task that arrived from another execution context.
    pub fn insert_remote_root(
        &mut self,
        kernel: T,
        origin: RemoteOrigin,
        carried_parent: Option<Wire>,
    ) -> TaskId {
        self.push(
            Some(kernel),
            ParentLink::Remote(origin),
            Target::Remote,
            carried_parent,
        )
    }

    /// Register a child under `parent` and bump the parent's counter.
    ///
    /// Remote children are inserted without a kernel: the node is an
    /// in-flight placeholder until the completion comes back.
    pub fn insert_child(
        &mut self,
        parent: TaskId,
        kernel: Option<T>,
        location: Target,
    ) -> Result<TaskId> {
        let node = self.node_mut(parent)?;
        node.pending += 1;
        node.phase = TaskPhase::Spawning;
        let id = self.push(kernel, ParentLink::Local(parent), location, None);
        debug!(%parent, child = %id, %location, "registered child");
        Ok(id)
    }

    pub fn node(&self, id: TaskId) -> Result<&TaskNode<T>> {
        self.nodes
            .get(&id)
            .ok_or_else(|| SpectreeError::HierarchyError(format!("unknown task {id}")))
    }

    fn node_mut(&mut self, id: TaskId) -> Result<&mut TaskNode<T>> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| SpectreeError::HierarchyError(format!("unknown task {id}")))
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.node(id).is_ok()
    }

    pub fn kernel(&self, id: TaskId) -> Result<&T> {
        self.node(id)?
            .kernel
            .as_ref()
            .ok_or_else(|| SpectreeError::HierarchyError(format!("task {id} has no local state")))
    }

    /// Take the kernel out for an `act`/`react` call.
    pub fn take_kernel(&mut self, id: TaskId) -> Result<T> {
        self.node_mut(id)?
            .kernel
            .take()
            .ok_or_else(|| SpectreeError::HierarchyError(format!("task {id} is already running")))
    }

    pub fn put_kernel(&mut self, id: TaskId, kernel: T) -> Result<()> {
        self.node_mut(id)?.kernel = Some(kernel);
        Ok(())
    }

    /// Mark the start of `act`. Only valid once per task.
    pub fn begin(&mut self, id: TaskId) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.phase != TaskPhase::Created {
            return Err(SpectreeError::HierarchyError(format!(
                "task {id} acted twice (phase {:?})",
                node.phase
            )));
        }
        node.phase = TaskPhase::Spawning;
        Ok(())
    }

    /// Account for one child of `parent` having been reacted to.
    ///
    /// Returns the number of children still outstanding.
    pub fn child_reported(&mut self, parent: TaskId) -> Result<usize> {
        let node = self.node_mut(parent)?;
        if node.pending == 0 {
            return Err(SpectreeError::HierarchyError(format!(
                "task {parent} received a child report with no pending children"
            )));
        }
        node.pending -= 1;
        if node.pending == 0 {
            node.phase = TaskPhase::AllChildrenReported;
        }
        Ok(node.pending)
    }

    /// Settle the phase after an `act`/`react` body ran and its effects were
    /// applied. No-op for tasks that committed.
    pub fn settle(&mut self, id: TaskId) {
        let Ok(node) = self.node_mut(id) else {
            return;
        };
        node.phase = if node.pending > 0 {
            TaskPhase::WaitingChildren
        } else {
            TaskPhase::AllChildrenReported
        };
        if node.pending == 0 {
            warn!(task = %id, "task has no pending children and did not commit");
        }
    }

    /// Remove a task that finished and return it.
    ///
    /// Rejected while children are outstanding.
    pub fn commit(&mut self, id: TaskId) -> Result<TaskNode<T>> {
        let node = self.node(id)?;
        if node.pending > 0 {
            return Err(SpectreeError::HierarchyError(format!(
                "task {id} committed with {} unresolved children",
                node.pending
            )));
        }
        let mut node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| SpectreeError::HierarchyError(format!("unknown task {id}")))?;
        node.phase = TaskPhase::Committed;
        Ok(node)
    }

    /// Resolve an in-flight remote placeholder.
    ///
    /// Returns the parent id, or `None` when `child` is unknown or was
    /// already resolved.
    pub fn remove_in_flight(&mut self, child: TaskId) -> Option<TaskId> {
        let node = self.nodes.get(&child)?;
        let ParentLink::Local(parent) = node.parent else {
            return None;
        };
        if !node.is_in_flight() {
            return None;
        }
        self.nodes.remove(&child);
        Some(parent)
    }

    pub fn pending_children(&self, id: TaskId) -> Result<usize> {
        Ok(self.node(id)?.pending)
    }

    /// `None` once the task has committed.
    pub fn phase_of(&self, id: TaskId) -> Option<TaskPhase> {
        self.node(id).ok().map(|node| node.phase)
    }

    pub fn live_tasks(&self) -> usize {
        self.nodes.len()
    }

    /// Slots currently allocated for task storage.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }
}
