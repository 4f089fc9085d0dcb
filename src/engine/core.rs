// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! One `CoreRuntime` exists per execution context. It consumes
//! [`CoreEvent`]s and produces:
//! - an updated task tree
//! - a list of commands describing what the IO shell should do next
//!
//! Local children never leave the core: they are queued and run
//! synchronously, in FIFO order, within the step that spawned them. Remote
//! children turn into `DispatchRemote` commands and come back later as
//! `RemoteCompleted` events.
//!
//! The core has no channels, no Tokio types and performs no IO of its own;
//! task bodies do their IO through [`Services`].

use std::collections::VecDeque;
use std::sync::Arc;

use crate::engine::CoreEvent;
use crate::engine::context::{Effect, Services, TaskContext};
use crate::engine::event_handlers::{
    CoreStep, Work, apply_effects, handle_remote_arrived, handle_remote_completed,
};
use crate::engine::placement::Placement;
use crate::engine::task::Task;
use crate::errors::Result;
use crate::hierarchy::{HierarchyTracker, TaskId, TaskPhase};

#[derive(Debug)]
pub struct CoreRuntime<T: Task> {
    services: Arc<Services>,
    placement: Placement,
    tracker: HierarchyTracker<T>,
    queue: VecDeque<Work<T>>,
}

impl<T: Task> CoreRuntime<T> {
    pub fn new(services: Arc<Services>, placement: Placement) -> Self {
        Self {
            services,
            placement,
            tracker: HierarchyTracker::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Insert the root task and run it as far as it goes.
    pub fn start(&mut self, root: T) -> Result<CoreStep<T>> {
        let id = self.tracker.insert_root(root);
        self.queue.push_back(Work::Act(id));
        self.drain()
    }

    /// Handle a single event, returning the commands for the IO shell.
    pub fn step(&mut self, event: CoreEvent) -> Result<CoreStep<T>> {
        match event {
            CoreEvent::RemoteArrived { origin, envelope } => {
                handle_remote_arrived(&mut self.tracker, &mut self.queue, origin, envelope)?
            }
            CoreEvent::RemoteCompleted { child, kernel } => {
                handle_remote_completed(&mut self.tracker, &mut self.queue, child, kernel)?
            }
        }
        self.drain()
    }

    /// Tasks currently held by this context, placeholders included (for tests).
    pub fn live_tasks(&self) -> usize {
        self.tracker.live_tasks()
    }

    /// Phase of a task, `None` once it committed (for tests).
    pub fn phase_of(&self, id: TaskId) -> Option<TaskPhase> {
        self.tracker.phase_of(id)
    }

    fn drain(&mut self) -> Result<CoreStep<T>> {
        let mut step = CoreStep::running();

        while let Some(work) = self.queue.pop_front() {
            let (id, effects) = match work {
                Work::Act(id) => (id, self.run_act(id)?),
                Work::React { parent, child } => (parent, self.run_react(parent, child)?),
            };

            let crashed = apply_effects(&mut self.tracker, &mut self.queue, id, effects, &mut step)?;
            if crashed {
                // Nothing else runs in a context that is about to die.
                self.queue.clear();
                break;
            }
            self.tracker.settle(id);
        }

        Ok(step)
    }

    fn run_act(&mut self, id: TaskId) -> Result<Vec<Effect<T>>> {
        let mut kernel = self.tracker.take_kernel(id)?;
        self.tracker.begin(id)?;

        let node = self.tracker.node(id)?;
        let mut ctx = TaskContext::new(
            id,
            &self.services,
            self.placement,
            node.parent,
            node.pending,
            node.carried_parent.as_ref(),
        );
        let outcome = kernel.act(&mut ctx);
        let effects = ctx.into_effects();

        self.tracker.put_kernel(id, kernel)?;
        outcome?;
        Ok(effects)
    }

    fn run_react(&mut self, parent: TaskId, child: T) -> Result<Vec<Effect<T>>> {
        let pending = self.tracker.child_reported(parent)?;
        let mut kernel = self.tracker.take_kernel(parent)?;

        let node = self.tracker.node(parent)?;
        let mut ctx = TaskContext::new(
            parent,
            &self.services,
            self.placement,
            node.parent,
            pending,
            node.carried_parent.as_ref(),
        );
        let outcome = kernel.react(child, &mut ctx);
        let effects = ctx.into_effects();

        self.tracker.put_kernel(parent, kernel)?;
        outcome?;
        Ok(effects)
    }
}
