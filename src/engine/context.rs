// src/engine/context.rs

//! What a task sees while `act` or `react` runs.

use std::sync::Arc;

use tracing::warn;

use crate::config::ConfigFile;
use crate::engine::placement::Placement;
use crate::engine::task::Task;
use crate::engine::wire::Wire;
use crate::errors::{Result, SpectreeError};
use crate::fault::{CrashPlan, Environment, FaultConfig, FaultHook, FaultPoint};
use crate::fs::FileSystem;
use crate::hierarchy::{ParentLink, TaskId};
use crate::types::Target;

/// Shared collaborators handed to every task operation.
#[derive(Debug, Clone)]
pub struct Services {
    pub fs: Arc<dyn FileSystem>,
    pub env: Arc<dyn Environment>,
    pub faults: FaultHook,
    pub config: Arc<ConfigFile>,
}

impl Services {
    /// Build services, reading the fault settings from `env`.
    pub fn new(fs: Arc<dyn FileSystem>, env: Arc<dyn Environment>, config: ConfigFile) -> Self {
        let faults = FaultHook::new(FaultConfig::from_env(env.as_ref()));
        Self {
            fs,
            env,
            faults,
            config: Arc::new(config),
        }
    }
}

/// A request recorded during `act`/`react`, applied once the body returns.
#[derive(Debug)]
pub enum Effect<T> {
    Spawn {
        child: T,
        target: Target,
        carries_parent: bool,
    },
    Commit {
        target: Target,
    },
    Crash(CrashPlan),
}

pub struct TaskContext<'a, T> {
    id: TaskId,
    services: &'a Services,
    placement: Placement,
    parent: ParentLink,
    pending: usize,
    carried_parent: Option<&'a Wire>,
    effects: Vec<Effect<T>>,
    committed: bool,
}

impl<'a, T: Task> TaskContext<'a, T> {
    pub fn new(
        id: TaskId,
        services: &'a Services,
        placement: Placement,
        parent: ParentLink,
        pending: usize,
        carried_parent: Option<&'a Wire>,
    ) -> Self {
        Self {
            id,
            services,
            placement,
            parent,
            pending,
            carried_parent,
            effects: Vec::new(),
            committed: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// Children still outstanding, not counting those spawned by this call.
    ///
    /// Inside `react` this drops to zero exactly once, on the reaction to the
    /// last outstanding child.
    pub fn pending_children(&self) -> usize {
        self.pending
    }

    /// Spawn `child` under the current task.
    ///
    /// Fails without recording anything if the placement cannot be honoured.
    pub fn upstream(&mut self, child: T, target: Target) -> Result<()> {
        self.spawn(child, target, false)
    }

    /// Spawn a remote child that takes a snapshot of the current task with it.
    pub fn upstream_carrying_parent(&mut self, child: T, target: Target) -> Result<()> {
        self.spawn(child, target, true)
    }

    fn spawn(&mut self, child: T, target: Target, carries_parent: bool) -> Result<()> {
        self.placement.check(target, carries_parent)?;
        if self.committed {
            return Err(SpectreeError::HierarchyError(format!(
                "task {} spawned a child after committing",
                self.id
            )));
        }
        self.effects.push(Effect::Spawn {
            child,
            target,
            carries_parent,
        });
        Ok(())
    }

    /// Finish the current task and report it to its parent through `target`.
    pub fn commit(&mut self, target: Target) -> Result<()> {
        if self.committed {
            return Err(SpectreeError::HierarchyError(format!(
                "task {} committed twice",
                self.id
            )));
        }
        match self.parent.required_target() {
            Some(required) if required != target => {
                return Err(SpectreeError::PlacementError(format!(
                    "task {} committed with a {target} target but its parent is {required}",
                    self.id
                )));
            }
            _ => {}
        }
        self.committed = true;
        self.effects.push(Effect::Commit { target });
        Ok(())
    }

    /// Stop here if `point` is armed for this host.
    ///
    /// Returns `true` when the task must return without doing anything else.
    pub fn crash_if_armed(&mut self, point: FaultPoint) -> bool {
        match self.services.faults.arm(point, self.services.env.as_ref()) {
            Some(plan) => {
                warn!(task = %self.id, %point, host = %plan.host, "fault point armed");
                self.effects.push(Effect::Crash(plan));
                true
            }
            None => false,
        }
    }

    /// State of the parent, if this task was spawned carrying it.
    pub fn carried_parent(&self) -> Result<Option<T>> {
        self.carried_parent.map(|wire| wire.decode::<T>()).transpose()
    }

    pub fn into_effects(self) -> Vec<Effect<T>> {
        self.effects
    }
}
