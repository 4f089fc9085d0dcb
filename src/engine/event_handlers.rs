// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::engine::context::Effect;
use crate::engine::task::Task;
use crate::engine::wire::{Envelope, Wire};
use crate::errors::{Result, SpectreeError};
use crate::fault::CrashPlan;
use crate::hierarchy::{HierarchyTracker, ParentLink, RemoteOrigin, TaskId};
use crate::types::Target;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand<T> {
    /// Hand a remote child to another execution context.
    DispatchRemote { child: TaskId, envelope: Envelope },
    /// Send a committed remote task back to the context that spawned it.
    Reply { origin: RemoteOrigin, kernel: Wire },
    /// The root committed; the run is over.
    Finished(T),
    /// A fault point fired: kill the parent process and this one.
    SimulateCrash(CrashPlan),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug)]
pub struct CoreStep<T> {
    pub commands: Vec<CoreCommand<T>>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl<T> CoreStep<T> {
    pub fn running() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }
}

/// Queued unit of synchronous work inside one execution context.
#[derive(Debug)]
pub(crate) enum Work<T> {
    Act(TaskId),
    React { parent: TaskId, child: T },
}

/// Handle a task that was dispatched to this context.
pub(crate) fn handle_remote_arrived<T: Task>(
    tracker: &mut HierarchyTracker<T>,
    queue: &mut VecDeque<Work<T>>,
    origin: RemoteOrigin,
    envelope: Envelope,
) -> Result<()> {
    let kernel: T = envelope.kernel.decode()?;
    let id = tracker.insert_remote_root(kernel, origin, envelope.carried_parent);
    debug!(task = %id, kind = envelope.kind, origin = %origin.child, "remote task arrived");
    queue.push_back(Work::Act(id));
    Ok(())
}

/// Handle a remote child reporting back.
///
/// Unknown or already resolved placeholders are ignored, so a reaction can
/// never run twice for one child.
pub(crate) fn handle_remote_completed<T: Task>(
    tracker: &mut HierarchyTracker<T>,
    queue: &mut VecDeque<Work<T>>,
    child: TaskId,
    kernel: Wire,
) -> Result<()> {
    let Some(parent) = tracker.remove_in_flight(child) else {
        warn!(%child, "ignoring completion for an unknown or resolved remote child");
        return Ok(());
    };
    let kernel: T = kernel.decode()?;
    debug!(%parent, %child, kind = kernel.kind(), "remote child completed");
    queue.push_back(Work::React {
        parent,
        child: kernel,
    });
    Ok(())
}

/// Apply the effects recorded by one `act`/`react` call of task `id`.
///
/// Effects are applied in request order. Returns `true` if a crash was
/// requested; later effects are discarded in that case.
pub(crate) fn apply_effects<T: Task>(
    tracker: &mut HierarchyTracker<T>,
    queue: &mut VecDeque<Work<T>>,
    id: TaskId,
    effects: Vec<Effect<T>>,
    step: &mut CoreStep<T>,
) -> Result<bool> {
    for effect in effects {
        match effect {
            Effect::Spawn {
                child,
                target: Target::Local,
                ..
            } => {
                let child_id = tracker.insert_child(id, Some(child), Target::Local)?;
                queue.push_back(Work::Act(child_id));
            }
            Effect::Spawn {
                child,
                target: Target::Remote,
                carries_parent,
            } => {
                let carried_parent = if carries_parent {
                    Some(Wire::encode(tracker.kernel(id)?)?)
                } else {
                    None
                };
                let envelope = Envelope {
                    kind: child.kind(),
                    kernel: Wire::encode(&child)?,
                    carried_parent,
                };
                let child_id = tracker.insert_child(id, None, Target::Remote)?;
                step.commands.push(CoreCommand::DispatchRemote {
                    child: child_id,
                    envelope,
                });
            }
            Effect::Commit { target } => {
                commit_task(tracker, queue, id, target, step)?;
            }
            Effect::Crash(plan) => {
                step.commands.push(CoreCommand::SimulateCrash(plan));
                step.keep_running = false;
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn commit_task<T: Task>(
    tracker: &mut HierarchyTracker<T>,
    queue: &mut VecDeque<Work<T>>,
    id: TaskId,
    target: Target,
    step: &mut CoreStep<T>,
) -> Result<()> {
    let mut node = tracker.commit(id)?;
    let kernel = node
        .kernel
        .take()
        .ok_or_else(|| SpectreeError::HierarchyError(format!("task {id} committed without state")))?;
    debug!(task = %id, kind = kernel.kind(), %target, "task committed");

    match node.parent {
        ParentLink::Root => {
            info!(task = %id, kind = kernel.kind(), "root task committed");
            step.commands.push(CoreCommand::Finished(kernel));
            step.keep_running = false;
        }
        ParentLink::Local(parent) => {
            queue.push_back(Work::React {
                parent,
                child: kernel,
            });
        }
        ParentLink::Remote(origin) => {
            step.commands.push(CoreCommand::Reply {
                origin,
                kernel: Wire::encode(&kernel)?,
            });
        }
    }
    Ok(())
}
