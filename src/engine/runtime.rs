// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::errors::{Result, SpectreeError};
use crate::exec::RemoteBackend;
use crate::hierarchy::{RemoteOrigin, ReplyToken};

use super::core::CoreRuntime;
use super::task::Task;
use super::{CoreCommand, CoreEvent, CoreStep, Message};

/// Drives one execution context.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the task
/// semantics. It reads `Message`s from the context's inbox, feeds them to the
/// core, and executes the resulting commands: remote dispatches go through a
/// `RemoteBackend`, replies go straight to the sender that dispatched the
/// task.
pub struct Runtime<T: Task, B: RemoteBackend> {
    core: CoreRuntime<T>,
    inbox_tx: UnboundedSender<Message>,
    inbox_rx: UnboundedReceiver<Message>,
    backend: B,
    replies: HashMap<ReplyToken, UnboundedSender<Message>>,
    next_token: u64,
    finished: Option<T>,
}

impl<T: Task, B: RemoteBackend> fmt::Debug for Runtime<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("pending_replies", &self.replies.len())
            .finish_non_exhaustive()
    }
}

impl<T: Task, B: RemoteBackend> Runtime<T, B> {
    /// Runtime with a fresh inbox.
    pub fn new(core: CoreRuntime<T>, backend: B) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self::with_inbox(core, backend, inbox_tx, inbox_rx)
    }

    /// Runtime around an inbox created by the caller (worker pools hand out
    /// the senders before the workers start).
    pub fn with_inbox(
        core: CoreRuntime<T>,
        backend: B,
        inbox_tx: UnboundedSender<Message>,
        inbox_rx: UnboundedReceiver<Message>,
    ) -> Self {
        Self {
            core,
            inbox_tx,
            inbox_rx,
            backend,
            replies: HashMap::new(),
            next_token: 0,
            finished: None,
        }
    }

    /// Sender other contexts use to reach this one.
    pub fn inbox(&self) -> UnboundedSender<Message> {
        self.inbox_tx.clone()
    }

    /// Run `root` until it commits and return its final state.
    pub async fn run_root(mut self, root: T) -> Result<T> {
        info!(kind = root.kind(), "starting root task");

        let step = self.core.start(root)?;
        let mut keep_running = self.execute(step).await?;

        while keep_running {
            let message = self.inbox_rx.recv().await.ok_or_else(|| {
                SpectreeError::HierarchyError("inbox closed before the root committed".to_string())
            })?;
            debug!(?message, "main context received message");
            keep_running = self.handle_message(message).await?;
        }

        self.finished.take().ok_or_else(|| {
            SpectreeError::HierarchyError("runtime stopped before the root committed".to_string())
        })
    }

    /// Serve dispatched tasks until `Message::Shutdown`.
    pub async fn serve(mut self) -> Result<()> {
        while let Some(message) = self.inbox_rx.recv().await {
            debug!(?message, "worker context received message");
            if !self.handle_message(message).await? {
                break;
            }
        }
        debug!("worker context exiting");
        Ok(())
    }

    async fn handle_message(&mut self, message: Message) -> Result<bool> {
        let event = match message {
            Message::Dispatch {
                child,
                envelope,
                reply_to,
            } => {
                let token = ReplyToken(self.next_token);
                self.next_token += 1;
                self.replies.insert(token, reply_to);
                CoreEvent::RemoteArrived {
                    origin: RemoteOrigin { token, child },
                    envelope,
                }
            }
            Message::Completed { child, kernel } => CoreEvent::RemoteCompleted { child, kernel },
            Message::Shutdown => return Ok(false),
        };

        let step = self.core.step(event)?;
        self.execute(step).await
    }

    async fn execute(&mut self, step: CoreStep<T>) -> Result<bool> {
        for command in step.commands {
            self.execute_command(command).await?;
        }
        Ok(step.keep_running)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand<T>) -> Result<()> {
        match command {
            CoreCommand::DispatchRemote { child, envelope } => {
                debug!(%child, kind = envelope.kind, bytes = envelope.kernel.encoded_len(), "dispatching remote task");
                let reply_to = self.inbox_tx.clone();
                self.backend.dispatch(child, envelope, reply_to).await?;
            }
            CoreCommand::Reply { origin, kernel } => match self.replies.remove(&origin.token) {
                Some(reply_to) => {
                    let message = Message::Completed {
                        child: origin.child,
                        kernel,
                    };
                    if reply_to.send(message).is_err() {
                        warn!(child = %origin.child, "spawning context is gone; dropping completion");
                    }
                }
                None => {
                    warn!(child = %origin.child, "no reply channel for remote task; dropping completion");
                }
            },
            CoreCommand::Finished(kernel) => {
                self.finished = Some(kernel);
            }
            CoreCommand::SimulateCrash(plan) => {
                if !plan.delay.is_zero() {
                    tokio::time::sleep(plan.delay).await;
                }
                warn!(point = %plan.point, host = %plan.host, "simulating crash: killing parent and self");
                let env = self.core.services().env.clone();
                env.terminate_parent();
                env.terminate_self();
                return Err(SpectreeError::SimulatedCrash {
                    point: plan.point,
                    host: plan.host,
                });
            }
        }
        Ok(())
    }
}
