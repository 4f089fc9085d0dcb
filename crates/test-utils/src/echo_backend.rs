use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;

use spectree::engine::{Envelope, Message};
use spectree::errors::{Result, SpectreeError};
use spectree::exec::RemoteBackend;
use spectree::hierarchy::TaskId;

/// One dispatch seen by [`EchoBackend`].
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub child: TaskId,
    pub envelope: Envelope,
}

/// A fake remote backend that:
/// - records every envelope it receives
/// - immediately reports the child back as completed, unchanged.
#[derive(Debug, Clone, Default)]
pub struct EchoBackend {
    dispatched: Arc<Mutex<Vec<Dispatched>>>,
}

impl EchoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> Vec<Dispatched> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl RemoteBackend for EchoBackend {
    fn dispatch(
        &mut self,
        child: TaskId,
        envelope: Envelope,
        reply_to: UnboundedSender<Message>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            let kernel = envelope.kernel.clone();
            {
                let mut guard = dispatched.lock().unwrap();
                guard.push(Dispatched { child, envelope });
            }

            reply_to
                .send(Message::Completed { child, kernel })
                .map_err(|_| SpectreeError::HierarchyError("reply channel closed".to_string()))?;
            Ok(())
        })
    }
}
