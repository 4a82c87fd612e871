//! Session change fan-out.
//!
//! Each subscriber gets its own task draining a broadcast receiver, so a
//! slow handler never blocks the auth call that emitted the event.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use blogspace_core::domain::{AuthEvent, Session};
use blogspace_core::ports::{AuthChangeHandler, SubscriptionId};

type Change = (AuthEvent, Option<Session>);

pub struct SessionBroadcaster {
    sender: broadcast::Sender<Change>,
    subscribers: Mutex<HashMap<SubscriptionId, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl SessionBroadcaster {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sender: broadcast::channel(buffer_size).0,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Publish a transition to every subscriber.
    pub fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send((event, session));
        tracing::debug!(event = ?event, "Auth event emitted");
    }

    /// Register a handler. It first receives `InitialSession` with the
    /// session current at subscription time.
    pub async fn subscribe(
        &self,
        handler: AuthChangeHandler,
        current: Option<Session>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut receiver = self.sender.subscribe();
        let handler = Arc::new(handler);

        let task = tokio::spawn(async move {
            handler(AuthEvent::InitialSession, current).await;

            loop {
                match receiver.recv().await {
                    Ok((event, session)) => handler(event, session).await,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            subscription = id.0,
                            lagged = count,
                            "Auth subscriber lagged behind"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.subscribers.lock().await.insert(id, task);
        tracing::debug!(subscription = id.0, "Auth subscriber registered");
        id
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(task) = self.subscribers.lock().await.remove(&id) {
            task.abort();
            tracing::debug!(subscription = id.0, "Auth subscriber removed");
        }
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Drop for SessionBroadcaster {
    fn drop(&mut self) {
        for (_, task) in self.subscribers.get_mut().drain() {
            task.abort();
        }
    }
}
