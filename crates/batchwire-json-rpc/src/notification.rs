//! Deferred execution of notifications.
//!
//! Notifications never run while a batch is being answered. They are queued
//! in batch order and handed off once the response exists; their outcome is
//! never reported back to the client.

use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::dispatch::{BoundCall, invoke};

/// How queued notifications are run once a response has been assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationMode {
    /// Hand the queue to a background task and return immediately.
    /// Falls back to `Inline` outside a tokio runtime.
    #[default]
    Spawn,
    /// Drain the queue before `process_request` returns
    Inline,
}

/// One notification waiting to run, owning its own call snapshot
#[derive(Debug)]
pub struct PendingNotification {
    call: BoundCall,
}

impl PendingNotification {
    pub fn new(call: BoundCall) -> Self {
        Self { call }
    }

    pub fn method(&self) -> &str {
        &self.call.method
    }

    /// Run the notification and discard whatever it produces
    pub async fn run(self) {
        let method = self.call.method.clone();
        match invoke(self.call).await {
            Ok(_) => trace!(method = %method, "notification completed"),
            Err(error) => debug!(
                method = %method,
                code = error.code,
                message = %error.message,
                "notification failed, result discarded"
            ),
        }
    }
}

/// Notifications collected while processing one input, in input order
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<PendingNotification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, call: BoundCall) {
        trace!(method = %call.method, "notification deferred");
        self.pending.push(PendingNotification::new(call));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every queued notification sequentially, in the order queued
    pub async fn drain(self) {
        for notification in self.pending {
            notification.run().await;
        }
    }

    /// Hand the queue off according to `mode`
    pub async fn schedule(self, mode: NotificationMode) {
        if self.is_empty() {
            return;
        }
        match (mode, Handle::try_current()) {
            (NotificationMode::Spawn, Ok(handle)) => {
                trace!(count = self.len(), "spawning deferred notifications");
                handle.spawn(self.drain());
            }
            _ => self.drain().await,
        }
    }
}
