// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tumbler-eventbus: the in-process pub/sub fan-out that streams project
//! progress to external consumers.
//!
//! A single [`EventBus`] instance is shared process-wide. Subscribers
//! register a [`Filter`] (by project name and/or event kind) and receive
//! matching events through a bounded `tokio::mpsc` queue. Delivery
//! semantics follow the documented contract exactly:
//!
//! - Terminal events (`phase_change`, `score_update`, `project_complete`,
//! `project_failed`) plus `conversation_update` (which always carries the
//! complete text, the documented contract) are delivered reliably and in order: a full
//! queue is given a bounded grace period, and a subscriber that is still
//! full after that is disconnected rather than allowed to stall the
//! publisher indefinitely.
//! - Everything else — chiefly the high-frequency `conversation_chunk` — is
//! lossy: a full queue simply drops the event.
//!
//! The bus never blocks a publisher indefinitely and never reorders events
//! within one project's stream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tumbler_core::Event;

/// Default bound on a subscriber's per-event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Grace period a reliable-delivery publish waits for a full queue to drain
/// before disconnecting the slow subscriber.
pub const DEFAULT_BLOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// A subscriber's interest: match by project name, by event kind, or both.
/// `None` in either field means "no filter on that dimension".
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub project: Option<String>,
    pub kinds: Option<std::collections::HashSet<&'static str>>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_project(project: impl Into<String>) -> Self {
        Self { project: Some(project.into()), kinds: None }
    }

    pub fn for_kinds(kinds: impl IntoIterator<Item = &'static str>) -> Self {
        Self { project: None, kinds: Some(kinds.into_iter().collect()) }
    }

    fn matches(&self, event: &Event) -> bool {
        if let Some(project) = &self.project {
            if event.project() != Some(project.as_str()) {
                return false;
            }
        }
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(event.kind()) {
                return false;
            }
        }
        true
    }
}

/// A live registration returned by [`EventBus::subscribe`]. Dropping it
/// unregisters the subscriber.
pub struct Subscription {
    id: u64,
    bus: EventBus,
    receiver: mpsc::Receiver<Event>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.remove(self.id);
    }
}

struct Subscriber {
    filter: Filter,
    sender: mpsc::Sender<Event>,
}

struct Inner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    queue_capacity: usize,
    block_timeout: Duration,
}

/// Cheaply cloneable handle to the shared bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY, DEFAULT_BLOCK_TIMEOUT)
    }
}

impl EventBus {
    pub fn new(queue_capacity: usize, block_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(HashMap::new()),
                queue_capacity,
                block_timeout,
            }),
        }
    }

    /// Register a new subscriber matching `filter`.
    pub async fn subscribe(&self, filter: Filter) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.inner.queue_capacity);
        self.inner.subscribers.lock().await.insert(id, Subscriber { filter, sender });
        Subscription { id, bus: self.clone(), receiver }
    }

    fn remove(&self, id: u64) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.subscribers.lock().await.remove(&id);
        });
    }

    /// A `conversation_update` always carries the complete text
    /// and must never be dropped under backpressure, even though it isn't
    /// in the core terminal set used for other ordering guarantees.
    fn requires_reliable_delivery(event: &Event) -> bool {
        event.is_terminal() || matches!(event, Event::ConversationUpdate { .. })
    }

    /// Publish `event` to every matching subscriber.
    ///
    /// Reliable events are sent with a bounded wait; a subscriber still full
    /// after [`DEFAULT_BLOCK_TIMEOUT`] is disconnected and the disconnect is
    /// logged. Everything else is best-effort: a full queue drops
    /// the event silently rather than stalling the publisher.
    pub async fn publish(&self, event: Event) {
        let reliable = Self::requires_reliable_delivery(&event);
        let mut to_remove = Vec::new();
        {
            let subscribers = self.inner.subscribers.lock().await;
            for (&id, subscriber) in subscribers.iter() {
                if !subscriber.filter.matches(&event) {
                    continue;
                }
                if reliable {
                    match tokio::time::timeout(
                        self.inner.block_timeout,
                        subscriber.sender.send(event.clone()),
                    )
                    .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(_)) => to_remove.push(id),
                        Err(_elapsed) => {
                            tracing::warn!(
                                subscriber_id = id,
                                event = event.kind(),
                                "subscriber queue full past grace period, disconnecting"
                            );
                            to_remove.push(id);
                        }
                    }
                } else if subscriber.sender.try_send(event.clone()).is_err() {
                    tracing::trace!(subscriber_id = id, event = event.kind(), "dropping lossy event for slow subscriber");
                }
            }
        }
        if !to_remove.is_empty() {
            let mut subscribers = self.inner.subscribers.lock().await;
            for id in to_remove {
                subscribers.remove(&id);
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().await.len()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
