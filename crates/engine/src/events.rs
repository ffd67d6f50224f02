//! Commit event hub
//!
//! Filtered publish/subscribe for commit notifications. Every subscriber owns
//! a private unbounded queue; the ledger publishes after a transaction commits
//! and each event is copied to every subscriber whose filter matches.
//!
//! ## Design
//!
//! - Registrations live in a `parking_lot::Mutex<FxHashMap>` keyed by id
//! - [`Subscription`] removes its registration on drop, so a subscriber can
//!   never leak past the scope that holds it
//! - [`EventHub::close`] drops every queue; pending receivers then observe
//!   end-of-stream
//! - [`EventHub::subscriber_count`] makes leaks observable in tests

use idledger_core::{Error, Result, TxId};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

// ============================================================================
// CommitEvent / EventFilter
// ============================================================================

/// Notification published when a transaction commits with an event set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// Committing transaction
    pub tx_id: TxId,
    /// Contract that set the event
    pub contract_id: String,
    /// Event name chosen by the contract
    pub event_name: String,
    /// Block the transaction committed in
    pub block: u64,
    /// Opaque payload
    pub payload: Vec<u8>,
}

/// Which events a subscription receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Contract id to match
    pub contract_id: String,
    /// Event name to match
    pub event_name: String,
    /// Restrict to a single transaction; `None` matches every transaction
    pub tx_id: Option<TxId>,
}

impl EventFilter {
    /// Filter for every event of `event_name` from `contract_id`
    pub fn new(contract_id: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            event_name: event_name.into(),
            tx_id: None,
        }
    }

    /// Restrict the filter to one transaction
    pub fn for_tx(mut self, tx_id: TxId) -> Self {
        self.tx_id = Some(tx_id);
        self
    }

    /// Whether `event` passes the filter
    pub fn matches(&self, event: &CommitEvent) -> bool {
        self.contract_id == event.contract_id
            && self.event_name == event.event_name
            && self.tx_id.map_or(true, |id| id == event.tx_id)
    }
}

// ============================================================================
// EventHub
// ============================================================================

struct Registration {
    filter: EventFilter,
    sender: mpsc::UnboundedSender<CommitEvent>,
}

#[derive(Default)]
struct HubInner {
    registrations: Mutex<FxHashMap<u64, Registration>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Filtered pub/sub of commit events
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl EventHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a private queue for events matching `filter`
    pub fn subscribe(&self, filter: EventFilter) -> Result<Subscription> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();

        self.inner
            .registrations
            .lock()
            .insert(id, Registration { filter, sender });

        Ok(Subscription {
            id,
            receiver,
            hub: Arc::clone(&self.inner),
        })
    }

    /// Deliver `event` to every matching subscriber. Returns the number of
    /// queues it was placed on.
    pub fn publish(&self, event: &CommitEvent) -> usize {
        if self.is_closed() {
            return 0;
        }
        let registrations = self.inner.registrations.lock();
        let mut delivered = 0;
        for (id, reg) in registrations.iter() {
            if !reg.filter.matches(event) {
                continue;
            }
            if reg.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::warn!(subscription = id, tx_id = %event.tx_id, "dropped commit event delivery");
            }
        }
        tracing::debug!(
            tx_id = %event.tx_id,
            contract = %event.contract_id,
            event = %event.event_name,
            block = event.block,
            delivered,
            "published commit event"
        );
        delivered
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.registrations.lock().len()
    }

    /// Whether [`EventHub::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stop accepting subscriptions and drop every queue
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.registrations.lock().clear();
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscriber_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Private delivery queue; unregisters itself when dropped
pub struct Subscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<CommitEvent>,
    hub: Arc<HubInner>,
}

impl Subscription {
    /// Wait for the next event. `None` once the hub is closed.
    pub async fn recv(&mut self) -> Option<CommitEvent> {
        self.receiver.recv().await
    }

    /// Next queued event without waiting
    pub fn try_recv(&mut self) -> Option<CommitEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.registrations.lock().remove(&self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(tx_id: TxId) -> CommitEvent {
        CommitEvent {
            tx_id,
            contract_id: "example-service".into(),
            event_name: "eventInvoke".into(),
            block: 1,
            payload: Vec::new(),
        }
    }

    fn filter() -> EventFilter {
        EventFilter::new("example-service", "eventInvoke")
    }

    #[test]
    fn test_filter_matching() {
        let tx = TxId::new();
        let e = event(tx);
        assert!(filter().matches(&e));
        assert!(filter().for_tx(tx).matches(&e));
        assert!(!filter().for_tx(TxId::new()).matches(&e));
        assert!(!EventFilter::new("other", "eventInvoke").matches(&e));
        assert!(!EventFilter::new("example-service", "other").matches(&e));
    }

    #[test]
    fn test_subscription_unregisters_on_drop() {
        let hub = EventHub::new();
        let a = hub.subscribe(filter()).unwrap();
        let b = hub.subscribe(filter()).unwrap();
        assert_eq!(hub.subscriber_count(), 2);
        drop(a);
        assert_eq!(hub.subscriber_count(), 1);
        drop(b);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_only_to_matching() {
        let hub = EventHub::new();
        let tx = TxId::new();
        let mut mine = hub.subscribe(filter().for_tx(tx)).unwrap();
        let mut other = hub.subscribe(filter().for_tx(TxId::new())).unwrap();
        let mut all = hub.subscribe(filter()).unwrap();

        assert_eq!(hub.publish(&event(tx)), 2);
        assert_eq!(mine.try_recv().map(|e| e.tx_id), Some(tx));
        assert!(other.try_recv().is_none());
        assert!(all.try_recv().is_some());
    }

    #[tokio::test]
    async fn test_close_ends_pending_receivers() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe(filter()).unwrap();
        hub.close();
        assert!(sub.recv().await.is_none());
        assert_eq!(hub.subscriber_count(), 0);
        assert!(matches!(hub.subscribe(filter()), Err(Error::Closed)));
        assert_eq!(hub.publish(&event(TxId::new())), 0);
    }

    #[tokio::test]
    async fn test_recv_delivers_published_event() {
        let hub = EventHub::new();
        let tx = TxId::new();
        let mut sub = hub.subscribe(filter().for_tx(tx)).unwrap();
        let publisher = hub.clone();
        tokio::spawn(async move {
            publisher.publish(&event(tx));
        });
        let received = sub.recv().await.unwrap();
        assert_eq!(received.tx_id, tx);
    }
}
