//! Registry of connected subscribers.

use std::collections::BTreeMap;
use std::sync::Arc;

use tickcast_common::{DeliveryError, SubscriberId};
use tokio::sync::{mpsc, RwLock};

/// Handle used to push text to one connection.
///
/// The connection task owns the socket and the receiving end of the queue;
/// a `Subscriber` only feeds that queue, so dropping one never closes a
/// connection. Once every handle for a connection is gone the task sees its
/// queue end and closes the socket itself.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: SubscriberId,
    tx: mpsc::Sender<Arc<str>>,
}

impl Subscriber {
    /// Create a handle with a fresh id and a bounded outbound queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        Self::with_id(SubscriberId::next(), capacity)
    }

    pub fn with_id(id: SubscriberId, capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queue `text` for delivery without waiting.
    pub fn send(&self, text: &Arc<str>) -> Result<(), DeliveryError> {
        self.tx.try_send(Arc::clone(text)).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(self.id),
            mpsc::error::TrySendError::Full(_) => DeliveryError::Lagging(self.id),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Thread-safe set of subscribers keyed by id.
///
/// Every operation takes the lock for its own duration only. Iteration
/// happens on the copy returned by [`snapshot`](Self::snapshot), so sends
/// never hold the lock.
#[derive(Clone, Default)]
pub struct Registry {
    subscribers: Arc<RwLock<BTreeMap<SubscriberId, Subscriber>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subscriber. Returns false if its id was already present,
    /// in which case the existing entry is kept.
    pub async fn add(&self, subscriber: Subscriber) -> bool {
        let mut map = self.subscribers.write().await;
        if map.contains_key(&subscriber.id) {
            return false;
        }
        map.insert(subscriber.id, subscriber);
        true
    }

    /// Remove a subscriber. Returns false if it was not present.
    pub async fn remove(&self, id: SubscriberId) -> bool {
        self.subscribers.write().await.remove(&id).is_some()
    }

    /// Point-in-time copy of the membership in connect order.
    pub async fn snapshot(&self) -> Vec<Subscriber> {
        self.subscribers.read().await.values().cloned().collect()
    }

    pub async fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn ids(snapshot: &[Subscriber]) -> Vec<SubscriberId> {
        snapshot.iter().map(Subscriber::id).collect()
    }

    #[tokio::test]
    async fn add_then_snapshot_contains_subscriber() {
        let registry = Registry::new();
        let (sub, _rx) = Subscriber::channel(4);
        let id = sub.id();

        assert!(registry.add(sub).await);
        assert_eq!(ids(&registry.snapshot().await), vec![id]);
        assert!(registry.contains(id).await);
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let registry = Registry::new();
        let (sub, _rx) = Subscriber::channel(4);

        assert!(registry.add(sub.clone()).await);
        assert!(!registry.add(sub).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn remove_absent_is_noop() {
        let registry = Registry::new();
        let (sub, _rx) = Subscriber::channel(4);
        let id = sub.id();
        registry.add(sub).await;

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn removed_subscriber_never_reappears() {
        let registry = Registry::new();
        let (a, _rx_a) = Subscriber::channel(4);
        let (b, _rx_b) = Subscriber::channel(4);
        let (a_id, b_id) = (a.id(), b.id());
        registry.add(a).await;
        registry.add(b).await;

        registry.remove(a_id).await;
        for _ in 0..3 {
            assert_eq!(ids(&registry.snapshot().await), vec![b_id]);
        }
    }

    #[tokio::test]
    async fn snapshot_is_ordered_by_connect_order() {
        let registry = Registry::new();
        let (late, _rx1) = Subscriber::with_id(SubscriberId::from_raw(30), 1);
        let (early, _rx2) = Subscriber::with_id(SubscriberId::from_raw(10), 1);
        let (mid, _rx3) = Subscriber::with_id(SubscriberId::from_raw(20), 1);
        registry.add(late).await;
        registry.add(early).await;
        registry.add(mid).await;

        let order: Vec<u64> = registry
            .snapshot()
            .await
            .iter()
            .map(|s| s.id().as_u64())
            .collect();
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_mutation() {
        let registry = Registry::new();
        let (a, _rx_a) = Subscriber::channel(4);
        let (b, _rx_b) = Subscriber::channel(4);
        let a_id = a.id();
        registry.add(a).await;

        let snapshot = registry.snapshot().await;
        registry.add(b).await;
        registry.remove(a_id).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), a_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_add_remove_keeps_exact_membership() {
        let registry = Registry::new();
        let mut receivers = Vec::new();
        let mut tasks = Vec::new();
        let mut expected = BTreeSet::new();

        for i in 0..100u64 {
            let (sub, rx) = Subscriber::channel(1);
            receivers.push(rx);
            // Every third subscriber disconnects again.
            let closes = i % 3 == 0;
            if !closes {
                expected.insert(sub.id());
            }
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let id = sub.id();
                registry.add(sub).await;
                tokio::task::yield_now().await;
                if closes {
                    registry.remove(id).await;
                }
            }));
        }

        // Snapshots taken concurrently must never see duplicates.
        let reader = {
            let registry = registry.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let snap = registry.snapshot().await;
                    let unique: BTreeSet<_> = snap.iter().map(Subscriber::id).collect();
                    assert_eq!(unique.len(), snap.len());
                    tokio::task::yield_now().await;
                }
            })
        };

        for task in tasks {
            task.await.unwrap();
        }
        reader.await.unwrap();

        let actual: BTreeSet<_> = ids(&registry.snapshot().await).into_iter().collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn send_reports_closed_and_full_queues() {
        let (sub, rx) = Subscriber::channel(1);
        let text: Arc<str> = Arc::from("hello");

        assert!(sub.send(&text).is_ok());
        assert_eq!(sub.send(&text), Err(DeliveryError::Lagging(sub.id())));

        drop(rx);
        assert!(sub.is_closed());
        assert_eq!(sub.send(&text), Err(DeliveryError::Closed(sub.id())));
    }
}
