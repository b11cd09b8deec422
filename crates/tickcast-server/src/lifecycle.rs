//! Connect/disconnect callbacks that keep the registry in sync.

use tickcast_common::SubscriberId;

use crate::registry::{Registry, Subscriber};

/// Wires connection events into a [`Registry`].
#[derive(Clone)]
pub struct Lifecycle {
    registry: Registry,
}

impl Lifecycle {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A connection finished its upgrade. Always accepted.
    pub async fn on_open(&self, subscriber: Subscriber) {
        let id = subscriber.id();
        if !self.registry.add(subscriber).await {
            tracing::warn!(subscriber = %id, "Subscriber opened twice");
            return;
        }
        let subscribers = self.registry.len().await;
        tracing::info!(
            subscriber = %id,
            subscribers,
            "Subscriber connected"
        );
    }

    /// A connection is gone. `reason` is only logged.
    pub async fn on_close(&self, id: SubscriberId, reason: &str) {
        let removed = self.registry.remove(id).await;
        tracing::info!(
            subscriber = %id,
            reason = %reason,
            removed,
            "Subscriber disconnected"
        );
    }
}
