//! Simulated network transport with fault injection.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tidepool_env::{Communicator, EnvError, NetworkController, Rank, Tag};

/// Wraps a rank's transport and consults the shared controller on every send.
pub struct SimNetwork<C: Communicator> {
    /// Underlying transport
    inner: C,

    /// Shared fault configuration
    controller: Arc<SimNetworkController>,
}

impl<C: Communicator> SimNetwork<C> {
    /// Creates a simulated interface over an existing endpoint.
    pub fn new(inner: C, controller: Arc<SimNetworkController>) -> Self {
        Self { inner, controller }
    }
}

#[async_trait]
impl<C: Communicator> Communicator for SimNetwork<C> {
    fn rank(&self) -> Rank {
        self.inner.rank()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    async fn send(&self, dest: Rank, tag: Tag, payload: Vec<i32>) -> Result<(), EnvError> {
        let from = self.inner.rank();
        if !self.controller.can_communicate(from, dest) {
            return Err(EnvError::unreachable(format!("{} -> {} (tag {})", from, dest, tag)));
        }

        let latency = self.controller.get_latency(from, dest);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        self.inner.send(dest, tag, payload).await?;
        self.controller.record_send();
        Ok(())
    }

    async fn recv(&self, source: Rank, tag: Tag) -> Result<Vec<i32>, EnvError> {
        self.inner.recv(source, tag).await
    }
}

/// Network controller for fault injection.
pub struct SimNetworkController {
    /// Per-link latency in milliseconds
    link_latency: Mutex<HashMap<(Rank, Rank), u64>>,

    /// Active partitions (ranks that cannot communicate)
    partitions: Mutex<Vec<(Vec<Rank>, Vec<Rank>)>>,

    /// Envelopes delivered to the underlying transport
    messages_sent: AtomicU64,
}

impl SimNetworkController {
    /// Creates a new network controller.
    pub fn new() -> Self {
        Self {
            link_latency: Mutex::new(HashMap::new()),
            partitions: Mutex::new(Vec::new()),
            messages_sent: AtomicU64::new(0),
        }
    }

    /// Checks if two ranks can communicate (not partitioned).
    pub fn can_communicate(&self, from: Rank, to: Rank) -> bool {
        let partitions = match self.partitions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        for (group_a, group_b) in partitions.iter() {
            let from_in_a = group_a.contains(&from);
            let from_in_b = group_b.contains(&from);
            let to_in_a = group_a.contains(&to);
            let to_in_b = group_b.contains(&to);

            if (from_in_a && to_in_b) || (from_in_b && to_in_a) {
                return false;
            }
        }

        true
    }

    /// Gets the latency for a link (default 0).
    pub fn get_latency(&self, from: Rank, to: Rank) -> u64 {
        let latencies = match self.link_latency.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        latencies.get(&(from, to)).copied().unwrap_or(0)
    }

    /// Total envelopes sent through every wrapped endpoint.
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    fn record_send(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }
}

impl NetworkController for SimNetworkController {
    fn partition(&self, group_a: &[Rank], group_b: &[Rank]) {
        let mut partitions = match self.partitions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        partitions.push((group_a.to_vec(), group_b.to_vec()));
    }

    fn heal_all(&self) {
        let mut partitions = match self.partitions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        partitions.clear();
    }

    fn set_link_latency(&self, from: Rank, to: Rank, latency_ms: u64) {
        let mut latencies = match self.link_latency.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        latencies.insert((from, to), latency_ms);
    }
}

impl Default for SimNetworkController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_env::LocalFabric;

    #[test]
    fn test_network_controller_partition() {
        let controller = SimNetworkController::new();

        let a = Rank(0);
        let b = Rank(1);
        let c = Rank(2);

        // Initially all can communicate
        assert!(controller.can_communicate(a, b));
        assert!(controller.can_communicate(a, c));
        assert!(controller.can_communicate(b, c));

        // Partition: {a} vs {b, c}
        controller.partition(&[a], &[b, c]);

        assert!(!controller.can_communicate(a, b));
        assert!(!controller.can_communicate(c, a));
        assert!(controller.can_communicate(b, c));

        controller.heal_all();
        assert!(controller.can_communicate(a, b));
    }

    #[test]
    fn test_network_controller_latency() {
        let controller = SimNetworkController::new();

        assert_eq!(controller.get_latency(Rank(0), Rank(1)), 0);

        controller.set_link_latency(Rank(0), Rank(1), 100);
        assert_eq!(controller.get_latency(Rank(0), Rank(1)), 100);

        // Reverse direction is separate
        assert_eq!(controller.get_latency(Rank(1), Rank(0)), 0);
    }

    #[tokio::test]
    async fn test_severed_link_refuses_send() {
        let controller = Arc::new(SimNetworkController::new());
        let mut ranks: Vec<_> = LocalFabric::new(2, 1)
            .into_iter()
            .map(|comm| SimNetwork::new(comm, controller.clone()))
            .collect();
        let b = ranks.pop().unwrap();
        let a = ranks.pop().unwrap();

        a.send(Rank(1), Tag(5), vec![42]).await.unwrap();
        assert_eq!(b.recv(Rank(0), Tag(5)).await.unwrap(), vec![42]);
        assert_eq!(controller.messages_sent(), 1);

        controller.partition(&[Rank(0)], &[Rank(1)]);
        let err = a.send(Rank(1), Tag(5), vec![43]).await.unwrap_err();
        assert!(matches!(err, EnvError::NodeUnreachable(_)));
        assert_eq!(controller.messages_sent(), 1);
    }
}
