//! Transport abstraction between Tidepool ranks.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::types::{Rank, Tag};

/// Point-to-point message passing between the ranks of one run.
///
/// # Implementations
///
/// - **In-process**: `LocalComm`, a full mesh of bounded channels
/// - **Simulation**: a wrapper that injects latency and severed links
///
/// # Delivery contract
///
/// ```text
/// Rank A                     Link A→B                    Rank B
///   |                           |                          |
///   |-- send(B, tag, data) ---->|                          |
///   |                           |-- in order per tag ----->|
///   |                           |                          |-- recv(A, tag) -> data
/// ```
///
/// Messages are delivered at least once and in order per
/// `(sender, receiver, tag)`. Both ends block: `send` waits for buffer space
/// and `recv` waits for a matching message.
#[async_trait]
pub trait Communicator: Send + Sync + 'static {
    /// Returns this process's rank.
    fn rank(&self) -> Rank;
    
    /// Returns the number of ranks in the run.
    fn size(&self) -> usize;
    
    /// Sends a tagged payload to a peer.
    ///
    /// # Returns
    /// * `Ok(())` - Payload queued on the link
    /// * `Err(EnvError)` - The link is gone or the rank is invalid
    async fn send(&self, dest: Rank, tag: Tag, payload: Vec<i32>) -> Result<(), EnvError>;
    
    /// Receives the next payload from `source` carrying `tag`.
    ///
    /// Messages from the same source with other tags are held back for
    /// later receives, never dropped.
    async fn recv(&self, source: Rank, tag: Tag) -> Result<Vec<i32>, EnvError>;
}

/// Fault injection for transports under test.
pub trait NetworkController: Send + Sync {
    /// Severs every link between the two rank sets.
    fn partition(&self, group_a: &[Rank], group_b: &[Rank]);
    
    /// Heals all partitions.
    fn heal_all(&self);
    
    /// Sets latency for a specific link.
    fn set_link_latency(&self, from: Rank, to: Rank, latency_ms: u64);
}
