//! In-process transport: a full mesh of bounded channels.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::network::Communicator;
use crate::types::{Envelope, Rank, Tag};
use std::collections::{HashMap, VecDeque};
use tokio::sync::{mpsc, Mutex};

/// Builder for a set of connected in-process ranks.
pub struct LocalFabric;

impl LocalFabric {
    /// Creates `size` connected endpoints, one per rank.
    ///
    /// Every ordered pair of ranks gets its own bounded link of `capacity`
    /// envelopes (at least 1), so a slow receiver throttles only the sender
    /// that feeds it.
    pub fn new(size: usize, capacity: usize) -> Vec<LocalComm> {
        let capacity = capacity.max(1);
        let mut outboxes: Vec<Vec<mpsc::Sender<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inboxes: Vec<Vec<Mutex<Inbox>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        
        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = mpsc::channel(capacity);
                outboxes[src].push(tx);
                inboxes[dst].push(Mutex::new(Inbox::new(rx)));
            }
        }
        
        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| LocalComm {
                rank: Rank(rank),
                size,
                outboxes,
                inboxes,
            })
            .collect()
    }
}

/// Receiving end of one link plus messages held back for other tags.
struct Inbox {
    rx: mpsc::Receiver<Envelope>,
    stash: HashMap<Tag, VecDeque<Vec<i32>>>,
}

impl Inbox {
    fn new(rx: mpsc::Receiver<Envelope>) -> Self {
        Self {
            rx,
            stash: HashMap::new(),
        }
    }
}

/// One rank's endpoint on a `LocalFabric`.
pub struct LocalComm {
    /// This endpoint's rank
    rank: Rank,
    
    /// Number of ranks on the fabric
    size: usize,
    
    /// Outgoing links, indexed by destination rank
    outboxes: Vec<mpsc::Sender<Envelope>>,
    
    /// Incoming links, indexed by source rank
    inboxes: Vec<Mutex<Inbox>>,
}

impl LocalComm {
    fn check_rank(&self, rank: Rank) -> Result<(), EnvError> {
        if rank.0 >= self.size {
            return Err(EnvError::InvalidRank {
                rank,
                size: self.size,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Communicator for LocalComm {
    fn rank(&self) -> Rank {
        self.rank
    }
    
    fn size(&self) -> usize {
        self.size
    }
    
    async fn send(&self, dest: Rank, tag: Tag, payload: Vec<i32>) -> Result<(), EnvError> {
        self.check_rank(dest)?;
        
        self.outboxes[dest.0]
            .send(Envelope::new(tag, payload))
            .await
            .map_err(|_| EnvError::Disconnected { peer: dest, tag })
    }
    
    async fn recv(&self, source: Rank, tag: Tag) -> Result<Vec<i32>, EnvError> {
        self.check_rank(source)?;
        
        let mut inbox = self.inboxes[source.0].lock().await;
        if let Some(payload) = inbox.stash.get_mut(&tag).and_then(|queue| queue.pop_front()) {
            return Ok(payload);
        }
        
        loop {
            match inbox.rx.recv().await {
                Some(envelope) if envelope.tag == tag => return Ok(envelope.payload),
                Some(envelope) => {
                    inbox
                        .stash
                        .entry(envelope.tag)
                        .or_default()
                        .push_back(envelope.payload);
                }
                None => return Err(EnvError::Disconnected { peer: source, tag }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[tokio::test]
    async fn test_point_to_point_delivery() {
        let mut ranks = LocalFabric::new(2, 4);
        let b = ranks.pop().unwrap();
        let a = ranks.pop().unwrap();
        
        assert_eq!(a.rank(), Rank(0));
        assert_eq!(b.size(), 2);
        
        a.send(Rank(1), Tag(7), vec![1, 2, 3]).await.unwrap();
        assert_eq!(b.recv(Rank(0), Tag(7)).await.unwrap(), vec![1, 2, 3]);
    }
    
    #[tokio::test]
    async fn test_selective_receive_by_tag() {
        let mut ranks = LocalFabric::new(2, 4);
        let b = ranks.pop().unwrap();
        let a = ranks.pop().unwrap();
        
        a.send(Rank(1), Tag(1), vec![10]).await.unwrap();
        a.send(Rank(1), Tag(2), vec![20]).await.unwrap();
        a.send(Rank(1), Tag(1), vec![11]).await.unwrap();
        
        // Tag 2 is behind a tag-1 message; the tag-1 messages are held back
        assert_eq!(b.recv(Rank(0), Tag(2)).await.unwrap(), vec![20]);
        assert_eq!(b.recv(Rank(0), Tag(1)).await.unwrap(), vec![10]);
        assert_eq!(b.recv(Rank(0), Tag(1)).await.unwrap(), vec![11]);
    }
    
    #[tokio::test]
    async fn test_sources_do_not_cross() {
        let mut ranks = LocalFabric::new(3, 1);
        let c = ranks.pop().unwrap();
        let b = ranks.pop().unwrap();
        let a = ranks.pop().unwrap();
        
        a.send(Rank(2), Tag(5), vec![0]).await.unwrap();
        b.send(Rank(2), Tag(5), vec![1]).await.unwrap();
        
        assert_eq!(c.recv(Rank(1), Tag(5)).await.unwrap(), vec![1]);
        assert_eq!(c.recv(Rank(0), Tag(5)).await.unwrap(), vec![0]);
    }
    
    #[tokio::test]
    async fn test_dropped_peer_disconnects() {
        let mut ranks = LocalFabric::new(2, 1);
        let b = ranks.pop().unwrap();
        let a = ranks.pop().unwrap();
        drop(a);
        
        let err = b.recv(Rank(0), Tag(3)).await.unwrap_err();
        assert!(matches!(err, EnvError::Disconnected { peer: Rank(0), .. }));
        
        let err = b.send(Rank(0), Tag(3), vec![]).await.unwrap_err();
        assert!(matches!(err, EnvError::Disconnected { .. }));
    }
    
    #[tokio::test]
    async fn test_invalid_rank_rejected() {
        let ranks = LocalFabric::new(2, 1);
        let err = ranks[0].send(Rank(5), Tag(0), vec![]).await.unwrap_err();
        assert!(matches!(err, EnvError::InvalidRank { size: 2, .. }));
    }
}
