//! Longest-chain consensus across registered peers

use crate::error::Result;
use crate::ledger::{valid_chain, Block, Ledger};
use crate::peers::PeerDirectory;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// How long a single peer fetch may take before it counts as a failure.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Wire shape served by the chain export endpoint and consumed during
/// resolution. Every node is both client and server of this contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainSnapshot {
    pub fn of(ledger: &Ledger) -> Self {
        ChainSnapshot {
            chain: ledger.chain().to_vec(),
            length: ledger.len(),
        }
    }
}

/// Fetches a peer's full chain.
///
/// Resolution is written against this trait so tests can drive it with
/// canned peers instead of live sockets.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn fetch_chain(&self, address: &str) -> Result<ChainSnapshot>;
}

/// [`PeerClient`] speaking HTTP to the chain endpoint other nodes expose.
pub struct HttpPeerClient {
    http_client: reqwest::Client,
}

impl HttpPeerClient {
    /// Client with the default fetch timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    /// Client with an explicit per-fetch timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpPeerClient { http_client })
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, address: &str) -> Result<ChainSnapshot> {
        let url = format!("http://{}/chain", address);
        let snapshot = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<ChainSnapshot>()
            .await?;
        Ok(snapshot)
    }
}

/// Replace the local chain if some peer proves a strictly longer valid one.
///
/// Peers are visited in the directory's sorted order, so a tie among
/// equally long candidates does not depend on registration order: the
/// first longer chain encountered is kept until a strictly longer one
/// displaces it. A peer that is unreachable, answers with a non-success
/// status, or sends a snapshot whose reported length disagrees with its
/// chain is skipped.
///
/// No ledger lock is held while chains download; the ledger is locked
/// only for the final swap, where superiority is checked once more in
/// case the local chain grew during the sweep.
///
/// Returns `true` iff the local chain was replaced.
pub async fn resolve_conflicts(
    ledger: &RwLock<Ledger>,
    peers: &PeerDirectory,
    client: &dyn PeerClient,
) -> bool {
    let mut max_length = ledger.read().await.len();
    let mut best: Option<Vec<Block>> = None;

    for address in peers.list() {
        let snapshot = match client.fetch_chain(&address).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(peer = %address, error = %err, "skipping unreachable peer");
                continue;
            }
        };

        if snapshot.length != snapshot.chain.len() {
            warn!(
                peer = %address,
                reported = snapshot.length,
                actual = snapshot.chain.len(),
                "skipping peer with inconsistent snapshot"
            );
            continue;
        }

        if snapshot.chain.len() > max_length && valid_chain(&snapshot.chain) {
            debug!(peer = %address, length = snapshot.chain.len(), "new best candidate");
            max_length = snapshot.chain.len();
            best = Some(snapshot.chain);
        } else {
            debug!(peer = %address, length = snapshot.chain.len(), "candidate not adopted");
        }
    }

    let Some(candidate) = best else {
        return false;
    };

    let mut guard = ledger.write().await;
    if candidate.len() <= guard.len() {
        debug!("local chain caught up during the sweep, keeping it");
        return false;
    }
    match guard.replace_chain(candidate) {
        Ok(()) => {
            info!(length = guard.len(), "adopted longer chain from peer");
            true
        }
        Err(err) => {
            warn!(error = %err, "candidate chain rejected at swap time");
            false
        }
    }
}
