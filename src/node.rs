//! Node runtime shared by the HTTP layer

use crate::consensus::{self, HttpPeerClient, PeerClient};
use crate::error::{ChainError, Result};
use crate::ledger::{Block, Ledger};
use crate::peers::PeerDirectory;
use crate::pow;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Sender recorded on mining reward transactions.
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the miner for each forged block.
pub const MINING_REWARD: u64 = 1;

/// One running node: the ledger, its peers, and the identity that
/// collects mining rewards.
#[derive(Clone)]
pub struct Node {
    pub ledger: Arc<RwLock<Ledger>>,
    pub peers: PeerDirectory,
    peer_client: Arc<dyn PeerClient>,
    node_id: String,
    stop_mining: Arc<AtomicBool>,
}

impl Node {
    /// Node with the system clock and a live HTTP peer client.
    pub fn new() -> Result<Self> {
        Ok(Self::with_parts(
            Ledger::new()?,
            Arc::new(HttpPeerClient::new()?),
        ))
    }

    /// Node assembled from explicit parts. Tests inject a pinned clock
    /// and canned peers through here.
    pub fn with_parts(ledger: Ledger, peer_client: Arc<dyn PeerClient>) -> Self {
        Self::with_node_id(ledger, peer_client, generate_node_id())
    }

    /// Node with a caller-chosen identity, so operators can keep mining
    /// rewards credited to the same identifier across restarts.
    pub fn with_node_id(ledger: Ledger, peer_client: Arc<dyn PeerClient>, node_id: String) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            peers: PeerDirectory::new(),
            peer_client,
            node_id,
            stop_mining: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hex identifier under which this node collects mining rewards.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Forge the next block: solve the puzzle against the current tip,
    /// credit this node with the mining reward, and append.
    ///
    /// One write guard covers the whole operation, so the tip cannot move
    /// between the proof search and the append and the reward cannot leak
    /// into another block. The search blocks the calling task; at the
    /// fixed difficulty it finishes within milliseconds.
    pub async fn mine_block(&self) -> Result<Block> {
        let mut ledger = self.ledger.write().await;

        let last_proof = ledger.last_block().proof;
        let proof = pow::find_proof_until(last_proof, &self.stop_mining)
            .ok_or(ChainError::MiningCancelled)?;

        ledger.submit_transaction(
            REWARD_SENDER.to_string(),
            self.node_id.clone(),
            MINING_REWARD,
        );
        let block = ledger.forge_block(proof, None)?;
        info!(index = block.index, proof = block.proof, "forged new block");
        Ok(block)
    }

    /// Run longest-chain resolution against every registered peer.
    /// Returns `true` iff the local chain was replaced.
    pub async fn resolve(&self) -> bool {
        consensus::resolve_conflicts(&self.ledger, &self.peers, self.peer_client.as_ref()).await
    }

    /// Raise the stop flag: an in-flight proof search returns without
    /// forging, and later mine calls fail fast.
    pub fn stop_mining(&self) {
        self.stop_mining.store(true, Ordering::Relaxed);
    }
}

/// Random 128-bit identifier as 32 hex characters.
fn generate_node_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}
