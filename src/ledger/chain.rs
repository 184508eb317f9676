use crate::clock::{Clock, SystemClock};
use crate::error::{ChainError, Result};
use crate::hashing;
use crate::ledger::validation::valid_chain;
use serde::{Deserialize, Serialize};

/// Proof recorded in the genesis block. Never produced by the puzzle.
pub const GENESIS_PROOF: u64 = 100;

/// Sentinel `previous_hash` of the genesis block, which has no predecessor.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A value transfer queued for inclusion in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

/// One link of the hash chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Digest of the block's canonical JSON form. Blocks that differ in
    /// any field differ in digest.
    pub fn digest(&self) -> Result<String> {
        hashing::canonical_digest(self)
    }
}

/// The node's chain plus its pool of not-yet-forged transactions.
///
/// All mutation goes through [`forge_block`](Ledger::forge_block),
/// [`submit_transaction`](Ledger::submit_transaction) and
/// [`replace_chain`](Ledger::replace_chain). Callers that share a ledger
/// across tasks must serialize those calls behind one lock.
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    clock: Box<dyn Clock>,
}

impl Ledger {
    /// Create a ledger stamped by the system clock.
    pub fn new() -> Result<Self> {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Create a ledger with the provided clock. The genesis block is
    /// forged immediately, so the chain is never empty.
    pub fn with_clock(clock: Box<dyn Clock>) -> Result<Self> {
        let mut ledger = Ledger {
            chain: Vec::new(),
            pending: Vec::new(),
            clock,
        };
        ledger.forge_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()))?;
        Ok(ledger)
    }

    /// Forge a block from the pending pool and append it to the chain.
    ///
    /// `previous_hash` is only supplied when seeding the genesis block;
    /// every later block links to the digest of the current tip. The
    /// proof is recorded as given, correctness is the caller's concern.
    pub fn forge_block(&mut self, proof: u64, previous_hash: Option<String>) -> Result<Block> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => {
                let tip = self.chain.last().ok_or_else(|| {
                    ChainError::InvalidChain("cannot link a block to an empty chain".to_string())
                })?;
                tip.digest()?
            }
        };

        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: self.clock.now(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };

        self.chain.push(block.clone());
        Ok(block)
    }

    /// Queue a transaction and return the index of the block that will
    /// contain it. The index is a prediction: a chain replacement before
    /// the next forge can shift it. Saturates if an adopted chain already
    /// sits at `u64::MAX`.
    pub fn submit_transaction(&mut self, sender: String, recipient: String, amount: u64) -> u64 {
        self.pending.push(Transaction {
            sender,
            recipient,
            amount,
        });
        self.last_block().index.saturating_add(1)
    }

    /// The most recently appended block.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger holds at least the genesis block")
    }

    /// Swap in `candidate` as the new chain.
    ///
    /// The candidate must be non-empty and pass full validation; the
    /// pending pool is left untouched either way.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> Result<()> {
        if candidate.is_empty() {
            return Err(ChainError::InvalidChain(
                "candidate chain is empty".to_string(),
            ));
        }
        if !valid_chain(&candidate) {
            return Err(ChainError::InvalidChain(
                "candidate chain fails validation".to_string(),
            ));
        }
        self.chain = candidate;
        Ok(())
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::pow;

    fn test_ledger() -> Ledger {
        Ledger::with_clock(Box::new(FixedClock(1_690_000_000.0))).unwrap()
    }

    /// Extend the ledger with `count` blocks carrying real proofs.
    fn mine_blocks(ledger: &mut Ledger, count: usize) {
        for _ in 0..count {
            let proof = pow::find_proof(ledger.last_block().proof);
            ledger.forge_block(proof, None).unwrap();
        }
    }

    #[test]
    fn test_genesis_block_shape() {
        let ledger = test_ledger();
        assert_eq!(ledger.len(), 1);

        let genesis = ledger.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.timestamp, 1_690_000_000.0);
        assert!(genesis.transactions.is_empty());
    }

    #[test]
    fn test_submit_transaction_predicts_next_index() {
        let mut ledger = test_ledger();
        let index = ledger.submit_transaction("alice".to_string(), "bob".to_string(), 5);
        assert_eq!(index, 2);
        assert_eq!(ledger.pending().len(), 1);
        assert_eq!(ledger.pending()[0].sender, "alice");
        assert_eq!(ledger.pending()[0].recipient, "bob");
        assert_eq!(ledger.pending()[0].amount, 5);
    }

    #[test]
    fn test_forge_block_drains_pending_pool() {
        let mut ledger = test_ledger();
        ledger.submit_transaction("alice".to_string(), "bob".to_string(), 5);
        ledger.submit_transaction("bob".to_string(), "carol".to_string(), 3);

        let genesis_digest = ledger.last_block().digest().unwrap();
        let block = ledger.forge_block(12345, None).unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(block.proof, 12345);
        assert_eq!(block.previous_hash, genesis_digest);
        assert_eq!(block.transactions.len(), 2);
        assert!(ledger.pending().is_empty());
        assert_eq!(ledger.last_block(), &block);
    }

    #[test]
    fn test_prediction_moves_with_the_tip() {
        let mut ledger = test_ledger();
        assert_eq!(
            ledger.submit_transaction("a".to_string(), "b".to_string(), 1),
            2
        );
        ledger.forge_block(1, None).unwrap();
        assert_eq!(
            ledger.submit_transaction("a".to_string(), "b".to_string(), 1),
            3
        );
    }

    #[test]
    fn test_prediction_saturates_at_the_index_ceiling() {
        // A peer can serve a fully valid chain whose tip index is u64::MAX.
        let first = Block {
            index: u64::MAX - 1,
            timestamp: 1_690_000_000.0,
            transactions: Vec::new(),
            proof: 100,
            previous_hash: "1".to_string(),
        };
        let second = Block {
            index: u64::MAX,
            timestamp: 1_690_000_000.0,
            transactions: Vec::new(),
            proof: pow::find_proof(first.proof),
            previous_hash: first.digest().unwrap(),
        };

        let mut ledger = test_ledger();
        ledger.replace_chain(vec![first, second]).unwrap();

        let index = ledger.submit_transaction("alice".to_string(), "bob".to_string(), 5);
        assert_eq!(index, u64::MAX);
    }

    #[test]
    fn test_block_digests_match_known_vectors() {
        // Canonical form and digest are an interop contract shared by every node.
        let mut ledger = test_ledger();

        let canonical = serde_json::to_value(ledger.last_block()).unwrap().to_string();
        assert_eq!(
            canonical,
            r#"{"index":1,"previous_hash":"1","proof":100,"timestamp":1690000000.0,"transactions":[]}"#
        );
        assert_eq!(
            ledger.last_block().digest().unwrap(),
            "a9ee3a763f552a055e9eacdc4eff0c3365f8c94820a4b026490ab4019d6d4d06"
        );

        ledger.submit_transaction("alice".to_string(), "bob".to_string(), 5);
        let block = ledger.forge_block(12345, None).unwrap();
        assert_eq!(
            block.digest().unwrap(),
            "bb9aa6ba83c3c8e2a09a41ff72b6ef48afe24d079df30e943f01d4e92aaa2a7e"
        );
    }

    #[test]
    fn test_replace_chain_rejects_empty_candidate() {
        let mut ledger = test_ledger();
        let result = ledger.replace_chain(Vec::new());
        assert!(matches!(result, Err(ChainError::InvalidChain(_))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_replace_chain_rejects_invalid_candidate() {
        let mut donor = test_ledger();
        mine_blocks(&mut donor, 2);
        let mut candidate = donor.chain().to_vec();
        candidate[1].proof += 1;

        let mut ledger = test_ledger();
        let result = ledger.replace_chain(candidate);
        assert!(matches!(result, Err(ChainError::InvalidChain(_))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_replace_chain_adopts_valid_candidate() {
        let mut donor = test_ledger();
        mine_blocks(&mut donor, 2);
        let candidate = donor.chain().to_vec();

        let mut ledger = test_ledger();
        ledger.submit_transaction("a".to_string(), "b".to_string(), 1);
        ledger.replace_chain(candidate.clone()).unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.last_block(), &candidate[2]);
        // Replacement does not touch the pending pool.
        assert_eq!(ledger.pending().len(), 1);
    }
}
