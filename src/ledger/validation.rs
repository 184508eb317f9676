use crate::ledger::chain::Block;
use crate::pow;

/// Structural validity of a whole chain.
///
/// Walks adjacent pairs and requires that every block links to its
/// predecessor's digest, carries a winning proof against the
/// predecessor's proof, and increments the index by exactly one. Works
/// the same on the local chain and on any candidate fetched from a peer.
pub fn valid_chain(chain: &[Block]) -> bool {
    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);

        let expected = match previous.digest() {
            Ok(digest) => digest,
            Err(_) => return false,
        };
        if block.previous_hash != expected {
            return false;
        }
        if !pow::valid_proof(previous.proof, block.proof) {
            return false;
        }
        if previous.index.checked_add(1) != Some(block.index) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ledger::chain::{Ledger, Transaction};
    use crate::pow::find_proof;

    /// A chain of `extra + 1` blocks whose proofs come from the real puzzle.
    fn mined_chain(extra: usize) -> Vec<Block> {
        let mut ledger = Ledger::with_clock(Box::new(FixedClock(1_690_000_000.0))).unwrap();
        for i in 0..extra {
            ledger.submit_transaction(format!("sender-{}", i), "recipient".to_string(), 1);
            let proof = find_proof(ledger.last_block().proof);
            ledger.forge_block(proof, None).unwrap();
        }
        ledger.chain().to_vec()
    }

    #[test]
    fn test_mined_chain_is_valid() {
        assert!(valid_chain(&mined_chain(3)));
    }

    #[test]
    fn test_single_block_chain_is_valid() {
        assert!(valid_chain(&mined_chain(0)));
    }

    #[test]
    fn test_tampered_amount_invalidates_chain() {
        let mut chain = mined_chain(3);
        chain[1].transactions[0].amount += 1;
        assert!(!valid_chain(&chain));
    }

    #[test]
    fn test_tampered_proof_invalidates_chain() {
        let mut chain = mined_chain(3);
        chain[2].proof += 1;
        assert!(!valid_chain(&chain));
    }

    #[test]
    fn test_tampered_link_invalidates_chain() {
        let mut chain = mined_chain(3);
        chain[2].previous_hash = "deadbeef".to_string();
        assert!(!valid_chain(&chain));
    }

    #[test]
    fn test_injected_transaction_invalidates_chain() {
        let mut chain = mined_chain(3);
        chain[1].transactions.push(Transaction {
            sender: "mallory".to_string(),
            recipient: "mallory".to_string(),
            amount: 1_000_000,
        });
        assert!(!valid_chain(&chain));
    }

    #[test]
    fn test_index_gap_invalidates_chain() {
        let mut chain = mined_chain(2);
        chain[2].index = 5;
        assert!(!valid_chain(&chain));
    }

    #[test]
    fn test_predecessor_at_max_index_invalidates_chain() {
        // With wrapping arithmetic an index of 0 would chain onto u64::MAX.
        let first = Block {
            index: u64::MAX,
            timestamp: 1_690_000_000.0,
            transactions: Vec::new(),
            proof: 100,
            previous_hash: "1".to_string(),
        };
        let second = Block {
            index: 0,
            timestamp: 1_690_000_000.0,
            transactions: Vec::new(),
            proof: find_proof(first.proof),
            previous_hash: first.digest().unwrap(),
        };
        assert!(!valid_chain(&[first, second]));
    }
}
