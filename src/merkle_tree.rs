use alloy::primitives::{B256, Keccak256, keccak256};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;
use tracing::debug;

/// Keccak256 Merkle tree over allow-list leaves.
///
/// Leaves are hashed once with keccak256 and kept in insertion order. Pairs are
/// sorted before hashing, so proofs carry no position bits. On a level with an
/// odd number of nodes the last node is promoted to the next level unchanged.
///
/// This matches `merkletreejs` configured with `sortPairs: true` and is the
/// shape the hosted API publishes, so roots and proofs can be compared 1:1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<B256>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleTreeError {
    #[error("Cannot build a Merkle tree without leaves")]
    Empty,
    #[error("Leaf not found in tree")]
    LeafNotFound,
}

impl MerkleTree {
    pub fn new<T>(unhashed_leaves: &[T]) -> Result<Self, MerkleTreeError>
    where
        T: AsRef<[u8]> + Sync,
    {
        let hashes: Vec<B256> = unhashed_leaves
            .par_iter()
            .map(|leaf| keccak256(leaf.as_ref()))
            .collect();

        Self::from_leaf_hashes(hashes)
    }

    pub fn from_leaf_hashes(leaf_hashes: Vec<B256>) -> Result<Self, MerkleTreeError> {
        if leaf_hashes.is_empty() {
            return Err(MerkleTreeError::Empty);
        }

        let mut levels = vec![leaf_hashes];
        while levels[levels.len() - 1].len() > 1 {
            let next = hash_merge(&levels[levels.len() - 1]);
            levels.push(next);
        }

        debug!(
            "Built Merkle tree with {} leaves and {} levels",
            levels[0].len(),
            levels.len()
        );
        Ok(MerkleTree { levels })
    }

    pub fn root(&self) -> B256 {
        // Construction guarantees a final level with exactly one node.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn leaf_hashes(&self) -> &[B256] {
        &self.levels[0]
    }

    pub fn levels(&self) -> &[Vec<B256>] {
        &self.levels
    }

    /// Returns the sibling path from the hashed `unhashed_leaf` up to the root.
    pub fn proof(&self, unhashed_leaf: &[u8]) -> Result<Vec<B256>, MerkleTreeError> {
        self.proof_for_hash(keccak256(unhashed_leaf))
    }

    pub fn proof_for_hash(&self, leaf_hash: B256) -> Result<Vec<B256>, MerkleTreeError> {
        let index = self.levels[0]
            .iter()
            .position(|h| *h == leaf_hash)
            .ok_or(MerkleTreeError::LeafNotFound)?;

        self.proof_at(index)
    }

    /// Sibling path for the leaf at position `index` in level 0.
    pub fn proof_at(&self, mut index: usize) -> Result<Vec<B256>, MerkleTreeError> {
        if index >= self.leaf_count() {
            return Err(MerkleTreeError::LeafNotFound);
        }

        let mut proof = Vec::with_capacity(self.levels.len());
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };

            // A promoted node has no sibling on this level.
            if let Some(node) = level.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }

        Ok(proof)
    }

    /// Folds `proof` over the hashed leaf and compares against `root`.
    pub fn verify(root: B256, proof: &[B256], unhashed_leaf: &[u8]) -> bool {
        Self::verify_hash(root, proof, keccak256(unhashed_leaf))
    }

    pub fn verify_hash(root: B256, proof: &[B256], leaf_hash: B256) -> bool {
        let computed = proof
            .iter()
            .fold(leaf_hash, |acc, sibling| hash_pair(acc, *sibling));
        computed == root
    }
}

/// Hashes two nodes in ascending byte order.
pub fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let mut hasher = Keccak256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize()
}

fn hash_merge(level: &[B256]) -> Vec<B256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(*left, *right),
            [single] => *single,
            _ => unreachable!(),
        })
        .collect()
}
