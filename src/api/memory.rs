use std::collections::BTreeMap;

use alloy::primitives::{Address, B256, Bytes};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    api::{
        ApiError, MerkleApi,
        types::{CreateTreeResponse, ProofResponse, RootsResponse, TreeResponse},
    },
    leaf::{LeafSet, leaf_to_address, parse_descriptor},
    merkle_tree::MerkleTree,
};

/// In-process [`MerkleApi`] backed by [`MerkleTree`].
///
/// Trees are keyed by root and held for the lifetime of the value. Used for
/// offline runs and as a stand-in for the hosted API in tests.
#[derive(Debug, Default)]
pub struct MemoryApi {
    trees: RwLock<BTreeMap<B256, PublishedTree>>,
}

#[derive(Debug, Clone)]
struct PublishedTree {
    unhashed_leaves: Vec<Bytes>,
    leaf_type_descriptor: Vec<String>,
    packed_encoding: bool,
    tree: MerkleTree,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of published trees.
    pub async fn len(&self) -> usize {
        self.trees.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trees.read().await.is_empty()
    }

    async fn published(&self, root: B256) -> Result<PublishedTree, ApiError> {
        self.trees
            .read()
            .await
            .get(&root)
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}

#[async_trait::async_trait]
impl MerkleApi for MemoryApi {
    async fn create_tree(&self, leaves: &LeafSet) -> Result<CreateTreeResponse, ApiError> {
        parse_descriptor(leaves.leaf_type_descriptor())
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let tree = MerkleTree::new(leaves.unhashed_leaves())?;
        let merkle_root = tree.root();

        let published = PublishedTree {
            unhashed_leaves: leaves.unhashed_leaves().to_vec(),
            leaf_type_descriptor: leaves.leaf_type_descriptor().to_vec(),
            packed_encoding: leaves.packed_encoding(),
            tree,
        };
        self.trees.write().await.insert(merkle_root, published);

        debug!("Published tree {} with {} leaves", merkle_root, leaves.len());
        Ok(CreateTreeResponse { merkle_root })
    }

    async fn tree(&self, root: B256) -> Result<TreeResponse, ApiError> {
        let published = self.published(root).await?;
        let leaf_type_descriptor = if published.leaf_type_descriptor.is_empty() {
            None
        } else {
            Some(published.leaf_type_descriptor)
        };

        Ok(TreeResponse {
            leaf_count: published.unhashed_leaves.len(),
            unhashed_leaves: published.unhashed_leaves,
            leaf_type_descriptor,
            packed_encoding: published.packed_encoding,
        })
    }

    async fn proof_for_leaf(
        &self,
        root: B256,
        unhashed_leaf: &[u8],
    ) -> Result<ProofResponse, ApiError> {
        let published = self.published(root).await?;
        let proof = published.tree.proof(unhashed_leaf)?;

        Ok(ProofResponse {
            unhashed_leaf: Some(Bytes::copy_from_slice(unhashed_leaf)),
            proof,
        })
    }

    async fn proof_for_address(
        &self,
        root: B256,
        address: Address,
    ) -> Result<ProofResponse, ApiError> {
        let published = self.published(root).await?;

        let index = published
            .unhashed_leaves
            .iter()
            .position(|leaf| {
                leaf_to_address(
                    leaf,
                    &published.leaf_type_descriptor,
                    published.packed_encoding,
                ) == Some(address)
            })
            .ok_or(ApiError::NotFound)?;

        let proof = published.tree.proof_at(index)?;

        Ok(ProofResponse {
            unhashed_leaf: Some(published.unhashed_leaves[index].clone()),
            proof,
        })
    }

    async fn roots_for_proof(&self, proof: &[B256]) -> Result<RootsResponse, ApiError> {
        if proof.is_empty() {
            return Err(ApiError::EmptyProof);
        }

        let trees = self.trees.read().await;
        let roots: Vec<B256> = trees
            .iter()
            .filter(|(_, published)| {
                let tree = &published.tree;
                (0..tree.leaf_count()).any(|index| tree.proof_at(index).is_ok_and(|p| p == proof))
            })
            .map(|(root, _)| *root)
            .collect();

        if roots.is_empty() {
            return Err(ApiError::NotFound);
        }

        Ok(RootsResponse { roots })
    }
}
