mod client;
mod memory;
pub mod types;

use alloy::primitives::{Address, B256};
use reqwest::StatusCode;
use thiserror::Error;

pub use client::LanyardClient;
pub use memory::MemoryApi;
pub use types::{CreateTreeResponse, ProofResponse, RootResponse, RootsResponse, TreeResponse};

use crate::{leaf::LeafSet, merkle_tree::MerkleTreeError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Proof must not be empty")]
    EmptyProof,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<MerkleTreeError> for ApiError {
    fn from(err: MerkleTreeError) -> Self {
        match err {
            MerkleTreeError::LeafNotFound => ApiError::NotFound,
            MerkleTreeError::Empty => ApiError::BadRequest(err.to_string()),
        }
    }
}

/// The Merkle allow-list service.
///
/// Implemented by [`LanyardClient`] for the hosted API and by [`MemoryApi`] for
/// offline use.
#[async_trait::async_trait]
pub trait MerkleApi: Send + Sync {
    /// Publishes a tree built from `leaves` and returns its root.
    async fn create_tree(&self, leaves: &LeafSet) -> Result<CreateTreeResponse, ApiError>;

    /// Returns a published tree by root.
    async fn tree(&self, root: B256) -> Result<TreeResponse, ApiError>;

    async fn proof_for_leaf(
        &self,
        root: B256,
        unhashed_leaf: &[u8],
    ) -> Result<ProofResponse, ApiError>;

    /// Looks up a proof by the address a leaf carries.
    async fn proof_for_address(
        &self,
        root: B256,
        address: Address,
    ) -> Result<ProofResponse, ApiError>;

    /// Returns every published root containing a leaf with this proof.
    async fn roots_for_proof(&self, proof: &[B256]) -> Result<RootsResponse, ApiError>;
}
