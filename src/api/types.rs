//! Lanyard API wire types.

use alloy::primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};

use crate::leaf::LeafSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreeRequest {
    pub unhashed_leaves: Vec<Bytes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leaf_type_descriptor: Vec<String>,
    pub packed_encoding: bool,
}

impl From<&LeafSet> for CreateTreeRequest {
    fn from(leaves: &LeafSet) -> Self {
        Self {
            unhashed_leaves: leaves.unhashed_leaves().to_vec(),
            leaf_type_descriptor: leaves.leaf_type_descriptor().to_vec(),
            packed_encoding: leaves.packed_encoding(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreeResponse {
    pub merkle_root: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub unhashed_leaves: Vec<Bytes>,
    /// `null` for plain address trees.
    #[serde(default)]
    pub leaf_type_descriptor: Option<Vec<String>>,
    pub packed_encoding: bool,
    pub leaf_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponse {
    #[serde(default)]
    pub unhashed_leaf: Option<Bytes>,
    pub proof: Vec<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootsResponse {
    pub roots: Vec<B256>,
}

/// Response of the deprecated single-root lookup. Small trees often share
/// proofs, so a proof can map to more than one root; prefer [`RootsResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    pub root: B256,
    #[serde(default)]
    pub note: String,
}
