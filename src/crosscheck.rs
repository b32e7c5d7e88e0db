//! Cross-checks a [`MerkleApi`] against the local [`MerkleTree`].
//!
//! Each scenario publishes a leaf set, then checks that the root, leaf count,
//! proofs, and reverse root lookup served by the API all agree with a tree
//! built locally from the same leaves.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{B256, U256},
};
use thiserror::Error;
use tracing::info;

use crate::{
    api::{ApiError, MerkleApi},
    leaf::{LeafEncoding, LeafError, LeafSet, num_to_address},
    merkle_tree::{MerkleTree, MerkleTreeError},
};

pub const TYPED_DESCRIPTOR: [&str; 3] = ["address", "uint256", "uint256"];

/// 0.01 ether in wei
const TYPED_PRICE: u64 = 10_000_000_000_000_000;
const TYPED_QUANTITY: u64 = 2;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Remote root {remote} does not match local root {local}")]
    RootMismatch { remote: B256, local: B256 },
    #[error("Remote proof {remote:?} does not match local proof {local:?}")]
    ProofMismatch { remote: Vec<B256>, local: Vec<B256> },
    #[error("Remote leaf count {remote} does not match local leaf count {local}")]
    LeafCountMismatch { remote: usize, local: usize },
    #[error("Root {root} missing from roots {roots:?} for proof")]
    RootNotListed { root: B256, roots: Vec<B256> },
    #[error("Local proof does not verify against local root {0}")]
    LocalProofInvalid(B256),
    #[error("Scenario {0} has no leaves")]
    EmptyScenario(String),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Merkle tree error: {0}")]
    MerkleTree(#[from] MerkleTreeError),
    #[error("Leaf error: {0}")]
    Leaf(#[from] LeafError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub leaves: LeafSet,
}

impl Scenario {
    pub fn new(name: impl Into<String>, leaves: LeafSet) -> Self {
        Self {
            name: name.into(),
            leaves,
        }
    }
}

/// What a successful scenario observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    pub root: B256,
    pub leaf_count: usize,
    pub proof: Vec<B256>,
    pub checked_address_proof: bool,
    pub roots_from_proof: Vec<B256>,
}

pub fn check_root_equality(remote: B256, local: B256) -> Result<(), CheckError> {
    if remote != local {
        return Err(CheckError::RootMismatch { remote, local });
    }
    Ok(())
}

pub fn check_proof_equality(remote: &[B256], local: &[B256]) -> Result<(), CheckError> {
    if remote != local {
        return Err(CheckError::ProofMismatch {
            remote: remote.to_vec(),
            local: local.to_vec(),
        });
    }
    Ok(())
}

/// The basic, ABI-encoded, and packed-encoded allow lists: five addresses, then
/// `(address, quantity, price)` rows for the same five addresses.
pub fn default_scenarios() -> Result<Vec<Scenario>, LeafError> {
    let addresses: Vec<_> = (1..=5).map(num_to_address).collect();

    let rows: Vec<Vec<DynSolValue>> = addresses
        .iter()
        .map(|address| {
            vec![
                DynSolValue::Address(*address),
                DynSolValue::Uint(U256::from(TYPED_QUANTITY), 256),
                DynSolValue::Uint(U256::from(TYPED_PRICE), 256),
            ]
        })
        .collect();

    Ok(vec![
        Scenario::new("basic", LeafSet::addresses(addresses)),
        Scenario::new(
            "encoded",
            LeafSet::typed(&TYPED_DESCRIPTOR, &rows, LeafEncoding::Abi)?,
        ),
        Scenario::new(
            "encoded packed",
            LeafSet::typed(&TYPED_DESCRIPTOR, &rows, LeafEncoding::Packed)?,
        ),
    ])
}

pub async fn run_scenario<A: MerkleApi + ?Sized>(
    api: &A,
    scenario: &Scenario,
) -> Result<ScenarioReport, CheckError> {
    let leaves = &scenario.leaves;
    let Some(first_leaf) = leaves.unhashed_leaves().first() else {
        return Err(CheckError::EmptyScenario(scenario.name.clone()));
    };

    let local = MerkleTree::new(leaves.unhashed_leaves())?;

    let root = api.create_tree(leaves).await?.merkle_root;
    info!("{} merkle root {}", scenario.name, root);
    check_root_equality(root, local.root())?;

    let tree = api.tree(root).await?;
    info!("{} leaf count {}", scenario.name, tree.leaf_count);
    if tree.leaf_count != local.leaf_count() {
        return Err(CheckError::LeafCountMismatch {
            remote: tree.leaf_count,
            local: local.leaf_count(),
        });
    }

    let local_proof = local.proof(first_leaf)?;
    if !MerkleTree::verify(local.root(), &local_proof, first_leaf) {
        return Err(CheckError::LocalProofInvalid(local.root()));
    }

    let proof = api.proof_for_leaf(root, first_leaf).await?.proof;
    info!("{} proof {:?}", scenario.name, proof);
    check_proof_equality(&proof, &local_proof)?;

    let mut checked_address_proof = false;
    if let Some(address) = leaves.address_at(0) {
        let by_address = api.proof_for_address(root, address).await?.proof;
        info!("{} proof by indexed address {:?}", scenario.name, by_address);
        check_proof_equality(&by_address, &local_proof)?;
        checked_address_proof = true;
    }

    // A single-leaf tree has an empty proof, which cannot be looked up.
    let roots_from_proof = if proof.is_empty() {
        Vec::new()
    } else {
        let roots = api.roots_for_proof(&proof).await?.roots;
        info!("{} roots from proof {:?}", scenario.name, roots);
        if !roots.contains(&root) {
            return Err(CheckError::RootNotListed { root, roots });
        }
        roots
    };

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        root,
        leaf_count: tree.leaf_count,
        proof,
        checked_address_proof,
        roots_from_proof,
    })
}

/// Runs `scenarios` in order, stopping at the first failure.
pub async fn run_all<A: MerkleApi + ?Sized>(
    api: &A,
    scenarios: &[Scenario],
) -> Result<Vec<ScenarioReport>, CheckError> {
    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        reports.push(run_scenario(api, scenario).await?);
    }
    Ok(reports)
}
