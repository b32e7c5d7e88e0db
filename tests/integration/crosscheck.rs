use alloy::primitives::B256;
use lanyard_rs::{
    crosscheck::{CheckError, Scenario, default_scenarios, run_scenario},
    merkle_tree::MerkleTree,
};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path, query_param},
};

use crate::common::{MockLanyard, api_path, init_tracing};

/// Serves the responses an honest API would give for `scenario`, using `root`
/// as the published root.
async fn mount_scenario(mock: &MockLanyard, scenario: &Scenario, root: B256) {
    let leaves = scenario.leaves.unhashed_leaves();
    let local = MerkleTree::new(leaves).unwrap();
    let proof = local.proof(&leaves[0]).unwrap();
    let descriptor = scenario.leaves.leaf_type_descriptor();
    let descriptor = (!descriptor.is_empty()).then_some(descriptor);

    Mock::given(method("POST"))
        .and(path(api_path("/tree")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "merkleRoot": root })))
        .mount(&mock.server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/tree")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "unhashedLeaves": leaves,
            "leafTypeDescriptor": descriptor,
            "packedEncoding": scenario.leaves.packed_encoding(),
            "leafCount": leaves.len(),
        })))
        .mount(&mock.server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/proof")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "unhashedLeaf": leaves[0],
            "proof": proof,
        })))
        .mount(&mock.server)
        .await;

    let joined = proof
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",");
    Mock::given(method("GET"))
        .and(path(api_path("/roots")))
        .and(query_param("proof", joined))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "roots": [root] })))
        .mount(&mock.server)
        .await;
}

#[tokio::test]
async fn test_scenarios_over_http() {
    init_tracing();

    for scenario in default_scenarios().unwrap() {
        let mock = MockLanyard::start().await;
        let root = MerkleTree::new(scenario.leaves.unhashed_leaves())
            .unwrap()
            .root();
        mount_scenario(&mock, &scenario, root).await;

        let report = run_scenario(&mock.client, &scenario).await.unwrap();
        assert_eq!(report.root, root);
        assert_eq!(report.leaf_count, 5);
        assert!(report.checked_address_proof);
        assert_eq!(report.roots_from_proof, vec![root]);
    }
}

#[tokio::test]
async fn test_remote_root_mismatch() {
    let mock = MockLanyard::start().await;
    let scenario = default_scenarios().unwrap().remove(0);
    let local_root = MerkleTree::new(scenario.leaves.unhashed_leaves())
        .unwrap()
        .root();
    let wrong_root = B256::repeat_byte(0xee);
    mount_scenario(&mock, &scenario, wrong_root).await;

    let err = run_scenario(&mock.client, &scenario).await.unwrap_err();
    match err {
        CheckError::RootMismatch { remote, local } => {
            assert_eq!(remote, wrong_root);
            assert_eq!(local, local_root);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_remote_proof_mismatch() {
    let mock = MockLanyard::start().await;
    let scenario = default_scenarios().unwrap().remove(1);
    let root = MerkleTree::new(scenario.leaves.unhashed_leaves())
        .unwrap()
        .root();

    Mock::given(method("POST"))
        .and(path(api_path("/tree")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "merkleRoot": root })))
        .mount(&mock.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/tree")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "unhashedLeaves": scenario.leaves.unhashed_leaves(),
            "leafTypeDescriptor": scenario.leaves.leaf_type_descriptor(),
            "packedEncoding": false,
            "leafCount": 5,
        })))
        .mount(&mock.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/proof")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "proof": [B256::repeat_byte(0x01)],
        })))
        .mount(&mock.server)
        .await;

    let err = run_scenario(&mock.client, &scenario).await.unwrap_err();
    assert!(matches!(err, CheckError::ProofMismatch { .. }));
}

#[tokio::test]
async fn test_missing_tree_surfaces_api_error() {
    let mock = MockLanyard::start().await;
    let scenario = default_scenarios().unwrap().remove(0);
    let root = MerkleTree::new(scenario.leaves.unhashed_leaves())
        .unwrap()
        .root();

    Mock::given(method("POST"))
        .and(path(api_path("/tree")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "merkleRoot": root })))
        .mount(&mock.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/tree")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock.server)
        .await;

    let err = run_scenario(&mock.client, &scenario).await.unwrap_err();
    assert!(matches!(
        err,
        CheckError::Api(lanyard_rs::api::ApiError::NotFound)
    ));
}
