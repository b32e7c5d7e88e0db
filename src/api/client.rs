use alloy::primitives::{Address, B256};
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    api::{
        ApiError, MerkleApi,
        types::{
            CreateTreeRequest, CreateTreeResponse, ProofResponse, RootResponse, RootsResponse,
            TreeResponse,
        },
    },
    config::ClientConfig,
    leaf::LeafSet,
};

/// HTTP client for the hosted Lanyard API.
///
/// Any tree published through this client is public: other consumers of the API
/// can look it up by root.
#[derive(Clone, Debug)]
pub struct LanyardClient {
    client: Client,
    url: String,
}

impl LanyardClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self::with_client(client, config.url))
    }

    /// Uses a caller-provided `reqwest::Client` as is.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        LanyardClient {
            client,
            url: url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Creates a plain address tree.
    pub async fn create_address_tree(
        &self,
        addresses: impl IntoIterator<Item = Address>,
    ) -> Result<CreateTreeResponse, ApiError> {
        self.create_tree(&LeafSet::addresses(addresses)).await
    }

    /// Deprecated single-root lookup. Different trees can share a proof, in
    /// which case only one of their roots is returned.
    #[deprecated(note = "use `roots_for_proof`")]
    pub async fn root_for_proof(&self, proof: &[B256]) -> Result<RootResponse, ApiError> {
        if proof.is_empty() {
            return Err(ApiError::EmptyProof);
        }

        self.get(&format!("/root?proof={}", join_hex(proof))).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_request::<(), T>(Method::GET, path, None).await
    }

    async fn send_request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.url, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // 404s are expected when a root was never published
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_else(|e| e.to_string());
            return Err(ApiError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MerkleApi for LanyardClient {
    async fn create_tree(&self, leaves: &LeafSet) -> Result<CreateTreeResponse, ApiError> {
        let request = CreateTreeRequest::from(leaves);
        let response: CreateTreeResponse = self
            .send_request(Method::POST, "/tree", Some(&request))
            .await?;

        info!(
            "Created tree with {} leaves: {}",
            request.unhashed_leaves.len(),
            response.merkle_root
        );
        Ok(response)
    }

    async fn tree(&self, root: B256) -> Result<TreeResponse, ApiError> {
        self.get(&format!("/tree?root={}", to_hex(root))).await
    }

    async fn proof_for_leaf(
        &self,
        root: B256,
        unhashed_leaf: &[u8],
    ) -> Result<ProofResponse, ApiError> {
        self.get(&format!(
            "/proof?root={}&unhashedLeaf={}",
            to_hex(root),
            to_hex(unhashed_leaf)
        ))
        .await
    }

    async fn proof_for_address(
        &self,
        root: B256,
        address: Address,
    ) -> Result<ProofResponse, ApiError> {
        self.get(&format!(
            "/proof?root={}&address={}",
            to_hex(root),
            to_hex(address)
        ))
        .await
    }

    async fn roots_for_proof(&self, proof: &[B256]) -> Result<RootsResponse, ApiError> {
        if proof.is_empty() {
            return Err(ApiError::EmptyProof);
        }

        self.get(&format!("/roots?proof={}", join_hex(proof))).await
    }
}

fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn join_hex(proof: &[B256]) -> String {
    proof.iter().map(to_hex).collect::<Vec<_>>().join(",")
}
