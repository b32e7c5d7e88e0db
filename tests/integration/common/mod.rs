use lanyard_rs::{api::LanyardClient, config::ClientConfig};
use wiremock::MockServer;

pub const API_PREFIX: &str = "/api/v1";

/// A mock Lanyard API and a client pointed at it.
pub struct MockLanyard {
    pub server: MockServer,
    pub client: LanyardClient,
}

impl MockLanyard {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig::with_url(format!("{}{}", server.uri(), API_PREFIX));
        let client = LanyardClient::new(config).unwrap();
        Self { server, client }
    }
}

pub fn api_path(endpoint: &str) -> String {
    format!("{API_PREFIX}{endpoint}")
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}
