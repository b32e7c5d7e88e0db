use lanyard_rs::{
    api::LanyardClient,
    config::ClientConfig,
    crosscheck::{default_scenarios, run_all},
};
use tracing::info;

use crate::common::init_tracing;

/// Runs the default scenarios against the hosted API (or `LANYARD_API_URL`).
#[tokio::test]
#[serial_test::serial]
#[ignore]
async fn test_live_api() {
    init_tracing();

    let config = ClientConfig::from_env().unwrap();
    info!("Checking scenarios against {}", config.url);
    let client = LanyardClient::new(config).unwrap();

    let reports = run_all(&client, &default_scenarios().unwrap())
        .await
        .unwrap();
    assert_eq!(reports.len(), 3);
}
