#![allow(dead_code)]

use std::time::Duration;

use backon::ExponentialBuilder;
use tenantctl::remote::{ClientConfig, RemoteClient};
use tenantctl::session::Session;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const SITE: &str = "contoso";

/// Near-zero backoff so retry tests run fast.
pub fn fast_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
        .with_max_times(3)
}

pub fn client(server: &MockServer) -> RemoteClient {
    let config = ClientConfig::new()
        .with_api_base(server.uri())
        .with_token(TOKEN);
    RemoteClient::new(config).unwrap().with_backoff(fast_backoff())
}

pub fn session(server: &MockServer) -> Session {
    Session::new(client(server), Some(SITE.to_string()))
}

/// `/sites/{SITE}/termStores/{store}` + `rest`.
pub fn store_path(store: &str, rest: &str) -> String {
    format!("/sites/{SITE}/termStores/{store}{rest}")
}
