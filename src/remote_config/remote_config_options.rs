use std::time::Duration;

pub struct RemoteConfigOptions {
    pub api_override: String,
    pub namespace: String,
    pub http_timeout_ms: u64,
    pub client_header: String,
}

impl RemoteConfigOptions {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl Default for RemoteConfigOptions {
    fn default() -> Self {
        RemoteConfigOptions {
            api_override: "https://firebaseremoteconfig.googleapis.com".to_string(),
            namespace: "firebase-server".to_string(),
            http_timeout_ms: 120_000,
            client_header: format!("fire-admin-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
