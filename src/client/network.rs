//! Transport settings for the HTTP client.
//!
//! Proxies come from the standard `HTTPS_PROXY` / `HTTP_PROXY` variables,
//! which reqwest reads on its own.

use std::time::Duration;

use crate::config::settings::DEFAULT_REQUEST_TIMEOUT;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
// Two pollers and the occasional mutation share one host.
const DEFAULT_MAX_IDLE_PER_HOST: usize = 4;

#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// Whole-request timeout; expiry surfaces as a transport error.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            user_agent: concat!("botfleet/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build_http(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .user_agent(self.user_agent.as_str())
            .build()
    }
}
