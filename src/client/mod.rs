//! HTTP client for the remote authority.

mod error;
pub mod network;
mod traits;

pub use network::NetworkConfig;
pub use traits::RemoteApi;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::Settings;
use crate::config::settings::DEFAULT_BASE_URL;
use crate::types::{BillingSummary, Instance, InstanceId, NewInstance, UserId};
use crate::{Error, Result};

const INSTANCES_ENDPOINT: &str = "/instances";
const BILLING_ENDPOINT: &str = "/billing";

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    session_token: Option<SecretString>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::builder().settings(settings).build()
    }

    /// Client configured from `BOTFLEET_*` environment variables.
    pub async fn from_env() -> Result<Self> {
        let settings = Settings::from_env().await?;
        Self::from_settings(&settings)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /health`; any 2xx counts as healthy.
    pub async fn health(&self) -> Result<()> {
        let url = self.endpoint("health")?;
        self.send(self.request(reqwest::Method::GET, url)).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint path '{}': {}", path, e)))
    }

    fn user_endpoint(&self, path: &str, user_id: UserId) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("user_id", &user_id.to_string());
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.session_token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String> {
        let response = req.send().await.map_err(Error::Transport)?;
        error::read_body(response).await
    }
}

#[async_trait]
impl RemoteApi for Client {
    async fn list_instances(&self, user_id: UserId) -> Result<Vec<Instance>> {
        let url = self.user_endpoint("instances", user_id)?;
        let body = self.send(self.request(reqwest::Method::GET, url)).await?;
        let instances: Vec<Instance> = error::decode(INSTANCES_ENDPOINT, &body)?;
        tracing::debug!(user_id, count = instances.len(), "Listed instances");
        Ok(instances)
    }

    async fn create_instance(&self, request: &NewInstance) -> Result<Instance> {
        let url = self.endpoint("instances")?;
        let body = self
            .send(self.request(reqwest::Method::POST, url).json(request))
            .await?;
        let instance: Instance = error::decode(INSTANCES_ENDPOINT, &body)?;
        tracing::info!(
            instance_id = instance.id,
            user_id = instance.user_id,
            country_code = %instance.country_code,
            "Created instance"
        );
        Ok(instance)
    }

    async fn set_instance_active(&self, id: InstanceId, active: bool) -> Result<()> {
        let action = if active { "activate" } else { "deactivate" };
        let url = self.endpoint(&format!("instances/{}/{}", id, action))?;
        // The body is a plain-text acknowledgement.
        self.send(self.request(reqwest::Method::PATCH, url)).await?;
        tracing::info!(instance_id = id, action, "Instance state changed");
        Ok(())
    }

    async fn billing_summary(&self, user_id: UserId) -> Result<BillingSummary> {
        let url = self.user_endpoint("billing", user_id)?;
        let body = self.send(self.request(reqwest::Method::GET, url)).await?;
        let summary: BillingSummary = error::decode(BILLING_ENDPOINT, &body)?;
        if summary.user_id != user_id {
            return Err(Error::decode(
                BILLING_ENDPOINT,
                format!(
                    "requested user {} but received summary for user {}",
                    user_id, summary.user_id
                ),
            ));
        }
        tracing::debug!(
            user_id,
            records = summary.records.len(),
            total_cents = summary.total_cents,
            "Fetched billing summary"
        );
        Ok(summary)
    }
}

#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    session_token: Option<SecretString>,
    network: Option<NetworkConfig>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Base address of the authority; a path prefix such as `/api` is kept.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    /// Use a preconfigured reqwest client; network settings are ignored.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn settings(mut self, settings: &Settings) -> Self {
        self.base_url = Some(settings.base_url.clone());
        self.session_token = settings.session_token.clone();
        let network = self
            .network
            .take()
            .unwrap_or_default()
            .request_timeout(settings.request_timeout);
        self.network = Some(network);
        self
    }

    pub fn build(self) -> Result<Client> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = parse_base_url(raw)?;

        let http = match self.http {
            Some(http) => http,
            None => self
                .network
                .unwrap_or_default()
                .build_http()
                .map_err(Error::Transport)?,
        };

        Ok(Client {
            http,
            base_url,
            session_token: self.session_token,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid base URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "base URL must be http or https, got '{}'",
            url.scheme()
        )));
    }
    // Relative joins replace the last segment unless the path ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = Client::new("https://fleet.example.com/api").unwrap();
        let url = client.user_endpoint("instances", 7).unwrap();
        assert_eq!(
            url.as_str(),
            "https://fleet.example.com/api/instances?user_id=7"
        );
    }

    #[test]
    fn test_endpoint_default_base() {
        let client = Client::builder().build().unwrap();
        let url = client.endpoint("instances/3/activate").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/instances/3/activate");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Client::new("localhost:3000"),
            Err(Error::Config(_))
        ));
        assert!(matches!(Client::new("not a url"), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = Client::builder()
            .session_token("super-secret-jwt")
            .build()
            .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret-jwt"));
        assert!(debug.contains("[redacted]"));
    }
}
