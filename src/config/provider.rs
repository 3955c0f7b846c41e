//! Source of raw setting values.

use serde::de::DeserializeOwned;

use super::{ConfigError, ConfigResult};

/// Read-only lookup of raw values keyed by dotted names such as
/// `instances.poll.ms`.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Typed lookups on top of [`ConfigProvider::get_raw`].
pub trait ConfigProviderExt: ConfigProvider {
    /// Value parsed as JSON, so `10000`, `true` and `"text"` all work.
    fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
    {
        async move {
            self.get_raw(key)
                .await?
                .map(|raw| parse_json(key, &raw))
                .transpose()
        }
    }

    /// Trimmed string value; blank counts as unset.
    fn get_string(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<String>>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self
                .get_raw(key)
                .await?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()))
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}

fn parse_json<T: DeserializeOwned>(key: &str, raw: &str) -> ConfigResult<T> {
    serde_json::from_str(raw.trim()).map_err(|e| ConfigError::invalid(key, e.to_string()))
}
