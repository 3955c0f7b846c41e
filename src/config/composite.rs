//! Layered provider: the first layer holding a key supplies its value.

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Default)]
pub struct CompositeConfigProvider {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Box<dyn ConfigProvider>>) -> Self {
        Self { layers }
    }

    /// Append a layer below the existing ones.
    pub fn layer(mut self, layer: impl ConfigProvider + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Value of `key` together with the name of the layer it came from.
    pub async fn resolve(&self, key: &str) -> ConfigResult<Option<(String, &str)>> {
        for layer in &self.layers {
            if let Some(value) = layer.get_raw(key).await? {
                return Ok(Some((value, layer.name())));
            }
        }
        Ok(None)
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let resolved = self.resolve(key).await?;
        if let Some((_, layer)) = &resolved {
            tracing::trace!(key, layer = *layer, "Setting resolved");
        }
        Ok(resolved.map(|(value, _)| value))
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("layers", &self.layer_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryConfigProvider;

    #[tokio::test]
    async fn test_first_layer_wins() {
        let composite = CompositeConfigProvider::new()
            .layer(MemoryConfigProvider::new().value("billing.poll.ms", "1000"))
            .layer(
                MemoryConfigProvider::new()
                    .value("billing.poll.ms", "9000")
                    .value("instances.poll.ms", "500"),
            );

        assert_eq!(
            composite.get_raw("billing.poll.ms").await.unwrap(),
            Some("1000".into())
        );
        assert_eq!(
            composite.get_raw("instances.poll.ms").await.unwrap(),
            Some("500".into())
        );
        assert_eq!(composite.get_raw("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_reports_layer() {
        let composite = CompositeConfigProvider::new()
            .layer(MemoryConfigProvider::new().value("debug.mode", "true"));
        let (value, layer) = composite.resolve("debug.mode").await.unwrap().unwrap();
        assert_eq!(value, "true");
        assert_eq!(layer, "memory");
    }
}
