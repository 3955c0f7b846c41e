//! Pluggable configuration provider system.
//!
//! ```rust,no_run
//! use botfleet::config::{ConfigBuilder, Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfigBuilder::new().env().build();
//! let settings = Settings::load(&provider).await?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use env::{ENV_PREFIX, EnvConfigProvider};
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::Settings;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Every invalid key found while loading settings.
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "Invalid settings: {}", msgs.join("; "))
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Stacks configuration layers; layers added first take priority.
#[derive(Default)]
pub struct ConfigBuilder {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `BOTFLEET_*` environment variables.
    pub fn env(self) -> Self {
        self.layer(EnvConfigProvider::new())
    }

    pub fn env_with_prefix(self, prefix: &str) -> Self {
        self.layer(EnvConfigProvider::prefixed(prefix))
    }

    /// Programmatic overrides, typically placed before [`env`](Self::env).
    pub fn overrides(self, values: MemoryConfigProvider) -> Self {
        self.layer(values)
    }

    pub fn layer(mut self, layer: impl ConfigProvider + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn build(self) -> CompositeConfigProvider {
        CompositeConfigProvider::from_layers(self.layers)
    }
}
