//! Environment variable settings.
//!
//! Variables are read on every lookup and never written.

use super::provider::ConfigProvider;
use super::settings::keys;
use super::{ConfigError, ConfigResult};

pub const ENV_PREFIX: &str = "BOTFLEET_";

/// Maps `api.base.url` to `BOTFLEET_API_BASE_URL`.
///
/// A key may also have alias variables that are consulted when the
/// prefixed variable is unset; the default provider reads `DEBUG_MODE`
/// for `debug.mode`.
#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    prefix: String,
    aliases: Vec<(String, String)>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::prefixed(ENV_PREFIX).alias(keys::DEBUG_MODE, "DEBUG_MODE")
    }

    /// No aliases; an empty prefix maps keys to bare variable names.
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            aliases: Vec::new(),
        }
    }

    pub fn alias(mut self, key: impl Into<String>, var: impl Into<String>) -> Self {
        self.aliases.push((key.into(), var.into()));
        self
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_uppercase().replace('.', "_"))
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn read_var(name: &str) -> ConfigResult<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::Env(e)),
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        if let Some(value) = read_var(&self.var_name(key))? {
            return Ok(Some(value));
        }
        for (alias_key, var) in &self.aliases {
            if alias_key == key
                && let Some(value) = read_var(var)?
            {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
