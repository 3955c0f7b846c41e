//! Typed runtime settings.

use std::time::Duration;

use secrecy::SecretString;

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigBuilder, ConfigError, ConfigResult, ValidationErrors};
use crate::billing::{PricingPlan, PricingPlanBuilder};
use crate::observability::LogFormat;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_INSTANCES_POLL_INTERVAL: Duration = Duration::from_millis(10_000);
pub const DEFAULT_BILLING_POLL_INTERVAL: Duration = Duration::from_millis(15_000);

pub mod keys {
    pub const BASE_URL: &str = "api.base.url";
    pub const SESSION_TOKEN: &str = "session.token";
    pub const REQUEST_TIMEOUT_SECS: &str = "request.timeout.secs";
    pub const INSTANCES_POLL_MS: &str = "instances.poll.ms";
    pub const BILLING_POLL_MS: &str = "billing.poll.ms";
    pub const HOURLY_RATE_CENTS: &str = "pricing.hourly.rate.cents";
    pub const PROMO_DISCOUNT_PERCENT: &str = "pricing.promo.discount.percent";
    pub const PROMO_DURATION_SECS: &str = "pricing.promo.duration.secs";
    pub const DEBUG_MODE: &str = "debug.mode";
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub session_token: Option<SecretString>,
    pub request_timeout: Duration,
    pub instances_poll_interval: Duration,
    pub billing_poll_interval: Duration,
    pub pricing: PricingPlan,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            instances_poll_interval: DEFAULT_INSTANCES_POLL_INTERVAL,
            billing_poll_interval: DEFAULT_BILLING_POLL_INTERVAL,
            pricing: PricingPlan::default(),
            log_format: LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Settings from `BOTFLEET_*` environment variables over defaults.
    pub async fn from_env() -> ConfigResult<Self> {
        Self::load(&ConfigBuilder::new().env().build()).await
    }

    /// Resolve every key against `provider`, falling back to defaults, and
    /// validate the result. All invalid keys are reported together.
    pub async fn load<P: ConfigProvider + ?Sized>(provider: &P) -> ConfigResult<Self> {
        let defaults = Self::default();
        let mut errors = Vec::new();

        let base_url = provider
            .get_string(keys::BASE_URL)
            .await?
            .unwrap_or(defaults.base_url);
        if let Err(message) = validate_base_url(&base_url) {
            errors.push(ConfigError::invalid(keys::BASE_URL, message));
        }

        let session_token = provider
            .get_string(keys::SESSION_TOKEN)
            .await?
            .map(SecretString::from);

        let request_timeout = positive(provider, keys::REQUEST_TIMEOUT_SECS, &mut errors)
            .await?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let instances_poll_interval = positive(provider, keys::INSTANCES_POLL_MS, &mut errors)
            .await?
            .map(Duration::from_millis)
            .unwrap_or(defaults.instances_poll_interval);
        let billing_poll_interval = positive(provider, keys::BILLING_POLL_MS, &mut errors)
            .await?
            .map(Duration::from_millis)
            .unwrap_or(defaults.billing_poll_interval);

        let mut pricing = PricingPlanBuilder::new();
        if let Some(rate) = typed::<u32, _>(provider, keys::HOURLY_RATE_CENTS, &mut errors).await? {
            pricing = pricing.hourly_rate_cents(rate);
        }
        if let Some(percent) =
            typed::<u8, _>(provider, keys::PROMO_DISCOUNT_PERCENT, &mut errors).await?
        {
            if percent > 100 {
                errors.push(ConfigError::invalid(
                    keys::PROMO_DISCOUNT_PERCENT,
                    "must be between 0 and 100",
                ));
            }
            pricing = pricing.promo_discount_percent(percent);
        }
        if let Some(secs) =
            typed::<i64, _>(provider, keys::PROMO_DURATION_SECS, &mut errors).await?
        {
            if secs < 0 {
                errors.push(ConfigError::invalid(
                    keys::PROMO_DURATION_SECS,
                    "must not be negative",
                ));
            }
            pricing = pricing.promo_duration_secs(secs);
        }

        let debug = typed::<bool, _>(provider, keys::DEBUG_MODE, &mut errors)
            .await?
            .unwrap_or(false);

        if !errors.is_empty() {
            return Err(ConfigError::ValidationErrors(ValidationErrors(errors)));
        }

        Ok(Self {
            base_url,
            session_token,
            request_timeout,
            instances_poll_interval,
            billing_poll_interval,
            pricing: pricing.build(),
            log_format: if debug {
                LogFormat::Tagged
            } else {
                LogFormat::Compact
            },
        })
    }
}

fn validate_base_url(raw: &str) -> std::result::Result<(), String> {
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

/// Parse failures are collected into `errors`; provider failures propagate.
async fn typed<T, P>(
    provider: &P,
    key: &str,
    errors: &mut Vec<ConfigError>,
) -> ConfigResult<Option<T>>
where
    T: serde::de::DeserializeOwned + Send,
    P: ConfigProvider + ?Sized,
{
    match provider.get::<T>(key).await {
        Ok(value) => Ok(value),
        Err(e @ ConfigError::InvalidValue { .. }) => {
            errors.push(e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn positive<P: ConfigProvider + ?Sized>(
    provider: &P,
    key: &str,
    errors: &mut Vec<ConfigError>,
) -> ConfigResult<Option<u64>> {
    let value = typed::<u64, _>(provider, key, errors).await?;
    if value == Some(0) {
        errors.push(ConfigError::invalid(key, "must be greater than zero"));
        return Ok(None);
    }
    Ok(value)
}
