//! Bot instance records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{InstanceId, UnixSeconds, UserId};

/// A provisioned bot instance as reported by the remote authority.
///
/// Identity fields never change; `active` is the only mutable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub user_id: UserId,
    /// ISO 3166-1 alpha-2 code.
    pub country_code: String,
    pub phone_number: String,
    #[serde(
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub active: bool,
    pub created_at: UnixSeconds,
}

/// Body of `POST /instances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstance {
    pub user_id: UserId,
    pub country_code: String,
    pub phone_number: String,
}

impl NewInstance {
    /// Build a creation request. The country code is trimmed and upper-cased.
    pub fn new(
        user_id: UserId,
        country_code: impl AsRef<str>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            country_code: country_code.as_ref().trim().to_uppercase(),
            phone_number: phone_number.into(),
        }
    }
}

// The authority stores the flag as an integer column.
fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "active flag must be 0 or 1, got {}",
            other
        ))),
    }
}
