//! Process-wide configuration.
//!
//! The only global state of the crate: which key column an insert/merge
//! reports back, and how much SQL the `tracing` events print. Both are
//! atomics, so reading them from concurrent compilations is lock-free.

use crate::db_field::DbField;
use crate::error::{StmtError, StmtResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Which column an insert or merge reports as its generated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum KeyColumnReturnBehavior {
    /// Always the primary column.
    Primary = 1,
    /// Always the identity column.
    Identity = 2,
    /// The primary column, falling back to the identity column.
    PrimaryOrElseIdentity = 3,
    /// The identity column, falling back to the primary column.
    #[default]
    IdentityOrElsePrimary = 4,
}

impl KeyColumnReturnBehavior {
    /// Pick the reported key column out of the declared primary and identity.
    pub fn resolve<'a>(
        self,
        primary: Option<&'a DbField>,
        identity: Option<&'a DbField>,
    ) -> Option<&'a DbField> {
        match self {
            KeyColumnReturnBehavior::Primary => primary,
            KeyColumnReturnBehavior::Identity => identity,
            KeyColumnReturnBehavior::PrimaryOrElseIdentity => primary.or(identity),
            KeyColumnReturnBehavior::IdentityOrElsePrimary => identity.or(primary),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            KeyColumnReturnBehavior::Primary => "primary",
            KeyColumnReturnBehavior::Identity => "identity",
            KeyColumnReturnBehavior::PrimaryOrElseIdentity => "primary_or_else_identity",
            KeyColumnReturnBehavior::IdentityOrElsePrimary => "identity_or_else_primary",
        }
    }
}

impl TryFrom<u8> for KeyColumnReturnBehavior {
    type Error = StmtError;

    fn try_from(value: u8) -> StmtResult<Self> {
        match value {
            1 => Ok(KeyColumnReturnBehavior::Primary),
            2 => Ok(KeyColumnReturnBehavior::Identity),
            3 => Ok(KeyColumnReturnBehavior::PrimaryOrElseIdentity),
            4 => Ok(KeyColumnReturnBehavior::IdentityOrElsePrimary),
            other => Err(StmtError::configuration(format!(
                "key column return behavior {other} is not handled"
            ))),
        }
    }
}

impl FromStr for KeyColumnReturnBehavior {
    type Err = StmtError;

    /// Accepts snake_case or PascalCase names.
    fn from_str(s: &str) -> StmtResult<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "primary" => Ok(KeyColumnReturnBehavior::Primary),
            "identity" => Ok(KeyColumnReturnBehavior::Identity),
            "primaryorelseidentity" => Ok(KeyColumnReturnBehavior::PrimaryOrElseIdentity),
            "identityorelseprimary" => Ok(KeyColumnReturnBehavior::IdentityOrElsePrimary),
            _ => Err(StmtError::configuration(format!(
                "key column return behavior '{s}' is not handled"
            ))),
        }
    }
}

impl TryFrom<String> for KeyColumnReturnBehavior {
    type Error = StmtError;

    fn try_from(s: String) -> StmtResult<Self> {
        s.parse()
    }
}

impl From<KeyColumnReturnBehavior> for String {
    fn from(value: KeyColumnReturnBehavior) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for KeyColumnReturnBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_MAX_TRACED_SQL_LENGTH: usize = 200;

static KEY_COLUMN_RETURN_BEHAVIOR: AtomicU8 =
    AtomicU8::new(KeyColumnReturnBehavior::IdentityOrElsePrimary as u8);
static MAX_TRACED_SQL_LENGTH: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_TRACED_SQL_LENGTH);

/// Options accepted by [`GlobalConfiguration::setup`].
///
/// Deserializable from TOML:
///
/// ```toml
/// key_column_return_behavior = "primary_or_else_identity"
/// max_traced_sql_length = 500   # 0 disables truncation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfigurationOptions {
    pub key_column_return_behavior: KeyColumnReturnBehavior,
    pub max_traced_sql_length: usize,
}

impl Default for GlobalConfigurationOptions {
    fn default() -> Self {
        Self {
            key_column_return_behavior: KeyColumnReturnBehavior::default(),
            max_traced_sql_length: DEFAULT_MAX_TRACED_SQL_LENGTH,
        }
    }
}

impl GlobalConfigurationOptions {
    /// Parse options from a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> StmtResult<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Accessors for the process-wide options.
pub struct GlobalConfiguration;

impl GlobalConfiguration {
    /// Replace the process-wide options.
    pub fn setup(options: GlobalConfigurationOptions) {
        KEY_COLUMN_RETURN_BEHAVIOR.store(options.key_column_return_behavior as u8, Ordering::Relaxed);
        MAX_TRACED_SQL_LENGTH.store(options.max_traced_sql_length, Ordering::Relaxed);
    }

    /// Restore the defaults.
    pub fn reset() {
        Self::setup(GlobalConfigurationOptions::default());
    }

    /// The current options.
    pub fn options() -> StmtResult<GlobalConfigurationOptions> {
        Ok(GlobalConfigurationOptions {
            key_column_return_behavior: Self::key_column_return_behavior()?,
            max_traced_sql_length: MAX_TRACED_SQL_LENGTH.load(Ordering::Relaxed),
        })
    }

    /// The current key-return policy.
    pub fn key_column_return_behavior() -> StmtResult<KeyColumnReturnBehavior> {
        KeyColumnReturnBehavior::try_from(KEY_COLUMN_RETURN_BEHAVIOR.load(Ordering::Relaxed))
    }

    /// SQL longer than this is truncated in trace events; `None` disables truncation.
    pub fn max_traced_sql_length() -> Option<usize> {
        match MAX_TRACED_SQL_LENGTH.load(Ordering::Relaxed) {
            0 => None,
            n => Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_follows_policy() {
        let primary = DbField::primary("Code");
        let identity = DbField::identity("Id");
        let name = |f: Option<&DbField>| f.map(|f| f.name.clone());

        assert_eq!(name(KeyColumnReturnBehavior::Primary.resolve(Some(&primary), Some(&identity))), Some("Code".into()));
        assert_eq!(name(KeyColumnReturnBehavior::Identity.resolve(Some(&primary), None)), None);
        assert_eq!(name(KeyColumnReturnBehavior::PrimaryOrElseIdentity.resolve(None, Some(&identity))), Some("Id".into()));
        assert_eq!(
            name(KeyColumnReturnBehavior::IdentityOrElsePrimary.resolve(Some(&primary), Some(&identity))),
            Some("Id".into())
        );
        assert_eq!(name(KeyColumnReturnBehavior::IdentityOrElsePrimary.resolve(Some(&primary), None)), Some("Code".into()));
    }

    #[test]
    fn unknown_raw_value_is_configuration_error() {
        assert!(KeyColumnReturnBehavior::try_from(0).unwrap_err().is_configuration());
        assert!(KeyColumnReturnBehavior::try_from(9).unwrap_err().is_configuration());
        assert_eq!(KeyColumnReturnBehavior::try_from(3).unwrap(), KeyColumnReturnBehavior::PrimaryOrElseIdentity);
    }

    #[test]
    fn parse_names() {
        assert_eq!("PrimaryOrElseIdentity".parse::<KeyColumnReturnBehavior>().unwrap(), KeyColumnReturnBehavior::PrimaryOrElseIdentity);
        assert_eq!("identity".parse::<KeyColumnReturnBehavior>().unwrap(), KeyColumnReturnBehavior::Identity);
        assert!("whatever".parse::<KeyColumnReturnBehavior>().unwrap_err().is_configuration());
    }

    #[test]
    fn options_from_toml() {
        let options = GlobalConfigurationOptions::from_toml_str("key_column_return_behavior = \"primary\"").unwrap();
        assert_eq!(options.key_column_return_behavior, KeyColumnReturnBehavior::Primary);
        assert_eq!(options.max_traced_sql_length, DEFAULT_MAX_TRACED_SQL_LENGTH);

        let err = GlobalConfigurationOptions::from_toml_str("key_column_return_behavior = \"first\"").unwrap_err();
        assert!(err.is_configuration());
    }
}
