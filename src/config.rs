//! Process configuration from environment variables

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
/// Telegram refuses bot downloads above 20 MiB
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Users allowed to talk to the bot; empty admits everyone
#[derive(Debug, Clone, Default)]
pub struct AllowList(HashSet<i64>);

impl AllowList {
    pub fn permits(&self, user_id: i64) -> bool {
        self.0.is_empty() || self.0.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<i64>().map_err(|e| ConfigError::Invalid {
                    var: "ALLOWED_USER_IDS",
                    value: id.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<HashSet<_>, _>>()
            .map(Self)
    }
}

#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub allowed_users: AllowList,
    pub work_dir: PathBuf,
    pub api_url: String,
    pub poll_timeout: Duration,
    pub max_upload_bytes: u64,
}

// The token is a credential and stays out of logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("allowed_users", &self.allowed_users)
            .field("work_dir", &self.work_dir)
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let allowed_users = match lookup("ALLOWED_USER_IDS") {
            Some(raw) => AllowList::parse(&raw)?,
            None => AllowList::default(),
        };

        let work_dir = lookup("WORK_DIR").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".contact-forge").join("work")
            },
            PathBuf::from,
        );

        let api_url = lookup("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let poll_timeout = Duration::from_secs(number(
            &lookup,
            "POLL_TIMEOUT_SECS",
            DEFAULT_POLL_TIMEOUT_SECS,
        )?);
        let max_upload_bytes = number(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Self {
            token,
            allowed_users,
            work_dir,
            api_url,
            poll_timeout,
            max_upload_bytes,
        })
    }
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        BotConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc"), ("HOME", "/home/bot")]).unwrap();
        assert_eq!(config.work_dir, PathBuf::from("/home/bot/.contact-forge/work"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert!(config.allowed_users.permits(99));
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("BOT_TOKEN"))));
        assert!(matches!(
            load(&[("BOT_TOKEN", "  ")]),
            Err(ConfigError::Missing("BOT_TOKEN"))
        ));
    }

    #[test]
    fn test_allow_list() {
        let config = load(&[("BOT_TOKEN", "t"), ("ALLOWED_USER_IDS", "1, 2,,3")]).unwrap();
        assert_eq!(config.allowed_users.len(), 3);
        assert!(config.allowed_users.permits(2));
        assert!(!config.allowed_users.permits(4));

        let err = load(&[("BOT_TOKEN", "t"), ("ALLOWED_USER_IDS", "1,abc")]).unwrap_err();
        assert!(err.to_string().contains("ALLOWED_USER_IDS"));
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(load(&[("BOT_TOKEN", "t"), ("POLL_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("BOT_TOKEN", "t"), ("MAX_UPLOAD_BYTES", "0")]).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("BOT_TOKEN", "123:secret")]).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
