use anyhow::{Context, Result};
use std::env;

pub const FAL_KEY_VAR: &str = "FAL_KEY";
pub const DEFAULT_REST_URL: &str = "https://rest.alpha.fal.ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for fal uploads
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential sent to the fal REST API. May be empty; the upload
    /// workflow rejects an empty key before touching the file system.
    pub fal_key: String,
    pub rest_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables and .env file
    ///
    /// # Errors
    ///
    /// Returns an error if an optional variable is set but invalid
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fal_key = Self::resolve_key(&lookup);

        let rest_url = lookup("FAL_REST_URL").unwrap_or_else(|| DEFAULT_REST_URL.to_string());
        Self::validate_rest_url(&rest_url)?;

        let timeout_secs = match lookup("FAL_UPLOAD_TIMEOUT_SECS") {
            Some(raw) => Self::parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            fal_key,
            rest_url: rest_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    /// `FAL_KEY` wins; otherwise `FAL_KEY_ID` and `FAL_KEY_SECRET` are joined
    fn resolve_key<F>(lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(FAL_KEY_VAR).filter(|k| !k.is_empty()) {
            return key;
        }

        match (lookup("FAL_KEY_ID"), lookup("FAL_KEY_SECRET")) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                format!("{}:{}", id, secret)
            }
            _ => String::new(),
        }
    }

    fn validate_rest_url(url: &str) -> Result<()> {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            anyhow::bail!(
                "FAL_REST_URL '{}' must start with http:// or https://",
                url
            );
        }

        Ok(())
    }

    fn parse_timeout(raw: &str) -> Result<u64> {
        let secs: u64 = raw.trim().parse().with_context(|| {
            format!(
                "FAL_UPLOAD_TIMEOUT_SECS '{}' is not a valid number of seconds",
                raw
            )
        })?;

        if secs == 0 {
            anyhow::bail!("FAL_UPLOAD_TIMEOUT_SECS must be greater than 0");
        }

        Ok(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("FAL_KEY", "abc")])).unwrap();

        assert_eq!(config.fal_key, "abc");
        assert_eq!(config.rest_url, DEFAULT_REST_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.fal_key.is_empty());

        let config = Config::from_lookup(lookup_from(&[("FAL_KEY", "")])).unwrap();
        assert!(config.fal_key.is_empty());
    }

    #[test]
    fn test_key_id_and_secret() {
        let config = Config::from_lookup(lookup_from(&[
            ("FAL_KEY_ID", "id"),
            ("FAL_KEY_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.fal_key, "id:secret");

        // FAL_KEY takes precedence
        let config = Config::from_lookup(lookup_from(&[
            ("FAL_KEY", "direct"),
            ("FAL_KEY_ID", "id"),
            ("FAL_KEY_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.fal_key, "direct");

        // Half a pair is not a credential
        let config = Config::from_lookup(lookup_from(&[("FAL_KEY_ID", "id")])).unwrap();
        assert!(config.fal_key.is_empty());
    }

    #[test]
    fn test_rest_url_validation() {
        let config = Config::from_lookup(lookup_from(&[
            ("FAL_KEY", "k"),
            ("FAL_REST_URL", "http://localhost:8080/"),
        ]))
        .unwrap();
        assert_eq!(config.rest_url, "http://localhost:8080");

        assert!(Config::from_lookup(lookup_from(&[("FAL_REST_URL", "ftp://x")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FAL_REST_URL", "")])).is_err());
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(Config::parse_timeout("30").unwrap(), 30);
        assert_eq!(Config::parse_timeout(" 5 ").unwrap(), 5);

        assert!(Config::parse_timeout("0").is_err());
        assert!(Config::parse_timeout("-1").is_err());
        assert!(Config::parse_timeout("soon").is_err());
    }
}
