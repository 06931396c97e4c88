use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_JSON_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credentials for signed uploads to Cloudinary.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub bcrypt_cost: u32,
    pub db_timeout: Duration,
    pub json_limit: usize,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
    pub cloudinary: Option<CloudinaryConfig>,
    /// Reject `/ws` handshakes that carry no `token`.
    pub ws_require_token: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "CLOUDINARY_*",
                    value: "cloud name, api key and api secret must be set together".to_string(),
                })
            }
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty() && o != "*")
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 5000)?,
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiry_days: parse_or("JWT_EXPIRY_DAYS", get("JWT_EXPIRY_DAYS"), 7)?,
            bcrypt_cost: parse_or("BCRYPT_COST", get("BCRYPT_COST"), 10)?,
            db_timeout: Duration::from_secs(parse_or(
                "DB_TIMEOUT_SECS",
                get("DB_TIMEOUT_SECS"),
                5,
            )?),
            json_limit: parse_or("JSON_LIMIT_BYTES", get("JSON_LIMIT_BYTES"), DEFAULT_JSON_LIMIT)?,
            cors_origins,
            cloudinary,
            ws_require_token: parse_or("WS_REQUIRE_TOKEN", get("WS_REQUIRE_TOKEN"), false)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost:27017/chat"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.jwt_expiry_days, 7);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.json_limit, 4 * 1024 * 1024);
        assert!(config.cors_origins.is_empty());
        assert!(config.cloudinary.is_none());
        assert!(!config.ws_require_token);
    }

    #[test]
    fn test_ws_require_token_flag() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost/chat"),
            ("JWT_SECRET", "secret"),
            ("WS_REQUIRE_TOKEN", "true"),
        ]))
        .unwrap();
        assert!(config.ws_require_token);
    }

    #[test]
    fn test_missing_secret() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "mongodb://localhost/chat")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost/chat"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_partial_cloudinary_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost/chat"),
            ("JWT_SECRET", "secret"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_cors_origins_split() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost/chat"),
            ("JWT_SECRET", "secret"),
            ("CORS_ORIGINS", "http://localhost:5173, http://127.0.0.1:5173"),
        ]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "http://127.0.0.1:5173"]
        );
    }
}
