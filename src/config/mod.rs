use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://calendar_events.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "https://sacandaga.fly.dev";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Wire name used for the event colour field.
///
/// Older clients send `background_color`, newer ones `backgroundColor`; the
/// deployment picks one and both directions of the API honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    #[default]
    Camel,
    Snake,
}

impl FieldNaming {
    pub fn background_color(self) -> &'static str {
        match self {
            FieldNaming::Camel => "backgroundColor",
            FieldNaming::Snake => "background_color",
        }
    }
}

impl FromStr for FieldNaming {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camel" | "camelcase" => Ok(FieldNaming::Camel),
            "snake" | "snake_case" => Ok(FieldNaming::Snake),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FieldNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldNaming::Camel => f.write_str("camel"),
            FieldNaming::Snake => f.write_str("snake"),
        }
    }
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub production: bool,
    pub allowed_origins: Vec<String>,
    pub api_token: Option<String>,
    pub database_url: String,
    pub max_connections: u32,
    pub field_naming: FieldNaming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            production: false,
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            api_token: None,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            field_naming: FieldNaming::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;

        let production = lookup("RUST_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| split_origins(&v))
            .unwrap_or(defaults.allowed_origins);

        // Compared verbatim against request headers, so never trimmed.
        let api_token = lookup("API_TOKEN").filter(|v| !v.trim().is_empty());

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.database_url);

        let field_naming = match lookup("FIELD_NAMING") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "FIELD_NAMING",
                value: raw,
            })?,
            None => defaults.field_naming,
        };

        Ok(Self {
            port,
            production,
            allowed_origins,
            api_token,
            database_url,
            max_connections,
            field_naming,
        })
    }

    /// The bearer gate only runs in production with a token configured.
    pub fn auth_enabled(&self) -> bool {
        self.production && self.api_token.is_some()
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert!(!config.production);
        assert_eq!(config.allowed_origins, vec!["https://sacandaga.fly.dev"]);
        assert_eq!(config.api_token, None);
        assert_eq!(config.database_url, "sqlite://calendar_events.db");
        assert_eq!(config.field_naming, FieldNaming::Camel);
        assert!(!config.auth_enabled());
    }

    #[test]
    fn test_reads_all_values() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("RUST_ENV", "Production"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("API_TOKEN", "s3cret"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("FIELD_NAMING", "snake"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.production);
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.api_token.as_deref(), Some("s3cret"));
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.field_naming, FieldNaming::Snake);
        assert!(config.auth_enabled());
    }

    #[test]
    fn test_auth_disabled_outside_production_or_without_token() {
        let dev = config_from(&[("API_TOKEN", "s3cret")]).unwrap();
        assert!(!dev.auth_enabled());

        let blank_token = config_from(&[("RUST_ENV", "production"), ("API_TOKEN", "  ")]).unwrap();
        assert_eq!(blank_token.api_token, None);
        assert!(!blank_token.auth_enabled());
    }

    #[test]
    fn test_api_token_kept_verbatim() {
        let config = config_from(&[("RUST_ENV", "production"), ("API_TOKEN", " s3cret ")]).unwrap();
        assert_eq!(config.api_token.as_deref(), Some(" s3cret "));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::InvalidValue {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
        assert!(config_from(&[("FIELD_NAMING", "kebab")]).is_err());
    }

    #[test]
    fn test_field_naming_keys() {
        assert_eq!(FieldNaming::Camel.background_color(), "backgroundColor");
        assert_eq!(FieldNaming::Snake.background_color(), "background_color");
        assert_eq!("CamelCase".parse::<FieldNaming>(), Ok(FieldNaming::Camel));
    }
}
