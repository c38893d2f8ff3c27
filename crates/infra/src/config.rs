//! Process configuration, read from environment variables.
//!
//! | Key | Default | Notes |
//! |-----|---------|-------|
//! | `BIND_ADDR` | `0.0.0.0:5555` | |
//! | `AUTH_MODE` | `session` | `session` or `token` |
//! | `JWT_SECRET` | dev secret | required when `AUTH_MODE=token` |
//! | `TOKEN_TTL_MINUTES` | `60` | |
//! | `SESSION_COOKIE_NAME` | `session_id` | |
//! | `SESSION_TTL_MINUTES` | `1440` | server-side session lifetime |
//! | `USE_PERSISTENT_STORES` | `false` | Postgres instead of in-memory |
//! | `DATABASE_URL` | none | required when persistent |
//! | `SEED_DEMO_DATA` | `false` | |
//! | `MAIL_SERVER` | none | SMTP relay; contact emails are only logged without it |
//! | `MAIL_PORT` | `587` | |
//! | `MAIL_USE_TLS` | `true` | STARTTLS; `false` sends in plain text |
//! | `MAIL_USERNAME` | none | |
//! | `MAIL_PASS` | none | required with `MAIL_USERNAME` |
//! | `MAIL_DEFAULT_SENDER` | `MAIL_USERNAME` | `From:` address |

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "jobportal-dev-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Server-side sessions keyed by an opaque cookie.
    Session,
    /// Stateless HS256 bearer tokens.
    Token,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("{key} is invalid: {message}")]
    Invalid { key: &'static str, message: String },
}

/// SMTP settings for outbound contact emails.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
}

impl core::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MailConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("sender", &self.sender)
            .finish()
    }
}

impl MailConfig {
    fn from_kv(kv: &HashMap<String, String>) -> Result<Option<Self>, ConfigError> {
        let Some(server) = non_empty(kv, "MAIL_SERVER") else {
            return Ok(None);
        };

        let port = match non_empty(kv, "MAIL_PORT") {
            None => 587,
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "MAIL_PORT",
                message: "must be a port number".to_string(),
            })?,
        };
        let use_tls = parse_bool(kv, "MAIL_USE_TLS")?.unwrap_or(true);

        let username = non_empty(kv, "MAIL_USERNAME").map(str::to_string);
        let password = non_empty(kv, "MAIL_PASS").map(str::to_string);
        if username.is_some() && password.is_none() {
            return Err(ConfigError::Missing { key: "MAIL_PASS" });
        }

        let sender = match (non_empty(kv, "MAIL_DEFAULT_SENDER"), &username) {
            (Some(sender), _) => sender.to_string(),
            (None, Some(username)) => username.clone(),
            (None, None) => return Err(ConfigError::Missing { key: "MAIL_DEFAULT_SENDER" }),
        };

        Ok(Some(Self {
            server: server.to_string(),
            port,
            use_tls,
            username,
            password,
            sender,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub auth_mode: AuthMode,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub session_cookie_name: String,
    pub session_ttl_minutes: i64,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub seed_demo_data: bool,
    /// `None` keeps contact emails in the log.
    pub mail: Option<MailConfig>,
}

impl Default for AppConfig {
    /// In-memory, session-mode configuration for tests and local runs.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5555),
            auth_mode: AuthMode::Session,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 60,
            session_cookie_name: "session_id".to_string(),
            session_ttl_minutes: 24 * 60,
            use_persistent_stores: false,
            database_url: None,
            seed_demo_data: false,
            mail: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let kv: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&kv)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match non_empty(kv, "BIND_ADDR") {
            None => defaults.bind_addr,
            Some(v) => v.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: "must be a host:port socket address".to_string(),
            })?,
        };

        let auth_mode = match non_empty(kv, "AUTH_MODE").map(str::to_ascii_lowercase).as_deref() {
            None | Some("session") => AuthMode::Session,
            Some("token") => AuthMode::Token,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "AUTH_MODE",
                    message: format!("expected 'session' or 'token', got '{other}'"),
                });
            }
        };

        let jwt_secret = match (non_empty(kv, "JWT_SECRET"), auth_mode) {
            (Some(secret), _) => secret.to_string(),
            (None, AuthMode::Token) => return Err(ConfigError::Missing { key: "JWT_SECRET" }),
            (None, AuthMode::Session) => {
                warn!("JWT_SECRET not set; using development secret");
                defaults.jwt_secret
            }
        };

        let token_ttl_minutes = positive_minutes(kv, "TOKEN_TTL_MINUTES")?.unwrap_or(defaults.token_ttl_minutes);
        let session_ttl_minutes =
            positive_minutes(kv, "SESSION_TTL_MINUTES")?.unwrap_or(defaults.session_ttl_minutes);

        let session_cookie_name = non_empty(kv, "SESSION_COOKIE_NAME")
            .map(str::to_string)
            .unwrap_or(defaults.session_cookie_name);

        let use_persistent_stores = parse_bool(kv, "USE_PERSISTENT_STORES")?.unwrap_or(false);
        let database_url = non_empty(kv, "DATABASE_URL").map(str::to_string);
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing { key: "DATABASE_URL" });
        }

        let seed_demo_data = parse_bool(kv, "SEED_DEMO_DATA")?.unwrap_or(false);
        let mail = MailConfig::from_kv(kv)?;

        Ok(Self {
            bind_addr,
            auth_mode,
            jwt_secret,
            token_ttl_minutes,
            session_cookie_name,
            session_ttl_minutes,
            use_persistent_stores,
            database_url,
            seed_demo_data,
            mail,
        })
    }
}

fn non_empty<'a>(kv: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    kv.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn positive_minutes(kv: &HashMap<String, String>, key: &'static str) -> Result<Option<i64>, ConfigError> {
    match non_empty(kv, key).map(str::parse::<i64>) {
        None => Ok(None),
        Some(Ok(n)) if n > 0 => Ok(Some(n)),
        Some(_) => Err(ConfigError::Invalid { key, message: "must be a positive integer".to_string() }),
    }
}

fn parse_bool(kv: &HashMap<String, String>, key: &'static str) -> Result<Option<bool>, ConfigError> {
    match non_empty(kv, key).map(str::to_ascii_lowercase).as_deref() {
        None => Ok(None),
        Some("1" | "true" | "yes" | "on") => Ok(Some(true)),
        Some("0" | "false" | "no" | "off") => Ok(Some(false)),
        Some(_) => Err(ConfigError::Invalid { key, message: "must be a boolean".to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_to_empty_environment() {
        let cfg = AppConfig::from_kv(&HashMap::new()).unwrap();
        assert_eq!(cfg.bind_addr.port(), 5555);
        assert_eq!(cfg.auth_mode, AuthMode::Session);
        assert_eq!(cfg.token_ttl_minutes, 60);
        assert_eq!(cfg.session_cookie_name, "session_id");
        assert_eq!(cfg.session_ttl_minutes, 1440);
        assert!(!cfg.use_persistent_stores);
        assert!(!cfg.seed_demo_data);
        assert!(cfg.mail.is_none());
    }

    #[test]
    fn session_ttl_is_configurable() {
        let cfg = AppConfig::from_kv(&kv(&[("SESSION_TTL_MINUTES", "30")])).unwrap();
        assert_eq!(cfg.session_ttl_minutes, 30);
    }

    #[test]
    fn mail_settings_follow_smtp_keys() {
        let cfg = AppConfig::from_kv(&kv(&[
            ("MAIL_SERVER", "smtp.googlemail.com"),
            ("MAIL_USERNAME", "jobs@example.com"),
            ("MAIL_PASS", "app-password"),
        ]))
        .unwrap();
        let mail = cfg.mail.unwrap();
        assert_eq!(mail.server, "smtp.googlemail.com");
        assert_eq!(mail.port, 587);
        assert!(mail.use_tls);
        assert_eq!(mail.sender, "jobs@example.com");
        assert!(!format!("{mail:?}").contains("app-password"));

        let err = AppConfig::from_kv(&kv(&[("MAIL_SERVER", "smtp"), ("MAIL_USERNAME", "jobs@example.com")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "MAIL_PASS" });

        let err = AppConfig::from_kv(&kv(&[("MAIL_SERVER", "smtp")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "MAIL_DEFAULT_SENDER" });

        let cfg = AppConfig::from_kv(&kv(&[
            ("MAIL_SERVER", "localhost"),
            ("MAIL_PORT", "1025"),
            ("MAIL_USE_TLS", "false"),
            ("MAIL_DEFAULT_SENDER", "noreply@example.com"),
        ]))
        .unwrap();
        let mail = cfg.mail.unwrap();
        assert_eq!((mail.port, mail.use_tls, mail.username), (1025, false, None));
    }

    #[test]
    fn token_mode_requires_secret() {
        let err = AppConfig::from_kv(&kv(&[("AUTH_MODE", "token")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "JWT_SECRET" });

        let cfg = AppConfig::from_kv(&kv(&[("AUTH_MODE", "Token"), ("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.auth_mode, AuthMode::Token);
        assert_eq!(cfg.jwt_secret, "s3cret");
    }

    #[test]
    fn persistent_stores_require_database_url() {
        let err = AppConfig::from_kv(&kv(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "DATABASE_URL" });

        let cfg = AppConfig::from_kv(&kv(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/jobportal"),
        ]))
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for pairs in [
            [("AUTH_MODE", "oauth")],
            [("BIND_ADDR", "not-an-addr")],
            [("TOKEN_TTL_MINUTES", "0")],
            [("SESSION_TTL_MINUTES", "-5")],
            [("SEED_DEMO_DATA", "maybe")],
        ] {
            assert!(matches!(AppConfig::from_kv(&kv(&pairs)), Err(ConfigError::Invalid { .. })));
        }
    }
}
