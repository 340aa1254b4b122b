use std::env;
use std::time::Duration;

/// Shortest `JWT_SECRET` either service accepts.
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Longest `JWT_EXPIRES_IN` either service accepts (one year).
pub const MAX_JWT_EXPIRES_IN: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("JWT_SECRET must be at least 16 characters")]
    WeakSecret,
}

/// Fixed-window request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

/// Startup configuration shared by the user service and the todo service.
///
/// Each binary builds one of these once and hands the relevant pieces to its
/// stores, guard and middleware; nothing reads the environment afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub login_rate_limit: RateLimitConfig,
}

impl Config {
    /// Settings for the identity service (`DATABASE_USER_URL`, port 3001).
    pub fn user_service_from_env() -> Result<Self, ConfigError> {
        Self::load("DATABASE_USER_URL", 3001, 50)
    }

    /// Settings for the todo service (`DATABASE_URL`, port 3002).
    pub fn todo_service_from_env() -> Result<Self, ConfigError> {
        Self::load("DATABASE_URL", 3002, 60)
    }

    fn load(
        database_var: &'static str,
        default_port: u16,
        default_rate_limit: u32,
    ) -> Result<Self, ConfigError> {
        let database_url = required(database_var)?;

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let jwt_expires_in = match env::var("JWT_EXPIRES_IN") {
            Ok(raw) => parse_duration(&raw)
                .filter(|lifetime| !lifetime.is_zero() && *lifetime <= MAX_JWT_EXPIRES_IN)
                .ok_or(ConfigError::Invalid {
                    name: "JWT_EXPIRES_IN",
                    value: raw,
                })?,
            Err(_) => Duration::from_secs(900),
        };

        let window_secs: u64 = parsed_or("RATE_LIMIT_WINDOW_SECS", 60)?;
        if window_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_WINDOW_SECS",
                value: window_secs.to_string(),
            });
        }
        let window = Duration::from_secs(window_secs);

        Ok(Self {
            database_url,
            server_port: parsed_or("PORT", default_port)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            jwt_expires_in,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            rate_limit: RateLimitConfig {
                max_requests: parsed_or("RATE_LIMIT_MAX", default_rate_limit)?,
                window,
            },
            login_rate_limit: RateLimitConfig {
                max_requests: parsed_or("LOGIN_RATE_LIMIT_MAX", 5)?,
                window,
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Parses `900`, `900s`, `15m`, `1h` or `1d`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let amount: u64 = digits.parse().ok()?;
    let multiplier = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        _ => return None,
    };
    amount.checked_mul(multiplier).map(Duration::from_secs)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
