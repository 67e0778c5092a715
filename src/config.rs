use std::net::IpAddr;

use chrono::Duration;

use crate::reset::ResetPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub app_name: String,
    pub log_level: String,
    pub forgot_password: ForgotPasswordConfig,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct ForgotPasswordConfig {
    /// Base route, e.g. `/forgot-password`. The REST adapter prefixes `/rest`.
    pub route: String,
    /// Mount the JSON adapter instead of the HTML pages.
    pub rest: bool,
    pub policy: ResetPolicy,
}

impl Default for ForgotPasswordConfig {
    fn default() -> Self {
        Self {
            route: "/forgot-password".to_string(),
            rest: false,
            policy: ResetPolicy::default(),
        }
    }
}

impl ForgotPasswordConfig {
    /// Route the active adapter is mounted under.
    pub fn mount_route(&self) -> String {
        if self.rest {
            format!("/rest{}", self.route)
        } else {
            self.route.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("FORGOT_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORGOT_HOST: {e}"))?;

        let port: u16 = env_or("FORGOT_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORGOT_PORT: {e}"))?;

        let base_url = env_or("FORGOT_BASE_URL", &format!("http://{host}:{port}"));
        let app_name = env_or("FORGOT_APP_NAME", "Forgot Password");
        let log_level = env_or("FORGOT_LOG_LEVEL", "info");

        let route = normalize_route(&env_or("FORGOT_ROUTE", "/forgot-password"))?;
        let rest = parse_bool("FORGOT_REST", &env_or("FORGOT_REST", "false"))?;

        let token_ttl = parse_duration(&env_or("FORGOT_TOKEN_TTL", "1 day"))
            .map_err(|e| format!("Invalid FORGOT_TOKEN_TTL: {e}"))?;
        let honor_user_cost = parse_bool(
            "FORGOT_HONOR_USER_COST",
            &env_or("FORGOT_HONOR_USER_COST", "true"),
        )?;

        let smtp = match (
            std::env::var("FORGOT_SMTP_HOST").ok(),
            std::env::var("FORGOT_SMTP_PORT").ok(),
            std::env::var("FORGOT_SMTP_USER").ok(),
            std::env::var("FORGOT_SMTP_PASS").ok(),
            std::env::var("FORGOT_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid FORGOT_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            base_url,
            app_name,
            log_level,
            forgot_password: ForgotPasswordConfig {
                route,
                rest,
                policy: ResetPolicy {
                    token_ttl,
                    honor_user_cost,
                },
            },
            smtp,
        })
    }
}

/// Parse a human duration such as `10ms`, `1 hour`, `24h`, `2 days` or a
/// bare number of milliseconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("'{input}' does not start with a number"))?;
    if value < 0.0 || !value.is_finite() {
        return Err(format!("'{input}' is out of range"));
    }

    let millis_per_unit: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        "w" | "week" | "weeks" => 604_800_000.0,
        other => return Err(format!("unknown unit '{other}'")),
    };

    let millis = (value * millis_per_unit).round();
    if millis > i64::MAX as f64 {
        return Err(format!("'{input}' is out of range"));
    }
    Duration::try_milliseconds(millis as i64).ok_or_else(|| format!("'{input}' is out of range"))
}

fn normalize_route(route: &str) -> Result<String, String> {
    let trimmed = route.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("FORGOT_ROUTE must not be empty".to_string());
    }
    if trimmed.contains(['{', '}']) {
        return Err(format!("Invalid FORGOT_ROUTE '{route}'"));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("Invalid {key}: '{other}' is not a boolean")),
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
