use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;
use tracing_subscriber::EnvFilter;
use warden_core::AppError;

const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub jwt_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub database_max_connections: u32,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,
    pub cors_allowed_origin: Option<String>,
    pub trusted_proxies: Vec<IpNet>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let jwt_secret = required_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_BYTES} bytes"
            )));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parsed_env("API_PORT", 3001)?;

        let database_max_connections = parsed_env("DATABASE_MAX_CONNECTIONS", 10)?;
        let rate_limit_max_requests = parsed_env("RATE_LIMIT_MAX_REQUESTS", 100)?;
        let rate_limit_window_seconds = parsed_env("RATE_LIMIT_WINDOW_SECONDS", 60)?;
        if rate_limit_window_seconds == 0 {
            return Err(AppError::Validation(
                "RATE_LIMIT_WINDOW_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let trusted_proxies = parse_trusted_proxies(
            env::var("TRUSTED_PROXIES").unwrap_or_default().as_str(),
        )?;

        Ok(Self {
            migrate_only,
            database_url,
            jwt_secret,
            api_host,
            api_port,
            database_max_connections,
            rate_limit_max_requests,
            rate_limit_window_seconds,
            cors_allowed_origin,
            trusted_proxies,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_setting(name, env::var(name).ok().as_deref(), default)
}

fn parse_setting<T>(name: &str, value: Option<&str>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

/// Parses a comma-separated list of CIDR networks or bare addresses.
fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            IpNet::from_str(entry)
                .or_else(|_| IpAddr::from_str(entry).map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!("invalid TRUSTED_PROXIES entry '{entry}': {error}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use warden_core::AppError;

    use super::{parse_setting, parse_trusted_proxies};

    #[test]
    fn port_setting_rejects_unparsable_values_instead_of_defaulting() {
        for value in ["70000", "http", "-1"] {
            let port = parse_setting::<u16>("API_PORT", Some(value), 3001);
            assert!(matches!(port, Err(AppError::Validation(message)) if message.contains("API_PORT")));
        }

        assert!(matches!(parse_setting::<u16>("API_PORT", None, 3001), Ok(3001)));
        assert!(matches!(parse_setting::<u16>("API_PORT", Some("  "), 3001), Ok(3001)));
        assert!(matches!(parse_setting::<u16>("API_PORT", Some(" 8080 "), 3001), Ok(8080)));
    }

    #[test]
    fn trusted_proxies_accept_networks_and_bare_addresses() {
        let proxies = match parse_trusted_proxies(" 10.0.0.0/8, 192.0.2.7 ,,::1") {
            Ok(proxies) => proxies,
            Err(error) => panic!("failed to parse proxies: {error}"),
        };

        let rendered: Vec<String> = proxies.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["10.0.0.0/8", "192.0.2.7/32", "::1/128"]);
        assert!(matches!(parse_trusted_proxies(""), Ok(proxies) if proxies.is_empty()));
    }

    #[test]
    fn trusted_proxies_reject_malformed_entries() {
        assert!(parse_trusted_proxies("10.0.0.0/8, proxy.internal").is_err());
    }
}
