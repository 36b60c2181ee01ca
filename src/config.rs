use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

/// How the API token is presented to OJS. Older installs only accept the
/// `apiToken` query parameter, newer ones take a bearer header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Header,
    Query,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Ok(AuthMode::Header),
            "query" => Ok(AuthMode::Query),
            other => Err(format!("unknown auth mode '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            other => Err(format!("unknown orientation '{other}'")),
        }
    }
}

pub struct Config {
    pub port: u16,
    pub api_base_url: String,
    pub api_token: String,
    pub auth_mode: AuthMode,
    /// Some OJS installs sit behind self-signed certificates; opt-in only.
    pub accept_invalid_certs: bool,
    pub template_path: PathBuf,
    pub orientation: Orientation,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "3000"),
            api_base_url: require("OJS_BASE_URL"),
            api_token: require("OJS_API_TOKEN"),
            auth_mode: try_load("OJS_AUTH_MODE", "header"),
            accept_invalid_certs: try_load("OJS_ACCEPT_INVALID_CERTS", "false"),
            template_path: try_load("CERT_TEMPLATE_PATH", "assets/certificate-template.png"),
            orientation: try_load("CERT_ORIENTATION", "landscape"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn require(key: &str) -> String {
    env::var(key)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Required environment variable {key} missing: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mode_parses_case_insensitively() {
        assert_eq!("Header".parse::<AuthMode>().unwrap(), AuthMode::Header);
        assert_eq!("QUERY".parse::<AuthMode>().unwrap(), AuthMode::Query);
        assert!("cookie".parse::<AuthMode>().is_err());
    }

    #[test]
    fn orientation_parses() {
        assert_eq!(
            "landscape".parse::<Orientation>().unwrap(),
            Orientation::Landscape
        );
        assert_eq!(
            "Portrait".parse::<Orientation>().unwrap(),
            Orientation::Portrait
        );
        assert!("square".parse::<Orientation>().is_err());
    }
}
