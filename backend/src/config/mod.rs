//! Configuration module for the salon backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default idle lifetime of an editing session (4 hours).
const DEFAULT_SESSION_TTL_SECS: u64 = 4 * 60 * 60;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin API (required in production)
    pub api_psk: Option<String>,
    /// Directory holding the content JSON files
    pub data_dir: PathBuf,
    /// Directory uploaded images are written to
    pub image_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Skip the revision check on publish and let the last publish win
    pub last_writer_wins: bool,
    /// Idle time after which an editing session is dropped
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_psk = lookup("SALON_API_PSK").filter(|k| !k.is_empty());

        let data_dir = lookup("SALON_DATA_DIR")
            .unwrap_or_else(|| "./public/data".to_string())
            .into();

        let image_dir = lookup("SALON_IMAGE_DIR")
            .unwrap_or_else(|| "./public/images".to_string())
            .into();

        let bind_addr = lookup("SALON_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| format!("Invalid SALON_BIND_ADDR format: {}", e))?;

        let log_level = lookup("SALON_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let last_writer_wins = lookup("SALON_LAST_WRITER_WINS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let session_ttl = match lookup("SALON_SESSION_TTL_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid SALON_SESSION_TTL_SECS: {}", e))?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            api_psk,
            data_dir,
            image_dir,
            bind_addr,
            log_level,
            last_writer_wins,
            session_ttl: Duration::from_secs(session_ttl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.data_dir, PathBuf::from("./public/data"));
        assert_eq!(config.image_dir, PathBuf::from("./public/images"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.last_writer_wins);
        assert_eq!(config.session_ttl, Duration::from_secs(4 * 60 * 60));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SALON_API_PSK", "secret"),
            ("SALON_BIND_ADDR", "0.0.0.0:3000"),
            ("SALON_LAST_WRITER_WINS", "TRUE"),
            ("SALON_SESSION_TTL_SECS", "90"),
        ])
        .unwrap();

        assert_eq!(config.api_psk.as_deref(), Some("secret"));
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.last_writer_wins);
        assert_eq!(config.session_ttl, Duration::from_secs(90));
    }

    #[test]
    fn test_empty_psk_means_unset() {
        let config = config_from(&[("SALON_API_PSK", "")]).unwrap();
        assert!(config.api_psk.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("SALON_BIND_ADDR", "not-an-address")]).is_err());
        assert!(config_from(&[("SALON_SESSION_TTL_SECS", "soon")]).is_err());
    }
}
