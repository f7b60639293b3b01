//! Server configuration from environment variables

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_DATA_FILE: &str = "data/game_data.json";
pub const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
/// 16 MiB per upload
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Location of the game document
    pub data_file: PathBuf,
    /// Directory holding uploaded photos
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load config from PORT, DATA_FILE, UPLOAD_DIR and MAX_UPLOAD_BYTES
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = parse_var("PORT").unwrap_or(defaults.port);
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes);
        let data_file = path_var("DATA_FILE").unwrap_or(defaults.data_file);
        let upload_dir = path_var("UPLOAD_DIR").unwrap_or(defaults.upload_dir);

        Self {
            port,
            data_file,
            upload_dir,
            max_upload_bytes,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
