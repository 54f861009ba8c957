//! Engine settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration of the engine binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Root directory holding one folder per game
    pub maps_dir: PathBuf,
    /// Central sound effect directory (`global/...` sounds)
    pub soundfx_dir: PathBuf,
    /// Persist through a remote game store instead of the filesystem
    pub game_store_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    /// Game loaded at start-up
    pub default_game: Option<String>,
    /// `*` or a comma-separated origin list; unset disables CORS
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            maps_dir: PathBuf::from("./maps"),
            soundfx_dir: PathBuf::from("./soundfx"),
            game_store_url: None,
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            default_game: None,
            cors_allowed_origins: None,
        }
    }
}

impl EngineSettings {
    /// Read settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let server_port = non_empty("SERVER_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|p| match p.parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(value = %p, "Invalid server port, using default");
                    None
                }
            })
            .unwrap_or(defaults.server_port);

        Self {
            maps_dir: non_empty("MAPS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.maps_dir),
            soundfx_dir: non_empty("SOUNDFX_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.soundfx_dir),
            game_store_url: non_empty("GAME_STORE_URL"),
            server_host: non_empty("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            default_game: non_empty("DEFAULT_GAME"),
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server_host, self.server_port).parse()
    }
}

/// Load `.env.local` then `.env` from the current directory or the nearest
/// ancestor that has them. Values already set in the environment win.
pub fn load_dotenv() {
    for filename in [".env.local", ".env"] {
        if let Ok(path) = dotenvy::from_filename(filename) {
            tracing::debug!(path = %path.display(), "Loaded environment file");
        }
    }
}
