use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    pub jwt_secret: String,

    /// 32-byte hex key used to encrypt GitLab access tokens at rest.
    #[serde(default = "default_token_key")]
    pub token_encryption_key: String,

    /// Directory the generated `.ics` files are written to, one
    /// subdirectory per read token.
    #[serde(default = "default_media_root")]
    pub media_root: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    jwt_secret: Option<String>,
    token_encryption_key: Option<String>,
    media_root: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_token_key() -> String {
    // This key is for development convenience.
    // It's crucial to override this in production via environment variables.
    "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f".to_string()
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config = PartialServerConfig {
            listen_addr: env::var("LISTEN_ADDR").ok(),
            jwt_secret: env::var("JWT_SECRET").ok(),
            token_encryption_key: env::var("TOKEN_ENCRYPTION_KEY").ok(),
            media_root: env::var("MEDIA_ROOT").ok(),
        };

        // 3. Merge: environment overrides file
        let final_config = ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .ok_or("JWT_SECRET is required")?,
            token_encryption_key: env_config
                .token_encryption_key
                .or(file_config.token_encryption_key)
                .unwrap_or_else(default_token_key),
            media_root: env_config
                .media_root
                .or(file_config.media_root)
                .unwrap_or_else(default_media_root),
        };

        Ok(final_config)
    }
}
