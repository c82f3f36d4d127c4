use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DATA_DIR_NAME: &str = "photoshare";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub uploads_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub public_url: String,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        let port = env_value("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let bind_address = format!("0.0.0.0:{port}");
        let uploads_dir = env_value("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir("uploads"));
        let thumbnails_dir = env_value("THUMBNAILS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir("thumbnails"));
        let public_url = resolve_public_url(env_value("PUBLIC_URL"), &bind_address);
        let max_upload_bytes = env_value("MAX_UPLOAD_BYTES")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        Self {
            bind_address,
            uploads_dir,
            thumbnails_dir,
            public_url,
            max_upload_bytes,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_data_dir(leaf: &str) -> PathBuf {
    let mut base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(DATA_DIR_NAME);
    base.push(leaf);
    base
}

fn resolve_public_url(raw: Option<String>, bind_address: &str) -> String {
    let base = raw.unwrap_or_else(|| bind_address.to_string());
    let trimmed = base.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
