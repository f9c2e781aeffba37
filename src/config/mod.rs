use std::env;
use std::path::PathBuf;

/// Runtime configuration for the menu API and the photo pipeline
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the API server (default: 3000)
    pub port: u16,

    /// Directory holding uploaded photos (default: "public/uploads")
    pub upload_dir: PathBuf,

    /// URL prefix the upload directory is served under (default: "/uploads")
    pub public_prefix: String,

    /// Maximum photo size in bytes (default: 5 MB)
    pub max_photo_size: usize,

    /// Processed photos never exceed this width (default: 800)
    pub photo_max_width: u32,

    /// Processed photos never exceed this height (default: 600)
    pub photo_max_height: u32,

    /// JPEG quality for processed photos, 1-100 (default: 85)
    pub photo_quality: u8,

    /// Insert default categories into an empty table at startup (default: false)
    pub seed_categories: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upload_dir: PathBuf::from("public/uploads"),
            public_prefix: "/uploads".to_string(),
            max_photo_size: 5 * 1024 * 1024, // 5 MB
            photo_max_width: 800,
            photo_max_height: 600,
            photo_quality: 85,
            seed_categories: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            public_prefix: env::var("PUBLIC_PREFIX")
                .map(|v| normalize_prefix(&v))
                .unwrap_or(default.public_prefix),

            max_photo_size: env::var("MAX_PHOTO_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_photo_size),

            photo_max_width: env::var("PHOTO_MAX_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default.photo_max_width),

            photo_max_height: env::var("PHOTO_MAX_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default.photo_max_height),

            photo_quality: env::var("PHOTO_QUALITY")
                .ok()
                .and_then(|v| v.parse::<u8>().ok())
                .map(|v| v.clamp(1, 100))
                .unwrap_or(default.photo_quality),

            seed_categories: env::var("SEED_CATEGORIES")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.seed_categories),
        }
    }

    /// Create config for development and tests, rooted at the given upload directory
    pub fn development(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            seed_categories: true,
            ..Self::default()
        }
    }
}

/// "uploads/" and "/uploads/" both become "/uploads"
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return AppConfig::default().public_prefix;
    }
    format!("/{}", trimmed)
}
