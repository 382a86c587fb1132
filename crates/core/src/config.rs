use crate::error::{GalleryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://10.0.0.1:64321";
pub const DEFAULT_DESCRIPTION_PATH: &str = "/DmsDesc.xml";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Client settings, loadable from a TOML file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Scheme, host and port of the media server
    pub base_url: String,
    /// Path of the device description, appended to `base_url`
    pub description_path: String,
    pub request_timeout_secs: u64,
    /// `RequestedCount` sent with each Browse call
    pub page_size: u32,
    /// Keep browsing a container until `TotalMatches` is reached.
    /// Off by default: only the first page of each container is read.
    pub paginate: bool,
    /// Fill `ImageItem::title` from `dc:title`
    pub capture_titles: bool,
    /// Fill `ImageItem` date, resolution and size from DIDL-Lite metadata
    pub capture_metadata: bool,
    /// Containers deeper than this are not browsed (root is depth 0)
    pub max_depth: Option<usize>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            description_path: DEFAULT_DESCRIPTION_PATH.to_string(),
            request_timeout_secs: 10,
            page_size: DEFAULT_PAGE_SIZE,
            paginate: false,
            capture_titles: false,
            capture_metadata: false,
            max_depth: None,
        }
    }
}

impl GalleryConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GalleryError::Config(e.to_string()))
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(GalleryError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// `<config dir>/nexgallery/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nexgallery").join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
