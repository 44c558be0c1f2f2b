use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The logo image shown beside the text box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoAsset {
    pub path: PathBuf,
    /// Whether the file existed when it was loaded. A missing logo only
    /// degrades the picture; the sequencer runs the same either way.
    pub available: bool,
}

/// Registry for assets referenced by the overlay. Loaded once at startup.
#[derive(Debug, Default)]
pub struct AssetStore {
    logo: Option<LogoAsset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self { logo: None }
    }

    /// Registers the logo. A second call keeps the first logo.
    pub fn load_logo(&mut self, path: impl AsRef<Path>) -> &LogoAsset {
        let path = path.as_ref();
        self.logo.get_or_insert_with(|| {
            let available = path.is_file();
            if available {
                tracing::debug!(path = %path.display(), "logo asset loaded");
            } else {
                tracing::warn!(path = %path.display(), "logo asset missing, overlay will render without it");
            }
            LogoAsset {
                path: path.to_path_buf(),
                available,
            }
        })
    }

    pub fn logo(&self) -> Option<&LogoAsset> {
        self.logo.as_ref()
    }
}
