//! Standard paths used by FocusPulse tools

use std::path::PathBuf;

/// Standard FocusPulse paths
pub struct Paths {
    /// Data directory (~/.local/share/focuspulse)
    pub data: PathBuf,
    /// Config directory (~/.config/focuspulse)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("focuspulse");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("focuspulse");

        Self { data, config }
    }

    /// Paths rooted somewhere other than the user's home (tests, portable installs)
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Default configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Directory used by the offline file store
    pub fn store_dir(&self) -> PathBuf {
        self.data.join("store")
    }
}
