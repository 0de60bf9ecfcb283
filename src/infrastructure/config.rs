use crate::domain::{
    config::{GlobalConfig, SppComConfig},
    error::{SppComError, SppComResult},
};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".sppcom";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> SppComResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Create a manager over explicit locations
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration from files
    pub fn load_config(&self) -> SppComResult<SppComConfig> {
        // Start with default configuration
        let mut config = SppComConfig::default();

        // Global file contributes settings and peers
        if self.global_config_path.exists() {
            let global_config = Self::load_config_from_path(&self.global_config_path)?;
            config.global = global_config.global;
            config.peers = global_config.peers;
        }

        // Project file adds peers and may pick the default peer
        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                let project_config = Self::load_config_from_path(project_path)?;
                if project_config.global.default_peer.is_some() {
                    config.global.default_peer = project_config.global.default_peer;
                }
                config.peers.extend(project_config.peers);
            }
        }

        Ok(config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> SppComResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| SppComError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("sppcom").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up the directory tree from `start`
    pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(path: &Path) -> SppComResult<SppComConfig> {
        let content = fs::read_to_string(path).map_err(|e| SppComError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| SppComError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &SppComConfig) -> SppComResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SppComError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| SppComError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| SppComError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write the example project configuration under `path`
    pub fn init_project_config(&self, path: &Path) -> SppComResult<PathBuf> {
        let config_file = path.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_file.exists() {
            return Err(SppComError::Config {
                message: format!(
                    "Project configuration already exists at {}",
                    config_file.display()
                ),
            });
        }

        self.save_config_to_path(&config_file, &SppComConfig::example())?;
        Ok(config_file)
    }

    /// Write a global configuration holding only default settings
    pub fn init_global_config(&self) -> SppComResult<&PathBuf> {
        if self.global_config_path.exists() {
            return Err(SppComError::Config {
                message: format!(
                    "Global configuration already exists at {}",
                    self.global_config_path.display()
                ),
            });
        }

        let config = SppComConfig {
            global: GlobalConfig::default(),
            peers: Vec::new(),
        };
        self.save_config_to_path(&self.global_config_path, &config)?;
        Ok(&self.global_config_path)
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}
