//! User configuration: TOML files layered under CLI overrides.
//!
//! Later sources override earlier ones:
//! 1. built-in defaults
//! 2. `~/.config/innote/config.toml`
//! 3. `.innote.toml` in the working directory
//! 4. the file named by `$INNOTE_CONFIG`
//! 5. the file passed with `--config`
//! 6. CLI flags

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::gateway::{DEFAULT_NEW_DIRECTORY_NAME, DEFAULT_NEW_FILE_NAME};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "INNOTE_CONFIG";
/// Largest file the preview pane reads by default (256 KiB).
pub const DEFAULT_PREVIEW_MAX_BYTES: u64 = 262_144;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Folder opened at startup when none is given on the command line.
    pub default_path: Option<String>,
    pub confirm_delete: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Nerd font icons; `false` falls back to ASCII markers.
    pub use_icons: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    pub enabled: Option<bool>,
    /// Bytes read from the selected file; the rest is cut off.
    pub max_bytes: Option<u64>,
}

/// Names given to entries created from the tree.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NotesConfig {
    pub new_file_name: Option<String>,
    pub new_directory_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// `"dark"` or `"light"`.
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; logging is off when unset.
    pub file: Option<String>,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: Option<String>,
}

/// Top-level configuration. Every field is optional so partial files merge.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub preview: PreviewConfig,
    pub notes: NotesConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

/// Config files to try, lowest priority first. `--config` is not included.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("innote").join("config.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".innote.toml"));
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }
    paths
}

/// Read one config file. Missing files are skipped silently; a file that
/// fails to parse is reported on stderr and skipped. This runs before the
/// terminal is taken over and before logging is set up.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!("Warning: ignoring config file {}: {}", path.display(), e);
            None
        }
    }
}

impl AppConfig {
    /// Overlay `other` on `self`; `Some` values in `other` win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
            },
            tree: TreeConfig {
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            preview: PreviewConfig {
                enabled: other.preview.enabled.or(self.preview.enabled),
                max_bytes: other.preview.max_bytes.or(self.preview.max_bytes),
            },
            notes: NotesConfig {
                new_file_name: other
                    .notes
                    .new_file_name
                    .clone()
                    .or(self.notes.new_file_name),
                new_directory_name: other
                    .notes
                    .new_directory_name
                    .clone()
                    .or(self.notes.new_directory_name),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
        }
    }

    /// Build the effective configuration from every source.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = candidate_paths()
            .iter()
            .filter_map(|path| load_file(path))
            .fold(AppConfig::default(), |acc, file_cfg| acc.merge(&file_cfg));

        if let Some(file_cfg) = cli_config_path.and_then(load_file) {
            config = config.merge(&file_cfg);
        }
        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }
        config
    }

    pub fn default_path(&self) -> Option<&str> {
        self.general.default_path.as_deref()
    }

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(true)
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview.enabled.unwrap_or(true)
    }

    pub fn preview_max_bytes(&self) -> u64 {
        self.preview.max_bytes.unwrap_or(DEFAULT_PREVIEW_MAX_BYTES)
    }

    pub fn new_file_name(&self) -> &str {
        self.notes
            .new_file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_NEW_FILE_NAME)
    }

    pub fn new_directory_name(&self) -> &str {
        self.notes
            .new_directory_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_NEW_DIRECTORY_NAME)
    }

    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_file(&self) -> Option<&str> {
        self.log.file.as_deref()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
