//! State remembered between runs: the last folder and the sidebar width.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

const SESSION_FILE: &str = "session.json";
/// Narrowest sidebar, in columns.
pub const MIN_SIDEBAR_WIDTH: u16 = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub last_folder: Option<String>,
    /// Sidebar width in columns; unset means the default share of the screen.
    #[serde(default)]
    pub sidebar_width: Option<u16>,
}

/// `<data dir>/innote/session.json`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("innote").join(SESSION_FILE))
}

impl Session {
    /// Read the session file; anything missing or unreadable yields defaults.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable session");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("cannot encode session: {e}")))?;
        fs::write(path, content)?;
        debug!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Sidebar width for a terminal `total` columns wide: the saved width,
    /// or 2/12 of the screen, never below [`MIN_SIDEBAR_WIDTH`] and never
    /// wider than the screen.
    pub fn sidebar_columns(&self, total: u16) -> u16 {
        let width = self
            .sidebar_width
            .unwrap_or_else(|| (u32::from(total) * 2 / 12) as u16);
        width.max(MIN_SIDEBAR_WIDTH).min(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SESSION_FILE);
        let session = Session {
            last_folder: Some("/home/me/notes".into()),
            sidebar_width: Some(30),
        };
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path), session);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(Session::load(&dir.path().join("nope.json")), Session::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Session::load(&path), Session::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, r#"{"last_folder":"/n"}"#).unwrap();
        let session = Session::load(&path);
        assert_eq!(session.last_folder.as_deref(), Some("/n"));
        assert_eq!(session.sidebar_width, None);
    }

    #[test]
    fn default_sidebar_is_two_twelfths() {
        let session = Session::default();
        assert_eq!(session.sidebar_columns(240), 40);
        assert_eq!(session.sidebar_columns(60), MIN_SIDEBAR_WIDTH);
    }

    #[test]
    fn saved_sidebar_width_is_clamped() {
        let session = Session {
            sidebar_width: Some(4),
            ..Default::default()
        };
        assert_eq!(session.sidebar_columns(100), MIN_SIDEBAR_WIDTH);
        let session = Session {
            sidebar_width: Some(500),
            ..Default::default()
        };
        assert_eq!(session.sidebar_columns(100), 100);
    }
}
