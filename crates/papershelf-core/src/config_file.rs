use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_TOP_K;
use crate::filter::SortOrder;
use crate::repository::http::DEFAULT_BASE_URL;
use crate::view_state::ViewMode;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub display: Option<DisplayConfig>,
    pub notes: Option<NotesConfig>,
    pub chat: Option<ChatConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub sort: Option<String>,
    pub view_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotesConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub top_k: Option<u32>,
}

/// Platform config directory path: `<config_dir>/papershelf/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("papershelf").join("config.toml"))
}

/// Load config by cascading CWD `.papershelf.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".papershelf.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let server = match (base.server, overlay.server) {
        (Some(b), Some(o)) => Some(ServerConfig {
            base_url: o.base_url.or(b.base_url),
            timeout_secs: o.timeout_secs.or(b.timeout_secs),
        }),
        (b, o) => o.or(b),
    };
    let display = match (base.display, overlay.display) {
        (Some(b), Some(o)) => Some(DisplayConfig {
            theme: o.theme.or(b.theme),
            sort: o.sort.or(b.sort),
            view_mode: o.view_mode.or(b.view_mode),
        }),
        (b, o) => o.or(b),
    };
    let notes = match (base.notes, overlay.notes) {
        (Some(b), Some(o)) => Some(NotesConfig {
            path: o.path.or(b.path),
        }),
        (b, o) => o.or(b),
    };
    let chat = match (base.chat, overlay.chat) {
        (Some(b), Some(o)) => Some(ChatConfig {
            top_k: o.top_k.or(b.top_k),
        }),
        (b, o) => o.or(b),
    };
    ConfigFile {
        server,
        display,
        notes,
        chat,
    }
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    save_to_path(config, &path)?;
    Ok(path)
}

fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {e}"))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {e}"))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {e}"))
}

/// Fully resolved settings, defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub theme: String,
    pub sort: SortOrder,
    pub view_mode: ViewMode,
    pub notes_path: Option<PathBuf>,
    pub top_k: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            theme: "hacker".to_string(),
            sort: SortOrder::DateAdded,
            view_mode: ViewMode::List,
            notes_path: crate::notes::default_path(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Settings {
    /// Fill defaults with whatever the file sets. Empty strings and unknown
    /// names are ignored.
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut s = Self::default();
        if let Some(server) = &file.server {
            if let Some(url) = server.base_url.as_ref().filter(|u| !u.is_empty()) {
                s.base_url = url.clone();
            }
            if let Some(secs) = server.timeout_secs {
                s.timeout = Duration::from_secs(secs.max(1));
            }
        }
        if let Some(display) = &file.display {
            if let Some(theme) = display.theme.as_ref().filter(|t| !t.is_empty()) {
                s.theme = theme.clone();
            }
            if let Some(sort) = &display.sort {
                s.sort = SortOrder::parse(sort);
            }
            if let Some(mode) = display.view_mode.as_deref().and_then(ViewMode::parse) {
                s.view_mode = mode;
            }
        }
        if let Some(path) = file.notes.as_ref().and_then(|n| n.path.as_ref()) {
            if !path.is_empty() {
                s.notes_path = Some(PathBuf::from(path));
            }
        }
        if let Some(k) = file.chat.as_ref().and_then(|c| c.top_k) {
            s.top_k = k.max(1);
        }
        s
    }

    /// The display section as it should be written back.
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            theme: Some(self.theme.clone()),
            sort: Some(self.sort.label().to_string()),
            view_mode: Some(self.view_mode.label().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wins_field_by_field() {
        let base: ConfigFile = toml::from_str(
            r#"
            [server]
            base_url = "http://base:8000"
            timeout_secs = 10
            [chat]
            top_k = 5
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [server]
            base_url = "http://cwd:9000"
            [display]
            theme = "modern"
            "#,
        )
        .unwrap();
        let merged = merge(base, overlay);
        let server = merged.server.unwrap();
        assert_eq!(server.base_url.as_deref(), Some("http://cwd:9000"));
        assert_eq!(server.timeout_secs, Some(10));
        assert_eq!(merged.display.unwrap().theme.as_deref(), Some("modern"));
        assert_eq!(merged.chat.unwrap().top_k, Some(5));
    }

    #[test]
    fn settings_fill_defaults() {
        let s = Settings::from_file(&ConfigFile::default());
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(s.top_k, DEFAULT_TOP_K);
        assert_eq!(s.sort, SortOrder::DateAdded);
    }

    #[test]
    fn settings_parse_display_names() {
        let file: ConfigFile = toml::from_str(
            r#"
            [display]
            sort = "Title"
            view_mode = "grid"
            [notes]
            path = "/tmp/notes.json"
            "#,
        )
        .unwrap();
        let s = Settings::from_file(&file);
        assert_eq!(s.sort, SortOrder::Title);
        assert_eq!(s.view_mode, ViewMode::Grid);
        assert_eq!(s.notes_path, Some(PathBuf::from("/tmp/notes.json")));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = ConfigFile {
            display: Some(Settings::default().display_config()),
            ..ConfigFile::default()
        };
        save_to_path(&cfg, &path).unwrap();
        assert_eq!(load_from_path(&path), Some(cfg));
    }

    #[test]
    fn invalid_toml_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nbase_url=").unwrap();
        assert_eq!(load_from_path(&path), None);
    }
}
