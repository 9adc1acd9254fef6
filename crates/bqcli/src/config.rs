//! Per-user configuration directory, history file and settings.
//!
//! Everything lives under `~/.config/<name>/`:
//!
//! ```text
//! ~/.config/bqcli/
//!     history       line-editor history, one entry appended per submission
//!     config.toml   optional settings (project, location, token, timeouts,
//!                   pager, color)
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const DEFAULT_DIR_NAME: &str = "bqcli";

const HISTORY_FILE: &str = "history";
const SETTINGS_FILE: &str = "config.toml";

/// Resolved configuration paths. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    name: String,
    home: PathBuf,
}

impl Config {
    /// Configuration rooted at the user's home directory with the default
    /// directory name.
    pub fn new() -> Result<Self> {
        Self::with_name(DEFAULT_DIR_NAME)
    }

    /// Configuration rooted at the user's home directory.
    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| anyhow!("could not determine the home directory"))?;
        Ok(Self::with_home(home, name))
    }

    /// Configuration rooted at an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<home>/.config/<name>`
    pub fn dir_path(&self) -> PathBuf {
        self.home.join(".config").join(&self.name)
    }

    /// `<dir>/history`
    pub fn history_path(&self) -> PathBuf {
        self.dir_path().join(HISTORY_FILE)
    }

    /// `<dir>/config.toml`
    pub fn settings_path(&self) -> PathBuf {
        self.dir_path().join(SETTINGS_FILE)
    }

    /// Create the configuration directory if it does not exist yet.
    pub fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(self.dir_path())
    }

    /// Load `config.toml`, falling back to defaults when it is absent.
    pub fn load_settings(&self) -> Result<Settings> {
        Settings::load(&self.settings_path())
    }
}

/// Optional user settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default project for queries and listings.
    pub project: Option<String>,
    /// Job location, e.g. `US` or `europe-west1`.
    pub location: Option<String>,
    /// Fixed access token; otherwise `BQCLI_ACCESS_TOKEN` or gcloud.
    pub token: Option<String>,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// How long to wait for a query job to finish, in seconds.
    pub job_timeout_secs: Option<u64>,
    /// Page output taller than the terminal.
    pub pager: bool,
    /// Highlight SQL while typing.
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project: None,
            location: None,
            token: None,
            request_timeout_secs: None,
            job_timeout_secs: None,
            pager: true,
            color: true,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }
}
