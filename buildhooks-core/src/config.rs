//! Project configuration and script discovery.
//!
//! # Layout
//!
//! ```text
//! <home>/.buildhooks/
//!   init.d/
//!     *.hooks              (user init scripts, run first, sorted by name)
//! <project>/
//!   buildhooks.yaml        (optional)
//!   settings.hooks         (default settings script)
//!   build.hooks            (default build script)
//! ```
//!
//! # API pattern
//!
//! - `load_at(project_dir, home)` — explicit home; used in tests with `TempDir`
//! - `load(project_dir)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-home wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::DispatchPolicy;

pub const CONFIG_FILE_NAME: &str = "buildhooks.yaml";
pub const DEFAULT_SETTINGS_SCRIPT: &str = "settings.hooks";
pub const DEFAULT_BUILD_SCRIPT: &str = "build.hooks";
pub const SCRIPT_EXTENSION: &str = "hooks";

// ---------------------------------------------------------------------------
// 1. Raw file shape
// ---------------------------------------------------------------------------

/// Contents of `buildhooks.yaml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<PathBuf>,
    pub build_scripts: Vec<PathBuf>,
    pub init_scripts: Vec<PathBuf>,
    pub tasks: Vec<String>,
    pub dispatch: DispatchPolicy,
}

// ---------------------------------------------------------------------------
// 2. Resolved plan
// ---------------------------------------------------------------------------

/// Scripts and tasks for one build, with every path resolved and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub project_dir: PathBuf,
    /// User-level init scripts first, then the project's.
    pub init_scripts: Vec<PathBuf>,
    pub settings: Option<PathBuf>,
    pub build_scripts: Vec<PathBuf>,
    pub tasks: Vec<String>,
    pub dispatch: DispatchPolicy,
}

impl BuildPlan {
    /// Every script in evaluation order.
    pub fn scripts(&self) -> impl Iterator<Item = &PathBuf> {
        self.init_scripts.iter().chain(self.settings.iter()).chain(self.build_scripts.iter())
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Parse `<project_dir>/buildhooks.yaml`, or return defaults if absent.
pub fn read_config_at(project_dir: &Path) -> Result<BuildConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(BuildConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(BuildConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `<home>/.buildhooks/init.d/*.hooks`, sorted by file name. Missing dir → empty.
pub fn user_init_scripts_at(home: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let dir = home.join(".buildhooks").join("init.d");
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut scripts: Vec<PathBuf> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(SCRIPT_EXTENSION))
        .collect();
    scripts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(scripts)
}

/// Resolve the build plan for `project_dir`.
///
/// Explicitly configured scripts must exist ([`ConfigError::ScriptNotFound`]);
/// the default `settings.hooks` / `build.hooks` are used only when present.
pub fn load_at(project_dir: &Path, home: &Path) -> Result<BuildPlan, ConfigError> {
    let config = read_config_at(project_dir)?;

    let mut init_scripts = user_init_scripts_at(home)?;
    for script in &config.init_scripts {
        init_scripts.push(existing(project_dir, script)?);
    }

    let settings = match &config.settings {
        Some(path) => Some(existing(project_dir, path)?),
        None => optional(project_dir, DEFAULT_SETTINGS_SCRIPT),
    };

    let build_scripts = if config.build_scripts.is_empty() {
        optional(project_dir, DEFAULT_BUILD_SCRIPT).into_iter().collect()
    } else {
        config
            .build_scripts
            .iter()
            .map(|p| existing(project_dir, p))
            .collect::<Result<Vec<_>, _>>()?
    };

    tracing::debug!(
        project = %project_dir.display(),
        init = init_scripts.len(),
        build = build_scripts.len(),
        "resolved build plan"
    );

    Ok(BuildPlan {
        project_dir: project_dir.to_path_buf(),
        init_scripts,
        settings,
        build_scripts,
        tasks: config.tasks,
        dispatch: config.dispatch,
    })
}

/// `load_at` convenience wrapper.
pub fn load(project_dir: &Path) -> Result<BuildPlan, ConfigError> {
    load_at(project_dir, &home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

fn existing(project_dir: &Path, script: &Path) -> Result<PathBuf, ConfigError> {
    let path = project_dir.join(script);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::ScriptNotFound { path })
    }
}

fn optional(project_dir: &Path, name: &str) -> Option<PathBuf> {
    let path = project_dir.join(name);
    path.is_file().then_some(path)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
