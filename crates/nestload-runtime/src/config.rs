//! Launcher configuration (nestload.toml)
//!
//! ```toml
//! [archive]
//! root = "dist/app.jar"          # defaults to the running executable
//! suffixes = [".jar", ".war"]
//! temp_dir = "/var/tmp/nestload"
//! on_failure = "best-effort"     # or "strict"
//!
//! [units]
//! extension = ".unit"
//! roots = ["", "WEB-INF/classes"]
//! entry = "main"
//!
//! [fallback]
//! paths = ["platform/units"]
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::io;
use std::path::{Path, PathBuf};

use nestload_archive::{ArchiveSuffixes, DiscoveryOptions, FailurePolicy, DEFAULT_SUFFIXES};
use serde::Deserialize;
use thiserror::Error;

use crate::error::LoadError;
use crate::loader::{DelegatingLoader, LoaderOptions};
use crate::resolver::DirectoryResolver;
use crate::unit::{UnitLayout, DEFAULT_UNIT_EXTENSION, DEFAULT_UNIT_ROOTS};

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "nestload.toml";

/// Environment variable overriding `[archive].root`.
pub const ROOT_ENV: &str = "NESTLOAD_ROOT";

/// Default entry symbol.
pub const DEFAULT_ENTRY: &str = "main";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No root archive configured and the executable path is unavailable
    #[error("Cannot determine the root archive: {0}")]
    NoRoot(#[source] io::Error),
}

/// Parsed `nestload.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub units: UnitsConfig,
    pub fallback: FallbackConfig,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// `[archive]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Root archive location.
    pub root: Option<PathBuf>,

    /// Entry suffixes treated as nested archives.
    pub suffixes: Vec<String>,

    /// Where nested archives are extracted to.
    pub temp_dir: Option<PathBuf>,

    /// Handling of nested archives that fail to extract.
    pub on_failure: FailurePolicy,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: None,
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            temp_dir: None,
            on_failure: FailurePolicy::default(),
        }
    }
}

/// `[units]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnitsConfig {
    /// File extension of unit entries.
    pub extension: String,

    /// Prefixes searched inside each archive, in order.
    pub roots: Vec<String>,

    /// Entry symbol invoked by the launcher.
    pub entry: String,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_UNIT_EXTENSION.to_string(),
            roots: DEFAULT_UNIT_ROOTS.iter().map(|s| s.to_string()).collect(),
            entry: DEFAULT_ENTRY.to_string(),
        }
    }
}

/// `[fallback]` section
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FallbackConfig {
    /// Directories consulted after the search path, in order.
    pub paths: Vec<PathBuf>,
}

impl Config {
    /// Parse configuration from a TOML string. Relative paths stay relative.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read configuration from `path`; relative paths resolve against its directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Find and load the configuration that applies to `start_dir`.
    ///
    /// Looks for `nestload.toml` in `start_dir` and its ancestors, then in the
    /// user config directory (`~/.config/nestload/` on Linux). Without a file,
    /// defaults apply with paths relative to `start_dir`.
    pub fn discover(start_dir: &Path) -> Result<Self, ConfigError> {
        match find_config_file(start_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using config file");
                Self::from_file(&path)
            }
            None => Ok(Self::default().with_base_dir(start_dir)),
        }
    }

    /// Set the directory relative paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Root archive location: `NESTLOAD_ROOT`, then `[archive].root`, then the
    /// running executable.
    pub fn root_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(root));
        }
        if let Some(root) = &self.archive.root {
            return Ok(self.resolve_path(root));
        }
        std::env::current_exe().map_err(ConfigError::NoRoot)
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            suffixes: ArchiveSuffixes::new(&self.archive.suffixes),
            policy: self.archive.on_failure,
        }
    }

    pub fn layout(&self) -> UnitLayout {
        UnitLayout::new(&self.units.extension, &self.units.roots)
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            discovery: self.discovery_options(),
            layout: self.layout(),
            temp_dir: self.archive.temp_dir.as_deref().map(|p| self.resolve_path(p)),
        }
    }

    /// One directory resolver per `[fallback].paths` entry, in order.
    pub fn fallback_resolvers(&self) -> Vec<DirectoryResolver> {
        self.fallback
            .paths
            .iter()
            .map(|p| DirectoryResolver::new(self.resolve_path(p), self.layout()))
            .collect()
    }

    /// Build a loader for the configured root with the configured fallbacks.
    pub fn open_loader(&self) -> Result<DelegatingLoader, LoadError> {
        let root = self.root_path()?;
        let mut loader = DelegatingLoader::open(&root, &self.loader_options())?;
        for resolver in self.fallback_resolvers() {
            loader = loader.with_fallback(resolver);
        }
        Ok(loader)
    }
}

/// Locate the config file applying to `start_dir`.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    let user = dirs::config_dir()?.join("nestload").join(CONFIG_FILE_NAME);
    user.is_file().then_some(user)
}
