//! Global context for Mooring operations.
//!
//! Provides centralized access to the working directory, configuration
//! file locations, and output settings.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::core::workspace::{find_workspace_file, WorkspaceFileError};
use crate::util::config::{load_config, Config};

static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("dev", "mooring", "mooring"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config.toml
    config_dir: PathBuf,

    /// Workspace file given with `--manifest`, relative to cwd
    manifest_path: Option<PathBuf>,

    verbose: bool,

    color: bool,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let config_dir = PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| cwd.join(".mooring").join("global"));

        GlobalContext {
            cwd,
            config_dir,
            manifest_path: None,
            verbose: false,
            color: true,
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn set_manifest_path(&mut self, path: Option<PathBuf>) {
        self.manifest_path = path;
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Project-local `.mooring` directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(".mooring")
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Effective configuration for this context. The `--no-color` flag
    /// wins over any file setting.
    pub fn config(&self) -> Config {
        let mut config = load_config(&self.config_path(), &self.project_config_path());
        if !self.color {
            config.output.color = false;
        }
        config
    }

    /// The `--manifest` path if one was given, otherwise the nearest
    /// workspace file at or above cwd.
    pub fn workspace_file(&self) -> Result<PathBuf, WorkspaceFileError> {
        match &self.manifest_path {
            Some(path) => Ok(self.cwd.join(path)),
            None => self.find_workspace_file(),
        }
    }

    /// Find the workspace file starting from cwd and searching upward.
    pub fn find_workspace_file(&self) -> Result<PathBuf, WorkspaceFileError> {
        let mut current = self.cwd.clone();
        loop {
            if let Some(path) = find_workspace_file(&current) {
                return Ok(path);
            }
            if !current.pop() {
                return Err(WorkspaceFileError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }
}
