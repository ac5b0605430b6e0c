//! Configuration file support.
//!
//! Mooring reads two optional configuration files:
//! - Global: `<config dir>/mooring/config.toml` - user-wide defaults
//! - Project: `.mooring/config.toml` - project-specific overrides
//!
//! Project values take precedence over global values, key by key.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Core definitions every package namespace can see when nothing in its
/// own imports or exports matches.
pub const DEFAULT_BUILTINS: &[&str] = &[
    "c", "cat", "function", "identity", "if", "length", "list", "print", "return", "sum",
];

/// Effective configuration after merging all files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Names resolvable from every package's own code.
    pub builtins: Vec<String>,

    /// Build independent namespaces on the rayon thread pool.
    pub parallel_build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig {
                builtins: DEFAULT_BUILTINS.iter().map(|s| s.to_string()).collect(),
                parallel_build: true,
            },
            output: OutputConfig { color: true },
        }
    }
}

/// One configuration file as written on disk; every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineSection {
    pub builtins: Option<Vec<String>>,
    pub parallel_build: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub color: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a file if it exists. A broken file is reported and ignored so a
    /// bad global config never blocks work in a project.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring config {}: {:#}", path.display(), e);
            Self::default()
        })
    }
}

impl Config {
    /// Apply a file's values on top of this configuration.
    pub fn merge(&mut self, file: ConfigFile) {
        if let Some(builtins) = file.engine.builtins {
            self.engine.builtins = builtins;
        }
        if let Some(parallel) = file.engine.parallel_build {
            self.engine.parallel_build = parallel;
        }
        if let Some(color) = file.output.color {
            self.output.color = color;
        }
    }
}

/// Load the effective configuration: defaults, then global, then project.
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();
    config.merge(ConfigFile::load_or_default(global_path));
    config.merge(ConfigFile::load_or_default(project_path));
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.engine.parallel_build);
        assert!(config.engine.builtins.iter().any(|b| b == "length"));
        assert!(config.output.color);
    }

    #[test]
    fn test_parse_kebab_case() {
        let file = ConfigFile::parse(
            r#"
[engine]
builtins = ["sum"]
parallel-build = false
"#,
        )
        .unwrap();

        assert_eq!(file.engine.builtins, Some(vec!["sum".to_string()]));
        assert_eq!(file.engine.parallel_build, Some(false));
        assert_eq!(file.output.color, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ConfigFile::parse("[engine]\nthreads = 4\n").is_err());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(&global, "[engine]\nparallel-build = false\n[output]\ncolor = false\n").unwrap();
        std::fs::write(&project, "[output]\ncolor = true\n").unwrap();

        let config = load_config(&global, &project);
        assert!(!config.engine.parallel_build);
        assert!(config.output.color);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("config.toml");
        std::fs::write(&broken, "[engine\n").unwrap();

        let config = load_config(&broken, &tmp.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }
}
