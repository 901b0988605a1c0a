//! Run configuration
//!
//! Values come from three layers, lowest priority first: built-in defaults, a
//! TOML config file, and explicitly given command line flags. One
//! [`GenerateConfig`] per target environment is derived from the merged
//! result and stays read-only for a whole generation pass.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".girdts.toml";

/// Target JavaScript runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Gjs,
    Node,
}

impl Environment {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gjs => "gjs",
            Self::Node => "node",
        }
    }

    /// Per-environment directory below the output directory
    pub const fn output_subdir(self) -> &'static str {
        match self {
            Self::Gjs => "Gjs",
            Self::Node => "node-gtk",
        }
    }

    pub const fn default_build_type(self) -> BuildType {
        match self {
            Self::Gjs => BuildType::Lib,
            Self::Node => BuildType::Types,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the generated declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// ES module imports plus a small JS loader per module
    Lib,
    /// Global `declare namespace` blocks with triple-slash references
    Types,
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lib => "lib",
            Self::Types => "types",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub environments: Vec<Environment>,
    /// Forces one build type for every environment
    pub build_type: Option<BuildType>,
    pub gir_directories: Vec<PathBuf>,
    pub outdir: PathBuf,
    /// Module names or wildcards, e.g. `Gtk-3.0` or `Gtk*`
    pub modules: Vec<String>,
    /// Package names excluded from the wildcard search
    pub ignore: Vec<String>,
    pub verbose: bool,
    /// Print to stdout instead of writing files
    pub print: bool,
    /// Keep every version of a conflicting module without warning
    pub ignore_conflicts: bool,
    /// Extra per-symbol override patches keyed by fully qualified name
    pub patches: IndexMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environments: vec![Environment::Gjs, Environment::Node],
            build_type: None,
            gir_directories: vec![PathBuf::from("/usr/share/gir-1.0")],
            outdir: PathBuf::from("@types"),
            modules: vec!["*".to_owned()],
            ignore: Vec::new(),
            verbose: false,
            print: false,
            ignore_conflicts: false,
            patches: IndexMap::new(),
        }
    }
}

/// Values given explicitly on the command line
///
/// Empty lists and unset flags leave the file or default value untouched.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub environments: Vec<Environment>,
    pub build_type: Option<BuildType>,
    pub gir_directories: Vec<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub modules: Vec<String>,
    pub ignore: Vec<String>,
    pub verbose: bool,
    pub print: bool,
    pub ignore_conflicts: bool,
}

impl Config {
    /// Parse a TOML config document
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Invalid girdts configuration")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&source).with_context(|| format!("in {}", path.display()))
    }

    /// Load the first config file found, or the defaults
    ///
    /// An explicit path must exist. Otherwise `.girdts.toml` in `cwd` is
    /// tried, then `girdts/config.toml` in the user configuration directory.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::search_paths(cwd) {
            if candidate.is_file() {
                debug!("Using config file {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn search_paths(cwd: &Path) -> Vec<PathBuf> {
        let mut paths = vec![cwd.join(LOCAL_CONFIG_FILE)];
        if let Ok(strategy) = etcetera::choose_base_strategy() {
            paths.push(strategy.config_dir().join("girdts").join("config.toml"));
        }
        paths
    }

    /// Layer explicitly given command line values over this config
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if !overrides.environments.is_empty() {
            self.environments = overrides.environments;
        }
        if overrides.build_type.is_some() {
            self.build_type = overrides.build_type;
        }
        if !overrides.gir_directories.is_empty() {
            self.gir_directories = overrides.gir_directories;
        }
        if let Some(outdir) = overrides.outdir {
            self.outdir = outdir;
        }
        if !overrides.modules.is_empty() {
            self.modules = overrides.modules;
        }
        if !overrides.ignore.is_empty() {
            self.ignore = overrides.ignore;
        }
        self.verbose |= overrides.verbose;
        self.print |= overrides.print;
        self.ignore_conflicts |= overrides.ignore_conflicts;
    }

    /// Immutable settings for one generation pass
    pub fn generate_config(&self, environment: Environment) -> GenerateConfig {
        GenerateConfig {
            environment,
            build_type: self
                .build_type
                .unwrap_or_else(|| environment.default_build_type()),
            gir_directories: self.gir_directories.clone(),
            outdir: (!self.print).then(|| self.outdir.clone()),
            verbose: self.verbose,
            patches: self.patches.clone(),
        }
    }
}

/// Read-only settings of one generation pass
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub environment: Environment,
    pub build_type: BuildType,
    pub gir_directories: Vec<PathBuf>,
    /// `None` when printing to stdout
    pub outdir: Option<PathBuf>,
    pub verbose: bool,
    pub patches: IndexMap<String, Vec<String>>,
}

impl GenerateConfig {
    /// Directory the files of this environment are written to
    pub fn environment_dir(&self) -> Option<PathBuf> {
        self.outdir
            .as_ref()
            .map(|outdir| outdir.join(self.environment.output_subdir()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.environments, vec![Environment::Gjs, Environment::Node]);
        assert_eq!(config.modules, vec!["*"]);
        assert_eq!(config.outdir, PathBuf::from("@types"));
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
environments = ["node"]
build_type = "lib"
gir_directories = ["./girs"]
modules = ["Gtk-3.0"]

[patches]
"Gtk.Widget.destroy" = ["/* destroy is handled by the runtime */"]
"#,
        )
        .expect("valid config");

        assert_eq!(config.environments, vec![Environment::Node]);
        assert_eq!(config.build_type, Some(BuildType::Lib));
        assert_eq!(config.gir_directories, vec![PathBuf::from("./girs")]);
        assert_eq!(config.outdir, PathBuf::from("@types"));
        assert_eq!(config.patches["Gtk.Widget.destroy"].len(), 1);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Config::from_toml("colour = true").is_err());
    }

    #[test]
    fn test_overrides_only_replace_given_values() {
        let mut config = Config::from_toml("modules = [\"Gio-2.0\"]\nverbose = true").expect("valid");
        config.apply(ConfigOverrides {
            environments: vec![Environment::Gjs],
            print: true,
            ..ConfigOverrides::default()
        });

        assert_eq!(config.environments, vec![Environment::Gjs]);
        assert_eq!(config.modules, vec!["Gio-2.0"]);
        assert!(config.verbose);
        assert!(config.print);
    }

    #[test]
    fn test_generate_config_build_type_defaults() {
        let config = Config::default();
        assert_eq!(
            config.generate_config(Environment::Gjs).build_type,
            BuildType::Lib
        );
        assert_eq!(
            config.generate_config(Environment::Node).build_type,
            BuildType::Types
        );

        let forced = Config {
            build_type: Some(BuildType::Types),
            ..Config::default()
        };
        assert_eq!(
            forced.generate_config(Environment::Gjs).build_type,
            BuildType::Types
        );
    }

    #[test]
    fn test_print_disables_output_dir() {
        let config = Config {
            print: true,
            ..Config::default()
        };
        let generate = config.generate_config(Environment::Node);
        assert_eq!(generate.outdir, None);
        assert_eq!(generate.environment_dir(), None);

        let generate = Config::default().generate_config(Environment::Node);
        assert_eq!(
            generate.environment_dir(),
            Some(PathBuf::from("@types/node-gtk"))
        );
    }

    #[test]
    fn test_load_prefers_local_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(LOCAL_CONFIG_FILE), "outdir = \"out\"").expect("write");
        let config = Config::load(None, dir.path()).expect("loads");
        assert_eq!(config.outdir, PathBuf::from("out"));

        let missing = dir.path().join("missing.toml");
        assert!(Config::load(Some(&missing), dir.path()).is_err());
    }
}
