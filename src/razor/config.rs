//! Configuration for compiling and storing templates
//!
//! `defaults/razor.default.toml` is embedded into the crate. A project's `razor.toml`, an
//! explicit file and single-key overrides are layered on top of it, in that order, via
//! [`Loader`] before deserializing into [`RazorConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../../defaults/razor.default.toml");

/// Per-project configuration file, picked up from the working directory when present.
pub const PROJECT_FILE: &str = "razor.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct RazorConfig {
    pub compile: CompileOptions,
    pub store: StoreConfig,
}

/// Options a single compilation runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct CompileOptions {
    pub ignore_whitespace: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub view_roots: Vec<PathBuf>,
    pub cache: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            view_roots: vec![PathBuf::new()],
            cache: true,
        }
    }
}

/// Layers configuration sources over the embedded defaults. Later layers win.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Loader {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layers `dir/razor.toml` if it exists.
    pub fn with_project_dir(self, dir: impl AsRef<Path>) -> Self {
        self.layer(&dir.as_ref().join(PROJECT_FILE), false)
    }

    /// Layers a file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Overrides one dotted key, e.g. `compile.debug` from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<RazorConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}
