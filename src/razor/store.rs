//! Template store
//!
//!     [Razor] compiles template text and template files on demand and keeps the results.
//!     Each distinct (source, options) pair compiles at most once, even when several threads
//!     ask for it at the same time; the compiled template is then shared through an `Arc`.
//!
//!     Files are looked up by name under each configured view root in order. A missing file
//!     reports every path that was tried.

use std::collections::HashMap;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;
use serde::Serialize;

use super::compile;
use super::config::{CompileOptions, RazorConfig, StoreConfig};
use super::error::{CompileError, StoreError};
use super::template::CompiledTemplate;

type Slot = Arc<OnceCell<Arc<CompiledTemplate>>>;

#[derive(Debug, Default)]
pub struct Razor {
    options: CompileOptions,
    store: StoreConfig,
    sources: Mutex<HashMap<(String, CompileOptions), Slot>>,
    files: Mutex<HashMap<(PathBuf, CompileOptions), Slot>>,
}

impl Razor {
    pub fn new(config: RazorConfig) -> Self {
        Razor {
            options: config.compile,
            store: config.store,
            ..Self::default()
        }
    }

    pub fn with_view_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.store.view_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compiles `text`, or returns the template compiled earlier for the same text.
    pub fn compile(&self, text: &str) -> Result<Arc<CompiledTemplate>, CompileError> {
        if !self.store.cache {
            return compile(text, &self.options).map(Arc::new);
        }
        let slot = slot(&self.sources, (text.to_string(), self.options));
        cached(&slot, "source", || compile(text, &self.options))
    }

    pub fn render<S: Serialize + ?Sized>(&self, text: &str, model: &S) -> Result<String, StoreError> {
        let template = self.compile(text).map_err(|error| StoreError::Compile {
            name: "<text>".to_string(),
            error,
        })?;
        Ok(template.render_to_string(model)?)
    }

    /// Finds `name` under the view roots.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let tried: Vec<PathBuf> = self
            .store
            .view_roots
            .iter()
            .map(|root| root.join(name))
            .collect();
        match tried.iter().find(|path| path.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(StoreError::NotFound {
                name: name.to_string(),
                tried,
            }),
        }
    }

    pub fn compile_file(&self, name: &str) -> Result<Arc<CompiledTemplate>, StoreError> {
        let path = self.resolve(name)?;
        let build = || -> Result<CompiledTemplate, StoreError> {
            let text = read(&path)?;
            compile(&text, &self.options).map_err(|error| StoreError::Compile {
                name: name.to_string(),
                error,
            })
        };
        if !self.store.cache {
            return build().map(Arc::new);
        }
        let slot = slot(&self.files, (path.clone(), self.options));
        cached(&slot, "file", build)
    }

    pub fn render_file<S: Serialize + ?Sized>(
        &self,
        name: &str,
        model: &S,
    ) -> Result<String, StoreError> {
        let template = self.compile_file(name)?;
        Ok(template.render_to_string(model)?)
    }

    /// Number of compiled templates held.
    pub fn cached_count(&self) -> usize {
        filled(&self.sources) + filled(&self.files)
    }
}

fn filled<K>(map: &Mutex<HashMap<K, Slot>>) -> usize {
    map.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .filter(|slot| slot.get().is_some())
        .count()
}

fn read(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|error| StoreError::Read {
        path: path.to_path_buf(),
        error,
    })
}

fn slot<K: Eq + Hash>(map: &Mutex<HashMap<K, Slot>>, key: K) -> Slot {
    map.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_default()
        .clone()
}

fn cached<E>(
    slot: &Slot,
    what: &str,
    build: impl FnOnce() -> Result<CompiledTemplate, E>,
) -> Result<Arc<CompiledTemplate>, E> {
    if let Some(template) = slot.get() {
        tracing::debug!(what, "template cache hit");
        return Ok(template.clone());
    }
    let template = slot.get_or_try_init(|| {
        tracing::debug!(what, "template cache miss");
        build().map(Arc::new)
    })?;
    Ok(template.clone())
}
