use std::{cell::RefCell,
          collections::HashMap,
          path::{Path, PathBuf},
          rc::Rc};

use crate::{error::RuntimeError, interpreter::value::environment::Environment};

/// Module resolver and cache.
///
/// Resolution order for a relative path: the current working directory, then
/// the base directory, then `base/lib`. The base directory is `ZELO_PATH`
/// when set, otherwise the current working directory. Paths without an
/// extension get `.z` appended first.
///
/// `require` results are cached by resolved path; `include` bypasses the
/// cache. The loading stack detects circular requires.
#[derive(Debug)]
pub struct ModuleSystem {
    base_path: PathBuf,
    cache:     HashMap<PathBuf, Rc<RefCell<Environment>>>,
    loading:   Vec<PathBuf>,
}

impl Default for ModuleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleSystem {
    /// Creates a module system with the base directory taken from
    /// `ZELO_PATH`, falling back to the current working directory.
    #[must_use]
    pub fn new() -> Self {
        let base_path = std::env::var_os("ZELO_PATH")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();

        Self { base_path,
               cache: HashMap::new(),
               loading: Vec::new() }
    }

    /// Resolves a module path string to an existing file.
    ///
    /// # Errors
    /// `ModuleNotFound` when no candidate exists.
    pub fn resolve(&self, module: &str, line: usize) -> Result<PathBuf, RuntimeError> {
        let mut path = PathBuf::from(module);

        if path.is_absolute() {
            return Ok(path);
        }

        if path.extension().is_none() {
            path.set_extension("z");
        }

        if let Ok(cwd) = std::env::current_dir() {
            let candidate = cwd.join(&path);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        let candidate = self.base_path.join(&path);
        if candidate.exists() {
            return Ok(candidate);
        }

        let candidate = self.base_path.join("lib").join(&path);
        if candidate.exists() {
            return Ok(candidate);
        }

        Err(RuntimeError::ModuleNotFound { path: module.to_string(),
                                           line })
    }

    /// Returns the cached environment for a resolved path, if any.
    #[must_use]
    pub fn cached(&self, path: &Path) -> Option<Rc<RefCell<Environment>>> {
        self.cache.get(path).cloned()
    }

    /// Records a loaded module under its resolved path.
    pub fn insert_cache(&mut self, path: PathBuf, env: Rc<RefCell<Environment>>) {
        self.cache.insert(path, env);
    }

    /// Returns `true` when `path` is somewhere on the loading stack.
    #[must_use]
    pub fn is_loading(&self, path: &Path) -> bool {
        self.loading.iter().any(|loading| loading == path)
    }

    /// Pushes a path onto the loading stack for cycle detection.
    pub fn begin_loading(&mut self, path: PathBuf) {
        self.loading.push(path);
    }

    /// Pops the most recent path off the loading stack.
    pub fn end_loading(&mut self) {
        self.loading.pop();
    }
}
