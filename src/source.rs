//! Loaded sources: a module list paired with whatever produced it.
//!
//! A source opened from a shared library keeps the library mapped for the rest
//! of the process. Module vtables and every instance a module constructs point
//! into that library's code, so the handle is wrapped in [`ManuallyDrop`] and
//! never closed, even when the source itself is dropped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use modreg::source::LoadedSource;
//!
//! // "/opt/lab/sparrow" also finds "/opt/lab/libsparrow.so"
//! let source = LoadedSource::open("/opt/lab/sparrow")?;
//! for name in source.module_names() {
//!     println!("{name}");
//! }
//! ```

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fmt;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

use libloading::Library;
use modreg_api::{ModuleFactory, ModuleRef, FACTORY_SYMBOL};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Where the modules of a [`LoadedSource`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// A shared library opened from this path.
    File(PathBuf),
    /// A library handle the caller opened.
    Handle,
    /// A module registered from inside the process.
    InProcess,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::File(path) => write!(f, "{}", path.display()),
            SourceOrigin::Handle => f.write_str("library handle"),
            SourceOrigin::InProcess => f.write_str("in-process module"),
        }
    }
}

/// Modules produced by one library, or a single in-process module.
pub struct LoadedSource {
    origin: SourceOrigin,
    modules: Vec<ModuleRef>,
    // Never dropped: see the module documentation.
    library: Option<ManuallyDrop<Library>>,
}

impl LoadedSource {
    /// Open the shared library at `path` and collect its modules.
    ///
    /// The path is tried as given, then decorated with the platform's library
    /// prefix and suffix, then with the suffix alone.
    pub fn open(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let requested = path.as_ref();
        let resolved = decorated_candidates(requested)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| RegistryError::LibraryNotFound(requested.to_path_buf()))?;

        debug!(path = %resolved.display(), "opening module library");

        // SAFETY: mapping a library runs its initializers. Module libraries are
        // trusted code running with full process privilege.
        #[allow(unsafe_code)]
        let library = unsafe { Library::new(&resolved) }.map_err(|source| {
            RegistryError::LibraryLoad {
                path: resolved.clone(),
                source,
            }
        })?;

        Self::with_origin(library, SourceOrigin::File(resolved))
    }

    /// Collect the modules of a library the caller has already opened.
    pub fn from_library(library: Library) -> RegistryResult<Self> {
        Self::with_origin(library, SourceOrigin::Handle)
    }

    /// Wrap a module living in this process. Never fails.
    pub fn from_module(module: ModuleRef) -> Self {
        Self {
            origin: SourceOrigin::InProcess,
            modules: vec![module],
            library: None,
        }
    }

    fn with_origin(library: Library, origin: SourceOrigin) -> RegistryResult<Self> {
        // SAFETY: the symbol is declared by `export_modules!` with exactly the
        // `ModuleFactory` signature. The function pointer is copied out while
        // the library is alive, and the library is never unloaded afterwards.
        #[allow(unsafe_code)]
        let factory: ModuleFactory = unsafe {
            let symbol = library
                .get::<ModuleFactory>(FACTORY_SYMBOL.as_bytes())
                .map_err(|source| RegistryError::MissingEntryPoint {
                    origin: origin.to_string(),
                    source,
                })?;
            *symbol
        };

        let modules = factory();
        debug!(%origin, count = modules.len(), "module factory returned");

        Ok(Self {
            origin,
            modules,
            library: Some(ManuallyDrop::new(library)),
        })
    }

    /// Where the modules came from.
    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    /// The modules in the order the factory returned them.
    pub fn modules(&self) -> &[ModuleRef] {
        &self.modules
    }

    /// Module names in factory order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.modules.iter().map(|module| module.name())
    }

    /// Whether this source keeps a library mapped.
    pub fn is_library(&self) -> bool {
        self.library.is_some()
    }
}

impl fmt::Debug for LoadedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedSource")
            .field("origin", &self.origin)
            .field("modules", &self.module_names().collect::<Vec<_>>())
            .finish()
    }
}

/// `path`, then `<dir>/<prefix><name><suffix>`, then `<dir>/<name><suffix>`.
fn decorated_candidates(path: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];

    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        for decorated in [
            format!("{DLL_PREFIX}{name}{DLL_SUFFIX}"),
            format!("{name}{DLL_SUFFIX}"),
        ] {
            let candidate = dir.join(decorated);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use modreg_sample::{shared_sample_module, SAMPLE_MODULE_NAME};
    use tempfile::TempDir;

    #[test]
    fn test_decorated_candidates_order() {
        let candidates = decorated_candidates(Path::new("/opt/lab/sparrow"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/opt/lab/sparrow"),
                PathBuf::from(format!("/opt/lab/{DLL_PREFIX}sparrow{DLL_SUFFIX}")),
                PathBuf::from(format!("/opt/lab/sparrow{DLL_SUFFIX}")),
            ]
        );
    }

    #[test]
    fn test_missing_library_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = LoadedSource::open(temp_dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, RegistryError::LibraryNotFound(_)));
    }

    #[test]
    fn test_open_finds_decorated_name() {
        let temp_dir = TempDir::new().unwrap();
        let decorated = temp_dir
            .path()
            .join(format!("{DLL_PREFIX}broken{DLL_SUFFIX}"));
        std::fs::write(&decorated, b"not a shared library").unwrap();

        // Found through decoration, then rejected by the loader.
        match LoadedSource::open(temp_dir.path().join("broken")).unwrap_err() {
            RegistryError::LibraryLoad { path, .. } => assert_eq!(path, decorated),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_in_process_source() {
        let source = LoadedSource::from_module(shared_sample_module());
        assert_eq!(source.origin(), &SourceOrigin::InProcess);
        assert!(!source.is_library());
        assert_eq!(source.module_names().collect::<Vec<_>>(), [SAMPLE_MODULE_NAME]);
        assert!(format!("{source:?}").contains(SAMPLE_MODULE_NAME));
    }
}
