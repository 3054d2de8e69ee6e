//! Discovery of module libraries on disk.
//!
//! Candidate directories are probed in a fixed order:
//!
//! 1. the running executable's directory
//! 2. the adjacent directories (`module`, `modules`, `lib` by default) next to it
//! 3. the directory of the library containing this crate, plus its adjacent
//!    directories when they differ from the executable's
//! 4. every directory in the search-path variable (`MODREG_MODULE_PATH`)
//! 5. extra directories from configuration
//!
//! Within a directory, a file is a module library when its name contains the
//! library marker followed by the platform's shared-library suffix, for
//! example `sample.module.so` on Linux or `sample.module.dll` on Windows.
//! Files are returned sorted by name so discovery order is stable.

use std::env::consts::DLL_SUFFIX;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RegistryConfig;

/// Process-dependent starting points of a directory search.
///
/// Split out from [`candidate_directories`] so the ordering rules can be
/// exercised without depending on where the test binary lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRoots {
    /// Directory of the running executable.
    pub executable_dir: Option<PathBuf>,
    /// Directory of the library containing the registry code.
    pub own_library_dir: Option<PathBuf>,
    /// Raw value of the search-path variable.
    pub search_path: Option<OsString>,
}

impl SearchRoots {
    /// Roots of the current process.
    pub fn current(config: &RegistryConfig) -> Self {
        let executable_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Self {
            own_library_dir: own_library_dir().or_else(|| executable_dir.clone()),
            executable_dir,
            search_path: std::env::var_os(&config.search.path_variable),
        }
    }
}

/// Whether `path` names a module library under `marker`.
pub fn is_module_library(path: &Path, marker: &str) -> bool {
    let pattern = format!("{marker}{DLL_SUFFIX}");
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(&pattern))
}

/// Ordered, duplicate-free list of directories to probe.
pub fn candidate_directories(config: &RegistryConfig, roots: &SearchRoots) -> Vec<PathBuf> {
    let search = &config.search;
    let mut dirs = Vec::new();

    if search.executable_dirs {
        let exe_parent = roots.executable_dir.as_deref().and_then(Path::parent);

        if let Some(exe_dir) = &roots.executable_dir {
            push_unique(&mut dirs, exe_dir.clone());
            if let Some(parent) = exe_parent {
                push_adjacent(&mut dirs, parent, &search.adjacent_dirs);
            }
        }

        if let Some(own_dir) = &roots.own_library_dir {
            push_unique(&mut dirs, own_dir.clone());
            if let Some(parent) = own_dir.parent().filter(|parent| Some(*parent) != exe_parent) {
                push_adjacent(&mut dirs, parent, &search.adjacent_dirs);
            }
        }
    }

    if let Some(value) = &roots.search_path {
        for dir in std::env::split_paths(value) {
            if dir.as_os_str().is_empty() {
                continue;
            }
            if dir.is_dir() {
                push_unique(&mut dirs, dir);
            } else {
                debug!(dir = %dir.display(), "search path entry is not a directory");
            }
        }
    }

    for dir in &search.extra_dirs {
        push_unique(&mut dirs, dir.clone());
    }

    dirs
}

/// Candidate directories of the current process.
pub fn search_directories(config: &RegistryConfig) -> Vec<PathBuf> {
    candidate_directories(config, &SearchRoots::current(config))
}

/// Module libraries directly inside `dir`, sorted by file name.
pub fn library_files(dir: &Path, marker: &str) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_module_library(path, marker))
        .collect();
    files.sort();
    Ok(files)
}

/// Every module library found in the candidate directories, in probe order.
///
/// Directories that do not exist or cannot be read are skipped.
pub fn discover_libraries(config: &RegistryConfig, dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut libraries = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "module directory does not exist");
            continue;
        }

        match library_files(dir, &config.library_marker) {
            Ok(files) => {
                debug!(dir = %dir.display(), count = files.len(), "probed module directory");
                for file in files {
                    if !libraries.contains(&file) {
                        libraries.push(file);
                    }
                }
            }
            Err(e) => debug!(dir = %dir.display(), error = %e, "failed to read module directory"),
        }
    }

    libraries
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

fn push_adjacent(dirs: &mut Vec<PathBuf>, parent: &Path, names: &[String]) {
    for name in names {
        push_unique(dirs, parent.join(name));
    }
}

/// Directory of the shared object containing this function.
#[cfg(any(target_os = "linux", target_os = "macos"))]
#[allow(unsafe_code)]
fn own_library_dir() -> Option<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    // SAFETY: Dl_info is plain data; an all-zero value is valid.
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    let address = own_library_dir as *const libc::c_void;

    // SAFETY: `address` points into this object's code and `info` is writable.
    let found = unsafe { libc::dladdr(address, &mut info) };
    if found == 0 || info.dli_fname.is_null() {
        return None;
    }

    // SAFETY: dladdr returned a NUL-terminated name owned by the loader.
    let name = unsafe { CStr::from_ptr(info.dli_fname) };
    if name.to_bytes().is_empty() {
        return None;
    }

    let path = PathBuf::from(OsStr::from_bytes(name.to_bytes()));
    let path = std::fs::canonicalize(&path).unwrap_or(path);
    path.parent().map(Path::to_path_buf)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn own_library_dir() -> Option<PathBuf> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn roots(exe: &str, own: &str) -> SearchRoots {
        SearchRoots {
            executable_dir: Some(PathBuf::from(exe)),
            own_library_dir: Some(PathBuf::from(own)),
            search_path: None,
        }
    }

    #[test]
    fn test_library_naming_pattern() {
        let marker = ".module";
        assert!(is_module_library(
            Path::new(&format!("/lab/sample.module{DLL_SUFFIX}")),
            marker
        ));
        assert!(is_module_library(
            Path::new(&format!("libsparrow.module{DLL_SUFFIX}.1")),
            marker
        ));
        assert!(!is_module_library(
            Path::new(&format!("/lab/sample{DLL_SUFFIX}")),
            marker
        ));
        assert!(!is_module_library(Path::new("/lab/sample.module.txt"), marker));
    }

    #[test]
    fn test_executable_relative_order() {
        let config = RegistryConfig::default();
        let dirs = candidate_directories(&config, &roots("/app/bin", "/app/bin"));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/app/bin"),
                PathBuf::from("/app/module"),
                PathBuf::from("/app/modules"),
                PathBuf::from("/app/lib"),
            ]
        );
    }

    #[test]
    fn test_own_library_siblings_when_parent_differs() {
        let config = RegistryConfig::default();
        let dirs = candidate_directories(&config, &roots("/app/bin", "/opt/reg/lib"));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/app/bin"),
                PathBuf::from("/app/module"),
                PathBuf::from("/app/modules"),
                PathBuf::from("/app/lib"),
                PathBuf::from("/opt/reg/lib"),
                PathBuf::from("/opt/reg/module"),
                PathBuf::from("/opt/reg/modules"),
            ]
        );
    }

    #[test]
    fn test_search_path_and_extra_dirs() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let missing = first.path().join("missing");

        let mut config = RegistryConfig::default();
        config.search.executable_dirs = false;
        config.search.extra_dirs = vec![PathBuf::from("/srv/modules"), first.path().into()];

        let search_path = std::env::join_paths([
            first.path(),
            Path::new(""),
            missing.as_path(),
            second.path(),
        ])
        .unwrap();
        let roots = SearchRoots {
            search_path: Some(search_path),
            ..roots("/app/bin", "/app/bin")
        };

        assert_eq!(
            candidate_directories(&config, &roots),
            vec![
                first.path().to_path_buf(),
                second.path().to_path_buf(),
                PathBuf::from("/srv/modules"),
            ]
        );
    }

    #[test]
    fn test_library_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        for name in [
            format!("zeta.module{DLL_SUFFIX}"),
            format!("alpha.module{DLL_SUFFIX}"),
            format!("plain{DLL_SUFFIX}"),
            "notes.txt".to_string(),
        ] {
            std::fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(temp_dir.path().join(format!("dir.module{DLL_SUFFIX}"))).unwrap();

        let files = library_files(temp_dir.path(), ".module").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                format!("alpha.module{DLL_SUFFIX}"),
                format!("zeta.module{DLL_SUFFIX}"),
            ]
        );
    }

    #[test]
    fn test_discover_skips_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let library = temp_dir.path().join(format!("one.module{DLL_SUFFIX}"));
        std::fs::write(&library, b"").unwrap();

        let dirs = vec![
            temp_dir.path().join("absent"),
            temp_dir.path().to_path_buf(),
            temp_dir.path().to_path_buf(),
        ];
        let found = discover_libraries(&RegistryConfig::default(), &dirs);
        assert_eq!(found, vec![library]);
    }
}
