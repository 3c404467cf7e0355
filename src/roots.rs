//! Install-root resolution for path normalization.
//!
//! Roots map well-known filesystem locations to symbolic tokens so reports
//! stay readable and avoid raw user paths for packaged installs. A path that
//! matches no root is left alone on purpose: it marks an unpackaged checkout
//! worth version-control cross-referencing.
use crate::config::ConfigStore;
use std::env;
use std::path::PathBuf;

/// System library roots. The shared `syslib` name prefix is what marks a
/// normalized path as a standard-library install.
pub(crate) const SYSTEM_LIB_ROOTS: &[(&str, &str)] = &[
    ("syslib", "/usr/lib"),
    ("syslib64", "/usr/lib64"),
    ("syslib-local", "/usr/local/lib"),
    ("syslib-compat", "/lib"),
    ("syslib-compat64", "/lib64"),
];

const STDLIB_TOKEN_PREFIX: &str = "<syslib";

/// Whether a normalized path begins with a standard-library root token.
pub fn is_stdlib(normalized: &str) -> bool {
    normalized.starts_with(STDLIB_TOKEN_PREFIX)
}

/// Specificity-ordered mapping from install roots to symbolic names.
pub struct RootMap {
    /// (path, name) pairs, longest path first.
    entries: Vec<(String, String)>,
}

impl RootMap {
    /// Build the map, deduplicating by path (first name wins) and ordering by
    /// descending path length so the most specific root is tried first.
    pub fn new(pairs: &[(String, PathBuf)]) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (name, path) in pairs {
            let path = path.to_string_lossy().to_string();
            if path.is_empty() || entries.iter().any(|(seen, _)| *seen == path) {
                continue;
            }
            entries.push((path, name.clone()));
        }
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Replace the first matching root-path substring with `<name>`. Paths
    /// matching no root come back unchanged.
    pub fn normalize(&self, path: &str) -> String {
        for (root, name) in &self.entries {
            if path.contains(root.as_str()) {
                return path.replacen(root.as_str(), &format!("<{name}>"), 1);
            }
        }
        path.to_string()
    }

    /// The (name, path) pairs in specificity order, for FULL-mode reporting.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, name)| (name.as_str(), path.as_str()))
    }
}

/// Assemble the host's named install roots: config-provided roots first (so
/// user naming wins on shared paths), then system library directories,
/// toolchain homes, and the executable's directory.
pub fn host_install_roots(config: &ConfigStore) -> Vec<(String, PathBuf)> {
    let mut roots = config.named_roots();
    for (name, dir) in SYSTEM_LIB_ROOTS {
        roots.push(((*name).to_string(), PathBuf::from(dir)));
    }
    let cargo_home = env::var_os("CARGO_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".cargo")));
    if let Some(dir) = cargo_home {
        roots.push(("cargo-home".to_string(), dir));
    }
    let rustup_home = env::var_os("RUSTUP_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".rustup")));
    if let Some(dir) = rustup_home {
        roots.push(("rustup-home".to_string(), dir));
    }
    if let Some(dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|parent| parent.to_path_buf()))
    {
        roots.push(("exedir".to_string(), dir));
    }
    roots
}
