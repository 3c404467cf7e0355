//! Loaded-component discovery for the host process.
//!
//! The enumerator never inspects components directly; it goes through the
//! adapter capability below, so catalogs can be assembled from shared-object
//! mappings, programmatic registration, or test fixtures alike.
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Introspection capability for one loaded component.
///
/// Every accessor is total: a missing attribute is a `None`, never an error.
pub trait ComponentAdapter {
    /// Declared version, when the component carries one.
    fn try_version(&self) -> Option<String>;

    /// Source artifact path, when the component has one on disk.
    fn try_source_path(&self) -> Option<PathBuf>;

    /// Host builtins have no artifact and carry no provenance value.
    fn is_builtin(&self) -> bool {
        false
    }

    /// Last-resort rendering used when nothing else resolves.
    fn describe(&self) -> String;
}

/// Catalog of currently loaded components, keyed by dotted name.
pub type ComponentCatalog = BTreeMap<String, Box<dyn ComponentAdapter>>;

/// Directly registered component facts, for embedding applications and their
/// plugin families.
#[derive(Debug, Clone, Default)]
pub struct ComponentRecord {
    pub version: Option<String>,
    pub path: Option<PathBuf>,
    pub builtin: bool,
    pub summary: Option<String>,
}

impl ComponentRecord {
    pub fn versioned(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..Self::default()
        }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn builtin() -> Self {
        Self {
            builtin: true,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl ComponentAdapter for ComponentRecord {
    fn try_version(&self) -> Option<String> {
        self.version.clone()
    }

    fn try_source_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn is_builtin(&self) -> bool {
        self.builtin
    }

    fn describe(&self) -> String {
        self.summary
            .clone()
            .unwrap_or_else(|| "<unresolved component>".to_string())
    }
}

/// A shared object mapped into the process image. Sonames carry ABI numbers,
/// not software versions, so the path is the only provenance attribute.
struct SharedObject {
    path: PathBuf,
}

impl ComponentAdapter for SharedObject {
    fn try_version(&self) -> Option<String> {
        None
    }

    fn try_source_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn describe(&self) -> String {
        format!("<shared object {}>", self.path.display())
    }
}

const PROC_MAPS: &str = "/proc/self/maps";

/// Pseudo-mappings that count as loaded components without an artifact.
const PSEUDO_COMPONENTS: &[&str] = &["vdso"];

/// Build the host catalog from the process's mapped shared objects.
///
/// This is the one registry access that may fail hard: when the mapping table
/// cannot be read there is nothing to enumerate.
pub fn host_catalog() -> Result<ComponentCatalog> {
    let maps = std::fs::read_to_string(PROC_MAPS).with_context(|| format!("read {PROC_MAPS}"))?;
    Ok(catalog_from_maps(&maps))
}

fn catalog_from_maps(maps: &str) -> ComponentCatalog {
    let mut catalog = ComponentCatalog::new();
    for line in maps.lines() {
        let Some(backing) = line.split_whitespace().nth(5) else {
            continue;
        };
        if let Some(pseudo) = backing
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if PSEUDO_COMPONENTS.contains(&pseudo) {
                catalog
                    .entry(pseudo.to_string())
                    .or_insert_with(|| Box::new(ComponentRecord::builtin()));
            }
            continue;
        }
        if !backing.starts_with('/') {
            continue;
        }
        let path = Path::new(backing);
        let Some(name) = soname_stem(path) else {
            continue;
        };
        catalog.entry(name).or_insert_with(|| {
            Box::new(SharedObject {
                path: path.to_path_buf(),
            })
        });
    }
    catalog
}

/// Component name for a shared object: the file name up to the `.so` suffix,
/// ABI version digits stripped (`libssl.so.3` -> `libssl`).
fn soname_stem(path: &Path) -> Option<String> {
    static SONAME: OnceLock<Regex> = OnceLock::new();
    let pattern = SONAME
        .get_or_init(|| Regex::new(r"^(?P<stem>.+?)\.so(?:\.[0-9][0-9.]*)?$").expect("soname pattern"));
    let file_name = path.file_name()?.to_str()?;
    let captures = pattern.captures(file_name)?;
    Some(captures["stem"].to_string())
}

/// Dynamic-loader search path for the FULL report: `LD_LIBRARY_PATH` entries
/// followed by the default system library directories.
pub fn loader_search_paths() -> Vec<String> {
    let mut paths = Vec::new();
    if let Some(raw) = env::var_os("LD_LIBRARY_PATH") {
        for entry in env::split_paths(&raw) {
            let entry = entry.to_string_lossy().to_string();
            if !entry.is_empty() && !paths.contains(&entry) {
                paths.push(entry);
            }
        }
    }
    for (_, dir) in crate::roots::SYSTEM_LIB_ROOTS {
        let dir = (*dir).to_string();
        if !paths.contains(&dir) {
            paths.push(dir);
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soname_stems_drop_abi_versions() {
        assert_eq!(
            soname_stem(Path::new("/usr/lib/libssl.so.3")),
            Some("libssl".to_string())
        );
        assert_eq!(
            soname_stem(Path::new("/usr/lib/libstdc++.so.6.0.32")),
            Some("libstdc++".to_string())
        );
        assert_eq!(
            soname_stem(Path::new("/opt/app/libplugin.so")),
            Some("libplugin".to_string())
        );
        assert_eq!(soname_stem(Path::new("/usr/bin/provstamp")), None);
    }

    #[test]
    fn catalog_reads_mappings_and_pseudo_entries() {
        let maps = "\
7f0000000000-7f0000001000 r-xp 00000000 08:01 100 /usr/lib/libm.so.6
7f0000002000-7f0000003000 r-xp 00000000 08:01 100 /usr/lib/libm.so.6
7f0000004000-7f0000005000 r-xp 00000000 08:01 101 /opt/devwork/libexp.so
7f0000006000-7f0000007000 r-xp 00000000 00:00 0 [vdso]
7f0000008000-7f0000009000 rw-p 00000000 00:00 0
7f000000a000-7f000000b000 r-xp 00000000 08:01 102 /usr/bin/tool
";
        let catalog = catalog_from_maps(maps);
        let names: Vec<&str> = catalog.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["libexp", "libm", "vdso"]);
        assert!(catalog["vdso"].is_builtin());
        assert_eq!(
            catalog["libexp"].try_source_path(),
            Some(PathBuf::from("/opt/devwork/libexp.so"))
        );
    }

    #[test]
    fn loader_search_paths_include_system_dirs() {
        let paths = loader_search_paths();
        assert!(paths.iter().any(|path| path == "/usr/lib"));
    }
}
