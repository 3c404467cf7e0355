//! Component classification and value resolution.
//!
//! The decision table reconciles heterogeneous, often-missing metadata into a
//! flat name -> value map. Missing attributes are ordinary branches here; no
//! lookup is allowed to fail the pass.
use crate::registry::{ComponentAdapter, ComponentCatalog};
use crate::roots::{self, RootMap};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// How a component resolved during enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Versioned,
    Stdlib,
    NamespaceOnly,
    PathOnly,
    Builtin,
    Opaque,
}

/// Output of one discovery pass over the catalog.
#[derive(Debug, Default)]
pub struct Enumeration {
    /// name -> reportable value (version, normalized path, or fallback).
    pub module_versions: BTreeMap<String, String>,
    /// Resolved paths that matched no install root: likely local checkouts.
    pub candidates: BTreeSet<(String, PathBuf)>,
    /// name -> classification for every component inspected.
    pub classifications: BTreeMap<String, Classification>,
}

/// Enumerate the catalog in two passes: top-level names first, then depth-2
/// dotted names whose first segment turned out to be a namespace. Deeper
/// nesting is never inspected.
pub fn enumerate_components(catalog: &ComponentCatalog, roots: &RootMap, full: bool) -> Enumeration {
    let mut out = Enumeration::default();
    let mut namespaces = BTreeSet::new();

    for (name, component) in catalog {
        if name.contains('.') {
            continue;
        }
        resolve_component(name, component.as_ref(), roots, full, true, &mut out, &mut namespaces);
    }

    for (name, component) in catalog {
        let mut segments = name.split('.');
        let (Some(first), Some(_), None) = (segments.next(), segments.next(), segments.next())
        else {
            continue;
        };
        if !namespaces.contains(first) {
            continue;
        }
        resolve_component(name, component.as_ref(), roots, full, false, &mut out, &mut namespaces);
    }

    out
}

fn resolve_component(
    name: &str,
    component: &dyn ComponentAdapter,
    roots: &RootMap,
    full: bool,
    top_level: bool,
    out: &mut Enumeration,
    namespaces: &mut BTreeSet<String>,
) {
    let mut normalized = None;
    if let Some(path) = component.try_source_path() {
        let token_path = roots.normalize(&path.to_string_lossy());
        // A path that survived normalization as a raw absolute path belongs
        // to no known install root: remember it for git cross-referencing.
        // This happens before the version check so a versioned local
        // checkout still gets a repository record.
        if Path::new(&token_path).is_absolute() {
            out.candidates.insert((name.to_string(), path));
        }
        normalized = Some(token_path);
    }

    if let Some(version) = component.try_version() {
        out.module_versions.insert(name.to_string(), version);
        out.classifications
            .insert(name.to_string(), Classification::Versioned);
        return;
    }

    let Some(token_path) = normalized else {
        if component.is_builtin() {
            out.classifications
                .insert(name.to_string(), Classification::Builtin);
            return;
        }
        if top_level {
            // Retained for pass-2 matching; nothing is emitted for the bare
            // namespace name itself.
            namespaces.insert(name.to_string());
            out.classifications
                .insert(name.to_string(), Classification::NamespaceOnly);
            return;
        }
        out.module_versions
            .insert(name.to_string(), component.describe());
        out.classifications
            .insert(name.to_string(), Classification::Opaque);
        return;
    };

    if roots::is_stdlib(&token_path) {
        out.classifications
            .insert(name.to_string(), Classification::Stdlib);
        return;
    }

    out.classifications
        .insert(name.to_string(), Classification::PathOnly);
    let value = if full || token_path.starts_with('<') {
        token_path
    } else {
        let base = Path::new(&token_path)
            .file_name()
            .map(|base| base.to_string_lossy().to_string());
        match base {
            Some(base) => format!(".../{base}"),
            None => token_path,
        }
    };
    out.module_versions.insert(name.to_string(), value);
}

#[cfg(test)]
#[path = "enumerate_tests.rs"]
mod tests;
