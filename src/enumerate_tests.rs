use super::{enumerate_components, Classification};
use crate::registry::{ComponentAdapter, ComponentCatalog, ComponentRecord};
use crate::roots::RootMap;
use std::path::PathBuf;

fn roots(pairs: &[(&str, &str)]) -> RootMap {
    let pairs: Vec<(String, PathBuf)> = pairs
        .iter()
        .map(|(name, path)| ((*name).to_string(), PathBuf::from(path)))
        .collect();
    RootMap::new(&pairs)
}

fn catalog(entries: Vec<(&str, ComponentRecord)>) -> ComponentCatalog {
    entries
        .into_iter()
        .map(|(name, record)| {
            (
                name.to_string(),
                Box::new(record) as Box<dyn ComponentAdapter>,
            )
        })
        .collect()
}

#[test]
fn version_attribute_passes_through_exactly() {
    let catalog = catalog(vec![(
        "expkit",
        ComponentRecord::versioned("1.2.3").with_path("/opt/venv/expkit/lib.rs"),
    )]);
    let map = roots(&[("venv", "/opt/venv")]);

    let out = enumerate_components(&catalog, &map, false);
    assert_eq!(out.module_versions.get("expkit").map(String::as_str), Some("1.2.3"));
    assert_eq!(out.classifications.get("expkit"), Some(&Classification::Versioned));
}

#[test]
fn versioned_local_checkout_is_still_a_candidate() {
    let catalog = catalog(vec![(
        "expkit",
        ComponentRecord::versioned("0.9.0").with_path("/opt/devwork/expkit/lib.rs"),
    )]);
    let map = roots(&[("syslib", "/usr/lib")]);

    let out = enumerate_components(&catalog, &map, false);
    assert_eq!(out.module_versions.get("expkit").map(String::as_str), Some("0.9.0"));
    assert!(out.candidates.contains(&(
        "expkit".to_string(),
        PathBuf::from("/opt/devwork/expkit/lib.rs")
    )));
}

#[test]
fn stdlib_paths_are_skipped_entirely() {
    let catalog = catalog(vec![("libm", ComponentRecord::at_path("/usr/lib/libm.so.6"))]);
    let map = roots(&[("syslib", "/usr/lib")]);

    let out = enumerate_components(&catalog, &map, false);
    assert!(out.module_versions.is_empty());
    assert!(out.candidates.is_empty());
    assert_eq!(out.classifications.get("libm"), Some(&Classification::Stdlib));
}

#[test]
fn dev_paths_shorten_in_summary_and_join_the_candidate_set() {
    let catalog = catalog(vec![(
        "foo",
        ComponentRecord::at_path("/opt/devwork/foo/mod.rs"),
    )]);
    let map = roots(&[("syslib", "/usr/lib")]);

    let out = enumerate_components(&catalog, &map, false);
    assert_eq!(out.module_versions.get("foo").map(String::as_str), Some(".../mod.rs"));
    assert!(out
        .candidates
        .contains(&("foo".to_string(), PathBuf::from("/opt/devwork/foo/mod.rs"))));
}

#[test]
fn dev_paths_appear_verbatim_in_full_mode() {
    let catalog = catalog(vec![(
        "foo",
        ComponentRecord::at_path("/opt/devwork/foo/mod.rs"),
    )]);
    let map = roots(&[("syslib", "/usr/lib")]);

    let out = enumerate_components(&catalog, &map, true);
    assert_eq!(
        out.module_versions.get("foo").map(String::as_str),
        Some("/opt/devwork/foo/mod.rs")
    );
}

#[test]
fn token_paths_are_emitted_in_token_form_and_never_probed() {
    let catalog = catalog(vec![(
        "plugin",
        ComponentRecord::at_path("/opt/venv/plugin/lib.rs"),
    )]);
    let map = roots(&[("venv", "/opt/venv")]);

    let out = enumerate_components(&catalog, &map, false);
    assert_eq!(
        out.module_versions.get("plugin").map(String::as_str),
        Some("<venv>/plugin/lib.rs")
    );
    assert!(out.candidates.is_empty());
}

#[test]
fn builtins_are_skipped_without_a_value() {
    let catalog = catalog(vec![("vdso", ComponentRecord::builtin())]);
    let map = roots(&[]);

    let out = enumerate_components(&catalog, &map, false);
    assert!(out.module_versions.is_empty());
    assert_eq!(out.classifications.get("vdso"), Some(&Classification::Builtin));
}

#[test]
fn namespace_families_resolve_in_the_second_pass() {
    let catalog = catalog(vec![
        ("family", ComponentRecord::default()),
        ("family.subpart", ComponentRecord::versioned("2.0.1")),
        ("family.deep.nested", ComponentRecord::versioned("9.9.9")),
    ]);
    let map = roots(&[]);

    let out = enumerate_components(&catalog, &map, false);
    assert_eq!(
        out.module_versions.get("family.subpart").map(String::as_str),
        Some("2.0.1")
    );
    // The bare namespace name is retained, not emitted.
    assert!(!out.module_versions.contains_key("family"));
    assert_eq!(
        out.classifications.get("family"),
        Some(&Classification::NamespaceOnly)
    );
    // Depth three is never inspected.
    assert!(!out.module_versions.contains_key("family.deep.nested"));
}

#[test]
fn dotted_names_without_a_namespace_parent_are_ignored() {
    let catalog = catalog(vec![
        ("other", ComponentRecord::versioned("1.0.0")),
        ("other.sub", ComponentRecord::versioned("1.0.0")),
    ]);
    let map = roots(&[]);

    let out = enumerate_components(&catalog, &map, false);
    assert!(out.module_versions.contains_key("other"));
    assert!(!out.module_versions.contains_key("other.sub"));
}

#[test]
fn unresolvable_second_pass_components_fall_back_to_opaque() {
    let catalog = catalog(vec![
        ("family", ComponentRecord::default()),
        (
            "family.ghost",
            ComponentRecord::default().with_summary("<inline plugin family.ghost>"),
        ),
    ]);
    let map = roots(&[]);

    let out = enumerate_components(&catalog, &map, false);
    assert_eq!(
        out.module_versions.get("family.ghost").map(String::as_str),
        Some("<inline plugin family.ghost>")
    );
    assert_eq!(
        out.classifications.get("family.ghost"),
        Some(&Classification::Opaque)
    );
}
