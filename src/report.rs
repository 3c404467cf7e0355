//! Report assembly: the SUMMARY/FULL orchestration over the probes.
//!
//! Apart from the timestamp, a report is a pure function of process state and
//! filesystem contents at the moment of the call. No per-item failure below
//! the registry access is allowed to abort it.
use crate::assets::{self, AssetRecord, PeekSource};
use crate::config::ConfigStore;
use crate::enumerate;
use crate::git::{self, RepoRecord};
use crate::gpu::{self, GpuReport};
use crate::platform;
use crate::registry::{self, ComponentCatalog, ComponentRecord};
use crate::roots::{self, RootMap};
use crate::util::now_iso8601;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Compiler version the binary was built with (see build.rs).
pub const RUNTIME_VERSION: &str = env!("PROVSTAMP_RUSTC_VERSION");

/// The provenance report. SUMMARY mode serializes exactly the first four
/// fields; FULL mode adds the environment, platform, accelerator, and asset
/// sections.
#[derive(Serialize, Debug)]
pub struct Report {
    pub time: String,
    pub runtime: String,
    pub module_versions: BTreeMap<String, String>,
    pub git_versions: BTreeMap<String, RepoRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_paths: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpus: Option<GpuReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<BTreeMap<String, AssetRecord>>,
}

/// Gather provenance for the host process.
///
/// The only hard failure is the component registry being inaccessible;
/// everything below that degrades per entry.
pub fn gather(config: &ConfigStore, asset_paths: &[PathBuf], full: bool) -> Result<Report> {
    let mut catalog = registry::host_catalog()?;
    catalog.insert(
        env!("CARGO_PKG_NAME").to_string(),
        Box::new(ComponentRecord::versioned(env!("CARGO_PKG_VERSION"))),
    );
    let root_pairs = roots::host_install_roots(config);
    let peek = assets::CommandPeek::from_config(config);
    Ok(gather_with(&catalog, &root_pairs, &peek, asset_paths, full))
}

/// Pure orchestration over injected collaborators: the seam used by embedding
/// applications and tests.
pub fn gather_with(
    catalog: &ComponentCatalog,
    root_pairs: &[(String, PathBuf)],
    peek: &dyn PeekSource,
    asset_paths: &[PathBuf],
    full: bool,
) -> Report {
    let roots = RootMap::new(root_pairs);
    let enumeration = enumerate::enumerate_components(catalog, &roots, full);
    let git_versions = git::check_candidates(&enumeration.candidates, full);

    let mut report = Report {
        time: now_iso8601(),
        runtime: RUNTIME_VERSION.to_string(),
        module_versions: enumeration.module_versions,
        git_versions,
        executable: None,
        args: None,
        search_paths: None,
        config_paths: None,
        platform: None,
        gpus: None,
        assets: None,
    };
    if !full {
        return report;
    }

    report.executable = std::env::current_exe()
        .ok()
        .map(|exe| exe.to_string_lossy().to_string());
    report.args = Some(std::env::args().collect());
    report.search_paths = Some(registry::loader_search_paths());
    report.config_paths = Some(
        roots
            .pairs()
            .map(|(name, path)| (name.to_string(), path.to_string()))
            .collect(),
    );
    report.platform = Some(platform::platform_facts());
    report.gpus = Some(gpu::gpu_facts());
    report.assets = Some(assets::fingerprint_assets(asset_paths, peek));
    report
}
