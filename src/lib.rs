//! Provenance gathering for experiment reproducibility.
//!
//! The core produces a structured report of a running process's software
//! environment: which components are loaded and at what versions, which come
//! from local source trees under version control, integrity fingerprints of
//! named artifacts, and ancillary platform/accelerator facts. Reports come in
//! two fidelity modes; see [`report::gather`].

pub mod assets;
pub mod cli;
pub mod config;
pub mod enumerate;
pub mod git;
pub mod gpu;
pub mod platform;
pub mod registry;
pub mod report;
pub mod roots;
pub mod util;

pub use report::{gather, gather_with, Report};
