//! Asset fingerprinting: size, timestamps, and content hashes for named files.
//!
//! Paths are supplied by the caller, never discovered. A failure on one path
//! becomes that path's record; the batch always completes.
use crate::config::ConfigStore;
use crate::util::{iso8601, run_bounded, sha256_file};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const PEEK_TIMEOUT: Duration = Duration::from_secs(30);

/// Fingerprint of one asset, or the error text captured while reading it.
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum AssetRecord {
    Info(AssetInfo),
    Error(String),
}

#[derive(Serialize, Debug, Clone)]
pub struct AssetInfo {
    pub size: u64,
    pub atime: String,
    pub mtime: String,
    pub ctime: String,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peek: Option<Value>,
}

/// Format-specific summarizer capability. Any failure is an omission, never
/// an error for the asset record.
pub trait PeekSource {
    fn peek(&self, path: &Path) -> Option<Value>;
}

/// No summarizer configured.
pub struct NoPeek;

impl PeekSource for NoPeek {
    fn peek(&self, _path: &Path) -> Option<Value> {
        None
    }
}

/// Summarizer commands keyed by asset extension, from the config `[peek]`
/// table. Each command gets the asset path appended and must print JSON on
/// stdout.
pub struct CommandPeek {
    commands: BTreeMap<String, String>,
}

impl CommandPeek {
    pub fn from_config(config: &ConfigStore) -> Self {
        Self {
            commands: config.peek_commands(),
        }
    }
}

impl PeekSource for CommandPeek {
    fn peek(&self, path: &Path) -> Option<Value> {
        let extension = path.extension()?.to_str()?;
        let command_line = self.commands.get(extension)?;
        let words = match shell_words::split(command_line) {
            Ok(words) if !words.is_empty() => words,
            Ok(_) => return None,
            Err(err) => {
                tracing::debug!(extension, error = %err, "unparseable peek command");
                return None;
            }
        };
        let mut command = Command::new(&words[0]);
        command.args(&words[1..]).arg(path);
        let output = run_bounded(&mut command, PEEK_TIMEOUT).ok()?;
        if output.timed_out || !output.status.success() {
            tracing::debug!(extension, "peek command failed; omitting peek");
            return None;
        }
        serde_json::from_slice(&output.stdout).ok()
    }
}

/// Fingerprint each named asset.
pub fn fingerprint_assets(
    paths: &[PathBuf],
    peek: &dyn PeekSource,
) -> BTreeMap<String, AssetRecord> {
    let mut records = BTreeMap::new();
    for path in paths {
        records.insert(path.to_string_lossy().to_string(), fingerprint_one(path, peek));
    }
    records
}

fn fingerprint_one(path: &Path, peek: &dyn PeekSource) -> AssetRecord {
    let info = match stat_and_hash(path) {
        Ok(info) => info,
        Err(err) => return AssetRecord::Error(err.to_string()),
    };
    AssetRecord::Info(AssetInfo {
        peek: peek.peek(path),
        ..info
    })
}

fn stat_and_hash(path: &Path) -> std::io::Result<AssetInfo> {
    use std::os::unix::fs::MetadataExt;

    let meta = std::fs::metadata(path)?;
    let sha256 = sha256_file(path)?;
    Ok(AssetInfo {
        size: meta.len(),
        atime: iso8601(meta.atime(), meta.atime_nsec() as u32),
        mtime: iso8601(meta.mtime(), meta.mtime_nsec() as u32),
        ctime: iso8601(meta.ctime(), meta.ctime_nsec() as u32),
        sha256,
        peek: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use std::io::Write;

    fn write_asset(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create asset");
        file.write_all(bytes).expect("write asset");
        path
    }

    #[test]
    fn known_bytes_hash_stably_and_independently_of_chunking() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Spans two full chunks plus a partial tail.
        let bytes: Vec<u8> = (0..(2 * crate::util::HASH_CHUNK_BYTES + 4096))
            .map(|index| (index % 251) as u8)
            .collect();
        let path = write_asset(&dir, "blob.bin", &bytes);

        let expected = format!("{:x}", Sha256::digest(&bytes));
        let first = sha256_file(&path).expect("hash");
        let second = sha256_file(&path).expect("hash again");
        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[test]
    fn small_files_produce_full_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_asset(&dir, "data.txt", b"hello world");

        let records = fingerprint_assets(&[path.clone()], &NoPeek);
        let record = records.get(&path.to_string_lossy().to_string()).expect("record");
        match record {
            AssetRecord::Info(info) => {
                assert_eq!(info.size, 11);
                assert_eq!(
                    info.sha256,
                    "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
                );
                assert!(info.peek.is_none());
                assert!(info.mtime.ends_with('Z'));
            }
            AssetRecord::Error(text) => panic!("expected info, got error {text:?}"),
        }
    }

    #[test]
    fn missing_paths_become_error_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("does-not-exist.bin");

        let records = fingerprint_assets(&[path.clone()], &NoPeek);
        let record = records.get(&path.to_string_lossy().to_string()).expect("record");
        let serialized = serde_json::to_value(record).expect("serialize");
        assert!(serialized.is_string(), "expected error text, got {serialized}");
    }

    #[test]
    fn peek_failures_never_fail_the_record() {
        struct BrokenCommand;
        impl PeekSource for BrokenCommand {
            fn peek(&self, _path: &Path) -> Option<Value> {
                None
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_asset(&dir, "data.nc", b"payload");
        let records = fingerprint_assets(&[path], &BrokenCommand);
        assert!(matches!(
            records.values().next().expect("record"),
            AssetRecord::Info(info) if info.peek.is_none()
        ));
    }
}
