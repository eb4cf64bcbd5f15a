use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

pub const MANIFEST_DIR: &str = "manifests";
pub const DATASET_FILENAME: &str = "ground_truth_and_predictions.csv";
pub const ASSET_MANIFEST_FILENAME: &str = "asset_manifest.json";

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Millisecond stamp for file names that must not collide within a second.
pub fn utc_compact_millis_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%S%3fZ").to_string()
}

pub fn manifest_dir(data_root: &Path) -> PathBuf {
    data_root.join(MANIFEST_DIR)
}

pub fn default_dataset_path(data_root: &Path) -> PathBuf {
    data_root.join(DATASET_FILENAME)
}

pub fn default_asset_manifest_path(data_root: &Path) -> PathBuf {
    manifest_dir(data_root).join(ASSET_MANIFEST_FILENAME)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_directory(path)?;
    let file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    write_json_to(file, path, value)
}

/// Like [`write_json_pretty`], but fails instead of replacing an existing file.
pub fn write_new_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_directory(path)?;
    let file = File::create_new(path)
        .with_context(|| format!("refusing to overwrite json file: {}", path.display()))?;
    write_json_to(file, path, value)
}

fn write_json_to<T: Serialize>(mut file: File, path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Newest file in `dir` named `<prefix>*.json`; compact UTC stamps sort
/// lexically.
pub fn latest_manifest(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(prefix) && name.ends_with(".json"))
            .unwrap_or(false);
        if matches {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.pop())
}
