use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::model::Collection;
use crate::store::{decode_collection, ClassroomStore, Restore};

const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_FORMAT_V1: &str = "classroom-slots-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub collections: Vec<Collection>,
}

fn slot_entry(c: Collection) -> String {
    format!("slots/{}.json", c.slot_key())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_bundle(store: &ClassroomStore, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let mut entries: Vec<(String, String)> = Vec::new();
    for c in Collection::ALL {
        let raw = store
            .export_slot(c)
            .with_context(|| format!("failed to serialize {}", c.name()))?;
        entries.push((slot_entry(c), raw));
    }

    let checksums: BTreeMap<&str, String> = entries
        .iter()
        .map(|(name, raw)| (name.as_str(), sha256_hex(raw.as_bytes())))
        .collect();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "entries": checksums,
    });

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (name, raw) in &entries {
        zip.start_file(name.as_str(), opts)
            .with_context(|| format!("failed to start entry {}", name))?;
        zip.write_all(raw.as_bytes())
            .with_context(|| format!("failed to write entry {}", name))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;
    tracing::info!(path = %out_path.to_string_lossy(), entries = entries.len() + 1, "backup exported");

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: entries.len() + 1,
    })
}

/// Reads and verifies a bundle. Nothing is applied unless every entry checks out.
pub fn read_bundle(in_path: &Path) -> anyhow::Result<Restore> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let checksums = manifest
        .get("entries")
        .and_then(|v| v.as_object())
        .ok_or_else(|| anyhow!("manifest.json missing entries"))?;

    let mut restore = Restore::default();
    for c in Collection::ALL {
        let name = slot_entry(c);
        let Some(expected) = checksums.get(&name).and_then(|v| v.as_str()) else {
            continue;
        };
        let mut raw = String::new();
        archive
            .by_name(&name)
            .with_context(|| format!("bundle missing {}", name))?
            .read_to_string(&mut raw)
            .with_context(|| format!("failed to read {}", name))?;
        let actual = sha256_hex(raw.as_bytes());
        if actual != expected {
            return Err(anyhow!("checksum mismatch for {}", name));
        }
        let bad = |e: serde_json::Error| anyhow!("{} is not a valid {} list: {}", name, c.name(), e);
        match c {
            Collection::Classes => restore.classes = Some(decode_collection(&raw).map_err(bad)?),
            Collection::Students => restore.students = Some(decode_collection(&raw).map_err(bad)?),
            Collection::Assignments => {
                restore.assignments = Some(decode_collection(&raw).map_err(bad)?)
            }
            Collection::Grades => restore.grades = Some(decode_collection(&raw).map_err(bad)?),
            Collection::Attendance => {
                restore.attendance = Some(decode_collection(&raw).map_err(bad)?)
            }
            Collection::Snippets => restore.snippets = Some(decode_collection(&raw).map_err(bad)?),
            Collection::Todos => restore.todos = Some(decode_collection(&raw).map_err(bad)?),
        }
    }
    Ok(restore)
}

pub fn import_bundle(store: &mut ClassroomStore, in_path: &Path) -> anyhow::Result<ImportSummary> {
    let restore = read_bundle(in_path)?;
    let collections = store.restore(restore);
    tracing::info!(path = %in_path.to_string_lossy(), collections = collections.len(), "backup imported");
    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        collections,
    })
}
