use crate::error::{GenError, Result};
use crate::messages::Notice;
use crate::model::Batch;
use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub fn export_filename(now: &DateTime<Local>) -> String {
    format!("generatedCharacters_{}.json", now.format("%d.%m.%Y@%H.%M"))
}

/// Pretty UTF-8 JSON with four-space indentation; non-ASCII is written as-is.
pub fn to_json(batch: &Batch) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    batch.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes the batch into `dir` under a timestamped name and returns the path.
pub fn save_batch(batch: &Batch, dir: &Path) -> Result<PathBuf> {
    save_batch_at(batch, dir, &Local::now())
}

pub fn save_batch_at(batch: &Batch, dir: &Path, now: &DateTime<Local>) -> Result<PathBuf> {
    if batch.is_empty() {
        return Err(GenError::NothingToSave(Notice::NothingToSave.to_string()));
    }

    let path = dir.join(export_filename(now));
    fs::write(&path, &to_json(batch)?)?;
    info!("Saved {} character(s) to {}", batch.len(), path.display());
    Ok(path)
}
