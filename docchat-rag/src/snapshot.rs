//! On-disk layout of a persisted index.
//!
//! A persisted index is a directory holding two JSON files:
//!
//! - `vectors.json` - the nearest-neighbor structure: dimensionality, slot ids
//!   and one vector per slot
//! - `docstore.json` - the slot to chunk id map, every chunk record, and the
//!   next free slot id
//!
//! Writes go to a sibling `<dir>.tmp` directory first. The live directory is
//! then moved to `<dir>.bak`, the staging directory renamed into place, and
//! the backup removed. A reader that finds `<dir>` missing but `<dir>.bak`
//! present restores the backup.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::Chunk;
use crate::error::{RagError, Result};

/// File holding the nearest-neighbor structure.
pub const VECTORS_FILE: &str = "vectors.json";

/// File holding the slot map and chunk records.
pub const DOCSTORE_FILE: &str = "docstore.json";

/// Serialized nearest-neighbor structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorsFile {
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Slot ids, parallel to `vectors`.
    pub slots: Vec<u64>,
    /// One vector per slot.
    pub vectors: Vec<Vec<f32>>,
}

/// Serialized slot map and chunk store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocstoreFile {
    /// Next slot id to hand out.
    pub next_slot: u64,
    /// Slot id to chunk id.
    pub slots: BTreeMap<u64, Uuid>,
    /// Chunk records by id, stored without embeddings.
    pub chunks: BTreeMap<Uuid, Chunk>,
}

fn sibling(dir: &Path, suffix: &str) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .ok_or_else(|| RagError::persistence(dir, "index path has no directory name"))?;
    let mut name = name.to_os_string();
    name.push(".");
    name.push(suffix);
    Ok(dir.with_file_name(name))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| RagError::persistence(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|e| RagError::persistence(path, e))?;
    writer.flush().map_err(|e| RagError::persistence(path, e))?;
    writer.get_ref().sync_all().map_err(|e| RagError::persistence(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(RagError::CorruptIndexError(format!("missing {}", path.display())));
    }
    let file = File::open(path).map_err(|e| RagError::persistence(path, e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| RagError::CorruptIndexError(format!("unreadable {}: {e}", path.display())))
}

/// Replace the index directory at `dir` with the given files.
pub fn write(dir: &Path, vectors: &VectorsFile, docstore: &DocstoreFile) -> Result<()> {
    let staging = sibling(dir, "tmp")?;
    let backup = sibling(dir, "bak")?;

    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| RagError::persistence(&staging, e))?;
    }
    fs::create_dir_all(&staging).map_err(|e| RagError::persistence(&staging, e))?;
    write_json(&staging.join(VECTORS_FILE), vectors)?;
    write_json(&staging.join(DOCSTORE_FILE), docstore)?;

    if dir.exists() {
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|e| RagError::persistence(&backup, e))?;
        }
        fs::rename(dir, &backup).map_err(|e| RagError::persistence(dir, e))?;
    }
    fs::rename(&staging, dir).map_err(|e| RagError::persistence(dir, e))?;

    if backup.exists() {
        if let Err(e) = fs::remove_dir_all(&backup) {
            warn!(path = %backup.display(), error = %e, "could not remove index backup");
        }
    }
    debug!(path = %dir.display(), slots = vectors.slots.len(), "index snapshot written");
    Ok(())
}

/// Read the index directory at `dir`. Returns `None` if no index exists there.
///
/// # Errors
///
/// Returns [`RagError::CorruptIndexError`] if the directory exists but one
/// of the files is missing or unreadable.
pub fn read(dir: &Path) -> Result<Option<(VectorsFile, DocstoreFile)>> {
    if !dir.exists() {
        let backup = sibling(dir, "bak")?;
        if !backup.is_dir() {
            return Ok(None);
        }
        warn!(path = %dir.display(), "index missing, restoring from interrupted write backup");
        fs::rename(&backup, dir).map_err(|e| RagError::persistence(&backup, e))?;
    }
    if !dir.is_dir() {
        return Err(RagError::persistence(dir, "index path is not a directory"));
    }

    let vectors = read_json(&dir.join(VECTORS_FILE))?;
    let docstore = read_json(&dir.join(DOCSTORE_FILE))?;
    Ok(Some((vectors, docstore)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (VectorsFile, DocstoreFile) {
        (
            VectorsFile { dimensions: 2, slots: vec![0], vectors: vec![vec![1.0, 2.0]] },
            DocstoreFile { next_slot: 1, slots: BTreeMap::new(), chunks: BTreeMap::new() },
        )
    }

    #[test]
    fn missing_directory_reads_as_none() {
        let temp = tempfile::tempdir().unwrap();
        assert!(read(&temp.path().join("index")).unwrap().is_none());
    }

    #[test]
    fn write_replaces_previous_snapshot_and_cleans_up() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("index");
        let (vectors, docstore) = sample();

        write(&dir, &vectors, &docstore).unwrap();
        let mut updated = vectors.clone();
        updated.vectors[0] = vec![3.0, 4.0];
        write(&dir, &updated, &docstore).unwrap();

        let (read_vectors, _) = read(&dir).unwrap().unwrap();
        assert_eq!(read_vectors, updated);
        assert!(!temp.path().join("index.tmp").exists());
        assert!(!temp.path().join("index.bak").exists());
    }

    #[test]
    fn interrupted_swap_is_recovered_from_backup() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("index");
        let (vectors, docstore) = sample();
        write(&dir, &vectors, &docstore).unwrap();
        fs::rename(&dir, temp.path().join("index.bak")).unwrap();

        let (read_vectors, _) = read(&dir).unwrap().unwrap();
        assert_eq!(read_vectors, vectors);
        assert!(dir.is_dir());
    }

    #[test]
    fn half_written_directory_is_corrupt() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("index");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(VECTORS_FILE), "{}").unwrap();

        assert!(matches!(read(&dir), Err(RagError::CorruptIndexError(_))));
    }
}
