//! Content-addressed cookbook file storage and checksum garbage collection.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use cookshelf_util::errors::{ShelfError, ShelfResult};
use cookshelf_util::hash::md5_bytes;

use crate::repository::PackageRepository;

/// Storage for cookbook file contents, addressed by checksum.
pub trait ChecksumStore: Send + Sync {
    /// Remove the given checksums. Unknown checksums are ignored.
    fn delete_checksums(&self, checksums: &[String]) -> ShelfResult<()>;
}

/// In-memory file store.
#[derive(Debug, Default)]
pub struct MemoryChecksumStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryChecksumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store file contents, returning their checksum.
    pub fn put(&self, data: &[u8]) -> ShelfResult<String> {
        let checksum = md5_bytes(data);
        self.files
            .write()
            .map_err(|_| poisoned())?
            .insert(checksum.clone(), data.to_vec());
        Ok(checksum)
    }

    pub fn contains(&self, checksum: &str) -> bool {
        self.files
            .read()
            .map(|f| f.contains_key(checksum))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> ShelfError {
    ShelfError::Generic {
        message: "checksum store lock poisoned".to_string(),
    }
}

impl ChecksumStore for MemoryChecksumStore {
    fn delete_checksums(&self, checksums: &[String]) -> ShelfResult<()> {
        let mut files = self.files.write().map_err(|_| poisoned())?;
        for c in checksums {
            if files.remove(c).is_none() {
                tracing::warn!("Checksum {c} was scheduled for deletion but is not stored");
            }
        }
        Ok(())
    }
}

/// Of `candidates`, the checksums no stored version references any more.
///
/// Scans every version of every package, so the repository must already
/// reflect the change that released the candidates.
pub fn unreferenced_checksums<R>(repo: &R, candidates: BTreeSet<String>) -> ShelfResult<Vec<String>>
where
    R: PackageRepository + ?Sized,
{
    let mut remaining = candidates;
    if remaining.is_empty() {
        return Ok(Vec::new());
    }
    for package in repo.list_packages()? {
        for version in package.sorted_versions() {
            for checksum in version.checksums() {
                remaining.remove(&checksum);
            }
        }
        if remaining.is_empty() {
            break;
        }
    }
    Ok(remaining.into_iter().collect())
}

/// Delete from `store` every candidate checksum that is no longer referenced.
///
/// Returns the deleted checksums.
pub fn collect_garbage<R, S>(
    repo: &R,
    store: &S,
    candidates: BTreeSet<String>,
) -> ShelfResult<Vec<String>>
where
    R: PackageRepository + ?Sized,
    S: ChecksumStore + ?Sized,
{
    let unused = unreferenced_checksums(repo, candidates)?;
    if !unused.is_empty() {
        tracing::debug!("Deleting {} unreferenced cookbook files", unused.len());
        store.delete_checksums(&unused)?;
    }
    Ok(unused)
}
