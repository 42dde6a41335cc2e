//! Cookbook uploads and deletions, with file garbage collection.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use cookshelf_util::errors::{ShelfError, ShelfResult};

use crate::checksum_store::{collect_garbage, ChecksumStore};
use crate::manifest::VersionManifest;
use crate::package::{Package, PackageVersion};
use crate::repository::PackageRepository;

/// Front end for mutating the package repository.
///
/// Mutations are serialized; readers go straight to the repository and see
/// the last saved snapshot.
pub struct Registry<R, S> {
    repo: R,
    store: S,
    write_lock: Mutex<()>,
}

impl<R: PackageRepository, S: ChecksumStore> Registry<R, S> {
    pub fn new(repo: R, store: S) -> Self {
        Self {
            repo,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn package(&self, name: &str) -> ShelfResult<Arc<Package>> {
        self.repo.get_package(name)
    }

    /// Create or update one version of a cookbook.
    ///
    /// The package is created on first upload. Files the version no longer
    /// references are deleted once no other version uses them.
    pub fn upload_version(
        &self,
        name: &str,
        version: &str,
        manifest: VersionManifest,
    ) -> ShelfResult<PackageVersion> {
        let _guard = self.lock()?;

        let mut package = match self.repo.get_package(name) {
            Ok(p) => (*p).clone(),
            Err(ShelfError::NotFound { .. }) => Package::new(name)?,
            Err(e) => return Err(e),
        };

        let force = manifest.force;
        let (uploaded, released) = if package.has_version(version)? {
            let pv = package.version_mut(version)?;
            let released = pv.update(manifest, force)?;
            (pv.clone(), released)
        } else {
            let pv = package.new_version(version, manifest)?;
            (pv.clone(), BTreeSet::new())
        };

        self.repo.save_package(package)?;
        collect_garbage(&self.repo, &self.store, released)?;
        tracing::info!("Uploaded cookbook {name} version {}", uploaded.version);
        Ok(uploaded)
    }

    /// Delete one version of a cookbook and any files only it used.
    pub fn delete_version(&self, name: &str, version: &str) -> ShelfResult<()> {
        let _guard = self.lock()?;

        let mut package = (*self.repo.get_package(name)?).clone();
        let released = package.delete_version(version)?;
        self.repo.save_package(package)?;
        collect_garbage(&self.repo, &self.store, released)?;
        tracing::info!("Deleted cookbook {name} version {version}");
        Ok(())
    }

    /// Delete a cookbook with all of its versions.
    pub fn delete_package(&self, name: &str) -> ShelfResult<()> {
        let _guard = self.lock()?;

        let released = self.repo.get_package(name)?.checksums();
        self.repo.delete_package(name)?;
        collect_garbage(&self.repo, &self.store, released)?;
        tracing::info!("Deleted cookbook {name}");
        Ok(())
    }

    fn lock(&self) -> ShelfResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| ShelfError::Generic {
            message: "registry lock poisoned".to_string(),
        })
    }
}
