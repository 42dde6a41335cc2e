//! Package storage.
//!
//! Readers receive `Arc<Package>` snapshots, so a resolution keeps a
//! consistent view even if a version is uploaded while it runs.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use cookshelf_util::errors::{ShelfError, ShelfResult};

use crate::package::Package;

/// Storage for packages and their versions.
pub trait PackageRepository: Send + Sync {
    /// Fetch a package by name, failing with [`ShelfError::NotFound`].
    fn get_package(&self, name: &str) -> ShelfResult<Arc<Package>>;

    /// Every stored package.
    fn list_packages(&self) -> ShelfResult<Vec<Arc<Package>>>;

    /// Insert or replace a package.
    fn save_package(&self, package: Package) -> ShelfResult<()>;

    fn delete_package(&self, name: &str) -> ShelfResult<()>;
}

/// In-memory repository keyed by package name.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    packages: RwLock<BTreeMap<String, Arc<Package>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from already-constructed packages.
    pub fn with_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        let packages = packages
            .into_iter()
            .map(|p| (p.name().to_string(), Arc::new(p)))
            .collect();
        Self {
            packages: RwLock::new(packages),
        }
    }

    /// Names of all stored packages, sorted.
    pub fn names(&self) -> Vec<String> {
        self.packages
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn poisoned() -> ShelfError {
    ShelfError::Generic {
        message: "package repository lock poisoned".to_string(),
    }
}

impl PackageRepository for MemoryRepository {
    fn get_package(&self, name: &str) -> ShelfResult<Arc<Package>> {
        let packages = self.packages.read().map_err(|_| poisoned())?;
        packages
            .get(name)
            .cloned()
            .ok_or_else(|| ShelfError::NotFound {
                package: name.to_string(),
            })
    }

    fn list_packages(&self) -> ShelfResult<Vec<Arc<Package>>> {
        let packages = self.packages.read().map_err(|_| poisoned())?;
        Ok(packages.values().cloned().collect())
    }

    fn save_package(&self, package: Package) -> ShelfResult<()> {
        let mut packages = self.packages.write().map_err(|_| poisoned())?;
        packages.insert(package.name().to_string(), Arc::new(package));
        Ok(())
    }

    fn delete_package(&self, name: &str) -> ShelfResult<()> {
        let mut packages = self.packages.write().map_err(|_| poisoned())?;
        packages
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ShelfError::NotFound {
                package: name.to_string(),
            })
    }
}
