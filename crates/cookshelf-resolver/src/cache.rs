//! Per-resolution caches.
//!
//! Each package is fetched from the repository at most once per resolution,
//! so one call sees a single snapshot of every cookbook it touches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cookshelf_core::package::Package;
use cookshelf_core::repository::PackageRepository;
use cookshelf_core::version::Version;
use cookshelf_util::errors::ShelfResult;

/// Tracks which cookbook versions have had their dependencies walked,
/// so circular dependency chains terminate.
#[derive(Debug, Default)]
pub struct VisitedSet {
    visited: HashSet<(String, Version)>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a version as visited. Returns `false` if already visited.
    pub fn visit(&mut self, package: &str, version: &Version) -> bool {
        self.visited.insert((package.to_string(), version.clone()))
    }
}

/// Packages fetched so far in this resolution.
#[derive(Debug, Default)]
pub struct PackageCache {
    packages: HashMap<String, Arc<Package>>,
}

impl PackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot of `name`, fetching it on first use.
    pub fn fetch<R>(&mut self, repo: &R, name: &str) -> ShelfResult<Arc<Package>>
    where
        R: PackageRepository + ?Sized,
    {
        if let Some(package) = self.packages.get(name) {
            return Ok(Arc::clone(package));
        }
        let package = repo.get_package(name)?;
        self.packages.insert(name.to_string(), Arc::clone(&package));
        Ok(package)
    }
}
