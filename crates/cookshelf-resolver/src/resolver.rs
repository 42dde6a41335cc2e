//! Run-list resolution: environment pins, transitive dependency closure,
//! and final version selection.
//!
//! Resolution is all-or-nothing. The first conflict or unsatisfiable
//! constraint aborts the whole call, and no partial result is returned.

use std::collections::BTreeMap;

use cookshelf_core::constraint::{join_constraints, Constraint};
use cookshelf_core::package::PackageVersion;
use cookshelf_core::repository::PackageRepository;
use cookshelf_core::run_list::RunListEntry;
use cookshelf_core::version::Version;
use cookshelf_util::errors::{ShelfError, ShelfResult};
use serde_json::Value;

use crate::cache::{PackageCache, VisitedSet};
use crate::select::{select_latest, select_latest_all};
use crate::table::ConstraintTable;

/// The version chosen for one cookbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: Version,
    /// Full JSON view of the chosen version, every division present.
    pub metadata: Value,
}

/// The outcome of a successful resolution, keyed by cookbook name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    packages: BTreeMap<String, ResolvedPackage>,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Cookbook name to chosen version text.
    pub fn versions(&self) -> BTreeMap<String, String> {
        self.packages
            .iter()
            .map(|(name, p)| (name.clone(), p.version.to_string()))
            .collect()
    }

    /// Cookbook name to rendered version, as served to clients.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.packages
                .iter()
                .map(|(name, p)| (name.clone(), p.metadata.clone()))
                .collect(),
        )
    }
}

/// Mutable state threaded through one resolution.
#[derive(Default)]
struct Session {
    table: ConstraintTable,
    packages: PackageCache,
    visited: VisitedSet,
}

/// Resolves run lists against a package repository.
///
/// The repository is only read. Any number of resolutions may run against
/// the same repository at once.
pub struct Resolver<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R: PackageRepository + ?Sized> Resolver<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Resolve `run_list` under the environment's cookbook version pins.
    ///
    /// Environment pins only apply to cookbooks named in the run list.
    /// Returns every cookbook in the transitive closure with the newest
    /// version satisfying all constraints collected for it.
    pub fn resolve<S: AsRef<str>>(
        &self,
        run_list: &[S],
        environment: &BTreeMap<String, String>,
    ) -> ShelfResult<Resolution> {
        let entries = run_list
            .iter()
            .map(|e| RunListEntry::parse(e.as_ref()))
            .collect::<ShelfResult<Vec<_>>>()?;

        let mut session = Session::default();
        let mut requested: Vec<String> = Vec::new();
        for entry in entries {
            session.table.seed(&entry.package, entry.constraint);
            if !requested.contains(&entry.package) {
                requested.push(entry.package);
            }
        }

        for (name, text) in environment {
            if !session.table.contains(name) {
                continue;
            }
            let pin = Constraint::parse(text)?;
            let merged = session
                .table
                .apply_environment(name, &pin)
                .map_err(|conflict| conflict.into_error(name))?;
            tracing::debug!("Environment pin '{pin}' for {name} gives '{merged}'");
        }

        for name in &requested {
            let package = session.packages.fetch(self.repo, name)?;
            let constraints = session.table.get(name).unwrap_or_default().to_vec();
            let chosen = select_latest_all(&package, &constraints)
                .ok_or_else(|| no_satisfying_version(name, &constraints))?;
            tracing::debug!("Run list cookbook {name} starts at {}", chosen.version);
            self.walk(&mut session, chosen)?;
        }

        self.finish(&mut session)
    }

    /// Follow the dependencies of `parent`, recording their constraints.
    fn walk(&self, session: &mut Session, parent: &PackageVersion) -> ShelfResult<()> {
        if !session.visited.visit(&parent.package_name, &parent.version) {
            return Ok(());
        }

        for dep in parent.dependencies() {
            let package = session.packages.fetch(self.repo, &dep.name)?;

            let candidate = match session.table.get(&dep.name) {
                Some(existing) => {
                    // Newest version satisfying every collected constraint, not only the new one.
                    let mut all = existing.to_vec();
                    all.extend(dep.constraint.iter().cloned());
                    let candidate = select_latest_all(&package, &all).ok_or_else(|| {
                        ShelfError::DependencyConflict {
                            package: dep.name.clone(),
                            dependent: parent.package_name.clone(),
                            dependent_version: parent.version.to_string(),
                            constraint: dep
                                .constraint
                                .as_ref()
                                .map(ToString::to_string)
                                .unwrap_or_else(|| "any version".to_string()),
                            existing: join_constraints(existing),
                        }
                    })?;
                    session.table.add(&dep.name, dep.constraint.as_ref());
                    candidate
                }
                None => {
                    let candidate = select_latest(&package, dep.constraint.as_ref())
                        .ok_or_else(|| no_satisfying_version(&dep.name, dep.constraint.as_slice()))?;
                    session.table.seed(&dep.name, dep.constraint.clone());
                    candidate
                }
            };

            tracing::debug!(
                "{} {} needs {}, trying {}",
                parent.package_name,
                parent.version,
                dep.name,
                candidate.version
            );
            self.walk(session, candidate)?;
        }
        Ok(())
    }

    /// Pick the final version of every cookbook from all of its constraints.
    fn finish(&self, session: &mut Session) -> ShelfResult<Resolution> {
        let mut packages = BTreeMap::new();
        for (name, constraints) in session.table.iter() {
            let package = session.packages.fetch(self.repo, name)?;
            let chosen = select_latest_all(&package, constraints)
                .ok_or_else(|| no_satisfying_version(name, constraints))?;
            packages.insert(
                name.to_string(),
                ResolvedPackage {
                    name: name.to_string(),
                    version: chosen.version.clone(),
                    metadata: chosen.to_resolved_json(),
                },
            );
        }
        tracing::debug!("Resolved {} cookbooks", packages.len());
        Ok(Resolution { packages })
    }
}

/// Resolve `run_list` against `repo`; see [`Resolver::resolve`].
pub fn resolve<R, S>(
    repo: &R,
    run_list: &[S],
    environment: &BTreeMap<String, String>,
) -> ShelfResult<Resolution>
where
    R: PackageRepository + ?Sized,
    S: AsRef<str>,
{
    Resolver::new(repo).resolve(run_list, environment)
}

fn no_satisfying_version(package: &str, constraints: &[Constraint]) -> ShelfError {
    ShelfError::NoSatisfyingVersion {
        package: package.to_string(),
        constraints: join_constraints(constraints),
    }
}
