//! Picking versions of a cookbook: the newest satisfying version, and the
//! version listings served for cookbook queries.
//!
//! Every walk runs over versions sorted newest first and stops at the first
//! [`Outcome::Break`].

use std::str::FromStr;

use cookshelf_core::config::RegistryConfig;
use cookshelf_core::constraint::{Constraint, Outcome};
use cookshelf_core::package::{Package, PackageVersion};
use cookshelf_util::errors::ShelfError;
use serde::Serialize;

/// Newest version satisfying `constraint`, or the newest version when there
/// is no constraint.
pub fn select_latest<'a>(
    package: &'a Package,
    constraint: Option<&Constraint>,
) -> Option<&'a PackageVersion> {
    match constraint {
        Some(c) => select_latest_all(package, std::slice::from_ref(c)),
        None => package.latest_version(),
    }
}

/// Newest version satisfying every constraint in `constraints`.
///
/// A `Break` from any single constraint ends the walk: no older version can
/// satisfy that constraint either.
pub fn select_latest_all<'a>(
    package: &'a Package,
    constraints: &[Constraint],
) -> Option<&'a PackageVersion> {
    'versions: for candidate in package.sorted_versions() {
        for constraint in constraints {
            match constraint.evaluate(&candidate.version) {
                Outcome::Ok => {}
                Outcome::Skip => continue 'versions,
                Outcome::Break => break 'versions,
            }
        }
        return Some(candidate);
    }
    None
}

/// [`select_latest`] for constraint text, where `""` means no constraint.
///
/// Malformed text is logged and treated as "nothing matches".
pub fn latest_satisfying<'a>(package: &'a Package, constraint: &str) -> Option<&'a PackageVersion> {
    match Constraint::parse_optional(constraint) {
        Ok(c) => select_latest(package, c.as_ref()),
        Err(e) => {
            tracing::warn!(
                "Constraint '{constraint}' for cookbook {} was malformed: {e}",
                package.name()
            );
            None
        }
    }
}

/// How many versions a cookbook listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCount {
    /// At most this many.
    Limit(usize),
    All,
}

impl Default for VersionCount {
    fn default() -> Self {
        VersionCount::Limit(1)
    }
}

impl VersionCount {
    fn allows(&self, collected: usize) -> bool {
        match self {
            VersionCount::Limit(n) => collected < *n,
            VersionCount::All => true,
        }
    }
}

impl FromStr for VersionCount {
    type Err = ShelfError;

    /// `""` is one version, `"all"` is every version, otherwise a number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(VersionCount::default()),
            "all" => Ok(VersionCount::All),
            n => n
                .parse()
                .map(VersionCount::Limit)
                .map_err(|_| ShelfError::InvalidVersionCount {
                    count: s.to_string(),
                }),
        }
    }
}

/// A cookbook listing: its URL and some of its versions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub url: String,
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub url: String,
    pub version: String,
}

/// List up to `count` versions of `package` that satisfy `constraint`.
///
/// Returns `None` if the constraint text is malformed.
pub fn info_summary(
    package: &Package,
    count: VersionCount,
    constraint: &str,
    config: &RegistryConfig,
) -> Option<PackageSummary> {
    let constraint = match Constraint::parse_optional(constraint) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(
                "Constraint '{constraint}' for cookbook {} was badly formed: {e}",
                package.name()
            );
            return None;
        }
    };

    let mut versions = Vec::new();
    for candidate in package.sorted_versions() {
        if !count.allows(versions.len()) {
            break;
        }
        if let Some(ref c) = constraint {
            match c.evaluate(&candidate.version) {
                Outcome::Ok => {}
                Outcome::Skip => continue,
                Outcome::Break => break,
            }
        }
        let version = candidate.version.to_string();
        versions.push(VersionSummary {
            url: config.version_url(package.name(), &version),
            version,
        });
    }

    Some(PackageSummary {
        url: config.package_url(package.name()),
        versions,
    })
}
