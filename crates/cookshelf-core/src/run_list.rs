//! Run-list entries: `name[::qualifier][@version]`.

use std::fmt;
use std::str::FromStr;

use cookshelf_util::errors::{ShelfError, ShelfResult};

use crate::constraint::Constraint;
use crate::version::Version;

/// A cookbook requested by a run list.
///
/// Only the part of the name before `::` matters for resolution; the
/// recipe qualifier is dropped. A trailing `@version` pins the cookbook
/// with an `=` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunListEntry {
    pub package: String,
    pub constraint: Option<Constraint>,
}

impl RunListEntry {
    pub fn parse(entry: &str) -> ShelfResult<Self> {
        let invalid = || ShelfError::InvalidRunListEntry {
            entry: entry.to_string(),
        };

        let (name, version) = match entry.split_once('@') {
            Some((name, version)) => {
                if version.contains('@') {
                    return Err(invalid());
                }
                (name, Some(version))
            }
            None => (entry, None),
        };

        let package = name.split("::").next().unwrap_or_default();
        if package.is_empty() {
            return Err(invalid());
        }

        let constraint = version
            .map(|v| Version::parse(v).map(Constraint::exact))
            .transpose()?;

        Ok(Self {
            package: package.to_string(),
            constraint,
        })
    }
}

impl FromStr for RunListEntry {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RunListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}@{}", self.package, c.version),
            None => f.write_str(&self.package),
        }
    }
}
