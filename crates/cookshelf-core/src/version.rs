//! Cookbook version parsing and ordering.
//!
//! Cookbook versions are `x.y` or `x.y.z` with non-negative integer
//! components. Ordering is numeric over the `(major, minor, patch)` triple,
//! so `10.0.0 > 9.0.0` and `1.2 == 1.2.0`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use cookshelf_util::errors::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};

/// A parsed cookbook version backed by semver.
///
/// Equality, ordering and hashing only look at the numeric triple. Whether
/// the patch component was written is remembered for display and for the
/// pessimistic upper bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    inner: semver::Version,
    has_patch: bool,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            inner: semver::Version::new(major, minor, patch),
            has_patch: true,
        }
    }

    /// Parse `x.y` or `x.y.z`.
    pub fn parse(text: &str) -> ShelfResult<Self> {
        let invalid = || ShelfError::InvalidVersionFormat {
            version: text.to_string(),
        };

        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(invalid());
        }
        let mut nums = [0u64; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self {
            inner: semver::Version::new(nums[0], nums[1], nums[2]),
            has_patch: parts.len() == 3,
        })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// The `x.y.z` rendering, regardless of how the version was written.
    pub fn canonical(&self) -> String {
        self.inner.to_string()
    }

    /// Exclusive upper bound of `~> self`.
    ///
    /// Increments the second-most-significant written component and zeroes
    /// the rest: `1.2.3` gives `1.3.0`, `2.1` gives `3.0`. A minor component
    /// at `u64::MAX` carries into the major. `None` means there is no
    /// representable ceiling.
    pub fn pessimistic_upper_bound(&self) -> Option<Version> {
        if self.has_patch {
            match self.minor().checked_add(1) {
                Some(minor) => Some(Version::new(self.major(), minor, 0)),
                None => self
                    .major()
                    .checked_add(1)
                    .map(|major| Version::new(major, 0, 0)),
            }
        } else {
            self.major().checked_add(1).map(|major| Version {
                inner: semver::Version::new(major, 0, 0),
                has_patch: false,
            })
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major(), self.minor(), self.patch()).cmp(&(
            other.major(),
            other.minor(),
            other.patch(),
        ))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.major(), self.minor(), self.patch()).hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_patch {
            write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
        } else {
            write!(f, "{}.{}", self.major(), self.minor())
        }
    }
}

impl FromStr for Version {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = ShelfError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}
