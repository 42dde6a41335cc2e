//! Cookbooks and their versions.

use std::collections::{BTreeMap, BTreeSet};

use cookshelf_util::errors::{ShelfError, ShelfResult};
use serde_json::{Map, Value};

use crate::manifest::{
    Dependency, Division, Divisions, FileEntry, Metadata, VersionManifest, CHEF_TYPE, JSON_CLASS,
};
use crate::version::Version;

/// Version alias that always refers to the newest version.
pub const LATEST: &str = "_latest";

/// A named cookbook and all of its uploaded versions.
///
/// Versions are keyed by their numeric value, so `1.2` and `1.2.0` are the
/// same version. The latest version is derived from the key order on each
/// call rather than cached.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    versions: BTreeMap<Version, PackageVersion>,
}

impl Package {
    /// Create an empty package, validating its name.
    pub fn new(name: &str) -> ShelfResult<Self> {
        if !is_valid_name(name) {
            return Err(ShelfError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            versions: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_versions(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// All versions, newest first.
    pub fn sorted_versions(&self) -> impl Iterator<Item = &PackageVersion> {
        self.versions.values().rev()
    }

    pub fn latest_version(&self) -> Option<&PackageVersion> {
        self.sorted_versions().next()
    }

    /// Look up a version by text, accepting the `_latest` alias.
    pub fn version(&self, text: &str) -> ShelfResult<&PackageVersion> {
        let not_found = || ShelfError::VersionNotFound {
            package: self.name.clone(),
            version: text.to_string(),
        };
        if text == LATEST {
            return self.latest_version().ok_or_else(not_found);
        }
        let version = Version::parse(text)?;
        self.versions.get(&version).ok_or_else(not_found)
    }

    pub fn has_version(&self, text: &str) -> ShelfResult<bool> {
        Ok(self.versions.contains_key(&Version::parse(text)?))
    }

    pub fn version_mut(&mut self, text: &str) -> ShelfResult<&mut PackageVersion> {
        let version = Version::parse(text)?;
        let name = &self.name;
        self.versions
            .get_mut(&version)
            .ok_or_else(|| ShelfError::VersionNotFound {
                package: name.clone(),
                version: text.to_string(),
            })
    }

    /// Create a new version from an uploaded manifest.
    ///
    /// Fails if the version already exists; existing versions go through
    /// [`PackageVersion::update`].
    pub fn new_version(
        &mut self,
        text: &str,
        manifest: VersionManifest,
    ) -> ShelfResult<&PackageVersion> {
        let version = Version::parse(text)?;
        if self.versions.contains_key(&version) {
            return Err(ShelfError::VersionExists {
                package: self.name.clone(),
                version: text.to_string(),
            });
        }
        let mut pv = PackageVersion::empty(&self.name, version.clone());
        pv.update(manifest, false)?;
        tracing::debug!("Added version {} of cookbook {}", pv.version, self.name);
        Ok(self.versions.entry(version).or_insert(pv))
    }

    /// Remove a version, returning the checksums it referenced.
    pub fn delete_version(&mut self, text: &str) -> ShelfResult<BTreeSet<String>> {
        let version = Version::parse(text)?;
        let removed =
            self.versions
                .remove(&version)
                .ok_or_else(|| ShelfError::VersionNotFound {
                    package: self.name.clone(),
                    version: text.to_string(),
                })?;
        tracing::debug!("Deleted version {} of cookbook {}", removed.version, self.name);
        Ok(removed.checksums())
    }

    /// Checksums referenced by any version of this package.
    pub fn checksums(&self) -> BTreeSet<String> {
        self.versions.values().flat_map(|v| v.checksums()).collect()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// How a version is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    /// Responses to an upload omit file URLs.
    Put,
}

/// One uploaded version of a cookbook.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    pub package_name: String,
    pub name: String,
    pub version: Version,
    pub divisions: Divisions,
    pub metadata: Metadata,
    dependencies: Vec<Dependency>,
    frozen: bool,
}

impl PackageVersion {
    fn empty(package: &str, version: Version) -> Self {
        Self {
            package_name: package.to_string(),
            name: format!("{package}-{version}"),
            version,
            divisions: Divisions::default(),
            metadata: Metadata::default(),
            dependencies: Vec::new(),
            frozen: false,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Dependencies declared in the metadata, sorted by name.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Replace all metadata from a manifest.
    ///
    /// Frozen versions reject updates unless `force` is set; once frozen, a
    /// version stays frozen. Returns the checksums the version referenced
    /// before the update so the caller can collect unused files.
    pub fn update(&mut self, manifest: VersionManifest, force: bool) -> ShelfResult<BTreeSet<String>> {
        if self.frozen && !force {
            return Err(ShelfError::Frozen {
                package: self.package_name.clone(),
                version: self.version.to_string(),
            });
        }
        let valid = manifest.validate(&self.package_name, &self.name, &self.version.canonical())?;

        let previous = self.checksums();
        self.divisions = valid.divisions;
        self.metadata = valid.metadata;
        self.dependencies = valid.dependencies;
        self.frozen = self.frozen || valid.frozen;
        Ok(previous)
    }

    /// Sorted, de-duplicated checksums across every division.
    pub fn checksums(&self) -> BTreeSet<String> {
        self.divisions
            .iter()
            .flat_map(|(_, entries)| entries.iter())
            .filter_map(|e| e.checksum.clone())
            .collect()
    }

    /// Recipe names as used in run lists: `default.rb` is the cookbook
    /// itself, `foo.rb` is `cookbook::foo`.
    pub fn recipe_names(&self) -> ShelfResult<Vec<String>> {
        self.divisions
            .recipes
            .iter()
            .map(|r| {
                let base = r.name.strip_suffix(".rb").ok_or_else(|| ShelfError::Validation {
                    message: format!("No recipe name found in '{}'", r.name),
                })?;
                Ok(if base == "default" {
                    self.package_name.clone()
                } else {
                    format!("{}::{base}", self.package_name)
                })
            })
            .collect()
    }

    /// JSON view of the version. Empty divisions are left out.
    pub fn to_json(&self, method: Method) -> Value {
        let mut out = self.base_json();
        for (division, entries) in self.divisions.iter() {
            if !entries.is_empty() {
                out.insert(division.key().to_string(), render_entries(entries, method));
            }
        }
        Value::Object(out)
    }

    /// JSON view with every division present, empty ones as `[]`.
    ///
    /// Dependency solving responses are consumed by clients that fail on
    /// missing divisions.
    pub fn to_resolved_json(&self) -> Value {
        let mut out = self.base_json();
        for (division, entries) in self.divisions.iter() {
            out.insert(division.key().to_string(), render_entries(entries, Method::Get));
        }
        Value::Object(out)
    }

    fn base_json(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("name".into(), Value::from(self.name.clone()));
        out.insert("cookbook_name".into(), Value::from(self.package_name.clone()));
        if self.version.canonical() != "0.0.0" {
            out.insert("version".into(), Value::from(self.version.to_string()));
        }
        out.insert("chef_type".into(), Value::from(CHEF_TYPE));
        out.insert("json_class".into(), Value::from(JSON_CLASS));
        out.insert("frozen?".into(), Value::from(self.frozen));
        out.insert(
            Division::Recipes.key().into(),
            render_entries(&self.divisions.recipes, Method::Get),
        );
        out.insert(
            "metadata".into(),
            serde_json::to_value(&self.metadata).unwrap_or(Value::Null),
        );
        out
    }
}

fn render_entries(entries: &[FileEntry], method: Method) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|e| {
                let mut e = e.clone();
                if method == Method::Put {
                    e.url = None;
                }
                serde_json::to_value(e).unwrap_or(Value::Null)
            })
            .collect(),
    )
}
