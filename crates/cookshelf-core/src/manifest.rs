//! Uploaded cookbook version manifests.
//!
//! A manifest is the JSON body sent when a cookbook version is created or
//! updated. Every record here rejects unknown keys; a misspelled division or
//! metadata field is an error rather than silently dropped data.

use std::collections::BTreeMap;

use cookshelf_util::errors::{ShelfError, ShelfResult};
use cookshelf_util::hash::is_md5_hex;
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;

/// The only accepted `chef_type` for a cookbook version.
pub const CHEF_TYPE: &str = "cookbook_version";

/// The only accepted `json_class` for a cookbook version.
pub const JSON_CLASS: &str = "Chef::CookbookVersion";

/// One file inside a content division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specificity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The content divisions of a cookbook version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Division {
    Definitions,
    Libraries,
    Attributes,
    Recipes,
    Providers,
    Resources,
    Templates,
    RootFiles,
    Files,
}

impl Division {
    pub const ALL: [Division; 9] = [
        Division::Definitions,
        Division::Libraries,
        Division::Attributes,
        Division::Recipes,
        Division::Providers,
        Division::Resources,
        Division::Templates,
        Division::RootFiles,
        Division::Files,
    ];

    /// JSON key of the division.
    pub fn key(&self) -> &'static str {
        match self {
            Division::Definitions => "definitions",
            Division::Libraries => "libraries",
            Division::Attributes => "attributes",
            Division::Recipes => "recipes",
            Division::Providers => "providers",
            Division::Resources => "resources",
            Division::Templates => "templates",
            Division::RootFiles => "root_files",
            Division::Files => "files",
        }
    }
}

/// File lists for every division.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Divisions {
    pub definitions: Vec<FileEntry>,
    pub libraries: Vec<FileEntry>,
    pub attributes: Vec<FileEntry>,
    pub recipes: Vec<FileEntry>,
    pub providers: Vec<FileEntry>,
    pub resources: Vec<FileEntry>,
    pub templates: Vec<FileEntry>,
    pub root_files: Vec<FileEntry>,
    pub files: Vec<FileEntry>,
}

impl Divisions {
    pub fn get(&self, division: Division) -> &[FileEntry] {
        match division {
            Division::Definitions => &self.definitions,
            Division::Libraries => &self.libraries,
            Division::Attributes => &self.attributes,
            Division::Recipes => &self.recipes,
            Division::Providers => &self.providers,
            Division::Resources => &self.resources,
            Division::Templates => &self.templates,
            Division::RootFiles => &self.root_files,
            Division::Files => &self.files,
        }
    }

    /// Iterate divisions in their canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Division, &[FileEntry])> {
        Division::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    fn validate(&self) -> ShelfResult<()> {
        for (division, entries) in self.iter() {
            for entry in entries {
                let bad_checksum = entry.checksum.as_deref().is_some_and(|c| !is_md5_hex(c));
                if entry.name.is_empty() || entry.path.is_empty() || bad_checksum {
                    return Err(ShelfError::Validation {
                        message: format!(
                            "Invalid element in array value of '{}'.",
                            division.key()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Cookbook metadata, as generated from a cookbook's `metadata.rb`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub maintainer: String,
    #[serde(default)]
    pub maintainer_email: String,
    #[serde(default)]
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_url: Option<String>,
    #[serde(default)]
    pub platforms: BTreeMap<String, String>,
    /// Cookbook name to requirement text; the empty string means any version.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub recommendations: BTreeMap<String, String>,
    #[serde(default)]
    pub suggestions: BTreeMap<String, String>,
    #[serde(default)]
    pub conflicting: BTreeMap<String, String>,
    #[serde(default)]
    pub providing: BTreeMap<String, String>,
    #[serde(default)]
    pub replacing: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub groupings: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub recipes: BTreeMap<String, String>,
}

/// A declared dependency on another cookbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    /// `None` accepts any version.
    pub constraint: Option<Constraint>,
}

impl Metadata {
    /// Parse the `dependencies` table, failing on the first bad requirement.
    pub fn parse_dependencies(&self) -> ShelfResult<Vec<Dependency>> {
        self.dependencies
            .iter()
            .map(|(name, requirement)| {
                Ok(Dependency {
                    name: name.clone(),
                    constraint: Constraint::parse_optional(requirement)?,
                })
            })
            .collect()
    }
}

/// Body of a cookbook version upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionManifest {
    pub cookbook_name: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub chef_type: Option<String>,
    #[serde(default)]
    pub json_class: Option<String>,
    #[serde(default)]
    pub definitions: Vec<FileEntry>,
    #[serde(default)]
    pub libraries: Vec<FileEntry>,
    #[serde(default)]
    pub attributes: Vec<FileEntry>,
    #[serde(default)]
    pub recipes: Vec<FileEntry>,
    #[serde(default)]
    pub providers: Vec<FileEntry>,
    #[serde(default)]
    pub resources: Vec<FileEntry>,
    #[serde(default)]
    pub templates: Vec<FileEntry>,
    #[serde(default)]
    pub root_files: Vec<FileEntry>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default, rename = "frozen?")]
    pub frozen: bool,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub force: bool,
}

/// A manifest that passed validation, split into the parts a version keeps.
#[derive(Debug, Clone)]
pub struct ValidManifest {
    pub divisions: Divisions,
    pub metadata: Metadata,
    pub dependencies: Vec<Dependency>,
    pub frozen: bool,
}

impl VersionManifest {
    /// Parse a manifest from its JSON body.
    pub fn from_json(body: &str) -> ShelfResult<Self> {
        serde_json::from_str(body).map_err(|e| ShelfError::Validation {
            message: format!("Invalid cookbook version: {e}"),
        })
    }

    /// Check the manifest against the version it is being applied to.
    ///
    /// `version` is the canonical text of the target version. A manifest
    /// version of `0.0.0` (or none) leaves the version unchanged.
    pub fn validate(self, cookbook: &str, name: &str, version: &str) -> ShelfResult<ValidManifest> {
        fn invalid(field: &str) -> ShelfError {
            ShelfError::Validation {
                message: format!("Field '{field}' invalid"),
            }
        }

        if self.cookbook_name.is_empty() {
            return Err(ShelfError::Validation {
                message: "Field 'cookbook_name' missing".to_string(),
            });
        }
        if self.chef_type.as_deref().is_some_and(|t| t != CHEF_TYPE) {
            return Err(invalid("chef_type"));
        }
        if self.json_class.as_deref().is_some_and(|c| c != JSON_CLASS) {
            return Err(invalid("json_class"));
        }
        if let Some(ref v) = self.version {
            let parsed = crate::version::Version::parse(v).map_err(|_| invalid("version"))?;
            if parsed.canonical() != "0.0.0" && parsed.canonical() != version {
                return Err(invalid("version"));
            }
        }
        if self.cookbook_name != cookbook {
            return Err(invalid("cookbook_name"));
        }
        if self.name != name {
            return Err(invalid("name"));
        }

        let divisions = Divisions {
            definitions: self.definitions,
            libraries: self.libraries,
            attributes: self.attributes,
            recipes: self.recipes,
            providers: self.providers,
            resources: self.resources,
            templates: self.templates,
            root_files: self.root_files,
            files: self.files,
        };
        divisions.validate()?;

        let dependencies = self.metadata.parse_dependencies()?;

        Ok(ValidManifest {
            divisions,
            metadata: self.metadata,
            dependencies,
            frozen: self.frozen,
        })
    }
}
