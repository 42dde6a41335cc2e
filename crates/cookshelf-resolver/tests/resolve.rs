use std::collections::BTreeMap;

use cookshelf_core::manifest::{Division, Metadata, VersionManifest};
use cookshelf_core::package::Package;
use cookshelf_core::repository::MemoryRepository;
use cookshelf_resolver::resolver::{resolve, Resolver};
use cookshelf_util::errors::ShelfError;

/// Builds an in-memory repository one cookbook version at a time.
#[derive(Default)]
struct Fixture {
    packages: BTreeMap<String, Package>,
}

impl Fixture {
    fn new() -> Self {
        Self::default()
    }

    fn version(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let manifest = VersionManifest {
            cookbook_name: name.to_string(),
            name: format!("{name}-{version}"),
            version: Some(version.to_string()),
            metadata: Metadata {
                name: name.to_string(),
                version: version.to_string(),
                dependencies: deps
                    .iter()
                    .map(|(dep, constraint)| (dep.to_string(), constraint.to_string()))
                    .collect(),
                ..Default::default()
            },
            ..Default::default()
        };
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| Package::new(name).unwrap())
            .new_version(version, manifest)
            .unwrap();
        self
    }

    fn repo(self) -> MemoryRepository {
        MemoryRepository::with_packages(self.packages.into_values())
    }
}

fn env(pins: &[(&str, &str)]) -> BTreeMap<String, String> {
    pins.iter()
        .map(|(name, pin)| (name.to_string(), pin.to_string()))
        .collect()
}

fn versions(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    env(pairs)
}

#[test]
fn transitive_dependency_takes_newest_match() {
    let repo = Fixture::new()
        .version("foo", "1.0.0", &[("bar", ">= 2.0.0")])
        .version("bar", "1.0.0", &[])
        .version("bar", "2.0.0", &[])
        .version("bar", "2.1.0", &[])
        .repo();

    let resolution = resolve(&repo, &["foo@1.0.0"], &env(&[])).unwrap();
    assert_eq!(
        resolution.versions(),
        versions(&[("foo", "1.0.0"), ("bar", "2.1.0")])
    );
}

#[test]
fn unconstrained_run_list_takes_latest() {
    let repo = Fixture::new()
        .version("foo", "1.0.0", &[])
        .version("foo", "1.10.0", &[])
        .version("foo", "1.9.0", &[])
        .repo();

    let resolution = resolve(&repo, &["foo"], &env(&[])).unwrap();
    assert_eq!(resolution.get("foo").unwrap().version.to_string(), "1.10.0");
}

#[test]
fn recipe_qualifier_names_the_cookbook() {
    let repo = Fixture::new()
        .version("foo", "1.0.0", &[])
        .version("foo", "2.0.0", &[])
        .repo();

    let resolution = resolve(&repo, &["foo::server@1.0.0"], &env(&[])).unwrap();
    assert_eq!(resolution.versions(), versions(&[("foo", "1.0.0")]));
}

#[test]
fn later_run_list_entry_replaces_earlier() {
    let repo = Fixture::new()
        .version("foo", "1.0.0", &[])
        .version("foo", "2.0.0", &[])
        .repo();

    let resolution = resolve(&repo, &["foo::server@1.0.0", "foo::client"], &env(&[])).unwrap();
    assert_eq!(resolution.len(), 1);
    assert_eq!(resolution.versions(), versions(&[("foo", "2.0.0")]));
}

#[test]
fn environment_pin_without_match_fails() {
    let repo = Fixture::new().version("foo", "2.0.0", &[]).repo();

    let err = resolve(&repo, &["foo"], &env(&[("foo", "= 1.0.0")])).unwrap_err();
    match err {
        ShelfError::NoSatisfyingVersion {
            package,
            constraints,
        } => {
            assert_eq!(package, "foo");
            assert_eq!(constraints, "= 1.0.0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn environment_pin_conflicts_with_run_list() {
    let repo = Fixture::new()
        .version("foo", "1.0.0", &[])
        .version("foo", "2.0.0", &[])
        .repo();

    let err = resolve(&repo, &["foo@1.0.0"], &env(&[("foo", "= 2.0.0")])).unwrap_err();
    assert!(matches!(
        err,
        ShelfError::ConstraintConflict { ref package, .. } if package == "foo"
    ));
}

#[test]
fn environment_pin_tightens_run_list() {
    let repo = Fixture::new()
        .version("foo", "1.1.0", &[])
        .version("foo", "1.2.0", &[])
        .version("foo", "1.9.0", &[])
        .version("foo", "2.0.0", &[])
        .repo();

    let resolution = resolve(&repo, &["foo"], &env(&[("foo", "~> 1.2")])).unwrap();
    assert_eq!(resolution.versions(), versions(&[("foo", "1.9.0")]));
}

#[test]
fn environment_pins_skip_transitive_cookbooks() {
    let repo = Fixture::new()
        .version("foo", "1.0.0", &[("bar", "")])
        .version("bar", "1.0.0", &[])
        .version("bar", "2.0.0", &[])
        .repo();

    let resolution = resolve(&repo, &["foo"], &env(&[("bar", "= 1.0.0")])).unwrap();
    assert_eq!(
        resolution.versions(),
        versions(&[("foo", "1.0.0"), ("bar", "2.0.0")])
    );
}

#[test]
fn malformed_environment_pin_is_fatal() {
    let repo = Fixture::new().version("foo", "1.0.0", &[]).repo();

    assert!(resolve(&repo, &["foo"], &env(&[("foo", "1.0.0")])).is_err());
    // Pins for cookbooks outside the run list are never read.
    assert!(resolve(&repo, &["foo"], &env(&[("other", "1.0.0")])).is_ok());
}

#[test]
fn constraints_accumulate_across_dependents() {
    let repo = Fixture::new()
        .version("app", "1.0.0", &[("lib", "< 2.0")])
        .version("web", "1.0.0", &[("lib", ">= 1.1")])
        .version("lib", "1.0.0", &[])
        .version("lib", "1.1.0", &[])
        .version("lib", "1.5.0", &[])
        .version("lib", "2.0.0", &[])
        .repo();

    let resolution = resolve(&repo, &["app", "web"], &env(&[])).unwrap();
    assert_eq!(resolution.get("lib").unwrap().version.to_string(), "1.5.0");
}

#[test]
fn dependency_conflicts_with_run_list() {
    let repo = Fixture::new()
        .version("app", "1.0.0", &[("lib", ">= 2.0")])
        .version("lib", "1.0.0", &[])
        .version("lib", "2.0.0", &[])
        .repo();

    let err = resolve(&repo, &["app", "lib@1.0.0"], &env(&[])).unwrap_err();
    match err {
        ShelfError::DependencyConflict {
            package,
            dependent,
            dependent_version,
            constraint,
            existing,
        } => {
            assert_eq!(package, "lib");
            assert_eq!(dependent, "app");
            assert_eq!(dependent_version, "1.0.0");
            assert_eq!(constraint, ">= 2.0");
            assert_eq!(existing, "= 1.0.0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsatisfiable_new_dependency() {
    let repo = Fixture::new()
        .version("app", "1.0.0", &[("lib", "> 5.0")])
        .version("lib", "1.0.0", &[])
        .repo();

    let err = resolve(&repo, &["app"], &env(&[])).unwrap_err();
    assert!(matches!(
        err,
        ShelfError::NoSatisfyingVersion { ref package, .. } if package == "lib"
    ));
}

#[test]
fn missing_cookbooks_are_not_found() {
    let repo = Fixture::new()
        .version("app", "1.0.0", &[("ghost", "")])
        .repo();

    let err = resolve(&repo, &["app"], &env(&[])).unwrap_err();
    assert!(matches!(err, ShelfError::NotFound { ref package } if package == "ghost"));

    let err = resolve(&repo, &["nothing"], &env(&[])).unwrap_err();
    assert!(matches!(err, ShelfError::NotFound { ref package } if package == "nothing"));
}

#[test]
fn invalid_run_list_entry() {
    let repo = Fixture::new().version("foo", "1.0.0", &[]).repo();

    let err = resolve(&repo, &["foo@1.0@2.0"], &env(&[])).unwrap_err();
    assert!(matches!(err, ShelfError::InvalidRunListEntry { .. }));
}

#[test]
fn circular_dependencies_terminate() {
    let repo = Fixture::new()
        .version("a", "1.0.0", &[("b", "")])
        .version("b", "1.0.0", &[("c", ">= 1.0")])
        .version("c", "1.0.0", &[("a", "= 1.0.0")])
        .repo();

    let resolution = resolve(&repo, &["a"], &env(&[])).unwrap();
    assert_eq!(
        resolution.versions(),
        versions(&[("a", "1.0.0"), ("b", "1.0.0"), ("c", "1.0.0")])
    );
}

#[test]
fn empty_run_list() {
    let repo = Fixture::new().version("foo", "1.0.0", &[]).repo();
    let resolution = resolve::<_, &str>(&repo, &[], &env(&[])).unwrap();
    assert!(resolution.is_empty());
}

#[test]
fn resolution_is_repeatable() {
    let repo = Fixture::new()
        .version("app", "1.0.0", &[("lib", "~> 1.0"), ("util", "")])
        .version("app", "1.1.0", &[("lib", "~> 1.1")])
        .version("lib", "1.0.0", &[("util", "< 3.0")])
        .version("lib", "1.4.0", &[("util", "< 3.0")])
        .version("util", "2.0.0", &[])
        .version("util", "3.0.0", &[])
        .repo();

    let resolver = Resolver::new(&repo);
    let pins = env(&[("app", "< 1.1")]);
    let first = resolver.resolve(&["app"], &pins).unwrap();
    let second = resolver.resolve(&["app"], &pins).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.versions(),
        versions(&[("app", "1.0.0"), ("lib", "1.4.0"), ("util", "2.0.0")])
    );
}

#[test]
fn resolved_metadata_lists_every_division() {
    let repo = Fixture::new().version("foo", "1.0.0", &[]).repo();

    let resolution = resolve(&repo, &["foo"], &env(&[])).unwrap();
    let json = resolution.to_json();
    let foo = &json["foo"];
    assert_eq!(foo["cookbook_name"], "foo");
    assert_eq!(foo["version"], "1.0.0");
    for division in Division::ALL {
        assert!(
            foo[division.key()].as_array().is_some_and(|a| a.is_empty()),
            "missing {}",
            division.key()
        );
    }
}
