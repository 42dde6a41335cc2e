use std::cmp::Ordering;
use std::str::FromStr;

use cookshelf_core::version::Version;
use cookshelf_util::errors::ShelfError;

#[test]
fn parse_valid_version() {
    let v = Version::from_str("2.3.1").unwrap();
    assert_eq!(v.major(), 2);
    assert_eq!(v.minor(), 3);
    assert_eq!(v.patch(), 1);
}

#[test]
fn patch_defaults_to_zero() {
    let v = Version::from_str("4.7").unwrap();
    assert_eq!(v.patch(), 0);
    assert_eq!(v.canonical(), "4.7.0");
}

#[test]
fn parse_invalid_version() {
    for bad in ["", "1", "not-a-version", "1.2.3.4", "1.-2", "1.2.", "v1.2"] {
        let err = Version::from_str(bad).unwrap_err();
        assert!(
            matches!(err, ShelfError::InvalidVersionFormat { .. }),
            "{bad}: {err}"
        );
    }
}

#[test]
fn version_ordering_is_numeric() {
    let v9 = Version::from_str("9.0.0").unwrap();
    let v10 = Version::from_str("10.0.0").unwrap();
    assert_eq!(v10.cmp(&v9), Ordering::Greater);
    assert_eq!(v9.cmp(&v10), Ordering::Less);
}

#[test]
fn comparison_is_antisymmetric_and_transitive() {
    let versions: Vec<Version> = ["0.1", "1.0.0", "1.0.1", "1.2", "1.10.0", "2.0"]
        .iter()
        .map(|s| Version::from_str(s).unwrap())
        .collect();
    for a in &versions {
        for b in &versions {
            assert_eq!(a.cmp(b), b.cmp(a).reverse());
            for c in &versions {
                if a < b && b < c {
                    assert!(a < c);
                }
            }
        }
    }
}

#[test]
fn round_trip_keeps_numeric_value() {
    for text in ["1.2", "1.2.0", "0.0.1", "12.34.56"] {
        let v = Version::from_str(text).unwrap();
        let again = Version::from_str(&v.to_string()).unwrap();
        assert_eq!(v, again);
        assert_eq!(v.to_string(), text);
    }
}

#[test]
fn serde_as_string() {
    let v: Version = serde_json::from_str("\"1.4.2\"").unwrap();
    assert_eq!(v, Version::new(1, 4, 2));
    assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.4.2\"");
    assert!(serde_json::from_str::<Version>("\"1.x\"").is_err());
}
