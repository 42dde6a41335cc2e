//! Conflicts between run-list and environment constraints.

use std::fmt;

use cookshelf_core::constraint::Constraint;
use cookshelf_util::errors::ShelfError;

/// A run-list constraint that cannot be reconciled with an environment
/// constraint for the same cookbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub requested: Constraint,
    pub environment: Constraint,
}

impl MergeConflict {
    /// Attach the cookbook name, producing the error reported to callers.
    pub fn into_error(self, package: &str) -> ShelfError {
        ShelfError::ConstraintConflict {
            package: package.to_string(),
            requested: self.requested.to_string(),
            environment: self.environment.to_string(),
        }
    }
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' conflicts with environment constraint '{}'",
            self.requested, self.environment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_package_and_both_constraints() {
        let conflict = MergeConflict {
            requested: Constraint::parse("= 1.0.0").unwrap(),
            environment: Constraint::parse("= 2.0.0").unwrap(),
        };
        assert_eq!(
            conflict.to_string(),
            "'= 1.0.0' conflicts with environment constraint '= 2.0.0'"
        );
        match conflict.into_error("apache2") {
            ShelfError::ConstraintConflict {
                package,
                requested,
                environment,
            } => {
                assert_eq!(package, "apache2");
                assert_eq!(requested, "= 1.0.0");
                assert_eq!(environment, "= 2.0.0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
