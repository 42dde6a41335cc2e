//! Folding an environment's cookbook version pin into a run-list constraint.
//!
//! The environment may tighten a run-list constraint but never loosen it,
//! and an exact pin in the environment is never negotiable.

use cookshelf_core::constraint::{Constraint, Operator, Outcome};

use crate::conflict::MergeConflict;

/// Combine a run-list constraint (if any) with an environment constraint.
///
/// - No run-list constraint: the environment's applies.
/// - Same version on both sides: the environment's applies.
/// - `>`/`>=` in the environment replaces a lower run-list bound.
/// - `<`/`<=` in the environment replaces a higher run-list bound.
/// - `=` in the environment with a different version is a conflict.
/// - `~>` in the environment applies if the run-list version falls in its
///   range, otherwise it is a conflict.
pub fn merge(
    requested: Option<&Constraint>,
    environment: &Constraint,
) -> Result<Constraint, MergeConflict> {
    let Some(requested) = requested else {
        return Ok(environment.clone());
    };

    if requested.version == environment.version {
        return Ok(environment.clone());
    }

    let conflict = || MergeConflict {
        requested: requested.clone(),
        environment: environment.clone(),
    };

    match environment.op {
        Operator::Gt | Operator::Ge => {
            if requested.version < environment.version {
                Ok(environment.clone())
            } else {
                Ok(requested.clone())
            }
        }
        Operator::Lt | Operator::Le => {
            if requested.version >= environment.version {
                Ok(environment.clone())
            } else {
                Ok(requested.clone())
            }
        }
        Operator::Eq => Err(conflict()),
        Operator::Pessimistic => {
            if environment.evaluate(&requested.version) == Outcome::Ok {
                Ok(environment.clone())
            } else {
                Err(conflict())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Constraint {
        Constraint::parse(s).unwrap()
    }

    fn merged(requested: &str, environment: &str) -> Result<String, MergeConflict> {
        let requested = (!requested.is_empty()).then(|| c(requested));
        merge(requested.as_ref(), &c(environment)).map(|m| m.to_string())
    }

    #[test]
    fn no_request_takes_environment() {
        assert_eq!(merged("", "~> 2.0").unwrap(), "~> 2.0");
    }

    #[test]
    fn equal_pins() {
        assert_eq!(merged("= 1.0.0", "= 1.0.0").unwrap(), "= 1.0.0");
    }

    #[test]
    fn equal_versions_prefer_environment() {
        assert_eq!(merged("< 1.0", ">= 1.0.0").unwrap(), ">= 1.0.0");
    }

    #[test]
    fn different_pins_conflict() {
        let err = merged("= 1.0.0", "= 2.0.0").unwrap_err();
        assert_eq!(err.requested, c("= 1.0.0"));
        assert_eq!(err.environment, c("= 2.0.0"));
    }

    #[test]
    fn lower_bound_tightens() {
        assert_eq!(merged(">= 1.0.0", ">= 2.0.0").unwrap(), ">= 2.0.0");
        assert_eq!(merged(">= 3.0.0", ">= 2.0.0").unwrap(), ">= 3.0.0");
        assert_eq!(merged("= 1.0.0", "> 2.0.0").unwrap(), "> 2.0.0");
    }

    #[test]
    fn upper_bound_tightens() {
        assert_eq!(merged("<= 3.0.0", "< 2.0.0").unwrap(), "< 2.0.0");
        assert_eq!(merged("< 1.0.0", "<= 2.0.0").unwrap(), "< 1.0.0");
    }

    #[test]
    fn pessimistic_environment() {
        assert_eq!(merged("= 1.2.5", "~> 1.2.0").unwrap(), "~> 1.2.0");
        assert!(merged("= 1.3.0", "~> 1.2.0").is_err());
        assert!(merged(">= 1.0.0", "~> 1.2.0").is_err());
    }
}
