//! Version constraints (`>= 1.2.3`, `~> 2.1`) and their evaluation.
//!
//! Evaluation is shaped for a walk over versions sorted newest first: a
//! candidate either matches ([`Outcome::Ok`]), may be followed by a match
//! ([`Outcome::Skip`]), or proves no later candidate can match
//! ([`Outcome::Break`]).

use std::fmt;
use std::str::FromStr;

use cookshelf_util::errors::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Constraint operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    /// `~>`, "approximately greater than".
    Pessimistic,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Pessimistic => "~>",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Operator::Eq),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Ge),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            "~>" => Some(Operator::Pessimistic),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one candidate against a constraint during a
/// descending walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Skip,
    Break,
}

/// Check `candidate` against `op bound`.
pub fn evaluate(candidate: &Version, bound: &Version, op: Operator) -> Outcome {
    match op {
        Operator::Eq => {
            if candidate == bound {
                Outcome::Ok
            } else if candidate < bound {
                Outcome::Break
            } else {
                Outcome::Skip
            }
        }
        Operator::Gt => {
            if candidate > bound {
                Outcome::Ok
            } else {
                Outcome::Break
            }
        }
        Operator::Lt => {
            if candidate < bound {
                Outcome::Ok
            } else {
                Outcome::Skip
            }
        }
        Operator::Ge => {
            if candidate >= bound {
                Outcome::Ok
            } else {
                Outcome::Break
            }
        }
        Operator::Le => {
            if candidate <= bound {
                Outcome::Ok
            } else {
                Outcome::Skip
            }
        }
        Operator::Pessimistic => {
            if candidate < bound {
                Outcome::Break
            } else if bound
                .pessimistic_upper_bound()
                .map_or(true, |upper| *candidate < upper)
            {
                Outcome::Ok
            } else {
                Outcome::Skip
            }
        }
    }
}

/// An operator paired with a version bound, written `OP VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Constraint {
    pub op: Operator,
    pub version: Version,
}

impl Constraint {
    pub fn new(op: Operator, version: Version) -> Self {
        Self { op, version }
    }

    /// Parse `OP VERSION`: exactly two tokens separated by a single space.
    pub fn parse(text: &str) -> ShelfResult<Self> {
        let tokens: Vec<&str> = text.split(' ').collect();
        let [op, version] = tokens.as_slice() else {
            return Err(ShelfError::InvalidConstraintFormat {
                constraint: text.to_string(),
            });
        };
        let op = Operator::from_token(op).ok_or_else(|| ShelfError::InvalidConstraint {
            constraint: text.to_string(),
            operator: op.to_string(),
        })?;
        Ok(Self {
            op,
            version: Version::parse(version)?,
        })
    }

    /// Parse requirement text where the empty string means "any version".
    pub fn parse_optional(text: &str) -> ShelfResult<Option<Self>> {
        if text.is_empty() {
            Ok(None)
        } else {
            Self::parse(text).map(Some)
        }
    }

    /// Shorthand for `= version`, as written by `name@version`.
    pub fn exact(version: Version) -> Self {
        Self::new(Operator::Eq, version)
    }

    pub fn evaluate(&self, candidate: &Version) -> Outcome {
        evaluate(candidate, &self.version, self.op)
    }

    pub fn matches(&self, candidate: &Version) -> bool {
        self.evaluate(candidate) == Outcome::Ok
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

impl FromStr for Constraint {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Constraint {
    type Error = ShelfError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Constraint> for String {
    fn from(c: Constraint) -> Self {
        c.to_string()
    }
}

/// Render a constraint list the way error messages show it.
pub fn join_constraints(constraints: &[Constraint]) -> String {
    if constraints.is_empty() {
        return "(none)".to_string();
    }
    constraints
        .iter()
        .map(Constraint::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
