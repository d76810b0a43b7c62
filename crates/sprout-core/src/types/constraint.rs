//! Version constraints and the matching truth table.
//!
//! A constraint is an operator plus a target version. The operator is one of
//! `==`, `>=`, `<=`, `>`, `<` or `~=` ("compatible release"), and defaults to
//! `==` when the text starts directly with a version.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::Version;
use crate::error::{SproutError, SproutResult};

/// Comparison operator for version constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Exact,      // ==1.0.0
    GreaterEq,  // >=1.0.0
    LessEq,     // <=1.0.0
    Greater,    // >1.0.0
    Less,       // <1.0.0
    Compatible, // ~=1.4 (>=1.4, same leading component)
}

/// Operator tokens, two-character tokens first so `>=` is never read as `>`
const OPERATORS: [(&str, Op); 6] = [
    ("==", Op::Exact),
    (">=", Op::GreaterEq),
    ("<=", Op::LessEq),
    ("~=", Op::Compatible),
    (">", Op::Greater),
    ("<", Op::Less),
];

/// A single version constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Constraint {
    pub op: Op,
    pub target: Version,
}

impl Op {
    /// Textual operator token
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Exact => "==",
            Op::GreaterEq => ">=",
            Op::LessEq => "<=",
            Op::Greater => ">",
            Op::Less => "<",
            Op::Compatible => "~=",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Constraint {
    /// Create a new constraint
    pub fn new(op: Op, target: Version) -> Self {
        Self { op, target }
    }

    /// Constraint matching exactly one version
    pub fn exact(target: Version) -> Self {
        Self::new(Op::Exact, target)
    }

    /// Parse a constraint expression such as `>=1.26.0` or `~=2.1`
    pub fn parse(text: &str) -> SproutResult<Self> {
        let input = text.trim();

        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(token, op)| input.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Op::Exact, input));

        let target = Version::parse(rest).map_err(|err| SproutError::MalformedConstraint {
            input: input.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self { op, target })
    }

    /// Parse an optional constraint; empty text and `*` mean "any version"
    pub fn parse_optional(text: &str) -> SproutResult<Option<Self>> {
        match text.trim() {
            "" | "*" => Ok(None),
            other => Self::parse(other).map(Some),
        }
    }

    /// Check whether `version` satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        let ordering = version.compare(&self.target);
        match self.op {
            Op::Exact => ordering == Ordering::Equal,
            Op::GreaterEq => ordering != Ordering::Less,
            Op::LessEq => ordering != Ordering::Greater,
            Op::Greater => ordering == Ordering::Greater,
            Op::Less => ordering == Ordering::Less,
            Op::Compatible => {
                ordering != Ordering::Less && version.leading() == self.target.leading()
            },
        }
    }
}

/// Check whether `version` satisfies `constraint`
pub fn satisfies(version: &Version, constraint: &Constraint) -> bool {
    constraint.matches(version)
}

/// Check whether `version` satisfies every constraint; `None` imposes nothing
pub fn satisfies_all<'a, I>(version: &Version, constraints: I) -> bool
where
    I: IntoIterator<Item = Option<&'a Constraint>>,
{
    constraints
        .into_iter()
        .flatten()
        .all(|constraint| constraint.matches(version))
}

impl FromStr for Constraint {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Constraint {
    type Error = SproutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Constraint> for String {
    fn from(constraint: Constraint) -> Self {
        constraint.to_string()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.target)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn exact_constraint_matches_itself(components in prop::collection::vec(0u64..1000, 1..5)) {
            let version = Version::new(components);
            let constraint = Constraint::parse(&format!("=={}", version)).unwrap();
            prop_assert!(satisfies(&version, &constraint));
        }

        #[test]
        fn compatible_implies_greater_eq(
            a in prop::collection::vec(0u64..10, 1..4),
            b in prop::collection::vec(0u64..10, 1..4),
        ) {
            let version = Version::new(a);
            let target = Version::new(b);
            if Constraint::new(Op::Compatible, target.clone()).matches(&version) {
                prop_assert!(Constraint::new(Op::GreaterEq, target).matches(&version));
            }
        }
    }
}
