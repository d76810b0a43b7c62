//! Dotted numeric version type.
//!
//! A version is a non-empty sequence of non-negative integer components
//! (`2.28.0` is `[2, 28, 0]`). Shorter sequences compare as if right-padded
//! with zeros, so `1.0` and `1.0.0` are the same version.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{SproutError, SproutResult};

/// Dotted numeric version (e.g. `1.26.0`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Create a version from its components.
    ///
    /// An empty component list is treated as `0`.
    pub fn new(components: Vec<u64>) -> Self {
        if components.is_empty() {
            return Self {
                components: vec![0],
            };
        }
        Self { components }
    }

    /// Parse a dotted numeric version string
    pub fn parse(text: &str) -> SproutResult<Self> {
        let input = text.trim();

        let components = input
            .split('.')
            .map(|component| {
                // `u64::from_str` accepts a leading '+', which is not a valid component here
                if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(SproutError::MalformedVersion {
                        input: input.to_string(),
                        component: component.to_string(),
                    });
                }
                component.parse::<u64>().map_err(|_| SproutError::MalformedVersion {
                    input: input.to_string(),
                    component: component.to_string(),
                })
            })
            .collect::<SproutResult<Vec<u64>>>()?;

        Ok(Self { components })
    }

    /// Components as parsed
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Leading (major) component
    pub fn leading(&self) -> u64 {
        self.components.first().copied().unwrap_or(0)
    }

    /// Compare two versions after right-padding the shorter one with zeros
    pub fn compare(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for index in 0..len {
            let a = self.components.get(index).copied().unwrap_or(0);
            let b = other.components.get(index).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }

    /// Components with trailing zeros removed; equal versions share this form
    fn significant(&self) -> &[u64] {
        let end = self
            .components
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..end]
    }
}

impl FromStr for Version {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = SproutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }
        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_version_parsing() {
        let v = Version::parse("2.28.0").unwrap();
        assert_eq!(v.components(), &[2, 28, 0]);
        assert_eq!(v.leading(), 2);

        let v = Version::parse(" 7 ").unwrap();
        assert_eq!(v.components(), &[7]);
    }

    #[test]
    fn test_malformed_versions() {
        for input in ["", "1..0", "1.a", "a.1", "1.0-beta", "+1.0", "1.-2", "1.0."] {
            let err = Version::parse(input).unwrap_err();
            assert!(
                matches!(err, SproutError::MalformedVersion { .. }),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::parse("1.26.0").unwrap().to_string(), "1.26.0");
        assert_eq!(Version::parse("1.0").unwrap().to_string(), "1.0");
        assert_eq!(Version::new(vec![]).to_string(), "0");
    }

    #[test]
    fn test_version_comparison() {
        let v1 = Version::parse("1.0.0").unwrap();
        let v2 = Version::parse("2.0.0").unwrap();
        let v3 = Version::parse("1.10.0").unwrap();
        let v4 = Version::parse("1.9").unwrap();

        assert!(v1 < v2);
        assert!(v1 < v3);
        assert!(v3 < v2);
        // numeric, not lexicographic on text
        assert!(v4 < v3);
    }

    #[test]
    fn test_padding_equality() {
        let short = Version::parse("1.0").unwrap();
        let long = Version::parse("1.0.0").unwrap();

        assert_eq!(short.compare(&long), Ordering::Equal);
        assert_eq!(short, long);

        let mut set = HashSet::new();
        set.insert(short);
        assert!(set.contains(&long));

        assert!(Version::parse("1.0.1").unwrap() > Version::parse("1").unwrap());
    }

    #[test]
    fn test_serde_uses_text_form() {
        let v = Version::parse("3.1.4").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"3.1.4\"");

        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);

        assert!(serde_json::from_str::<Version>("\"3.x\"").is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn version_strategy() -> impl Strategy<Value = Version> {
        prop::collection::vec(0u64..20, 1..5).prop_map(Version::new)
    }

    proptest! {
        #[test]
        fn version_text_round_trip(components in prop::collection::vec(0u64..100_000, 1..6)) {
            let original = Version::new(components);
            let parsed = Version::parse(&original.to_string()).unwrap();
            prop_assert_eq!(parsed.components(), original.components());
        }

        #[test]
        fn compare_is_reflexive(a in version_strategy()) {
            prop_assert_eq!(a.compare(&a), Ordering::Equal);
        }

        #[test]
        fn compare_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
            prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
        }

        #[test]
        fn compare_is_transitive(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            if a <= b && b <= c {
                prop_assert!(a <= c, "Transitivity violated: {a} <= {b} <= {c} but {a} > {c}");
            }
            if a >= b && b >= c {
                prop_assert!(a >= c, "Transitivity violated: {a} >= {b} >= {c} but {a} < {c}");
            }
        }

        #[test]
        fn trailing_zeros_do_not_change_order(a in version_strategy(), zeros in 0usize..3) {
            let mut padded = a.components().to_vec();
            padded.extend(std::iter::repeat(0).take(zeros));
            prop_assert_eq!(Version::new(padded), a);
        }
    }
}
