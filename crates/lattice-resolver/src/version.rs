//! Package versions and version constraints

use crate::error::{ResolveError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-([a-zA-Z0-9.-]+))?$").expect("valid version regex")
    })
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(>=|<=|>|<)\s*([0-9A-Za-z.-]+)(?:\s*,?\s*(>=|<=|>|<)\s*([0-9A-Za-z.-]+))?$")
            .expect("valid range regex")
    })
}

/// A parsed semantic version: `major.minor.patch[-prerelease]`
///
/// Releases order after every prerelease of the same `major.minor.patch`;
/// prerelease tags compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

impl PackageVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Parse a version string, rejecting anything outside the version grammar
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || ResolveError::InvalidVersion {
            input: input.to_string(),
        };

        let caps = version_pattern().captures(input).ok_or_else(invalid)?;
        let number = |i: usize| caps[i].parse::<u64>().map_err(|_| invalid());

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Three-way comparison
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// True when the caret range of either version contains the other
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        VersionConstraint::Caret(self.clone()).matches(other)
            || VersionConstraint::Caret(other.clone()).matches(self)
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

impl FromStr for PackageVersion {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageVersion {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PackageVersion> for String {
    fn from(version: PackageVersion) -> Self {
        version.to_string()
    }
}

/// Comparison operator in a range constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

impl ComparisonOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            ">" => Some(ComparisonOp::Greater),
            ">=" => Some(ComparisonOp::GreaterEq),
            "<" => Some(ComparisonOp::Less),
            "<=" => Some(ComparisonOp::LessEq),
            _ => None,
        }
    }

    fn is_lower_bound(self) -> bool {
        matches!(self, ComparisonOp::Greater | ComparisonOp::GreaterEq)
    }

    fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEq => ">=",
            ComparisonOp::Less => "<",
            ComparisonOp::LessEq => "<=",
        }
    }
}

/// A single `op version` bound
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparator {
    pub op: ComparisonOp,
    pub version: PackageVersion,
}

impl Comparator {
    pub fn matches(&self, version: &PackageVersion) -> bool {
        match self.op {
            ComparisonOp::Greater => version > &self.version,
            ComparisonOp::GreaterEq => version >= &self.version,
            ComparisonOp::Less => version < &self.version,
            ComparisonOp::LessEq => version <= &self.version,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// Version requirement declared on a dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionConstraint {
    /// `*`
    Wildcard,
    /// `1.2.3`
    Exact(PackageVersion),
    /// `^1.2.3` := >=1.2.3, same major
    Caret(PackageVersion),
    /// `~1.2.3` := >=1.2.3, same major and minor
    Tilde(PackageVersion),
    /// `>=1.0.0`, `<2.0.0`, or a bounded pair `>=1.0.0 <2.0.0`
    Range(Vec<Comparator>),
}

impl VersionConstraint {
    /// Parse a constraint; strings outside the recognized grammars are rejected
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let invalid = |reason: &str| ResolveError::InvalidConstraint {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("constraint is empty"));
        }

        if s == "*" {
            return Ok(VersionConstraint::Wildcard);
        }

        let version = |text: &str| {
            PackageVersion::parse(text.trim())
                .map_err(|_| invalid(&format!("'{}' is not a valid version", text.trim())))
        };

        if let Some(rest) = s.strip_prefix('^') {
            return Ok(VersionConstraint::Caret(version(rest)?));
        }
        if let Some(rest) = s.strip_prefix('~') {
            return Ok(VersionConstraint::Tilde(version(rest)?));
        }

        if s.starts_with(['<', '>']) {
            let caps = range_pattern()
                .captures(s)
                .ok_or_else(|| invalid("unrecognized range syntax"))?;

            let mut comparators = Vec::with_capacity(2);
            for (op, ver) in [(1, 2), (3, 4)] {
                if let (Some(op), Some(ver)) = (caps.get(op), caps.get(ver)) {
                    comparators.push(Comparator {
                        op: ComparisonOp::parse(op.as_str())
                            .ok_or_else(|| invalid("unknown comparison operator"))?,
                        version: version(ver.as_str())?,
                    });
                }
            }

            if let [first, second] = comparators.as_slice() {
                if first.op.is_lower_bound() == second.op.is_lower_bound() {
                    return Err(invalid("a range must combine a lower and an upper bound"));
                }
            }

            return Ok(VersionConstraint::Range(comparators));
        }

        Ok(VersionConstraint::Exact(version(s)?))
    }

    /// Check if version satisfies constraint
    pub fn matches(&self, version: &PackageVersion) -> bool {
        match self {
            VersionConstraint::Wildcard => true,
            VersionConstraint::Exact(v) => version == v,
            VersionConstraint::Caret(v) => version >= v && version.major == v.major,
            VersionConstraint::Tilde(v) => {
                version >= v && version.major == v.major && version.minor == v.minor
            }
            VersionConstraint::Range(comparators) => comparators.iter().all(|c| c.matches(version)),
        }
    }

    /// Parse `version` and evaluate the constraint against it
    ///
    /// A malformed version is an error, never a silent `false`.
    pub fn satisfies(&self, version: &str) -> Result<bool> {
        let parsed = PackageVersion::parse(version)?;
        Ok(self.matches(&parsed))
    }

    /// Caret and tilde constraints prefer releases over prereleases
    pub fn prefers_release(&self) -> bool {
        matches!(self, VersionConstraint::Caret(_) | VersionConstraint::Tilde(_))
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Wildcard => write!(f, "*"),
            VersionConstraint::Exact(v) => write!(f, "{}", v),
            VersionConstraint::Caret(v) => write!(f, "^{}", v),
            VersionConstraint::Tilde(v) => write!(f, "~{}", v),
            VersionConstraint::Range(comparators) => {
                let parts: Vec<String> = comparators.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionConstraint {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionConstraint> for String {
    fn from(constraint: VersionConstraint) -> Self {
        constraint.to_string()
    }
}
