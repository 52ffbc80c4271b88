// src/version/range.rs

//! Version ranges from requirement strings
//!
//! A range is a comma-separated list of clauses (`>=3.21.0,<3.22`), all of
//! which must hold. Clause semantics follow PEP 440, including the
//! compatible-release operator (`~=`) and `==X.*` prefix matching.

use super::Version;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `~=`
    Compatible,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `===`, plain string equality
    Arbitrary,
}

impl Operator {
    /// Operator spellings, longest first so prefixes do not shadow them
    const SPELLINGS: [(&'static str, Operator); 8] = [
        ("===", Operator::Arbitrary),
        ("~=", Operator::Compatible),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessOrEqual),
        (">=", Operator::GreaterOrEqual),
        ("<", Operator::LessThan),
        (">", Operator::GreaterThan),
    ];

    fn as_str(self) -> &'static str {
        Self::SPELLINGS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(s, _)| *s)
            .unwrap_or("")
    }
}

/// A single `<op><version>` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionClause {
    pub operator: Operator,
    /// Parsed version; `None` only for `===` against a non-PEP 440 literal
    pub version: Option<Version>,
    /// Literal text after the operator, without a trailing `.*`
    pub literal: String,
    /// `==X.*` / `!=X.*`
    pub wildcard: bool,
}

impl VersionClause {
    /// Parse one clause, e.g. `>= 3.21.0` or `==3.*`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (operator, rest) = Operator::SPELLINGS
            .iter()
            .find_map(|(spelling, op)| s.strip_prefix(*spelling).map(|rest| (*op, rest.trim())))
            .ok_or_else(|| Error::ParseError(format!("Missing operator in clause '{}'", s)))?;

        if rest.is_empty() {
            return Err(Error::ParseError(format!("Missing version in clause '{}'", s)));
        }

        if operator == Operator::Arbitrary {
            return Ok(Self {
                operator,
                version: Version::parse(rest).ok(),
                literal: rest.to_string(),
                wildcard: false,
            });
        }

        let (literal, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) if matches!(operator, Operator::Equal | Operator::NotEqual) => {
                (prefix, true)
            }
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Wildcard not allowed with '{}' in clause '{}'",
                    operator.as_str(),
                    s
                )));
            }
            None => (rest, false),
        };

        let version = Version::parse(literal)
            .map_err(|e| Error::ParseError(format!("Bad version in clause '{}': {}", s, e)))?;

        if operator == Operator::Compatible && version.release.len() < 2 {
            return Err(Error::ParseError(format!(
                "'~=' needs at least two release segments in clause '{}'",
                s
            )));
        }

        Ok(Self {
            operator,
            version: Some(version),
            literal: literal.to_string(),
            wildcard,
        })
    }

    /// Whether this clause opts the range into matching pre-releases
    fn admits_prereleases(&self) -> bool {
        match (self.operator, &self.version) {
            (
                Operator::Compatible
                | Operator::Equal
                | Operator::LessOrEqual
                | Operator::GreaterOrEqual
                | Operator::Arbitrary,
                Some(v),
            ) => v.is_prerelease(),
            _ => false,
        }
    }

    /// Check if a version satisfies this clause
    pub fn matches(&self, candidate: &Version) -> bool {
        let Some(spec) = &self.version else {
            return candidate.to_string().eq_ignore_ascii_case(&self.literal);
        };

        match self.operator {
            Operator::Compatible => {
                let prefix = &spec.release[..spec.release.len() - 1];
                candidate.public().cmp_padded(spec) != Ordering::Less
                    && release_prefix_matches(candidate, spec.epoch, prefix)
            }
            Operator::Equal => self.equals(candidate, spec),
            Operator::NotEqual => !self.equals(candidate, spec),
            Operator::LessOrEqual => candidate.public().cmp_padded(spec) != Ordering::Greater,
            Operator::GreaterOrEqual => candidate.public().cmp_padded(spec) != Ordering::Less,
            Operator::LessThan => {
                candidate.cmp_padded(spec) == Ordering::Less
                    && !(candidate.is_prerelease()
                        && !spec.is_prerelease()
                        && same_base(candidate, spec))
            }
            Operator::GreaterThan => {
                candidate.cmp_padded(spec) == Ordering::Greater
                    && !(candidate.is_postrelease()
                        && !spec.is_postrelease()
                        && same_base(candidate, spec))
                    && !(!candidate.local.is_empty() && same_base(candidate, spec))
            }
            Operator::Arbitrary => candidate.to_string().eq_ignore_ascii_case(&self.literal),
        }
    }

    fn equals(&self, candidate: &Version, spec: &Version) -> bool {
        if self.wildcard {
            release_prefix_matches(candidate, spec.epoch, &spec.release)
        } else if spec.local.is_empty() {
            candidate.public().cmp_padded(spec) == Ordering::Equal
        } else {
            candidate.cmp_padded(spec) == Ordering::Equal
        }
    }
}

fn release_prefix_matches(candidate: &Version, epoch: u64, prefix: &[u64]) -> bool {
    candidate.epoch == epoch
        && prefix
            .iter()
            .enumerate()
            .all(|(i, segment)| candidate.release.get(i).copied().unwrap_or(0) == *segment)
}

fn same_base(a: &Version, b: &Version) -> bool {
    a.base().cmp_padded(&b.base()) == Ordering::Equal
}

impl fmt::Display for VersionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.literal)?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        Ok(())
    }
}

/// A set of clauses that must all be satisfied
///
/// An empty range accepts every final release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRange {
    clauses: Vec<VersionClause>,
}

impl VersionRange {
    /// Parse a range string
    ///
    /// Examples:
    /// - ">=3.21.0,<3.22" → two clauses
    /// - "~=3.21" → compatible release
    /// - "" → any version
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        let clauses = s
            .split(',')
            .map(VersionClause::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[VersionClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check if a version lies inside this range
    ///
    /// Pre-releases are only admitted when one of the clauses names a
    /// pre-release itself.
    pub fn contains(&self, version: &Version) -> bool {
        if version.is_prerelease() && !self.clauses.iter().any(|c| c.admits_prereleases()) {
            return false;
        }
        self.clauses.iter().all(|c| c.matches(version))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", clauses.join(","))
    }
}
