// src/version/mod.rs

//! Version handling and constraint satisfaction for package dependencies
//!
//! This module provides version parsing and comparison for PEP 440 style
//! versions as published on the Python package index, including support for
//! epochs, pre-, post- and dev-releases, and local version labels.
//!
//! Requirement strings (`pulpcore (>=3.21,<3.22)`) and their version ranges
//! live in the `requirement` and `range` submodules.

mod range;
mod requirement;

pub use range::{Operator, VersionClause, VersionRange};
pub use requirement::{normalize_name, Requirement};

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// Pre-release phase, ordered alpha < beta < release candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrePhase {
    Alpha,
    Beta,
    Candidate,
}

impl PrePhase {
    fn as_str(self) -> &'static str {
        match self {
            PrePhase::Alpha => "a",
            PrePhase::Beta => "b",
            PrePhase::Candidate => "rc",
        }
    }
}

/// A pre-release marker such as `rc1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub phase: PrePhase,
    pub number: u64,
}

/// One dot-separated segment of a local version label
///
/// Alphanumeric segments sort before numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    Alpha(String),
    Numeric(u64),
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSegment::Alpha(s) => write!(f, "{}", s),
            LocalSegment::Numeric(n) => write!(f, "{}", n),
        }
    }
}

/// A parsed PEP 440 version
///
/// Format: `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`
/// Examples:
/// - "3.21.0" → release=[3, 21, 0]
/// - "1!2.0" → epoch=1, release=[2, 0]
/// - "3.22.0rc1" → pre=rc1
/// - "1.0.post2.dev3" → post=2, dev=3
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<PreRelease>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Vec<LocalSegment>,
}

/// Sort key helper: `Min` sorts before every value, `Max` after
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bound<T> {
    Min,
    Value(T),
    Max,
}

impl Version {
    /// Parse a version string
    ///
    /// Accepts the alternative spellings PEP 440 normalizes (`alpha`, `beta`,
    /// `c`, `pre`, `preview`, `rev`, `r`, implicit `-N` post-releases, `_`/`-`
    /// separators, a leading `v`) and is case-insensitive.
    pub fn parse(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let text = lowered.strip_prefix('v').unwrap_or(&lowered);

        let (public, local) = match text.split_once('+') {
            Some((p, l)) => (p, Some(l)),
            None => (text, None),
        };

        let (epoch, public) = match public.split_once('!') {
            Some((e, rest)) => {
                let epoch = e.parse::<u64>().map_err(|e| {
                    Error::InvalidVersion(format!("Invalid epoch in version '{}': {}", s, e))
                })?;
                (epoch, rest)
            }
            None => (0, public),
        };

        let mut scanner = Scanner::new(public);

        let mut release = vec![scanner
            .number()
            .ok_or_else(|| Error::InvalidVersion(format!("Missing release number in '{}'", s)))?];
        while scanner.peek() == Some(b'.') && scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            scanner.bump();
            // peeked digit above, so this cannot fail
            release.push(scanner.number().unwrap_or(0));
        }

        let pre = scanner.pre_release();
        let post = scanner.post_release();
        let dev = scanner.dev_release();

        if !scanner.is_done() {
            return Err(Error::InvalidVersion(format!(
                "Unexpected trailing text '{}' in version '{}'",
                scanner.remaining(),
                s
            )));
        }

        let local = match local {
            Some(label) => parse_local(label).ok_or_else(|| {
                Error::InvalidVersion(format!("Invalid local version label in '{}'", s))
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// Whether this is a pre-release (including dev-releases)
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// This version with the local label removed
    pub fn public(&self) -> Version {
        Version {
            local: Vec::new(),
            ..self.clone()
        }
    }

    /// Epoch and release only, e.g. `1.0` for `1.0rc1.post2+abc`
    pub fn base(&self) -> Version {
        Version {
            epoch: self.epoch,
            release: self.release.clone(),
            pre: None,
            post: None,
            dev: None,
            local: Vec::new(),
        }
    }

    /// Compare treating missing release segments as zero
    ///
    /// `1.0` and `1.0.0` are equal under this comparison. Range checks use
    /// it; the `Ord` impl additionally breaks such ties by segment count.
    pub fn cmp_padded(&self, other: &Version) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post_key().cmp(&other.post_key()))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }

    fn pre_key(&self) -> Bound<PreRelease> {
        match (self.pre, self.post, self.dev) {
            // 1.0.dev0 sorts before 1.0a0
            (None, None, Some(_)) => Bound::Min,
            (None, _, _) => Bound::Max,
            (Some(pre), _, _) => Bound::Value(pre),
        }
    }

    fn post_key(&self) -> Bound<u64> {
        self.post.map_or(Bound::Min, Bound::Value)
    }

    fn dev_key(&self) -> Bound<u64> {
        self.dev.map_or(Bound::Max, Bound::Value)
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    Ordering::Equal
}

fn parse_local(label: &str) -> Option<Vec<LocalSegment>> {
    label
        .split(['.', '-', '_'])
        .map(|seg| {
            if seg.is_empty() || !seg.chars().all(|c| c.is_ascii_alphanumeric()) {
                None
            } else if let Ok(n) = seg.parse::<u64>() {
                Some(LocalSegment::Numeric(n))
            } else {
                Some(LocalSegment::Alpha(seg.to_string()))
            }
        })
        .collect()
}

/// Byte cursor over the public part of a version string
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn is_done(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos.min(self.text.len())..]
    }

    fn number(&mut self) -> Option<u64> {
        let digits = self
            .remaining()
            .bytes()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits == 0 {
            return None;
        }
        let value = self.remaining()[..digits].parse::<u64>().ok()?;
        self.pos += digits;
        Some(value)
    }

    fn separator(&mut self) -> bool {
        if matches!(self.peek(), Some(b'.' | b'-' | b'_')) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the first matching word, longest spellings listed first
    fn word(&mut self, words: &[&str]) -> Option<usize> {
        let rest = self.remaining();
        let index = words.iter().position(|w| rest.starts_with(w))?;
        self.pos += words[index].len();
        Some(index)
    }

    /// Optional `[sep]N`; an implicit number is zero
    fn implicit_number(&mut self) -> u64 {
        let start = self.pos;
        self.separator();
        match self.number() {
            Some(n) => n,
            None => {
                self.pos = start;
                0
            }
        }
    }

    fn pre_release(&mut self) -> Option<PreRelease> {
        let start = self.pos;
        self.separator();
        let phase = match self.word(&["alpha", "a", "beta", "b", "preview", "pre", "rc", "c"]) {
            Some(0 | 1) => PrePhase::Alpha,
            Some(2 | 3) => PrePhase::Beta,
            Some(_) => PrePhase::Candidate,
            None => {
                self.pos = start;
                return None;
            }
        };
        let number = self.implicit_number();
        Some(PreRelease { phase, number })
    }

    fn post_release(&mut self) -> Option<u64> {
        if self.peek() == Some(b'-') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            return self.number();
        }
        let start = self.pos;
        self.separator();
        if self.word(&["post", "rev", "r"]).is_none() {
            self.pos = start;
            return None;
        }
        Some(self.implicit_number())
    }

    fn dev_release(&mut self) -> Option<u64> {
        let start = self.pos;
        self.separator();
        if self.word(&["dev"]).is_none() {
            self.pos = start;
            return None;
        }
        Some(self.implicit_number())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(pre) = self.pre {
            write!(f, "{}{}", pre.phase.as_str(), pre.number)?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        if !self.local.is_empty() {
            let local: Vec<String> = self.local.iter().map(|s| s.to_string()).collect();
            write!(f, "+{}", local.join("."))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_padded(other)
            .then_with(|| self.release.len().cmp(&other.release.len()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order version strings newest first
///
/// Entries that do not parse are logged and left out of the result.
pub fn order_descending<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed: Vec<(Version, String)> = versions
        .into_iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            match Version::parse(raw) {
                Ok(v) => Some((v, raw.to_string())),
                Err(e) => {
                    warn!("Skipping unparseable version '{}': {}", raw, e);
                    None
                }
            }
        })
        .collect();

    parsed.sort_by(|(a, _), (b, _)| b.cmp(a));
    parsed.into_iter().map(|(_, raw)| raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse_simple() {
        let version = v("3.21.0");
        assert_eq!(version.epoch, 0);
        assert_eq!(version.release, vec![3, 21, 0]);
        assert_eq!(version.pre, None);
        assert_eq!(version.post, None);
        assert_eq!(version.dev, None);
    }

    #[test]
    fn test_version_parse_with_epoch() {
        let version = v("2!1.0");
        assert_eq!(version.epoch, 2);
        assert_eq!(version.release, vec![1, 0]);
    }

    #[test]
    fn test_version_parse_suffixes() {
        let version = v("1.0rc2.post3.dev4+ubuntu.1");
        assert_eq!(
            version.pre,
            Some(PreRelease {
                phase: PrePhase::Candidate,
                number: 2
            })
        );
        assert_eq!(version.post, Some(3));
        assert_eq!(version.dev, Some(4));
        assert_eq!(
            version.local,
            vec![
                LocalSegment::Alpha("ubuntu".to_string()),
                LocalSegment::Numeric(1)
            ]
        );
    }

    #[test]
    fn test_version_parse_alternative_spellings() {
        assert_eq!(v("1.0-alpha.1").to_string(), "1.0a1");
        assert_eq!(v("1.0.Beta").to_string(), "1.0b0");
        assert_eq!(v("1.0c3").to_string(), "1.0rc3");
        assert_eq!(v("1.0-1").to_string(), "1.0.post1");
        assert_eq!(v("1.0rev2").to_string(), "1.0.post2");
        assert_eq!(v("v1.0_dev").to_string(), "1.0.dev0");
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("latest").is_err());
        assert!(Version::parse("1.0-").is_err());
        assert!(Version::parse("1.0+").is_err());
        assert!(Version::parse("x!1.0").is_err());
        assert!(Version::parse("1.0.x").is_err());
    }

    #[test]
    fn test_version_compare_releases() {
        assert!(v("3.21.0") < v("3.21.1"));
        assert!(v("3.9.0") < v("3.10.0"));
        assert!(v("1!0.1") > v("99.0"));
    }

    #[test]
    fn test_version_compare_pre_post_dev() {
        assert!(v("1.0.dev0") < v("1.0a1"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0rc1"));
        assert!(v("1.0rc1.dev1") < v("1.0rc1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0.post1.dev0"));
        assert!(v("1.0.post1.dev0") < v("1.0.post1"));
        assert!(v("1.0") < v("1.0+local"));
    }

    #[test]
    fn test_version_trailing_zero_segments() {
        assert_eq!(v("1.0").cmp_padded(&v("1.0.0")), Ordering::Equal);
        assert!(v("1.0.0") > v("1.0"));
        assert_ne!(v("1.0"), v("1.0.0"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(v("3.21.0").to_string(), "3.21.0");
        assert_eq!(v("1!2.0RC1").to_string(), "1!2.0rc1");
    }

    #[test]
    fn test_order_descending() {
        let ordered = order_descending(["1.0.0", "3.0.0rc1", "2.10.0", "2.9.0", "3.0.0"]);
        assert_eq!(ordered, vec!["3.0.0", "3.0.0rc1", "2.10.0", "2.9.0", "1.0.0"]);
    }

    #[test]
    fn test_order_descending_drops_invalid() {
        let ordered = order_descending(vec!["0.1", "not-a-version", "0.2"]);
        assert_eq!(ordered, vec!["0.2", "0.1"]);
    }

    #[test]
    fn test_order_descending_adjacent_pairs() {
        let ordered = order_descending([
            "0.1", "1.0.post1", "1.0", "1.0a2", "1.0.dev5", "0.9.9", "2!0.1", "1.0.0",
        ]);
        assert_eq!(ordered.len(), 8);
        for pair in ordered.windows(2) {
            assert!(v(&pair[0]) >= v(&pair[1]), "{} < {}", pair[0], pair[1]);
        }
        assert_eq!(ordered[0], "2!0.1");
    }
}
