// src/version/requirement.rs

//! Dependency requirement strings as published in `requires_dist`
//!
//! Format: `name[extra,...] (range) ; marker` or `name @ url ; marker`.
//! Both the parenthesized form (`pulpcore (>=3.21,<3.22)`) and the bare
//! form (`pulpcore>=3.21,<3.22`) are accepted. Markers are kept verbatim
//! and never evaluated.

use super::VersionRange;
use crate::error::{Error, Result};
use std::fmt;

/// A parsed dependency requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub range: VersionRange,
    pub url: Option<String>,
    pub marker: Option<String>,
}

impl Requirement {
    pub fn parse(s: &str) -> Result<Self> {
        let (body, marker) = match s.split_once(';') {
            Some((body, marker)) => (body.trim(), Some(marker.trim().to_string())),
            None => (s.trim(), None),
        };

        let name = Self::name_of(body);
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(Error::ParseError(format!("Missing package name in requirement '{}'", s)));
        }

        let mut rest = body[name.len()..].trim_start();

        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let (inner, tail) = after.split_once(']').ok_or_else(|| {
                Error::ParseError(format!("Unterminated extras in requirement '{}'", s))
            })?;
            extras = inner
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
            rest = tail.trim_start();
        }

        if let Some(url) = rest.strip_prefix('@') {
            return Ok(Self {
                name: name.to_string(),
                extras,
                range: VersionRange::default(),
                url: Some(url.trim().to_string()),
                marker,
            });
        }

        let range_text = match rest.strip_prefix('(') {
            Some(inner) => inner.trim_end().strip_suffix(')').ok_or_else(|| {
                Error::ParseError(format!("Unbalanced parenthesis in requirement '{}'", s))
            })?,
            None => rest,
        };

        Ok(Self {
            name: name.to_string(),
            extras,
            range: VersionRange::parse(range_text)?,
            url: None,
            marker,
        })
    }

    /// Leading project name of a raw requirement string, without parsing the rest
    pub fn name_of(raw: &str) -> &str {
        let raw = raw.trim_start();
        let len = raw
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(raw.len());
        &raw[..len]
    }

    /// First raw requirement in `requirements` naming `package`
    pub fn find_raw<'a, S: AsRef<str>>(requirements: &'a [S], package: &str) -> Option<&'a str> {
        let wanted = normalize_name(package);
        requirements
            .iter()
            .map(AsRef::as_ref)
            .find(|raw| normalize_name(Self::name_of(raw)) == wanted)
    }

    /// Whether this requirement is on `package`, comparing normalized names
    pub fn is_for(&self, package: &str) -> bool {
        normalize_name(&self.name) == normalize_name(package)
    }

    /// The requirement without its marker, e.g. `pulpcore>=3.21,<3.22`
    pub fn specifier(&self) -> String {
        let mut out = self.name.clone();
        if !self.extras.is_empty() {
            out.push_str(&format!("[{}]", self.extras.join(",")));
        }
        match &self.url {
            Some(url) => out.push_str(&format!(" @ {}", url)),
            None => out.push_str(&self.range.to_string()),
        }
        out
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.specifier())?;
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

/// Normalize a project name: lowercase, runs of `-`, `_`, `.` become `-`
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_dash = true;
            continue;
        }
        if pending_dash && !out.is_empty() {
            out.push('-');
        }
        pending_dash = false;
        out.push(c.to_ascii_lowercase());
    }
    out
}
