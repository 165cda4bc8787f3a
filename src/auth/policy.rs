//! Route authorization policy
//!
//! An ordered table of path patterns and the authentication state each
//! requires. The first declared pattern that matches a path decides; paths
//! matching nothing are public.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RouteRule;
use crate::error::{Error, Result};

/// What a route demands of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Authenticated,
    Public,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Authenticated => write!(f, "authenticated"),
            Requirement::Public => write!(f, "public"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`: exactly one segment
    Any,
    /// `**`: zero or more trailing segments
    Rest,
}

/// A compiled ant-style path pattern such as `/api/v1/testing/**`
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with('/') {
            return Err(Error::Config(format!(
                "route pattern '{}' must start with '/'",
                raw
            )));
        }

        let parts: Vec<&str> = path_segments(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i + 1 == parts.len() => Segment::Rest,
                "**" => {
                    return Err(Error::Config(format!(
                        "route pattern '{}': '**' is only allowed as the last segment",
                        raw
                    )))
                }
                "*" => Segment::Any,
                p if p.contains('*') => {
                    return Err(Error::Config(format!(
                        "route pattern '{}': wildcards must span a whole segment",
                        raw
                    )))
                }
                p => Segment::Literal(p.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut path = path_segments(path);
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Any => {
                    if path.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(lit) => {
                    if path.next() != Some(lit.as_str()) {
                        return false;
                    }
                }
            }
        }
        path.next().is_none()
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Ordered pattern table consulted by the access gate
#[derive(Debug, Clone, Default)]
pub struct RouteAuthorizationPolicy {
    rules: Vec<(RoutePattern, Requirement)>,
}

impl RouteAuthorizationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; later rules lose to earlier ones on overlap
    pub fn with_rule(mut self, pattern: &str, requirement: Requirement) -> Result<Self> {
        let pattern = RoutePattern::parse(pattern)?;
        if self.rules.iter().any(|(p, _)| p.segments == pattern.segments) {
            return Err(Error::Config(format!(
                "route pattern '{}' is declared more than once",
                pattern.raw
            )));
        }
        self.rules.push((pattern, requirement));
        Ok(self)
    }

    pub fn from_rules(rules: &[RouteRule]) -> Result<Self> {
        rules
            .iter()
            .try_fold(Self::new(), |policy, rule| {
                policy.with_rule(&rule.pattern, rule.requirement)
            })
    }

    /// Requirement for a request path; unmatched paths are public
    pub fn requirement_for(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, requirement)| *requirement)
            .unwrap_or(Requirement::Public)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, Requirement)> {
        self.rules.iter().map(|(p, r)| (p.as_str(), *r))
    }
}
