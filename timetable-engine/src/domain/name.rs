//! Station names and name matching.
//!
//! A name is a station plus an optional field (yard, platform group, ...),
//! written `station::field`. A fielded name belongs to its bare station name,
//! but not the other way round: `Zhengzhou East::Jingguang` is a member of
//! `Zhengzhou East`, while `Zhengzhou East` is not a member of any of its
//! fields.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Separator between the station and field parts of a [`StopName`].
pub const FIELD_SEPARATOR: &str = "::";

/// Separator between alternatives in a multi-valued pattern input.
pub const MULTI_SEPARATOR: char = '|';

/// A station label with group-membership semantics.
///
/// # Examples
///
/// ```
/// use timetable_engine::domain::StopName;
///
/// let yard = StopName::parse("Tianjin::West");
/// let group = StopName::parse("Tianjin");
/// assert!(yard.belongs_to(&group));
/// assert!(!group.belongs_to(&yard));
/// assert!(group.equal_or_belongs_to(&group));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopName {
    station: String,
    field: String,
}

impl StopName {
    /// Create a name from its parts. An empty field means a bare station.
    pub fn new(station: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            field: field.into(),
        }
    }

    /// Parse `station` or `station::field`.
    pub fn parse(s: &str) -> Self {
        match s.split_once(FIELD_SEPARATOR) {
            Some((station, field)) => Self::new(station.trim(), field.trim()),
            None => Self::new(s.trim(), ""),
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// True if there is no field part.
    pub fn is_bare(&self) -> bool {
        self.field.is_empty()
    }

    /// The bare station this name belongs to.
    pub fn bare(&self) -> StopName {
        Self::new(self.station.clone(), "")
    }

    /// Strict, asymmetric membership: `self` is a fielded member of `group`.
    pub fn belongs_to(&self, group: &StopName) -> bool {
        group.is_bare() && !self.is_bare() && self.station == group.station
    }

    /// Exact equality, or membership of `other`'s group.
    pub fn equal_or_belongs_to(&self, other: &StopName) -> bool {
        self == other || self.belongs_to(other)
    }

    /// The single-string form, as written by [`fmt::Display`].
    pub fn literal(&self) -> String {
        self.to_string()
    }
}

impl fmt::Debug for StopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopName({self})")
    }
}

impl fmt::Display for StopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            f.write_str(&self.station)
        } else {
            write!(f, "{}{}{}", self.station, FIELD_SEPARATOR, self.field)
        }
    }
}

impl From<&str> for StopName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Error returned by [`PatternSet::validate`] for a pattern that will not compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pattern {pattern:?}: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// How a [`PatternSet`] is built from user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// The raw input, e.g. `"Beijing|Tianjin"`.
    pub input: String,
    /// Split the input on `|` into several OR-combined patterns.
    #[serde(default)]
    pub multi: bool,
    /// Treat each pattern as a regular expression instead of a literal name.
    #[serde(default)]
    pub regex: bool,
}

impl PatternSpec {
    /// A single literal pattern.
    pub fn literal(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            multi: false,
            regex: false,
        }
    }

    /// Several literal patterns separated by `|`.
    pub fn multi(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            multi: true,
            regex: false,
        }
    }

    /// Several regular expressions separated by `|` if `multi`, else one.
    pub fn regex(input: impl Into<String>, multi: bool) -> Self {
        Self {
            input: input.into(),
            multi,
            regex: true,
        }
    }

    fn parts(&self) -> Vec<&str> {
        if self.multi {
            self.input
                .split(MULTI_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            vec![self.input.trim()]
        }
    }
}

#[derive(Debug, Clone)]
enum Pattern {
    Literal(StopName),
    Regex(Regex),
}

/// An OR-combined list of name patterns.
///
/// In literal mode a candidate matches a pattern if it is equal to it or
/// belongs to it. In regex mode the candidate's full literal is searched with
/// the expression. Patterns that fail to compile are dropped at build time
/// and recorded in [`PatternSet::skipped`]; the rest keep working.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    skipped: Vec<String>,
}

impl PatternSet {
    /// Build from a spec, skipping malformed regular expressions.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_engine::domain::{PatternSet, PatternSpec, StopName};
    ///
    /// let set = PatternSet::build(&PatternSpec::multi("Beijing|Tianjin"));
    /// assert!(set.matches(&StopName::parse("Tianjin")));
    /// assert!(!set.matches(&StopName::parse("Shanghai")));
    /// ```
    pub fn build(spec: &PatternSpec) -> Self {
        let mut patterns = Vec::new();
        let mut skipped = Vec::new();
        for part in spec.parts() {
            if spec.regex {
                match Regex::new(part) {
                    Ok(re) => patterns.push(Pattern::Regex(re)),
                    Err(e) => {
                        warn!(pattern = part, error = %e, "skipping malformed pattern");
                        skipped.push(part.to_string());
                    }
                }
            } else {
                patterns.push(Pattern::Literal(StopName::parse(part)));
            }
        }
        Self { patterns, skipped }
    }

    /// Check every pattern of a spec compiles, without building the set.
    pub fn validate(spec: &PatternSpec) -> Result<(), PatternError> {
        if !spec.regex {
            return Ok(());
        }
        for part in spec.parts() {
            Regex::new(part).map_err(|e| PatternError {
                pattern: part.to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Whether any pattern matches `name`.
    pub fn matches(&self, name: &StopName) -> bool {
        self.patterns.iter().any(|p| match p {
            Pattern::Literal(pattern) => name.equal_or_belongs_to(pattern),
            Pattern::Regex(re) => re.is_match(&name.literal()),
        })
    }

    /// Number of usable patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns dropped because they did not compile.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}
