//! Limit Values
//!
//! A [`Limit`] is the quota tuple every plan and app resolves to. Limits are
//! plain values: two limits with the same fields are interchangeable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::LimitError;

/// Upper bound that may be lifted entirely
///
/// Serializes as an integer, or `null` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Ceiling {
    /// At most this many
    Limited(u32),
    /// No upper bound
    #[default]
    Unbounded,
}

impl Ceiling {
    /// True when there is no upper bound
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ceiling::Unbounded)
    }

    /// The bound, or `None` when unbounded
    pub fn as_option(&self) -> Option<u32> {
        match self {
            Ceiling::Limited(n) => Some(*n),
            Ceiling::Unbounded => None,
        }
    }
}

impl From<Option<u32>> for Ceiling {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(n) => Ceiling::Limited(n),
            None => Ceiling::Unbounded,
        }
    }
}

impl From<Ceiling> for Option<u32> {
    fn from(value: Ceiling) -> Self {
        value.as_option()
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::Limited(n) => write!(f, "{}", n),
            Ceiling::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl FromStr for Ceiling {
    type Err = LimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") {
            return Ok(Ceiling::Unbounded);
        }
        s.parse::<u32>().map(Ceiling::Limited).map_err(|_| {
            LimitError::InvalidLimit(format!("'{}' is not a number or 'unbounded'", s))
        })
    }
}

/// Build quota for a plan or an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limit {
    /// Maximum number of builds running at once
    concurrent_builds: u32,

    /// Maximum minutes any single build may take
    max_build_time: u32,

    /// Maximum builds per month
    #[serde(default)]
    builds_per_month: Ceiling,

    /// Maximum accounts on the team
    #[serde(default)]
    max_team_members: Ceiling,
}

impl Limit {
    /// Create a limit. No range validation is applied.
    pub const fn new(
        concurrent_builds: u32,
        max_build_time: u32,
        builds_per_month: Ceiling,
        max_team_members: Ceiling,
    ) -> Self {
        Self {
            concurrent_builds,
            max_build_time,
            builds_per_month,
            max_team_members,
        }
    }

    pub fn concurrent_builds(&self) -> u32 {
        self.concurrent_builds
    }

    /// Max build time in minutes
    pub fn max_build_time(&self) -> u32 {
        self.max_build_time
    }

    /// Max build time as a duration
    pub fn max_build_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_build_time) * 60)
    }

    pub fn builds_per_month(&self) -> Ceiling {
        self.builds_per_month
    }

    pub fn max_team_members(&self) -> Ceiling {
        self.max_team_members
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} concurrent, {} min/build, {} builds/month, {} members",
            self.concurrent_builds,
            self.max_build_time,
            self.builds_per_month,
            self.max_team_members
        )
    }
}

/// Parses the compact `concurrent,minutes,builds_per_month,team_members`
/// form, e.g. `10,75,unbounded,unbounded`.
impl FromStr for Limit {
    type Err = LimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(LimitError::InvalidLimit(format!(
                "expected 4 comma-separated fields, got {} in '{}'",
                parts.len(),
                s
            )));
        }

        let number = |field: &str, value: &str| {
            value.parse::<u32>().map_err(|_| {
                LimitError::InvalidLimit(format!("{} must be a number, got '{}'", field, value))
            })
        };

        Ok(Limit::new(
            number("concurrent builds", parts[0])?,
            number("max build time", parts[1])?,
            parts[2].parse()?,
            parts[3].parse()?,
        ))
    }
}
