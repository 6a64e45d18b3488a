//! Plan Constants
//!
//! The predefined plans and the table that carries them. The table is
//! configuration: it is built once at startup (from defaults or a config
//! file) and shared read-only through an `Arc`.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::error::LimitError;
use super::limit::{Ceiling, Limit};

pub const FREE_PLAN: Limit = Limit::new(1, 10, Ceiling::Limited(200), Ceiling::Limited(2));

pub const DEVELOPER_PLAN: Limit = Limit::new(2, 45, Ceiling::Unbounded, Ceiling::Unbounded);

pub const ORGANIZATION_PLAN: Limit = Limit::new(4, 90, Ceiling::Unbounded, Ceiling::Unbounded);

/// Default limit of a public app with no custom limit
pub const PUBLIC_APP_PLAN: Limit = Limit::new(2, 45, Ceiling::Unbounded, Ceiling::Unbounded);

lazy_static! {
    static ref BUILTIN_PLANS: Arc<PlanTable> = Arc::new(PlanTable::default());
}

/// Subscription plans a user can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Developer,
    Organization,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Free, Plan::Developer, Plan::Organization];
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Plan::Free => "free",
            Plan::Developer => "developer",
            Plan::Organization => "organization",
        };
        f.write_str(name)
    }
}

impl FromStr for Plan {
    type Err = LimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "developer" => Ok(Plan::Developer),
            "organization" => Ok(Plan::Organization),
            other => Err(LimitError::UnknownPlan(other.to_string())),
        }
    }
}

/// Limits for every plan plus the public-app default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanTable {
    pub free: Limit,
    pub developer: Limit,
    pub organization: Limit,
    pub public_app: Limit,
}

impl Default for PlanTable {
    fn default() -> Self {
        Self {
            free: FREE_PLAN,
            developer: DEVELOPER_PLAN,
            organization: ORGANIZATION_PLAN,
            public_app: PUBLIC_APP_PLAN,
        }
    }
}

impl PlanTable {
    /// Process-wide table holding the builtin plan constants
    pub fn builtin() -> Arc<PlanTable> {
        Arc::clone(&BUILTIN_PLANS)
    }

    /// Limit for the given plan
    pub fn get(&self, plan: Plan) -> Limit {
        match plan {
            Plan::Free => self.free,
            Plan::Developer => self.developer,
            Plan::Organization => self.organization,
        }
    }

    /// Limit a public app gets when it has no custom limit
    pub fn public_app_default(&self) -> Limit {
        self.public_app
    }
}
