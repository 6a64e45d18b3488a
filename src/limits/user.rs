//! Users and Plan Ownership
//!
//! A [`User`] holds the plan it pays for and is the factory for the apps it
//! uploads. The plan lives in a cell shared with the user's private apps, so
//! a plan change is visible to those apps on their next read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::app::{AppLimits, PrivateApp, PublicApp};
use super::error::LimitError;
use super::limit::Limit;
use super::plans::{Plan, PlanTable};

/// Unique identifier of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Mutable plan slot shared between a user and its private apps
#[derive(Debug)]
struct PlanCell(RwLock<Limit>);

impl PlanCell {
    fn new(plan: Limit) -> Self {
        Self(RwLock::new(plan))
    }

    // The cell only ever holds a Copy value, so a poisoned lock still has a
    // whole Limit in it.
    fn get(&self) -> Limit {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, plan: Limit) -> Limit {
        let mut slot = self.0.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, plan)
    }
}

/// Back-reference from an app to the user that uploaded it
#[derive(Debug, Clone)]
pub(crate) struct Owner {
    id: UserId,
    plan: Arc<PlanCell>,
}

impl Owner {
    pub(crate) fn id(&self) -> UserId {
        self.id
    }

    /// The owner's plan as of this call
    pub(crate) fn current_plan(&self) -> Limit {
        self.plan.get()
    }
}

/// A user of the build system
#[derive(Debug)]
pub struct User {
    owner: Owner,
    plans: Arc<PlanTable>,
}

impl User {
    /// Create a user on the given plan, using the builtin plan table
    pub fn new(plan: Limit) -> Self {
        Self::with_plan_table(plan, PlanTable::builtin())
    }

    /// Create a user whose public apps default to `plans.public_app`
    pub fn with_plan_table(plan: Limit, plans: Arc<PlanTable>) -> Self {
        let owner = Owner {
            id: UserId::new(),
            plan: Arc::new(PlanCell::new(plan)),
        };
        debug!(user_id = %owner.id, plan = %plan, "Created user");
        Self { owner, plans }
    }

    /// Create a user subscribed to a named plan from the table
    pub fn subscribe(plan: Plan, plans: Arc<PlanTable>) -> Self {
        let limit = plans.get(plan);
        Self::with_plan_table(limit, plans)
    }

    pub fn id(&self) -> UserId {
        self.owner.id
    }

    /// Current plan
    pub fn plan(&self) -> Limit {
        self.owner.current_plan()
    }

    /// Change the plan, returning the previous one
    ///
    /// Every private app of this user follows the new plan immediately.
    /// Public apps are not affected, including ones that opted out earlier.
    pub fn set_plan(&self, plan: Limit) -> Limit {
        let previous = self.owner.plan.replace(plan);
        info!(user_id = %self.owner.id, from = %previous, to = %plan, "User plan changed");
        previous
    }

    /// Plan table this user's apps take their defaults from
    pub fn plan_table(&self) -> &PlanTable {
        &self.plans
    }

    /// Create a new private app owned by this user
    pub fn upload_private_app(&self) -> PrivateApp {
        let app = PrivateApp::new(self.owner.clone());
        debug!(user_id = %self.owner.id, app_id = %app.id(), "Uploaded private app");
        app
    }

    /// Create a new public app owned by this user, with no custom limit
    pub fn upload_public_app(&self) -> PublicApp {
        let app = PublicApp::new(self.owner.clone(), self.plans.public_app_default());
        debug!(user_id = %self.owner.id, app_id = %app.id(), "Uploaded public app");
        app
    }

    /// Opt `app` out of the public-app default in favour of this user's plan
    ///
    /// Only delegates to [`AppLimits::opt_out`]; callers that need to restrict
    /// this to the app's owner check [`AppLimits::is_owned_by`] first.
    pub fn request_opt_out<A: AppLimits + ?Sized>(&self, app: &mut A) -> Result<(), LimitError> {
        debug!(user_id = %self.owner.id, app_id = %app.id(), "Opt-out requested");
        app.opt_out()
    }
}
