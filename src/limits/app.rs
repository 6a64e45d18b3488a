//! Apps and Effective Limit Resolution
//!
//! An app is either private or public, never both, and never changes kind.
//!
//! - A private app always runs under its owner's current plan.
//! - A public app runs under the public-app default unless it carries a
//!   custom limit. The custom limit is set by an admin, cleared by an admin,
//!   or replaced with a snapshot of the owner's plan when the owner opts out.
//!
//! Whoever calls the mutating operations is assumed to be authorized already.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{LimitError, LimitOperation};
use super::limit::Limit;
use super::user::{Owner, User, UserId};

/// Unique identifier of an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(Uuid);

impl AppId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AppId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Visibility of an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Private,
    Public,
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppKind::Private => f.write_str("private"),
            AppKind::Public => f.write_str("public"),
        }
    }
}

/// Whether a public app carries a custom limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideState {
    /// Running under the public-app default
    Default,
    /// Running under a custom limit
    Custom,
}

/// Limit operations shared by every kind of app
pub trait AppLimits {
    fn id(&self) -> AppId;

    fn owner_id(&self) -> UserId;

    fn kind(&self) -> AppKind;

    /// Effective limit as of this call
    fn limit(&self) -> Limit;

    /// Replace the custom limit (admin operation)
    fn set_limit(&mut self, limit: Limit) -> Result<(), LimitError>;

    /// Drop the custom limit, falling back to the default (admin operation)
    fn clear_limit(&mut self) -> Result<(), LimitError>;

    /// Take a snapshot of the owner's current plan as the custom limit
    /// (owner self-service operation)
    fn opt_out(&mut self) -> Result<(), LimitError>;

    fn is_owned_by(&self, user: &User) -> bool {
        self.owner_id() == user.id()
    }
}

/// App whose limit mirrors its owner's plan
#[derive(Debug)]
pub struct PrivateApp {
    id: AppId,
    owner: Owner,
}

impl PrivateApp {
    pub(crate) fn new(owner: Owner) -> Self {
        Self {
            id: AppId::new(),
            owner,
        }
    }

    fn reject(&self, operation: LimitOperation) -> Result<(), LimitError> {
        warn!(
            app_id = %self.id,
            owner_id = %self.owner.id(),
            %operation,
            "Rejected custom limit operation on private app"
        );
        Err(LimitError::CustomLimitOnPrivateApp {
            app: self.id,
            operation,
        })
    }
}

impl AppLimits for PrivateApp {
    fn id(&self) -> AppId {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner.id()
    }

    fn kind(&self) -> AppKind {
        AppKind::Private
    }

    fn limit(&self) -> Limit {
        self.owner.current_plan()
    }

    fn set_limit(&mut self, _limit: Limit) -> Result<(), LimitError> {
        self.reject(LimitOperation::SetLimit)
    }

    fn clear_limit(&mut self) -> Result<(), LimitError> {
        self.reject(LimitOperation::ClearLimit)
    }

    fn opt_out(&mut self) -> Result<(), LimitError> {
        self.reject(LimitOperation::OptOut)
    }
}

/// App with its own default limit that can be customized
///
/// An app is one entity with one id, so it cannot be cloned into a second
/// copy with diverging limits:
///
/// ```compile_fail
/// use ci_limits::limits::{User, FREE_PLAN};
///
/// let user = User::new(FREE_PLAN);
/// let app = user.upload_public_app();
/// let copy = app.clone();
/// ```
#[derive(Debug)]
pub struct PublicApp {
    id: AppId,
    owner: Owner,
    default: Limit,
    custom: Option<Limit>,
}

impl PublicApp {
    pub(crate) fn new(owner: Owner, default: Limit) -> Self {
        Self {
            id: AppId::new(),
            owner,
            default,
            custom: None,
        }
    }

    /// Custom limit, if one is set
    pub fn custom_limit(&self) -> Option<Limit> {
        self.custom
    }

    /// Limit used while no custom limit is set
    pub fn default_limit(&self) -> Limit {
        self.default
    }

    pub fn state(&self) -> OverrideState {
        match self.custom {
            Some(_) => OverrideState::Custom,
            None => OverrideState::Default,
        }
    }
}

impl AppLimits for PublicApp {
    fn id(&self) -> AppId {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner.id()
    }

    fn kind(&self) -> AppKind {
        AppKind::Public
    }

    fn limit(&self) -> Limit {
        self.custom.unwrap_or(self.default)
    }

    fn set_limit(&mut self, limit: Limit) -> Result<(), LimitError> {
        self.custom = Some(limit);
        info!(app_id = %self.id, owner_id = %self.owner.id(), %limit, "Custom limit set");
        Ok(())
    }

    fn clear_limit(&mut self) -> Result<(), LimitError> {
        if self.custom.take().is_some() {
            info!(app_id = %self.id, owner_id = %self.owner.id(), "Custom limit cleared");
        }
        Ok(())
    }

    // Also overwrites a custom limit an admin set earlier.
    fn opt_out(&mut self) -> Result<(), LimitError> {
        let plan = self.owner.current_plan();
        self.custom = Some(plan);
        info!(app_id = %self.id, owner_id = %self.owner.id(), limit = %plan, "Opted out of public app limit");
        Ok(())
    }
}

/// Any app
#[derive(Debug)]
pub enum App {
    Private(PrivateApp),
    Public(PublicApp),
}

impl App {
    pub fn as_public(&self) -> Option<&PublicApp> {
        match self {
            App::Public(app) => Some(app),
            App::Private(_) => None,
        }
    }

    pub fn as_public_mut(&mut self) -> Option<&mut PublicApp> {
        match self {
            App::Public(app) => Some(app),
            App::Private(_) => None,
        }
    }

    /// Override state of a public app; `None` for private apps
    pub fn override_state(&self) -> Option<OverrideState> {
        self.as_public().map(PublicApp::state)
    }

    fn inner(&self) -> &dyn AppLimits {
        match self {
            App::Private(app) => app,
            App::Public(app) => app,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AppLimits {
        match self {
            App::Private(app) => app,
            App::Public(app) => app,
        }
    }
}

/// Effective limit of an app as of this call
pub fn resolve_limit(app: &App) -> Limit {
    match app {
        App::Private(app) => app.limit(),
        App::Public(app) => app.limit(),
    }
}

impl AppLimits for App {
    fn id(&self) -> AppId {
        self.inner().id()
    }

    fn owner_id(&self) -> UserId {
        self.inner().owner_id()
    }

    fn kind(&self) -> AppKind {
        self.inner().kind()
    }

    fn limit(&self) -> Limit {
        resolve_limit(self)
    }

    fn set_limit(&mut self, limit: Limit) -> Result<(), LimitError> {
        self.inner_mut().set_limit(limit)
    }

    fn clear_limit(&mut self) -> Result<(), LimitError> {
        self.inner_mut().clear_limit()
    }

    fn opt_out(&mut self) -> Result<(), LimitError> {
        self.inner_mut().opt_out()
    }
}

impl From<PrivateApp> for App {
    fn from(app: PrivateApp) -> Self {
        App::Private(app)
    }
}

impl From<PublicApp> for App {
    fn from(app: PublicApp) -> Self {
        App::Public(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::limit::Ceiling;
    use crate::limits::plans::{DEVELOPER_PLAN, FREE_PLAN, ORGANIZATION_PLAN, PUBLIC_APP_PLAN};

    fn custom() -> Limit {
        Limit::new(10, 75, Ceiling::Unbounded, Ceiling::Unbounded)
    }

    #[test]
    fn test_private_app_limit_is_owner_plan() {
        for plan in [FREE_PLAN, DEVELOPER_PLAN, ORGANIZATION_PLAN] {
            let user = User::new(plan);
            let app = user.upload_private_app();
            assert_eq!(app.limit(), plan);
            assert_eq!(app.kind(), AppKind::Private);
        }
    }

    #[test]
    fn test_public_app_starts_at_default() {
        for plan in [FREE_PLAN, DEVELOPER_PLAN, ORGANIZATION_PLAN] {
            let user = User::new(plan);
            let app = user.upload_public_app();
            assert_eq!(app.limit(), PUBLIC_APP_PLAN);
            assert_eq!(app.state(), OverrideState::Default);
            assert_eq!(app.custom_limit(), None);
            assert_eq!(app.kind(), AppKind::Public);
        }
    }

    #[test]
    fn test_public_app_custom_limit() {
        let user = User::new(FREE_PLAN);
        let mut app = user.upload_public_app();

        app.set_limit(custom()).unwrap();

        assert_eq!(app.limit(), custom());
        assert_eq!(app.state(), OverrideState::Custom);
        assert_eq!(app.default_limit(), PUBLIC_APP_PLAN);
    }

    #[test]
    fn test_set_limit_replaces_previous_custom() {
        let user = User::new(FREE_PLAN);
        let mut app = user.upload_public_app();
        app.set_limit(custom()).unwrap();

        app.set_limit(ORGANIZATION_PLAN).unwrap();

        assert_eq!(app.limit(), ORGANIZATION_PLAN);
    }

    #[test]
    fn test_clear_limit_returns_to_default() {
        let user = User::new(FREE_PLAN);
        let mut app = user.upload_public_app();
        app.set_limit(custom()).unwrap();

        app.clear_limit().unwrap();
        assert_eq!(app.limit(), PUBLIC_APP_PLAN);
        assert_eq!(app.state(), OverrideState::Default);

        // Clearing in the default state is a no-op
        app.clear_limit().unwrap();
        assert_eq!(app.state(), OverrideState::Default);
    }

    #[test]
    fn test_opt_out_from_default() {
        let user = User::new(FREE_PLAN);
        let mut app = user.upload_public_app();

        app.opt_out().unwrap();

        assert_eq!(app.limit(), FREE_PLAN);
        assert_eq!(app.custom_limit(), Some(FREE_PLAN));
    }

    #[test]
    fn test_opt_out_overwrites_admin_custom_limit() {
        let user = User::new(ORGANIZATION_PLAN);
        let mut app = user.upload_public_app();
        app.set_limit(custom()).unwrap();

        app.opt_out().unwrap();

        assert_eq!(app.limit(), ORGANIZATION_PLAN);
    }

    #[test]
    fn test_opt_out_is_a_snapshot() {
        let user = User::new(FREE_PLAN);
        let mut app = user.upload_public_app();
        app.opt_out().unwrap();

        user.set_plan(ORGANIZATION_PLAN);
        assert_eq!(app.limit(), FREE_PLAN);

        // A second opt-out picks up the new plan
        app.opt_out().unwrap();
        assert_eq!(app.limit(), ORGANIZATION_PLAN);
    }

    #[test]
    fn test_private_app_rejects_customization() {
        let user = User::new(FREE_PLAN);
        let mut app = user.upload_private_app();
        let id = app.id();

        assert_eq!(
            app.set_limit(custom()),
            Err(LimitError::CustomLimitOnPrivateApp {
                app: id,
                operation: LimitOperation::SetLimit,
            })
        );
        assert_eq!(
            app.opt_out(),
            Err(LimitError::CustomLimitOnPrivateApp {
                app: id,
                operation: LimitOperation::OptOut,
            })
        );
        assert_eq!(
            app.clear_limit(),
            Err(LimitError::CustomLimitOnPrivateApp {
                app: id,
                operation: LimitOperation::ClearLimit,
            })
        );
        assert_eq!(app.limit(), FREE_PLAN);
    }

    #[test]
    fn test_private_app_follows_plan_change() {
        let user = User::new(FREE_PLAN);
        let app = user.upload_private_app();

        user.set_plan(ORGANIZATION_PLAN);

        assert_eq!(app.limit(), ORGANIZATION_PLAN);
    }

    #[test]
    fn test_resolve_limit_per_variant() {
        let user = User::new(DEVELOPER_PLAN);
        let private = App::from(user.upload_private_app());
        let mut public = App::from(user.upload_public_app());

        assert_eq!(resolve_limit(&private), DEVELOPER_PLAN);
        assert_eq!(resolve_limit(&public), PUBLIC_APP_PLAN);

        public.set_limit(custom()).unwrap();
        assert_eq!(resolve_limit(&public), custom());
        assert_eq!(public.limit(), resolve_limit(&public));
    }

    #[test]
    fn test_app_enum_delegates() {
        let user = User::new(FREE_PLAN);
        let mut private = App::from(user.upload_private_app());
        let mut public = App::from(user.upload_public_app());

        assert_eq!(private.kind(), AppKind::Private);
        assert_eq!(public.kind(), AppKind::Public);
        assert_eq!(private.owner_id(), user.id());
        assert_eq!(private.override_state(), None);
        assert_eq!(public.override_state(), Some(OverrideState::Default));

        assert!(private.set_limit(custom()).is_err());
        assert!(private.as_public_mut().is_none());

        public.set_limit(custom()).unwrap();
        assert_eq!(public.as_public().and_then(PublicApp::custom_limit), Some(custom()));

        public.clear_limit().unwrap();
        assert_eq!(public.override_state(), Some(OverrideState::Default));
    }

    #[test]
    fn test_every_upload_is_a_distinct_app() {
        let user = User::new(FREE_PLAN);
        let mut a = user.upload_public_app();
        let b = user.upload_public_app();

        a.set_limit(ORGANIZATION_PLAN).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.limit(), ORGANIZATION_PLAN);
        assert_eq!(b.limit(), PUBLIC_APP_PLAN);
    }

    #[test]
    fn test_resolve_limit_matches_variant_limit() {
        let user = User::new(FREE_PLAN);
        let private = user.upload_private_app();
        let mut public = user.upload_public_app();
        public.set_limit(custom()).unwrap();
        user.set_plan(DEVELOPER_PLAN);

        let (private_limit, public_limit) = (private.limit(), public.limit());
        assert_eq!(resolve_limit(&App::from(private)), private_limit);
        assert_eq!(resolve_limit(&App::from(public)), public_limit);
        assert_eq!(private_limit, DEVELOPER_PLAN);
        assert_eq!(public_limit, custom());
    }
}
