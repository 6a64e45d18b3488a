//! Build Limit Model
//!
//! This module resolves the build quota that applies to an app from its
//! owner's plan and the app's own overrides.
//!
//! # Features
//!
//! - Immutable [`Limit`] values and the predefined plans
//! - Private apps that always follow their owner's current plan
//! - Public apps with their own default limit, admin overrides and
//!   owner opt-out
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            User                              │
//! │   plan (shared cell) ─────────────┐        PlanTable (Arc)   │
//! ├───────────────────────────────────┼──────────────────────────┤
//! │  ┌─────────────────────┐   ┌──────┴───────────────────────┐  │
//! │  │     PublicApp       │   │         PrivateApp           │  │
//! │  │ custom ?? default   │   │  limit = owner plan (live)   │  │
//! │  └─────────────────────┘   └──────────────────────────────┘  │
//! ├──────────────────────────────────────────────────────────────┤
//! │                   Limit (value, Copy, Eq)                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use ci_limits::limits::{AppLimits, Ceiling, Limit, User, FREE_PLAN, PUBLIC_APP_PLAN};
//!
//! # fn main() -> Result<(), ci_limits::limits::LimitError> {
//! let user = User::new(FREE_PLAN);
//!
//! let private = user.upload_private_app();
//! assert_eq!(private.limit(), FREE_PLAN);
//!
//! let mut public = user.upload_public_app();
//! assert_eq!(public.limit(), PUBLIC_APP_PLAN);
//!
//! let custom = Limit::new(10, 75, Ceiling::Unbounded, Ceiling::Unbounded);
//! public.set_limit(custom)?;
//! assert_eq!(public.limit(), custom);
//!
//! user.request_opt_out(&mut public)?;
//! assert_eq!(public.limit(), FREE_PLAN);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod limit;
pub mod plans;
pub mod user;

#[cfg(test)]
mod proptests;

pub use app::{resolve_limit, App, AppId, AppKind, AppLimits, OverrideState, PrivateApp, PublicApp};
pub use error::{LimitError, LimitOperation};
pub use limit::{Ceiling, Limit};
pub use plans::{
    Plan, PlanTable, DEVELOPER_PLAN, FREE_PLAN, ORGANIZATION_PLAN, PUBLIC_APP_PLAN,
};
pub use user::{User, UserId};
