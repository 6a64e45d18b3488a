//! Limit Error Types
//!
//! Errors raised by the limit model. Rejections on private apps are contract
//! violations and are returned to the caller as-is.

use std::fmt;

use super::app::AppId;

/// Operation that attempted to customize an app's limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitOperation {
    /// Admin override with an arbitrary limit
    SetLimit,
    /// Reset back to the public-app default
    ClearLimit,
    /// Owner opting out of the public-app default
    OptOut,
}

impl fmt::Display for LimitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitOperation::SetLimit => "set-limit",
            LimitOperation::ClearLimit => "clear-limit",
            LimitOperation::OptOut => "opt-out",
        };
        f.write_str(name)
    }
}

/// Error types for limit operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitError {
    /// A private app always follows its owner's plan
    #[error("custom limits only allowed for public apps")]
    CustomLimitOnPrivateApp {
        /// The private app the operation targeted
        app: AppId,
        /// The rejected operation
        operation: LimitOperation,
    },

    /// Plan name not in the plan table
    #[error("Unknown plan: {0} (expected free, developer or organization)")]
    UnknownPlan(String),

    /// Malformed limit or ceiling text
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
