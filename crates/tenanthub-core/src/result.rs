//! Convenience result type alias for TenantHub.

use crate::error::AppError;

/// A specialized `Result` type for TenantHub operations.
pub type AppResult<T> = Result<T, AppError>;
