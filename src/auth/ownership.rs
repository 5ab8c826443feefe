//! Owner-or-admin entitlement check

use crate::error::AppError;

pub const DEFAULT_ADMIN: &str = "admin";

/// A user may modify their own resources; the admin identity may modify any.
#[derive(Debug, Clone)]
pub struct OwnershipPolicy {
    admin: String,
}

impl OwnershipPolicy {
    pub fn new(admin: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
        }
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    pub fn can_modify(&self, acting: &str, target: &str) -> bool {
        acting == self.admin || acting == target
    }

    /// Like [`can_modify`](Self::can_modify) but logs the attempt and
    /// returns `Forbidden` when denied.
    pub fn authorize(&self, acting: &str, target: &str) -> Result<(), AppError> {
        if self.can_modify(acting, target) {
            return Ok(());
        }

        tracing::warn!(
            actor = %acting,
            target = %target,
            "User attempted to modify a resource it does not own"
        );
        Err(AppError::Forbidden)
    }
}

impl Default for OwnershipPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN)
    }
}
