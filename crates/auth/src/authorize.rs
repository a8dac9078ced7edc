use thiserror::Error;

use crate::hierarchy::{can_assign, can_edit};
use crate::{Principal, Role, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("role '{0}' is not allowed to perform this operation")]
    RoleNotAllowed(Role),

    #[error("not allowed to edit this user")]
    CannotEdit,

    #[error("not allowed to assign role '{0}'")]
    CannotAssign(Role),
}

/// Gate an operation on the principal's role.
///
/// - No IO
/// - No panics
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotAllowed(principal.role.clone()))
    }
}

pub fn ensure_can_assign(principal: &Principal, target: &Role) -> Result<(), AuthzError> {
    if can_assign(&principal.role, target) {
        Ok(())
    } else {
        Err(AuthzError::CannotAssign(target.clone()))
    }
}

pub fn ensure_can_edit(principal: &Principal, target: &User) -> Result<(), AuthzError> {
    if can_edit(principal, target) {
        Ok(())
    } else {
        Err(AuthzError::CannotEdit)
    }
}
