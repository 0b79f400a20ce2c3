//! The identity of whoever is calling into the [`AttendanceManager`](crate::manager::AttendanceManager),
//! and the guard that every privileged operation checks first.

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::Employee;
use serde::Serialize;

/// The authenticated caller. This is passed explicitly to every operation rather than read from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The backing employee, if the identity came from [`authenticate`].
    ///
    /// [`authenticate`]: crate::manager::AttendanceManager::authenticate
    pub employee_id: Option<i32>,
    pub username: String,
    pub is_admin: bool,
    /// The forum this identity teaches. Student listings and attendance fan-out are scoped to it.
    pub forum: String,
}

impl Identity {
    /// Builds an identity supplied by an external authentication provider.
    pub fn new(username: impl Into<String>, is_admin: bool, forum: impl Into<String>) -> Self {
        Self {
            employee_id: None,
            username: username.into(),
            is_admin,
            forum: forum.into(),
        }
    }
}

impl From<&Employee> for Identity {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_id: Some(employee.id),
            username: employee.username.clone(),
            is_admin: employee.is_admin,
            forum: employee.forum.clone().unwrap_or_default(),
        }
    }
}

/// Fails with [`AttendanceError::Forbidden`] unless `identity` is an administrator.
pub fn require_admin(identity: &Identity) -> AttendanceResult<()> {
    if identity.is_admin {
        Ok(())
    } else {
        tracing::warn!(user = %identity.username, "denied access to a privileged operation");
        Err(AttendanceError::Forbidden)
    }
}
