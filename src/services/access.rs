//! Request-scoped identity and the ownership predicate.
//!
//! Every service call receives an explicit [`RequestContext`]; there is no
//! ambient "current user". The same predicate scopes every entity type: an
//! admin sees everything, a regular user only what traces back to their own
//! metadata records. Records outside the visible set are reported as
//! not-found, never as forbidden.

use uuid::Uuid;

use crate::models::user::UserRole;

/// Identity resolved by the authentication layer for one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub organization: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: Uuid, role: UserRole, organization: Option<String>) -> Self {
        Self {
            user_id,
            role,
            organization,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The owner id queries must match, or `None` when the requester may see
    /// every record. Queries bind this as an optional parameter:
    /// `(?1 IS NULL OR owner = ?1)`.
    pub fn owner_filter(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_everything() {
        let ctx = RequestContext::new(Uuid::new_v4(), UserRole::Admin, None);
        assert!(ctx.owner_filter().is_none());
    }

    #[test]
    fn test_user_scoped_to_self() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::new(id, UserRole::User, Some("Test Org".into()));
        assert_eq!(ctx.owner_filter(), Some(id));
    }
}
