//! Current user context and the capabilities derived from it

use crate::models::Entity;

const ADMIN_ROLE: &str = "admin";

/// Identity of the signed-in user as provided by the host environment
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub role: String,
}

impl Session {
    pub fn new(user_id: &str, role: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: role.to_string(),
        }
    }

    /// Resolve the capabilities of this session
    pub fn permissions(&self) -> Permissions {
        Permissions {
            is_admin: self.role.trim().eq_ignore_ascii_case(ADMIN_ROLE),
            user_id: self.user_id.clone(),
        }
    }
}

/// Capabilities resolved once per render and handed to row rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Permissions {
    is_admin: bool,
    user_id: String,
}

impl Permissions {
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Whether the edit action is offered for a record
    pub fn can_edit<E: Entity>(&self, entity: &E) -> bool {
        self.is_admin || entity.created_by() == Some(self.user_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Supplier;

    fn supplier(created_by: Option<&str>) -> Supplier {
        Supplier {
            id: "s1".to_string(),
            name: "Parts Ltd".to_string(),
            email: "sales@parts.test".to_string(),
            emails: vec![],
            phone: None,
            payment_terms: None,
            siret: None,
            vat_number: None,
            vat_rate: 20.0,
            country_id: None,
            services: vec![],
            coverage_zones: vec![],
            created_by: created_by.map(str::to_string),
        }
    }

    #[test]
    fn test_admin_role_is_case_insensitive() {
        for role in ["admin", "Admin", "ADMIN"] {
            let perms = Session::new("u1", role).permissions();
            assert!(perms.is_admin());
            assert!(perms.can_edit(&supplier(Some("someone-else"))));
            assert!(perms.can_edit(&supplier(None)));
        }
    }

    #[test]
    fn test_creator_can_edit_own_rows_only() {
        let perms = Session::new("u1", "user").permissions();
        assert!(perms.can_edit(&supplier(Some("u1"))));
        assert!(!perms.can_edit(&supplier(Some("u2"))));
        assert!(!perms.can_edit(&supplier(None)));
    }

    #[test]
    fn test_admin_substring_is_not_admin() {
        let perms = Session::new("u1", "administrator").permissions();
        assert!(!perms.is_admin());
    }
}
