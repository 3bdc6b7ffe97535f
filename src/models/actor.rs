//! Principal autenticado
//!
//! El middleware de autenticación inyecta un `Actor` en las extensions
//! de cada request protegida.

use uuid::Uuid;

use super::AdminRole;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer {
        user_id: Uuid,
    },
    Staff {
        admin_id: Uuid,
        role: AdminRole,
        station_id: Option<Uuid>,
    },
}

impl Actor {
    /// Id del principal, sea cliente o admin
    pub fn id(&self) -> Uuid {
        match self {
            Actor::Customer { user_id } => *user_id,
            Actor::Staff { admin_id, .. } => *admin_id,
        }
    }

    pub fn role(&self) -> Option<AdminRole> {
        match self {
            Actor::Staff { role, .. } => Some(*role),
            Actor::Customer { .. } => None,
        }
    }

    pub fn has_role(&self, roles: &[AdminRole]) -> bool {
        self.role().map(|role| roles.contains(&role)).unwrap_or(false)
    }

    /// Solo clientes
    pub fn require_customer(&self) -> AppResult<Uuid> {
        match self {
            Actor::Customer { user_id } => Ok(*user_id),
            Actor::Staff { .. } => Err(AppError::Forbidden(
                "This operation is only available to customers".to_string(),
            )),
        }
    }

    /// Cualquier rol de staff
    pub fn require_staff(&self) -> AppResult<Uuid> {
        match self {
            Actor::Staff { admin_id, .. } => Ok(*admin_id),
            Actor::Customer { .. } => Err(AppError::Forbidden("Admin access required".to_string())),
        }
    }

    /// Staff con alguno de los roles indicados
    pub fn require_role(&self, roles: &[AdminRole]) -> AppResult<Uuid> {
        let admin_id = self.require_staff()?;
        if self.has_role(roles) {
            Ok(admin_id)
        } else {
            let allowed: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
            Err(AppError::Forbidden(format!(
                "This operation requires one of the roles: {}",
                allowed.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_cannot_act_as_staff() {
        let actor = Actor::Customer { user_id: Uuid::new_v4() };
        assert!(actor.require_customer().is_ok());
        assert!(matches!(actor.require_staff(), Err(AppError::Forbidden(_))));
        assert!(!actor.has_role(&[AdminRole::SuperAdmin]));
    }

    #[test]
    fn test_require_role_checks_membership() {
        let admin_id = Uuid::new_v4();
        let actor = Actor::Staff {
            admin_id,
            role: AdminRole::SupportStaff,
            station_id: None,
        };

        assert_eq!(actor.require_staff().unwrap(), admin_id);
        assert_eq!(
            actor.require_role(&[AdminRole::SuperAdmin, AdminRole::SupportStaff]).unwrap(),
            admin_id
        );
        match actor.require_role(&[AdminRole::SuperAdmin]) {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("SUPER_ADMIN")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(actor.require_customer().is_err());
    }
}
