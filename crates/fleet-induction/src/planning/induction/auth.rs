use serde::{Deserialize, Serialize};

/// Role attached to the opaque caller identity by the upstream auth system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Reader,
    Supervisor,
    Admin,
}

impl Role {
    /// Generate and simulate are supervisor-or-higher operations.
    pub fn may_plan(self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin)
    }
}

/// The caller as the engine sees it: an opaque subject plus a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub subject: String,
    pub role: Role,
}

/// Resolves bearer credentials to caller identities. Authentication itself is
/// an external collaborator; implementations range from a static token table
/// to a gateway-issued claims lookup.
pub trait TokenAuthenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<CallerIdentity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supervisors_and_admins_may_plan() {
        assert!(!Role::Reader.may_plan());
        assert!(Role::Supervisor.may_plan());
        assert!(Role::Admin.may_plan());
    }

    #[test]
    fn roles_use_contract_spelling() {
        assert_eq!(
            serde_json::to_value(Role::Supervisor).expect("serialize"),
            serde_json::json!("SUPERVISOR")
        );
    }
}
