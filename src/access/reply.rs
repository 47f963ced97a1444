use crate::middleware::ctx::Actor;

/// Decides whether an actor may change a reply: its author, or anyone holding the
/// privileged role.
#[derive(Debug, Clone)]
pub struct ReplyAccess {
    privileged_role: String,
}

impl ReplyAccess {
    pub fn new(privileged_role: impl Into<String>) -> Self {
        Self {
            privileged_role: privileged_role.into(),
        }
    }

    pub fn allow(&self, actor_id: &str, actor_roles: &[String], owner_id: &str) -> bool {
        let is_owner = !actor_id.is_empty() && actor_id == owner_id;
        is_owner || actor_roles.iter().any(|r| r == &self.privileged_role)
    }

    pub fn can_edit(&self, actor: &Actor, owner_id: &str) -> bool {
        self.allow(&actor.id, &actor.roles, owner_id)
    }
}

impl Default for ReplyAccess {
    fn default() -> Self {
        Self::new("admin")
    }
}
