//! Role ranking. Higher levels may manage lower or equal ones.

use crate::principal::Principal;
use crate::roles::Role;
use crate::user::User;

/// Level assumed for an actor whose role is not ranked.
pub const UNRANKED_ACTOR: u8 = 0;

/// Level assumed for a target role that is not ranked; nobody reaches it.
pub const UNRANKED_TARGET: u8 = 99;

fn rank(role: &Role) -> Option<u8> {
    match role.as_str() {
        "administrador" => Some(5),
        "diretor" => Some(4),
        "idt" | "financeiro" | "rh" => Some(3),
        "operacao" => Some(2),
        _ => None,
    }
}

/// Level of `role` when it acts.
pub fn level(role: &Role) -> u8 {
    rank(role).unwrap_or(UNRANKED_ACTOR)
}

fn target_level(role: &Role) -> u8 {
    rank(role).unwrap_or(UNRANKED_TARGET)
}

/// May `actor` grant `target` to someone?
pub fn can_assign(actor: &Role, target: &Role) -> bool {
    level(actor) >= target_level(target)
}

/// May `actor` edit `target`? Editing oneself is always allowed.
pub fn can_edit(actor: &Principal, target: &User) -> bool {
    actor.user_id == target.id || level(&actor.role) >= target_level(&target.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use roster_core::UserId;

    fn principal(id: i64, role: Role) -> Principal {
        Principal::new(UserId::new(id), "actor", role)
    }

    fn user(id: i64, role: Role) -> User {
        User::new(UserId::new(id), "target", "target@example.com", role)
    }

    #[test]
    fn peers_may_assign_each_other() {
        assert!(can_assign(&Role::RH, &Role::FINANCEIRO));
        assert!(can_assign(&Role::IDT, &Role::RH));
    }

    #[test]
    fn lower_roles_cannot_assign_higher() {
        assert!(!can_assign(&Role::OPERACAO, &Role::RH));
        assert!(!can_assign(&Role::DIRETOR, &Role::ADMINISTRADOR));
    }

    #[test]
    fn unknown_target_role_is_never_grantable() {
        assert!(!can_assign(&Role::ADMINISTRADOR, &Role::from("superuser")));
    }

    #[test]
    fn unknown_actor_role_ranks_lowest() {
        assert_eq!(level(&Role::from("visitante")), 0);
        assert!(!can_assign(&Role::from("visitante"), &Role::OPERACAO));
    }

    #[test]
    fn self_edit_is_allowed_regardless_of_level() {
        let actor = principal(7, Role::OPERACAO);
        assert!(can_edit(&actor, &user(7, Role::ADMINISTRADOR)));
        assert!(!can_edit(&actor, &user(8, Role::ADMINISTRADOR)));
    }

    #[test]
    fn director_edits_below_but_not_admin() {
        let actor = principal(1, Role::DIRETOR);
        assert!(can_edit(&actor, &user(2, Role::RH)));
        assert!(!can_edit(&actor, &user(3, Role::ADMINISTRADOR)));
    }

    fn known_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::known())
    }

    proptest! {
        #[test]
        fn administrador_may_assign_every_known_role(target in known_role()) {
            prop_assert!(can_assign(&Role::ADMINISTRADOR, &target));
        }

        #[test]
        fn assignment_follows_level_order(actor in known_role(), target in known_role()) {
            prop_assert_eq!(can_assign(&actor, &target), level(&actor) >= level(&target));
        }
    }
}
