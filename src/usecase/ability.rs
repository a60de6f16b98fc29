use std::collections::BTreeSet;

/// Roles the identity provider may attach to a session. Unknown claims
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Management,
    Upload,
    Viewer,
}

impl Role {
    fn from_claim(claim: &str) -> Option<Role> {
        match claim {
            "PVMS-management" => Some(Role::Management),
            "PVMS-upload" => Some(Role::Upload),
            "PVMS-viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Voucher,
    BatchOrder,
    Product,
    Management,
    /// The application shell itself; any recognized role may see it.
    Any,
}

/// Capability policy built once per session from the role claims and
/// queried per UI action. Stateless after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ability {
    roles: BTreeSet<Role>,
}

impl Ability {
    pub fn from_claims<'a>(claims: impl IntoIterator<Item = &'a str>) -> Self {
        Ability {
            roles: claims.into_iter().filter_map(Role::from_claim).collect(),
        }
    }

    pub fn can(&self, action: Action, subject: Subject) -> bool {
        if self.roles.contains(&Role::Management) {
            return true;
        }
        if subject == Subject::Any {
            return action == Action::View && !self.roles.is_empty();
        }
        if self.roles.contains(&Role::Upload) {
            let granted = match subject {
                Subject::BatchOrder => true,
                Subject::Voucher | Subject::Product => action == Action::View,
                _ => false,
            };
            if granted {
                return true;
            }
        }
        self.roles.contains(&Role::Viewer) && action == Action::View
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn management_can_do_everything() {
        let ability = Ability::from_claims(["PVMS-management"]);
        assert!(ability.can(Action::Delete, Subject::Product));
        assert!(ability.can(Action::Create, Subject::Voucher));
        assert!(ability.can(Action::Update, Subject::Management));
        assert!(ability.can(Action::View, Subject::Any));
    }

    #[test]
    fn upload_manages_batch_orders_but_only_views_inventory() {
        let ability = Ability::from_claims(["PVMS-upload"]);
        assert!(ability.can(Action::Create, Subject::BatchOrder));
        assert!(ability.can(Action::Delete, Subject::BatchOrder));
        assert!(ability.can(Action::View, Subject::Voucher));
        assert!(ability.can(Action::View, Subject::Product));
        assert!(!ability.can(Action::Update, Subject::Voucher));
        assert!(!ability.can(Action::Create, Subject::Product));
        assert!(!ability.can(Action::View, Subject::Management));
    }

    #[test]
    fn viewer_sees_everything_but_changes_nothing() {
        let ability = Ability::from_claims(["PVMS-viewer"]);
        assert!(ability.can(Action::View, Subject::Voucher));
        assert!(ability.can(Action::View, Subject::Management));
        assert!(!ability.can(Action::Create, Subject::BatchOrder));
        assert!(!ability.can(Action::Delete, Subject::Product));
    }

    #[test]
    fn any_recognized_role_may_enter_the_shell() {
        for claim in ["PVMS-management", "PVMS-upload", "PVMS-viewer"] {
            let ability = Ability::from_claims([claim]);
            assert!(ability.can(Action::View, Subject::Any), "{claim} should enter");
        }
    }

    #[test]
    fn unknown_claims_grant_nothing() {
        let ability = Ability::from_claims(["PVMS-intruder", "admin"]);
        assert!(!ability.can(Action::View, Subject::Any));
        assert!(!ability.can(Action::View, Subject::Voucher));
    }

    #[test]
    fn roles_combine_additively() {
        let ability = Ability::from_claims(["PVMS-viewer", "PVMS-upload"]);
        assert!(ability.can(Action::Create, Subject::BatchOrder));
        assert!(ability.can(Action::View, Subject::Management));
        assert!(!ability.can(Action::Update, Subject::Product));
    }
}
