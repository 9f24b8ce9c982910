/// Role policy for board operations
///
/// A pure, total function over the three-valued role domain: given the
/// caller's role within the target board (absent if not a member) and
/// the minimum role an operation requires, decide allow or deny. No
/// side effects, no I/O; the policy is computed once per request and
/// threaded through the service rather than re-derived per sub-check.
///
/// # Operation table
///
/// | Operation                                   | Required role |
/// |---------------------------------------------|---------------|
/// | view board / lists / tasks                  | member        |
/// | create list / task, move list / task        | member        |
/// | update board metadata                       | admin         |
/// | remove member                               | admin         |
/// | add member, change role, delete board       | owner         |
///
/// Targeting the owner's membership (removal, demotion) is forbidden
/// regardless of the caller's role; that rule involves the *target* and
/// is enforced in `crate::service`, not here.
///
/// # Example
///
/// ```
/// use cardflow_shared::auth::policy::{authorize, required_role, BoardAction};
/// use cardflow_shared::models::membership::BoardRole;
///
/// let role = Some(BoardRole::Admin);
/// assert!(authorize(role, required_role(BoardAction::UpdateBoard)).is_ok());
/// assert!(authorize(role, required_role(BoardAction::DeleteBoard)).is_err());
/// assert!(authorize(None, required_role(BoardAction::View)).is_err());
/// ```

use crate::models::membership::BoardRole;

/// The policy's deny outcome. Carries no detail about whether the
/// resource exists; the caller decides how much to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDenied;

/// Board operations subject to the role policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    /// View the board, its lists, and its tasks
    View,

    /// Create or move lists and tasks, comment, post to board chat
    CreateContent,

    /// Update board metadata (title)
    UpdateBoard,

    /// Remove a (non-owner) member
    RemoveMember,

    /// Add a member or change a member's role
    ManageMembers,

    /// Delete the board and everything under it
    DeleteBoard,
}

/// The minimum role required for an action (fixed table).
pub fn required_role(action: BoardAction) -> BoardRole {
    match action {
        BoardAction::View => BoardRole::Member,
        BoardAction::CreateContent => BoardRole::Member,
        BoardAction::UpdateBoard => BoardRole::Admin,
        BoardAction::RemoveMember => BoardRole::Admin,
        BoardAction::ManageMembers => BoardRole::Owner,
        BoardAction::DeleteBoard => BoardRole::Owner,
    }
}

/// Allows iff the caller is a member and their role ranks at or above
/// the required role.
pub fn authorize(member_role: Option<BoardRole>, required: BoardRole) -> Result<(), PolicyDenied> {
    match member_role {
        Some(role) if role.satisfies(required) => Ok(()),
        _ => Err(PolicyDenied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [BoardRole; 3] = [BoardRole::Member, BoardRole::Admin, BoardRole::Owner];

    #[test]
    fn test_authorize_matrix() {
        // Exhaustive 3x3: allow iff rank(role) >= rank(required).
        for role in ROLES {
            for required in ROLES {
                let outcome = authorize(Some(role), required);
                if role.rank() >= required.rank() {
                    assert_eq!(outcome, Ok(()), "{role:?} vs {required:?}");
                } else {
                    assert_eq!(outcome, Err(PolicyDenied), "{role:?} vs {required:?}");
                }
            }
        }
    }

    #[test]
    fn test_non_member_is_always_denied() {
        for required in ROLES {
            assert_eq!(authorize(None, required), Err(PolicyDenied));
        }
    }

    #[test]
    fn test_required_role_table() {
        assert_eq!(required_role(BoardAction::View), BoardRole::Member);
        assert_eq!(required_role(BoardAction::CreateContent), BoardRole::Member);
        assert_eq!(required_role(BoardAction::UpdateBoard), BoardRole::Admin);
        assert_eq!(required_role(BoardAction::RemoveMember), BoardRole::Admin);
        assert_eq!(required_role(BoardAction::ManageMembers), BoardRole::Owner);
        assert_eq!(required_role(BoardAction::DeleteBoard), BoardRole::Owner);
    }
}
