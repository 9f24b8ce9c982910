/// Board membership model and database operations
///
/// Many-to-many relationship between users and boards with role-based
/// access control. At most one row exists per (board, user) pair; the
/// row for the board's owner is created with the board, carries role
/// `owner`, and is never deleted or demoted (enforced in
/// `crate::service`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE board_role AS ENUM ('member', 'admin', 'owner');
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role board_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: delete board, manage members and roles; exactly one per board
/// - **admin**: update board metadata, remove non-owner members
/// - **member**: view the board, create lists/tasks, move entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// RBAC roles for board memberships, totally ordered by privilege:
/// `Member < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "board_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    /// Can view the board and create/move lists and tasks
    Member,

    /// Can additionally update board metadata and remove members
    Admin,

    /// Full control; exactly one per board, set at creation
    Owner,
}

impl BoardRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardRole::Member => "member",
            BoardRole::Admin => "admin",
            BoardRole::Owner => "owner",
        }
    }

    /// Numeric privilege rank for comparison
    pub fn rank(&self) -> u8 {
        match self {
            BoardRole::Member => 1,
            BoardRole::Admin => 2,
            BoardRole::Owner => 3,
        }
    }

    /// Checks if this role meets or exceeds the required role
    pub fn satisfies(&self, required: BoardRole) -> bool {
        self.rank() >= required.rank()
    }
}

/// Membership row: a (board, user) pair with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Board ID
    pub board_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the board
    pub role: BoardRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a new membership (adds a user to a board)
    ///
    /// # Errors
    ///
    /// Returns an error if the pair already exists (primary key
    /// violation) or the board/user is missing (foreign key violation).
    pub async fn create(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO board_members (board_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING board_id, user_id, role, created_at
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds a specific membership by board and user
    pub async fn find(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT board_id, user_id, role, created_at
            FROM board_members
            WHERE board_id = $1 AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Gets a user's role in a board, `None` if not a member
    pub async fn get_role(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BoardRole>, sqlx::Error> {
        let role: Option<BoardRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM board_members
            WHERE board_id = $1 AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Updates a user's role in a board
    ///
    /// Returns the updated membership, or `None` if no such membership
    /// exists. Owner-protection rules are the caller's responsibility.
    pub async fn update_role(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE board_members
            SET role = $3
            WHERE board_id = $1 AND user_id = $2
            RETURNING board_id, user_id, role, created_at
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Deletes a membership (removes a user from a board)
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a board
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT board_id, user_id, role, created_at
            FROM board_members
            WHERE board_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_role_as_str() {
        assert_eq!(BoardRole::Member.as_str(), "member");
        assert_eq!(BoardRole::Admin.as_str(), "admin");
        assert_eq!(BoardRole::Owner.as_str(), "owner");
    }

    #[test]
    fn test_role_ordering() {
        assert!(BoardRole::Owner.rank() > BoardRole::Admin.rank());
        assert!(BoardRole::Admin.rank() > BoardRole::Member.rank());
    }

    #[test]
    fn test_role_satisfies() {
        assert!(BoardRole::Owner.satisfies(BoardRole::Member));
        assert!(BoardRole::Admin.satisfies(BoardRole::Member));
        assert!(BoardRole::Member.satisfies(BoardRole::Member));
        assert!(!BoardRole::Member.satisfies(BoardRole::Admin));
        assert!(!BoardRole::Admin.satisfies(BoardRole::Owner));
    }

    // Integration tests for database operations are in tests/store_tests.rs
}
