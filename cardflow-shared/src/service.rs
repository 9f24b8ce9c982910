/// Board mutation service
///
/// The single entry point combining authorization, position allocation,
/// and transactional storage for every board-structural mutation. Each
/// operation:
///
/// 1. resolves the caller's role in the target board and consults the
///    pure role policy (`crate::auth::policy`) — nothing commits
///    without passing this step;
/// 2. executes the mutation through `crate::store` as one atomic unit;
/// 3. fires a fire-and-forget change notification on success.
///
/// Contended moves retry a bounded number of times on Postgres
/// serialization/deadlock failures before surfacing
/// `ServiceError::Conflict` to the caller.
///
/// # Example
///
/// ```no_run
/// use cardflow_shared::service::BoardService;
/// use cardflow_shared::notify::NullNotifier;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, caller: Uuid) -> anyhow::Result<()> {
/// let service = BoardService::new(pool, NullNotifier);
///
/// let board = service.create_board(caller, "Roadmap").await?;
/// let list = service.create_list(board.id, caller, "Backlog").await?;
/// service.move_list(list.id, caller, board.id, 0).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::policy::{self, BoardAction};
use crate::error::{ServiceError, ServiceResult};
use crate::models::board::Board;
use crate::models::list::List;
use crate::models::membership::{BoardRole, Membership};
use crate::models::task::{CreateTask, Task};
use crate::models::user::User;
use crate::notify::ChangeNotifier;
use crate::store;

/// Retry budget for contended move operations.
const MOVE_RETRY_LIMIT: u32 = 3;

/// Orchestrates authorized, atomic board mutations.
pub struct BoardService {
    pool: PgPool,
    notifier: Arc<dyn ChangeNotifier>,
}

impl BoardService {
    /// Creates a service over a connection pool and a notifier.
    pub fn new(pool: PgPool, notifier: impl ChangeNotifier + 'static) -> Self {
        Self {
            pool,
            notifier: Arc::new(notifier),
        }
    }

    /// Database pool accessor for read-side collaborators.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a board owned by `caller`, with the owner membership row
    /// written in the same transaction.
    pub async fn create_board(&self, caller: Uuid, title: &str) -> ServiceResult<Board> {
        if !User::exists(&self.pool, caller).await? {
            return Err(ServiceError::NotFound("user"));
        }

        let mut tx = self.pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (owner_id, title)
            VALUES ($1, $2)
            RETURNING id, owner_id, title, created_at, updated_at
            "#,
        )
        .bind(caller)
        .bind(title)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO board_members (board_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(board.id)
            .bind(caller)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(board_id = %board.id, owner_id = %caller, "board created");
        Ok(board)
    }

    /// Lists the boards `caller` is a member of, newest first. Scoped to
    /// the caller's own memberships, so no per-board authorization step.
    pub async fn list_boards(&self, caller: Uuid) -> ServiceResult<Vec<Board>> {
        Ok(Board::list_for_user(&self.pool, caller).await?)
    }

    /// Returns a board's lists with their tasks, each in display order.
    /// Requires `member`.
    pub async fn board_outline(
        &self,
        board_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<Vec<(List, Vec<Task>)>> {
        self.authorize(board_id, caller, BoardAction::View).await?;
        store::board_outline(&self.pool, board_id).await
    }

    /// Updates a board's title. Requires `admin`.
    pub async fn update_board(
        &self,
        board_id: Uuid,
        caller: Uuid,
        title: &str,
    ) -> ServiceResult<Board> {
        self.authorize(board_id, caller, BoardAction::UpdateBoard)
            .await?;

        let board = Board::update_title(&self.pool, board_id, title)
            .await?
            .ok_or(ServiceError::NotFound("board"))?;

        self.notify(board_id).await;
        Ok(board)
    }

    /// Deletes a board; lists, tasks, and memberships cascade. Requires
    /// `owner`.
    pub async fn delete_board(&self, board_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        self.authorize(board_id, caller, BoardAction::DeleteBoard)
            .await?;

        store::delete_board(&self.pool, board_id).await?;
        self.notify(board_id).await;
        Ok(())
    }

    /// Creates a list appended to the board. Requires `member`.
    pub async fn create_list(
        &self,
        board_id: Uuid,
        caller: Uuid,
        title: &str,
    ) -> ServiceResult<List> {
        self.authorize(board_id, caller, BoardAction::CreateContent)
            .await?;

        let list = store::create_list(&self.pool, board_id, title).await?;
        self.notify(board_id).await;
        Ok(list)
    }

    /// Deletes a list and compacts the board's list positions. Requires
    /// `member`.
    pub async fn delete_list(&self, list_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        let board_id = self.board_of_list(list_id).await?;
        self.authorize(board_id, caller, BoardAction::CreateContent)
            .await?;

        store::delete_list(&self.pool, list_id).await?;
        self.notify(board_id).await;
        Ok(())
    }

    /// Moves a list to `target_index` within `board_id`. Requires
    /// `member`. Retries on contention before failing `Conflict`.
    pub async fn move_list(
        &self,
        list_id: Uuid,
        caller: Uuid,
        board_id: Uuid,
        target_index: usize,
    ) -> ServiceResult<List> {
        let actual_board = self.board_of_list(list_id).await?;
        if actual_board != board_id {
            return Err(ServiceError::NotFound("list"));
        }
        self.authorize(board_id, caller, BoardAction::CreateContent)
            .await?;

        let mut attempt = 0;
        let list = loop {
            match store::move_list(&self.pool, list_id, target_index).await {
                Err(ServiceError::Database(e)) if store::is_serialization_failure(&e) => {
                    attempt += 1;
                    if attempt >= MOVE_RETRY_LIMIT {
                        warn!(list_id = %list_id, attempt, "move_list retry budget exhausted");
                        return Err(ServiceError::Conflict(
                            "concurrent list reordering, please retry".to_string(),
                        ));
                    }
                }
                other => break other?,
            }
        };

        self.notify(board_id).await;
        Ok(list)
    }

    /// Creates a task appended to the list. Requires `member` on the
    /// list's board.
    pub async fn create_task(
        &self,
        list_id: Uuid,
        caller: Uuid,
        data: CreateTask,
    ) -> ServiceResult<Task> {
        let board_id = self.board_of_list(list_id).await?;
        self.authorize(board_id, caller, BoardAction::CreateContent)
            .await?;

        let task = store::create_task(&self.pool, list_id, data, caller).await?;
        self.notify(board_id).await;
        Ok(task)
    }

    /// Deletes a task and compacts its list's positions. Requires
    /// `member`.
    pub async fn delete_task(&self, task_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        let task = Task::find_by_id(&self.pool, task_id)
            .await?
            .ok_or(ServiceError::NotFound("task"))?;
        let board_id = self.board_of_list(task.list_id).await?;
        self.authorize(board_id, caller, BoardAction::CreateContent)
            .await?;

        store::delete_task(&self.pool, task_id).await?;
        self.notify(board_id).await;
        Ok(())
    }

    /// Moves a task to `target_index` in `dest_list_id` (its own list
    /// or another). Requires `member` on both the source and the
    /// destination board; these are normally the same board. Retries on
    /// contention before failing `Conflict`.
    pub async fn move_task(
        &self,
        task_id: Uuid,
        caller: Uuid,
        dest_list_id: Uuid,
        target_index: usize,
    ) -> ServiceResult<Task> {
        let task = Task::find_by_id(&self.pool, task_id)
            .await?
            .ok_or(ServiceError::NotFound("task"))?;
        let source_board = self.board_of_list(task.list_id).await?;
        let dest_board = self.board_of_list(dest_list_id).await?;

        self.authorize(source_board, caller, BoardAction::CreateContent)
            .await?;
        if dest_board != source_board {
            self.authorize(dest_board, caller, BoardAction::CreateContent)
                .await?;
        }

        let mut attempt = 0;
        let task = loop {
            match store::move_task(&self.pool, task_id, dest_list_id, target_index).await {
                Err(ServiceError::Database(e)) if store::is_serialization_failure(&e) => {
                    attempt += 1;
                    if attempt >= MOVE_RETRY_LIMIT {
                        warn!(task_id = %task_id, attempt, "move_task retry budget exhausted");
                        return Err(ServiceError::Conflict(
                            "concurrent task reordering, please retry".to_string(),
                        ));
                    }
                }
                other => break other?,
            }
        };

        self.notify(source_board).await;
        if dest_board != source_board {
            self.notify(dest_board).await;
        }
        Ok(task)
    }

    /// Adds `target_user` to the board with `role`. Requires `owner`.
    ///
    /// Assigning the `owner` role is forbidden (exactly one owner,
    /// fixed at creation). Re-adding an existing member is rejected
    /// with `Conflict` rather than silently updating their role.
    pub async fn add_member(
        &self,
        board_id: Uuid,
        caller: Uuid,
        target_user: Uuid,
        role: BoardRole,
    ) -> ServiceResult<Membership> {
        self.authorize(board_id, caller, BoardAction::ManageMembers)
            .await?;

        if role == BoardRole::Owner {
            return Err(ServiceError::Forbidden);
        }
        if !User::exists(&self.pool, target_user).await? {
            return Err(ServiceError::NotFound("user"));
        }
        if Membership::find(&self.pool, board_id, target_user)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "user is already a member of this board".to_string(),
            ));
        }

        let membership = Membership::create(&self.pool, board_id, target_user, role).await?;
        self.notify(board_id).await;
        Ok(membership)
    }

    /// Removes `target_user` from the board. Requires `admin`.
    /// Removing the owner is forbidden regardless of the caller's role.
    pub async fn remove_member(
        &self,
        board_id: Uuid,
        caller: Uuid,
        target_user: Uuid,
    ) -> ServiceResult<()> {
        self.authorize(board_id, caller, BoardAction::RemoveMember)
            .await?;

        let target = Membership::find(&self.pool, board_id, target_user)
            .await?
            .ok_or(ServiceError::NotFound("member"))?;
        if target.role == BoardRole::Owner {
            return Err(ServiceError::Forbidden);
        }

        Membership::delete(&self.pool, board_id, target_user).await?;
        self.notify(board_id).await;
        Ok(())
    }

    /// Changes `target_user`'s role. Requires `owner`. Both demoting
    /// the owner and promoting anyone *to* owner are forbidden.
    pub async fn change_member_role(
        &self,
        board_id: Uuid,
        caller: Uuid,
        target_user: Uuid,
        new_role: BoardRole,
    ) -> ServiceResult<Membership> {
        self.authorize(board_id, caller, BoardAction::ManageMembers)
            .await?;

        if new_role == BoardRole::Owner {
            return Err(ServiceError::Forbidden);
        }
        let target = Membership::find(&self.pool, board_id, target_user)
            .await?
            .ok_or(ServiceError::NotFound("member"))?;
        if target.role == BoardRole::Owner {
            return Err(ServiceError::Forbidden);
        }

        let membership = Membership::update_role(&self.pool, board_id, target_user, new_role)
            .await?
            .ok_or(ServiceError::NotFound("member"))?;
        self.notify(board_id).await;
        Ok(membership)
    }

    /// Lists a board's members. Requires `member`.
    pub async fn list_members(
        &self,
        board_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<Vec<Membership>> {
        self.authorize(board_id, caller, BoardAction::View).await?;
        Ok(Membership::list_by_board(&self.pool, board_id).await?)
    }

    /// Resolves the caller's role once and consults the pure policy.
    /// A missing board and a denied caller both come back `Forbidden`;
    /// membership-gated visibility does not reveal which.
    async fn authorize(
        &self,
        board_id: Uuid,
        caller: Uuid,
        action: BoardAction,
    ) -> ServiceResult<BoardRole> {
        let role = Membership::get_role(&self.pool, board_id, caller).await?;
        policy::authorize(role, policy::required_role(action))
            .map_err(|_| ServiceError::Forbidden)?;
        role.ok_or(ServiceError::Forbidden)
    }

    async fn board_of_list(&self, list_id: Uuid) -> ServiceResult<Uuid> {
        let list = List::find_by_id(&self.pool, list_id)
            .await?
            .ok_or(ServiceError::NotFound("list"))?;
        Ok(list.board_id)
    }

    /// Fire-and-forget change notification. Never fails the mutation;
    /// notifier implementations log their own delivery errors.
    async fn notify(&self, board_id: Uuid) {
        self.notifier.board_changed(board_id).await;
    }
}

impl std::fmt::Debug for BoardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardService").finish_non_exhaustive()
    }
}

/// Logs an invariant violation for operator attention before the error
/// surfaces to the transport layer as a server error.
pub fn log_if_invariant_violation(err: &ServiceError) {
    if let ServiceError::InvariantViolation(detail) = err {
        error!(detail = %detail, "ordering invariant violated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_retry_limit_is_bounded() {
        assert!(MOVE_RETRY_LIMIT >= 1);
        assert!(MOVE_RETRY_LIMIT <= 10);
    }

    // Authorization and mutation flows require a database; they are
    // covered in tests/service_tests.rs.
}
