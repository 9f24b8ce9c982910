/// Ordered container store
///
/// The transactional data-access layer for the two ordered sibling-sets
/// in the system: lists within a board and tasks within a list. Each
/// operation applies a `crate::ordering` plan plus any accompanying row
/// mutation as a single all-or-nothing transaction, so a failure
/// partway through leaves stored state untouched.
///
/// # Isolation
///
/// Two concurrent operations on the same sibling-set must not
/// interleave their read-then-write of sibling positions. The store
/// serializes them by taking a `FOR UPDATE` row lock on the *parent*
/// (the board row for list ordering, the list row for task ordering)
/// before reading siblings. Operations on disjoint sibling-sets lock
/// different parent rows and proceed fully in parallel. A cross-list
/// move locks both list rows in UUID order so two opposing moves cannot
/// deadlock.
///
/// Both sibling tables share one set of position-write helpers
/// parameterized by table name rather than two parallel copies of the
/// update statements.
///
/// # Invariant checking
///
/// Before committing, every mutating operation re-reads the affected
/// sibling positions and verifies they are dense (0..n-1, no
/// duplicates). A failed check aborts the transaction with
/// `ServiceError::InvariantViolation`; the deferred unique constraints
/// on `(board_id, position)` and `(list_id, position)` back the same
/// rule at the database level.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::list::List;
use crate::models::task::{CreateTask, Task};
use crate::ordering::{self, PositionWrite, Sibling};

/// The two ordered tables, selecting the SQL identifiers for the shared
/// position-write helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiblingTable {
    Lists,
    Tasks,
}

impl SiblingTable {
    fn table(&self) -> &'static str {
        match self {
            SiblingTable::Lists => "lists",
            SiblingTable::Tasks => "tasks",
        }
    }

    fn parent_column(&self) -> &'static str {
        match self {
            SiblingTable::Lists => "board_id",
            SiblingTable::Tasks => "list_id",
        }
    }
}

/// True for Postgres failures that indicate lock contention worth
/// retrying (serialization failure or deadlock).
pub fn is_serialization_failure(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
    } else {
        false
    }
}

/// Creates a list appended to the end of its board's list ordering.
///
/// # Errors
///
/// `NotFound("board")` if the board is missing.
pub async fn create_list(pool: &PgPool, board_id: Uuid, title: &str) -> ServiceResult<List> {
    let mut tx = pool.begin().await?;

    lock_board(&mut tx, board_id).await?;
    let siblings = list_siblings(&mut tx, board_id).await?;
    let position = ordering::append_position(siblings.len());

    let list = sqlx::query_as::<_, List>(
        r#"
        INSERT INTO lists (board_id, title, position)
        VALUES ($1, $2, $3)
        RETURNING id, board_id, title, position, created_at, updated_at
        "#,
    )
    .bind(board_id)
    .bind(title)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    verify_density(&mut tx, SiblingTable::Lists, board_id).await?;
    tx.commit().await?;

    debug!(list_id = %list.id, board_id = %board_id, position, "list created");
    Ok(list)
}

/// Creates a task appended to the end of its list's task ordering.
///
/// # Errors
///
/// `NotFound("list")` if the list is missing.
pub async fn create_task(
    pool: &PgPool,
    list_id: Uuid,
    data: CreateTask,
    created_by: Uuid,
) -> ServiceResult<Task> {
    let mut tx = pool.begin().await?;

    lock_list(&mut tx, list_id).await?;
    let siblings = task_siblings(&mut tx, list_id).await?;
    let position = ordering::append_position(siblings.len());

    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (list_id, title, description, due_date, assignee_id, created_by, position)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, list_id, title, description, due_date, assignee_id,
                  created_by, position, created_at, updated_at
        "#,
    )
    .bind(list_id)
    .bind(data.title)
    .bind(data.description)
    .bind(data.due_date)
    .bind(data.assignee_id)
    .bind(created_by)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    verify_density(&mut tx, SiblingTable::Tasks, list_id).await?;
    tx.commit().await?;

    debug!(task_id = %task.id, list_id = %list_id, position, "task created");
    Ok(task)
}

/// Moves a list to `target_index` within its board's ordering.
///
/// A move to the list's current index commits nothing beyond the read.
///
/// # Errors
///
/// `NotFound("list")` if the list is missing.
pub async fn move_list(pool: &PgPool, list_id: Uuid, target_index: usize) -> ServiceResult<List> {
    let mut tx = pool.begin().await?;

    let board_id = lock_list_parent(&mut tx, list_id).await?;
    lock_board(&mut tx, board_id).await?;

    let siblings = list_siblings(&mut tx, board_id).await?;
    let writes = ordering::plan_move(&siblings, list_id, target_index);

    apply_position_writes(&mut tx, SiblingTable::Lists, &writes).await?;
    verify_density(&mut tx, SiblingTable::Lists, board_id).await?;

    let list = fetch_list(&mut tx, list_id).await?;
    tx.commit().await?;

    debug!(list_id = %list_id, board_id = %board_id, target_index, "list moved");
    Ok(list)
}

/// Moves a task to `target_index` in `dest_list_id`, which may be its
/// current list (reorder in place) or another list (cross-container
/// move, both sibling-sets re-linearized).
///
/// # Errors
///
/// `NotFound("task")` / `NotFound("list")` if either side is missing.
pub async fn move_task(
    pool: &PgPool,
    task_id: Uuid,
    dest_list_id: Uuid,
    target_index: usize,
) -> ServiceResult<Task> {
    let mut tx = pool.begin().await?;

    let source_list_id: Option<Uuid> = sqlx::query_scalar("SELECT list_id FROM tasks WHERE id = $1")
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?;
    let source_list_id = source_list_id.ok_or(ServiceError::NotFound("task"))?;

    if source_list_id == dest_list_id {
        lock_list(&mut tx, source_list_id).await?;
        confirm_task_parent(&mut tx, task_id, source_list_id).await?;

        let siblings = task_siblings(&mut tx, source_list_id).await?;
        let writes = ordering::plan_move(&siblings, task_id, target_index);

        apply_position_writes(&mut tx, SiblingTable::Tasks, &writes).await?;
        verify_density(&mut tx, SiblingTable::Tasks, source_list_id).await?;
    } else {
        // Lock both list rows in UUID order so two opposing cross-moves
        // acquire locks in the same order.
        let (first, second) = if source_list_id < dest_list_id {
            (source_list_id, dest_list_id)
        } else {
            (dest_list_id, source_list_id)
        };
        lock_list(&mut tx, first).await?;
        lock_list(&mut tx, second).await?;
        confirm_task_parent(&mut tx, task_id, source_list_id).await?;

        let source = task_siblings(&mut tx, source_list_id).await?;
        let dest = task_siblings(&mut tx, dest_list_id).await?;
        let (source_writes, dest_writes) =
            ordering::plan_cross_move(&source, &dest, task_id, target_index);

        apply_position_writes(&mut tx, SiblingTable::Tasks, &source_writes).await?;

        // The moving row changes parent and position together.
        let moved_position = dest_writes
            .iter()
            .find(|w| w.id == task_id)
            .map(|w| w.position)
            .ok_or_else(|| {
                ServiceError::InvariantViolation("cross-move plan lost the moving task".to_string())
            })?;

        sqlx::query("UPDATE tasks SET list_id = $2, position = $3, updated_at = NOW() WHERE id = $1")
            .bind(task_id)
            .bind(dest_list_id)
            .bind(moved_position)
            .execute(&mut *tx)
            .await?;

        let remaining: Vec<PositionWrite> = dest_writes
            .into_iter()
            .filter(|w| w.id != task_id)
            .collect();
        apply_position_writes(&mut tx, SiblingTable::Tasks, &remaining).await?;

        verify_density(&mut tx, SiblingTable::Tasks, source_list_id).await?;
        verify_density(&mut tx, SiblingTable::Tasks, dest_list_id).await?;
    }

    let task = fetch_task(&mut tx, task_id).await?;
    tx.commit().await?;

    debug!(
        task_id = %task_id,
        source_list_id = %source_list_id,
        dest_list_id = %dest_list_id,
        target_index,
        "task moved"
    );
    Ok(task)
}

/// Deletes a task and compacts the surviving siblings' positions.
///
/// Returns the list the task belonged to.
pub async fn delete_task(pool: &PgPool, task_id: Uuid) -> ServiceResult<Uuid> {
    let mut tx = pool.begin().await?;

    let list_id: Option<Uuid> = sqlx::query_scalar("SELECT list_id FROM tasks WHERE id = $1")
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?;
    let list_id = list_id.ok_or(ServiceError::NotFound("task"))?;

    lock_list(&mut tx, list_id).await?;
    confirm_task_parent(&mut tx, task_id, list_id).await?;

    let siblings = task_siblings(&mut tx, list_id).await?;
    let writes = ordering::plan_removal(&siblings, task_id);

    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(&mut *tx)
        .await?;
    apply_position_writes(&mut tx, SiblingTable::Tasks, &writes).await?;
    verify_density(&mut tx, SiblingTable::Tasks, list_id).await?;

    tx.commit().await?;

    debug!(task_id = %task_id, list_id = %list_id, "task deleted");
    Ok(list_id)
}

/// Deletes a list (its tasks cascade) and compacts the board's
/// remaining list positions.
///
/// Returns the board the list belonged to.
pub async fn delete_list(pool: &PgPool, list_id: Uuid) -> ServiceResult<Uuid> {
    let mut tx = pool.begin().await?;

    let board_id = lock_list_parent(&mut tx, list_id).await?;
    lock_board(&mut tx, board_id).await?;

    let siblings = list_siblings(&mut tx, board_id).await?;
    let writes = ordering::plan_removal(&siblings, list_id);

    sqlx::query("DELETE FROM lists WHERE id = $1")
        .bind(list_id)
        .execute(&mut *tx)
        .await?;
    apply_position_writes(&mut tx, SiblingTable::Lists, &writes).await?;
    verify_density(&mut tx, SiblingTable::Lists, board_id).await?;

    tx.commit().await?;

    debug!(list_id = %list_id, board_id = %board_id, "list deleted");
    Ok(board_id)
}

/// Deletes a board; lists, tasks, and memberships cascade at the
/// database level, so no compaction is needed.
pub async fn delete_board(pool: &PgPool, board_id: Uuid) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM boards WHERE id = $1")
        .bind(board_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("board"));
    }

    debug!(board_id = %board_id, "board deleted");
    Ok(())
}

/// Reads a board's lists and tasks, each in display order, from a
/// single consistent snapshot.
pub async fn board_outline(
    pool: &PgPool,
    board_id: Uuid,
) -> ServiceResult<Vec<(List, Vec<Task>)>> {
    let mut tx = pool.begin().await?;

    let lists = sqlx::query_as::<_, List>(
        r#"
        SELECT id, board_id, title, position, created_at, updated_at
        FROM lists
        WHERE board_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *tx)
    .await?;

    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.list_id, t.title, t.description, t.due_date, t.assignee_id,
               t.created_by, t.position, t.created_at, t.updated_at
        FROM tasks t
        JOIN lists l ON l.id = t.list_id
        WHERE l.board_id = $1
        ORDER BY t.position ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut outline: Vec<(List, Vec<Task>)> =
        lists.into_iter().map(|l| (l, Vec::new())).collect();
    for task in tasks {
        if let Some((_, bucket)) = outline.iter_mut().find(|(l, _)| l.id == task.list_id) {
            bucket.push(task);
        }
    }

    Ok(outline)
}

/// Takes a `FOR UPDATE` lock on a board row, serializing all list
/// ordering work under that board.
async fn lock_board(tx: &mut Transaction<'_, Postgres>, board_id: Uuid) -> ServiceResult<()> {
    let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM boards WHERE id = $1 FOR UPDATE")
        .bind(board_id)
        .fetch_optional(&mut **tx)
        .await?;

    locked.map(|_| ()).ok_or(ServiceError::NotFound("board"))
}

/// Takes a `FOR UPDATE` lock on a list row, serializing all task
/// ordering work under that list.
async fn lock_list(tx: &mut Transaction<'_, Postgres>, list_id: Uuid) -> ServiceResult<()> {
    let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM lists WHERE id = $1 FOR UPDATE")
        .bind(list_id)
        .fetch_optional(&mut **tx)
        .await?;

    locked.map(|_| ()).ok_or(ServiceError::NotFound("list"))
}

/// Re-reads a task's parent after the list locks are held. The first
/// parent read happens before any lock, so a concurrent move may have
/// relocated the task in between; planning against the stale list would
/// silently skip it. Surfaced as `Conflict` so the caller retries
/// against the task's current list.
async fn confirm_task_parent(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
    expected_list_id: Uuid,
) -> ServiceResult<()> {
    let current: Option<Uuid> = sqlx::query_scalar("SELECT list_id FROM tasks WHERE id = $1")
        .bind(task_id)
        .fetch_optional(&mut **tx)
        .await?;

    match current {
        Some(list_id) if list_id == expected_list_id => Ok(()),
        Some(_) => Err(ServiceError::Conflict(
            "task was moved concurrently, please retry".to_string(),
        )),
        None => Err(ServiceError::NotFound("task")),
    }
}

/// Locks a list row and returns its board id.
async fn lock_list_parent(
    tx: &mut Transaction<'_, Postgres>,
    list_id: Uuid,
) -> ServiceResult<Uuid> {
    let board_id: Option<Uuid> =
        sqlx::query_scalar("SELECT board_id FROM lists WHERE id = $1 FOR UPDATE")
            .bind(list_id)
            .fetch_optional(&mut **tx)
            .await?;

    board_id.ok_or(ServiceError::NotFound("list"))
}

async fn list_siblings(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
) -> ServiceResult<Vec<Sibling>> {
    let rows: Vec<(Uuid, i32)> = sqlx::query_as(
        "SELECT id, position FROM lists WHERE board_id = $1 ORDER BY position ASC",
    )
    .bind(board_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, position)| Sibling { id, position })
        .collect())
}

async fn task_siblings(
    tx: &mut Transaction<'_, Postgres>,
    list_id: Uuid,
) -> ServiceResult<Vec<Sibling>> {
    let rows: Vec<(Uuid, i32)> = sqlx::query_as(
        "SELECT id, position FROM tasks WHERE list_id = $1 ORDER BY position ASC",
    )
    .bind(list_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, position)| Sibling { id, position })
        .collect())
}

/// Applies a position plan to one sibling table. The table name comes
/// from the `SiblingTable` enum, never from caller input.
async fn apply_position_writes(
    tx: &mut Transaction<'_, Postgres>,
    table: SiblingTable,
    writes: &[PositionWrite],
) -> ServiceResult<()> {
    let sql = format!(
        "UPDATE {} SET position = $2, updated_at = NOW() WHERE id = $1",
        table.table()
    );

    for write in writes {
        sqlx::query(&sql)
            .bind(write.id)
            .bind(write.position)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Re-reads the sibling positions under `parent_id` and fails the
/// transaction if they are not dense.
async fn verify_density(
    tx: &mut Transaction<'_, Postgres>,
    table: SiblingTable,
    parent_id: Uuid,
) -> ServiceResult<()> {
    let sql = format!(
        "SELECT position FROM {} WHERE {} = $1",
        table.table(),
        table.parent_column()
    );

    let positions: Vec<i32> = sqlx::query_scalar(&sql)
        .bind(parent_id)
        .fetch_all(&mut **tx)
        .await?;

    if ordering::is_dense(&positions) {
        Ok(())
    } else {
        Err(ServiceError::InvariantViolation(format!(
            "{} under {} hold positions {:?}",
            table.table(),
            parent_id,
            positions
        )))
    }
}

async fn fetch_list(tx: &mut Transaction<'_, Postgres>, list_id: Uuid) -> ServiceResult<List> {
    sqlx::query_as::<_, List>(
        r#"
        SELECT id, board_id, title, position, created_at, updated_at
        FROM lists
        WHERE id = $1
        "#,
    )
    .bind(list_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(ServiceError::NotFound("list"))
}

async fn fetch_task(tx: &mut Transaction<'_, Postgres>, task_id: Uuid) -> ServiceResult<Task> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, list_id, title, description, due_date, assignee_id,
               created_by, position, created_at, updated_at
        FROM tasks
        WHERE id = $1
        "#,
    )
    .bind(task_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(ServiceError::NotFound("task"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_table_identifiers() {
        assert_eq!(SiblingTable::Lists.table(), "lists");
        assert_eq!(SiblingTable::Lists.parent_column(), "board_id");
        assert_eq!(SiblingTable::Tasks.table(), "tasks");
        assert_eq!(SiblingTable::Tasks.parent_column(), "list_id");
    }

    #[test]
    fn test_serialization_failure_detection() {
        assert!(!is_serialization_failure(&sqlx::Error::RowNotFound));
        assert!(!is_serialization_failure(&sqlx::Error::PoolClosed));
    }

    // Transactional behavior (atomicity, locking, density after commit)
    // is covered by the database integration tests in tests/store_tests.rs.
}
