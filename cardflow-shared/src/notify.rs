/// Change notification fan-out
///
/// Every successful board mutation fires a fire-and-forget
/// "board changed" event so connected viewers can refresh. Delivery is
/// not part of any transactional guarantee: the service publishes after
/// commit and ignores failures beyond logging them.
///
/// The production implementation publishes JSON to a Redis channel per
/// board (`board:{id}:events`) via `redis::aio::ConnectionManager`,
/// which reconnects automatically. `NullNotifier` serves tests and
/// deployments without Redis.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Event published when a board's content changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    /// The board whose state changed
    pub board_id: Uuid,

    /// When the change committed
    pub occurred_at: DateTime<Utc>,
}

impl BoardEvent {
    /// Creates an event stamped with the current time
    pub fn now(board_id: Uuid) -> Self {
        Self {
            board_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Redis channel for a board's change events.
pub fn board_channel(board_id: Uuid) -> String {
    format!("board:{}:events", board_id)
}

/// The broadcast collaborator: accepts board-changed events with no
/// acknowledgment and no delivery guarantee.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Announces that a board's content changed. Must not fail the
    /// caller; implementations swallow and log their own errors.
    async fn board_changed(&self, board_id: Uuid);
}

/// Redis pub/sub backed notifier.
#[derive(Clone)]
pub struct RedisNotifier {
    manager: ConnectionManager,
}

impl RedisNotifier {
    /// Connects to Redis at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the initial connection
    /// fails; reconnection afterwards is handled by the manager.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;

        tracing::info!("change notifier connected to redis");
        Ok(Self { manager })
    }
}

#[async_trait]
impl ChangeNotifier for RedisNotifier {
    async fn board_changed(&self, board_id: Uuid) {
        let event = BoardEvent::now(board_id);
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(board_id = %board_id, error = %e, "failed to serialize board event");
                return;
            }
        };

        let mut conn = self.manager.clone();
        let result: Result<i64, redis::RedisError> =
            conn.publish(board_channel(board_id), payload).await;

        if let Err(e) = result {
            warn!(board_id = %board_id, error = %e, "failed to publish board event");
        }
    }
}

/// No-op notifier for tests and Redis-less deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl ChangeNotifier for NullNotifier {
    async fn board_changed(&self, _board_id: Uuid) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_channel() {
        let id = Uuid::new_v4();
        assert_eq!(board_channel(id), format!("board:{}:events", id));
    }

    #[test]
    fn test_event_serializes_board_id() {
        let id = Uuid::new_v4();
        let json = serde_json::to_string(&BoardEvent::now(id)).unwrap();
        assert!(json.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn test_null_notifier_is_silent() {
        NullNotifier.board_changed(Uuid::new_v4()).await;
    }
}
