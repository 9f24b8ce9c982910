/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use cardflow_api::{app::AppState, config::Config};
/// use cardflow_shared::{notify::NullNotifier, service::BoardService};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let service = BoardService::new(pool, NullNotifier);
/// let state = AppState::new(service, config);
/// let app = cardflow_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use cardflow_shared::auth::jwt;
use cardflow_shared::service::BoardService;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State`
/// extractor. Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Board mutation service
    pub service: Arc<BoardService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(service: BoardService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated caller identity, injected into request extensions by
/// the JWT middleware. Handlers read it with the `Extension` extractor.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    /// The authenticated user's id (JWT `sub` claim)
    pub user_id: Uuid,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Health check (public)
/// └── /v1/                              # API v1 (authenticated)
///     ├── /boards/
///     │   ├── POST   /                  # Create board
///     │   ├── GET    /                  # Boards the caller belongs to
///     │   ├── GET    /:id               # Board outline
///     │   ├── PATCH  /:id               # Rename board
///     │   ├── DELETE /:id               # Delete board
///     │   ├── POST   /:id/lists         # Create list
///     │   ├── GET    /:id/members       # List members
///     │   ├── POST   /:id/members       # Add member
///     │   ├── PATCH  /:id/members/:uid  # Change member role
///     │   └── DELETE /:id/members/:uid  # Remove member
///     ├── /lists/
///     │   ├── POST   /:id/move          # Reorder list within board
///     │   ├── POST   /:id/tasks         # Create task
///     │   └── DELETE /:id               # Delete list
///     └── /tasks/
///         ├── POST   /:id/move          # Move task (within/across lists)
///         └── DELETE /:id               # Delete task
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (all /v1 routes)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let board_routes = Router::new()
        .route("/", post(routes::boards::create_board))
        .route("/", get(routes::boards::list_boards))
        .route("/:id", get(routes::boards::get_board_outline))
        .route("/:id", patch(routes::boards::update_board))
        .route("/:id", delete(routes::boards::delete_board))
        .route("/:id/lists", post(routes::lists::create_list))
        .route("/:id/members", get(routes::members::list_members))
        .route("/:id/members", post(routes::members::add_member))
        .route(
            "/:id/members/:user_id",
            patch(routes::members::change_member_role),
        )
        .route(
            "/:id/members/:user_id",
            delete(routes::members::remove_member),
        );

    let list_routes = Router::new()
        .route("/:id/move", post(routes::lists::move_list))
        .route("/:id/tasks", post(routes::tasks::create_task))
        .route("/:id", delete(routes::lists::delete_list));

    let task_routes = Router::new()
        .route("/:id/move", post(routes::tasks::move_task))
        .route("/:id", delete(routes::tasks::delete_task));

    // All v1 routes require a valid bearer token.
    let v1_routes = Router::new()
        .nest("/boards", board_routes)
        .nest("/lists", list_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization
/// header, then injects the `Caller` identity into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(Caller {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
