/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use nextup_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = nextup_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use nextup_shared::{
    auth::{
        jwt,
        middleware::{extract_bearer_token, require_admin_middleware, AuthContext},
    },
    payments::stripe::{StripeClient, StripeConfig},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Stripe API client
    pub stripe: StripeClient,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let stripe = StripeClient::new(StripeConfig {
            secret_key: config.stripe.secret_key.clone(),
            webhook_secret: config.stripe.webhook_secret.clone(),
        });

        Self {
            db,
            config: Arc::new(config),
            stripe,
        }
    }

    /// Creates application state with an alternate Stripe client (tests)
    pub fn with_stripe(db: PgPool, config: Config, stripe: StripeClient) -> Self {
        Self {
            db,
            config: Arc::new(config),
            stripe,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── /health                       # Health check (public)
/// ├── /auth/                        # Authentication (public)
/// │   ├── POST /register
/// │   ├── POST /login
/// │   ├── POST /refresh
/// │   └── POST /logout
/// ├── /seasons/                     # Seasons
/// │   ├── GET    /active            # Active season (authenticated)
/// │   ├── GET    /                  # List (admin)
/// │   ├── POST   /                  # Create (admin)
/// │   ├── PUT    /:id               # Update (admin)
/// │   └── DELETE /:id               # Delete (admin)
/// ├── /payments/
/// │   ├── POST /webhook             # Stripe webhook (signature-gated)
/// │   └── GET  /confirm             # Client confirmation (authenticated)
/// └── /admin/                       # Admin-only
///     ├── GET    /users
///     ├── PATCH  /users/:id/promote
///     ├── DELETE /users/:id
///     └── GET    /stats
/// ```
///
/// The webhook route deliberately bypasses JWT authentication: Stripe is
/// not a bearer-token client, and the HMAC signature over the raw body is
/// its authentication.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/payments/webhook", post(routes::payments::webhook));

    // Routes for any authenticated user
    let user_routes = Router::new()
        .route("/seasons/active", get(routes::seasons::get_active_season))
        .route("/payments/confirm", get(routes::payments::confirm))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Admin-only routes (auth + admin check)
    let admin_routes = Router::new()
        .route("/seasons", get(routes::seasons::list_seasons))
        .route("/seasons", post(routes::seasons::create_season))
        .route("/seasons/:id", put(routes::seasons::update_season))
        .route("/seasons/:id", delete(routes::seasons::delete_season))
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/users/:id/promote", patch(routes::admin::promote_user))
        .route("/admin/users/:id", delete(routes::admin::delete_user))
        .route("/admin/stats", get(routes::admin::stats))
        .layer(axum::middleware::from_fn(require_admin_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer access token from the Authorization
/// header, then injects an [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = extract_bearer_token(header_value)?;

    let claims = jwt::validate_access_token(token, state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        ApiError::Forbidden("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        email: claims.email,
        is_admin: claims.is_admin,
    });

    Ok(next.run(req).await)
}
