pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod routes;
pub mod store;
pub mod workflow;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::JwtService;
use crate::config::{Config, RateLimit};
use crate::routes::{admin, auth as auth_routes, investor, posts};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        Self {
            db,
            jwt: Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_issuer.clone(),
                config.token_ttl_hours,
            )),
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ESG Connect API",
        version = "0.1.0",
        description = "Sustainable businesses, impact investors and the review workflow between them"
    ),
    paths(
        health_check,
        auth_routes::register,
        auth_routes::login,
        auth_routes::me,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::own_posts,
        posts::update_post,
        posts::delete_post,
        posts::pending_posts,
        posts::review_post,
        posts::review_history,
        posts::received_interests,
        posts::update_interest_status,
        admin::create_admin,
        admin::list_admins,
        admin::delete_admin,
        admin::stats,
        investor::saved_businesses,
        investor::save_business,
        investor::remove_saved_business,
        investor::interests,
        investor::express_interest,
        investor::withdraw_interest
    ),
    components(schemas(
        entities::post::PostResponse,
        entities::PostStatus,
        entities::Role,
        entities::InterestStatus,
        entities::user::AccountSummary,
        entities::user::AccountResponse,
        entities::saved_business::Model,
        entities::interest::Model,
        routes::MessageResponse,
        posts::ListPostsResponse,
        posts::PostInput,
        posts::ReviewRequest,
        posts::InterestStatusRequest,
        auth_routes::RegisterRequest,
        auth_routes::LoginRequest,
        auth_routes::AuthResponse,
        admin::CreateAdminRequest,
        admin::StatsResponse,
        investor::SaveBusinessRequest,
        investor::ExpressInterestRequest
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth_routes::register))
        .route("/api/auth/login", post(auth_routes::login))
        .route("/api/auth/me", get(auth_routes::me))
        .route("/api/posts", get(posts::list_posts))
        .route("/api/posts/create", post(posts::create_post))
        .route("/api/posts/user/posts", get(posts::own_posts))
        .route("/api/posts/user/interests", get(posts::received_interests))
        .route("/api/posts/interests/{id}/status", put(posts::update_interest_status))
        .route("/api/posts/admin/pending", get(posts::pending_posts))
        .route("/api/posts/admin/review/{id}", put(posts::review_post))
        .route("/api/posts/admin/history", get(posts::review_history))
        .route(
            "/api/posts/{id}",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/admin/create", post(admin::create_admin))
        .route("/api/admin/list", get(admin::list_admins))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/{id}", delete(admin::delete_admin))
        .route(
            "/api/investor/saved",
            get(investor::saved_businesses).post(investor::save_business),
        )
        .route("/api/investor/saved/{id}", delete(investor::remove_saved_business))
        .route(
            "/api/investor/interests",
            get(investor::interests).post(investor::express_interest),
        )
        .route("/api/investor/interests/{id}", delete(investor::withdraw_interest))
}

fn rate_limited(routes: Router<AppState>, limit: RateLimit) -> Router<AppState> {
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(limit.period)
        .burst_size(limit.burst.max(1))
        .finish();

    match governor_conf {
        Some(conf) => routes.layer(GovernorLayer {
            config: Arc::new(conf),
        }),
        None => {
            tracing::warn!(?limit, "invalid rate limit settings; rate limiting disabled");
            routes
        }
    }
}

/// Create the application with all routes and middleware
pub fn create_app(state: AppState, config: &Config) -> Router {
    let api_doc = ApiDoc::openapi();

    // Rate limiting covers the API only; health and docs stay reachable
    let mut api = api_routes();
    if let Some(limit) = config.rate_limit {
        api = rate_limited(api, limit);
    }

    Router::new()
        .merge(api)
        .route("/health", get(health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
