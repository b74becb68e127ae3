pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))

        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me)
            .route_layer(axum::middleware::from_fn_with_state(
                app_state.clone(),
                middleware::auth::require_auth,
            ))
        )

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/clubs", club_routes())
        .nest("/announcements", announcement_routes())
        .nest("/proposals", proposal_routes())
        .nest("/events", event_routes())
        .nest("/applications", application_routes())
        .route("/changes", get(handlers::changes::stream))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn club_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::clubs::list))
        .route("/:id", get(handlers::clubs::get))
}

fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::announcements::list).post(handlers::announcements::create))
        .route("/unread-count", get(handlers::announcements::unread_count))
        .route(
            "/:id",
            get(handlers::announcements::get)
                .put(handlers::announcements::update)
                .delete(handlers::announcements::delete),
        )
        .route(
            "/:id/read",
            post(handlers::announcements::mark_read).delete(handlers::announcements::mark_unread),
        )
}

fn proposal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::proposals::list).post(handlers::proposals::create))
        .route(
            "/:id",
            get(handlers::proposals::get)
                .put(handlers::proposals::update)
                .delete(handlers::proposals::delete),
        )
        .route("/:id/start-review", post(handlers::proposals::start_review))
        .route("/:id/review", post(handlers::proposals::review))
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::events::list).post(handlers::events::create))
        .route(
            "/:id",
            get(handlers::events::get)
                .put(handlers::events::update)
                .delete(handlers::events::delete),
        )
        .route(
            "/:id/rsvp",
            post(handlers::events::rsvp).delete(handlers::events::cancel_rsvp),
        )
        .route("/:id/attendees", get(handlers::events::attendees))
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::applications::list).post(handlers::applications::submit))
        .route(
            "/:id",
            get(handlers::applications::get).delete(handlers::applications::withdraw),
        )
        .route("/:id/review", post(handlers::applications::review))
}
