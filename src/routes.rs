// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, quiz, schedule, topic},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: service banner and auth.
/// * Everything under schedules and the dashboard requires a logged-in session.
/// * Applies global middleware (Trace, CORS) and injects the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let schedule_routes = Router::new()
        .route(
            "/",
            get(schedule::list_schedules).post(schedule::create_schedule),
        )
        .route("/{utid}/topics", get(schedule::list_topics))
        .route("/{utid}/next", post(schedule::next_topic))
        .route("/{utid}/topics/{seq}/complete", post(topic::mark_complete))
        .route("/{utid}/topics/{seq}/explain", get(topic::explain_more))
        .route(
            "/{utid}/topics/{seq}/quiz",
            get(quiz::generate_quiz).post(quiz::submit_quiz),
        );

    // route_layer keeps unknown paths at 404 instead of 401.
    let protected_routes = Router::new()
        .route("/api/dashboard", get(schedule::dashboard))
        .nest("/api/schedules", schedule_routes)
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(schedule::home))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
