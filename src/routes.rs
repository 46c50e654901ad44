// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{analytics, auth, exams, lessons, practice, profile, questions, topics},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/api/auth` and the exam catalog are public; everything else needs a bearer token.
/// * Auth is a route layer, so unknown paths still fall through to 404.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me).patch(profile::update_me))
        .route_layer(require_auth.clone());

    let topic_routes = Router::new()
        .route("/", get(topics::list_topics).post(topics::create_topic))
        .route("/{id}/weak", patch(topics::set_weak))
        .route_layer(require_auth.clone());

    let question_routes = Router::new()
        .route(
            "/",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/{id}", get(questions::get_question))
        .route_layer(require_auth.clone());

    let practice_routes = Router::new()
        .route("/session", post(practice::start_session))
        .route("/attempt", post(practice::record_attempt))
        .route("/mistakes", get(practice::list_mistakes))
        .route("/mistakes/questions", get(practice::mistake_questions))
        .route("/mistakes/questions/all", get(practice::all_mistake_questions))
        .route("/mistakes/session", post(practice::start_mistake_session))
        .route("/mistakes/session/all", post(practice::start_all_mistakes_session))
        .route_layer(require_auth.clone());

    let lesson_routes = Router::new()
        .route(
            "/progress",
            get(lessons::list_progress).post(lessons::mark_complete),
        )
        .route("/progress/{lesson_id}", delete(lessons::undo_complete))
        .route_layer(require_auth.clone());

    let exam_routes = Router::new()
        .route("/", get(exams::list_exams))
        // Protected exam routes
        .merge(
            Router::new()
                .route("/{exam_id}/session", post(exams::start_session))
                .route_layer(require_auth.clone()),
        );

    let exam_session_routes = Router::new()
        .route("/{id}/questions", get(exams::session_questions))
        .route("/{id}/answer", post(exams::record_answer))
        .route("/{id}/flags", get(exams::list_flags))
        .route("/{id}/submit", post(exams::submit))
        .route("/{id}/results", get(exams::results))
        .route_layer(require_auth.clone());

    let analytics_routes = Router::new()
        .route("/overview", get(analytics::overview))
        .route("/topic-mastery", get(analytics::topic_mastery))
        .route("/readiness", get(analytics::readiness))
        .route("/accuracy-trend", get(analytics::accuracy_trend))
        .route_layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/topics", topic_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/practice", practice_routes)
        .nest("/api/lessons", lesson_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/exam-sessions", exam_session_routes)
        .nest("/api/analytics", analytics_routes)
        // Global Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
