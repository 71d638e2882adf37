use crate::{
    auth::{auth_dto::*, auth_handlers},
    middleware::{authenticate, expose_error_detail, optional_authenticate},
    state::AppState,
    task::{task_dto::*, task_handlers, Task, TaskPriority, TaskStatus},
    user::{UserRef, UserResponse},
};
use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::signup,
        auth_handlers::login,
        auth_handlers::profile,
        auth_handlers::verify,
        auth_handlers::logout,
        task_handlers::get_tasks,
        task_handlers::get_task,
        task_handlers::create_task,
        task_handlers::update_task,
        task_handlers::delete_task,
        task_handlers::get_task_stats,
        task_handlers::download_tasks_excel,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            AuthResponse,
            ProfileResponse,
            UserResponse,
            UserRef,
            CreateTaskRequest,
            UpdateTaskRequest,
            TaskListResponse,
            TaskResponse,
            MessageResponse,
            StatsResponse,
            TaskStats,
            DivisionCount,
            PriorityCount,
            Task,
            TaskStatus,
            TaskPriority,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "tasks", description = "Task management endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION]);

    match client_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(true),
        Some(Err(_)) => {
            tracing::warn!("CLIENT_URL is not a valid origin, allowing any origin");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Task Management API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": {
                "signup": "POST /api/auth/signup",
                "login": "POST /api/auth/login",
                "profile": "GET /api/auth/profile",
                "verify": "GET /api/auth/verify",
                "logout": "POST /api/auth/logout"
            },
            "tasks": {
                "create": "POST /api/tasks",
                "getAll": "GET /api/tasks",
                "getOne": "GET /api/tasks/:id",
                "update": "PUT /api/tasks/:id",
                "delete": "DELETE /api/tasks/:id",
                "downloadExcel": "GET /api/tasks/download/excel",
                "stats": "GET /api/tasks/stats"
            }
        }
    }))
}

async fn route_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
        })),
    )
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.client_url.as_deref());

    let auth_routes = Router::new()
        .route("/signup", post(auth_handlers::signup))
        .route("/login", post(auth_handlers::login))
        .merge(
            Router::new()
                .route("/profile", get(auth_handlers::profile))
                .route("/verify", get(auth_handlers::verify))
                .route("/logout", post(auth_handlers::logout))
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate)),
        );

    // Reads and creation are public; creation records the caller when a token is supplied.
    let task_routes = Router::new()
        .route(
            "/",
            get(task_handlers::get_tasks).merge(
                post(task_handlers::create_task).route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    optional_authenticate,
                )),
            ),
        )
        .route("/stats", get(task_handlers::get_task_stats))
        .route("/download/excel", get(task_handlers::download_tasks_excel))
        .route(
            "/:id",
            get(task_handlers::get_task).merge(
                put(task_handlers::update_task)
                    .delete(task_handlers::delete_task)
                    .route_layer(middleware::from_fn_with_state(state.clone(), authenticate)),
            ),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(health))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), expose_error_detail))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
