// HTTP API: handler 只負責驗證身分與角色，其餘交給 crate::app 的 service

pub mod auth;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app::{AuthService, CizService, EmployeeService, EventService};
use crate::config::ImportSettings;
use crate::domain::ports::{AuthGateway, CizStore, EmployeeStore, EventStore};

/// 所有 handler 共用的狀態
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<dyn AuthGateway, dyn EmployeeStore>>,
    pub employees: Arc<EmployeeService<dyn EmployeeStore>>,
    pub ciz: Arc<CizService<dyn CizStore>>,
    pub events: Arc<EventService<dyn EventStore, dyn CizStore>>,
    pub import: ImportSettings,
}

impl AppState {
    /// 所有 port 由同一個後端實作提供
    pub fn new<B>(backend: Arc<B>, import: ImportSettings) -> Self
    where
        B: AuthGateway + EmployeeStore + CizStore + EventStore + 'static,
    {
        let employee_store: Arc<dyn EmployeeStore> = backend.clone();
        let auth_gateway: Arc<dyn AuthGateway> = backend.clone();
        let ciz_store: Arc<dyn CizStore> = backend.clone();
        let event_store: Arc<dyn EventStore> = backend;

        let ciz = Arc::new(CizService::new(ciz_store));

        Self {
            auth: Arc::new(AuthService::new(auth_gateway, employee_store.clone())),
            employees: Arc::new(EmployeeService::new(
                employee_store,
                import.batch_size,
                import.max_rows,
            )),
            events: Arc::new(EventService::new(event_store, ciz.clone())),
            ciz,
            import,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    use routes::{auth as auth_routes, ciz, employees, events};

    let api = Router::new()
        .route("/auth/login", post(auth_routes::login))
        .route("/me", get(auth_routes::me))
        .route("/employees", get(employees::list))
        .route(
            "/employees/{id}",
            get(employees::get)
                .patch(employees::update)
                .delete(employees::delete),
        )
        .route("/employees/import", post(employees::import_json))
        .route("/employees/import/csv", post(employees::import_csv))
        .route("/employees/{id}/ciz", get(ciz::balance))
        .route("/employees/{id}/ciz/history", get(ciz::history))
        .route("/ciz/grant", post(ciz::grant))
        .route("/ciz/deduct", post(ciz::deduct))
        .route("/events", get(events::list).post(events::create))
        .route("/events/{id}/participants", get(events::participants))
        .route("/events/{id}/join", post(events::join))
        .route("/events/{id}/attendance", post(events::attendance));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
