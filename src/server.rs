//! HTTP surface: the dashboard page plus the JSON endpoints it calls.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::DashboardError;
use crate::model::{CrimeTable, Selection};
use crate::visualization::{self, MapView};

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<CrimeTable>,
    pub view: Arc<MapView>,
}

impl AppState {
    pub fn new(table: CrimeTable, view: MapView) -> Self {
        Self {
            table: Arc::new(table),
            view: Arc::new(view),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DropdownOptions {
    pub crime_types: Vec<String>,
    pub years: Vec<String>,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/options", get(options))
        .route("/api/figure", get(figure))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), DashboardError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "dashboard listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, DashboardError> {
    Ok(Html(visualization::dashboard_html(&state.table)?))
}

pub async fn options(
    State(state): State<AppState>,
) -> Result<Json<DropdownOptions>, DashboardError> {
    Ok(Json(DropdownOptions {
        crime_types: state.table.crime_types()?,
        years: state.table.years()?,
    }))
}

pub async fn figure(
    State(state): State<AppState>,
    Query(selection): Query<Selection>,
) -> Result<Json<Value>, DashboardError> {
    info!(
        crime = selection.crime.as_deref().unwrap_or("<unset>"),
        year = selection.year.as_deref().unwrap_or("<unset>"),
        "selection changed"
    );
    let spec = visualization::render(&state.table, &selection, &state.view)?;
    Ok(Json(spec.figure()))
}

pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "rows": state.table.height(),
        "loaded_at": state.table.loaded_at().to_rfc3339(),
    }))
}
