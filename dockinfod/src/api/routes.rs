use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use shared::protocol::{CONTAINER_HEADER, CONTAINER_QUERY, LABEL_QUERY};
use shared::types::{FilteredPackageList, HealthStatus, PackageList, ServiceRecord};
use crate::api::cors::OriginMatcher;
use crate::api::error::ApiError;
use crate::identity::IdentityRequest;
use crate::resolver::{QueryResolver, ResolveError};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<QueryResolver>,
}

/// Raw query parameters; a repeated key keeps its last value
type QueryParams = HashMap<String, String>;

pub fn router(state: AppState, origins: OriginMatcher) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/packages", get(list_packages))
        .route("/list", get(list_packages))
        .route("/package", get(get_package_by_request))
        .route("/labels", get(get_package_by_request))
        .route("/my-info", get(get_package_by_request))
        .route("/package/:name", get(get_package))
        .route("/container/:name", get(get_package))
        .route("/by-label", get(get_packages_by_label))
        .route("/self", get(get_self))
        .layer(origins.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn identity_request(
    path: Option<String>,
    mut query: QueryParams,
    headers: &HeaderMap,
) -> IdentityRequest {
    IdentityRequest {
        path,
        query: query.remove(CONTAINER_QUERY),
        header: headers
            .get(CONTAINER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}

async fn list_packages(State(state): State<AppState>) -> Result<Json<PackageList>, ApiError> {
    Ok(Json(state.resolver.list_visible().await?))
}

async fn get_package(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<QueryParams>,
    headers: HeaderMap,
) -> Result<Json<ServiceRecord>, ApiError> {
    let request = identity_request(Some(name), query, &headers);
    Ok(Json(state.resolver.get_by_request(&request).await?))
}

async fn get_package_by_request(
    State(state): State<AppState>,
    Query(query): Query<QueryParams>,
    headers: HeaderMap,
) -> Result<Json<ServiceRecord>, ApiError> {
    let request = identity_request(None, query, &headers);
    Ok(Json(state.resolver.get_by_request(&request).await?))
}

async fn get_packages_by_label(
    State(state): State<AppState>,
    Query(mut query): Query<QueryParams>,
) -> Result<Json<FilteredPackageList>, ApiError> {
    let label = query.remove(LABEL_QUERY).filter(|l| !l.is_empty()).ok_or_else(|| {
        ResolveError::bad_request("Label filter required (e.g., ?label=dockinfo.enable=true)")
    })?;

    Ok(Json(state.resolver.filter_by_label(&label).await?))
}

async fn get_self(State(state): State<AppState>) -> Result<Json<ServiceRecord>, ApiError> {
    Ok(Json(state.resolver.self_record().await?))
}
