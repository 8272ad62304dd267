use crate::api::AppState;
use crate::catalog::{check_health, ProductList};
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::search::{
    parse_positive_int, ReconciliationReport, SearchPage, SearchParams, SearchRequest, SyncWarning,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// `{success: false, message}` with the given status
fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message.into() })),
    )
        .into_response()
}

fn invalid_id() -> Response {
    failure(StatusCode::BAD_REQUEST, "Invalid product id")
}

fn product_not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "Product not found")
}

/// Positive integer id from a path segment
fn parse_product_id(raw: &str) -> Option<i64> {
    match parse_positive_int(Some(raw), 0) {
        0 => None,
        id => i64::try_from(id).ok(),
    }
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    pub data: Product,
    pub warning: Option<SyncWarning>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub success: bool,
    pub data: Product,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub warning: Option<SyncWarning>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub list: ProductList,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: SearchPage,
}

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub report: ReconciliationReport,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Health check: probes the catalog store and the search engine
pub async fn health_check(State(state): State<AppState>) -> Response {
    let engine = state.search.index_manager().engine();
    let report = check_health(state.catalog.store().as_ref(), engine.as_ref()).await;

    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "success": report.healthy,
            "timestamp": report.timestamp,
            "services": report.services,
        })),
    )
        .into_response()
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordResponse>)> {
    let created = state.catalog.create_record(body(payload)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            success: true,
            data: created.value,
            warning: created.warning,
        }),
    ))
}

/// List products, newest first
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let page = parse_positive_int(params.page.as_deref(), 1);
    let limit = parse_positive_int(params.limit.as_deref(), 0);
    let list = state.catalog.list_records(page, limit).await?;

    Ok(Json(ListResponse {
        success: true,
        list,
    }))
}

/// Get a product by ID
pub async fn get_product(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<Response> {
    let Some(id) = parse_product_id(&raw_id) else {
        return Ok(invalid_id());
    };

    Ok(match state.catalog.get_record(id).await? {
        Some(product) => Json(DataResponse {
            success: true,
            data: product,
        })
        .into_response(),
        None => product_not_found(),
    })
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: std::result::Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Response> {
    let Some(id) = parse_product_id(&raw_id) else {
        return Ok(invalid_id());
    };

    Ok(match state.catalog.update_record(id, body(payload)?).await? {
        Some(updated) => Json(RecordResponse {
            success: true,
            data: updated.value,
            warning: updated.warning,
        })
        .into_response(),
        None => product_not_found(),
    })
}

/// Delete a product
pub async fn delete_product(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<Response> {
    let Some(id) = parse_product_id(&raw_id) else {
        return Ok(invalid_id());
    };

    Ok(match state.catalog.delete_record(id).await? {
        Some(deleted) => Json(DeleteResponse {
            success: true,
            message: "Product deleted successfully".to_string(),
            warning: deleted.warning,
        })
        .into_response(),
        None => product_not_found(),
    })
}

/// Full-text product search with filters and facets
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let request = SearchRequest::from_params(&params);
    let page = state.search.search(&request).await?;

    Ok(Json(SearchResponse {
        success: true,
        page,
    }))
}

/// Rebuild the search index from the catalog store
pub async fn reindex_products(State(state): State<AppState>) -> Result<Response> {
    let report = state.catalog.reindex_all().await?;

    let (status, success, message) = if report.is_consistent() {
        (StatusCode::OK, true, "Reindex completed")
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            false,
            "Reindex finished with sync mismatch. Check logs and rerun reindex.",
        )
    };

    Ok((
        status,
        Json(ReindexResponse {
            success,
            message: message.to_string(),
            report,
        }),
    )
        .into_response())
}

/// Fallback for unknown routes
pub async fn not_found(method: Method, uri: Uri) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        format!("Route not found: {} {}", method, uri.path()),
    )
}
