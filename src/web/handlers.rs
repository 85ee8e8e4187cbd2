use axum::{extract::State, response::Json};

use super::{ApiResponse, AppError, AppState};
use crate::models::{CompositeReport, LeadReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRequest {
    pub product_name: String,
    /// Used only by the premium lead endpoint to verify subscription status.
    #[serde(default)]
    pub user_email: Option<String>,
}

pub async fn analyze_product(
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ApiResponse<CompositeReport>>, AppError> {
    if request.product_name.trim().is_empty() {
        return Err(AppError::bad_request("Product name is required"));
    }

    tracing::info!(product = %request.product_name, "analyze request received");

    match state.orchestrator.produce_report(&request.product_name).await {
        Ok(report) => Ok(Json(ApiResponse::success(report))),
        Err(e) => {
            tracing::error!("Failed to produce report: {}", e);
            Err(AppError::internal("Failed to produce report"))
        }
    }
}

pub async fn get_leads(
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ApiResponse<LeadReport>>, AppError> {
    // Subscription gate: the scraping side never sees authorization
    let email = request.user_email.unwrap_or_default();
    if !email.contains("pro") && !email.contains("agency") {
        return Err(AppError::forbidden(
            "This is a premium feature. Please upgrade your plan to access.",
        ));
    }

    if request.product_name.trim().is_empty() {
        return Err(AppError::bad_request("Product name is required"));
    }

    tracing::info!(product = %request.product_name, "lead harvest request received");

    let report = state.harvester.harvest(&request.product_name).await;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "argus-insight"
    }))
}
