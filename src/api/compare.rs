use axum::{ extract::State, Json };
use serde::Deserialize;

use crate::error::Result;
use crate::services::comparison_service::ComparisonEntry;

use super::AppState;

#[derive(Deserialize)]
pub struct CompareRequest {
    pub product_ids: Vec<i32>,
}

pub async fn compare_products(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>
) -> Result<Json<Vec<ComparisonEntry>>> {
    let entries = state.comparison_service.compare(request.product_ids).await?;
    Ok(Json(entries))
}
