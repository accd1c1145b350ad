use axum::{ extract::{ Query, State }, Json };
use serde::Deserialize;

use crate::error::Result;
use crate::services::deal_service::DealResponse;

use super::AppState;

#[derive(Deserialize)]
pub struct BestDealsQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
}

pub async fn get_best_deals(
    State(state): State<AppState>,
    Query(query): Query<BestDealsQuery>
) -> Result<Json<Vec<DealResponse>>> {
    let deals = state.deal_service.best_deals(query.category.as_deref(), query.limit).await?;
    Ok(Json(deals))
}
