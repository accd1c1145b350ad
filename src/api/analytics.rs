use axum::{ extract::{ Query, State }, Json };
use serde::Deserialize;

use crate::error::Result;
use crate::services::analytics_service::SavingsResponse;

use super::AppState;

#[derive(Deserialize)]
pub struct SavingsQuery {
    #[serde(default)]
    pub days: Option<i64>,
}

pub async fn get_savings(
    State(state): State<AppState>,
    Query(query): Query<SavingsQuery>
) -> Result<Json<SavingsResponse>> {
    let days = query.days.unwrap_or(30);
    let savings = state.analytics_service.savings_since(days).await?;
    Ok(Json(savings))
}
