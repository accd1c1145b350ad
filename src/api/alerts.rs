use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::error::Result;
use crate::services::alert_service::{ CreateAlertRequest, PriceAlertResponse };

use super::AppState;

#[derive(Deserialize)]
pub struct AlertsQuery {
    pub user_id: String,
}

pub async fn get_price_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>
) -> Result<Json<Vec<PriceAlertResponse>>> {
    let alerts = state.alert_service.evaluate(&query.user_id).await?;
    Ok(Json(alerts))
}

#[derive(Serialize)]
pub struct AlertCreatedResponse {
    pub id: Uuid,
    pub product_id: i32,
    pub target_price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub async fn create_price_alert(
    State(state): State<AppState>,
    Json(request): Json<CreateAlertRequest>
) -> Result<(StatusCode, Json<AlertCreatedResponse>)> {
    let alert = state.alert_service.create_alert(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AlertCreatedResponse {
            id: alert.id,
            product_id: alert.product_id,
            target_price: alert.target_price,
            active: alert.active,
            created_at: alert.created_at,
        }),
    ))
}

pub async fn delete_price_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
    Query(query): Query<AlertsQuery>
) -> Result<StatusCode> {
    state.alert_service.delete_alert(alert_id, &query.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
