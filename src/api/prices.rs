use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };

use crate::engine::history::PriceHistoryPoint;
use crate::engine::predictor::PricePrediction;
use crate::error::Result;
use crate::services::observation_service::RecordObservationRequest;
use crate::services::price_service::CurrentPriceResponse;

use super::AppState;

#[derive(Serialize)]
pub struct ObservationResponse {
    pub id: i64,
    pub product_id: i32,
    pub store_id: i32,
    pub price: Decimal,
    pub currency: String,
    pub observed_at: DateTime<Utc>,
    pub is_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<DateTime<Utc>>,
}

pub async fn record_price(
    State(state): State<AppState>,
    Json(request): Json<RecordObservationRequest>
) -> Result<(StatusCode, Json<ObservationResponse>)> {
    let observation = state.observation_service.record(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ObservationResponse {
            id: observation.id,
            product_id: observation.product_id,
            store_id: observation.store_id,
            price: observation.price,
            currency: observation.currency,
            observed_at: observation.observed_at,
            is_sale: observation.is_sale,
            sale_end: observation.sale_end,
        }),
    ))
}

pub async fn get_product_prices(
    State(state): State<AppState>,
    Path(product_id): Path<i32>
) -> Result<Json<Vec<CurrentPriceResponse>>> {
    let prices = state.price_service.current_prices(product_id).await?;
    Ok(Json(prices))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub store_id: Option<i32>,
}

pub async fn get_price_history(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Query(query): Query<HistoryQuery>
) -> Result<Json<Vec<PriceHistoryPoint>>> {
    let days = query.days.unwrap_or(30);
    let points = state.price_service.price_history(product_id, query.store_id, days).await?;
    Ok(Json(points))
}

#[derive(Deserialize)]
pub struct PredictionQuery {
    #[serde(default)]
    pub days_ahead: Option<i64>,
}

pub async fn get_price_predictions(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Query(query): Query<PredictionQuery>
) -> Result<Json<PricePrediction>> {
    let days_ahead = query.days_ahead.unwrap_or(7);
    let prediction = state.price_service.predict_price(product_id, days_ahead).await?;
    Ok(Json(prediction))
}
