use std::sync::Arc;

pub mod prices;
pub mod deals;
pub mod compare;
pub mod alerts;
pub mod analytics;

use crate::services::{
    AlertService,
    AnalyticsService,
    ComparisonService,
    DealService,
    ObservationService,
    PriceService,
};

#[derive(Clone)]
pub struct AppState {
    pub observation_service: Arc<ObservationService>,
    pub price_service: Arc<PriceService>,
    pub deal_service: Arc<DealService>,
    pub comparison_service: Arc<ComparisonService>,
    pub alert_service: Arc<AlertService>,
    pub analytics_service: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(
        observation_service: Arc<ObservationService>,
        price_service: Arc<PriceService>,
        deal_service: Arc<DealService>,
        comparison_service: Arc<ComparisonService>,
        alert_service: Arc<AlertService>,
        analytics_service: Arc<AnalyticsService>
    ) -> Self {
        Self {
            observation_service,
            price_service,
            deal_service,
            comparison_service,
            alert_service,
            analytics_service,
        }
    }
}
