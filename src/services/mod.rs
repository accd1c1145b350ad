pub mod observation_service;
pub mod price_service;
pub mod deal_service;
pub mod comparison_service;
pub mod alert_service;
pub mod analytics_service;

pub use observation_service::ObservationService;
pub use price_service::PriceService;
pub use deal_service::DealService;
pub use comparison_service::ComparisonService;
pub use alert_service::AlertService;
pub use analytics_service::AnalyticsService;
