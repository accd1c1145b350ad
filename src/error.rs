use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid observation: {0}")] InvalidObservation(String),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Invalid range: {0}")] InvalidRange(String),

    #[error("Product {0} not found")] ProductNotFound(i32),

    #[error("Store {0} not found")] StoreNotFound(i32),

    #[error("No price data: {0}")] NoData(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::InvalidObservation(msg) => ("INVALID_OBSERVATION", msg.clone(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::InvalidRange(msg) => ("INVALID_RANGE", msg.clone(), None),
            AppError::ProductNotFound(id) =>
                (
                    "PRODUCT_NOT_FOUND",
                    format!("Product {} not found", id),
                    Some("product_id".to_string()),
                ),
            AppError::StoreNotFound(id) =>
                (
                    "STORE_NOT_FOUND",
                    format!("Store {} not found", id),
                    Some("store_id".to_string()),
                ),
            AppError::NoData(msg) => ("NO_DATA", msg.clone(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::ProductNotFound(_) | AppError::StoreNotFound(_) | AppError::NoData(_) => {
                axum::http::StatusCode::NOT_FOUND
            }
            | AppError::InvalidObservation(_)
            | AppError::InvalidInput(_)
            | AppError::InvalidRange(_) => {
                axum::http::StatusCode::BAD_REQUEST
            }
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
