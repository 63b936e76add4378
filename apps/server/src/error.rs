use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pricewatch_core::errors::Error as CoreError;
use pricewatch_core::prices::PriceError;
use pricewatch_core::tracking::TrackingError;
use pricewatch_market_data::MarketDataError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Price(PriceError::NotFound { .. }) => StatusCode::NOT_FOUND,
                CoreError::MarketData(MarketDataError::UnsupportedAsset(_)) => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::MarketData(_) => StatusCode::BAD_GATEWAY,
                CoreError::Tracking(TrackingError::ShuttingDown) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
